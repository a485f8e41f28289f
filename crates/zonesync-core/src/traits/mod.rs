//! Core traits for zonesync
//!
//! This module defines the abstract interfaces that providers implement.
//!
//! - [`DnsProvider`]: List and mutate record sets via a provider API

pub mod dns_provider;

pub use dns_provider::{DnsProvider, DnsProviderFactory};
