// # zonesync-core
//
// Core library for reconciling a declarative DNS zone file with the live
// zone held by a DNS provider.
//
// ## Architecture Overview
//
// - **Record / Zone**: canonical, provider-agnostic record sets keyed by
//   `(name, type)`
// - **codec**: per-type translation between provider record sets and
//   canonical records
// - **diff**: classifies records as create, update or delete
// - **Reconciler**: applies a change set through a DnsProvider in
//   delete → create → update order, fail-fast
// - **DnsProvider**: trait for provider APIs
// - **ProviderRegistry**: plugin-based registry for DNS providers
//
// ## Flow
//
// local zone file ─┐
//                  ├─► diff ─► Reconciler ─► DnsProvider
// provider listing ┘

pub mod codec;
pub mod config;
pub mod diff;
pub mod error;
pub mod provider;
pub mod reconciler;
pub mod record;
pub mod registry;
pub mod traits;
pub mod wire;
pub mod zone;

// Re-export core types for convenience
pub use config::{ProviderConfig, SyncConfig, ZoneSyncConfig};
pub use diff::{Change, ChangeSet, Mark, diff};
pub use error::{Error, Result};
pub use provider::{MemoryProvider, ProviderCall};
pub use reconciler::{ReconcileReport, Reconciler};
pub use record::{CaaProperty, Record, RecordProperties, RecordType};
pub use registry::ProviderRegistry;
pub use traits::{DnsProvider, DnsProviderFactory};
pub use wire::{ProviderRecordSet, RecordSetProperties};
pub use zone::Zone;
