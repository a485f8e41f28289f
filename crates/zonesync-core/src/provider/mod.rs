// # Built-in Providers
//
// Providers that ship with the core crate. Network-backed providers live in
// their own crates (e.g. `zonesync-provider-azure`).

pub mod memory;

pub use memory::{MemoryProvider, MemoryProviderFactory, ProviderCall};
