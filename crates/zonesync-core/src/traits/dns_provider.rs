// # DNS Provider Trait
//
// Defines the interface zonesync uses to read and mutate a hosted zone.
//
// ## Implementations
//
// - Azure DNS: `zonesync-provider-azure` crate
// - In-memory: [`crate::MemoryProvider`] (tests, embedding)
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::{DnsProvider, RecordType};
//
// async fn show(provider: &dyn DnsProvider) -> zonesync_core::Result<()> {
//     for rs in provider.list_records("example.com").await? {
//         println!("{} {}", rs.name, rs.type_mnemonic());
//     }
//     provider.delete_record("example.com", "old", RecordType::A).await?;
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::record::RecordType;
use crate::wire::{ProviderRecordSet, RecordSetProperties};

/// Trait for DNS provider implementations
///
/// # Contract
///
/// - One provider call per method invocation; no retries, no caching
/// - No background tasks
/// - Any non-success response is returned as an error, verbatim enough for
///   the user to act on it
///
/// The reconciler decides what to call and in which order. Providers only
/// execute.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every record set in a zone, in provider order
    ///
    /// Record sets of unmanaged types are included; the codec skips them.
    async fn list_records(&self, zone: &str) -> Result<Vec<ProviderRecordSet>, crate::Error>;

    /// Create a record set, or replace it if it exists
    ///
    /// `properties` is the codec output and carries the TTL.
    async fn create_or_update_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        properties: &RecordSetProperties,
    ) -> Result<ProviderRecordSet, crate::Error>;

    /// Delete a record set
    ///
    /// Must fail when the provider does not confirm the deletion, including
    /// when the record set was already absent.
    async fn delete_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<(), crate::Error>;

    /// Whether the zone exists at the provider
    async fn zone_exists(&self, zone: &str) -> Result<bool, crate::Error>;

    /// Create an empty zone
    async fn create_zone(&self, zone: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
