// # Memory Provider
//
// In-memory implementation of DnsProvider.
//
// ## Purpose
//
// Holds record sets per zone in a map and records every call in order.
// Useful for:
//
// - Testing reconciliation without a network
// - Embedding zonesync in tools that post-process the planned operations
//
// ## Behavior
//
// - `create_or_update_record` replaces a record set with the same key in
//   place, or appends a new one
// - `delete_record` of an absent record set fails, like a provider that
//   does not confirm the deletion
// - `fail_on(name)` makes every mutating call for that record name fail

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::ProviderConfig;
use crate::record::RecordType;
use crate::traits::{DnsProvider, DnsProviderFactory};
use crate::wire::{ProviderRecordSet, RecordSetProperties};

/// One recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    List { zone: String },
    CreateOrUpdate { zone: String, name: String, record_type: RecordType },
    Delete { zone: String, name: String, record_type: RecordType },
    ZoneExists { zone: String },
    CreateZone { zone: String },
}

impl ProviderCall {
    /// Whether the call mutates provider state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ProviderCall::CreateOrUpdate { .. }
                | ProviderCall::Delete { .. }
                | ProviderCall::CreateZone { .. }
        )
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    zones: HashMap<String, Vec<ProviderRecordSet>>,
    calls: Vec<ProviderCall>,
    failing: HashSet<String>,
}

/// In-memory DNS provider
///
/// Clones share state, so a test can keep a handle while the reconciler owns
/// a boxed clone.
///
/// # Example
///
/// ```rust,no_run
/// use zonesync_core::{MemoryProvider, DnsProvider};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = MemoryProvider::new();
///     provider.create_zone("example.com").await?;
///
///     assert!(provider.zone_exists("example.com").await?);
///     assert!(provider.list_records("example.com").await?.is_empty());
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    inner: Arc<RwLock<MemoryState>>,
}

impl MemoryProvider {
    /// Create a provider with no zones
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider holding one zone with the given record sets
    pub fn with_zone(zone: impl Into<String>, records: Vec<ProviderRecordSet>) -> Self {
        let mut state = MemoryState::default();
        state.zones.insert(zone.into(), records);
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Make every mutating call for `name` fail
    pub async fn fail_on(&self, name: impl Into<String>) {
        self.inner.write().await.failing.insert(name.into());
    }

    /// All calls made so far, in order
    pub async fn calls(&self) -> Vec<ProviderCall> {
        self.inner.read().await.calls.clone()
    }

    /// Only the mutating calls made so far, in order
    pub async fn mutations(&self) -> Vec<ProviderCall> {
        self.inner
            .read()
            .await
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    /// Current record sets of a zone
    pub async fn records(&self, zone: &str) -> Vec<ProviderRecordSet> {
        self.inner
            .read()
            .await
            .zones
            .get(zone)
            .cloned()
            .unwrap_or_default()
    }

    fn check_failure(state: &MemoryState, name: &str) -> Result<(), Error> {
        if state.failing.contains(name) {
            return Err(Error::provider("memory", format!("injected failure for {}", name)));
        }
        Ok(())
    }
}

fn same_key(rs: &ProviderRecordSet, name: &str, record_type: RecordType) -> bool {
    rs.name == name && RecordType::parse(rs.type_mnemonic()) == Some(record_type)
}

#[async_trait]
impl DnsProvider for MemoryProvider {
    async fn list_records(&self, zone: &str) -> Result<Vec<ProviderRecordSet>, Error> {
        let mut guard = self.inner.write().await;
        guard.calls.push(ProviderCall::List { zone: zone.to_string() });
        guard
            .zones
            .get(zone)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", zone)))
    }

    async fn create_or_update_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        properties: &RecordSetProperties,
    ) -> Result<ProviderRecordSet, Error> {
        let mut guard = self.inner.write().await;
        guard.calls.push(ProviderCall::CreateOrUpdate {
            zone: zone.to_string(),
            name: name.to_string(),
            record_type,
        });
        Self::check_failure(&guard, name)?;

        let records = guard
            .zones
            .get_mut(zone)
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", zone)))?;

        let rs = ProviderRecordSet::new(name, record_type.as_str(), properties.clone());
        match records.iter_mut().find(|r| same_key(r, name, record_type)) {
            Some(existing) => *existing = rs.clone(),
            None => records.push(rs.clone()),
        }
        Ok(rs)
    }

    async fn delete_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.calls.push(ProviderCall::Delete {
            zone: zone.to_string(),
            name: name.to_string(),
            record_type,
        });
        Self::check_failure(&guard, name)?;

        let records = guard
            .zones
            .get_mut(zone)
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", zone)))?;

        let before = records.len();
        records.retain(|r| !same_key(r, name, record_type));
        if records.len() == before {
            return Err(Error::provider(
                "memory",
                format!("record set {} on {} was not deleted", name, record_type),
            ));
        }
        Ok(())
    }

    async fn zone_exists(&self, zone: &str) -> Result<bool, Error> {
        let mut guard = self.inner.write().await;
        guard.calls.push(ProviderCall::ZoneExists { zone: zone.to_string() });
        Ok(guard.zones.contains_key(zone))
    }

    async fn create_zone(&self, zone: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.calls.push(ProviderCall::CreateZone { zone: zone.to_string() });
        guard.zones.entry(zone.to_string()).or_default();
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

/// Factory for in-memory providers
///
/// Each provider starts without zones, so a sync against it creates the zone
/// and every record. Combined with dry-run this checks that a zone file
/// encodes without touching a real provider.
pub struct MemoryProviderFactory;

impl DnsProviderFactory for MemoryProviderFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>, Error> {
        match config {
            ProviderConfig::Memory => Ok(Box::new(MemoryProvider::new())),
            _ => Err(Error::config("Invalid config for memory provider")),
        }
    }
}
