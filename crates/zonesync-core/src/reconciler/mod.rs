//! Reconciler
//!
//! The Reconciler applies a [`ChangeSet`] to a provider.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐        ┌─────────────┐
//! │ local Zone  │        │ remote Zone │◄── DnsProvider::list_records
//! └─────────────┘        └─────────────┘
//!        │                      │
//!        └──────────┬───────────┘
//!                   ▼
//!            ┌─────────────┐
//!            │    diff     │
//!            └─────────────┘
//!                   │ ChangeSet
//!                   ▼
//!            ┌─────────────┐
//!            │ Reconciler  │─── delete / create_or_update ──► DnsProvider
//!            └─────────────┘
//! ```
//!
//! ## Ordering
//!
//! 1. Deletes (remote listing order)
//! 2. Creates (local listing order)
//! 3. Updates (local listing order)
//!
//! Deletes go first so a key that changes type never collides with the old
//! record set at the provider.
//!
//! ## Failure
//!
//! Fail-fast: the first error stops the current phase and skips the rest.
//! Operations already applied stay applied; nothing is rolled back or
//! retried. Encoding happens right before each dispatch, so a malformed
//! record fails before its provider call.

use crate::codec;
use crate::config::SyncConfig;
use crate::diff::{Change, ChangeSet, Mark, diff};
use crate::error::Result;
use crate::traits::DnsProvider;
use crate::zone::Zone;
use tracing::{debug, info, warn};

/// Outcome of one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Number of record sets deleted
    pub deleted: usize,
    /// Number of record sets created
    pub created: usize,
    /// Number of record sets updated
    pub updated: usize,
    /// Whether provider mutations were suppressed
    pub dry_run: bool,
}

impl ReconcileReport {
    /// Total operations applied (or planned, in dry-run mode)
    pub fn total(&self) -> usize {
        self.deleted + self.created + self.updated
    }

    /// Whether the zones already matched
    pub fn is_unchanged(&self) -> bool {
        self.total() == 0
    }
}

/// Drives a provider to match a local zone
///
/// ## Threading
///
/// Every provider call is awaited before the next one starts; there is no
/// concurrency inside a reconciliation.
pub struct Reconciler {
    /// DNS provider for reading and mutating records
    provider: Box<dyn DnsProvider>,

    /// Log changes without calling mutating provider methods
    dry_run: bool,

    /// Create the remote zone when it does not exist
    create_missing_zone: bool,
}

impl Reconciler {
    /// Create a reconciler with default settings
    pub fn new(provider: Box<dyn DnsProvider>) -> Self {
        Self::with_config(provider, &SyncConfig::default())
    }

    /// Create a reconciler from sync settings
    pub fn with_config(provider: Box<dyn DnsProvider>, config: &SyncConfig) -> Self {
        Self {
            provider,
            dry_run: config.dry_run,
            create_missing_zone: config.create_missing_zone,
        }
    }

    /// The underlying provider
    pub fn provider(&self) -> &dyn DnsProvider {
        self.provider.as_ref()
    }

    /// Whether provider mutations are suppressed
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// List and decode the remote zone
    pub async fn fetch_zone(&self, name: &str) -> Result<Zone> {
        Zone::fetch(self.provider.as_ref(), name).await
    }

    /// Make sure the remote zone exists
    ///
    /// Returns `true` when the zone had to be created. A missing zone is only
    /// created when `create_missing_zone` is set; otherwise it is an error.
    pub async fn ensure_zone(&self, name: &str) -> Result<bool> {
        if self.provider.zone_exists(name).await? {
            debug!("Zone {} exists at {}", name, self.provider.provider_name());
            return Ok(false);
        }

        if !self.create_missing_zone {
            return Err(crate::Error::not_found(format!(
                "Zone {} does not exist at {}",
                name,
                self.provider.provider_name()
            )));
        }

        if self.dry_run {
            info!("[DRY-RUN] Would create zone {}", name);
            return Ok(true);
        }

        self.provider.create_zone(name).await?;
        info!("New zone has been created: {}", name);
        Ok(true)
    }

    /// Reconcile the remote zone with `local`
    ///
    /// Ensures the zone exists, fetches and decodes its current records,
    /// diffs and applies.
    pub async fn sync(&self, local: &Zone) -> Result<ReconcileReport> {
        let created = self.ensure_zone(local.name()).await?;

        let remote = if created && self.dry_run {
            Zone::empty(local.name())?
        } else {
            self.fetch_zone(local.name()).await?
        };

        let changes = diff(local, &remote);
        self.apply(&changes).await
    }

    /// Execute a change set: deletes, then creates, then updates
    pub async fn apply(&self, changes: &ChangeSet<'_>) -> Result<ReconcileReport> {
        let mut report = ReconcileReport {
            dry_run: self.dry_run,
            ..ReconcileReport::default()
        };

        if changes.is_empty() {
            info!("No change");
            return Ok(report);
        }

        info!(
            "Applying {} change(s) via {}{}",
            changes.len(),
            self.provider.provider_name(),
            if self.dry_run { " [DRY-RUN]" } else { "" }
        );

        for change in &changes.deletes {
            self.apply_change(change).await?;
            report.deleted += 1;
        }

        for change in &changes.creates {
            self.apply_change(change).await?;
            report.created += 1;
        }

        for change in &changes.updates {
            self.apply_change(change).await?;
            report.updated += 1;
        }

        Ok(report)
    }

    /// Perform a single provider operation
    async fn apply_change(&self, change: &Change<'_>) -> Result<()> {
        info!("{}", change);

        let record = change.record;
        let result = match change.mark {
            Mark::Delete => {
                if self.dry_run {
                    info!("[DRY-RUN] Would delete {} on {}", record.name, record.record_type);
                    return Ok(());
                }
                self.provider
                    .delete_record(change.zone_name, &record.name, record.record_type)
                    .await
                    .map(|()| format!("Deleted {} on {}", record.name, record.record_type))
            }
            Mark::Create | Mark::Update => {
                let body = codec::encode(record)?;
                if self.dry_run {
                    info!(
                        "[DRY-RUN] Would send {} on {}: {}",
                        record.name,
                        record.record_type,
                        serde_json::to_string(&body)?
                    );
                    return Ok(());
                }
                self.provider
                    .create_or_update_record(
                        change.zone_name,
                        &record.name,
                        record.record_type,
                        &body,
                    )
                    .await
                    .map(|rs| {
                        let verb = if change.mark == Mark::Create { "Created" } else { "Updated" };
                        format!("{} {} on {}", verb, rs.name, rs.type_mnemonic())
                    })
            }
        };

        match result {
            Ok(message) => {
                info!("{}", message);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Failed to apply {:?} for {} on {}: {}",
                    change.mark, record.name, record.record_type, e
                );
                Err(e)
            }
        }
    }
}
