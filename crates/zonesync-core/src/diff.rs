//! Diff engine
//!
//! Classifies every record of a local (desired) and remote (current) zone as
//! unchanged, to be created, to be updated or to be deleted. Both zones are
//! borrowed immutably; the result is a [`ChangeSet`] of borrowed records.
//!
//! Phases run in a fixed order:
//!
//! 1. **Delete**: remote keys absent from local
//! 2. **Create**: local keys absent from remote
//! 3. **Update**: remaining local records whose fingerprint differs from the
//!    remote record with the same key
//!
//! A record's fingerprint covers name, type, TTL and all values, so a TTL-only
//! change is an update.

use std::fmt;

use crate::record::Record;
use crate::zone::Zone;

/// Operation a record is marked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Create,
    Update,
    Delete,
}

impl Mark {
    /// Past participle used in status lines
    pub fn verb(&self) -> &'static str {
        match self {
            Mark::Create => "created",
            Mark::Update => "updated",
            Mark::Delete => "deleted",
        }
    }
}

/// One planned provider operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change<'a> {
    pub mark: Mark,
    /// Zone the operation targets
    pub zone_name: &'a str,
    pub record: &'a Record,
}

impl fmt::Display for Change<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} will be {}. Values:\n    TTL: {}",
            self.record.name,
            self.record.record_type,
            self.mark.verb(),
            self.record.ttl()
        )?;
        for value in self.record.values() {
            write!(f, "\n    {}", value)?;
        }
        for caa in self.record.caa_properties() {
            let flags = caa.flags.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
            write!(f, "\n    {} {} \"{}\"", flags, caa.tag, caa.value)?;
        }
        Ok(())
    }
}

/// Result of diffing two zones, each list in listing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet<'a> {
    /// Remote records to delete
    pub deletes: Vec<Change<'a>>,
    /// Local records to create
    pub creates: Vec<Change<'a>>,
    /// Local records to update
    pub updates: Vec<Change<'a>>,
}

impl<'a> ChangeSet<'a> {
    /// Total number of operations
    pub fn len(&self) -> usize {
        self.deletes.len() + self.creates.len() + self.updates.len()
    }

    /// Whether the zones already match
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All operations in execution order: deletes, creates, updates
    pub fn iter(&self) -> impl Iterator<Item = &Change<'a>> {
        self.deletes
            .iter()
            .chain(self.creates.iter())
            .chain(self.updates.iter())
    }

    /// Mark assigned to a key, if any
    pub fn mark_of(&self, name: &str, record_type: crate::RecordType) -> Option<Mark> {
        self.iter()
            .find(|c| c.record.name == name && c.record.record_type == record_type)
            .map(|c| c.mark)
    }
}

/// Compute the operations that turn `remote` into `local`
pub fn diff<'a>(local: &'a Zone, remote: &'a Zone) -> ChangeSet<'a> {
    let mut changes = ChangeSet::default();

    for r in remote.records() {
        if !local.contains(&r.name, r.record_type) {
            changes.deletes.push(Change {
                mark: Mark::Delete,
                zone_name: remote.name(),
                record: r,
            });
        }
    }

    for r in local.records() {
        match remote.get(&r.name, r.record_type) {
            None => changes.creates.push(Change {
                mark: Mark::Create,
                zone_name: local.name(),
                record: r,
            }),
            Some(current) if current.fingerprint() != r.fingerprint() => {
                changes.updates.push(Change {
                    mark: Mark::Update,
                    zone_name: local.name(),
                    record: r,
                })
            }
            Some(_) => {}
        }
    }

    tracing::debug!(
        "Diff {}: {} delete(s), {} create(s), {} update(s)",
        local.name(),
        changes.deletes.len(),
        changes.creates.len(),
        changes.updates.len()
    );

    changes
}
