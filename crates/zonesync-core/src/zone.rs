// # Zone Model
//
// An ordered collection of canonical records under one zone name.
//
// ## Sources
//
// - Local: `<zones_dir>/<zone>.yaml`, the human-edited desired state
// - Remote: the provider listing, decoded through the codec
//
// Both are rebuilt on every run; a `Zone` never outlives one get/sync.
//
// ## File Format
//
// ```yaml
// Zone: example.com
// RecordSets:
// - Name: www
//   Type: A
//   Properties:
//     TTL: 300
//     Values:
//     - 1.2.3.4
// - Name: '@'
//   Type: CAA
//   Properties:
//     TTL: 3600
//     CaaProperties:
//     - Flags: 0
//       Tag: issue
//       Value: letsencrypt.org
// ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::codec;
use crate::error::{Error, Result};
use crate::record::{Record, RecordProperties, RecordType};
use crate::traits::DnsProvider;
use crate::wire::ProviderRecordSet;

/// A named, ordered set of records with unique `(name, type)` keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    #[serde(rename = "Zone")]
    name: String,

    #[serde(rename = "RecordSets")]
    records: Vec<Record>,
}

/// On-disk document, validated into a [`Zone`]
#[derive(Debug, Deserialize)]
struct ZoneDocument {
    #[serde(rename = "Zone")]
    name: Option<String>,

    #[serde(rename = "RecordSets", default)]
    records: Vec<DocumentRecord>,
}

/// One zone file entry before its type is checked
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DocumentRecord {
    name: String,

    #[serde(rename = "Type")]
    record_type: String,

    properties: RecordProperties,
}

impl DocumentRecord {
    /// The canonical record, or `None` for a type zonesync does not manage
    fn into_record(self) -> Option<Record> {
        let Some(record_type) = RecordType::parse(&self.record_type) else {
            tracing::debug!(
                "Skipping unmanaged record set {} on {} in zone file",
                self.name,
                self.record_type
            );
            return None;
        };

        Some(Record {
            name: self.name,
            record_type,
            properties: self.properties,
        })
    }
}

impl Zone {
    /// Build a zone, rejecting duplicate keys and malformed records
    ///
    /// Two records sharing `(name, type)` fail with
    /// [`Error::DuplicateRecord`] naming the second occurrence.
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::config("zone name cannot be empty"));
        }

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            record.validate()?;
            if !seen.insert(record.key()) {
                return Err(Error::DuplicateRecord {
                    name: record.name.clone(),
                    record_type: record.record_type.to_string(),
                });
            }
        }

        Ok(Self { name, records })
    }

    /// An empty zone
    pub fn empty(name: impl Into<String>) -> Result<Self> {
        Self::new(name, Vec::new())
    }

    /// Decode a provider listing, skipping unmanaged types
    pub fn from_provider(name: impl Into<String>, listing: &[ProviderRecordSet]) -> Result<Self> {
        let mut records = Vec::with_capacity(listing.len());
        for rs in listing {
            if let Some(record) = codec::decode(rs)? {
                records.push(record);
            }
        }
        Self::new(name, records)
    }

    /// List and decode the remote state of a zone
    pub async fn fetch(provider: &dyn DnsProvider, name: &str) -> Result<Self> {
        let listing = provider.list_records(name).await?;
        tracing::debug!(
            "Listed {} record set(s) in {} from {}",
            listing.len(),
            name,
            provider.provider_name()
        );
        Self::from_provider(name, &listing)
    }

    /// Parse a zone document
    ///
    /// An empty document is a zone without records. When the document names
    /// its zone, the name must match `name`. Entries of unmanaged types
    /// (SRV, PTR, ...) are skipped.
    pub fn from_yaml(name: &str, yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Self::empty(name);
        }

        let doc: ZoneDocument = serde_yaml::from_str(yaml)?;
        if let Some(ref declared) = doc.name
            && declared != name
        {
            return Err(Error::config(format!(
                "zone file declares '{}' but '{}' was requested",
                declared, name
            )));
        }

        let records = doc
            .records
            .into_iter()
            .filter_map(DocumentRecord::into_record)
            .collect();
        Self::new(name, records)
    }

    /// Serialize to the zone file format
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Path of the zone file for `name` under `dir`
    pub fn file_path(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{}.yaml", name))
    }

    /// Load `<dir>/<name>.yaml`
    pub async fn load(dir: &Path, name: &str) -> Result<Self> {
        let path = Self::file_path(dir, name);
        let yaml = fs::read_to_string(&path).await.map_err(|e| {
            Error::config(format!("Failed to read zone file {}: {}", path.display(), e))
        })?;
        tracing::debug!("Loaded zone file {}", path.display());
        Self::from_yaml(name, &yaml)
    }

    /// Write `<dir>/<name>.yaml` atomically
    ///
    /// The document goes to a temporary file that is then renamed over the
    /// target, so a crash never leaves a half-written zone file.
    pub async fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = Self::file_path(dir, &self.name);
        let tmp = path.with_extension("yaml.tmp");
        let yaml = self.to_yaml()?;

        if let Err(e) = Self::write_file(&tmp, yaml.as_bytes()).await {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                tracing::warn!("Failed to remove temp file {}: {}", tmp.display(), cleanup);
            }
            return Err(e);
        }

        fs::rename(&tmp, &path).await?;
        tracing::info!("Wrote zone file {}", path.display());
        Ok(path)
    }

    async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
        let mut file = fs::File::create(path).await?;
        file.write_all(contents).await?;
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }

    /// Zone name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records in listing order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Look up a record by key
    pub fn get(&self, name: &str, record_type: RecordType) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| r.name == name && r.record_type == record_type)
    }

    /// Whether a record with this key exists
    pub fn contains(&self, name: &str, record_type: RecordType) -> bool {
        self.get(name, record_type).is_some()
    }

    /// Every NS host name in the zone, in listing order
    pub fn name_servers(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.record_type == RecordType::Ns)
            .flat_map(|r| r.values().iter().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
