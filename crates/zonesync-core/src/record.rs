//! Canonical record model
//!
//! A [`Record`] is one DNS record set in a provider-agnostic form. The field
//! names mirror the YAML zone file, so the same type is used for parsing the
//! local zone, for the decoded remote zone and for `get` output.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{Error, Result};

/// TTL applied when a zone file omits one
pub const DEFAULT_TTL: u32 = 3600;

/// Record types managed by zonesync
///
/// Every other provider type (SOA, PTR, SRV, ...) is inert: it is never
/// decoded into a zone and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address
    A,
    /// IPv6 address
    Aaaa,
    /// Canonical name
    Cname,
    /// Mail exchange
    Mx,
    /// Name server
    Ns,
    /// Text
    Txt,
    /// Certification Authority Authorization
    Caa,
}

impl RecordType {
    /// All managed types
    pub const ALL: [RecordType; 7] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Cname,
        RecordType::Mx,
        RecordType::Ns,
        RecordType::Txt,
        RecordType::Caa,
    ];

    /// The type mnemonic as used in zone files and provider URLs
    pub const fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Txt => "TXT",
            RecordType::Caa => "CAA",
        }
    }

    /// Parse a type mnemonic, case-insensitively
    ///
    /// Returns `None` for any type zonesync does not manage.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One CAA property: `flags tag "value"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CaaProperty {
    /// Flags byte; required for encoding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u8>,
    /// Property tag (`issue`, `issuewild`, `iodef`)
    pub tag: String,
    /// Property value
    pub value: String,
}

impl CaaProperty {
    /// Create a CAA property with flags set
    pub fn new(flags: u8, tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            flags: Some(flags),
            tag: tag.into(),
            value: value.into(),
        }
    }
}

/// Type-dependent payload of a record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordProperties {
    /// Time-to-live in seconds
    #[serde(rename = "TTL", default = "default_ttl")]
    pub ttl: u32,

    /// Ordered values for every type except CAA
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    /// Ordered CAA triples, only for CAA
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caa_properties: Vec<CaaProperty>,
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

/// One DNS record set, keyed by `(name, record_type)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    /// Relative record name (`@` for the apex)
    pub name: String,

    /// Record type
    #[serde(rename = "Type")]
    pub record_type: RecordType,

    /// TTL and values
    pub properties: RecordProperties,
}

impl Record {
    /// Create a record carrying plain values
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        ttl: u32,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            properties: RecordProperties {
                ttl,
                values: values.into_iter().map(Into::into).collect(),
                caa_properties: Vec::new(),
            },
        }
    }

    /// Create a CAA record
    pub fn caa(name: impl Into<String>, ttl: u32, properties: Vec<CaaProperty>) -> Self {
        Self {
            name: name.into(),
            record_type: RecordType::Caa,
            properties: RecordProperties {
                ttl,
                values: Vec::new(),
                caa_properties: properties,
            },
        }
    }

    /// The identity key of this record within a zone
    pub fn key(&self) -> (&str, RecordType) {
        (&self.name, self.record_type)
    }

    /// TTL in seconds
    pub fn ttl(&self) -> u32 {
        self.properties.ttl
    }

    /// Plain values (empty for CAA)
    pub fn values(&self) -> &[String] {
        &self.properties.values
    }

    /// CAA triples (empty for every other type)
    pub fn caa_properties(&self) -> &[CaaProperty] {
        &self.properties.caa_properties
    }

    /// Check that the payload matches the type
    ///
    /// CAA records carry only `CaaProperties`; every other type carries
    /// only `Values`.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::validation(format!(
                "record set of type {} has an empty name",
                self.record_type
            )));
        }

        match self.record_type {
            RecordType::Caa if !self.properties.values.is_empty() => Err(Error::validation(
                format!("{} on CAA must use CaaProperties, not Values", self.name),
            )),
            RecordType::Caa => Ok(()),
            other if !self.properties.caa_properties.is_empty() => Err(Error::validation(
                format!("{} on {} cannot carry CaaProperties", self.name, other),
            )),
            _ => Ok(()),
        }
    }

    /// SHA-256 over every field of the record
    ///
    /// Covers name, type, TTL and every value in order, so any field change
    /// yields a different fingerprint. Strings are length-prefixed so
    /// `["ab", "c"]` and `["a", "bc"]` hash differently.
    pub fn fingerprint(&self) -> String {
        fn field(hasher: &mut Sha256, bytes: &[u8]) {
            hasher.update((bytes.len() as u64).to_be_bytes());
            hasher.update(bytes);
        }

        let mut hasher = Sha256::new();
        field(&mut hasher, self.name.as_bytes());
        field(&mut hasher, self.record_type.as_str().as_bytes());
        hasher.update(self.properties.ttl.to_be_bytes());

        hasher.update((self.properties.values.len() as u64).to_be_bytes());
        for value in &self.properties.values {
            field(&mut hasher, value.as_bytes());
        }

        hasher.update((self.properties.caa_properties.len() as u64).to_be_bytes());
        for caa in &self.properties.caa_properties {
            match caa.flags {
                Some(flags) => hasher.update([1, flags]),
                None => hasher.update([0, 0]),
            }
            field(&mut hasher, caa.tag.as_bytes());
            field(&mut hasher, caa.value.as_bytes());
        }

        format!("{:x}", hasher.finalize())
    }
}
