//! Provider-native record set representation
//!
//! These types follow the JSON shape of the Azure DNS record set resource,
//! which is also what [`crate::MemoryProvider`] stores. Type-specific arrays
//! the provider sends for unmanaged types (SOA, PTR, SRV, ...) are ignored on
//! deserialization.

use serde::{Deserialize, Serialize};

/// One record set as listed or returned by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecordSet {
    /// Provider resource identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Relative record name
    pub name: String,

    /// Record type, either bare (`A`) or qualified
    /// (`Microsoft.Network/dnszones/A`)
    #[serde(rename = "type")]
    pub record_type: String,

    /// Entity tag for optimistic concurrency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// TTL and type-specific payload
    #[serde(default)]
    pub properties: RecordSetProperties,
}

impl ProviderRecordSet {
    /// Create a record set with a bare type mnemonic
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<String>,
        properties: RecordSetProperties,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            record_type: record_type.into(),
            etag: None,
            properties,
        }
    }

    /// The type mnemonic with any resource-provider prefix stripped
    pub fn type_mnemonic(&self) -> &str {
        self.record_type
            .rsplit('/')
            .next()
            .unwrap_or(&self.record_type)
    }
}

/// Encoded body of a record set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSetProperties {
    /// Time-to-live in seconds
    #[serde(rename = "TTL", default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,

    /// Fully qualified name, output only
    #[serde(default, skip_serializing)]
    pub fqdn: Option<String>,

    #[serde(rename = "ARecords", default, skip_serializing_if = "Option::is_none")]
    pub a_records: Option<Vec<ARecord>>,

    #[serde(rename = "AAAARecords", default, skip_serializing_if = "Option::is_none")]
    pub aaaa_records: Option<Vec<AaaaRecord>>,

    #[serde(rename = "CNAMERecord", default, skip_serializing_if = "Option::is_none")]
    pub cname_record: Option<CnameRecord>,

    #[serde(rename = "MXRecords", default, skip_serializing_if = "Option::is_none")]
    pub mx_records: Option<Vec<MxRecord>>,

    #[serde(rename = "NSRecords", default, skip_serializing_if = "Option::is_none")]
    pub ns_records: Option<Vec<NsRecord>>,

    #[serde(rename = "TXTRecords", default, skip_serializing_if = "Option::is_none")]
    pub txt_records: Option<Vec<TxtRecord>>,

    #[serde(rename = "caaRecords", default, skip_serializing_if = "Option::is_none")]
    pub caa_records: Option<Vec<CaaRecord>>,
}

impl RecordSetProperties {
    /// Empty body with only the TTL set
    pub fn with_ttl(ttl: u32) -> Self {
        Self {
            ttl: Some(i64::from(ttl)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ARecord {
    pub ipv4_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AaaaRecord {
    pub ipv6_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CnameRecord {
    pub cname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxRecord {
    pub preference: i32,
    pub exchange: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NsRecord {
    pub nsdname: String,
}

/// One logical TXT value split into ordered segments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxtRecord {
    pub value: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaaRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<i32>,
    pub tag: String,
    pub value: String,
}
