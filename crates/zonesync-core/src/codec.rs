//! Record codec
//!
//! Translates between provider-native record sets ([`ProviderRecordSet`]) and
//! canonical [`Record`]s. This is the only module that knows type-specific
//! layouts:
//!
//! | Type  | Canonical value               | Provider entry                  |
//! |-------|-------------------------------|---------------------------------|
//! | A     | IPv4 address                  | `ARecords[].ipv4Address`        |
//! | AAAA  | IPv6 address                  | `AAAARecords[].ipv6Address`     |
//! | CNAME | exactly one target            | `CNAMERecord.cname`             |
//! | MX    | `"<preference> <exchange>"`   | `MXRecords[]`                   |
//! | NS    | name server host              | `NSRecords[].nsdname`           |
//! | TXT   | full string                   | `TXTRecords[].value` (segments) |
//! | CAA   | `CaaProperties` triple        | `caaRecords[]`                  |
//!
//! Record sets of any other type decode to `None` and are left alone.

use crate::error::{Error, Result};
use crate::record::{CaaProperty, Record, RecordProperties, RecordType};
use crate::wire::{
    ARecord, AaaaRecord, CaaRecord, CnameRecord, MxRecord, NsRecord, ProviderRecordSet,
    RecordSetProperties, TxtRecord,
};

/// Maximum length of one TXT character-string, in code points
pub const TXT_SEGMENT_LEN: usize = 255;

/// Decode a provider record set into a canonical record
///
/// Returns `Ok(None)` for record types zonesync does not manage.
pub fn decode(rs: &ProviderRecordSet) -> Result<Option<Record>> {
    let Some(record_type) = RecordType::parse(rs.type_mnemonic()) else {
        tracing::debug!("Skipping unmanaged record set {} on {}", rs.name, rs.type_mnemonic());
        return Ok(None);
    };

    let props = &rs.properties;
    let ttl = decode_ttl(rs)?;
    let mut values = Vec::new();
    let mut caa_properties = Vec::new();

    match record_type {
        RecordType::A => {
            values.extend(
                props.a_records.iter().flatten().map(|r| r.ipv4_address.clone()),
            );
        }
        RecordType::Aaaa => {
            values.extend(
                props.aaaa_records.iter().flatten().map(|r| r.ipv6_address.clone()),
            );
        }
        RecordType::Cname => {
            values.extend(props.cname_record.as_ref().map(|r| r.cname.clone()));
        }
        RecordType::Mx => {
            values.extend(
                props
                    .mx_records
                    .iter()
                    .flatten()
                    .map(|r| format!("{} {}", r.preference, r.exchange)),
            );
        }
        RecordType::Ns => {
            values.extend(props.ns_records.iter().flatten().map(|r| r.nsdname.clone()));
        }
        RecordType::Txt => {
            values.extend(props.txt_records.iter().flatten().map(|r| r.value.concat()));
        }
        RecordType::Caa => {
            for r in props.caa_records.iter().flatten() {
                let flags = r
                    .flags
                    .map(|f| {
                        u8::try_from(f).map_err(|_| {
                            Error::provider(
                                "codec",
                                format!("CAA flags out of range on {}: {}", rs.name, f),
                            )
                        })
                    })
                    .transpose()?;
                caa_properties.push(CaaProperty {
                    flags,
                    tag: r.tag.clone(),
                    value: r.value.clone(),
                });
            }
        }
    }

    Ok(Some(Record {
        name: rs.name.clone(),
        record_type,
        properties: RecordProperties {
            ttl,
            values,
            caa_properties,
        },
    }))
}

fn decode_ttl(rs: &ProviderRecordSet) -> Result<u32> {
    let ttl = rs.properties.ttl.ok_or_else(|| {
        Error::provider("codec", format!("record set {} has no TTL", rs.name))
    })?;

    u32::try_from(ttl).map_err(|_| {
        Error::provider("codec", format!("record set {} has invalid TTL {}", rs.name, ttl))
    })
}

/// Encode a canonical record into a provider record set body
///
/// Fails with [`Error::Validation`] when the record cannot be represented:
/// a CNAME without exactly one value, an MX value without a numeric
/// preference or exchange host, an empty TXT string or a CAA property
/// without flags.
pub fn encode(record: &Record) -> Result<RecordSetProperties> {
    let mut body = RecordSetProperties::with_ttl(record.ttl());
    let values = record.values();

    match record.record_type {
        RecordType::A => {
            body.a_records = Some(
                values
                    .iter()
                    .map(|v| ARecord {
                        ipv4_address: v.clone(),
                    })
                    .collect(),
            );
        }
        RecordType::Aaaa => {
            body.aaaa_records = Some(
                values
                    .iter()
                    .map(|v| AaaaRecord {
                        ipv6_address: v.clone(),
                    })
                    .collect(),
            );
        }
        RecordType::Cname => {
            let [target] = values else {
                return Err(Error::validation(format!(
                    "{} on CNAME needs exactly one value, found {}",
                    record.name,
                    values.len()
                )));
            };
            body.cname_record = Some(CnameRecord {
                cname: target.clone(),
            });
        }
        RecordType::Mx => {
            body.mx_records = Some(
                values
                    .iter()
                    .map(|v| encode_mx(&record.name, v))
                    .collect::<Result<_>>()?,
            );
        }
        RecordType::Ns => {
            body.ns_records = Some(
                values
                    .iter()
                    .map(|v| NsRecord { nsdname: v.clone() })
                    .collect(),
            );
        }
        RecordType::Txt => {
            let mut entries = Vec::with_capacity(values.len());
            for v in values {
                let segments = split_txt(v, TXT_SEGMENT_LEN);
                if segments.is_empty() {
                    return Err(Error::validation(format!(
                        "{} on TXT contains an empty value",
                        record.name
                    )));
                }
                entries.push(TxtRecord { value: segments });
            }
            body.txt_records = Some(entries);
        }
        RecordType::Caa => {
            body.caa_records = Some(
                record
                    .caa_properties()
                    .iter()
                    .map(|p| {
                        let flags = p.flags.ok_or_else(|| {
                            Error::validation(format!(
                                "{} on CAA: property '{}' has no flags",
                                record.name, p.tag
                            ))
                        })?;
                        Ok(CaaRecord {
                            flags: Some(i32::from(flags)),
                            tag: p.tag.clone(),
                            value: p.value.clone(),
                        })
                    })
                    .collect::<Result<_>>()?,
            );
        }
    }

    Ok(body)
}

/// Parse `"<preference> <exchange>"`, splitting on the first space only
fn encode_mx(name: &str, value: &str) -> Result<MxRecord> {
    let (preference, exchange) = value.split_once(' ').ok_or_else(|| {
        Error::validation(format!(
            "{} on MX: '{}' is not in '<preference> <exchange>' form",
            name, value
        ))
    })?;

    let preference = preference.parse::<i32>().map_err(|e| {
        Error::validation(format!(
            "{} on MX: invalid preference '{}': {}",
            name, preference, e
        ))
    })?;

    if exchange.is_empty() || exchange.starts_with(char::is_whitespace) {
        return Err(Error::validation(format!(
            "{} on MX: '{}' needs exactly one space before the exchange host",
            name, value
        )));
    }

    Ok(MxRecord {
        preference,
        exchange: exchange.to_string(),
    })
}

/// Split a string into chunks of at most `n` code points, in order
///
/// The empty string yields no chunks.
pub fn split_txt(s: &str, n: usize) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(n.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}
