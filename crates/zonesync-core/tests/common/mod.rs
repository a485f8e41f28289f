//! Test doubles and common utilities for reconciliation contract tests

#![allow(dead_code)]

use zonesync_core::wire::{ARecord, CnameRecord, RecordSetProperties};
use zonesync_core::{MemoryProvider, ProviderRecordSet, Reconciler, Record, RecordType, Zone};

pub const ZONE: &str = "example.com";

/// A provider-side A record set
pub fn remote_a(name: &str, ttl: u32, ips: &[&str]) -> ProviderRecordSet {
    let mut props = RecordSetProperties::with_ttl(ttl);
    props.a_records = Some(
        ips.iter()
            .map(|ip| ARecord {
                ipv4_address: ip.to_string(),
            })
            .collect(),
    );
    ProviderRecordSet::new(name, "Microsoft.Network/dnszones/A", props)
}

/// A provider-side CNAME record set
pub fn remote_cname(name: &str, ttl: u32, target: &str) -> ProviderRecordSet {
    let mut props = RecordSetProperties::with_ttl(ttl);
    props.cname_record = Some(CnameRecord {
        cname: target.to_string(),
    });
    ProviderRecordSet::new(name, "Microsoft.Network/dnszones/CNAME", props)
}

/// A provider-side SOA record set, which zonesync never touches
pub fn remote_soa() -> ProviderRecordSet {
    ProviderRecordSet::new(
        "@",
        "Microsoft.Network/dnszones/SOA",
        RecordSetProperties::with_ttl(3600),
    )
}

pub fn a(name: &str, ttl: u32, ips: &[&str]) -> Record {
    Record::new(name, RecordType::A, ttl, ips.iter().copied())
}

pub fn local_zone(records: Vec<Record>) -> Zone {
    Zone::new(ZONE, records).expect("valid local zone")
}

/// A memory provider holding `ZONE` and a reconciler sharing its state
pub fn setup(remote: Vec<ProviderRecordSet>) -> (MemoryProvider, Reconciler) {
    let provider = MemoryProvider::with_zone(ZONE, remote);
    let reconciler = Reconciler::new(Box::new(provider.clone()));
    (provider, reconciler)
}
