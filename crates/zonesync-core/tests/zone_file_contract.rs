//! Contract Test: Zone Files
//!
//! Constraints verified:
//! - A saved zone loads back unchanged
//! - A fetched remote zone can be saved as the next desired state
//! - Duplicate keys and foreign zone names are rejected on load
//! - Saving never leaves a temporary file behind

mod common;

use common::*;
use tempfile::TempDir;
use zonesync_core::{CaaProperty, Error, Record, RecordType, Zone, diff};

#[tokio::test]
async fn saved_zone_loads_back() {
    let dir = TempDir::new().unwrap();
    let zone = local_zone(vec![
        a("www", 300, &["1.2.3.4", "5.6.7.8"]),
        Record::new("@", RecordType::Mx, 3600, ["10 mail.example.com"]),
        Record::caa("@", 3600, vec![CaaProperty::new(0, "issue", "letsencrypt.org")]),
    ]);

    let path = zone.save(dir.path()).await.unwrap();
    assert_eq!(path, dir.path().join("example.com.yaml"));
    assert!(!dir.path().join("example.com.yaml.tmp").exists());

    let loaded = Zone::load(dir.path(), ZONE).await.unwrap();
    assert_eq!(loaded, zone);
}

#[tokio::test]
async fn fetched_zone_saved_then_synced_is_no_change() {
    let dir = TempDir::new().unwrap();
    let (provider, reconciler) = setup(vec![
        remote_soa(),
        remote_a("www", 300, &["1.2.3.4"]),
        remote_cname("api", 60, "backend.example.net"),
    ]);

    let remote = reconciler.fetch_zone(ZONE).await.unwrap();
    remote.save(dir.path()).await.unwrap();

    let local = Zone::load(dir.path(), ZONE).await.unwrap();
    assert!(diff(&local, &remote).is_empty());

    let report = reconciler.sync(&local).await.unwrap();
    assert!(report.is_unchanged());
    assert!(provider.mutations().await.is_empty());
}

#[tokio::test]
async fn missing_zone_file_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let err = Zone::load(dir.path(), "absent.example").await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn duplicate_key_in_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let yaml = r#"
Zone: example.com
RecordSets:
- Name: www
  Type: A
  Properties:
    TTL: 300
    Values:
    - 1.2.3.4
- Name: www
  Type: A
  Properties:
    TTL: 600
    Values:
    - 5.6.7.8
"#;
    tokio::fs::write(dir.path().join("example.com.yaml"), yaml)
        .await
        .unwrap();

    let err = Zone::load(dir.path(), ZONE).await.unwrap_err();
    match err {
        Error::DuplicateRecord { name, record_type } => {
            assert_eq!(name, "www");
            assert_eq!(record_type, "A");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn file_for_another_zone_is_rejected() {
    let dir = TempDir::new().unwrap();
    tokio::fs::write(
        dir.path().join("example.com.yaml"),
        "Zone: example.org\nRecordSets: []\n",
    )
    .await
    .unwrap();

    assert!(Zone::load(dir.path(), ZONE).await.is_err());
}

#[tokio::test]
async fn empty_file_is_an_empty_zone() {
    let dir = TempDir::new().unwrap();
    tokio::fs::write(dir.path().join("example.com.yaml"), "")
        .await
        .unwrap();

    let zone = Zone::load(dir.path(), ZONE).await.unwrap();
    assert!(zone.is_empty());
    assert_eq!(zone.name(), ZONE);
}

#[tokio::test]
async fn missing_ttl_defaults_on_load() {
    let dir = TempDir::new().unwrap();
    let yaml = "Zone: example.com\nRecordSets:\n- Name: www\n  Type: A\n  Properties:\n    Values:\n    - 1.2.3.4\n";
    tokio::fs::write(dir.path().join("example.com.yaml"), yaml)
        .await
        .unwrap();

    let zone = Zone::load(dir.path(), ZONE).await.unwrap();
    assert_eq!(zone.get("www", RecordType::A).unwrap().ttl(), 3600);
}

#[tokio::test]
async fn unmanaged_types_in_file_are_skipped() {
    let dir = TempDir::new().unwrap();
    let yaml = r#"
Zone: example.com
RecordSets:
- Name: _sip._tcp
  Type: SRV
  Properties:
    TTL: 300
    Values:
    - 10 60 5060 sip.example.com
- Name: www
  Type: A
  Properties:
    TTL: 300
    Values:
    - 1.2.3.4
- Name: 4.3.2.1.in-addr.arpa
  Type: ptr
  Properties:
    Values:
    - host.example.com
"#;
    tokio::fs::write(dir.path().join("example.com.yaml"), yaml)
        .await
        .unwrap();

    let local = Zone::load(dir.path(), ZONE).await.unwrap();
    assert_eq!(local.len(), 1);
    assert!(local.contains("www", RecordType::A));

    let (provider, reconciler) = setup(Vec::new());
    let report = reconciler.sync(&local).await.unwrap();
    assert_eq!(report.total(), 1);

    let mutations = provider.mutations().await;
    assert_eq!(mutations.len(), 1);
    assert!(mutations.iter().all(|call| !format!("{call:?}").contains("_sip._tcp")));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn failed_write_removes_temp_file() {
    if !std::path::Path::new("/dev/full").exists() {
        return;
    }

    let dir = TempDir::new().unwrap();
    let tmp = dir.path().join("example.com.yaml.tmp");
    // Every write to /dev/full fails with ENOSPC
    std::os::unix::fs::symlink("/dev/full", &tmp).unwrap();

    let zone = local_zone(vec![a("www", 300, &["1.2.3.4"])]);
    assert!(zone.save(dir.path()).await.is_err());

    assert!(tmp.symlink_metadata().is_err());
    assert!(!dir.path().join("example.com.yaml").exists());
}
