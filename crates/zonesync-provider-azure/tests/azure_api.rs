//! Contract Test: Azure DNS REST API
//!
//! Constraints verified:
//! - Listing follows `nextLink` until the service stops returning one
//! - Writes send `{"properties": ...}` to `.../{TYPE}/{name}`
//! - Only `200 OK` confirms a deletion
//! - Status codes map to the matching error kinds
//! - A full sync against the API makes only the planned calls

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zonesync_core::codec;
use zonesync_core::{DnsProvider, Error, Reconciler, Record, RecordType, Zone};
use zonesync_provider_azure::AzureDnsProvider;

const ZONE_PATH: &str =
    "/subscriptions/sub-1/resourceGroups/dns-rg/providers/Microsoft.Network/dnsZones/example.com";

fn provider(server: &MockServer) -> AzureDnsProvider {
    AzureDnsProvider::new("sub-1", "dns-rg", "test-token")
        .unwrap()
        .with_endpoint(server.uri())
}

fn a_record_set(name: &str, ttl: u32, ip: &str) -> serde_json::Value {
    json!({
        "id": format!("{}/A/{}", ZONE_PATH, name),
        "name": name,
        "type": "Microsoft.Network/dnszones/A",
        "etag": "etag-1",
        "properties": {
            "TTL": ttl,
            "fqdn": format!("{}.example.com.", name),
            "provisioningState": "Succeeded",
            "ARecords": [ { "ipv4Address": ip } ]
        }
    })
}

fn soa_record_set() -> serde_json::Value {
    json!({
        "name": "@",
        "type": "Microsoft.Network/dnszones/SOA",
        "properties": {
            "TTL": 3600,
            "SOARecord": { "host": "ns1-01.azure-dns.com.", "email": "azuredns-hostmaster.microsoft.com" }
        }
    })
}

#[tokio::test]
async fn listing_follows_next_link() {
    let server = MockServer::start().await;

    let next_link = format!(
        "{}{}/recordsets?api-version=2018-05-01&$skipToken=page2",
        server.uri(),
        ZONE_PATH
    );

    Mock::given(method("GET"))
        .and(path(format!("{}/recordsets", ZONE_PATH)))
        .and(query_param("$top", "100"))
        .and(query_param("api-version", "2018-05-01"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [ soa_record_set(), a_record_set("www", 300, "1.2.3.4") ],
            "nextLink": next_link
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/recordsets", ZONE_PATH)))
        .and(query_param("$skipToken", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [ a_record_set("old", 60, "5.6.7.8") ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = provider(&server).list_records("example.com").await.unwrap();
    let names: Vec<&str> = records.iter().map(|rs| rs.name.as_str()).collect();
    assert_eq!(names, vec!["@", "www", "old"]);

    let zone = Zone::from_provider("example.com", &records).unwrap();
    assert_eq!(zone.len(), 2);
    assert_eq!(zone.get("old", RecordType::A).unwrap().ttl(), 60);
}

#[tokio::test]
async fn missing_zone_listing_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/recordsets", ZONE_PATH)))
        .respond_with(ResponseTemplate::new(404).set_body_string("ResourceNotFound"))
        .mount(&server)
        .await;

    let err = provider(&server).list_records("example.com").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn put_sends_encoded_properties() {
    let server = MockServer::start().await;

    let record = Record::new("_dmarc", RecordType::Txt, 300, ["v=DMARC1; p=none"]);
    let body = codec::encode(&record).unwrap();

    Mock::given(method("PUT"))
        .and(path(format!("{}/TXT/_dmarc", ZONE_PATH)))
        .and(query_param("api-version", "2018-05-01"))
        .and(body_json(json!({
            "properties": {
                "TTL": 300,
                "TXTRecords": [ { "value": ["v=DMARC1; p=none"] } ]
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "_dmarc",
            "type": "Microsoft.Network/dnszones/TXT",
            "etag": "etag-2",
            "properties": { "TTL": 300, "TXTRecords": [ { "value": ["v=DMARC1; p=none"] } ] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rs = provider(&server)
        .create_or_update_record("example.com", "_dmarc", RecordType::Txt, &body)
        .await
        .unwrap();
    assert_eq!(rs.type_mnemonic(), "TXT");
    assert_eq!(rs.etag.as_deref(), Some("etag-2"));
}

#[tokio::test]
async fn put_rejected_by_service_is_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("{}/CNAME/www", ZONE_PATH)))
        .respond_with(ResponseTemplate::new(400).set_body_string("BadRequest: CNAME at apex"))
        .mount(&server)
        .await;

    let record = Record::new("www", RecordType::Cname, 300, ["example.net"]);
    let err = provider(&server)
        .create_or_update_record("example.com", "www", RecordType::Cname, &codec::encode(&record).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Provider { .. }));
    assert!(err.to_string().contains("CNAME at apex"));
}

#[tokio::test]
async fn delete_requires_200() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{}/A/old", ZONE_PATH)))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("{}/A/ghost", ZONE_PATH)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    provider
        .delete_record("example.com", "old", RecordType::A)
        .await
        .unwrap();

    let err = provider
        .delete_record("example.com", "ghost", RecordType::A)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Provider { .. }));
}

#[tokio::test]
async fn unauthorized_is_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = provider(&server)
        .delete_record("example.com", "www", RecordType::A)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
    assert!(!err.to_string().contains("test-token"));
}

#[tokio::test]
async fn throttled_is_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = provider(&server).zone_exists("example.com").await.unwrap_err();
    assert!(matches!(err, Error::Provider { .. }));
}

#[tokio::test]
async fn zone_lookup_and_creation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ZONE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(ZONE_PATH))
        .and(body_json(json!({ "location": "global" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "example.com",
            "location": "global"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    assert!(!provider.zone_exists("example.com").await.unwrap());
    provider.create_zone("example.com").await.unwrap();
}

#[tokio::test]
async fn sync_deletes_only_the_stale_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ZONE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "example.com",
            "location": "global"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/recordsets", ZONE_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                soa_record_set(),
                a_record_set("www", 300, "1.2.3.4"),
                a_record_set("old", 300, "5.6.7.8")
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("{}/A/old", ZONE_PATH)))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let local = Zone::new(
        "example.com",
        vec![Record::new("www", RecordType::A, 300, ["1.2.3.4"])],
    )
    .unwrap();

    let reconciler = Reconciler::new(Box::new(provider(&server)));
    let report = reconciler.sync(&local).await.unwrap();
    assert_eq!(report.deleted, 1);
    assert_eq!(report.total(), 1);
}
