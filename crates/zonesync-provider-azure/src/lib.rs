// # Azure DNS Provider
//
// DnsProvider implementation backed by the Azure Resource Manager DNS REST API.
//
// ## Behavior
//
// - ✅ One HTTP request per trait call (listing follows `nextLink` pages)
// - ✅ Full error propagation to the reconciler, which stops on the first error
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Specific error handling for HTTP status codes (401, 403, 404, 409, 429, 5xx)
// - ✅ Zone creation with `location: global`
// - ❌ NO retry logic
// - ❌ NO caching between calls
// - ❌ NO background tasks
//
// ## Security Requirements
//
// - Access token NEVER appears in logs
// - Provider construction fails if token, subscription or resource group is empty
//
// ## API Reference
//
// All calls go to
// `{endpoint}/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/dnsZones/{zone}`
// with `api-version=2018-05-01`:
//
// - List record sets: GET `.../recordsets?$top=100`
// - Create or update: PUT `.../{type}/{name}`
// - Delete: DELETE `.../{type}/{name}`
// - Get zone: GET `...`
// - Create zone: PUT `...` with `{"location": "global"}`

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use zonesync_core::config::ProviderConfig;
use zonesync_core::traits::{DnsProvider, DnsProviderFactory};
use zonesync_core::{Error, ProviderRecordSet, RecordSetProperties, RecordType, Result};

/// Azure Resource Manager endpoint
pub const AZURE_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// DNS API version spoken by this provider
pub const DEFAULT_API_VERSION: &str = "2018-05-01";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Record sets requested per listing page
const PAGE_SIZE: &str = "100";

const PROVIDER: &str = "azure";

/// One page of `GET .../recordsets`
#[derive(Debug, Deserialize)]
struct RecordSetListPage {
    #[serde(default)]
    value: Vec<ProviderRecordSet>,

    #[serde(rename = "nextLink", default)]
    next_link: Option<String>,
}

/// Azure DNS provider
///
/// Stateless apart from its HTTP client: every trait call maps to one REST
/// request (or one request per listing page) and its result.
pub struct AzureDnsProvider {
    /// Bearer token for the management endpoint
    /// ⚠️ NEVER log this value
    access_token: String,

    /// Subscription holding the zones
    subscription_id: String,

    /// Resource group holding the zones
    resource_group: String,

    /// Management endpoint, without trailing slash
    endpoint: String,

    /// `api-version` query parameter
    api_version: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the access token
impl std::fmt::Debug for AzureDnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureDnsProvider")
            .field("access_token", &"<REDACTED>")
            .field("subscription_id", &self.subscription_id)
            .field("resource_group", &self.resource_group)
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl AzureDnsProvider {
    /// Create a new Azure DNS provider against the public cloud endpoint
    ///
    /// # Parameters
    ///
    /// - `subscription_id`: Subscription holding the DNS zones
    /// - `resource_group`: Resource group holding the DNS zones
    /// - `access_token`: Bearer token with DNS Zone Contributor rights
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if any argument is empty and
    /// [`Error::Provider`] if the HTTP client cannot be built.
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        let subscription_id = subscription_id.into();
        let resource_group = resource_group.into();
        let access_token = access_token.into();

        if access_token.is_empty() {
            return Err(Error::config("Azure access token cannot be empty"));
        }
        if subscription_id.is_empty() {
            return Err(Error::config("Azure subscription ID cannot be empty"));
        }
        if resource_group.is_empty() {
            return Err(Error::config("Azure resource group cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            access_token,
            subscription_id,
            resource_group,
            endpoint: AZURE_MANAGEMENT_ENDPOINT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            client,
        })
    }

    /// Use another management endpoint (sovereign clouds, tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Use another `api-version`
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Resource URL of a zone
    fn zone_url(&self, zone: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/dnsZones/{}",
            self.endpoint, self.subscription_id, self.resource_group, zone
        )
    }

    /// Resource URL of a record set
    fn record_url(&self, zone: &str, name: &str, record_type: RecordType) -> String {
        format!("{}/{}/{}", self.zone_url(zone), record_type.as_str(), name)
    }

    /// Send a request with auth and `api-version` attached
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        request
            .bearer_auth(&self.access_token)
            .query(&[("api-version", self.api_version.as_str())])
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("HTTP request failed: {}", e)))
    }

    /// Parse a JSON response body
    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to parse response: {}", e)))
    }
}

/// Turn a non-success response into an error
///
/// `context` names the operation and is used for the fallback message.
async fn status_error(response: reqwest::Response, context: &str) -> Error {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());

    map_status(status, &error_text, context)
}

fn map_status(status: StatusCode, error_text: &str, context: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid access token or insufficient permissions. Status: {}",
            status
        )),
        404 => Error::not_found(format!("{}: {} - {}", context, status, error_text)),
        409 => Error::provider(
            PROVIDER,
            format!("Conflict: {} rejected by the service. Status: {}", context, status),
        ),
        429 => Error::provider(
            PROVIDER,
            format!("Rate limit exceeded. Please retry later. Status: {}", status),
        ),
        500..=599 => Error::provider(
            PROVIDER,
            format!("Azure server error (transient): {} - {}", status, error_text),
        ),
        _ => Error::provider(
            PROVIDER,
            format!("{} failed: {} - {}", context, status, error_text),
        ),
    }
}

#[async_trait]
impl DnsProvider for AzureDnsProvider {
    /// List every record set of a zone
    ///
    /// # API Calls
    ///
    /// ```http
    /// GET .../dnsZones/example.com/recordsets?$top=100&api-version=2018-05-01
    /// GET <nextLink>   # repeated while the service returns one
    /// ```
    async fn list_records(&self, zone: &str) -> Result<Vec<ProviderRecordSet>> {
        let first = format!("{}/recordsets", self.zone_url(zone));
        let mut response = self
            .send(self.client.get(&first).query(&[("$top", PAGE_SIZE)]))
            .await?;

        let mut records = Vec::new();
        let mut pages = 0usize;
        loop {
            if !response.status().is_success() {
                return Err(status_error(response, &format!("Listing zone {}", zone)).await);
            }

            let page: RecordSetListPage = Self::parse(response).await?;
            pages += 1;
            records.extend(page.value);

            // nextLink already carries api-version and the skip token
            let Some(next) = page.next_link.filter(|link| !link.is_empty()) else {
                break;
            };
            response = self
                .client
                .get(&next)
                .bearer_auth(&self.access_token)
                .send()
                .await
                .map_err(|e| Error::provider(PROVIDER, format!("HTTP request failed: {}", e)))?;
        }

        tracing::debug!(
            "Listed {} record set(s) in {} page(s) for zone {}",
            records.len(),
            pages,
            zone
        );
        Ok(records)
    }

    /// Create a record set or replace it
    ///
    /// # API Call
    ///
    /// ```http
    /// PUT .../dnsZones/example.com/A/www?api-version=2018-05-01
    /// { "properties": { "TTL": 300, "ARecords": [ { "ipv4Address": "1.2.3.4" } ] } }
    /// ```
    async fn create_or_update_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        properties: &RecordSetProperties,
    ) -> Result<ProviderRecordSet> {
        let url = self.record_url(zone, name, record_type);
        let payload = serde_json::json!({ "properties": properties });

        let response = self.send(self.client.put(&url).json(&payload)).await?;
        if !response.status().is_success() {
            return Err(status_error(
                response,
                &format!("Writing {} on {}", name, record_type),
            )
            .await);
        }

        let record_set: ProviderRecordSet = Self::parse(response).await?;
        tracing::debug!(
            "Azure accepted {} on {} ({})",
            record_set.name,
            record_set.type_mnemonic(),
            record_set.etag.as_deref().unwrap_or("no etag")
        );
        Ok(record_set)
    }

    /// Delete a record set
    ///
    /// Only `200 OK` confirms a deletion. `204 No Content` means the record
    /// set was already absent, which is reported as an error.
    async fn delete_record(&self, zone: &str, name: &str, record_type: RecordType) -> Result<()> {
        let url = self.record_url(zone, name, record_type);
        let response = self.send(self.client.delete(&url)).await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NO_CONTENT => Err(Error::provider(
                PROVIDER,
                format!(
                    "Record set {} on {} was not deleted: it does not exist. Status: {}",
                    name,
                    record_type,
                    StatusCode::NO_CONTENT
                ),
            )),
            _ => Err(status_error(response, &format!("Deleting {} on {}", name, record_type)).await),
        }
    }

    async fn zone_exists(&self, zone: &str) -> Result<bool> {
        let response = self.send(self.client.get(self.zone_url(zone))).await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(status_error(response, &format!("Looking up zone {}", zone)).await),
        }
    }

    async fn create_zone(&self, zone: &str) -> Result<()> {
        let payload = serde_json::json!({ "location": "global" });
        let response = self
            .send(self.client.put(self.zone_url(zone)).json(&payload))
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response, &format!("Creating zone {}", zone)).await);
        }

        tracing::debug!("Azure created zone {}", zone);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Factory for creating Azure DNS providers
pub struct AzureFactory;

impl DnsProviderFactory for AzureFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Azure {
                subscription_id,
                resource_group,
                access_token,
                endpoint,
                api_version,
            } => {
                if access_token.is_empty() {
                    return Err(Error::config("Azure access token is required"));
                }

                let mut provider = AzureDnsProvider::new(
                    subscription_id.clone(),
                    resource_group.clone(),
                    access_token.clone(),
                )?;
                if let Some(endpoint) = endpoint {
                    provider = provider.with_endpoint(endpoint.clone());
                }
                if let Some(api_version) = api_version {
                    provider = provider.with_api_version(api_version.clone());
                }

                Ok(Box::new(provider))
            }
            _ => Err(Error::config("Invalid config for Azure provider")),
        }
    }
}

/// Register the Azure provider with a registry
///
/// # Example
///
/// ```rust
/// use zonesync_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::with_builtin();
/// zonesync_provider_azure::register(&registry);
/// assert!(registry.has_provider("azure"));
/// ```
pub fn register(registry: &zonesync_core::ProviderRegistry) {
    registry.register_provider(PROVIDER, Box::new(AzureFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn azure_config(token: &str) -> ProviderConfig {
        ProviderConfig::Azure {
            subscription_id: "sub-1".to_string(),
            resource_group: "dns-rg".to_string(),
            access_token: token.to_string(),
            endpoint: Some("http://localhost:8080/".to_string()),
            api_version: None,
        }
    }

    #[test]
    fn test_factory_creation() {
        let provider = AzureFactory.create(&azure_config("test_token"));
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().provider_name(), "azure");
    }

    #[test]
    fn test_factory_missing_token() {
        assert!(matches!(
            AzureFactory.create(&azure_config("")),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_factory_rejects_other_config() {
        assert!(AzureFactory.create(&ProviderConfig::Memory).is_err());
    }

    #[test]
    fn test_empty_arguments_rejected() {
        assert!(AzureDnsProvider::new("", "rg", "token").is_err());
        assert!(AzureDnsProvider::new("sub", "", "token").is_err());
        assert!(AzureDnsProvider::new("sub", "rg", "").is_err());
    }

    #[test]
    fn test_urls() {
        let provider = AzureDnsProvider::new("sub-1", "dns-rg", "token")
            .unwrap()
            .with_endpoint("http://localhost:8080/");

        assert_eq!(
            provider.zone_url("example.com"),
            "http://localhost:8080/subscriptions/sub-1/resourceGroups/dns-rg/providers/Microsoft.Network/dnsZones/example.com"
        );
        assert!(
            provider
                .record_url("example.com", "@", RecordType::Caa)
                .ends_with("/dnsZones/example.com/CAA/@")
        );
    }

    #[test]
    fn test_default_endpoint_and_version() {
        let provider = AzureDnsProvider::new("sub", "rg", "token").unwrap();
        assert_eq!(provider.endpoint, AZURE_MANAGEMENT_ENDPOINT);
        assert_eq!(provider.api_version, DEFAULT_API_VERSION);

        let provider = provider.with_api_version("2023-07-01-preview");
        assert_eq!(provider.api_version, "2023-07-01-preview");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            map_status(StatusCode::UNAUTHORIZED, "", "x"),
            Error::Authentication(_)
        ));
        assert!(matches!(
            map_status(StatusCode::FORBIDDEN, "", "x"),
            Error::Authentication(_)
        ));
        assert!(matches!(
            map_status(StatusCode::NOT_FOUND, "", "x"),
            Error::NotFound(_)
        ));
        assert!(matches!(
            map_status(StatusCode::TOO_MANY_REQUESTS, "", "x"),
            Error::Provider { .. }
        ));

        let err = map_status(StatusCode::BAD_REQUEST, "bad ttl", "Writing www on A");
        let message = err.to_string();
        assert!(message.contains("Writing www on A"));
        assert!(message.contains("bad ttl"));
    }

    #[test]
    fn test_access_token_not_exposed_in_debug() {
        let provider = AzureDnsProvider::new("sub", "rg", "secret_token_12345").unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("AzureDnsProvider"));
    }

    #[test]
    fn test_register() {
        let registry = zonesync_core::ProviderRegistry::new();
        register(&registry);
        assert!(registry.has_provider("azure"));
    }
}
