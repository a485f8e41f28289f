//! Configuration types for zonesync
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resource group used when none is configured
pub const DEFAULT_RESOURCE_GROUP: &str = "azure-dns-manager";

/// Main zonesync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneSyncConfig {
    /// Directory holding `<zone>.yaml` files
    pub zones_dir: PathBuf,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Optional sync settings
    #[serde(default)]
    pub sync: SyncConfig,
}

impl ZoneSyncConfig {
    /// Create a new configuration with defaults
    pub fn new(zones_dir: impl Into<PathBuf>, provider: ProviderConfig) -> Self {
        Self {
            zones_dir: zones_dir.into(),
            provider,
            sync: SyncConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zones_dir.as_os_str().is_empty() {
            return Err(crate::Error::config("Zones directory cannot be empty"));
        }

        if !self.zones_dir.is_dir() {
            return Err(crate::Error::config(format!(
                "Zones directory does not exist: {}",
                self.zones_dir.display()
            )));
        }

        self.provider.validate()?;

        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Azure DNS via the Resource Manager REST API
    Azure {
        /// Subscription holding the DNS zones
        subscription_id: String,
        /// Resource group holding the DNS zones
        #[serde(default = "default_resource_group")]
        resource_group: String,
        /// Pre-acquired bearer token for the management endpoint
        access_token: String,
        /// Management endpoint override
        #[serde(default)]
        endpoint: Option<String>,
        /// API version override
        #[serde(default)]
        api_version: Option<String>,
    },

    /// In-process provider without persistence
    Memory,

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Azure {
                subscription_id,
                resource_group,
                access_token,
                ..
            } => {
                if subscription_id.is_empty() {
                    return Err(crate::Error::config("Azure subscription ID cannot be empty"));
                }
                if resource_group.is_empty() {
                    return Err(crate::Error::config("Azure resource group cannot be empty"));
                }
                if access_token.is_empty() {
                    return Err(crate::Error::config("Azure access token cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Memory => Ok(()),
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Azure { .. } => "azure",
            ProviderConfig::Memory => "memory",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

// Custom Debug implementation that hides the access token
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Azure {
                subscription_id,
                resource_group,
                endpoint,
                api_version,
                ..
            } => f
                .debug_struct("Azure")
                .field("subscription_id", subscription_id)
                .field("resource_group", resource_group)
                .field("access_token", &"<REDACTED>")
                .field("endpoint", endpoint)
                .field("api_version", api_version)
                .finish(),
            ProviderConfig::Memory => f.write_str("Memory"),
            ProviderConfig::Custom { factory, config } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", config)
                .finish(),
        }
    }
}

fn default_resource_group() -> String {
    DEFAULT_RESOURCE_GROUP.to_string()
}

/// Sync settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Plan and log changes without mutating the provider
    #[serde(default)]
    pub dry_run: bool,

    /// Create the remote zone when it does not exist yet
    #[serde(default = "default_create_missing_zone")]
    pub create_missing_zone: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            create_missing_zone: default_create_missing_zone(),
        }
    }
}

fn default_create_missing_zone() -> bool {
    true
}
