// # zonesync - DNS zone synchronizer
//
// Thin command-line layer over zonesync-core:
//
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering providers
// 4. Running one `get`, `sync` or `ns` command and exiting
//
// All DNS logic lives in zonesync-core; provider I/O lives in the provider
// crates.
//
// ## Commands
//
// - `zonesync get <ZONE> [--save]`: print the remote zone as a zone file, or
//   write it to `<ZONESYNC_ZONES_DIR>/<ZONE>.yaml`
// - `zonesync sync <ZONE> [--dry-run]`: make the remote zone match the zone file
// - `zonesync ns <ZONE>`: print the zone's name servers, one per line
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `ZONESYNC_ZONES_DIR`: Directory holding `<zone>.yaml` files (required)
// - `ZONESYNC_PROVIDER`: Provider type (azure, memory); default azure
// - `ZONESYNC_MODE`: Set to `dry-run` to plan without mutating the provider
// - `ZONESYNC_LOG_LEVEL`: trace, debug, info, warn, error; default info
// - `AZURE_SUBSCRIPTION_ID`: Subscription holding the zones
// - `AZURE_RESOURCE_GROUP`: Resource group holding the zones; default azure-dns-manager
// - `AZURE_ACCESS_TOKEN`: Bearer token for the management endpoint
// - `AZURE_DNS_ENDPOINT`: Management endpoint override (optional)
//
// ## Example
//
// ```bash
// export ZONESYNC_ZONES_DIR=./zones
// export AZURE_SUBSCRIPTION_ID=00000000-0000-0000-0000-000000000000
// export AZURE_ACCESS_TOKEN=$(az account get-access-token --query accessToken -o tsv)
//
// zonesync get example.com --save
// zonesync sync example.com --dry-run
// ```
//
// Logs go to stderr; `get` and `ns` write their data to stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;
use zonesync_core::config::DEFAULT_RESOURCE_GROUP;
use zonesync_core::{ProviderConfig, ProviderRegistry, Reconciler, SyncConfig, Zone, ZoneSyncConfig};

/// Exit codes
///
/// - 0: Command succeeded
/// - 1: Configuration error or any failure while running the command
#[derive(Debug, Clone, Copy)]
enum ZoneSyncExitCode {
    Success = 0,
    Failure = 1,
}

impl From<ZoneSyncExitCode> for ExitCode {
    fn from(code: ZoneSyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(name = "zonesync", version, about = "Keep a DNS zone in sync with a YAML zone file")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the remote zone in zone file format
    Get {
        /// Zone name, e.g. example.com
        zone: String,

        /// Write `<ZONESYNC_ZONES_DIR>/<ZONE>.yaml` instead of printing
        #[arg(long)]
        save: bool,
    },

    /// Make the remote zone match the local zone file
    Sync {
        /// Zone name, e.g. example.com
        zone: String,

        /// Log planned changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the name servers of the remote zone
    Ns {
        /// Zone name, e.g. example.com
        zone: String,
    },
}

impl Command {
    fn zone(&self) -> &str {
        match self {
            Command::Get { zone, .. } | Command::Sync { zone, .. } | Command::Ns { zone } => zone,
        }
    }
}

/// Application configuration
struct Config {
    zones_dir: String,
    provider_type: String,
    subscription_id: String,
    resource_group: String,
    access_token: String,
    endpoint: Option<String>,
    dry_run: bool,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            zones_dir: env::var("ZONESYNC_ZONES_DIR")
                .context("ZONESYNC_ZONES_DIR is required. Set it via: export ZONESYNC_ZONES_DIR=./zones")?,
            provider_type: env::var("ZONESYNC_PROVIDER").unwrap_or_else(|_| "azure".to_string()),
            subscription_id: env::var("AZURE_SUBSCRIPTION_ID").unwrap_or_default(),
            resource_group: env::var("AZURE_RESOURCE_GROUP")
                .unwrap_or_else(|_| DEFAULT_RESOURCE_GROUP.to_string()),
            access_token: env::var("AZURE_ACCESS_TOKEN").unwrap_or_default(),
            endpoint: env::var("AZURE_DNS_ENDPOINT").ok().filter(|s| !s.is_empty()),
            dry_run: env::var("ZONESYNC_MODE")
                .unwrap_or_default()
                .eq_ignore_ascii_case("dry-run"),
            log_level: env::var("ZONESYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Checks the values the environment can get wrong before any provider
    /// is contacted. Structural checks (zones directory exists, provider
    /// fields present) are repeated by [`ZoneSyncConfig::validate`].
    fn validate(&self) -> Result<()> {
        if self.zones_dir.is_empty() {
            anyhow::bail!("ZONESYNC_ZONES_DIR cannot be empty");
        }

        match self.provider_type.as_str() {
            "azure" => {
                if self.subscription_id.is_empty() {
                    anyhow::bail!(
                        "AZURE_SUBSCRIPTION_ID is required. \
                        Set it via: export AZURE_SUBSCRIPTION_ID=<subscription id>"
                    );
                }

                if self.access_token.is_empty() {
                    anyhow::bail!(
                        "AZURE_ACCESS_TOKEN is required. \
                        Set it via: export AZURE_ACCESS_TOKEN=$(az account get-access-token --query accessToken -o tsv)"
                    );
                }

                // Check for obvious placeholder tokens (common mistake)
                let token_lower = self.access_token.to_lowercase();
                if token_lower.contains("your_token")
                    || token_lower.contains("replace_me")
                    || token_lower == "token"
                {
                    anyhow::bail!(
                        "AZURE_ACCESS_TOKEN appears to be a placeholder. \
                        Use an actual bearer token for the management endpoint."
                    );
                }

                if let Some(ref endpoint) = self.endpoint
                    && !endpoint.starts_with("https://")
                    && !endpoint.starts_with("http://")
                {
                    anyhow::bail!(
                        "AZURE_DNS_ENDPOINT must use HTTP or HTTPS scheme. Got: {}",
                        endpoint
                    );
                }
            }
            "memory" => {}
            _ => anyhow::bail!(
                "ZONESYNC_PROVIDER '{}' is not supported. \
                Supported providers: azure, memory",
                self.provider_type
            ),
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ZONESYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Build the library configuration
    ///
    /// `dry_run` is the command-line flag; it adds to `ZONESYNC_MODE`.
    fn to_zonesync_config(&self, dry_run: bool) -> ZoneSyncConfig {
        let provider = match self.provider_type.as_str() {
            "memory" => ProviderConfig::Memory,
            _ => ProviderConfig::Azure {
                subscription_id: self.subscription_id.clone(),
                resource_group: self.resource_group.clone(),
                access_token: self.access_token.clone(),
                endpoint: self.endpoint.clone(),
                api_version: None,
            },
        };

        let mut config = ZoneSyncConfig::new(PathBuf::from(&self.zones_dir), provider);
        config.sync = SyncConfig {
            dry_run: self.dry_run || dry_run,
            ..SyncConfig::default()
        };
        config
    }
}

/// Validate a zone name given on the command line
///
/// Basic RFC 1035 checks, enough to catch typos before a provider call.
fn validate_zone_name(zone: &str) -> Result<()> {
    if zone.is_empty() {
        anyhow::bail!("Zone name cannot be empty");
    }

    if zone.len() > 253 {
        anyhow::bail!("Zone name too long: {} chars (max 253). Got: {}", zone.len(), zone);
    }

    // Zone files are named after the zone, so path separators never make sense
    if zone.contains('/') || zone.contains('\\') {
        anyhow::bail!("Zone name cannot contain path separators: '{}'", zone);
    }

    for label in zone.split('.') {
        if label.is_empty() {
            anyhow::bail!("Zone name has empty label: '{}'", zone);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "Zone label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            anyhow::bail!(
                "Zone label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!("Zone label cannot start or end with hyphen. Label: '{}'", label);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    ZoneSyncExitCode::Success.into()
                }
                _ => ZoneSyncExitCode::Failure.into(),
            };
        }
    };

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ZoneSyncExitCode::Failure.into();
        }
    };

    if let Err(e) = config.validate().and_then(|()| validate_zone_name(cli.command.zone())) {
        eprintln!("Configuration validation error: {:#}", e);
        return ZoneSyncExitCode::Failure.into();
    }

    // Logs go to stderr so stdout carries only command output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level())
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ZoneSyncExitCode::Failure.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ZoneSyncExitCode::Failure.into();
        }
    };

    let result = rt.block_on(run(cli.command, config));

    match result {
        Ok(()) => ZoneSyncExitCode::Success.into(),
        Err(e) => {
            error!("{:#}", e);
            ZoneSyncExitCode::Failure.into()
        }
    }
}

/// Create a registry with every provider compiled into this binary
fn build_registry() -> ProviderRegistry {
    let registry = ProviderRegistry::with_builtin();

    #[cfg(feature = "azure")]
    {
        debug!("Registering Azure DNS provider");
        zonesync_provider_azure::register(&registry);
    }

    registry
}

/// Run one command
async fn run(command: Command, config: Config) -> Result<()> {
    let dry_run_flag = matches!(command, Command::Sync { dry_run: true, .. });
    let settings = config.to_zonesync_config(dry_run_flag);
    settings.validate().context("Invalid configuration")?;

    let registry = build_registry();
    debug!("Available providers: {}", registry.list_providers().join(", "));

    let provider = registry
        .create_provider(&settings.provider)
        .with_context(|| format!("Failed to create {} provider", settings.provider.type_name()))?;
    let reconciler = Reconciler::with_config(provider, &settings.sync);

    match command {
        Command::Get { zone, save } => {
            let remote = reconciler
                .fetch_zone(&zone)
                .await
                .with_context(|| format!("Failed to fetch zone {}", zone))?;

            if save {
                let path = remote
                    .save(&settings.zones_dir)
                    .await
                    .with_context(|| format!("Failed to save zone {}", zone))?;
                info!("Saved {} record set(s) to {}", remote.len(), path.display());
            } else {
                print!("{}", remote.to_yaml()?);
            }
        }

        Command::Sync { zone, .. } => {
            let local = Zone::load(&settings.zones_dir, &zone)
                .await
                .with_context(|| format!("Failed to load zone file for {}", zone))?;
            info!(
                "Syncing {} ({} record set(s)) via {}{}",
                zone,
                local.len(),
                reconciler.provider().provider_name(),
                if reconciler.is_dry_run() { " [DRY-RUN]" } else { "" }
            );

            let report = reconciler
                .sync(&local)
                .await
                .with_context(|| format!("Failed to sync zone {}", zone))?;

            info!(
                "{} {}: {} deleted, {} created, {} updated",
                if report.dry_run { "Planned" } else { "Synced" },
                zone,
                report.deleted,
                report.created,
                report.updated
            );
        }

        Command::Ns { zone } => {
            let remote = reconciler
                .fetch_zone(&zone)
                .await
                .with_context(|| format!("Failed to fetch zone {}", zone))?;

            for name_server in remote.name_servers() {
                println!("{}", name_server);
            }
        }
    }

    Ok(())
}
