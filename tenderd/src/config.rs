//! Application configuration management.
//!
//! This module handles loading and merging configuration from multiple sources
//! with a clear precedence order. Configuration can come from default values,
//! configuration files, and environment variables.

use crate::{Cli, schedule::Scheduler};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tender_core::models::UserId;

/// The main application configuration that composes all component configs
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// Database configuration (file path, creation)
    #[serde(default)]
    pub database: tender_sqlite::config::SqliteConfig,

    /// Auto-close scheduling configuration
    #[serde(default)]
    pub schedule: Scheduler,

    /// Sealing keyring configuration
    #[serde(default)]
    pub seal: tender_seal::config::SealConfig,

    /// Cancellation fan-out configuration
    #[serde(default)]
    pub cancellation: CancellationConfig,

    /// Who may do what beyond tender ownership
    #[serde(default)]
    pub access: AccessConfig,
}

/// Configuration of the cancellation notices.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CancellationConfig {
    /// Upper bound on delivering a single notice
    #[serde(with = "humantime_serde", default = "default_notification_timeout")]
    pub notification_timeout: Duration,
}

fn default_notification_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Default for CancellationConfig {
    fn default() -> Self {
        Self {
            notification_timeout: default_notification_timeout(),
        }
    }
}

/// Users with standing rights on every tender.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AccessConfig {
    /// Evaluators allowed to score the offers of any tender
    #[serde(default)]
    pub evaluators: Vec<UserId>,
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest priority)
    /// 2. Config file given by the CLI
    /// 3. Default values (lowest priority)
    ///
    /// Environment variables are mapped using the pattern:
    /// `APP_<SECTION>__<KEY>` maps to `<section>.<key>`
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Use a file-backed database
    /// export APP_DATABASE__DATABASE_PATH="/var/lib/tenderd/tenders.db"
    ///
    /// # Close due tenders every thirty seconds
    /// export APP_SCHEDULE__EVERY="30s"
    ///
    /// # Provide the active sealing key
    /// export APP_SEAL__ACTIVE_KEY="k1"
    /// export APP_SEAL__KEYS__K1="<64 hex characters>"
    /// ```
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Start with default values
        config = config.add_source(config::Config::try_from(&Self::default())?);

        // Layer on config file if it is specified and exists
        if let Some(path) = &cli.config {
            if path.exists() {
                config = config.add_source(config::File::from(path.as_path()))
            } else {
                return Err(anyhow::anyhow!(
                    "Config file {} does not exist",
                    path.display()
                ));
            }
        }

        // Override with environment variables
        // This maps APP_SCHEDULE__EVERY to schedule.every
        config = config.add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let built_config = config.build()?;
        built_config.try_deserialize().map_err(Into::into)
    }
}
