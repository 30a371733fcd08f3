//! Application Configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML/JSON/YAML file, then `STOCKOUT__*` environment variables
//! (e.g. `STOCKOUT__SERVER__ADDR=0.0.0.0:9000`).

use crate::rate_limit::RateLimitConfig;
use config::{Config, ConfigError, Environment, File};
use feature_engine::PipelineConfig;
use inference_engine::RiskThresholds;
use ledger::ColumnMapping;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "STOCKOUT";
/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_NAME: &str = "stockout";

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Classifier settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// JSON model artifact; the baseline model is used when unset
    pub path: Option<PathBuf>,
    pub risk: RiskThresholds,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
    pub pipeline: PipelineConfig,
    pub columns: ColumnMapping,
    pub model: ModelConfig,
}

impl AppConfig {
    /// Load configuration
    ///
    /// An explicit `path` must exist; otherwise `stockout.{toml,json,yaml}`
    /// in the working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let config: Self = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}
