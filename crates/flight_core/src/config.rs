//! Dashboard configuration
//!
//! Values come from built-in defaults, an optional TOML file and
//! `FLIGHT_DASHBOARD_*` environment variables, applied in that order.

use crate::errors::{CoreError, Result};
use crate::features::UnknownCategoryPolicy;
use crate::prediction::DEFAULT_CURRENCY_SYMBOL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const ENV_DATASET_PATH: &str = "FLIGHT_DASHBOARD_DATASET";
pub const ENV_MODEL_PATH: &str = "FLIGHT_DASHBOARD_MODEL";
pub const ENV_LAYOUT_PATH: &str = "FLIGHT_DASHBOARD_LAYOUT";
pub const ENV_VERIFY_HASH: &str = "FLIGHT_DASHBOARD_VERIFY_HASH";
pub const ENV_UNKNOWN_CATEGORY: &str = "FLIGHT_DASHBOARD_UNKNOWN_CATEGORY";
pub const ENV_CURRENCY: &str = "FLIGHT_DASHBOARD_CURRENCY";
pub const ENV_LOG_LEVEL: &str = "FLIGHT_DASHBOARD_LOG_LEVEL";

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub encoding: EncodingConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

/// Dataset location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    /// Normalized CSV produced by the normalizer
    pub dataset_path: PathBuf,
}

/// Model artifact location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Tree-ensemble JSON artifact
    pub model_path: PathBuf,
    /// Persisted feature layout; takes precedence over one embedded in the model
    pub layout_path: Option<PathBuf>,
    /// Require a matching `<model>.hash` sidecar
    pub verify_hash: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EncodingConfig {
    pub unknown_category: UnknownCategoryPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub currency_symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("goibibo_flights_data_updated.csv"),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("flight_price_model.json"),
            layout_path: None,
            verify_hash: false,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl DashboardConfig {
    /// Load configuration from a TOML file; missing sections keep defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let config: DashboardConfig = toml::from_str(&content)
            .map_err(|e| CoreError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Apply `FLIGHT_DASHBOARD_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_DATASET_PATH) {
            self.data.dataset_path = PathBuf::from(val);
        }

        if let Some(val) = lookup(ENV_MODEL_PATH) {
            self.model.model_path = PathBuf::from(val);
        }

        if let Some(val) = lookup(ENV_LAYOUT_PATH) {
            self.model.layout_path = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        if let Some(val) = lookup(ENV_VERIFY_HASH) {
            self.model.verify_hash = val.parse().map_err(|_| {
                CoreError::Config(format!("{} must be true or false, got '{}'", ENV_VERIFY_HASH, val))
            })?;
        }

        if let Some(val) = lookup(ENV_UNKNOWN_CATEGORY) {
            self.encoding.unknown_category = match val.as_str() {
                "zero_block" => UnknownCategoryPolicy::ZeroBlock,
                "reject" => UnknownCategoryPolicy::Reject,
                other => {
                    return Err(CoreError::Config(format!(
                        "{} must be zero_block or reject, got '{}'",
                        ENV_UNKNOWN_CATEGORY, other
                    )))
                }
            };
        }

        if let Some(val) = lookup(ENV_CURRENCY) {
            self.display.currency_symbol = val;
        }

        if let Some(val) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = val;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.data.dataset_path.as_os_str().is_empty() {
            return Err(CoreError::Config("data.dataset_path is empty".to_string()));
        }
        if self.model.model_path.as_os_str().is_empty() {
            return Err(CoreError::Config("model.model_path is empty".to_string()));
        }
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(CoreError::Config(format!(
                "logging.level '{}' is not one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CoreError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
