//! Tracker configuration, loaded from TOML.
//!
//! Every field is optional; missing fields fall back to the defaults below.
//!
//! ```toml
//! symbol = "AMD"
//! thresholds = [1.2, 1.5, 2.2]
//! ledger_path = "amd_stock_tracking.csv"
//! lookback_days = 10
//!
//! [provider]
//! timeout_secs = 30
//! max_retries = 3
//! retry_base_delay_ms = 500
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::thresholds::Thresholds;

/// Shortest lookback window that still spans a weekend plus a holiday.
pub const MIN_LOOKBACK_DAYS: u32 = 7;

/// Longest lookback window accepted: one leap year.
pub const MAX_LOOKBACK_DAYS: u32 = 366;

/// Upper bound on provider retries, keeping the backoff schedule finite.
pub const MAX_RETRIES: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error(
        "lookback_days must be between {min} and {max}, got {0}",
        min = MIN_LOOKBACK_DAYS,
        max = MAX_LOOKBACK_DAYS
    )]
    InvalidLookback(u32),

    #[error("provider.max_retries must be at most {max}, got {0}", max = MAX_RETRIES)]
    InvalidRetries(u32),

    #[error("symbol must not be empty")]
    EmptySymbol,
}

/// Top-level configuration for one tracking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub symbol: String,
    pub thresholds: Thresholds,
    pub ledger_path: PathBuf,
    pub lookback_days: u32,
    pub provider: ProviderConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            symbol: "AMD".into(),
            thresholds: Thresholds::default(),
            ledger_path: PathBuf::from("amd_stock_tracking.csv"),
            lookback_days: 10,
            provider: ProviderConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants serde cannot express. Thresholds validate
    /// themselves on construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if !(MIN_LOOKBACK_DAYS..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            return Err(ConfigError::InvalidLookback(self.lookback_days));
        }
        if self.provider.max_retries > MAX_RETRIES {
            return Err(ConfigError::InvalidRetries(self.provider.max_retries));
        }
        Ok(())
    }
}

/// HTTP settings for the market data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 500,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}
