//! Run configuration loaded from TOML.
//!
//! ```toml
//! [data]
//! csv_path = "data/btcusdt_1h.csv"   # or: synthetic_bars = 500
//! symbol = "BTCUSDT"
//! timeframe = "1h"
//!
//! [output]
//! reports_dir = "reports"
//!
//! [alerts]
//! notify_score_threshold = 0.75
//!
//! [discovery]
//! indicator_families = ["momentum", "trend"]
//! seed = 42
//! ```

use serde::{Deserialize, Serialize};
use siglab_core::{DiscoveryConfig, DiscoveryError};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_REPORTS_DIR: &str = "reports";
pub const DEFAULT_NOTIFY_SCORE_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid run config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// Where bars come from. Exactly one of `csv_path` and `synthetic_bars`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub csv_path: Option<PathBuf>,
    #[serde(default)]
    pub synthetic_bars: Option<usize>,
    pub symbol: String,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub reports_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Candidates scoring at or above this produce an alert.
    pub notify_score_threshold: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            notify_score_threshold: DEFAULT_NOTIFY_SCORE_THRESHOLD,
        }
    }
}

/// Source of bars resolved from [`DataConfig`].
#[derive(Debug, Clone, PartialEq)]
pub enum BarSource {
    Csv(PathBuf),
    Synthetic(usize),
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Config for a CSV file with everything else defaulted.
    pub fn for_csv(path: impl Into<PathBuf>, symbol: &str, timeframe: &str) -> Self {
        Self {
            data: DataConfig {
                csv_path: Some(path.into()),
                synthetic_bars: None,
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
            },
            output: OutputConfig::default(),
            alerts: AlertConfig::default(),
            discovery: DiscoveryConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bar_source()?;
        if self.data.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("data.symbol must not be empty".into()));
        }
        if self.data.timeframe.trim().is_empty() {
            return Err(ConfigError::Invalid("data.timeframe must not be empty".into()));
        }
        if !self.alerts.notify_score_threshold.is_finite() {
            return Err(ConfigError::Invalid(
                "alerts.notify_score_threshold must be finite".into(),
            ));
        }
        self.discovery.validate()?;
        Ok(())
    }

    pub fn bar_source(&self) -> Result<BarSource, ConfigError> {
        match (&self.data.csv_path, self.data.synthetic_bars) {
            (Some(path), None) => Ok(BarSource::Csv(path.clone())),
            (None, Some(n)) if n > 0 => Ok(BarSource::Synthetic(n)),
            (None, Some(_)) => Err(ConfigError::Invalid("data.synthetic_bars must be positive".into())),
            (Some(_), Some(_)) => Err(ConfigError::Invalid(
                "data.csv_path and data.synthetic_bars are mutually exclusive".into(),
            )),
            (None, None) => Err(ConfigError::Invalid(
                "one of data.csv_path or data.synthetic_bars is required".into(),
            )),
        }
    }
}
