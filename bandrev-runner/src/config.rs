//! Serializable backtest configuration (TOML).
//!
//! ```toml
//! [data]
//! path = "data/spy_1m.csv"
//!
//! [strategy]
//! window = 20
//! multiplier = 2.0
//!
//! [output]
//! dir = "results"
//! ```
//!
//! Every section and key is optional; missing strategy keys take the engine
//! defaults. Command-line flags override file values.

use bandrev_core::engine::{EngineError, StrategyParams, DEFAULT_MULTIPLIER, DEFAULT_WINDOW};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from reading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid strategy parameters: {0}")]
    Invalid(#[from] EngineError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSection {
    /// CSV file with `timestamp,open,high,low,close[,volume]` columns.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategySection {
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for StrategySection {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_multiplier() -> f64 {
    DEFAULT_MULTIPLIER
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Artifact root. No artifacts are written when unset.
    pub dir: Option<PathBuf>,
}

/// Complete configuration for a single run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestConfig {
    #[serde(default)]
    pub data: DataSection,
    #[serde(default)]
    pub strategy: StrategySection,
    #[serde(default)]
    pub output: OutputSection,
}

impl BacktestConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn params(&self) -> StrategyParams {
        StrategyParams::new(self.strategy.window, self.strategy.multiplier)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params().validate()?;
        Ok(())
    }

    /// Deterministic BLAKE3 fingerprint of the parameters that affect results.
    ///
    /// Output settings are excluded: the same run written to two places has
    /// one identity.
    pub fn config_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.strategy.window as u64).to_le_bytes());
        hasher.update(&self.strategy.multiplier.to_bits().to_le_bytes());
        if let Some(path) = &self.data.path {
            hasher.update(path.to_string_lossy().as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
