//! Serializable run configuration (TOML).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use factorlab_core::features::FeatureConfig;

use crate::evaluate::EvalConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything needed to reproduce one factor backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    pub backtest: BacktestSection,
}

/// Where the raw panel comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// Panel CSV path; mutually exclusive with `synthetic`.
    pub path: Option<PathBuf>,
    /// Generate a deterministic synthetic panel instead of loading one.
    #[serde(default)]
    pub synthetic: bool,
    #[serde(default = "default_synthetic_entities")]
    pub synthetic_entities: usize,
    #[serde(default = "default_synthetic_days")]
    pub synthetic_days: usize,
    #[serde(default)]
    pub seed: u64,
}

/// Factor and evaluation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestSection {
    pub factor: String,
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    #[serde(default = "default_quantiles")]
    pub quantiles: usize,
    /// Inclusive date range, `YYYY-MM-DD`; open-ended when omitted.
    pub start: Option<String>,
    pub end: Option<String>,
    /// Entity subset; the full panel when omitted.
    pub entities: Option<Vec<String>>,
}

fn default_synthetic_entities() -> usize {
    5
}

fn default_synthetic_days() -> usize {
    250
}

fn default_horizon() -> usize {
    1
}

fn default_quantiles() -> usize {
    5
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.data.path, self.data.synthetic) {
            (Some(_), true) => {
                return Err(ConfigError::Invalid(
                    "data.path and data.synthetic are mutually exclusive".into(),
                ))
            }
            (None, false) => {
                return Err(ConfigError::Invalid(
                    "one of data.path or data.synthetic is required".into(),
                ))
            }
            _ => {}
        }
        if self.backtest.factor.is_empty() {
            return Err(ConfigError::Invalid("backtest.factor is required".into()));
        }
        if self.backtest.horizon < 1 {
            return Err(ConfigError::Invalid("backtest.horizon must be >= 1".into()));
        }
        if self.backtest.quantiles < 2 {
            return Err(ConfigError::Invalid(
                "backtest.quantiles must be >= 2".into(),
            ));
        }
        Ok(())
    }

    pub fn eval_config(&self) -> EvalConfig {
        EvalConfig {
            horizon: self.backtest.horizon,
            quantiles: self.backtest.quantiles,
        }
    }
}
