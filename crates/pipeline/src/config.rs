//! Trainer configuration
//!
//! Layered as defaults, then an optional TOML file, then `BOOSTLAB_*`
//! environment variables. Command-line flags are applied last by the CLI.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::errors::{PipelineError, Result};
use crate::params::BoostParams;

pub const ENV_LOG_LEVEL: &str = "BOOSTLAB_LOG_LEVEL";
pub const ENV_SEED: &str = "BOOSTLAB_SEED";
pub const ENV_NUM_BOOST_ROUND: &str = "BOOSTLAB_NUM_BOOST_ROUND";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub params: BoostParams,
    pub split: SplitConfig,
    pub logging: LoggingConfig,
}

/// Train/test split configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fixed seed for a reproducible split; entropy is used when unset
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TrainerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PipelineError::Config(format!("failed to parse config: {e}")))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply `BOOSTLAB_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }

        if let Some(seed) = lookup(ENV_SEED) {
            let parsed = seed
                .trim()
                .parse()
                .map_err(|_| PipelineError::Config(format!("{ENV_SEED} must be an integer, got `{seed}`")))?;
            self.split.seed = Some(parsed);
        }

        if let Some(rounds) = lookup(ENV_NUM_BOOST_ROUND) {
            self.params.set("num_boost_round", &rounds)?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        match self.logging.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(PipelineError::Config(format!("unknown log level `{other}`"))),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PipelineError::Config(format!("failed to serialize config: {e}")))
    }
}
