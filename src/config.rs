//! Engine tunables.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides. `EngineConfig::v0()` spells the defaults out explicitly.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tokens reserved for the model's reply when checking context windows.
pub const DEFAULT_OUTPUT_TOKEN_BUFFER: u64 = 4096;
pub const DEFAULT_PREFERENCE_BONUS_STEP: f64 = 10.0;
pub const DEFAULT_CONTEXT_WINDOW_WEIGHT: f64 = 5.0;
pub const DEFAULT_COST_WEIGHT: f64 = 20.0;
pub const DEFAULT_JITTER_EPSILON: f64 = 0.1;
/// Subtracted before rounding cents up, so 7.000000000000001 bills as 7.
pub const DEFAULT_CENTS_ROUNDING_EPSILON: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub output_token_buffer: u64,
    pub preference_bonus_step: f64,
    pub context_window_weight: f64,
    pub cost_weight: f64,
    pub jitter_epsilon: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            output_token_buffer: DEFAULT_OUTPUT_TOKEN_BUFFER,
            preference_bonus_step: DEFAULT_PREFERENCE_BONUS_STEP,
            context_window_weight: DEFAULT_CONTEXT_WINDOW_WEIGHT,
            cost_weight: DEFAULT_COST_WEIGHT,
            jitter_epsilon: DEFAULT_JITTER_EPSILON,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeteringConfig {
    pub cents_rounding_epsilon: f64,
}

impl Default for MeteringConfig {
    fn default() -> Self {
        Self {
            cents_rounding_epsilon: DEFAULT_CENTS_ROUNDING_EPSILON,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub routing: RoutingConfig,
    pub metering: MeteringConfig,
}

impl EngineConfig {
    pub fn v0() -> Self {
        Self {
            routing: RoutingConfig::default(),
            metering: MeteringConfig::default(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let f = fs::File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(f)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.routing;
        for (name, value) in [
            ("routing.preference_bonus_step", r.preference_bonus_step),
            ("routing.context_window_weight", r.context_window_weight),
            ("routing.cost_weight", r.cost_weight),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a finite positive number, got {value}"
                )));
            }
        }
        if !r.jitter_epsilon.is_finite() || r.jitter_epsilon <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "routing.jitter_epsilon must be positive, got {}",
                r.jitter_epsilon
            )));
        }
        let eps = self.metering.cents_rounding_epsilon;
        if !eps.is_finite() || !(0.0..1.0).contains(&eps) {
            return Err(ConfigError::Invalid(format!(
                "metering.cents_rounding_epsilon must be in [0, 1), got {eps}"
            )));
        }
        Ok(())
    }
}
