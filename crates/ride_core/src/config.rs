//! JSON rate configuration.
//!
//! ```json
//! { "version": 1, "rates": { "bike": 70, "rickshaw": 110, "mini": 170, "ac_car": 224 } }
//! ```
//!
//! Missing files are an error here; callers that want the built-in table use
//! [`RateConfig::default`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fare::FareEstimator;
use crate::tier::{RateTable, VehicleTier};

pub const RATE_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    InvalidFormat(String),
    #[error("base rate for {tier} must be a positive number, got {rate}")]
    InvalidRate { tier: VehicleTier, rate: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateConfig {
    pub version: u32,
    pub rates: RateTable,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            version: RATE_CONFIG_VERSION,
            rates: RateTable::standard(),
        }
    }
}

impl RateConfig {
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: RateConfig = serde_json::from_str(contents)
            .map_err(|error| ConfigError::InvalidFormat(format!("invalid rate config: {error}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|error| {
            ConfigError::Io(format!(
                "failed to read rate config '{}': {error}",
                path.display()
            ))
        })?;
        let config = Self::from_json_str(&contents).map_err(|error| match error {
            ConfigError::InvalidFormat(message) => {
                ConfigError::InvalidFormat(format!("{message} in '{}'", path.display()))
            }
            other => other,
        })?;
        debug!(path = %path.display(), tiers = config.rates.len(), "loaded rate config");
        Ok(config)
    }

    /// Check version and that every configured rate is finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != RATE_CONFIG_VERSION {
            return Err(ConfigError::InvalidFormat(format!(
                "unsupported rate config version {}",
                self.version
            )));
        }
        if self.rates.is_empty() {
            return Err(ConfigError::InvalidFormat(
                "rate config must configure at least one tier".to_string(),
            ));
        }
        for (tier, rate) in self.rates.iter() {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(ConfigError::InvalidRate { tier, rate });
            }
        }
        Ok(())
    }

    pub fn into_estimator(self) -> FareEstimator {
        FareEstimator::new(self.rates)
    }
}
