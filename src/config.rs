//! Processor configuration
//!
//! Tunables fixed for the lifetime of a processor. Loadable from JSON; every
//! field has a default so partial documents are accepted.

use serde::{Deserialize, Serialize};

use crate::dsp::{MixingRule, DEFAULT_MIXER_CAPACITY};
use crate::error::{HighpassError, Result};

/// Default parameter smoothing time in seconds
pub const DEFAULT_SMOOTHING_SECONDS: f64 = 0.05;

/// Longest accepted smoothing time in seconds
pub const MAX_SMOOTHING_SECONDS: f64 = 10.0;

/// Configuration for a [`HighpassProcessor`](crate::HighpassProcessor)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighpassConfig {
    /// Time for a parameter ramp to settle to -80 dB of its step
    pub smoothing_seconds: f64,
    /// Dry capture capacity in samples per channel; longer blocks are chunked
    pub mixer_capacity: usize,
    /// Gain law used by the dry/wet mixer
    pub mixing_rule: MixingRule,
}

impl Default for HighpassConfig {
    fn default() -> Self {
        Self {
            smoothing_seconds: DEFAULT_SMOOTHING_SECONDS,
            mixer_capacity: DEFAULT_MIXER_CAPACITY,
            mixing_rule: MixingRule::Linear,
        }
    }
}

impl HighpassConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: HighpassConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a JSON document
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate field ranges
    pub fn validate(&self) -> Result<()> {
        if !self.smoothing_seconds.is_finite()
            || self.smoothing_seconds < 0.0
            || self.smoothing_seconds > MAX_SMOOTHING_SECONDS
        {
            return Err(HighpassError::InvalidConfig {
                field: "smoothing_seconds",
                reason: format!(
                    "{} is outside 0 to {} seconds",
                    self.smoothing_seconds, MAX_SMOOTHING_SECONDS
                ),
            });
        }

        if self.mixer_capacity == 0 {
            return Err(HighpassError::InvalidConfig {
                field: "mixer_capacity",
                reason: "capacity must be at least one sample".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HighpassConfig::default();
        assert_eq!(config.smoothing_seconds, 0.05);
        assert_eq!(config.mixer_capacity, 256);
        assert_eq!(config.mixing_rule, MixingRule::Linear);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = HighpassConfig::from_json(r#"{ "mixing_rule": "sin_3db" }"#).unwrap();
        assert_eq!(config.mixing_rule, MixingRule::Sin3dB);
        assert_eq!(config.mixer_capacity, 256);

        let config = HighpassConfig::from_json("{}").unwrap();
        assert_eq!(config, HighpassConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = HighpassConfig {
            smoothing_seconds: 0.02,
            mixer_capacity: 512,
            mixing_rule: MixingRule::Balanced,
        };
        let json = config.to_json().unwrap();
        assert_eq!(HighpassConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_config() {
        let err = HighpassConfig::from_json(r#"{ "mixer_capacity": 0 }"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");

        let config = HighpassConfig {
            smoothing_seconds: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let err = HighpassConfig::from_json("not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
