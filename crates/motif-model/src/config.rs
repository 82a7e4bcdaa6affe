//! Hierarchy configuration.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Configuration shared by every per-label sub-model in a hierarchy.
///
/// `states` is an upper bound: a label whose shortest training sequence has
/// fewer time-steps gets as many states as that sequence can fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmmConfig {
    /// Maximum number of hidden states per label sub-model.
    pub states: usize,

    /// Lower bound applied to every emission variance after estimation.
    /// Keeps constant training columns from collapsing the density.
    pub variance_floor: f64,

    /// Number of Viterbi re-segmentation passes after the flat start.
    pub refine_passes: usize,
}

impl Default for HmmConfig {
    fn default() -> Self {
        Self {
            states: 10,
            variance_floor: 1e-3,
            refine_passes: 2,
        }
    }
}

impl HmmConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.states == 0 {
            return Err(ModelError::InvalidConfig(
                "states must be >= 1".to_string(),
            ));
        }
        if !(self.variance_floor > 0.0) || !self.variance_floor.is_finite() {
            return Err(ModelError::InvalidConfig(format!(
                "variance_floor must be positive and finite, got {}",
                self.variance_floor
            )));
        }
        Ok(())
    }

    /// Configuration tuned for short command-like sequences: few states,
    /// a single refinement pass.
    pub fn low_latency() -> Self {
        Self {
            states: 3,
            refine_passes: 1,
            ..Default::default()
        }
    }

    /// Configuration tuned for long expressive sequences.
    pub fn detailed() -> Self {
        Self {
            states: 16,
            refine_passes: 4,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(HmmConfig::default().validate().is_ok());
        assert!(HmmConfig::low_latency().validate().is_ok());
        assert!(HmmConfig::detailed().validate().is_ok());
    }

    #[test]
    fn test_zero_states_rejected() {
        let config = HmmConfig {
            states: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ModelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bad_variance_floor_rejected() {
        for floor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = HmmConfig {
                variance_floor: floor,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "floor {floor} should fail");
        }
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = HmmConfig::detailed();
        let json = serde_json::to_string(&config).unwrap();
        let back: HmmConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
