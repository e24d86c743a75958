//! # Ecology Parameters
//!
//! Every constant of the model, loadable from the `[ecology]` section of the
//! server config.

use serde::{Deserialize, Serialize};

use crate::error::{EcologyError, EcologyResult};

/// Tunables of the ecology model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcologyParams {
    /// Nutrient level at which ground turns vegetated and below which
    /// vegetation withers.
    pub vegetation_cutoff: f64,
    /// Chance per tick that a ground/vegetated tile decays.
    pub decay_chance: f64,
    /// Decay amount is `decay_scale * r * (cycle + 0.5)`.
    pub decay_scale: f64,
    /// Bonus for vegetated tiles next to water.
    pub water_bonus_vegetated: f64,
    /// Bonus for frontier tiles next to water.
    pub water_bonus_frontier: f64,
    /// Penalty next to rock.
    pub inorganic_ring1_penalty: f64,
    /// Penalty two cells from rock.
    pub inorganic_ring2_penalty: f64,
    /// Penalty next to a contamination source.
    pub contamination_penalty: f64,
    /// Chance per tick that a frontier tile grows.
    pub growth_chance: f64,
    /// Growth amount is `growth_scale * (r + growth_floor)`.
    pub growth_scale: f64,
    /// See `growth_scale`.
    pub growth_floor: f64,
    /// Length of half a day cycle, in ticks.
    pub ticks_per_cycle: u32,
}

impl Default for EcologyParams {
    fn default() -> Self {
        Self {
            vegetation_cutoff: 0.18,
            decay_chance: 0.5,
            decay_scale: 0.075,
            water_bonus_vegetated: 0.05,
            water_bonus_frontier: 0.035,
            inorganic_ring1_penalty: 0.02,
            inorganic_ring2_penalty: 0.01,
            contamination_penalty: 0.03,
            growth_chance: 0.5,
            growth_scale: 0.083,
            growth_floor: 0.4,
            ticks_per_cycle: 480,
        }
    }
}

impl EcologyParams {
    /// Parses and validates params from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`EcologyError::Config`] on malformed TOML and
    /// [`EcologyError::InvalidParams`] on out-of-range values.
    pub fn from_toml_str(source: &str) -> EcologyResult<Self> {
        let params: Self =
            toml::from_str(source).map_err(|e| EcologyError::Config(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Checks every value against its range.
    ///
    /// # Errors
    ///
    /// Returns [`EcologyError::InvalidParams`] naming the first bad value.
    pub fn validate(&self) -> EcologyResult<()> {
        let probabilities = [
            ("vegetation_cutoff", self.vegetation_cutoff),
            ("decay_chance", self.decay_chance),
            ("growth_chance", self.growth_chance),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(EcologyError::InvalidParams {
                    name,
                    reason: format!("{value} outside [0, 1]"),
                });
            }
        }

        let amounts = [
            ("decay_scale", self.decay_scale),
            ("water_bonus_vegetated", self.water_bonus_vegetated),
            ("water_bonus_frontier", self.water_bonus_frontier),
            ("inorganic_ring1_penalty", self.inorganic_ring1_penalty),
            ("inorganic_ring2_penalty", self.inorganic_ring2_penalty),
            ("contamination_penalty", self.contamination_penalty),
            ("growth_scale", self.growth_scale),
            ("growth_floor", self.growth_floor),
        ];
        for (name, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(EcologyError::InvalidParams {
                    name,
                    reason: format!("{value} must be a finite amount >= 0"),
                });
            }
        }

        if self.ticks_per_cycle == 0 {
            return Err(EcologyError::InvalidParams {
                name: "ticks_per_cycle",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert_eq!(EcologyParams::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let params = EcologyParams::from_toml_str("growth_chance = 1.0\nticks_per_cycle = 10").unwrap();
        assert!((params.growth_chance - 1.0).abs() < f64::EPSILON);
        assert_eq!(params.ticks_per_cycle, 10);
        assert!((params.vegetation_cutoff - 0.18).abs() < f64::EPSILON);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = EcologyParams::from_toml_str("decay_chance = 1.5").unwrap_err();
        assert!(matches!(
            err,
            EcologyError::InvalidParams { name: "decay_chance", .. }
        ));

        let err = EcologyParams::from_toml_str("contamination_penalty = -0.1").unwrap_err();
        assert!(matches!(
            err,
            EcologyError::InvalidParams { name: "contamination_penalty", .. }
        ));

        let err = EcologyParams::from_toml_str("ticks_per_cycle = 0").unwrap_err();
        assert!(matches!(
            err,
            EcologyError::InvalidParams { name: "ticks_per_cycle", .. }
        ));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(matches!(
            EcologyParams::from_toml_str("growth_chance = \"often\""),
            Err(EcologyError::Config(_))
        ));
    }
}
