//! Planner configuration: one immutable record covering limits, sampling,
//! state switching, and the per-state weight tables. A reconfigure between
//! cycles swaps the whole record atomically.

use std::path::Path;

use serde::Deserialize;

use crate::planner::{
    ControllerState, LocalPlannerLimits, SamplingParams, StateWeights, SwitchThresholds,
};
use crate::types::PlannerError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub limits: LocalPlannerLimits,
    pub sampling: SamplingParams,
    pub switches: SwitchThresholds,
    pub default_weights: StateWeights,
    pub align_weights: StateWeights,
    pub arrive_weights: StateWeights,
    /// Distance the robot must travel before an oscillation latch clears.
    pub oscillation_reset_dist: f32,
    /// Rasterize the footprint interior in the obstacle cost, not just its
    /// edges. Costs more per sample; needed for footprints larger than the
    /// narrowest gaps in the map.
    pub footprint_fill: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            limits: LocalPlannerLimits::default(),
            sampling: SamplingParams::default(),
            switches: SwitchThresholds::default(),
            default_weights: StateWeights::default(),
            align_weights: StateWeights::align_defaults(),
            arrive_weights: StateWeights::arrive_defaults(),
            oscillation_reset_dist: 0.05,
            footprint_fill: false,
        }
    }
}

impl PlannerConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, PlannerError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlannerError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn weights_for(&self, state: ControllerState) -> &StateWeights {
        match state {
            ControllerState::Default => &self.default_weights,
            ControllerState::Align => &self.align_weights,
            ControllerState::Arrive => &self.arrive_weights,
        }
    }

    /// Lookahead along the path for the goal distance field. Falls back to
    /// the distance covered at full speed over the rollout horizon.
    pub fn effective_lookahead(&self) -> f32 {
        if self.limits.lookahead_distance > 0.0 {
            self.limits.lookahead_distance
        } else {
            self.limits.max_trans_vel * self.sampling.sim_time
        }
    }

    fn validate(&self) -> Result<(), PlannerError> {
        if self.sampling.sim_time <= 0.0 {
            return Err(PlannerError::InvalidMetadata(
                "sim_time must be positive".to_string(),
            ));
        }
        if self.sampling.sim_granularity <= 0.0 || self.sampling.angular_sim_granularity <= 0.0 {
            return Err(PlannerError::InvalidMetadata(
                "simulation granularities must be positive".to_string(),
            ));
        }
        if self.limits.max_trans_vel < self.limits.min_trans_vel {
            return Err(PlannerError::InvalidMetadata(
                "max_trans_vel must not be below min_trans_vel".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn defaults_parse_from_empty_yaml() {
        let config = PlannerConfig::from_yaml("{}").unwrap();
        assert_relative_eq!(config.limits.max_trans_vel, 0.55);
        assert!(config.sampling.use_dwa);
    }

    #[test]
    fn yaml_overrides_nest_per_section() {
        let config = PlannerConfig::from_yaml(
            "limits:\n  max_trans_vel: 1.2\nsampling:\n  vx_samples: 7\nalign_weights:\n  plan: 2.0\n",
        )
        .unwrap();
        assert_relative_eq!(config.limits.max_trans_vel, 1.2);
        assert_eq!(config.sampling.vx_samples, 7);
        assert_relative_eq!(config.align_weights.plan, 2.0);
        // untouched sections keep their defaults
        assert_relative_eq!(config.arrive_weights.goal, 1.0);
    }

    #[test]
    fn invalid_sim_time_is_rejected() {
        let result = PlannerConfig::from_yaml("sampling:\n  sim_time: -1.0\n");
        assert!(result.is_err());
    }

    #[test]
    fn lookahead_derives_from_speed_and_horizon() {
        let config = PlannerConfig::default();
        assert_relative_eq!(
            config.effective_lookahead(),
            0.55 * 1.7,
            epsilon = 1e-5
        );

        let pinned = PlannerConfig::from_yaml("limits:\n  lookahead_distance: 2.5\n").unwrap();
        assert_relative_eq!(pinned.effective_lookahead(), 2.5);
    }
}
