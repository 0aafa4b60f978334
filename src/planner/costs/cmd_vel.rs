//! Direction prior on the commanded velocity itself: six coefficients weight
//! the positive and negative parts of each axis, biasing the sampler toward
//! forward motion, against strafing, and so on.

use serde::Deserialize;

use crate::planner::costs::{CycleContext, TrajectoryCostFunction};
use crate::planner::Trajectory;

/// Per-direction penalty weights. Coefficients are typically non-negative;
/// a net negative score vetoes the sample under the scoring contract.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct CmdVelCoefficients {
    pub pos_x: f32,
    pub neg_x: f32,
    pub pos_y: f32,
    pub neg_y: f32,
    pub pos_theta: f32,
    pub neg_theta: f32,
}

pub struct CmdVelCostFunction {
    scale: f32,
    coefficients: CmdVelCoefficients,
}

impl CmdVelCostFunction {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            coefficients: CmdVelCoefficients::default(),
        }
    }

    pub fn set_coefficients(&mut self, coefficients: CmdVelCoefficients) {
        self.coefficients = coefficients;
    }
}

impl Default for CmdVelCostFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl TrajectoryCostFunction for CmdVelCostFunction {
    fn score(&self, traj: &Trajectory, _ctx: &CycleContext<'_>) -> f32 {
        let c = &self.coefficients;
        let vel = traj.velocity;
        c.pos_x * vel.linear.x.max(0.0)
            + c.neg_x * (-vel.linear.x).max(0.0)
            + c.pos_y * vel.linear.y.max(0.0)
            + c.neg_y * (-vel.linear.y).max(0.0)
            + c.pos_theta * vel.angular.max(0.0)
            + c.neg_theta * (-vel.angular).max(0.0)
    }

    fn scale(&self) -> f32 {
        self.scale
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }
}
