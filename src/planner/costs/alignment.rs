//! Heading cost: penalizes trajectories whose poses point away from the
//! desired orientation chosen by the controller state.

use crate::planner::costs::{CycleContext, TrajectoryCostFunction};
use crate::planner::Trajectory;
use crate::types::shortest_angular_distance;

pub struct AlignmentCostFunction {
    scale: f32,
    desired_orientation: f32,
}

impl AlignmentCostFunction {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            desired_orientation: 0.0,
        }
    }

    pub fn set_desired_orientation(&mut self, yaw: f32) {
        self.desired_orientation = yaw;
    }

    pub fn desired_orientation(&self) -> f32 {
        self.desired_orientation
    }
}

impl Default for AlignmentCostFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl TrajectoryCostFunction for AlignmentCostFunction {
    /// Mean absolute heading error over the rollout.
    fn score(&self, traj: &Trajectory, _ctx: &CycleContext<'_>) -> f32 {
        if traj.is_empty() {
            return 0.0;
        }
        let total: f32 = traj
            .points()
            .iter()
            .map(|pose| shortest_angular_distance(pose.yaw, self.desired_orientation).abs())
            .sum();
        total / traj.len() as f32
    }

    fn scale(&self) -> f32 {
        self.scale
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }
}
