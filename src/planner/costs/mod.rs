//! Trajectory cost functions.
//!
//! Every cost function scores a rolled-out trajectory against the per-cycle
//! context. A negative score vetoes the trajectory outright; a non-negative
//! score is weighted by the function's scale and summed by the scored
//! sampling planner. Vetoes apply even when the scale is zero.

pub mod alignment;
pub mod cmd_vel;
pub mod map_grid;
pub mod obstacle;
pub mod oscillation;

pub use alignment::AlignmentCostFunction;
pub use cmd_vel::{CmdVelCoefficients, CmdVelCostFunction};
pub use map_grid::{CostAggregation, MapGridCostFunction};
pub use obstacle::ObstacleCostFunction;
pub use oscillation::OscillationCostFunction;

use crate::grid::Costmap;
use crate::planner::{LocalPlannerLimits, Trajectory};
use crate::types::{Footprint, PlannerError};

/// Read-only state shared by all cost functions for one scoring round.
/// Assembled by the cycle owner before sampling starts.
pub struct CycleContext<'a> {
    pub costmap: &'a Costmap,
    pub footprint: &'a Footprint,
    pub limits: &'a LocalPlannerLimits,
}

pub trait TrajectoryCostFunction {
    /// Called once per scoring round before any trajectory is scored.
    fn prepare(&mut self, _ctx: &CycleContext<'_>) -> Result<(), PlannerError> {
        Ok(())
    }

    /// Score one trajectory. Negative return values veto it.
    fn score(&self, traj: &Trajectory, ctx: &CycleContext<'_>) -> f32;

    fn scale(&self) -> f32;

    fn set_scale(&mut self, scale: f32);
}
