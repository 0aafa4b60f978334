//! Path-distance cost: a wavefront distance field grown from target poses,
//! sampled under the trajectory.

use std::collections::VecDeque;

use glam::UVec2;

use crate::planner::costs::{CycleContext, TrajectoryCostFunction};
use crate::planner::Trajectory;
use crate::types::{PlannerError, Pose2, COST_INSCRIBED};

/// Cells the wavefront never reached.
const UNREACHABLE: f32 = f32::MAX;

/// Veto returned when a trajectory pose leaves the map.
const VETO_OFF_MAP: f32 = -4.0;
/// Veto returned when a trajectory pose lands on an unreached cell.
const VETO_UNREACHED: f32 = -3.0;

/// How per-pose distances combine into the trajectory cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostAggregation {
    /// Cost of the final pose only.
    Last,
    /// Sum over every pose.
    Sum,
}

pub struct MapGridCostFunction {
    scale: f32,
    aggregation: CostAggregation,
    targets: Vec<Pose2>,
    distances: Vec<f32>,
    width: u32,
    height: u32,
}

impl MapGridCostFunction {
    pub fn new(aggregation: CostAggregation) -> Self {
        Self {
            scale: 1.0,
            aggregation,
            targets: Vec::new(),
            distances: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    /// Poses the wavefront grows from. Set once per cycle before scoring.
    pub fn set_targets(&mut self, targets: Vec<Pose2>) {
        self.targets = targets;
    }

    fn distance_at(&self, cell: UVec2) -> f32 {
        self.distances[(cell.y * self.width + cell.x) as usize]
    }
}

impl TrajectoryCostFunction for MapGridCostFunction {
    /// Breadth-first wavefront, 4-connected, walking around cells at or
    /// above the inscribed cost. Distances are in cells.
    fn prepare(&mut self, ctx: &CycleContext<'_>) -> Result<(), PlannerError> {
        let costmap = ctx.costmap;
        self.width = costmap.width();
        self.height = costmap.height();
        self.distances.clear();
        self.distances
            .resize((self.width as usize) * (self.height as usize), UNREACHABLE);

        if self.targets.is_empty() {
            return Err(PlannerError::NotInitialized(
                "map grid cost function scored before targets were set".to_string(),
            ));
        }

        let mut queue = VecDeque::new();
        for target in &self.targets {
            // targets outside the map contribute nothing
            let Some(cell) = costmap.world_to_map(target.position) else {
                continue;
            };
            let idx = (cell.y * self.width + cell.x) as usize;
            if self.distances[idx] != 0.0 {
                self.distances[idx] = 0.0;
                queue.push_back(cell);
            }
        }

        while let Some(cell) = queue.pop_front() {
            let dist = self.distance_at(cell);
            let neighbors = [
                (cell.x.wrapping_sub(1), cell.y),
                (cell.x + 1, cell.y),
                (cell.x, cell.y.wrapping_sub(1)),
                (cell.x, cell.y + 1),
            ];
            for (nx, ny) in neighbors {
                if nx >= self.width || ny >= self.height {
                    continue;
                }
                let neighbor = UVec2::new(nx, ny);
                let cost = ctx.costmap.get(neighbor).copied().unwrap_or(COST_INSCRIBED);
                if cost >= COST_INSCRIBED {
                    continue;
                }
                let idx = (ny * self.width + nx) as usize;
                if self.distances[idx] > dist + 1.0 {
                    self.distances[idx] = dist + 1.0;
                    queue.push_back(neighbor);
                }
            }
        }

        Ok(())
    }

    fn score(&self, traj: &Trajectory, ctx: &CycleContext<'_>) -> f32 {
        let mut total = 0.0;
        let mut last = 0.0;
        for pose in traj.points() {
            let Some(cell) = ctx.costmap.world_to_map(pose.position) else {
                return VETO_OFF_MAP;
            };
            let dist = self.distance_at(cell);
            if dist == UNREACHABLE {
                return VETO_UNREACHED;
            }
            total += dist;
            last = dist;
        }
        match self.aggregation {
            CostAggregation::Last => last,
            CostAggregation::Sum => total,
        }
    }

    fn scale(&self) -> f32 {
        self.scale
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }
}
