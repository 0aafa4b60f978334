//! Obstacle cost: sweeps the footprint along the trajectory and vetoes any
//! collision, then caps the commanded speed by the worst cell cost seen.

use glam::Vec2;

use crate::iterators::{LineIterator, PolygonIterator};
use crate::planner::costs::{CycleContext, TrajectoryCostFunction};
use crate::planner::Trajectory;
use crate::types::{Pose2, Velocity2, COST_INSCRIBED, COST_LETHAL, COST_UNKNOWN};

/// Veto returned when the footprint polygon covers a blocked or unknown cell.
const VETO_COLLISION: f32 = -6.0;
/// Veto returned when the trajectory leaves the map.
const VETO_OFF_MAP: f32 = -7.0;
/// Veto returned when no footprint was supplied.
const VETO_NO_FOOTPRINT: f32 = -9.0;
/// Veto returned when the command is too fast for the clearance available.
const VETO_TOO_FAST: f32 = -5.0;

/// Cost above which the speed cap bottoms out at its floor.
const VEL_CAP_COST: f32 = 128.0;
/// Fraction of `max_trans_vel` still allowed over high-cost cells.
const VEL_CAP_FLOOR: f32 = 0.2;

pub struct ObstacleCostFunction {
    scale: f32,
    /// Sum footprint costs over the rollout instead of keeping the last.
    sum_scores: bool,
    /// Also rasterize the footprint interior, not just its edges.
    fill_interior: bool,
}

impl ObstacleCostFunction {
    pub fn new(fill_interior: bool) -> Self {
        Self {
            scale: 1.0,
            sum_scores: false,
            fill_interior,
        }
    }

    pub fn set_sum_scores(&mut self, sum_scores: bool) {
        self.sum_scores = sum_scores;
    }

    /// Footprint vertices pushed outward by the stopping distance of the
    /// current command, then oriented at the pose. Faster commands demand
    /// more clearance in their direction of travel.
    fn inflated_footprint(pose: &Pose2, vel: Velocity2, ctx: &CycleContext<'_>) -> Vec<Vec2> {
        let limits = ctx.limits;
        let dx = 0.5 * vel.linear.x * vel.linear.x / limits.acc_lim_x.max(1e-3);
        let dy = 0.5 * vel.linear.y * vel.linear.y / limits.acc_lim_y.max(1e-3);
        let (sin, cos) = pose.yaw.sin_cos();

        ctx.footprint
            .points
            .iter()
            .map(|p| {
                let mut shifted = *p;
                if p.x > 0.0 && vel.linear.x > 0.0 {
                    shifted.x += dx;
                } else if p.x < 0.0 && vel.linear.x < 0.0 {
                    shifted.x -= dx;
                }
                if p.y > 0.0 && vel.linear.y > 0.0 {
                    shifted.y += dy;
                } else if p.y < 0.0 && vel.linear.y < 0.0 {
                    shifted.y -= dy;
                }
                Vec2::new(
                    pose.position.x + shifted.x * cos - shifted.y * sin,
                    pose.position.y + shifted.x * sin + shifted.y * cos,
                )
            })
            .collect()
    }

    /// Max cell cost under the polygon, or a veto when a cell is blocked,
    /// unknown, or the polygon leaves the map.
    fn polygon_cost(polygon: &[Vec2], ctx: &CycleContext<'_>, fill: bool) -> f32 {
        let mut max_cost = 0u8;

        for i in 0..polygon.len() {
            let a = polygon[i];
            let b = polygon[(i + 1) % polygon.len()];
            let Some(line) = LineIterator::between(ctx.costmap, a, b) else {
                return VETO_OFF_MAP;
            };
            for cell in line {
                let cost = ctx.costmap.get(cell).copied().unwrap_or(COST_UNKNOWN);
                if cost == COST_LETHAL || cost == COST_UNKNOWN {
                    return VETO_COLLISION;
                }
                max_cost = max_cost.max(cost);
            }
        }

        if fill {
            if let Some(cells) = PolygonIterator::new(ctx.costmap, polygon) {
                for cell in cells {
                    let cost = ctx.costmap.get(cell).copied().unwrap_or(COST_UNKNOWN);
                    if cost == COST_LETHAL || cost == COST_UNKNOWN {
                        return VETO_COLLISION;
                    }
                    max_cost = max_cost.max(cost);
                }
            }
        }

        max_cost as f32
    }

    fn footprint_cost(&self, pose: &Pose2, vel: Velocity2, ctx: &CycleContext<'_>) -> f32 {
        let polygon = Self::inflated_footprint(pose, vel, ctx);
        let footprint_cost = Self::polygon_cost(&polygon, ctx, self.fill_interior);
        if footprint_cost < 0.0 {
            return footprint_cost;
        }

        let Some(center) = ctx.costmap.world_to_map(pose.position) else {
            return VETO_OFF_MAP;
        };
        let center_cost = ctx.costmap.get(center).copied().unwrap_or(COST_UNKNOWN);
        if center_cost >= COST_INSCRIBED {
            return VETO_COLLISION;
        }

        let occ_cost = footprint_cost.max(center_cost as f32);

        // the dirtier the cells under the robot, the slower it may go
        let max_trans = ctx.limits.max_trans_vel;
        let floor = VEL_CAP_FLOOR * max_trans;
        let max_vel = if occ_cost < VEL_CAP_COST {
            max_trans - (max_trans - floor) / VEL_CAP_COST * occ_cost
        } else {
            floor
        };
        if vel.trans_speed() > max_vel {
            return VETO_TOO_FAST;
        }

        occ_cost
    }
}

impl TrajectoryCostFunction for ObstacleCostFunction {
    fn score(&self, traj: &Trajectory, ctx: &CycleContext<'_>) -> f32 {
        if !ctx.footprint.is_valid() {
            return VETO_NO_FOOTPRINT;
        }

        let mut cost = 0.0;
        for pose in traj.points() {
            let f_cost = self.footprint_cost(pose, traj.velocity, ctx);
            if f_cost < 0.0 {
                return f_cost;
            }
            if self.sum_scores {
                cost += f_cost;
            } else {
                cost = f_cost;
            }
        }
        cost
    }

    fn scale(&self) -> f32 {
        self.scale
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }
}
