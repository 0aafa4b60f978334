//! One control cycle: read robot state and path, pick a controller state,
//! retune the cost functions, sample the dynamic window, and command the
//! best legal trajectory.

use glam::Vec2;
use log::{debug, warn};

use crate::grid::Costmap;
use crate::planner::costs::{
    AlignmentCostFunction, CmdVelCostFunction, CycleContext, MapGridCostFunction,
    ObstacleCostFunction, OscillationCostFunction, TrajectoryCostFunction,
};
use crate::planner::{
    scored_sampling, ControllerState, CostAggregation, PlannerConfig, StateMachine,
    TrajectoryGenerator,
};
use crate::sources::{CommandSink, GlobalPlanSource, OdomSource, PoseSource};
use crate::types::{
    shortest_angular_distance, Footprint, PlannerError, Pose2, Velocity2,
};

/// Leading plan poses farther than this from the robot are considered passed
/// and pruned.
const PRUNE_DISTANCE: f32 = 1.0;

pub struct LocalPlannerCore {
    config: PlannerConfig,
    state_machine: StateMachine,
    generator: TrajectoryGenerator,
    obstacle_costs: ObstacleCostFunction,
    plan_costs: MapGridCostFunction,
    goal_costs: MapGridCostFunction,
    alignment_costs: AlignmentCostFunction,
    cmd_vel_costs: CmdVelCostFunction,
    oscillation_costs: OscillationCostFunction,
    /// Reference path of the last completed cycle.
    plan: Vec<Pose2>,
}

impl LocalPlannerCore {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            state_machine: StateMachine::new(config.switches),
            generator: TrajectoryGenerator::new(config.sampling),
            obstacle_costs: ObstacleCostFunction::new(config.footprint_fill),
            plan_costs: MapGridCostFunction::new(CostAggregation::Last),
            goal_costs: MapGridCostFunction::new(CostAggregation::Last),
            alignment_costs: AlignmentCostFunction::new(),
            cmd_vel_costs: CmdVelCostFunction::new(),
            oscillation_costs: OscillationCostFunction::new(config.oscillation_reset_dist),
            plan: Vec::new(),
            config,
        }
    }

    /// Atomically replace the configuration. Must not be called mid-cycle;
    /// the `&mut self` receiver makes that structural.
    pub fn reconfigure(&mut self, config: PlannerConfig) {
        self.state_machine.set_thresholds(config.switches);
        self.generator.set_params(config.sampling);
        self.oscillation_costs = OscillationCostFunction::new(config.oscillation_reset_dist);
        self.obstacle_costs = ObstacleCostFunction::new(config.footprint_fill);
        self.config = config;
        debug!("planner reconfigured");
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn state(&self) -> Option<ControllerState> {
        self.state_machine.state()
    }

    /// Run one cycle. On success the commanded velocity is both published to
    /// the sink and returned; when every sample is vetoed a zero command is
    /// published and `NoLegalTrajectory` is returned.
    pub fn compute_velocity_commands(
        &mut self,
        costmap: &Costmap,
        footprint: &Footprint,
        pose_source: &dyn PoseSource,
        odom_source: &dyn OdomSource,
        plan_source: &dyn GlobalPlanSource,
        sink: &mut dyn CommandSink,
    ) -> Result<Velocity2, PlannerError> {
        let pose = pose_source
            .robot_pose()
            .ok_or(PlannerError::PoseUnavailable)?;
        let vel = odom_source
            .robot_vel()
            .ok_or(PlannerError::PoseUnavailable)?;
        let mut plan = plan_source
            .local_plan(pose)
            .ok_or(PlannerError::PlanUnavailable)?;
        if plan.is_empty() {
            warn!("received an empty local plan");
            return Err(PlannerError::EmptyPlan);
        }

        if self.config.limits.prune_plan {
            prune_plan(&mut plan, pose);
        }
        sink.publish_local_plan(&plan);

        self.update_plan_and_local_costs(pose, &plan);
        self.plan = plan;

        let ctx = CycleContext {
            costmap,
            footprint,
            limits: &self.config.limits,
        };
        self.generator.initialise(pose, vel, &self.config.limits);
        let mut critics: [&mut dyn TrajectoryCostFunction; 6] = [
            &mut self.obstacle_costs,
            &mut self.plan_costs,
            &mut self.goal_costs,
            &mut self.alignment_costs,
            &mut self.cmd_vel_costs,
            &mut self.oscillation_costs,
        ];
        let best =
            scored_sampling::find_best_trajectory(&mut self.generator, &mut critics, &ctx, None);

        if best.is_legal() {
            self.oscillation_costs.update(pose.position, &best);
            sink.publish_cmd_vel(best.velocity);
            sink.publish_trajectory(best.points());
            Ok(best.velocity)
        } else {
            let fallback = decelerated_velocity(vel, &self.config);
            warn!(
                "all trajectories discarded (cost {}); max deceleration would command \
                 ({:.3}, {:.3}, {:.3})",
                best.cost, fallback.linear.x, fallback.linear.y, fallback.angular
            );
            sink.publish_cmd_vel(Velocity2::ZERO);
            sink.publish_trajectory(&[]);
            Err(PlannerError::NoLegalTrajectory)
        }
    }

    /// Arrival predicate, evaluated against the last cycle's path.
    pub fn is_goal_reached(&self, pose: Pose2, vel: Velocity2) -> Result<bool, PlannerError> {
        let goal = self.plan.last().ok_or_else(|| {
            PlannerError::NotInitialized("goal queried before the first cycle".to_string())
        })?;
        let limits = &self.config.limits;
        let xy_to_goal = pose.position.distance(goal.position);
        let angle_to_goal = shortest_angular_distance(pose.yaw, goal.yaw);
        Ok(xy_to_goal <= limits.xy_goal_tolerance
            && angle_to_goal.abs() <= limits.yaw_goal_tolerance
            && stopped(vel, limits.trans_stopped_vel, limits.rot_stopped_vel))
    }

    fn update_plan_and_local_costs(&mut self, pose: Pose2, plan: &[Pose2]) {
        let first = plan[0];
        let last = plan[plan.len() - 1];
        let yaw_error = shortest_angular_distance(pose.yaw, first.yaw);
        let plan_distance = pose.position.distance(first.position);
        let goal_distance = pose.position.distance(last.position);

        let state = self
            .state_machine
            .determine_state(yaw_error, plan_distance, goal_distance);

        let weights = self.config.weights_for(state);
        self.alignment_costs.set_scale(weights.alignment);
        self.plan_costs.set_scale(weights.plan);
        self.goal_costs.set_scale(weights.goal);
        self.cmd_vel_costs.set_scale(weights.cmd_vel);
        self.cmd_vel_costs
            .set_coefficients(weights.cmd_vel_coefficients);
        self.obstacle_costs.set_scale(weights.obstacle);

        self.alignment_costs.set_desired_orientation(match state {
            ControllerState::Arrive => last.yaw,
            _ => first.yaw,
        });

        self.plan_costs.set_targets(plan.to_vec());
        self.goal_costs
            .set_targets(path_from_lookahead(plan, self.config.effective_lookahead()));
    }
}

/// True when both velocity components are below their stopped thresholds.
pub fn stopped(vel: Velocity2, trans_stopped_vel: f32, rot_stopped_vel: f32) -> bool {
    vel.trans_speed() <= trans_stopped_vel && vel.angular.abs() <= rot_stopped_vel
}

/// Drop leading poses the robot has already passed, keeping at least the
/// first pose within range.
fn prune_plan(plan: &mut Vec<Pose2>, pose: Pose2) {
    if let Some(first_near) = plan
        .iter()
        .position(|p| pose.position.distance(p.position) <= PRUNE_DISTANCE)
    {
        plan.drain(..first_near);
    }
}

/// Poses at or beyond `lookahead` of accumulated path length; falls back to
/// the final pose when the path is shorter than the lookahead.
fn path_from_lookahead(plan: &[Pose2], lookahead: f32) -> Vec<Pose2> {
    let mut walked = 0.0;
    for (i, window) in plan.windows(2).enumerate() {
        walked += window[0].position.distance(window[1].position);
        if walked >= lookahead {
            return plan[i + 1..].to_vec();
        }
    }
    plan.last().map(|p| vec![*p]).unwrap_or_default()
}

/// Velocity after one control period of maximum braking, the command the
/// caller may fall back to when every sample is rejected. The translational
/// budget is split across x and y in proportion to their speeds.
fn decelerated_velocity(vel: Velocity2, config: &PlannerConfig) -> Velocity2 {
    let limits = &config.limits;
    let period = config.sampling.sim_period;
    let v0 = vel.linear.x.abs();
    let v1 = vel.linear.y.abs();
    let total = (v0 + v1).max(1e-6);

    let brake = |v: f32, share: f32, acc: f32| -> f32 {
        if v > 0.0 {
            (v - share / total * acc * period).max(0.0)
        } else if v < 0.0 {
            (v + share / total * acc * period).min(0.0)
        } else {
            0.0
        }
    };

    let vx = brake(vel.linear.x, v0, limits.acc_limit_trans);
    let vy = brake(vel.linear.y, v1, limits.acc_limit_trans);
    let vth = if vel.angular > 0.0 {
        (vel.angular - limits.acc_lim_theta * period).max(0.0)
    } else {
        (vel.angular + limits.acc_lim_theta * period).min(0.0)
    };

    Velocity2 {
        linear: Vec2::new(vx, vy),
        angular: vth,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn straight_plan(n: usize, spacing: f32) -> Vec<Pose2> {
        (0..n)
            .map(|i| Pose2::new(Vec2::new(i as f32 * spacing, 0.0), 0.0))
            .collect()
    }

    #[test]
    fn prune_drops_passed_poses() {
        let mut plan = straight_plan(10, 0.5);
        let pose = Pose2::new(Vec2::new(3.0, 0.0), 0.0);
        prune_plan(&mut plan, pose);
        // poses closer than a meter from the robot survive
        assert_relative_eq!(plan[0].position.x, 2.0);
        assert_eq!(plan.len(), 6);
    }

    #[test]
    fn prune_keeps_far_plan_untouched() {
        let mut plan = straight_plan(3, 0.5);
        let pose = Pose2::new(Vec2::new(50.0, 0.0), 0.0);
        prune_plan(&mut plan, pose);
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn lookahead_splits_the_path() {
        let plan = straight_plan(10, 0.5);
        let tail = path_from_lookahead(&plan, 2.0);
        assert_relative_eq!(tail[0].position.x, 2.0);
        assert_eq!(tail.len(), 6);
    }

    #[test]
    fn lookahead_beyond_path_keeps_goal() {
        let plan = straight_plan(4, 0.5);
        let tail = path_from_lookahead(&plan, 10.0);
        assert_eq!(tail.len(), 1);
        assert_relative_eq!(tail[0].position.x, 1.5);
    }

    #[test]
    fn deceleration_splits_translation_budget() {
        let config = PlannerConfig::default();
        // acc_limit_trans 2.5 over 0.1 s removes 0.25 m/s, split by share
        let vel = Velocity2::new(0.3, 0.1, 0.5);
        let out = decelerated_velocity(vel, &config);
        assert_relative_eq!(out.linear.x, 0.3 - 0.75 * 0.25, epsilon = 1e-4);
        assert_relative_eq!(out.linear.y, 0.1 - 0.25 * 0.25, epsilon = 1e-4);
        assert_relative_eq!(out.angular, 0.5 - 0.32, epsilon = 1e-4);
    }

    #[test]
    fn deceleration_never_crosses_zero() {
        let config = PlannerConfig::default();
        let out = decelerated_velocity(Velocity2::new(0.01, -0.01, 0.05), &config);
        assert_relative_eq!(out.linear.x, 0.0);
        assert_relative_eq!(out.linear.y, 0.0);
        assert_relative_eq!(out.angular, 0.0);
    }

    #[test]
    fn stopped_checks_both_components() {
        assert!(stopped(Velocity2::new(0.05, 0.0, 0.05), 0.1, 0.1));
        assert!(!stopped(Velocity2::new(0.2, 0.0, 0.0), 0.1, 0.1));
        assert!(!stopped(Velocity2::new(0.0, 0.0, 0.2), 0.1, 0.1));
    }
}
