//! Oscillation suppression: once a committed command flips sign on an axis,
//! samples flipping back are vetoed until the robot has moved far enough
//! from the point where the flip happened.

use glam::Vec2;

use crate::planner::costs::{CycleContext, TrajectoryCostFunction};
use crate::planner::Trajectory;

const VETO_OSCILLATION: f32 = -2.0;

/// Velocities below this magnitude carry no direction.
const SIGN_DEADBAND: f32 = 1e-3;

pub struct OscillationCostFunction {
    scale: f32,
    oscillation_reset_dist: f32,
    /// Sign of the last committed command per axis, zero when stationary.
    prev_x: f32,
    prev_y: f32,
    prev_theta: f32,
    /// Forbidden sign per axis while latched.
    forbid_x: Option<f32>,
    forbid_y: Option<f32>,
    forbid_theta: Option<f32>,
    latch_position: Option<Vec2>,
}

impl OscillationCostFunction {
    pub fn new(oscillation_reset_dist: f32) -> Self {
        Self {
            scale: 0.0,
            oscillation_reset_dist,
            prev_x: 0.0,
            prev_y: 0.0,
            prev_theta: 0.0,
            forbid_x: None,
            forbid_y: None,
            forbid_theta: None,
            latch_position: None,
        }
    }

    pub fn reset(&mut self) {
        self.prev_x = 0.0;
        self.prev_y = 0.0;
        self.prev_theta = 0.0;
        self.forbid_x = None;
        self.forbid_y = None;
        self.forbid_theta = None;
        self.latch_position = None;
    }

    /// Record the command the cycle committed to. Call once per cycle with
    /// the robot position at commit time.
    pub fn update(&mut self, robot_position: Vec2, committed: &Trajectory) {
        if let Some(latch) = self.latch_position {
            if robot_position.distance(latch) > self.oscillation_reset_dist {
                self.forbid_x = None;
                self.forbid_y = None;
                self.forbid_theta = None;
                self.latch_position = None;
            }
        }

        let vel = committed.velocity;
        let mut latched = false;
        latched |= latch_axis(vel.linear.x, &mut self.prev_x, &mut self.forbid_x);
        latched |= latch_axis(vel.linear.y, &mut self.prev_y, &mut self.forbid_y);
        latched |= latch_axis(vel.angular, &mut self.prev_theta, &mut self.forbid_theta);
        if latched {
            self.latch_position = Some(robot_position);
        }
    }
}

fn sign_of(value: f32) -> f32 {
    if value > SIGN_DEADBAND {
        1.0
    } else if value < -SIGN_DEADBAND {
        -1.0
    } else {
        0.0
    }
}

/// Returns true when a fresh flip latched the axis.
fn latch_axis(value: f32, prev: &mut f32, forbid: &mut Option<f32>) -> bool {
    let sign = sign_of(value);
    if sign == 0.0 {
        return false;
    }
    let flipped = *prev != 0.0 && sign != *prev;
    if flipped {
        *forbid = Some(*prev);
    }
    *prev = sign;
    flipped
}

impl TrajectoryCostFunction for OscillationCostFunction {
    fn score(&self, traj: &Trajectory, _ctx: &CycleContext<'_>) -> f32 {
        let vel = traj.velocity;
        let violates = |forbid: &Option<f32>, value: f32| match forbid {
            Some(sign) => sign_of(value) == *sign,
            None => false,
        };
        if violates(&self.forbid_x, vel.linear.x)
            || violates(&self.forbid_y, vel.linear.y)
            || violates(&self.forbid_theta, vel.angular)
        {
            return VETO_OSCILLATION;
        }
        0.0
    }

    fn scale(&self) -> f32 {
        self.scale
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }
}
