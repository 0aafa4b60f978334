//! Velocity sampling within the dynamic window and forward simulation of
//! each sample into a trajectory.

use glam::Vec2;
use serde::Deserialize;

use crate::planner::{LocalPlannerLimits, Trajectory};
use crate::types::{Pose2, Velocity2};

/// Sampling and simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    pub vx_samples: u32,
    pub vy_samples: u32,
    pub vth_samples: u32,
    /// Rollout horizon in seconds.
    pub sim_time: f32,
    /// Control period used to bound the reachable window.
    pub sim_period: f32,
    /// Translational spacing between simulated poses, in meters.
    pub sim_granularity: f32,
    /// Angular spacing between simulated poses, in radians.
    pub angular_sim_granularity: f32,
    /// When false the window is the whole velocity limit box regardless of
    /// the current velocity.
    pub use_dwa: bool,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            vx_samples: 3,
            vy_samples: 10,
            vth_samples: 20,
            sim_time: 1.7,
            sim_period: 0.1,
            sim_granularity: 0.025,
            angular_sim_granularity: 0.1,
            use_dwa: true,
        }
    }
}

/// Enumerates the velocity samples of one scoring round and rolls each out
/// to a trajectory. Samples are indexed deterministically; callers may pull
/// them in order with [`next_trajectory`](Self::next_trajectory) or address
/// one directly by index.
pub struct TrajectoryGenerator {
    params: SamplingParams,
    pos: Pose2,
    samples: Vec<Velocity2>,
    next_sample: usize,
}

impl TrajectoryGenerator {
    pub fn new(params: SamplingParams) -> Self {
        Self {
            params,
            pos: Pose2::default(),
            samples: Vec::new(),
            next_sample: 0,
        }
    }

    pub fn set_params(&mut self, params: SamplingParams) {
        self.params = params;
    }

    /// Compute the dynamic window for the current velocity and rebuild the
    /// sample list. Resets the iteration cursor.
    pub fn initialise(&mut self, pos: Pose2, vel: Velocity2, limits: &LocalPlannerLimits) {
        self.pos = pos;
        self.next_sample = 0;
        self.samples.clear();

        let p = &self.params;
        let (x_range, y_range, th_range) = if p.use_dwa {
            (
                window_axis(
                    vel.linear.x,
                    limits.acc_lim_x,
                    p.sim_period,
                    limits.min_vel_x,
                    limits.max_vel_x,
                ),
                window_axis(
                    vel.linear.y,
                    limits.acc_lim_y,
                    p.sim_period,
                    limits.min_vel_y,
                    limits.max_vel_y,
                ),
                window_axis(
                    vel.angular,
                    limits.acc_lim_theta,
                    p.sim_period,
                    -limits.max_rot_vel,
                    limits.max_rot_vel,
                ),
            )
        } else {
            (
                (limits.min_vel_x, limits.max_vel_x),
                (limits.min_vel_y, limits.max_vel_y),
                (-limits.max_rot_vel, limits.max_rot_vel),
            )
        };

        for vx in sample_axis(x_range.0, x_range.1, p.vx_samples) {
            for vy in sample_axis(y_range.0, y_range.1, p.vy_samples) {
                for vth in sample_axis(th_range.0, th_range.1, p.vth_samples) {
                    let trans = Vec2::new(vx, vy).length();
                    if trans > limits.max_trans_vel {
                        continue;
                    }
                    if trans < limits.min_trans_vel && vth.abs() < limits.min_rot_vel {
                        continue;
                    }
                    self.samples.push(Velocity2::new(vx, vy, vth));
                }
            }
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn next_trajectory(&mut self) -> Option<Trajectory> {
        let traj = self.trajectory_for_sample(self.next_sample)?;
        self.next_sample += 1;
        Some(traj)
    }

    pub fn trajectory_for_sample(&self, index: usize) -> Option<Trajectory> {
        let vel = *self.samples.get(index)?;
        Some(self.generate(vel))
    }

    fn generate(&self, vel: Velocity2) -> Trajectory {
        let p = &self.params;
        // as many steps as the finer of the two granularities demands
        let linear_steps = vel.trans_speed() * p.sim_time / p.sim_granularity;
        let angular_steps = vel.angular.abs() * p.sim_time / p.angular_sim_granularity;
        let steps = (linear_steps.max(angular_steps).ceil() as usize).max(1);
        let dt = p.sim_time / steps as f32;

        let mut traj = Trajectory::new(vel, dt);
        let mut pose = self.pos;
        for _ in 0..steps {
            traj.push_point(pose);
            pose = integrate(pose, vel, dt);
        }
        traj
    }
}

fn window_axis(vel: f32, acc: f32, period: f32, min: f32, max: f32) -> (f32, f32) {
    ((vel - acc * period).max(min), (vel + acc * period).min(max))
}

/// Uniform samples over [min, max] with endpoints included; a single sample
/// sits at the window center.
fn sample_axis(min: f32, max: f32, count: u32) -> Vec<f32> {
    if count <= 1 || max <= min {
        return vec![(min + max) * 0.5];
    }
    let step = (max - min) / (count - 1) as f32;
    (0..count).map(|i| min + step * i as f32).collect()
}

fn integrate(pose: Pose2, vel: Velocity2, dt: f32) -> Pose2 {
    let (sin, cos) = pose.yaw.sin_cos();
    Pose2 {
        position: Vec2::new(
            pose.position.x + (vel.linear.x * cos - vel.linear.y * sin) * dt,
            pose.position.y + (vel.linear.x * sin + vel.linear.y * cos) * dt,
        ),
        yaw: pose.yaw + vel.angular * dt,
    }
}
