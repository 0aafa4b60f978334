use crate::types::{Pose2, Velocity2};

/// Forward simulation of one candidate velocity command: poses at a uniform
/// time step, the originating command, and the composite score.
///
/// A negative cost marks the trajectory as infeasible.
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub velocity: Velocity2,
    pub time_delta: f32,
    pub cost: f32,
    points: Vec<Pose2>,
}

impl Trajectory {
    pub fn new(velocity: Velocity2, time_delta: f32) -> Self {
        Self {
            velocity,
            time_delta,
            cost: 0.0,
            points: Vec::new(),
        }
    }

    /// The "no legal trajectory" marker returned when every sample is vetoed.
    pub fn sentinel() -> Self {
        Self {
            velocity: Velocity2::ZERO,
            time_delta: 0.0,
            cost: -1.0,
            points: Vec::new(),
        }
    }

    pub fn push_point(&mut self, pose: Pose2) {
        self.points.push(pose);
    }

    pub fn point(&self, index: usize) -> Option<&Pose2> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[Pose2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_legal(&self) -> bool {
        self.cost >= 0.0
    }
}
