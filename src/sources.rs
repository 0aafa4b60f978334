//! Contracts of the external collaborators: pose and odometry brokers, the
//! global planner, the map source feeding the static layer, and the command
//! output. The crate only consumes these seams; the host wires them at boot.

use crate::types::{MapInfo, Pose2, Velocity2};
use glam::UVec2;

/// Whole-map occupancy snapshot. `cells` is row-major,
/// `cells[row * width + col]`, in the map source's signed encoding.
#[derive(Debug, Clone)]
pub struct OccupancySnapshot {
    pub info: MapInfo,
    pub cells: Vec<i8>,
}

/// Windowed map update. `cells` is row-major over `width x height` and is
/// already in final cell-value encoding.
#[derive(Debug, Clone)]
pub struct OccupancyPatch {
    /// Cell coordinate of the patch's lower-left corner in the map grid.
    pub origin: UVec2,
    pub width: u32,
    pub height: u32,
    pub cells: Vec<u8>,
}

/// Map source polled by the static layer.
pub trait SnapshotSource {
    fn latest_snapshot(&self) -> Option<OccupancySnapshot>;
}

/// Pose broker; poses are in the global frame.
pub trait PoseSource {
    fn robot_pose(&self) -> Option<Pose2>;
}

/// Odometry estimator; velocities are in the robot body frame.
pub trait OdomSource {
    fn robot_vel(&self) -> Option<Velocity2>;
}

/// Global planner handing out the reference path for the current cycle.
/// An empty plan is a recoverable error for the caller.
pub trait GlobalPlanSource {
    fn local_plan(&self, robot: Pose2) -> Option<Vec<Pose2>>;
}

/// Command and visualization output. The plan and trajectory publications are
/// visualization only and may be dropped by the host.
pub trait CommandSink {
    fn publish_cmd_vel(&mut self, vel: Velocity2);
    fn publish_local_plan(&mut self, _plan: &[Pose2]) {}
    fn publish_trajectory(&mut self, _points: &[Pose2]) {}
}
