pub mod constants;
pub mod error;
pub mod geometry;
pub mod info;

pub use constants::*;
pub use error::PlannerError;
pub use geometry::{
    normalize_angle, shortest_angular_distance, Bounds, CellRegion, Footprint, Pose2, Velocity2,
};
pub use info::MapInfo;
