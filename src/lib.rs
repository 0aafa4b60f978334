pub mod grid;
pub mod iterators;
pub mod layers;
pub mod planner;
pub mod sources;
pub mod types;

pub use grid::{Costmap, Grid2d, Layer, LayeredCostmap};
pub use layers::{StaticLayer, StaticLayerConfig};
pub use planner::{
    ControllerState, LocalPlannerCore, LocalPlannerLimits, PlannerConfig, SamplingParams,
    Trajectory,
};
pub use sources::{
    CommandSink, GlobalPlanSource, OccupancyPatch, OccupancySnapshot, OdomSource, PoseSource,
    SnapshotSource,
};
pub use types::{Bounds, CellRegion, Footprint, MapInfo, PlannerError, Pose2, Velocity2};
