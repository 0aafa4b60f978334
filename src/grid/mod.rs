pub mod grid2d;
pub mod layered;
pub mod merge;

pub use grid2d::Grid2d;
pub use layered::{Layer, LayeredCostmap};

/// Master and layer grids both carry interpreted cell costs.
pub type Costmap = Grid2d<u8>;
