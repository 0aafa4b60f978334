/// Cost of a cell known to be traversable.
pub const COST_FREE: u8 = 0;
/// A footprint centered on a cell at or above this value is in collision
/// regardless of orientation.
pub const COST_INSCRIBED: u8 = 253;
/// Cell contains an obstacle.
pub const COST_LETHAL: u8 = 254;
/// Nothing is known about the cell.
pub const COST_UNKNOWN: u8 = 255;
