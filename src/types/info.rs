use glam::Vec2;

/// Shape and placement of a grid: size in cells, cell edge length in meters,
/// and the world coordinate of the lower-left corner of cell (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MapInfo {
    pub width: u32,
    pub height: u32,
    pub resolution: f32,
    pub origin: Vec2,
}
