//! Layered costmap: master grid plus the layer seam.
//!
//! The orchestrator owns the master grid; layers each expand the update
//! bounds, then stamp their cells into the master within the computed region.
//! Layers are wired at boot and passed in per update so the ingestion side
//! can keep exclusive access to them between updates.

use glam::{UVec2, Vec2};

use crate::grid::{Costmap, Grid2d};
use crate::types::{Bounds, CellRegion, MapInfo, Pose2, COST_FREE, COST_UNKNOWN};

/// Layer plugin interface. Layers are called in order: each may expand bounds,
/// then each writes into the master grid within the computed region.
pub trait Layer {
    /// Reset the layer to its initial state.
    fn reset(&mut self);

    /// Whether global "clear costmap" should call reset on this layer.
    fn is_clearable(&self) -> bool;

    /// Expand the world bounds that this layer needs to update.
    /// Called once per update; layers only expand bounds, never shrink.
    fn update_bounds(&mut self, robot: Pose2, bounds: &mut Bounds);

    /// Write into the master grid only within `region`.
    fn update_costs(&mut self, master: &mut Costmap, region: CellRegion);
}

/// Master costmap shared across layers. Non-rolling masters are world-fixed;
/// a rolling master re-centers on the robot each update.
pub struct LayeredCostmap {
    master: Costmap,
    rolling: bool,
    size_locked: bool,
    updated_bounds: Bounds,
}

impl LayeredCostmap {
    pub fn new(info: MapInfo, rolling: bool, track_unknown: bool) -> Self {
        let fill = if track_unknown { COST_UNKNOWN } else { COST_FREE };
        Self {
            master: Grid2d::filled(info, fill),
            rolling,
            size_locked: false,
            updated_bounds: Bounds::empty(),
        }
    }

    pub fn is_rolling(&self) -> bool {
        self.rolling
    }

    pub fn is_size_locked(&self) -> bool {
        self.size_locked
    }

    pub fn costmap(&self) -> &Costmap {
        &self.master
    }

    pub fn costmap_mut(&mut self) -> &mut Costmap {
        &mut self.master
    }

    /// World bounds that were updated in the last `update_map` call.
    pub fn updated_bounds(&self) -> Bounds {
        self.updated_bounds
    }

    pub fn resize_map(
        &mut self,
        size: UVec2,
        resolution: f32,
        origin: Vec2,
        size_locked: bool,
    ) {
        self.size_locked = size_locked;
        self.master.resize_map(size, resolution, origin);
    }

    /// Run the update loop: optionally move origin, aggregate bounds from all
    /// layers, reset the master region, then call each layer's update_costs.
    pub fn update_map(&mut self, robot: Pose2, layers: &mut [&mut dyn Layer]) {
        if self.rolling {
            let info = self.master.info();
            let half_w = (info.width as f32) * info.resolution * 0.5;
            let half_h = (info.height as f32) * info.resolution * 0.5;
            let new_origin = robot.position - Vec2::new(half_w, half_h);
            self.master.update_origin(new_origin);
        }

        let mut bounds = Bounds::empty();
        for layer in layers.iter_mut() {
            layer.update_bounds(robot, &mut bounds);
        }

        self.updated_bounds = bounds;
        if bounds.is_empty() {
            return;
        }

        let Some(region) = self.clamp_to_cells(bounds) else {
            return;
        };

        self.master.reset_map(region.min, region.max);

        for layer in layers.iter_mut() {
            layer.update_costs(&mut self.master, region);
        }
    }

    fn clamp_to_cells(&self, bounds: Bounds) -> Option<CellRegion> {
        let width = self.master.width();
        let height = self.master.height();

        let (x0, y0) = match self.master.world_to_map(bounds.min) {
            Some(c) => (c.x.min(width), c.y.min(height)),
            None => (0, 0),
        };
        let (xn, yn) = match self.master.world_to_map(bounds.max) {
            Some(c) => ((c.x + 1).min(width), (c.y + 1).min(height)),
            None => (width, height),
        };

        if x0 >= xn || y0 >= yn {
            return None;
        }

        Some(CellRegion::new(UVec2::new(x0, y0), UVec2::new(xn, yn)))
    }
}
