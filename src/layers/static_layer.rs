//! Static map layer: turns occupancy snapshots and windowed patches from the
//! map source into master-grid cell values, and reports the dirty rectangle
//! to the layered costmap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use glam::UVec2;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::grid::{merge, Costmap, Grid2d, Layer, LayeredCostmap};
use crate::sources::{OccupancyPatch, OccupancySnapshot, SnapshotSource};
use crate::types::{
    Bounds, CellRegion, PlannerError, Pose2, COST_FREE, COST_LETHAL, COST_UNKNOWN,
};

/// Static layer configuration, fixed at initialization.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticLayerConfig {
    #[serde(default = "default_map_topic")]
    pub map_topic: String,
    #[serde(default)]
    pub subscribe_to_updates: bool,
    /// When false, unknown map cells are read as free space.
    #[serde(default = "default_true")]
    pub track_unknown_space: bool,
    /// Merge with the master by maximum instead of overwriting.
    #[serde(default)]
    pub use_maximum: bool,
    /// Occupancy values at or above this are lethal. Clamped to [0, 100].
    #[serde(default = "default_lethal_threshold")]
    pub lethal_threshold: u8,
    /// Raw cell value the map source uses for "unknown".
    #[serde(default = "default_unknown_cost_value")]
    pub unknown_cost_value: i8,
    /// When true, cells are only ever free or lethal; otherwise occupancy is
    /// scaled into the ordinal cost range.
    #[serde(default = "default_true")]
    pub trinary_costmap: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_map_topic() -> String {
    "map".to_string()
}

fn default_true() -> bool {
    true
}

fn default_lethal_threshold() -> u8 {
    100
}

fn default_unknown_cost_value() -> i8 {
    -1
}

impl Default for StaticLayerConfig {
    fn default() -> Self {
        Self {
            map_topic: default_map_topic(),
            subscribe_to_updates: false,
            track_unknown_space: true,
            use_maximum: false,
            lethal_threshold: default_lethal_threshold(),
            unknown_cost_value: default_unknown_cost_value(),
            trinary_costmap: true,
            enabled: true,
        }
    }
}

pub struct StaticLayer {
    config: StaticLayerConfig,
    grid: Costmap,
    /// Whether the layered costmap this layer stamps into is rolling.
    /// Cached from the orchestrator when the first snapshot arrives.
    rolling: bool,
    map_received: bool,
    has_updated_data: bool,
    dirty: CellRegion,
    extra_bounds: Option<Bounds>,
}

impl StaticLayer {
    pub fn new(mut config: StaticLayerConfig) -> Self {
        config.lethal_threshold = config.lethal_threshold.min(100);
        Self {
            config,
            grid: Grid2d::filled(Default::default(), COST_UNKNOWN),
            rolling: false,
            map_received: false,
            has_updated_data: false,
            dirty: CellRegion::new(UVec2::ZERO, UVec2::ZERO),
            extra_bounds: None,
        }
    }

    pub fn map_received(&self) -> bool {
        self.map_received
    }

    pub fn grid(&self) -> &Costmap {
        &self.grid
    }

    /// Block until the map source produces its first snapshot, polling at
    /// 10 Hz. Returns `NotInitialized` when shutdown is requested first.
    pub fn wait_for_map(
        &mut self,
        source: &dyn SnapshotSource,
        layered: &mut LayeredCostmap,
        shutdown: &AtomicBool,
    ) -> Result<(), PlannerError> {
        info!("requesting the static map on {:?}", self.config.map_topic);
        loop {
            if shutdown.load(Ordering::Acquire) {
                return Err(PlannerError::NotInitialized(
                    "shutdown before the first map snapshot arrived".to_string(),
                ));
            }
            if let Some(snapshot) = source.latest_snapshot() {
                self.on_snapshot(&snapshot, layered)?;
                info!(
                    "received a {} x {} map at {} m/cell",
                    snapshot.info.width, snapshot.info.height, snapshot.info.resolution
                );
                return Ok(());
            }
            std::thread::sleep(Duration::from_millis(100));
        }
    }

    /// Replace the private grid with the interpreted snapshot. A non-rolling
    /// master is resized to match the snapshot when its shape, resolution,
    /// or origin differ; the private grid always matches the snapshot. The
    /// whole grid becomes dirty.
    pub fn on_snapshot(
        &mut self,
        snapshot: &OccupancySnapshot,
        layered: &mut LayeredCostmap,
    ) -> Result<(), PlannerError> {
        let info = snapshot.info;
        let expected = (info.width as usize) * (info.height as usize);
        if snapshot.cells.len() != expected {
            return Err(PlannerError::MalformedSnapshot(format!(
                "{} cells for a {} x {} map",
                snapshot.cells.len(),
                info.width,
                info.height
            )));
        }

        self.rolling = layered.is_rolling();
        let master = layered.costmap().info();
        let differs = master.width != info.width
            || master.height != info.height
            || master.resolution != info.resolution
            || master.origin != info.origin;
        if !layered.is_rolling() && differs {
            info!(
                "resizing master costmap to {} x {} at {} m/cell",
                info.width, info.height, info.resolution
            );
            layered.resize_map(
                UVec2::new(info.width, info.height),
                info.resolution,
                info.origin,
                true,
            );
        }

        let mut grid = Grid2d::filled(info, COST_UNKNOWN);
        for (i, &value) in snapshot.cells.iter().enumerate() {
            let cell = UVec2::new(i as u32 % info.width, i as u32 / info.width);
            let _ = grid.set(cell, self.interpret(value));
        }
        self.grid = grid;

        self.dirty = CellRegion::new(UVec2::ZERO, UVec2::new(info.width, info.height));
        self.map_received = true;
        self.has_updated_data = true;
        debug!("ingested {} x {} snapshot", info.width, info.height);
        Ok(())
    }

    /// Copy a windowed update into the private grid at `patch.origin`.
    ///
    /// The dirty rectangle becomes the patch rectangle, replacing (not
    /// unioning) any rectangle still pending from an earlier snapshot; the
    /// stamping cadence of the orchestrator relies on that replacement.
    pub fn on_patch(&mut self, patch: &OccupancyPatch) -> Result<(), PlannerError> {
        if !self.map_received {
            return Err(PlannerError::NotInitialized(
                "patch received before the first snapshot".to_string(),
            ));
        }
        let expected = (patch.width as usize) * (patch.height as usize);
        if patch.cells.len() != expected {
            return Err(PlannerError::MalformedSnapshot(format!(
                "{} cells for a {} x {} patch",
                patch.cells.len(),
                patch.width,
                patch.height
            )));
        }

        for y in 0..patch.height {
            for x in 0..patch.width {
                let value = patch.cells[(y * patch.width + x) as usize];
                // cells outside the private grid are dropped
                let _ = self
                    .grid
                    .set(UVec2::new(patch.origin.x + x, patch.origin.y + y), value);
            }
        }

        self.dirty = CellRegion::new(
            patch.origin,
            UVec2::new(patch.origin.x + patch.width, patch.origin.y + patch.height),
        );
        self.has_updated_data = true;
        Ok(())
    }

    /// Ask the layer to include extra world bounds in its next
    /// `update_bounds` report.
    pub fn set_extra_bounds(&mut self, bounds: Bounds) {
        self.extra_bounds = Some(bounds);
    }

    /// Toggling enablement re-dirties the whole grid so the next stamp
    /// reflects the change.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.config.enabled != enabled {
            self.config.enabled = enabled;
            self.dirty = CellRegion::new(
                UVec2::ZERO,
                UVec2::new(self.grid.width(), self.grid.height()),
            );
            self.has_updated_data = true;
        }
    }

    /// Reinterpret one raw occupancy value as a cell cost.
    pub fn interpret(&self, value: i8) -> u8 {
        let config = &self.config;
        if config.track_unknown_space && value == config.unknown_cost_value {
            return COST_UNKNOWN;
        }
        if !config.track_unknown_space && value == config.unknown_cost_value {
            return COST_FREE;
        }
        // raw values compare as octets, so e.g. -1 reads as 255 when it is
        // not the configured unknown value
        let raw = value as u8;
        if raw >= config.lethal_threshold {
            return COST_LETHAL;
        }
        if config.trinary_costmap {
            return COST_FREE;
        }

        let scaled = (raw as f32 / config.lethal_threshold as f32) * COST_LETHAL as f32;
        (scaled.round() as u8).min(COST_LETHAL - 1)
    }

    fn stamp_rolling(&self, master: &mut Costmap, region: CellRegion) {
        let config = &self.config;
        for j in region.min.y..region.max.y {
            for i in region.min.x..region.max.x {
                let master_cell = UVec2::new(i, j);
                let world = master.map_to_world(master_cell);
                let Some(cell) = self.grid.world_to_map(world) else {
                    continue;
                };
                let cost = self.grid.get(cell).copied().unwrap_or(COST_UNKNOWN);
                if cost == COST_UNKNOWN {
                    continue;
                }

                if !config.use_maximum {
                    let _ = master.set(master_cell, cost);
                    continue;
                }

                let old = master.get(master_cell).copied().unwrap_or(COST_UNKNOWN);
                let merged = if config.track_unknown_space {
                    if cost == COST_LETHAL {
                        cost
                    } else {
                        cost.max(old)
                    }
                } else if old == COST_UNKNOWN {
                    cost
                } else {
                    cost.max(old)
                };
                let _ = master.set(master_cell, merged);
            }
        }
    }
}

impl Layer for StaticLayer {
    fn reset(&mut self) {
        self.dirty = CellRegion::new(
            UVec2::ZERO,
            UVec2::new(self.grid.width(), self.grid.height()),
        );
        self.has_updated_data = true;
    }

    fn is_clearable(&self) -> bool {
        false
    }

    fn update_bounds(&mut self, _robot: Pose2, bounds: &mut Bounds) {
        if !self.config.enabled {
            return;
        }
        if !self.map_received || !(self.has_updated_data || self.extra_bounds.is_some()) {
            return;
        }

        if let Some(extra) = self.extra_bounds.take() {
            bounds.merge(&extra);
        }

        bounds.expand_to_include(self.grid.map_to_world(self.dirty.min));
        bounds.expand_to_include(self.grid.map_to_world(self.dirty.max));

        self.has_updated_data = false;
    }

    fn update_costs(&mut self, master: &mut Costmap, region: CellRegion) {
        if !self.config.enabled {
            return;
        }
        if !self.map_received {
            warn!("static layer asked to stamp before a map was received");
            return;
        }

        if !self.rolling {
            if !self.config.use_maximum {
                merge::stamp_overwrite(master, &self.grid, region);
            } else {
                merge::stamp_max(master, &self.grid, region);
            }
        } else {
            self.stamp_rolling(master, region);
        }
    }
}
