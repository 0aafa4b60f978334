//! Merge policies for stamping a layer grid into the master costmap.
//!
//! **Assumption:** `master` and `source` share the same dimensions and alignment so that
//! cell `(x, y)` in `region` is valid in both grids.

use glam::UVec2;

use crate::grid::Costmap;
use crate::types::{CellRegion, COST_UNKNOWN};

/// Copies source into master unconditionally, unknown included.
pub fn stamp_overwrite(master: &mut Costmap, source: &Costmap, region: CellRegion) {
    for y in region.min.y..region.max.y {
        for x in region.min.x..region.max.x {
            let cell = UVec2::new(x, y);
            if let Some(&cost) = source.get(cell) {
                let _ = master.set(cell, cost);
            }
        }
    }
}

/// Merges source into master by taking the maximum cost; never writes unknown
/// from the layer, and treats an unknown master cell as having no cost yet.
pub fn stamp_max(master: &mut Costmap, source: &Costmap, region: CellRegion) {
    for y in region.min.y..region.max.y {
        for x in region.min.x..region.max.x {
            let cell = UVec2::new(x, y);
            let Some(&src_cost) = source.get(cell) else {
                continue;
            };
            if src_cost == COST_UNKNOWN {
                continue;
            }
            let old = master.get(cell).copied().unwrap_or(COST_UNKNOWN);
            if old == COST_UNKNOWN || old < src_cost {
                let _ = master.set(cell, src_cost);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MapInfo, COST_LETHAL};
    use glam::Vec2;

    fn grid(fill: u8) -> Costmap {
        Costmap::filled(
            MapInfo {
                width: 4,
                height: 4,
                resolution: 1.0,
                origin: Vec2::ZERO,
            },
            fill,
        )
    }

    fn full_region() -> CellRegion {
        CellRegion::new(UVec2::ZERO, UVec2::new(4, 4))
    }

    #[test]
    fn overwrite_writes_unknown_through() {
        let mut master = grid(100);
        let mut source = grid(COST_UNKNOWN);
        source.set(UVec2::new(1, 1), COST_LETHAL).unwrap();
        stamp_overwrite(&mut master, &source, full_region());
        assert_eq!(master.get(UVec2::new(1, 1)), Some(&COST_LETHAL));
        assert_eq!(master.get(UVec2::new(0, 0)), Some(&COST_UNKNOWN));
    }

    #[test]
    fn max_never_lowers_known_cells() {
        let mut master = grid(120);
        let mut source = grid(50);
        source.set(UVec2::new(2, 2), 200).unwrap();
        stamp_max(&mut master, &source, full_region());
        assert_eq!(master.get(UVec2::new(0, 0)), Some(&120));
        assert_eq!(master.get(UVec2::new(2, 2)), Some(&200));
    }

    #[test]
    fn max_fills_unknown_master_and_skips_unknown_source() {
        let mut master = grid(COST_UNKNOWN);
        let mut source = grid(COST_UNKNOWN);
        source.set(UVec2::new(3, 0), 40).unwrap();
        stamp_max(&mut master, &source, full_region());
        assert_eq!(master.get(UVec2::new(3, 0)), Some(&40));
        assert_eq!(master.get(UVec2::new(0, 0)), Some(&COST_UNKNOWN));
    }
}
