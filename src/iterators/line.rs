use glam::{IVec2, UVec2, Vec2};

use crate::grid::Grid2d;

/// Cells under a world-space segment, emitted in order from `a` to `b`.
///
/// Used to raster footprint edges onto the costmap for the collision veto,
/// so both endpoints must lie on the grid; a segment that leaves the map
/// cannot be traced and the caller must treat it as unsafe rather than
/// checking a truncated edge.
pub struct LineIterator {
    cell: IVec2,
    end: IVec2,
    step: IVec2,
    /// Fraction of the segment at which the next cell boundary is crossed,
    /// per axis.
    next_t: Vec2,
    /// Fraction of the segment spanned by one cell, per axis.
    delta_t: Vec2,
    /// Boundary crossings still owed; bounds the walk when float error
    /// keeps `cell` from landing exactly on `end`.
    steps_left: i32,
    done: bool,
}

impl LineIterator {
    pub fn between<T: Copy>(grid: &Grid2d<T>, a: Vec2, b: Vec2) -> Option<Self> {
        let start = grid.world_to_map_continuous(a)?;
        let end = grid.world_to_map_continuous(b)?;
        let cell = start.floor().as_ivec2();
        let end_cell = end.floor().as_ivec2();
        let diff = end - start;

        let (step_x, next_x, delta_x) = axis_setup(start.x, diff.x);
        let (step_y, next_y, delta_y) = axis_setup(start.y, diff.y);

        // a straight segment crosses exactly one boundary per cell of
        // manhattan distance
        let steps_left = (end_cell.x - cell.x).abs() + (end_cell.y - cell.y).abs();

        Some(Self {
            cell,
            end: end_cell,
            step: IVec2::new(step_x, step_y),
            next_t: Vec2::new(next_x, next_y),
            delta_t: Vec2::new(delta_x, delta_y),
            steps_left,
            done: false,
        })
    }
}

fn axis_setup(start: f32, diff: f32) -> (i32, f32, f32) {
    if diff == 0.0 {
        return (0, f32::INFINITY, f32::INFINITY);
    }
    let delta = 1.0 / diff.abs();
    let to_boundary = if diff > 0.0 {
        1.0 - start.fract()
    } else {
        start.fract()
    };
    let step = if diff > 0.0 { 1 } else { -1 };
    (step, to_boundary * delta, delta)
}

impl Iterator for LineIterator {
    type Item = UVec2;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        // both endpoints are on the grid, so every cell between them is too
        let out = self.cell.as_uvec2();

        if self.cell == self.end || self.steps_left <= 0 {
            self.done = true;
        } else if self.next_t.x <= self.next_t.y {
            self.next_t.x += self.delta_t.x;
            self.cell.x += self.step.x;
            self.steps_left -= 1;
        } else {
            self.next_t.y += self.delta_t.y;
            self.cell.y += self.step.y;
            self.steps_left -= 1;
        }

        Some(out)
    }
}
