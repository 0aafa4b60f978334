use glam::{UVec2, Vec2};

use crate::grid::Grid2d;

/// Cells inside a convex polygon, emitted row by row.
///
/// The polygon is given in world coordinates; the footprint interior fill
/// of the obstacle veto is the intended caller. Row spans are resolved
/// eagerly at construction: each grid row is cut at its center line against
/// every non-horizontal edge and the span between the outermost crossings
/// is kept. A footprint covers a handful of rows, so the span list stays
/// small.
pub struct PolygonIterator {
    spans: Vec<RowSpan>,
    row: usize,
    col: u32,
}

#[derive(Clone, Copy)]
struct RowSpan {
    y: u32,
    first: u32,
    /// Inclusive.
    last: u32,
}

impl PolygonIterator {
    pub fn new<T: Copy>(grid: &Grid2d<T>, points: &[Vec2]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let info = grid.info();
        let verts: Vec<Vec2> = points
            .iter()
            .map(|p| (*p - info.origin) / info.resolution)
            .collect();

        let (min_y, max_y) = verts
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v.y), hi.max(v.y))
            });

        let y_lo = (min_y.floor() as i64).max(0);
        let y_hi = (max_y.ceil() as i64).min(info.height as i64 - 1);

        let mut spans = Vec::with_capacity((y_hi - y_lo + 1).max(0) as usize);
        for y in y_lo..=y_hi {
            // rows at the polygon's extremes get their scanline pulled onto
            // the polygon so apex vertices still register
            let scan = (y as f32 + 0.5).max(min_y).min(max_y);

            let mut lo = f32::INFINITY;
            let mut hi = f32::NEG_INFINITY;
            for i in 0..verts.len() {
                let p = verts[i];
                let q = verts[(i + 1) % verts.len()];
                if (p.y - q.y).abs() < f32::EPSILON {
                    continue;
                }
                if scan < p.y.min(q.y) || scan > p.y.max(q.y) {
                    continue;
                }
                let t = (scan - p.y) / (q.y - p.y);
                let x = p.x + t * (q.x - p.x);
                lo = lo.min(x);
                hi = hi.max(x);
            }
            if lo > hi {
                continue;
            }

            let first = (lo.ceil() as i64).max(0);
            let last = (hi.floor() as i64).min(info.width as i64 - 1);
            if first <= last {
                spans.push(RowSpan {
                    y: y as u32,
                    first: first as u32,
                    last: last as u32,
                });
            }
        }

        let col = spans.first().map_or(0, |s| s.first);
        Some(Self { spans, row: 0, col })
    }
}

impl Iterator for PolygonIterator {
    type Item = UVec2;

    fn next(&mut self) -> Option<Self::Item> {
        let span = *self.spans.get(self.row)?;
        let cell = UVec2::new(self.col, span.y);
        if self.col < span.last {
            self.col += 1;
        } else {
            self.row += 1;
            if let Some(next) = self.spans.get(self.row) {
                self.col = next.first;
            }
        }
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MapInfo;

    fn grid8() -> Grid2d<u8> {
        Grid2d::filled(
            MapInfo {
                width: 8,
                height: 8,
                resolution: 1.0,
                ..Default::default()
            },
            0,
        )
    }

    fn fill(points: &[Vec2]) -> Vec<UVec2> {
        PolygonIterator::new(&grid8(), points).unwrap().collect()
    }

    #[test]
    fn triangle_rows_narrow_toward_the_apex() {
        let cells = fill(&[
            Vec2::new(0.5, 0.5),
            Vec2::new(6.5, 0.5),
            Vec2::new(0.5, 6.5),
        ]);
        assert!(cells.contains(&UVec2::new(1, 0)));
        assert!(cells.contains(&UVec2::new(6, 0)));
        assert!(cells.contains(&UVec2::new(3, 3)));
        assert!(!cells.contains(&UVec2::new(4, 3)));
        assert!(!cells.contains(&UVec2::new(0, 0)));
    }

    #[test]
    fn rotated_square_covers_its_center() {
        let cells = fill(&[
            Vec2::new(4.5, 2.5),
            Vec2::new(6.5, 4.5),
            Vec2::new(4.5, 6.5),
            Vec2::new(2.5, 4.5),
        ]);
        assert!(cells.contains(&UVec2::new(4, 4)));
        // the apex row pinches to nothing between cell centers
        assert!(cells.iter().all(|c| c.y != 2));
    }

    #[test]
    fn spans_clip_to_the_grid() {
        let cells = fill(&[
            Vec2::new(-5.0, -2.0),
            Vec2::new(15.0, -2.0),
            Vec2::new(15.0, 11.0),
            Vec2::new(-5.0, 11.0),
        ]);
        assert_eq!(cells.len(), 64);
        assert!(cells.iter().all(|c| c.x < 8 && c.y < 8));
    }

    #[test]
    fn too_few_vertices_are_rejected() {
        let grid = grid8();
        let points = [Vec2::new(1.0, 1.0), Vec2::new(4.0, 2.0)];
        assert!(PolygonIterator::new(&grid, &points).is_none());
    }
}
