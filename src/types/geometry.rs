//! Geometric and spatial types used across the grid and planner APIs.

use glam::{UVec2, Vec2};

/// Robot pose in world coordinates (meters).
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Pose2 {
    pub position: Vec2,
    pub yaw: f32,
}

impl Pose2 {
    pub fn new(position: Vec2, yaw: f32) -> Self {
        Self { position, yaw }
    }
}

/// Robot velocity in the body frame: linear (m/s) and angular (rad/s).
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Velocity2 {
    pub linear: Vec2,
    pub angular: f32,
}

impl Velocity2 {
    pub const ZERO: Self = Self {
        linear: Vec2::ZERO,
        angular: 0.0,
    };

    pub fn new(vx: f32, vy: f32, vtheta: f32) -> Self {
        Self {
            linear: Vec2::new(vx, vy),
            angular: vtheta,
        }
    }

    /// Magnitude of the translational component.
    pub fn trans_speed(&self) -> f32 {
        self.linear.length()
    }
}

/// World-axis-aligned rectangle in meters.
/// Convention: [min.x, max.x) x [min.y, max.y) in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Create bounds that represent "no region" (empty). Use this as the initial
    /// value before layers expand it; layers should only expand, never shrink.
    pub fn empty() -> Self {
        Self {
            min: Vec2::new(f32::INFINITY, f32::INFINITY),
            max: Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Returns true if no layer has expanded the bounds (min > max in either axis).
    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Expand this bounds to include the point (in place).
    pub fn expand_to_include(&mut self, p: Vec2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Expand to include another bounds (in place).
    pub fn merge(&mut self, other: &Bounds) {
        if !other.is_empty() {
            self.expand_to_include(other.min);
            self.expand_to_include(other.max);
        }
    }
}

/// Update window in cell indices. Region is [min.x, max.x) x [min.y, max.y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRegion {
    pub min: UVec2,
    pub max: UVec2,
}

impl CellRegion {
    pub fn new(min: UVec2, max: UVec2) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> u32 {
        self.max.x.saturating_sub(self.min.x)
    }

    pub fn height(&self) -> u32 {
        self.max.y.saturating_sub(self.min.y)
    }
}

/// Footprint: polygon in world coordinates (meters), vertices relative to the
/// robot center unless transformed to a pose.
#[derive(Debug, Clone, Default)]
pub struct Footprint {
    pub points: Vec<Vec2>,
}

impl Footprint {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Axis-aligned rectangle centered on the robot.
    pub fn rectangle(length: f32, width: f32) -> Self {
        let hl = length * 0.5;
        let hw = width * 0.5;
        Self {
            points: vec![
                Vec2::new(hl, hw),
                Vec2::new(-hl, hw),
                Vec2::new(-hl, -hw),
                Vec2::new(hl, -hw),
            ],
        }
    }

    /// A polygon needs at least three vertices.
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3
    }

    /// Rotate by the pose yaw and translate to the pose position.
    pub fn transform(&self, pose: Pose2) -> Vec<Vec2> {
        let (sin, cos) = pose.yaw.sin_cos();
        self.points
            .iter()
            .map(|p| {
                Vec2::new(
                    pose.position.x + p.x * cos - p.y * sin,
                    pose.position.y + p.x * sin + p.y * cos,
                )
            })
            .collect()
    }
}

/// Normalize an angle to (-pi, pi].
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Signed shortest rotation taking `from` onto `to`.
pub fn shortest_angular_distance(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    use super::*;

    #[test]
    fn bounds_empty_and_expand() {
        let mut b = Bounds::empty();
        assert!(b.is_empty());

        b.expand_to_include(Vec2::new(1.0, 2.0));
        b.expand_to_include(Vec2::new(3.0, 0.0));
        assert!(!b.is_empty());
        assert_eq!(b.min, Vec2::new(1.0, 0.0));
        assert_eq!(b.max, Vec2::new(3.0, 2.0));
    }

    #[test]
    fn normalize_angle_wraps() {
        assert_relative_eq!(normalize_angle(3.0 * PI), PI, epsilon = 1e-5);
        assert_relative_eq!(normalize_angle(-3.0 * PI), PI, epsilon = 1e-5);
        assert_relative_eq!(normalize_angle(0.5), 0.5);
    }

    #[test]
    fn shortest_distance_picks_short_way() {
        let d = shortest_angular_distance(-0.9 * PI, 0.9 * PI);
        assert_relative_eq!(d, -0.2 * PI, epsilon = 1e-5);
    }

    #[test]
    fn footprint_transform_rotates() {
        let fp = Footprint::rectangle(2.0, 1.0);
        let out = fp.transform(Pose2::new(Vec2::new(5.0, 5.0), PI / 2.0));
        // front-left corner (1.0, 0.5) rotates to (-0.5, 1.0)
        assert_relative_eq!(out[0].x, 4.5, epsilon = 1e-5);
        assert_relative_eq!(out[0].y, 6.0, epsilon = 1e-5);
    }
}
