//! Kinematics and overlap tests
//!
//! There is no collision response: actors move by velocity integration and
//! contact is reduced to axis-aligned overlap and polygon containment.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// 2D vector in world units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (other - self).length()
    }

    /// Unit vector, or zero when the vector has no length
    pub fn normalize_or_zero(self) -> Vec2 {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            self * (1.0 / len)
        } else {
            Vec2::ZERO
        }
    }

    /// Rotate a quarter turn clockwise in screen space (+Y down)
    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box of `size` centred on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// The bottom `fraction` of this box (the "feet" contact strip)
    pub fn bottom_strip(&self, fraction: f64) -> Aabb {
        let height = (self.max.y - self.min.y) * fraction.clamp(0.0, 1.0);
        Aabb {
            min: Vec2::new(self.min.x, self.max.y - height),
            max: self.max,
        }
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Physics helpers shared by every moving actor
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Advance a position by `velocity` (units per second) over `delta_ms`
    pub fn integrate(position: Vec2, velocity: Vec2, delta_ms: f64) -> Vec2 {
        position + velocity * (delta_ms / 1000.0)
    }

    /// Scale a velocity down to `max_speed` if it exceeds it
    pub fn clamp_speed(velocity: Vec2, max_speed: f64) -> Vec2 {
        let speed = velocity.length();
        if speed > max_speed && speed > 0.0 {
            velocity * (max_speed / speed)
        } else {
            velocity
        }
    }

    /// Feet-only overlap between two actors' collision extents
    pub fn feet_overlap(
        a_center: Vec2,
        a_size: Vec2,
        b_center: Vec2,
        b_size: Vec2,
        fraction: f64,
    ) -> bool {
        let a = Aabb::from_center(a_center, a_size).bottom_strip(fraction);
        let b = Aabb::from_center(b_center, b_size).bottom_strip(fraction);
        a.overlaps(&b)
    }

    /// Even-odd ray casting containment test
    pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
        if polygon.len() < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = polygon.len() - 1;
        for i in 0..polygon.len() {
            let (a, b) = (polygon[i], polygon[j]);
            if (a.y > point.y) != (b.y > point.y) {
                let cross_x = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
                if point.x < cross_x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_speed_preserves_direction() {
        let v = PhysicsSystem::clamp_speed(Vec2::new(30.0, 40.0), 10.0);
        assert!((v.x - 6.0).abs() < 1e-9);
        assert!((v.y - 8.0).abs() < 1e-9);
        assert_eq!(PhysicsSystem::clamp_speed(Vec2::new(3.0, 4.0), 10.0), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn feet_overlap_ignores_tall_sprite_boxes() {
        let size = Vec2::new(40.0, 100.0);
        // Bodies overlap by 50 units vertically, feet strips (20 units) do not.
        assert!(!PhysicsSystem::feet_overlap(
            Vec2::new(0.0, 0.0),
            size,
            Vec2::new(0.0, 50.0),
            size,
            0.2
        ));
        assert!(PhysicsSystem::feet_overlap(
            Vec2::new(0.0, 0.0),
            size,
            Vec2::new(10.0, 10.0),
            size,
            0.2
        ));
    }

    #[test]
    fn polygon_containment() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];
        assert!(PhysicsSystem::point_in_polygon(Vec2::new(5.0, 5.0), &square));
        assert!(!PhysicsSystem::point_in_polygon(Vec2::new(15.0, 5.0), &square));
        assert!(!PhysicsSystem::point_in_polygon(Vec2::new(5.0, 5.0), &square[..2]));
    }

    #[test]
    fn integrate_uses_milliseconds() {
        let p = PhysicsSystem::integrate(Vec2::ZERO, Vec2::new(100.0, -50.0), 500.0);
        assert_eq!(p, Vec2::new(50.0, -25.0));
    }
}
