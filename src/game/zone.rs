//! Curved tackle zone projected in front of each defender

use serde::{Deserialize, Serialize};

use super::physics::{PhysicsSystem, Vec2};

/// Shape parameters for a tackle zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TackleZoneShape {
    /// Reach from the defender to the arc's base line
    pub distance: f64,
    /// Lateral width of the arc
    pub width: f64,
    /// Extra bulge at the middle of the arc
    pub curve_depth: f64,
    pub segments: u32,
}

impl Default for TackleZoneShape {
    fn default() -> Self {
        Self {
            distance: 140.0,
            width: 120.0,
            curve_depth: 30.0,
            segments: 8,
        }
    }
}

impl TackleZoneShape {
    /// Shapes with no area never produce a zone
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.distance > 0.0 && self.segments > 0)
            || !self.width.is_finite()
            || !self.distance.is_finite()
            || !self.curve_depth.is_finite()
    }
}

/// Fan-shaped polygon: the defender at the tip, a bulging arc at the far end
#[derive(Debug, Clone, PartialEq)]
pub struct TackleZone {
    points: Vec<Vec2>,
}

impl TackleZone {
    /// Build the zone for a defender at `tip` facing `direction`.
    ///
    /// Returns `None` for degenerate shapes or a zero direction.
    pub fn around(tip: Vec2, direction: Vec2, shape: &TackleZoneShape) -> Option<Self> {
        let dir = direction.normalize_or_zero();
        if shape.is_degenerate() || dir == Vec2::ZERO || !tip.is_finite() {
            return None;
        }

        let side = dir.perp();
        let segments = shape.segments as usize;
        let mut points = Vec::with_capacity(segments + 2);
        points.push(tip);

        for step in 0..=segments {
            let t = step as f64 / segments as f64;
            let lateral = -shape.width / 2.0 + shape.width * t;
            let depth = shape.distance + shape.curve_depth * (std::f64::consts::PI * t).sin();
            points.push(tip + dir * depth + side * lateral);
        }

        Some(Self { points })
    }

    pub fn contains(&self, point: Vec2) -> bool {
        PhysicsSystem::point_in_polygon(point, &self.points)
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOWN: Vec2 = Vec2::new(0.0, 1.0);

    #[test]
    fn zone_reaches_forward_of_the_defender() {
        let shape = TackleZoneShape::default();
        let zone = TackleZone::around(Vec2::new(100.0, 100.0), DOWN, &shape).unwrap();
        assert_eq!(zone.points().len(), 10);
        assert_eq!(zone.points()[0], Vec2::new(100.0, 100.0));

        assert!(zone.contains(Vec2::new(100.0, 200.0)));
        // Inside the bulge but beyond the flat base line
        assert!(zone.contains(Vec2::new(100.0, 260.0)));
        assert!(!zone.contains(Vec2::new(100.0, 280.0)));
        // Behind the defender
        assert!(!zone.contains(Vec2::new(100.0, 90.0)));
        // Too far to the side
        assert!(!zone.contains(Vec2::new(170.0, 230.0)));
    }

    #[test]
    fn degenerate_shapes_yield_no_zone() {
        let tip = Vec2::ZERO;
        for shape in [
            TackleZoneShape { width: 0.0, ..Default::default() },
            TackleZoneShape { distance: -1.0, ..Default::default() },
            TackleZoneShape { segments: 0, ..Default::default() },
        ] {
            assert!(TackleZone::around(tip, DOWN, &shape).is_none());
        }
        assert!(TackleZone::around(tip, Vec2::ZERO, &TackleZoneShape::default()).is_none());
    }
}
