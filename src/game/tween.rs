//! Property tweens advanced by the scaled frame delta

use super::physics::Vec2;
use super::timing::TimeContext;

/// Easing curves used by the shoot phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    CubicOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Position + angle tween
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: Vec2,
    to: Vec2,
    from_angle: f64,
    to_angle: f64,
    duration_ms: f64,
    elapsed_ms: f64,
    easing: Easing,
}

impl Tween {
    pub fn new(from: Vec2, to: Vec2, duration_ms: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            from_angle: 0.0,
            to_angle: 0.0,
            duration_ms: duration_ms.max(0.0),
            elapsed_ms: 0.0,
            easing,
        }
    }

    pub fn with_angle(mut self, from: f64, to: f64) -> Self {
        self.from_angle = from;
        self.to_angle = to;
        self
    }

    /// Advance and report whether the tween has finished
    pub fn advance(&mut self, ctx: &TimeContext) -> bool {
        self.elapsed_ms = (self.elapsed_ms + ctx.scaled_delta()).min(self.duration_ms);
        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }

    fn eased(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        self.easing.apply(self.elapsed_ms / self.duration_ms)
    }

    pub fn value(&self) -> Vec2 {
        // Exact endpoint once finished, so resolution sees the true target
        if self.is_complete() {
            return self.to;
        }
        let k = self.eased();
        self.from + (self.to - self.from) * k
    }

    pub fn angle(&self) -> f64 {
        if self.is_complete() {
            return self.to_angle;
        }
        self.from_angle + (self.to_angle - self.from_angle) * self.eased()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_out_front_loads_motion() {
        assert_eq!(Easing::CubicOut.apply(0.0), 0.0);
        assert_eq!(Easing::CubicOut.apply(1.0), 1.0);
        assert!((Easing::CubicOut.apply(0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn tween_lands_exactly_on_target() {
        let mut tween = Tween::new(Vec2::ZERO, Vec2::new(100.0, -50.0), 700.0, Easing::CubicOut)
            .with_angle(0.0, 720.0);
        let ctx = TimeContext::new(16.0, 0.0);
        let mut frames = 0;
        while !tween.advance(&ctx) {
            frames += 1;
            assert!(tween.value().x < 100.0);
        }
        assert_eq!(frames, 43);
        assert_eq!(tween.value(), Vec2::new(100.0, -50.0));
        assert_eq!(tween.angle(), 720.0);
    }

    #[test]
    fn slowed_time_stretches_the_tween() {
        let mut tween = Tween::new(Vec2::ZERO, Vec2::new(10.0, 0.0), 100.0, Easing::Linear);
        let slow = TimeContext {
            scale: 0.1,
            ..TimeContext::new(100.0, 0.0)
        };
        assert!(!tween.advance(&slow));
        assert!((tween.value().x - 1.0).abs() < 1e-9);
    }
}
