//! Time utilities for the frame loop

use std::time::Instant;

/// Default frame rate for the headless driver
pub const DEFAULT_FPS: u32 = 60;

/// Longest frame the simulation will integrate; stalls beyond this are dropped
pub const MAX_FRAME_DELTA_MS: f64 = 100.0;

/// Frame delta in milliseconds for a given frame rate
pub fn frame_delta_ms(fps: u32) -> f64 {
    1000.0 / fps.max(1) as f64
}

/// Monotonic wall clock reporting milliseconds since creation.
///
/// The tackle countdown reads this instead of the scaled frame delta so it
/// keeps real-time pace while the rest of the world is slowed.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulating countdown checked once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayTimer {
    remaining_ms: f64,
}

impl DelayTimer {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            remaining_ms: duration_ms.max(0.0),
        }
    }

    /// Advance by `delta_ms`, returns true once the delay has fully elapsed
    pub fn tick(&mut self, delta_ms: f64) -> bool {
        self.remaining_ms = (self.remaining_ms - delta_ms.max(0.0)).max(0.0);
        self.remaining_ms <= 0.0
    }

    pub fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_timer_fires_after_duration() {
        let mut timer = DelayTimer::new(50.0);
        assert!(!timer.tick(16.0));
        assert!(!timer.tick(16.0));
        assert!(!timer.tick(16.0));
        assert!(timer.tick(16.0));
        assert_eq!(timer.remaining_ms(), 0.0);
        assert!(timer.tick(16.0));
    }

    #[test]
    fn zero_fps_does_not_divide_by_zero() {
        assert_eq!(frame_delta_ms(0), 1000.0);
        assert!((frame_delta_ms(60) - 16.666_666).abs() < 1e-3);
    }
}
