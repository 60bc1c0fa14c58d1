//! Per-frame time context and the scoped world time-scale

use std::cell::Cell;
use std::rc::Rc;

/// Time information handed to every update call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeContext {
    /// Unscaled frame delta in milliseconds
    pub delta_ms: f64,
    /// Wall-clock reading in milliseconds
    pub now_ms: f64,
    /// Animation/tween time-scale in effect for this frame
    pub scale: f64,
}

impl TimeContext {
    pub fn new(delta_ms: f64, now_ms: f64) -> Self {
        Self {
            delta_ms,
            now_ms,
            scale: 1.0,
        }
    }

    /// Delta as seen by animations and tweens
    pub fn scaled_delta(&self) -> f64 {
        self.delta_ms * self.scale
    }
}

/// World time-scale shared by animations and tweens.
///
/// The only writer is [`TimeScale::override_by`], whose guard puts the
/// previous value back when dropped.
#[derive(Debug, Clone)]
pub struct TimeScale {
    current: Rc<Cell<f64>>,
}

impl TimeScale {
    pub fn new() -> Self {
        Self {
            current: Rc::new(Cell::new(1.0)),
        }
    }

    pub fn current(&self) -> f64 {
        self.current.get()
    }

    /// Build the context for one frame
    pub fn context(&self, delta_ms: f64, now_ms: f64) -> TimeContext {
        TimeContext {
            delta_ms,
            now_ms,
            scale: self.current.get(),
        }
    }

    /// Multiply the scale by `factor` until the returned guard is dropped
    pub(crate) fn override_by(&self, factor: f64) -> ScaleOverride {
        let previous = self.current.get();
        self.current.set(previous * factor);
        ScaleOverride {
            cell: Rc::clone(&self.current),
            previous,
        }
    }
}

impl Default for TimeScale {
    fn default() -> Self {
        Self::new()
    }
}

/// Restores the captured time-scale on drop
#[derive(Debug)]
#[must_use = "dropping the override restores the time-scale immediately"]
pub struct ScaleOverride {
    cell: Rc<Cell<f64>>,
    previous: f64,
}

impl Drop for ScaleOverride {
    fn drop(&mut self) {
        self.cell.set(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_restores_exact_value() {
        let scale = TimeScale::new();
        {
            let _slow = scale.override_by(0.1);
            assert!((scale.current() - 0.1).abs() < 1e-12);
            let ctx = scale.context(16.0, 0.0);
            assert!((ctx.scaled_delta() - 1.6).abs() < 1e-9);
        }
        assert_eq!(scale.current(), 1.0);
    }

    #[test]
    fn clones_share_the_same_scale() {
        let scale = TimeScale::new();
        let view = scale.clone();
        let guard = scale.override_by(0.5);
        assert_eq!(view.current(), 0.5);
        drop(guard);
        assert_eq!(view.current(), 1.0);
    }
}
