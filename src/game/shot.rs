//! Aim oscillation, keeper dive choice and save detection

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::tuning::ShootTuning;

use super::physics::Vec2;
use super::pitch::{Goal, PenaltyLayout};
use super::timing::TimeContext;

/// Horizontal band the aim sweeps across, just inside the posts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimRange {
    pub left: f64,
    pub right: f64,
    pub y: f64,
}

impl AimRange {
    pub fn from_layout(layout: &PenaltyLayout) -> Self {
        let padding = (layout.viewport.width * 0.02).round();
        Self {
            left: layout.goal.left_x + padding,
            right: layout.goal.right_x - padding,
            y: layout.top_y + layout.goal_inset_y,
        }
    }
}

/// Aim point after `elapsed_ms` of sweeping
pub fn aim(elapsed_ms: f64, range: &AimRange, speed: f64) -> Vec2 {
    let t = (elapsed_ms * speed).sin() * 0.5 + 0.5;
    Vec2::new(range.left + (range.right - range.left) * t, range.y)
}

/// Oscillating aim, frozen on commit
#[derive(Debug, Clone, PartialEq)]
pub struct AimState {
    pub active: bool,
    pub timer_ms: f64,
    pub last_target: Option<Vec2>,
}

impl AimState {
    pub fn new() -> Self {
        Self {
            active: true,
            timer_ms: 0.0,
            last_target: None,
        }
    }

    /// Sweep for one frame; returns the aim point while active
    pub fn advance(&mut self, ctx: &TimeContext, range: &AimRange, speed: f64) -> Option<Vec2> {
        if !self.active {
            return None;
        }
        self.timer_ms += ctx.delta_ms;
        let target = aim(self.timer_ms, range, speed);
        self.last_target = Some(target);
        Some(target)
    }

    /// Freeze and return the committed target. `None` once already committed.
    pub fn commit(&mut self, range: &AimRange, speed: f64) -> Option<Vec2> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(
            self.last_target
                .unwrap_or_else(|| aim(self.timer_ms, range, speed)),
        )
    }
}

impl Default for AimState {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeper dive, picked blind of the aim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiveChoice {
    Left,
    Center,
    Right,
}

impl DiveChoice {
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.gen_range(0..3) {
            0 => DiveChoice::Left,
            1 => DiveChoice::Center,
            _ => DiveChoice::Right,
        }
    }

    pub fn target_x(self, goal: &Goal) -> f64 {
        let quarter = (goal.width() / 4.0).round();
        match self {
            DiveChoice::Left => goal.center_x - quarter,
            DiveChoice::Center => goal.center_x,
            DiveChoice::Right => goal.center_x + quarter,
        }
    }

    /// Keeper rotation in degrees at the end of the dive
    pub fn angle(self) -> f64 {
        match self {
            DiveChoice::Left => -70.0,
            DiveChoice::Center => -18.0,
            DiveChoice::Right => 70.0,
        }
    }
}

/// Save distance between ball and keeper, per axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchThresholds {
    pub x: f64,
    pub y: f64,
}

impl CatchThresholds {
    pub fn for_goal(goal: &Goal, tuning: &ShootTuning) -> Self {
        Self {
            x: tuning.catch_min_x.max(goal.width() * tuning.catch_fraction_x),
            y: tuning.catch_y,
        }
    }
}

/// Both axes must be within their threshold, bounds included
pub fn is_saved(ball: Vec2, keeper: Vec2, thresholds: &CatchThresholds) -> bool {
    (ball.x - keeper.x).abs() <= thresholds.x && (ball.y - keeper.y).abs() <= thresholds.y
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotResult {
    Goal,
    Saved,
}

impl ShotResult {
    pub fn caption(self) -> &'static str {
        match self {
            ShotResult::Goal => "GOAL!",
            ShotResult::Saved => "SAVED!",
        }
    }
}
