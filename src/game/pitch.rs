//! Field geometry for both phases. Pure layout, nothing is drawn here.

use serde::{Deserialize, Serialize};

use super::physics::Vec2;

/// Draw surface size reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A surface the phases can lay out on
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Top-down approach field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayout {
    pub viewport: Viewport,
    pub world_width: f64,
    pub world_height: f64,
    pub pad: f64,
    pub field: Rect,
    pub center_x: f64,
    pub goal_width: f64,
    pub goal_left: f64,
    pub goal_line_top_y: f64,
    pub goal_line_bottom_y: f64,
    /// Fixed shooting spot, `target_offset` below the top goal line
    pub shooting_target: Vec2,
}

impl FieldLayout {
    pub fn new(viewport: Viewport, target_offset: f64) -> Self {
        let world_width = viewport.width * 2.0;
        let world_height = viewport.height * 3.0;
        let pad = (world_width * 0.1).floor();

        let field = Rect {
            x: pad,
            y: pad * 2.0,
            width: world_width - pad * 2.0,
            height: world_height - pad * 4.0,
        };
        let goal_width = (field.width / 6.0).round();
        let goal_line_top_y = pad * 2.0;
        let center_x = world_width / 2.0;

        Self {
            viewport,
            world_width,
            world_height,
            pad,
            field,
            center_x,
            goal_width,
            goal_left: ((world_width - goal_width) / 2.0).round(),
            goal_line_top_y,
            goal_line_bottom_y: field.y + field.height,
            shooting_target: Vec2::new(center_x, goal_line_top_y + target_offset),
        }
    }

    /// Lateral band the player is clamped to
    pub fn player_x_bounds(&self, margin: f64) -> (f64, f64) {
        let min_x = self.field.x + margin;
        (min_x, self.world_width - min_x)
    }
}

/// Goal mouth in the perspective shoot view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub left_x: f64,
    pub right_x: f64,
    pub center_x: f64,
}

impl Goal {
    pub fn width(&self) -> f64 {
        self.right_x - self.left_x
    }
}

/// Perspective penalty view: a trapezoid pitch with the goal at its top edge
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltyLayout {
    pub viewport: Viewport,
    pub top_y: f64,
    pub bottom_y: f64,
    pub top_width: f64,
    pub bottom_width: f64,
    pub goal: Goal,
    /// Vertical inset of the aim line and keeper below the goal line
    pub goal_inset_y: f64,
    pub shooter_start: Vec2,
    pub shooter_min_x: f64,
    pub shooter_max_x: f64,
    pub shooter_speed: f64,
    pub keeper_start: Vec2,
    /// Y the keeper dives to
    pub dive_y: f64,
}

impl PenaltyLayout {
    pub fn new(viewport: Viewport) -> Self {
        let (w, h) = (viewport.width, viewport.height);
        let center_x = (w / 2.0).round();
        let top_y = (h * 0.35).round();
        let bottom_y = h + 24.0;
        let top_width = w.round();
        let bottom_width = (w * 1.35).round();

        let goal_width = (top_width * 0.4).round();
        let left_x = (center_x - goal_width / 2.0).round();
        let right_x = (center_x + goal_width / 2.0).round();
        let goal = Goal {
            left_x,
            right_x,
            center_x: ((left_x + right_x) / 2.0).round(),
        };

        let bot_left = (center_x - bottom_width / 2.0).round();
        let bot_right = (center_x + bottom_width / 2.0).round();
        let half_height = ((bottom_y - top_y) * 0.5).round();
        let inset = (w * 0.03).round();
        let goal_inset_y = (h * 0.015).round();

        Self {
            viewport,
            top_y,
            bottom_y,
            top_width,
            bottom_width,
            goal,
            goal_inset_y,
            shooter_start: Vec2::new(
                ((bot_left + bot_right) / 2.0).round(),
                bottom_y - half_height,
            ),
            shooter_min_x: bot_left + inset,
            shooter_max_x: bot_right - inset,
            shooter_speed: (w * 0.35).round(),
            keeper_start: Vec2::new(goal.center_x, top_y + goal_inset_y),
            dive_y: top_y + (h * 0.02).round(),
        }
    }
}
