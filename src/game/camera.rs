//! Scrolling camera for the approach phase

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::tuning::CameraTuning;

use super::physics::Vec2;
use super::pitch::Viewport;
use super::timing::TimeContext;

/// Whether the camera still tracks the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    Follow,
    /// Parked on a fixed point; scroll and follow are off
    Locked,
}

/// Camera scroll is the world position of the viewport's top-left corner
#[derive(Debug, Clone)]
pub struct CameraRig {
    viewport: Viewport,
    world_width: f64,
    world_height: f64,
    scroll: Vec2,
    zoom: f64,
    mode: CameraMode,
    run_speed: f64,
    follow_lerp_x: f64,
}

impl CameraRig {
    /// Start centred on the bottom of the world
    pub fn new(
        viewport: Viewport,
        world_width: f64,
        world_height: f64,
        tuning: &CameraTuning,
    ) -> Self {
        let mut rig = Self {
            viewport,
            world_width,
            world_height,
            scroll: Vec2::ZERO,
            zoom: 1.0,
            mode: CameraMode::Follow,
            run_speed: tuning.run_speed,
            follow_lerp_x: tuning.follow_lerp_x,
        };
        rig.center_on(Vec2::new(world_width / 2.0, world_height - viewport.height / 2.0));
        rig
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Move the view up by the scroll speed, stopping at the world top
    pub fn scroll_up(&mut self, delta_ms: f64) {
        if self.mode == CameraMode::Locked {
            return;
        }
        let dy = self.run_speed * delta_ms / 1000.0;
        self.scroll.y = (self.scroll.y - dy).max(0.0);
    }

    /// Ease horizontally toward the player; no vertical follow
    pub fn follow_player(&mut self, player_x: f64) {
        if self.mode == CameraMode::Locked {
            return;
        }
        let target = self.clamp_scroll_x(player_x - self.viewport.width / 2.0);
        self.scroll.x += (target - self.scroll.x) * self.follow_lerp_x;
    }

    /// Stop following and park with `point` framed `framing` of a screen from the top
    pub fn lock_at(&mut self, point: Vec2, framing: f64) {
        self.mode = CameraMode::Locked;
        self.scroll.y = (point.y - self.viewport.height * framing).max(0.0);
        self.scroll.x = self.clamp_scroll_x(point.x - self.viewport.width / 2.0);
        debug!(scroll = ?self.scroll, "Camera parked");
    }

    /// World Y that sits `bottom_offset` above the bottom of the view
    pub fn relative_anchor(&self, screen_height: f64, bottom_offset: f64) -> f64 {
        self.scroll.y + screen_height - bottom_offset
    }

    /// Zoom at which the whole world fits the view
    pub fn fit_zoom(&self) -> f64 {
        (self.viewport.width / self.world_width).min(self.viewport.height / self.world_height)
    }

    /// Snap between 1:1 near the world bottom and a whole-world overview
    pub fn toggle_zoom(&mut self) -> f64 {
        let fit = self.fit_zoom();
        if (self.zoom - fit).abs() < 1e-6 {
            self.zoom = 1.0;
            self.center_on(Vec2::new(
                self.world_width / 2.0,
                self.world_height - self.viewport.height / 2.0,
            ));
        } else {
            self.zoom = fit;
            self.center_on(Vec2::new(self.world_width / 2.0, self.world_height / 2.0));
        }
        self.zoom
    }

    /// Per-frame camera step. Scrolling pauses while `scroll_paused`.
    pub fn update(&mut self, ctx: &TimeContext, player_x: f64, scroll_paused: bool) {
        if !scroll_paused {
            self.scroll_up(ctx.delta_ms);
        }
        self.follow_player(player_x);
    }

    fn center_on(&mut self, point: Vec2) {
        self.scroll = Vec2::new(
            point.x - self.viewport.width / 2.0,
            point.y - self.viewport.height / 2.0,
        );
    }

    fn clamp_scroll_x(&self, x: f64) -> f64 {
        x.clamp(0.0, (self.world_width - self.viewport.width).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> CameraRig {
        CameraRig::new(Viewport::new(1000.0, 800.0), 2000.0, 2400.0, &CameraTuning::default())
    }

    #[test]
    fn starts_at_world_bottom_and_scrolls_up() {
        let mut cam = rig();
        assert_eq!(cam.scroll(), Vec2::new(500.0, 1600.0));
        assert_eq!(cam.relative_anchor(800.0, 200.0), 2200.0);

        cam.scroll_up(1000.0);
        assert_eq!(cam.scroll().y, 1380.0);
        for _ in 0..20 {
            cam.scroll_up(1000.0);
        }
        assert_eq!(cam.scroll().y, 0.0);
    }

    #[test]
    fn follow_is_smoothed_and_lock_is_final() {
        let mut cam = rig();
        cam.follow_player(1100.0);
        assert!((cam.scroll().x - 512.0).abs() < 1e-9);

        cam.lock_at(Vec2::new(1000.0, 650.0), 0.6);
        assert_eq!(cam.mode(), CameraMode::Locked);
        assert_eq!(cam.scroll(), Vec2::new(500.0, 170.0));

        cam.scroll_up(1000.0);
        cam.follow_player(0.0);
        assert_eq!(cam.scroll(), Vec2::new(500.0, 170.0));
    }

    #[test]
    fn zoom_toggles_between_fit_and_one() {
        let mut cam = rig();
        let fit = cam.fit_zoom();
        assert!((fit - 1.0 / 3.0).abs() < 1e-12);

        assert_eq!(cam.toggle_zoom(), fit);
        assert_eq!(cam.scroll(), Vec2::new(500.0, 800.0));
        assert_eq!(cam.toggle_zoom(), 1.0);
        assert_eq!(cam.scroll(), Vec2::new(500.0, 1600.0));
    }

    #[test]
    fn paused_update_only_follows() {
        let mut cam = rig();
        cam.update(&TimeContext::new(1000.0, 0.0), 1000.0, true);
        assert_eq!(cam.scroll(), Vec2::new(500.0, 1600.0));
    }
}
