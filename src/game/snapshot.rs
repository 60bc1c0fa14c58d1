//! Scene snapshots for the host: every sprite plus camera and HUD state

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::actor::{Actor, ActorKind};
use super::approach::ApproachPhase;
use super::camera::CameraMode;
use super::physics::Vec2;
use super::protocol::{Outcome, PhaseName};
use super::shoot::ShootPhase;

/// Draw order used by the approach and shoot views
const DEPTH_DEFENDER: i32 = 40;
const DEPTH_SHOOT_KEEPER: i32 = 40;
const DEPTH_PLAYER: i32 = 60;
const DEPTH_BALL: i32 = 210;
const DEPTH_FIELD_KEEPER: i32 = 230;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpriteKind {
    Player,
    Defender,
    Keeper,
    Ball,
}

/// One drawable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteView {
    pub id: Uuid,
    pub kind: SpriteKind,
    /// Formation label for defenders
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub frame: String,
    pub flip_x: bool,
    pub depth: i32,
    pub angle: f64,
}

impl SpriteView {
    fn from_actor(actor: &Actor, depth: i32) -> Self {
        let (kind, label) = match &actor.kind {
            ActorKind::Player => (SpriteKind::Player, None),
            ActorKind::Defender(state) => (SpriteKind::Defender, Some(state.label.clone())),
            ActorKind::Keeper(_) => (SpriteKind::Keeper, None),
        };
        let position = actor.position();
        Self {
            id: actor.id,
            kind,
            label,
            x: position.x,
            y: position.y,
            frame: actor.animation.current_frame().to_string(),
            flip_x: actor.facing.flip_x(),
            depth,
            angle: actor.angle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub zoom: f64,
    pub mode: CameraMode,
}

/// Full scene state at one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub frame: u64,
    pub phase: PhaseName,
    pub time_scale: f64,
    /// Approach only; the shoot view is screen-fixed
    pub camera: Option<CameraView>,
    pub sprites: Vec<SpriteView>,
    /// Tackle countdown readout while an encounter runs
    pub countdown: Option<u32>,
    pub dangerous_opponent: Option<Uuid>,
    pub shooting_target: Option<Vec2>,
    pub aim_point: Option<Vec2>,
    pub ball: Option<Vec2>,
    pub outcome: Option<Outcome>,
}

impl SceneSnapshot {
    pub fn empty(frame: u64, phase: PhaseName, time_scale: f64) -> Self {
        Self {
            frame,
            phase,
            time_scale,
            camera: None,
            sprites: Vec::new(),
            countdown: None,
            dangerous_opponent: None,
            shooting_target: None,
            aim_point: None,
            ball: None,
            outcome: None,
        }
    }

    pub fn from_approach(
        frame: u64,
        phase: PhaseName,
        time_scale: f64,
        now_ms: f64,
        approach: &ApproachPhase,
    ) -> Self {
        let camera = approach.camera();
        let scroll = camera.scroll();

        let mut sprites: Vec<SpriteView> = approach
            .swarm()
            .units()
            .iter()
            .map(|unit| {
                let depth = if unit.is_defender() { DEPTH_DEFENDER } else { DEPTH_FIELD_KEEPER };
                SpriteView::from_actor(unit, depth)
            })
            .collect();
        sprites.push(SpriteView::from_actor(approach.player().actor(), DEPTH_PLAYER));

        Self {
            camera: Some(CameraView {
                scroll_x: scroll.x,
                scroll_y: scroll.y,
                zoom: camera.zoom(),
                mode: camera.mode(),
            }),
            sprites,
            countdown: approach.tackle().remaining_seconds(now_ms),
            dangerous_opponent: approach.tackle().dangerous_opponent(),
            shooting_target: Some(approach.field().shooting_target),
            ..Self::empty(frame, phase, time_scale)
        }
    }

    pub fn from_shoot(frame: u64, phase: PhaseName, time_scale: f64, shoot: &ShootPhase) -> Self {
        let mut sprites = vec![
            SpriteView::from_actor(shoot.keeper(), DEPTH_SHOOT_KEEPER),
            SpriteView::from_actor(shoot.shooter(), DEPTH_PLAYER),
        ];
        let ball = shoot.ball();
        if let Some(view) = ball {
            sprites.push(SpriteView {
                id: Uuid::nil(),
                kind: SpriteKind::Ball,
                label: None,
                x: view.position.x,
                y: view.position.y,
                frame: "ball".to_string(),
                flip_x: false,
                depth: DEPTH_BALL,
                angle: view.angle,
            });
        }

        Self {
            sprites,
            aim_point: shoot.aim_point(),
            ball: ball.map(|view| view.position),
            ..Self::empty(frame, phase, time_scale)
        }
    }
}

/// Decides which frames get a snapshot
pub struct SnapshotBuilder {
    /// Frames since the last snapshot
    frames_since_snapshot: u32,
    /// Snapshot interval in frames
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            frames_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Check if it's time to take a snapshot
    pub fn should_send(&mut self) -> bool {
        self.frames_since_snapshot += 1;
        if self.frames_since_snapshot >= self.snapshot_interval {
            self.frames_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force a snapshot on next check (used for phase changes)
    pub fn force_next(&mut self) {
        self.frames_since_snapshot = self.snapshot_interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fires_on_interval() {
        let mut builder = SnapshotBuilder::new(3);
        let fired: Vec<bool> = (0..6).map(|_| builder.should_send()).collect();
        assert_eq!(fired, vec![false, false, true, false, false, true]);

        builder.force_next();
        assert!(builder.should_send());
    }

    #[test]
    fn zero_interval_sends_every_frame() {
        let mut builder = SnapshotBuilder::new(0);
        assert!(builder.should_send());
        assert!(builder.should_send());
    }
}
