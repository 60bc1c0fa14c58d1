//! Human-controlled player: lateral input, scripted seek, and the locked "ready" state

use tracing::debug;

use crate::config::tuning::PlayerTuning;

use super::actor::{Actor, ActorKind, Facing, FrameCycle};
use super::physics::Vec2;
use super::timing::TimeContext;
use super::FrameInput;

/// Which movement source drives the player. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementIntent {
    /// Keyboard input moves the player sideways
    FreeRoam,
    /// The player walks itself toward `target`
    SeekTarget { target: Vec2, tolerance: f64 },
    /// Ready to shoot; nothing moves the player any more
    Locked,
}

/// Result of one seek tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekProgress {
    /// No seek target active
    Idle,
    Moving,
    /// The target was reached this tick and the seek mode cleared
    Arrived,
}

/// Player state captured when a tackle encounter freezes the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSuspension {
    pub position: Vec2,
    pub velocity: Vec2,
    pub input_attached: bool,
    pub body_enabled: bool,
}

/// Owns the single player actor
#[derive(Debug, Clone)]
pub struct PlayerController {
    actor: Actor,
    intent: MovementIntent,
    run_speed: f64,
    bottom_offset: f64,
    tolerance: f64,
    is_moving: bool,
    input_attached: bool,
    body_enabled: bool,
}

impl PlayerController {
    pub fn new(start: Vec2, tuning: &PlayerTuning, tolerance: f64) -> Self {
        let actor = Actor::new(
            ActorKind::Player,
            start,
            Vec2::new(tuning.body_width, tuning.body_height),
            tuning.run_speed,
            FrameCycle::new(tuning.run_frames.clone(), tuning.run_fps),
        );

        Self {
            actor,
            intent: MovementIntent::FreeRoam,
            run_speed: tuning.run_speed,
            bottom_offset: tuning.bottom_offset,
            tolerance,
            is_moving: false,
            input_attached: true,
            body_enabled: true,
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn position(&self) -> Vec2 {
        self.actor.position()
    }

    pub fn facing(&self) -> Facing {
        self.actor.facing
    }

    pub fn intent(&self) -> MovementIntent {
        self.intent
    }

    pub fn bottom_offset(&self) -> f64 {
        self.bottom_offset
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn is_locked(&self) -> bool {
        self.intent == MovementIntent::Locked
    }

    pub fn is_seeking(&self) -> bool {
        matches!(self.intent, MovementIntent::SeekTarget { .. })
    }

    pub fn input_attached(&self) -> bool {
        self.input_attached
    }

    pub fn body_enabled(&self) -> bool {
        self.body_enabled
    }

    /// Whether free-roam input and camera pinning currently apply
    fn is_free(&self) -> bool {
        self.intent == MovementIntent::FreeRoam && self.input_attached && self.body_enabled
    }

    /// Lateral keyboard movement. No-op while seeking, locked, or suspended.
    pub fn handle_directional_input(
        &mut self,
        delta_ms: f64,
        pressed_left: bool,
        pressed_right: bool,
    ) {
        if !self.is_free() {
            return;
        }

        let step = self.run_speed * (delta_ms / 1000.0);
        let dx = if pressed_left {
            -step
        } else if pressed_right {
            step
        } else {
            0.0
        };

        if dx != 0.0 {
            let position = self.actor.position();
            self.actor.set_position(Vec2::new(position.x + dx, position.y));
            self.actor.facing = Facing::from_dx(dx);
        }
        self.is_moving = dx != 0.0;

        let vx = if delta_ms > 0.0 { dx / delta_ms * 1000.0 } else { 0.0 };
        let vy = self.actor.velocity().y;
        self.actor.set_velocity(Vec2::new(vx, vy));
    }

    /// Start walking toward `target`. Ignored once locked.
    pub fn set_target(&mut self, target: Vec2) {
        if self.is_locked() {
            return;
        }
        self.intent = MovementIntent::SeekTarget {
            target,
            tolerance: self.tolerance,
        };
        self.is_moving = false;
        self.actor.set_velocity(Vec2::ZERO);
    }

    /// Advance an active seek; clears the mode once within tolerance
    pub fn tick(&mut self, ctx: &TimeContext) -> SeekProgress {
        let MovementIntent::SeekTarget { target, tolerance } = self.intent else {
            return SeekProgress::Idle;
        };
        if !self.body_enabled {
            return SeekProgress::Idle;
        }

        let position = self.actor.position();
        let offset = target - position;
        let distance = offset.length();
        if distance <= tolerance {
            return self.arrive();
        }

        let direction = offset * (1.0 / distance);
        let step = (self.run_speed * (ctx.delta_ms / 1000.0)).min(distance);
        self.actor.set_position(position + direction * step);

        // Facing only flips while clearly off to one side, so it does not jitter near the spot.
        if offset.x.abs() > tolerance {
            self.actor.facing = Facing::from_dx(offset.x);
        }
        self.actor.set_velocity(direction * self.run_speed);
        self.is_moving = true;

        if self.actor.position().distance(target) <= tolerance {
            return self.arrive();
        }
        SeekProgress::Moving
    }

    fn arrive(&mut self) -> SeekProgress {
        self.intent = MovementIntent::FreeRoam;
        self.is_moving = false;
        self.actor.set_velocity(Vec2::ZERO);
        debug!(position = ?self.actor.position(), "Player reached seek target");
        SeekProgress::Arrived
    }

    /// Per-frame update: seek takes priority over keyboard input
    pub fn update(&mut self, ctx: &TimeContext, input: &FrameInput) -> SeekProgress {
        let progress = if self.is_seeking() {
            self.tick(ctx)
        } else {
            self.handle_directional_input(ctx.delta_ms, input.left, input.right);
            SeekProgress::Idle
        };

        if !self.is_locked() && self.body_enabled {
            self.actor.animation.ensure_playing();
        }
        self.actor.animation.advance(ctx);
        progress
    }

    /// Keep the player `bottom_offset` above the viewport bottom
    pub fn pin_to_anchor(&mut self, anchor_y: f64) {
        if !self.is_free() {
            return;
        }
        let position = self.actor.position();
        self.actor.set_position(Vec2::new(position.x, anchor_y));
    }

    pub fn clamp_x(&mut self, min_x: f64, max_x: f64) {
        if min_x > max_x {
            return;
        }
        let position = self.actor.position();
        let x = position.x.clamp(min_x, max_x);
        if x != position.x {
            self.actor.set_position(Vec2::new(x, position.y));
        }
    }

    /// Final corrective step onto the shooting spot
    pub fn snap_to(&mut self, point: Vec2) {
        if self.is_locked() {
            return;
        }
        self.actor.set_position(point);
    }

    /// Lock into the ready state. `ready_frame` is shown when the host has it.
    pub fn lock_for_shot(&mut self, ready_frame: Option<&str>) {
        self.intent = MovementIntent::Locked;
        self.is_moving = false;
        self.input_attached = false;
        self.actor.set_velocity(Vec2::ZERO);

        let frame = ready_frame
            .map(str::to_string)
            .unwrap_or_else(|| self.actor.animation.current_frame().to_string());
        self.actor.animation.hold(frame);
    }

    /// Lateral dodge after a successful dribble
    pub fn nudge_x(&mut self, dx: f64) {
        let position = self.actor.position();
        self.actor.set_position(Vec2::new(position.x + dx, position.y));
        if dx != 0.0 {
            self.actor.facing = Facing::from_dx(dx);
        }
    }

    /// Freeze the body and detach input, returning what is needed to undo it
    pub(crate) fn suspend(&mut self) -> PlayerSuspension {
        let captured = PlayerSuspension {
            position: self.actor.position(),
            velocity: self.actor.velocity(),
            input_attached: self.input_attached,
            body_enabled: self.body_enabled,
        };
        self.body_enabled = false;
        self.input_attached = false;
        self.is_moving = false;
        self.actor.set_velocity(Vec2::ZERO);
        captured
    }

    pub(crate) fn resume(&mut self, captured: PlayerSuspension) {
        self.actor.set_position(captured.position);
        self.actor.set_velocity(captured.velocity);
        self.input_attached = captured.input_attached;
        self.body_enabled = captured.body_enabled;
    }

    /// Stop everything for the caught sequence
    pub fn freeze(&mut self) {
        self.body_enabled = false;
        self.input_attached = false;
        self.is_moving = false;
        self.actor.set_velocity(Vec2::ZERO);
        self.actor.animation.pause();
    }
}
