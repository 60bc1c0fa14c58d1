//! Moving entities: position, facing, velocity and a frame-cycle animation

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::formation::FormationRole;
use super::physics::{Aabb, PhysicsSystem, Vec2};
use super::timing::TimeContext;

/// Stable identity of an actor within a phase
pub type ActorId = Uuid;

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing implied by a horizontal displacement
    pub fn from_dx(dx: f64) -> Self {
        if dx < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        }
    }

    pub fn flip_x(self) -> bool {
        self == Facing::Left
    }
}

/// Defender behaviour state
#[derive(Debug, Clone, PartialEq)]
pub struct DefenderState {
    pub role: FormationRole,
    /// Formation label such as "A1" or "M3"
    pub label: String,
    /// Current homing speed; scaled during tackle encounters
    pub homing_speed: f64,
}

/// Keeper behaviour state
#[derive(Debug, Clone, PartialEq)]
pub struct KeeperState {
    /// Spot the keeper guards
    pub anchor: Vec2,
}

/// What an actor is, carrying only what its behaviour needs
#[derive(Debug, Clone, PartialEq)]
pub enum ActorKind {
    Player,
    Defender(DefenderState),
    Keeper(KeeperState),
}

/// Playback state of a frame cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Playing,
    Paused,
    Stopped,
}

/// Named frame-cycle animation advanced by the scaled frame delta
#[derive(Debug, Clone, PartialEq)]
pub struct FrameCycle {
    frames: Vec<String>,
    fps: f64,
    elapsed_ms: f64,
    playback: Playback,
    still: Option<String>,
}

impl FrameCycle {
    pub fn new(frames: Vec<String>, fps: f64) -> Self {
        Self {
            frames,
            fps: fps.max(0.0),
            elapsed_ms: 0.0,
            playback: Playback::Playing,
            still: None,
        }
    }

    pub fn advance(&mut self, ctx: &TimeContext) {
        if self.playback == Playback::Playing {
            self.elapsed_ms += ctx.scaled_delta();
        }
    }

    pub fn pause(&mut self) {
        if self.playback == Playback::Playing {
            self.playback = Playback::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.playback == Playback::Paused {
            self.playback = Playback::Playing;
        }
    }

    /// Restart cycling, dropping any still frame
    pub fn play(&mut self) {
        self.still = None;
        self.playback = Playback::Playing;
    }

    /// Start cycling again if paused or stopped
    pub fn ensure_playing(&mut self) {
        if self.playback != Playback::Playing {
            self.play();
        }
    }

    /// Stop cycling and hold `frame`
    pub fn hold(&mut self, frame: impl Into<String>) {
        self.still = Some(frame.into());
        self.playback = Playback::Stopped;
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn current_frame(&self) -> &str {
        if let Some(still) = &self.still {
            return still;
        }
        if self.frames.is_empty() {
            return "";
        }
        let index = (self.elapsed_ms / 1000.0 * self.fps).floor() as usize % self.frames.len();
        &self.frames[index]
    }
}

/// Base moving entity
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    position: Vec2,
    velocity: Vec2,
    pub facing: Facing,
    /// Collision extent (width, height), centred on the position
    pub size: Vec2,
    pub max_speed: f64,
    /// Visual rotation in degrees
    pub angle: f64,
    pub animation: FrameCycle,
}

impl Actor {
    pub fn new(
        kind: ActorKind,
        position: Vec2,
        size: Vec2,
        max_speed: f64,
        animation: FrameCycle,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            velocity: Vec2::ZERO,
            facing: Facing::Right,
            size,
            max_speed,
            angle: 0.0,
            animation,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Move to `position`; non-finite input is rejected
    pub fn set_position(&mut self, position: Vec2) {
        if !position.is_finite() {
            warn!(actor_id = %self.id, ?position, "Rejected non-finite position");
            return;
        }
        self.position = position;
    }

    /// Set velocity, bounded by the configured max speed
    pub fn set_velocity(&mut self, velocity: Vec2) {
        if !velocity.is_finite() {
            self.velocity = Vec2::ZERO;
            return;
        }
        self.velocity = PhysicsSystem::clamp_speed(velocity, self.max_speed);
    }

    /// Put back a previously captured velocity without re-clamping it
    pub(crate) fn restore_velocity(&mut self, velocity: Vec2) {
        if velocity.is_finite() {
            self.velocity = velocity;
        }
    }

    /// Integrate velocity over the frame
    pub fn step(&mut self, delta_ms: f64) {
        let next = PhysicsSystem::integrate(self.position, self.velocity, delta_ms);
        self.set_position(next);
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.position, self.size)
    }

    pub fn is_defender(&self) -> bool {
        matches!(self.kind, ActorKind::Defender(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle() -> FrameCycle {
        FrameCycle::new(vec!["a".to_string(), "b".to_string()], 6.0)
    }

    #[test]
    fn frame_cycle_follows_scaled_time() {
        let mut anim = cycle();
        assert_eq!(anim.current_frame(), "a");
        anim.advance(&TimeContext::new(200.0, 0.0));
        assert_eq!(anim.current_frame(), "b");

        // A slowed frame barely moves the cycle.
        let slow = TimeContext {
            scale: 0.1,
            ..TimeContext::new(200.0, 0.0)
        };
        anim.advance(&slow);
        assert_eq!(anim.current_frame(), "b");
    }

    #[test]
    fn paused_cycle_holds_and_resumes() {
        let mut anim = cycle();
        anim.pause();
        anim.pause();
        anim.advance(&TimeContext::new(1000.0, 0.0));
        assert_eq!(anim.current_frame(), "a");
        anim.resume();
        assert_eq!(anim.playback(), Playback::Playing);
        anim.hold("ready");
        anim.resume();
        assert_eq!(anim.current_frame(), "ready");
        assert_eq!(anim.playback(), Playback::Stopped);
    }

    #[test]
    fn velocity_is_bounded_and_position_finite() {
        let mut actor = Actor::new(
            ActorKind::Player,
            Vec2::new(10.0, 10.0),
            Vec2::new(10.0, 10.0),
            100.0,
            cycle(),
        );
        actor.set_velocity(Vec2::new(300.0, 400.0));
        assert!((actor.velocity().length() - 100.0).abs() < 1e-9);

        actor.set_position(Vec2::new(f64::NAN, 0.0));
        assert_eq!(actor.position(), Vec2::new(10.0, 10.0));
    }
}
