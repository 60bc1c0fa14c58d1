//! Gameplay simulation: approach run, tackle encounters and the penalty shot

pub mod actor;
pub mod approach;
pub mod camera;
pub mod formation;
pub mod phase;
pub mod physics;
pub mod pitch;
pub mod player;
pub mod protocol;
pub mod shoot;
pub mod shot;
pub mod snapshot;
pub mod swarm;
pub mod tackle;
pub mod timing;
pub mod tween;
pub mod zone;

pub use phase::{Frame, PhaseCoordinator, PhaseHost, SetupError};
pub use pitch::Viewport;
pub use protocol::{EndReason, GameEvent, Outcome, PhaseName, PhaseTransitionPayload};
pub use snapshot::{SceneSnapshot, SnapshotBuilder};

/// Input state for a single frame.
///
/// `action` and `toggle_zoom` are edge-triggered: true only on the frame the
/// key went down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub action: bool,
    pub toggle_zoom: bool,
}
