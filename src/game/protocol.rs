//! Serializable types crossing the phase-host boundary: payloads, outcomes and per-frame events

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::actor::Facing;
use super::physics::Vec2;
use super::shot::DiveChoice;

/// Top-level phases, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    /// Top-down dribble toward the shooting spot
    Approach,
    /// Camera parked, fading to the penalty view
    ShotSetup,
    /// Aiming, cinematic and ball flight
    Shoot,
    /// Result feedback on screen
    Resolve,
    End,
}

/// Why the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Scored,
    Saved,
    /// Feet contact with a defender
    Caught,
    /// Tackle countdown ran out
    TackledOut,
}

/// Final result of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub scored: bool,
    pub reason: EndReason,
}

impl Outcome {
    pub fn lost(reason: EndReason) -> Self {
        Self { scored: false, reason }
    }

    /// Caption shown on the end screen
    pub fn caption(&self) -> &'static str {
        match self.reason {
            EndReason::Scored => "YOU SCORED!",
            EndReason::Saved => "SAVED! TRY AGAIN",
            EndReason::Caught | EndReason::TackledOut => "YOU LOST THE BALL",
        }
    }
}

/// What the approach phase hands to the shoot phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproachHandoff {
    /// World position of the player when locked
    pub player_position: Vec2,
    pub facing: Facing,
    /// Frame the player was showing
    pub frame: String,
    pub shooting_target: Vec2,
}

/// Immutable snapshot passed across a phase boundary, consumed once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseTransitionPayload {
    Approach(ApproachHandoff),
    Outcome { scored: bool },
}

/// Presentation events produced by one frame, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A phase began
    PhaseStarted { phase: PhaseName },

    /// Transient on-screen text
    Caption { text: String, duration_ms: f64 },

    /// Full-screen flash
    Flash { duration_ms: f64 },

    /// Fade the view to black
    FadeOut { duration_ms: f64 },

    /// Player entered a defender's zone
    TackleStarted { opponent_id: Uuid, duration_ms: f64 },

    /// Remaining whole seconds changed
    TackleCountdown { seconds: u32 },

    /// Encounter ended without a failure
    TackleEscaped { opponent_id: Uuid, dodged: bool },

    TackleFailed { opponent_id: Uuid },

    /// Caught sequence started
    PlayerCaught {
        opponent_id: Option<Uuid>,
        reason: EndReason,
    },

    /// Player locked on the shooting spot
    ReachedShootingSpot { target: Vec2 },

    ZoomChanged { zoom: f64 },

    /// Aim frozen, keeper dive chosen
    ShotCommitted { target: Vec2, dive: DiveChoice },

    /// Kick overlay
    CinematicStarted { duration_ms: f64, fade_in_ms: f64 },

    /// Ball leaves the shooter
    BallLaunched { from: Vec2, to: Vec2, flight_ms: f64 },

    KeeperDived { dive: DiveChoice, to: Vec2, angle: f64 },

    ShotResolved { saved: bool, ball: Vec2, keeper: Vec2 },

    GameEnded { outcome: Outcome },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_wire_shape() {
        let payload = PhaseTransitionPayload::Outcome { scored: true };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "outcome", "scored": true }));

        let event = GameEvent::TackleCountdown { seconds: 2 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "tackle_countdown");
    }

    #[test]
    fn handoff_deserializes() {
        let raw = r#"{
            "type": "approach",
            "player_position": { "x": 1000.0, "y": 650.0 },
            "facing": "left",
            "frame": "shoot1",
            "shooting_target": { "x": 1000.0, "y": 650.0 }
        }"#;
        let payload: PhaseTransitionPayload = serde_json::from_str(raw).unwrap();
        match payload {
            PhaseTransitionPayload::Approach(handoff) => {
                assert_eq!(handoff.facing, Facing::Left);
                assert_eq!(handoff.frame, "shoot1");
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }
}
