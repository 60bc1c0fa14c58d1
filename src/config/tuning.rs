//! Gameplay tuning - every constant the phases read, with JSON overrides

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::game::zone::TackleZoneShape;

/// Player (approach phase) tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Running speed in world units per second
    pub run_speed: f64,
    /// Distance kept between the player and the bottom of the viewport
    pub bottom_offset: f64,
    /// Collision extent (width, height)
    pub body_width: f64,
    pub body_height: f64,
    /// Run cycle frames and rate
    pub run_frames: Vec<String>,
    pub run_fps: f64,
    /// Static frame shown once locked for the shot
    pub ready_frame: String,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            run_speed: 100.0,
            bottom_offset: 200.0,
            body_width: 48.0,
            body_height: 96.0,
            run_frames: vec!["player1".to_string(), "player2".to_string()],
            run_fps: 6.0,
            ready_frame: "shoot1".to_string(),
        }
    }
}

/// Camera tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Upward scroll speed in world units per second
    pub run_speed: f64,
    /// Horizontal follow smoothing (0..1 per frame)
    pub follow_lerp_x: f64,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            run_speed: 220.0,
            follow_lerp_x: 0.12,
        }
    }
}

/// Opponent formation tuning (4-4-2 by default)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationTuning {
    pub defenders: usize,
    pub midfielders: usize,
    pub attackers: usize,
    /// Fraction of world width reserved as padding on each side
    pub padding_fraction: f64,
    /// Vertical jitter range of the attacker band
    pub attackers_band_spread: f64,
    /// Horizontal jitter range
    pub jitter_x: f64,
    /// Initial homing speed of every defender
    pub homing_speed: f64,
    pub body_width: f64,
    pub body_height: f64,
    pub opponent_frames: Vec<String>,
    pub opponent_fps: f64,
    pub keeper_frames: Vec<String>,
    pub keeper_fps: f64,
}

impl Default for FormationTuning {
    fn default() -> Self {
        Self {
            defenders: 4,
            midfielders: 4,
            attackers: 2,
            padding_fraction: 0.1,
            attackers_band_spread: 80.0,
            jitter_x: 30.0,
            homing_speed: 50.0,
            body_width: 48.0,
            body_height: 96.0,
            opponent_frames: vec!["opponent1".to_string(), "opponent2".to_string()],
            opponent_fps: 6.0,
            keeper_frames: vec!["keeper1".to_string(), "keeper2".to_string()],
            keeper_fps: 3.0,
        }
    }
}

/// Tackle encounter tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TackleTuning {
    /// Disable to play the basic variant (collision only, no zones)
    pub enabled: bool,
    pub duration_ms: f64,
    pub slow_factor: f64,
    pub dodge_distance: f64,
    /// Wall-clock window during which an escaped defender cannot re-arm
    pub regrace_ms: f64,
    pub zone: TackleZoneShape,
}

impl Default for TackleTuning {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_ms: 3000.0,
            slow_factor: 0.1,
            dodge_distance: 90.0,
            regrace_ms: 600.0,
            zone: TackleZoneShape::default(),
        }
    }
}

/// Approach phase orchestration tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApproachTuning {
    /// Distance from the top goal line to the shooting spot
    pub target_offset: f64,
    pub arrival_tolerance: f64,
    /// Below this distance to the spot the swarm stands down
    pub close_range: f64,
    /// Inset from the field sideline for the player clamp
    pub sideline_margin: f64,
    /// Fraction of each unit's height used for the feet overlap test
    pub feet_fraction: f64,
    pub flash_ms: f64,
    pub caught_delay_ms: f64,
    pub fade_ms: f64,
    /// Fraction of the viewport height kept above the spot when the camera parks
    pub park_framing: f64,
}

impl Default for ApproachTuning {
    fn default() -> Self {
        Self {
            target_offset: 250.0,
            arrival_tolerance: 8.0,
            close_range: 120.0,
            sideline_margin: 40.0,
            feet_fraction: 0.2,
            flash_ms: 250.0,
            caught_delay_ms: 1500.0,
            fade_ms: 500.0,
            park_framing: 0.6,
        }
    }
}

/// Shoot phase tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootTuning {
    /// Angular speed of the aim oscillation (radians per millisecond)
    pub aim_speed: f64,
    pub cinematic_ms: f64,
    pub cinematic_fade_in_ms: f64,
    pub ball_flight_ms: f64,
    pub keeper_dive_ms: f64,
    pub feedback_ms: f64,
    /// Minimum horizontal catch threshold
    pub catch_min_x: f64,
    /// Horizontal catch threshold as a fraction of goal width
    pub catch_fraction_x: f64,
    pub catch_y: f64,
    /// Frame swapped in when the ball leaves the foot
    pub launch_frame: String,
    /// Run cycle rate of the shooter
    pub shooter_fps: f64,
}

impl Default for ShootTuning {
    fn default() -> Self {
        Self {
            aim_speed: 0.0035,
            cinematic_ms: 4000.0,
            cinematic_fade_in_ms: 180.0,
            ball_flight_ms: 700.0,
            keeper_dive_ms: 520.0,
            feedback_ms: 2000.0,
            catch_min_x: 36.0,
            catch_fraction_x: 0.18,
            catch_y: 48.0,
            launch_frame: "shoot2".to_string(),
            shooter_fps: 8.0,
        }
    }
}

/// Complete gameplay tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub camera: CameraTuning,
    pub formation: FormationTuning,
    pub tackle: TackleTuning,
    pub approach: ApproachTuning,
    pub shoot: ShootTuning,
}

impl Tuning {
    /// Load tuning overrides from a JSON file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::TuningRead(path.display().to_string(), e))?;
        let tuning: Tuning = serde_json::from_str(&raw)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would stall or invert the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("player.run_speed", self.player.run_speed),
            ("player.bottom_offset", self.player.bottom_offset),
            ("player.run_fps", self.player.run_fps),
            ("camera.run_speed", self.camera.run_speed),
            ("formation.homing_speed", self.formation.homing_speed),
            ("formation.opponent_fps", self.formation.opponent_fps),
            ("formation.keeper_fps", self.formation.keeper_fps),
            ("approach.arrival_tolerance", self.approach.arrival_tolerance),
            ("approach.flash_ms", self.approach.flash_ms),
            ("approach.caught_delay_ms", self.approach.caught_delay_ms),
            ("approach.fade_ms", self.approach.fade_ms),
            ("tackle.duration_ms", self.tackle.duration_ms),
            ("tackle.slow_factor", self.tackle.slow_factor),
            ("tackle.dodge_distance", self.tackle.dodge_distance),
            ("tackle.regrace_ms", self.tackle.regrace_ms),
            ("shoot.aim_speed", self.shoot.aim_speed),
            ("shoot.cinematic_ms", self.shoot.cinematic_ms),
            ("shoot.ball_flight_ms", self.shoot.ball_flight_ms),
            ("shoot.keeper_dive_ms", self.shoot.keeper_dive_ms),
            ("shoot.feedback_ms", self.shoot.feedback_ms),
            ("shoot.shooter_fps", self.shoot.shooter_fps),
        ];

        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidTuning(name));
            }
        }

        if !(0.0..=1.0).contains(&self.camera.follow_lerp_x) {
            return Err(ConfigError::InvalidTuning("camera.follow_lerp_x"));
        }
        if !(0.0..=1.0).contains(&self.approach.feet_fraction) {
            return Err(ConfigError::InvalidTuning("approach.feet_fraction"));
        }
        // The save check reads the keeper's final spot, so the dive must land first
        if self.shoot.keeper_dive_ms > self.shoot.ball_flight_ms {
            return Err(ConfigError::InvalidTuning("shoot.keeper_dive_ms"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let tuning: Tuning =
            serde_json::from_str(r#"{ "tackle": { "duration_ms": 2000.0 } }"#).unwrap();
        assert_eq!(tuning.tackle.duration_ms, 2000.0);
        assert_eq!(tuning.tackle.slow_factor, 0.1);
        assert_eq!(tuning.player.run_speed, 100.0);
        assert_eq!(tuning.formation.defenders, 4);
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_speed() {
        let mut tuning = Tuning::default();
        tuning.camera.run_speed = 0.0;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::InvalidTuning("camera.run_speed"))
        ));
    }

    #[test]
    fn rejects_negative_speeds_and_durations() {
        let cases: [(&str, fn(&mut Tuning)); 12] = [
            ("player.run_fps", |t| t.player.run_fps = f64::NAN),
            ("formation.homing_speed", |t| t.formation.homing_speed = -50.0),
            ("formation.opponent_fps", |t| t.formation.opponent_fps = 0.0),
            ("formation.keeper_fps", |t| t.formation.keeper_fps = 0.0),
            ("approach.flash_ms", |t| t.approach.flash_ms = -100.0),
            ("approach.caught_delay_ms", |t| t.approach.caught_delay_ms = f64::INFINITY),
            ("approach.fade_ms", |t| t.approach.fade_ms = -5.0),
            ("tackle.dodge_distance", |t| t.tackle.dodge_distance = -60.0),
            ("tackle.regrace_ms", |t| t.tackle.regrace_ms = 0.0),
            ("shoot.cinematic_ms", |t| t.shoot.cinematic_ms = 0.0),
            ("shoot.feedback_ms", |t| t.shoot.feedback_ms = -1.0),
            ("shoot.shooter_fps", |t| t.shoot.shooter_fps = -12.0),
        ];

        for (field, corrupt) in cases {
            let mut tuning = Tuning::default();
            corrupt(&mut tuning);
            match tuning.validate() {
                Err(ConfigError::InvalidTuning(name)) => assert_eq!(name, field),
                other => panic!("{field} accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn keeper_dive_must_land_before_the_ball() {
        let mut tuning = Tuning::default();
        tuning.shoot.keeper_dive_ms = tuning.shoot.ball_flight_ms;
        assert!(tuning.validate().is_ok());

        tuning.shoot.keeper_dive_ms = tuning.shoot.ball_flight_ms + 1.0;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::InvalidTuning("shoot.keeper_dive_ms"))
        ));
    }
}
