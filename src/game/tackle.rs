//! Timed tackle encounter: slowed world, real-time countdown, dribble escape

use tracing::{debug, info, warn};

use crate::config::tuning::TackleTuning;

use super::actor::ActorId;
use super::player::{PlayerController, PlayerSuspension};
use super::protocol::GameEvent;
use super::swarm::{HomingCapture, OpponentSwarm};
use super::timing::{ScaleOverride, TimeScale};

/// Everything an active encounter changed, held until it ends
#[derive(Debug)]
struct ActiveEncounter {
    opponent: ActorId,
    start_ms: f64,
    /// Last countdown readout sent to the host
    readout: u32,
    /// Dropping this puts the world time-scale back
    scale: ScaleOverride,
    homing: Vec<HomingCapture>,
    player: PlayerSuspension,
}

#[derive(Debug)]
enum EncounterState {
    Idle,
    Active(ActiveEncounter),
    /// Countdown expired; the approach is lost
    Failed,
}

/// How an encounter ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TackleExit {
    /// Dribble input, or the player slipped out of the zone (`dodged == false`)
    Escaped { opponent: ActorId, dodged: bool },
    TimedOut { opponent: ActorId },
}

/// At most one encounter runs at a time
#[derive(Debug)]
pub struct TackleEncounter {
    tuning: TackleTuning,
    time_scale: TimeScale,
    field_center_x: f64,
    state: EncounterState,
    /// Escaped defender and the wall-clock time its zone re-arms
    grace: Option<(ActorId, f64)>,
}

impl TackleEncounter {
    pub fn new(tuning: TackleTuning, time_scale: TimeScale, field_center_x: f64) -> Self {
        if tuning.enabled && tuning.zone.is_degenerate() {
            warn!(
                shape = ?tuning.zone,
                "Tackle zone shape has no area, encounters will never start"
            );
        }
        Self {
            tuning,
            time_scale,
            field_center_x,
            state: EncounterState::Idle,
            grace: None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, EncounterState::Active(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, EncounterState::Failed)
    }

    pub fn dangerous_opponent(&self) -> Option<ActorId> {
        match &self.state {
            EncounterState::Active(active) => Some(active.opponent),
            EncounterState::Idle | EncounterState::Failed => None,
        }
    }

    pub fn start_time_ms(&self) -> Option<f64> {
        match &self.state {
            EncounterState::Active(active) => Some(active.start_ms),
            EncounterState::Idle | EncounterState::Failed => None,
        }
    }

    /// Whole seconds left on the countdown, rounded up
    pub fn remaining_seconds(&self, now_ms: f64) -> Option<u32> {
        self.start_time_ms()
            .map(|start| countdown_seconds(self.tuning.duration_ms - (now_ms - start)))
    }

    /// Run one frame of the encounter.
    ///
    /// `now_ms` is wall-clock time, so the countdown ignores the slowed
    /// world time-scale.
    pub fn update(
        &mut self,
        now_ms: f64,
        action_pressed: bool,
        player: &mut PlayerController,
        swarm: &mut OpponentSwarm,
        events: &mut Vec<GameEvent>,
    ) -> Option<TackleExit> {
        let (opponent, start_ms, readout) = match &self.state {
            EncounterState::Failed => return None,
            EncounterState::Idle => {
                self.try_enter(now_ms, player, swarm, events);
                return None;
            }
            EncounterState::Active(active) => (active.opponent, active.start_ms, active.readout),
        };

        let remaining = self.tuning.duration_ms - (now_ms - start_ms);
        if remaining <= 0.0 {
            self.finish(player, swarm);
            self.state = EncounterState::Failed;
            info!(opponent_id = %opponent, "Tackle countdown expired");
            events.push(GameEvent::TackleCountdown { seconds: 0 });
            events.push(GameEvent::TackleFailed { opponent_id: opponent });
            return Some(TackleExit::TimedOut { opponent });
        }

        if action_pressed {
            return Some(self.escape(opponent, true, now_ms, player, swarm, events));
        }

        let still_inside = swarm
            .zone_for(opponent, &self.tuning.zone)
            .is_some_and(|zone| zone.contains(player.position()));
        if !still_inside {
            return Some(self.escape(opponent, false, now_ms, player, swarm, events));
        }

        let seconds = countdown_seconds(remaining);
        if seconds != readout {
            if let EncounterState::Active(active) = &mut self.state {
                active.readout = seconds;
            }
            events.push(GameEvent::TackleCountdown { seconds });
        }
        None
    }

    fn try_enter(
        &mut self,
        now_ms: f64,
        player: &mut PlayerController,
        swarm: &mut OpponentSwarm,
        events: &mut Vec<GameEvent>,
    ) {
        if !self.tuning.enabled
            || self.tuning.zone.is_degenerate()
            || player.is_locked()
            || swarm.is_standing_down()
            || swarm.is_frozen()
        {
            return;
        }

        if let Some((_, until)) = self.grace {
            if now_ms >= until {
                self.grace = None;
            }
        }
        let ignored = self.grace.map(|(id, _)| id);

        // First zone wins; overlapping zones are not considered further.
        let position = player.position();
        let Some(opponent) = swarm
            .zones(&self.tuning.zone)
            .into_iter()
            .find(|(id, zone)| Some(*id) != ignored && zone.contains(position))
            .map(|(id, _)| id)
        else {
            return;
        };

        let scale = self.time_scale.override_by(self.tuning.slow_factor);
        let homing = swarm.slow_down(self.tuning.slow_factor);
        let suspended = player.suspend();
        let readout = countdown_seconds(self.tuning.duration_ms);

        info!(
            opponent_id = %opponent,
            duration_ms = self.tuning.duration_ms,
            "Tackle encounter started"
        );
        events.push(GameEvent::TackleStarted {
            opponent_id: opponent,
            duration_ms: self.tuning.duration_ms,
        });
        events.push(GameEvent::TackleCountdown { seconds: readout });

        self.state = EncounterState::Active(ActiveEncounter {
            opponent,
            start_ms: now_ms,
            readout,
            scale,
            homing,
            player: suspended,
        });
    }

    fn escape(
        &mut self,
        opponent: ActorId,
        dodged: bool,
        now_ms: f64,
        player: &mut PlayerController,
        swarm: &mut OpponentSwarm,
        events: &mut Vec<GameEvent>,
    ) -> TackleExit {
        self.finish(player, swarm);
        self.state = EncounterState::Idle;
        self.grace = Some((opponent, now_ms + self.tuning.regrace_ms));

        if dodged {
            let direction = if player.position().x < self.field_center_x { -1.0 } else { 1.0 };
            player.nudge_x(direction * self.tuning.dodge_distance);
            events.push(GameEvent::Caption {
                text: "DRIBBLED!".to_string(),
                duration_ms: 800.0,
            });
        }

        info!(opponent_id = %opponent, dodged, "Tackle escaped");
        events.push(GameEvent::TackleEscaped {
            opponent_id: opponent,
            dodged,
        });
        TackleExit::Escaped { opponent, dodged }
    }

    /// Undo every change made on entry
    fn finish(&mut self, player: &mut PlayerController, swarm: &mut OpponentSwarm) {
        let state = std::mem::replace(&mut self.state, EncounterState::Idle);
        let EncounterState::Active(active) = state else {
            self.state = state;
            return;
        };

        swarm.restore(&active.homing);
        player.resume(active.player);
        drop(active.scale);
        debug!(time_scale = self.time_scale.current(), "Encounter state restored");
    }
}

/// Countdown readout for a remaining duration
pub fn countdown_seconds(remaining_ms: f64) -> u32 {
    if remaining_ms <= 0.0 {
        0
    } else {
        (remaining_ms / 1000.0).ceil() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tuning::{FormationTuning, PlayerTuning};
    use crate::game::actor::ActorKind;
    use crate::game::formation::{FormationRole, FormationSlot};
    use crate::game::physics::Vec2;

    struct Rig {
        scale: TimeScale,
        tackle: TackleEncounter,
        player: PlayerController,
        swarm: OpponentSwarm,
        events: Vec<GameEvent>,
    }

    fn rig(defenders: &[(f64, f64)], player_at: Vec2) -> Rig {
        let slots: Vec<FormationSlot> = defenders
            .iter()
            .enumerate()
            .map(|(i, (x, y))| FormationSlot {
                role: FormationRole::Attacker,
                label: format!("A{}", i + 1),
                position: Vec2::new(*x, *y),
            })
            .collect();
        let scale = TimeScale::new();
        Rig {
            tackle: TackleEncounter::new(TackleTuning::default(), scale.clone(), 1000.0),
            scale,
            player: PlayerController::new(player_at, &PlayerTuning::default(), 8.0),
            swarm: OpponentSwarm::from_formation(
                &slots,
                Vec2::new(1000.0, 0.0),
                &FormationTuning::default(),
            ),
            events: Vec::new(),
        }
    }

    impl Rig {
        fn step(&mut self, now_ms: f64, action: bool) -> Option<TackleExit> {
            self.tackle
                .update(now_ms, action, &mut self.player, &mut self.swarm, &mut self.events)
        }

        fn homing(&self) -> Vec<f64> {
            self.swarm
                .defenders()
                .map(|unit| match &unit.kind {
                    ActorKind::Defender(state) => state.homing_speed,
                    _ => unreachable!(),
                })
                .collect()
        }
    }

    #[test]
    fn escape_restores_and_dodges() {
        // Player 150 below the defender, left of centre
        let mut rig = rig(&[(800.0, 1000.0)], Vec2::new(800.0, 1150.0));
        let homing_before = rig.homing();

        assert_eq!(rig.step(0.0, false), None);
        assert!(rig.tackle.is_active());
        assert!((rig.scale.current() - 0.1).abs() < 1e-12);
        assert!(!rig.player.body_enabled());
        assert!(rig.homing().iter().all(|speed| (speed - 5.0).abs() < 1e-9));

        let exit = rig.step(1000.0, true);
        let opponent = rig.swarm.defenders().next().unwrap().id;
        assert_eq!(exit, Some(TackleExit::Escaped { opponent, dodged: true }));
        assert!(!rig.tackle.is_active());
        assert_eq!(rig.scale.current(), 1.0);
        assert_eq!(rig.homing(), homing_before);
        assert!(rig.player.body_enabled());
        assert!(rig.player.input_attached());
        assert_eq!(rig.player.position(), Vec2::new(710.0, 1150.0));
    }

    #[test]
    fn timeout_fires_once() {
        let mut rig = rig(&[(1200.0, 1000.0)], Vec2::new(1200.0, 1150.0));
        rig.step(0.0, false);

        let mut readouts = Vec::new();
        let mut failures = 0;
        let mut now = 0.0;
        while now <= 3500.0 {
            now += 16.0;
            if let Some(TackleExit::TimedOut { .. }) = rig.step(now, false) {
                failures += 1;
            }
            if let Some(seconds) = rig.tackle.remaining_seconds(now) {
                readouts.push(seconds);
            }
        }

        assert_eq!(failures, 1);
        assert!(rig.tackle.is_failed());
        assert_eq!(rig.scale.current(), 1.0);
        assert!(readouts.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(readouts.first(), Some(&3));
        let failed_events = rig
            .events
            .iter()
            .filter(|event| matches!(event, GameEvent::TackleFailed { .. }))
            .count();
        assert_eq!(failed_events, 1);
    }

    #[test]
    fn overlapping_zones_start_one_encounter() {
        let mut rig = rig(&[(1000.0, 1000.0), (1010.0, 1000.0)], Vec2::new(1005.0, 1150.0));
        rig.step(0.0, false);
        rig.step(16.0, false);

        let started = rig
            .events
            .iter()
            .filter(|event| matches!(event, GameEvent::TackleStarted { .. }))
            .count();
        assert_eq!(started, 1);
        assert!((rig.scale.current() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn slipping_out_ends_without_dodge() {
        let mut rig = rig(&[(1000.0, 1000.0)], Vec2::new(1000.0, 1150.0));
        rig.step(0.0, false);
        assert!(rig.tackle.is_active());

        // Zone collapses, so the player is no longer inside it
        rig.tackle.tuning.zone.width = 0.0;
        let exit = rig.step(500.0, false);
        assert!(matches!(exit, Some(TackleExit::Escaped { dodged: false, .. })));
        assert_eq!(rig.player.position(), Vec2::new(1000.0, 1150.0));
        assert_eq!(rig.scale.current(), 1.0);
    }

    #[test]
    fn escaped_defender_gets_grace() {
        let mut rig = rig(&[(1000.0, 1000.0)], Vec2::new(1000.0, 1140.0));
        rig.tackle.tuning.zone.width = 400.0;
        rig.step(0.0, false);
        rig.step(100.0, true);
        // The dodge lands inside the wide zone; only the grace window keeps it quiet
        assert_eq!(rig.player.position(), Vec2::new(1090.0, 1140.0));
        assert!(!rig.tackle.is_active());
        rig.step(200.0, false);
        assert!(!rig.tackle.is_active());
        rig.step(800.0, false);
        assert!(rig.tackle.is_active());
    }

    #[test]
    fn degenerate_zone_never_starts_an_encounter() {
        let mut rig = rig(&[(1000.0, 1000.0)], Vec2::new(1000.0, 1150.0));
        rig.tackle.tuning.zone.segments = 0;
        for frame in 0..10 {
            assert_eq!(rig.step(frame as f64 * 16.0, false), None);
        }
        assert!(!rig.tackle.is_active());
        assert!(rig.events.is_empty());
        assert_eq!(rig.scale.current(), 1.0);
    }

    #[test]
    fn readout_rounds_up() {
        assert_eq!(countdown_seconds(3000.0), 3);
        assert_eq!(countdown_seconds(2999.0), 3);
        assert_eq!(countdown_seconds(2000.0), 2);
        assert_eq!(countdown_seconds(1.0), 1);
        assert_eq!(countdown_seconds(0.0), 0);
        assert_eq!(countdown_seconds(-5.0), 0);
    }
}
