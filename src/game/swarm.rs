//! Opponent swarm: homing defenders plus a stationary keeper

use tracing::{debug, info};

use crate::config::tuning::FormationTuning;

use super::actor::{Actor, ActorId, ActorKind, DefenderState, Facing, FrameCycle, KeeperState};
use super::formation::FormationSlot;
use super::physics::{PhysicsSystem, Vec2};
use super::timing::TimeContext;
use super::zone::{TackleZone, TackleZoneShape};

/// Direction tackle zones point: down-field, toward the player's start
pub const ZONE_DIRECTION: Vec2 = Vec2::new(0.0, 1.0);

/// Pre-encounter homing state of one defender
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomingCapture {
    pub id: ActorId,
    pub homing_speed: f64,
    pub velocity: Vec2,
}

/// Owns every opponent actor for the approach phase
#[derive(Debug, Clone)]
pub struct OpponentSwarm {
    units: Vec<Actor>,
    /// Defenders stopped homing for the rest of the phase
    standing_down: bool,
    /// Caught sequence in progress; nothing moves
    frozen: bool,
}

impl OpponentSwarm {
    pub fn from_formation(
        slots: &[FormationSlot],
        keeper_spot: Vec2,
        tuning: &FormationTuning,
    ) -> Self {
        let size = Vec2::new(tuning.body_width, tuning.body_height);

        let mut units: Vec<Actor> = slots
            .iter()
            .map(|slot| {
                Actor::new(
                    ActorKind::Defender(DefenderState {
                        role: slot.role,
                        label: slot.label.clone(),
                        homing_speed: tuning.homing_speed,
                    }),
                    slot.position,
                    size,
                    tuning.homing_speed,
                    FrameCycle::new(tuning.opponent_frames.clone(), tuning.opponent_fps),
                )
            })
            .collect();

        units.push(Actor::new(
            ActorKind::Keeper(KeeperState { anchor: keeper_spot }),
            keeper_spot,
            size,
            0.0,
            FrameCycle::new(tuning.keeper_frames.clone(), tuning.keeper_fps),
        ));

        info!(defenders = slots.len(), "Opponent swarm seeded");

        Self {
            units,
            standing_down: false,
            frozen: false,
        }
    }

    pub fn units(&self) -> &[Actor] {
        &self.units
    }

    pub fn defenders(&self) -> impl Iterator<Item = &Actor> {
        self.units.iter().filter(|unit| unit.is_defender())
    }

    pub fn keeper(&self) -> Option<&Actor> {
        self.units
            .iter()
            .find(|unit| matches!(unit.kind, ActorKind::Keeper(_)))
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.units.iter().find(|unit| unit.id == id)
    }

    pub fn is_standing_down(&self) -> bool {
        self.standing_down
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Home every defender toward the player
    pub fn tick(&mut self, player_position: Vec2, player_locked: bool, ctx: &TimeContext) {
        if self.frozen {
            return;
        }

        for unit in &mut self.units {
            if player_locked {
                unit.set_velocity(Vec2::ZERO);
                unit.animation.pause();
                continue;
            }

            let homing_speed = match &unit.kind {
                ActorKind::Defender(state) if !self.standing_down => Some(state.homing_speed),
                ActorKind::Defender(_) | ActorKind::Keeper(_) | ActorKind::Player => None,
            };
            let Some(homing_speed) = homing_speed else {
                if unit.is_defender() {
                    unit.set_velocity(Vec2::ZERO);
                }
                unit.animation.resume();
                unit.animation.advance(ctx);
                continue;
            };

            let offset = player_position - unit.position();
            let distance = offset.length();
            let direction = if distance > 0.0 {
                offset * (1.0 / distance)
            } else {
                Vec2::ZERO
            };

            unit.set_velocity(direction * homing_speed);
            if direction.x != 0.0 {
                unit.facing = Facing::from_dx(direction.x);
            }
            unit.step(ctx.delta_ms);
            unit.animation.resume();
            unit.animation.advance(ctx);
        }
    }

    /// First defender whose feet strip overlaps the player's
    pub fn check_collision(&self, player: &Actor, feet_fraction: f64) -> Option<ActorId> {
        self.defenders()
            .find(|unit| {
                PhysicsSystem::feet_overlap(
                    player.position(),
                    player.size,
                    unit.position(),
                    unit.size,
                    feet_fraction,
                )
            })
            .map(|unit| unit.id)
    }

    /// Current tackle zone of every defender; degenerate shapes are skipped
    pub fn zones(&self, shape: &TackleZoneShape) -> Vec<(ActorId, TackleZone)> {
        self.defenders()
            .filter_map(|unit| {
                TackleZone::around(unit.position(), ZONE_DIRECTION, shape)
                    .map(|zone| (unit.id, zone))
            })
            .collect()
    }

    pub fn zone_for(&self, id: ActorId, shape: &TackleZoneShape) -> Option<TackleZone> {
        self.get(id)
            .filter(|unit| unit.is_defender())
            .and_then(|unit| TackleZone::around(unit.position(), ZONE_DIRECTION, shape))
    }

    /// Stop and pause everything for the caught sequence
    pub fn freeze(&mut self) {
        self.frozen = true;
        for unit in &mut self.units {
            unit.set_velocity(Vec2::ZERO);
            unit.animation.pause();
        }
    }

    /// Defenders stop chasing once the player is close to the spot
    pub fn stand_down(&mut self) {
        if self.standing_down {
            return;
        }
        self.standing_down = true;
        for unit in self.units.iter_mut().filter(|unit| unit.is_defender()) {
            unit.set_velocity(Vec2::ZERO);
        }
        debug!("Opponents standing down");
    }

    /// Scale every defender's homing speed and velocity, returning the exact prior values
    pub(crate) fn slow_down(&mut self, factor: f64) -> Vec<HomingCapture> {
        let mut captured = Vec::new();
        for unit in &mut self.units {
            let velocity = unit.velocity();
            let ActorKind::Defender(state) = &mut unit.kind else {
                continue;
            };
            captured.push(HomingCapture {
                id: unit.id,
                homing_speed: state.homing_speed,
                velocity,
            });
            state.homing_speed *= factor;
            unit.set_velocity(velocity * factor);
        }
        captured
    }

    pub(crate) fn restore(&mut self, captured: &[HomingCapture]) {
        for capture in captured {
            let Some(unit) = self.units.iter_mut().find(|unit| unit.id == capture.id) else {
                continue;
            };
            if let ActorKind::Defender(state) = &mut unit.kind {
                state.homing_speed = capture.homing_speed;
            }
            unit.restore_velocity(capture.velocity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actor::Playback;
    use crate::game::formation::FormationRole;

    fn slot(x: f64, y: f64) -> FormationSlot {
        FormationSlot {
            role: FormationRole::Midfielder,
            label: "M1".to_string(),
            position: Vec2::new(x, y),
        }
    }

    fn swarm(slots: &[FormationSlot]) -> OpponentSwarm {
        OpponentSwarm::from_formation(slots, Vec2::new(500.0, 0.0), &FormationTuning::default())
    }

    fn homing_speed(actor: &Actor) -> f64 {
        match &actor.kind {
            ActorKind::Defender(state) => state.homing_speed,
            _ => 0.0,
        }
    }

    #[test]
    fn defenders_home_and_keeper_stays() {
        let mut swarm = swarm(&[slot(0.0, 0.0)]);
        swarm.tick(Vec2::new(100.0, 0.0), false, &TimeContext::new(1000.0, 0.0));

        let defender = swarm.defenders().next().unwrap();
        assert!((defender.position().x - 50.0).abs() < 1e-9);
        assert_eq!(defender.velocity(), Vec2::new(50.0, 0.0));
        assert_eq!(swarm.keeper().unwrap().position(), Vec2::new(500.0, 0.0));
    }

    #[test]
    fn locked_player_stops_the_swarm() {
        let mut swarm = swarm(&[slot(0.0, 0.0)]);
        swarm.tick(Vec2::new(100.0, 0.0), false, &TimeContext::new(100.0, 0.0));
        swarm.tick(Vec2::new(100.0, 0.0), true, &TimeContext::new(100.0, 0.0));
        swarm.tick(Vec2::new(100.0, 0.0), true, &TimeContext::new(100.0, 0.0));

        let defender = swarm.defenders().next().unwrap();
        assert_eq!(defender.velocity(), Vec2::ZERO);
        assert_eq!(defender.animation.playback(), Playback::Paused);
    }

    #[test]
    fn slow_down_restores_verbatim() {
        let mut swarm = swarm(&[slot(0.0, 0.0), slot(300.0, 0.0)]);
        swarm.tick(Vec2::new(100.0, 100.0), false, &TimeContext::new(16.0, 0.0));
        let before: Vec<(f64, Vec2)> = swarm
            .defenders()
            .map(|unit| (homing_speed(unit), unit.velocity()))
            .collect();

        let captured = swarm.slow_down(0.1);
        assert_eq!(captured.len(), 2);
        assert!(swarm.defenders().all(|unit| (homing_speed(unit) - 5.0).abs() < 1e-9));

        swarm.tick(Vec2::new(100.0, 100.0), false, &TimeContext::new(16.0, 0.0));
        swarm.restore(&captured);

        let after: Vec<(f64, Vec2)> = swarm
            .defenders()
            .map(|unit| (homing_speed(unit), unit.velocity()))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn collision_uses_feet_only() {
        let swarm = swarm(&[slot(100.0, 100.0)]);
        let tuning = crate::config::tuning::PlayerTuning::default();
        let mut player = Actor::new(
            ActorKind::Player,
            Vec2::new(100.0, 40.0),
            Vec2::new(tuning.body_width, tuning.body_height),
            100.0,
            FrameCycle::new(Vec::new(), 0.0),
        );
        // Bodies overlap, feet strips do not
        assert_eq!(swarm.check_collision(&player, 0.2), None);

        player.set_position(Vec2::new(110.0, 95.0));
        assert!(swarm.check_collision(&player, 0.2).is_some());
    }

    #[test]
    fn zones_only_for_defenders() {
        let swarm = swarm(&[slot(0.0, 0.0), slot(300.0, 0.0)]);
        let zones = swarm.zones(&TackleZoneShape::default());
        assert_eq!(zones.len(), 2);
        let keeper = swarm.keeper().unwrap().id;
        assert!(swarm.zone_for(keeper, &TackleZoneShape::default()).is_none());
    }
}
