//! Penalty kick: aim, cinematic overlay, ball flight and resolution

use rand::Rng;
use tracing::{info, warn};

use crate::config::tuning::{FormationTuning, PlayerTuning, ShootTuning};
use crate::util::time::DelayTimer;

use super::actor::{Actor, ActorKind, Facing, FrameCycle, KeeperState};
use super::physics::Vec2;
use super::pitch::{PenaltyLayout, Viewport};
use super::protocol::{ApproachHandoff, GameEvent};
use super::shot::{is_saved, AimRange, AimState, CatchThresholds, DiveChoice, ShotResult};
use super::timing::TimeContext;
use super::tween::{Easing, Tween};
use super::FrameInput;

/// Where the penalty sequence is
#[derive(Debug, Clone, PartialEq)]
pub enum ShootStage {
    Aiming,
    /// Overlay playing; no cancellation from here on
    Cinematic {
        timer: DelayTimer,
        target: Vec2,
        dive: DiveChoice,
    },
    Flying {
        ball: Tween,
        keeper: Tween,
    },
    /// Result on screen
    Feedback { timer: DelayTimer, result: ShotResult },
    Done(ShotResult),
}

/// What one frame of the shoot phase produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShootProgress {
    Running,
    /// Ball landed; feedback is showing
    Resolved(ShotResult),
    /// Feedback finished, the game can end
    Finished(ShotResult),
}

/// Ball sprite state while in flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallView {
    pub position: Vec2,
    pub angle: f64,
}

#[derive(Debug, Clone)]
pub struct ShootPhase {
    layout: PenaltyLayout,
    range: AimRange,
    thresholds: CatchThresholds,
    tuning: ShootTuning,
    aim: AimState,
    shooter: Actor,
    keeper: Actor,
    ball: Option<BallView>,
    stage: ShootStage,
    /// Host can draw the launch frame
    launch_frame_available: bool,
    handoff: ApproachHandoff,
}

impl ShootPhase {
    pub fn new(
        viewport: Viewport,
        handoff: ApproachHandoff,
        tuning: &ShootTuning,
        player_tuning: &PlayerTuning,
        formation_tuning: &FormationTuning,
        launch_frame_available: bool,
    ) -> Self {
        let layout = PenaltyLayout::new(viewport);
        let range = AimRange::from_layout(&layout);
        let thresholds = CatchThresholds::for_goal(&layout.goal, tuning);

        let mut shooter = Actor::new(
            ActorKind::Player,
            layout.shooter_start,
            Vec2::new(player_tuning.body_width, player_tuning.body_height),
            layout.shooter_speed,
            FrameCycle::new(player_tuning.run_frames.clone(), tuning.shooter_fps),
        );
        shooter.facing = handoff.facing;

        let keeper = Actor::new(
            ActorKind::Keeper(KeeperState {
                anchor: layout.keeper_start,
            }),
            layout.keeper_start,
            Vec2::new(formation_tuning.body_width, formation_tuning.body_height),
            0.0,
            FrameCycle::new(formation_tuning.keeper_frames.clone(), formation_tuning.keeper_fps),
        );

        Self {
            layout,
            range,
            thresholds,
            tuning: tuning.clone(),
            aim: AimState::new(),
            shooter,
            keeper,
            ball: None,
            stage: ShootStage::Aiming,
            launch_frame_available,
            handoff,
        }
    }

    pub fn layout(&self) -> &PenaltyLayout {
        &self.layout
    }

    pub fn thresholds(&self) -> &CatchThresholds {
        &self.thresholds
    }

    pub fn stage(&self) -> &ShootStage {
        &self.stage
    }

    pub fn shooter(&self) -> &Actor {
        &self.shooter
    }

    pub fn keeper(&self) -> &Actor {
        &self.keeper
    }

    pub fn ball(&self) -> Option<BallView> {
        self.ball
    }

    pub fn handoff(&self) -> &ApproachHandoff {
        &self.handoff
    }

    /// Current aim point, only while aiming
    pub fn aim_point(&self) -> Option<Vec2> {
        if self.aim.active {
            self.aim.last_target
        } else {
            None
        }
    }

    pub fn update<R: Rng + ?Sized>(
        &mut self,
        ctx: &TimeContext,
        input: &FrameInput,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) -> ShootProgress {
        match &mut self.stage {
            ShootStage::Aiming => {
                self.aim.advance(ctx, &self.range, self.tuning.aim_speed);
                self.move_shooter(ctx, input);
                if input.action {
                    self.commit(rng, events);
                }
                ShootProgress::Running
            }
            ShootStage::Cinematic { timer, target, dive } => {
                let (target, dive) = (*target, *dive);
                if timer.tick(ctx.delta_ms) {
                    self.launch(target, dive, events);
                }
                ShootProgress::Running
            }
            ShootStage::Flying { ball, keeper } => {
                keeper.advance(ctx);
                let landed = ball.advance(ctx);
                self.ball = Some(BallView {
                    position: ball.value(),
                    angle: ball.angle(),
                });
                self.keeper.set_position(keeper.value());
                self.keeper.angle = keeper.angle();

                if landed {
                    let result = self.resolve(events);
                    return ShootProgress::Resolved(result);
                }
                ShootProgress::Running
            }
            ShootStage::Feedback { timer, result } => {
                let result = *result;
                if timer.tick(ctx.delta_ms) {
                    self.stage = ShootStage::Done(result);
                    return ShootProgress::Finished(result);
                }
                ShootProgress::Running
            }
            ShootStage::Done(_) => ShootProgress::Running,
        }
    }

    fn move_shooter(&mut self, ctx: &TimeContext, input: &FrameInput) {
        let step = self.layout.shooter_speed * ctx.delta_ms / 1000.0;
        let position = self.shooter.position();
        if input.left {
            let x = (position.x - step).max(self.layout.shooter_min_x);
            self.shooter.set_position(Vec2::new(x, position.y));
            self.shooter.facing = Facing::Left;
        } else if input.right {
            let x = (position.x + step).min(self.layout.shooter_max_x);
            self.shooter.set_position(Vec2::new(x, position.y));
            self.shooter.facing = Facing::Right;
        }
        self.shooter.animation.ensure_playing();
        self.shooter.animation.advance(ctx);
        self.keeper.animation.advance(ctx);
    }

    fn commit<R: Rng + ?Sized>(&mut self, rng: &mut R, events: &mut Vec<GameEvent>) {
        let Some(target) = self.aim.commit(&self.range, self.tuning.aim_speed) else {
            return;
        };
        // Keeper never reads the aim
        let dive = DiveChoice::pick(rng);

        info!(target = ?target, dive = ?dive, "Shot committed");
        events.push(GameEvent::ShotCommitted { target, dive });
        events.push(GameEvent::CinematicStarted {
            duration_ms: self.tuning.cinematic_ms,
            fade_in_ms: self.tuning.cinematic_fade_in_ms,
        });

        self.stage = ShootStage::Cinematic {
            timer: DelayTimer::new(self.tuning.cinematic_ms),
            target,
            dive,
        };
    }

    fn launch(&mut self, target: Vec2, dive: DiveChoice, events: &mut Vec<GameEvent>) {
        if self.launch_frame_available {
            self.shooter.animation.hold(self.tuning.launch_frame.clone());
        } else {
            warn!(frame = %self.tuning.launch_frame, "Launch frame missing, keeping current frame");
        }

        let shooter = self.shooter.position();
        let from = Vec2::new(shooter.x, shooter.y - 10.0);
        let to = Vec2::new(target.x, target.y - 24.0);
        let ball = Tween::new(from, to, self.tuning.ball_flight_ms, Easing::CubicOut)
            .with_angle(0.0, 720.0);

        let dive_to = Vec2::new(dive.target_x(&self.layout.goal), self.layout.dive_y);
        let keeper = Tween::new(
            self.keeper.position(),
            dive_to,
            self.tuning.keeper_dive_ms,
            Easing::CubicOut,
        )
        .with_angle(self.keeper.angle, dive.angle());

        let still = self.keeper.animation.current_frame().to_string();
        self.keeper.animation.hold(still);

        events.push(GameEvent::BallLaunched {
            from,
            to,
            flight_ms: self.tuning.ball_flight_ms,
        });
        events.push(GameEvent::KeeperDived {
            dive,
            to: dive_to,
            angle: dive.angle(),
        });

        self.ball = Some(BallView { position: from, angle: 0.0 });
        self.stage = ShootStage::Flying { ball, keeper };
    }

    fn resolve(&mut self, events: &mut Vec<GameEvent>) -> ShotResult {
        let ball = self.ball.map(|view| view.position).unwrap_or_default();
        let keeper = self.keeper.position();
        let saved = is_saved(ball, keeper, &self.thresholds);
        let result = if saved { ShotResult::Saved } else { ShotResult::Goal };

        info!(?ball, ?keeper, saved, "Shot resolved");
        events.push(GameEvent::ShotResolved { saved, ball, keeper });
        events.push(GameEvent::Caption {
            text: result.caption().to_string(),
            duration_ms: self.tuning.feedback_ms,
        });

        self.ball = None;
        self.stage = ShootStage::Feedback {
            timer: DelayTimer::new(self.tuning.feedback_ms),
            result,
        };
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn phase() -> ShootPhase {
        let handoff = ApproachHandoff {
            player_position: Vec2::new(1000.0, 650.0),
            facing: Facing::Left,
            frame: "shoot1".to_string(),
            shooting_target: Vec2::new(1000.0, 650.0),
        };
        ShootPhase::new(
            Viewport::new(1000.0, 800.0),
            handoff,
            &ShootTuning::default(),
            &PlayerTuning::default(),
            &FormationTuning::default(),
            true,
        )
    }

    fn run_to_end(
        phase: &mut ShootPhase,
        rng: &mut ChaCha8Rng,
        events: &mut Vec<GameEvent>,
    ) -> Vec<ShootProgress> {
        let ctx = TimeContext::new(16.0, 0.0);
        let mut progress = Vec::new();
        for _ in 0..1000 {
            let step = phase.update(&ctx, &FrameInput::default(), rng, events);
            if step != ShootProgress::Running {
                progress.push(step);
            }
            if matches!(step, ShootProgress::Finished(_)) {
                break;
            }
        }
        progress
    }

    #[test]
    fn shooter_moves_within_bottom_edge() {
        let mut phase = phase();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();
        assert_eq!(phase.shooter().facing, Facing::Left);

        let right = FrameInput { right: true, ..Default::default() };
        for _ in 0..100 {
            phase.update(&TimeContext::new(100.0, 0.0), &right, &mut rng, &mut events);
        }
        assert_eq!(phase.shooter().position().x, phase.layout().shooter_max_x);
        assert_eq!(phase.shooter().facing, Facing::Right);
        assert!(phase.aim_point().is_some());
    }

    #[test]
    fn full_sequence_resolves_once() {
        let mut phase = phase();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut events = Vec::new();

        phase.update(&TimeContext::new(16.0, 0.0), &FrameInput::default(), &mut rng, &mut events);
        let fire = FrameInput { action: true, ..Default::default() };
        phase.update(&TimeContext::new(16.0, 0.0), &fire, &mut rng, &mut events);
        assert!(matches!(phase.stage(), ShootStage::Cinematic { .. }));
        assert_eq!(phase.aim_point(), None);

        let progress = run_to_end(&mut phase, &mut rng, &mut events);
        assert_eq!(progress.len(), 2);
        let ShootProgress::Resolved(result) = progress[0] else {
            panic!("expected resolution first, got {progress:?}");
        };
        assert_eq!(progress[1], ShootProgress::Finished(result));

        let committed = events
            .iter()
            .find_map(|event| match event {
                GameEvent::ShotCommitted { target, dive } => Some((*target, *dive)),
                _ => None,
            })
            .unwrap();
        let resolved = events
            .iter()
            .find_map(|event| match event {
                GameEvent::ShotResolved { saved, ball, keeper } => Some((*saved, *ball, *keeper)),
                _ => None,
            })
            .unwrap();

        let (target, dive) = committed;
        let (saved, ball, keeper) = resolved;
        assert_eq!(ball, Vec2::new(target.x, target.y - 24.0));
        assert_eq!(keeper, Vec2::new(dive.target_x(&phase.layout().goal), phase.layout().dive_y));
        assert_eq!(saved, result == ShotResult::Saved);
        assert_eq!(phase.shooter().animation.current_frame(), "shoot2");
        assert_eq!(phase.keeper().angle, dive.angle());
    }

    #[test]
    fn second_commit_is_ignored() {
        let mut phase = phase();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut events = Vec::new();
        let fire = FrameInput { action: true, ..Default::default() };
        phase.update(&TimeContext::new(16.0, 0.0), &fire, &mut rng, &mut events);
        phase.update(&TimeContext::new(16.0, 0.0), &fire, &mut rng, &mut events);

        let commits = events
            .iter()
            .filter(|event| matches!(event, GameEvent::ShotCommitted { .. }))
            .count();
        assert_eq!(commits, 1);
    }
}
