//! Approach phase: dribble up the field toward the shooting spot

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::Tuning;
use crate::util::time::DelayTimer;

use super::actor::ActorId;
use super::camera::CameraRig;
use super::formation::{keeper_spot, seed_formation};
use super::physics::Vec2;
use super::pitch::{FieldLayout, Viewport};
use super::player::{PlayerController, SeekProgress};
use super::protocol::{ApproachHandoff, EndReason, GameEvent};
use super::swarm::OpponentSwarm;
use super::tackle::{TackleEncounter, TackleExit};
use super::timing::{TimeContext, TimeScale};
use super::FrameInput;

/// Where the approach is
#[derive(Debug, Clone, PartialEq)]
pub enum ApproachStage {
    Playing,
    /// Lost the ball: caption on screen, then a fade
    Caught {
        reason: EndReason,
        delay: DelayTimer,
        fade: Option<DelayTimer>,
    },
    /// Locked on the spot, fading toward the shot
    Settling { fade: DelayTimer },
    Done,
}

/// Result of one approach frame
#[derive(Debug, Clone, PartialEq)]
pub enum ApproachProgress {
    Running,
    /// Player locked on the spot; the view is fading out
    ReachedSpot,
    /// Fade finished; hand over to the shoot phase
    ReadyToShoot(ApproachHandoff),
    Lost(EndReason),
}

pub struct ApproachPhase {
    field: FieldLayout,
    tuning: Tuning,
    player: PlayerController,
    swarm: OpponentSwarm,
    tackle: TackleEncounter,
    camera: CameraRig,
    stage: ApproachStage,
    ready_frame_available: bool,
}

impl ApproachPhase {
    pub fn new<R: Rng + ?Sized>(
        viewport: Viewport,
        tuning: &Tuning,
        time_scale: TimeScale,
        ready_frame_available: bool,
        rng: &mut R,
    ) -> Self {
        let field = FieldLayout::new(viewport, tuning.approach.target_offset);

        let start = Vec2::new(
            field.world_width / 2.0,
            field.world_height - tuning.player.bottom_offset,
        );
        let tolerance = tuning.approach.arrival_tolerance;
        let player = PlayerController::new(start, &tuning.player, tolerance);

        let slots = seed_formation(&tuning.formation, &field, rng);
        let swarm = OpponentSwarm::from_formation(&slots, keeper_spot(&field), &tuning.formation);

        let camera =
            CameraRig::new(viewport, field.world_width, field.world_height, &tuning.camera);
        let tackle = TackleEncounter::new(tuning.tackle.clone(), time_scale, field.center_x);

        info!(target = ?field.shooting_target, "Approach set up");

        Self {
            field,
            tuning: tuning.clone(),
            player,
            swarm,
            tackle,
            camera,
            stage: ApproachStage::Playing,
            ready_frame_available,
        }
    }

    pub fn field(&self) -> &FieldLayout {
        &self.field
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn swarm(&self) -> &OpponentSwarm {
        &self.swarm
    }

    pub fn tackle(&self) -> &TackleEncounter {
        &self.tackle
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn stage(&self) -> &ApproachStage {
        &self.stage
    }

    pub fn update(
        &mut self,
        ctx: &TimeContext,
        input: &FrameInput,
        events: &mut Vec<GameEvent>,
    ) -> ApproachProgress {
        match &mut self.stage {
            ApproachStage::Playing => self.play(ctx, input, events),
            ApproachStage::Caught { reason, delay, fade } => {
                let reason = *reason;
                if !delay.tick(ctx.delta_ms) {
                    return ApproachProgress::Running;
                }
                match fade {
                    None => {
                        events.push(GameEvent::FadeOut {
                            duration_ms: self.tuning.approach.fade_ms,
                        });
                        *fade = Some(DelayTimer::new(self.tuning.approach.fade_ms));
                        ApproachProgress::Running
                    }
                    Some(timer) => {
                        if timer.tick(ctx.delta_ms) {
                            self.stage = ApproachStage::Done;
                            return ApproachProgress::Lost(reason);
                        }
                        ApproachProgress::Running
                    }
                }
            }
            ApproachStage::Settling { fade } => {
                if fade.tick(ctx.delta_ms) {
                    self.stage = ApproachStage::Done;
                    return ApproachProgress::ReadyToShoot(self.handoff());
                }
                ApproachProgress::Running
            }
            ApproachStage::Done => ApproachProgress::Running,
        }
    }

    /// Steady-state frame: player, swarm, tackle, camera, then exit checks
    fn play(
        &mut self,
        ctx: &TimeContext,
        input: &FrameInput,
        events: &mut Vec<GameEvent>,
    ) -> ApproachProgress {
        let target = self.field.shooting_target;
        let arrived = self.player.update(ctx, input) == SeekProgress::Arrived;

        if !arrived && !self.tackle.is_active() {
            let distance = (target.y - self.player.position().y).abs();
            if !self.player.is_seeking() && !self.player.is_locked() {
                if distance <= self.player.bottom_offset() {
                    self.player.set_target(target);
                } else {
                    let anchor = self
                        .camera
                        .relative_anchor(self.field.viewport.height, self.player.bottom_offset());
                    self.player.pin_to_anchor(anchor);
                }
            }
            if self.player.is_seeking() && distance < self.tuning.approach.close_range {
                self.swarm.stand_down();
            }
        }
        let (min_x, max_x) = self.field.player_x_bounds(self.tuning.approach.sideline_margin);
        self.player.clamp_x(min_x, max_x);

        self.swarm
            .tick(self.player.position(), self.player.is_locked(), ctx);

        // No new encounter on the frame the player lands on the spot
        let tackle_exit = if arrived {
            None
        } else {
            self.tackle.update(
                ctx.now_ms,
                input.action,
                &mut self.player,
                &mut self.swarm,
                events,
            )
        };
        if let Some(TackleExit::TimedOut { opponent }) = tackle_exit {
            self.begin_caught(EndReason::TackledOut, Some(opponent), events);
            return ApproachProgress::Running;
        }

        self.camera
            .update(ctx, self.player.position().x, self.tackle.is_active());
        if input.toggle_zoom {
            let zoom = self.camera.toggle_zoom();
            events.push(GameEvent::ZoomChanged { zoom });
        }

        if !self.tackle.is_active() {
            if let Some(opponent) = self
                .swarm
                .check_collision(self.player.actor(), self.tuning.approach.feet_fraction)
            {
                self.begin_caught(EndReason::Caught, Some(opponent), events);
                return ApproachProgress::Running;
            }
        }

        if arrived {
            self.settle_on_spot(events);
            return ApproachProgress::ReachedSpot;
        }
        ApproachProgress::Running
    }

    /// Park the camera, snap onto the spot, lock the player and start the fade
    pub fn settle_on_spot(&mut self, events: &mut Vec<GameEvent>) {
        if self.stage != ApproachStage::Playing {
            return;
        }
        let target = self.field.shooting_target;

        self.camera.lock_at(target, self.tuning.approach.park_framing);
        self.player.snap_to(target);

        let ready = if self.ready_frame_available {
            Some(self.tuning.player.ready_frame.as_str())
        } else {
            warn!(
                frame = %self.tuning.player.ready_frame,
                "Ready frame missing, holding run frame"
            );
            None
        };
        self.player.lock_for_shot(ready);
        self.swarm.tick(self.player.position(), true, &TimeContext::new(0.0, 0.0));

        info!(target = ?target, "Player reached shooting spot");
        events.push(GameEvent::ReachedShootingSpot { target });
        events.push(GameEvent::FadeOut {
            duration_ms: self.tuning.approach.fade_ms,
        });
        self.stage = ApproachStage::Settling {
            fade: DelayTimer::new(self.tuning.approach.fade_ms),
        };
    }

    fn begin_caught(
        &mut self,
        reason: EndReason,
        opponent: Option<ActorId>,
        events: &mut Vec<GameEvent>,
    ) {
        self.swarm.freeze();
        self.player.freeze();

        let caption = match reason {
            EndReason::TackledOut => "TACKLED!",
            _ => "CAUGHT!",
        };
        info!(?reason, opponent_id = ?opponent, "Player lost the ball");

        events.push(GameEvent::PlayerCaught {
            opponent_id: opponent,
            reason,
        });
        events.push(GameEvent::Flash {
            duration_ms: self.tuning.approach.flash_ms,
        });
        events.push(GameEvent::Caption {
            text: caption.to_string(),
            duration_ms: self.tuning.approach.caught_delay_ms,
        });

        self.stage = ApproachStage::Caught {
            reason,
            delay: DelayTimer::new(self.tuning.approach.caught_delay_ms),
            fade: None,
        };
    }

    /// Payload for the shoot phase, built from the locked player
    pub fn handoff(&self) -> ApproachHandoff {
        let actor = self.player.actor();
        debug!(position = ?actor.position(), "Building approach handoff");
        ApproachHandoff {
            player_position: actor.position(),
            facing: actor.facing,
            frame: actor.animation.current_frame().to_string(),
            shooting_target: self.field.shooting_target,
        }
    }
}
