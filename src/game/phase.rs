//! Top-level phase state machine: Approach → ShotSetup → Shoot → Resolve → End

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, Tuning};
use crate::util::time::MAX_FRAME_DELTA_MS;

use super::approach::{ApproachPhase, ApproachProgress};
use super::pitch::Viewport;
use super::protocol::{EndReason, GameEvent, Outcome, PhaseName, PhaseTransitionPayload};
use super::shoot::{ShootPhase, ShootProgress};
use super::shot::ShotResult;
use super::snapshot::SceneSnapshot;
use super::timing::TimeScale;
use super::FrameInput;

/// What the coordinator needs from the presentation side
pub trait PhaseHost {
    /// Draw surface size, `None` when no surface is available
    fn viewport(&self) -> Option<Viewport>;

    /// Whether a named frame can be drawn
    fn has_frame(&self, key: &str) -> bool;

    /// A phase begins; the payload is consumed once
    fn start(&mut self, phase: PhaseName, payload: Option<&PhaseTransitionPayload>);

    /// Release everything the phase owned
    fn stop(&mut self, phase: PhaseName);

    fn end(&mut self, outcome: &Outcome);
}

/// Phase setup failures. Fatal for the phase being started.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Host has no draw surface")]
    NoSurface,

    #[error("Draw surface is degenerate: {width}x{height}")]
    DegenerateSurface { width: f64, height: f64 },

    #[error("Invalid tuning: {0}")]
    Tuning(#[from] ConfigError),
}

/// Elapsed-time reading for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Milliseconds since the previous frame
    pub delta_ms: f64,
    /// Wall-clock milliseconds
    pub now_ms: f64,
}

impl Frame {
    pub fn new(delta_ms: f64, now_ms: f64) -> Self {
        Self { delta_ms, now_ms }
    }
}

enum ActivePhase {
    /// Also hosts ShotSetup while the view fades
    Approach(ApproachPhase),
    /// Also hosts Resolve while feedback shows
    Shoot(ShootPhase),
    End(Outcome),
}

/// Drives the phases and marshals payloads between them
pub struct PhaseCoordinator<H: PhaseHost, R: Rng> {
    host: H,
    tuning: Tuning,
    rng: R,
    time_scale: TimeScale,
    viewport: Viewport,
    phase: PhaseName,
    active: ActivePhase,
    frame: u64,
    last_now_ms: f64,
}

impl<H: PhaseHost, R: Rng> PhaseCoordinator<H, R> {
    /// Validate the host and tuning, then start the approach
    pub fn new(mut host: H, tuning: Tuning, mut rng: R) -> Result<Self, SetupError> {
        tuning.validate()?;
        let viewport = surface(&host)?;
        let time_scale = TimeScale::new();

        check_frames(&host, &tuning);
        let approach = build_approach(&host, viewport, &tuning, &time_scale, &mut rng);

        host.start(PhaseName::Approach, None);
        info!(width = viewport.width, height = viewport.height, "Phase coordinator started");

        Ok(Self {
            host,
            tuning,
            rng,
            time_scale,
            viewport,
            phase: PhaseName::Approach,
            active: ActivePhase::Approach(approach),
            frame: 0,
            last_now_ms: 0.0,
        })
    }

    pub fn phase(&self) -> PhaseName {
        self.phase
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match &self.active {
            ActivePhase::End(outcome) => Some(*outcome),
            ActivePhase::Approach(_) | ActivePhase::Shoot(_) => None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == PhaseName::End
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale.current()
    }

    pub fn approach(&self) -> Option<&ApproachPhase> {
        match &self.active {
            ActivePhase::Approach(approach) => Some(approach),
            _ => None,
        }
    }

    pub fn shoot(&self) -> Option<&ShootPhase> {
        match &self.active {
            ActivePhase::Shoot(shoot) => Some(shoot),
            _ => None,
        }
    }

    /// Advance one frame and return what the host should present
    pub fn update(&mut self, frame: Frame, input: &FrameInput) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.frame += 1;
        self.last_now_ms = frame.now_ms;
        let delta_ms = frame.delta_ms.clamp(0.0, MAX_FRAME_DELTA_MS);
        if delta_ms < frame.delta_ms {
            debug!(delta_ms = frame.delta_ms, "Long frame capped");
        }
        let ctx = self.time_scale.context(delta_ms, frame.now_ms);

        match &mut self.active {
            ActivePhase::Approach(approach) => match approach.update(&ctx, input, &mut events) {
                ApproachProgress::Running => {}
                ApproachProgress::ReachedSpot => {
                    self.transition(PhaseName::ShotSetup, None, &mut events);
                }
                ApproachProgress::ReadyToShoot(handoff) => {
                    let launch_frame = self.host.has_frame(&self.tuning.shoot.launch_frame);
                    let shoot = ShootPhase::new(
                        self.viewport,
                        handoff.clone(),
                        &self.tuning.shoot,
                        &self.tuning.player,
                        &self.tuning.formation,
                        launch_frame,
                    );
                    self.active = ActivePhase::Shoot(shoot);
                    let payload = PhaseTransitionPayload::Approach(handoff);
                    self.transition(PhaseName::Shoot, Some(payload), &mut events);
                }
                ApproachProgress::Lost(reason) => {
                    self.finish(Outcome::lost(reason), &mut events);
                }
            },
            ActivePhase::Shoot(shoot) => match shoot.update(
                &ctx,
                input,
                &mut self.rng,
                &mut events,
            ) {
                ShootProgress::Running => {}
                ShootProgress::Resolved(_) => {
                    self.transition(PhaseName::Resolve, None, &mut events);
                }
                ShootProgress::Finished(result) => {
                    let outcome = match result {
                        ShotResult::Goal => Outcome {
                            scored: true,
                            reason: EndReason::Scored,
                        },
                        ShotResult::Saved => Outcome::lost(EndReason::Saved),
                    };
                    self.finish(outcome, &mut events);
                }
            },
            ActivePhase::End(_) => {}
        }

        events
    }

    /// Everything the host needs to draw this frame
    pub fn snapshot(&self) -> SceneSnapshot {
        let scale = self.time_scale.current();
        match &self.active {
            ActivePhase::Approach(approach) => {
                let now_ms = self.last_now_ms;
                SceneSnapshot::from_approach(self.frame, self.phase, scale, now_ms, approach)
            }
            ActivePhase::Shoot(shoot) => {
                SceneSnapshot::from_shoot(self.frame, self.phase, scale, shoot)
            }
            ActivePhase::End(outcome) => SceneSnapshot {
                outcome: Some(*outcome),
                ..SceneSnapshot::empty(self.frame, self.phase, scale)
            },
        }
    }

    /// Throw the current run away and start a fresh approach
    pub fn restart(&mut self) -> Result<(), SetupError> {
        let viewport = surface(&self.host)?;
        self.host.stop(self.phase);

        // Dropping the old phase releases any time-scale override it held
        self.active = ActivePhase::End(Outcome::lost(EndReason::Caught));
        let approach = build_approach(
            &self.host,
            viewport,
            &self.tuning,
            &self.time_scale,
            &mut self.rng,
        );

        self.viewport = viewport;
        self.active = ActivePhase::Approach(approach);
        self.phase = PhaseName::Approach;
        self.host.start(PhaseName::Approach, None);
        info!("Restarted from approach");
        Ok(())
    }

    fn transition(
        &mut self,
        to: PhaseName,
        payload: Option<PhaseTransitionPayload>,
        events: &mut Vec<GameEvent>,
    ) {
        let from = self.phase;
        self.host.stop(from);
        self.phase = to;
        info!(?from, ?to, "Phase transition");
        events.push(GameEvent::PhaseStarted { phase: to });
        self.host.start(to, payload.as_ref());
    }

    fn finish(&mut self, outcome: Outcome, events: &mut Vec<GameEvent>) {
        let payload = PhaseTransitionPayload::Outcome {
            scored: outcome.scored,
        };
        self.active = ActivePhase::End(outcome);
        self.transition(PhaseName::End, Some(payload), events);
        events.push(GameEvent::GameEnded { outcome });
        info!(scored = outcome.scored, reason = ?outcome.reason, "Game over");
        self.host.end(&outcome);
    }
}

fn surface<H: PhaseHost>(host: &H) -> Result<Viewport, SetupError> {
    let viewport = host.viewport().ok_or(SetupError::NoSurface)?;
    if !viewport.is_usable() {
        return Err(SetupError::DegenerateSurface {
            width: viewport.width,
            height: viewport.height,
        });
    }
    Ok(viewport)
}

fn build_approach<H: PhaseHost, R: Rng>(
    host: &H,
    viewport: Viewport,
    tuning: &Tuning,
    time_scale: &TimeScale,
    rng: &mut R,
) -> ApproachPhase {
    let ready_frame = host.has_frame(&tuning.player.ready_frame);
    ApproachPhase::new(viewport, tuning, time_scale.clone(), ready_frame, rng)
}

/// Missing run-cycle frames only degrade the visuals
fn check_frames<H: PhaseHost>(host: &H, tuning: &Tuning) {
    let cycles = tuning
        .player
        .run_frames
        .iter()
        .chain(&tuning.formation.opponent_frames)
        .chain(&tuning.formation.keeper_frames);
    for key in cycles {
        if !host.has_frame(key) {
            warn!(frame = %key, "Frame missing from host catalogue");
        }
    }
}
