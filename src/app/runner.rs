//! Frame loop for a headless session

use std::time::Duration;

use rand::Rng;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::game::{Frame, GameEvent, Outcome, PhaseCoordinator, PhaseHost, SnapshotBuilder};
use crate::util::time::{frame_delta_ms, Stopwatch};

use super::autopilot::Autopilot;

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionReport {
    pub frames: u64,
    /// `None` when the frame cap stopped the session first
    pub outcome: Option<Outcome>,
}

/// One game driven frame by frame by the autopilot
pub struct Session<H: PhaseHost, R: Rng> {
    coordinator: PhaseCoordinator<H, R>,
    autopilot: Autopilot,
    snapshots: SnapshotBuilder,
    frame_rate: u32,
    max_frames: Option<u64>,
}

impl<H: PhaseHost, R: Rng> Session<H, R> {
    pub fn new(coordinator: PhaseCoordinator<H, R>, autopilot: Autopilot, frame_rate: u32) -> Self {
        Self {
            coordinator,
            autopilot,
            snapshots: SnapshotBuilder::new(30),
            frame_rate: frame_rate.max(1),
            max_frames: None,
        }
    }

    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn with_snapshot_every(mut self, frames: u32) -> Self {
        self.snapshots = SnapshotBuilder::new(frames);
        self
    }

    pub fn coordinator(&self) -> &PhaseCoordinator<H, R> {
        &self.coordinator
    }

    /// Run one frame: autopilot input, simulation, logging
    pub fn step(&mut self, frame: Frame) -> Vec<GameEvent> {
        let input = self.autopilot.next_input(&self.coordinator.snapshot());
        let events = self.coordinator.update(frame, &input);

        for event in &events {
            if let GameEvent::PhaseStarted { .. } = event {
                self.snapshots.force_next();
            }
            debug!(?event, "Game event");
        }

        if self.snapshots.should_send() {
            match serde_json::to_string(&self.coordinator.snapshot()) {
                Ok(json) => debug!(snapshot = %json, "Scene snapshot"),
                Err(e) => warn!(error = %e, "Failed to serialize snapshot"),
            }
        }
        events
    }

    /// Drive a fixed-step session until the game ends or the frame cap is hit
    pub fn run_fixed(&mut self, delta_ms: f64) -> SessionReport {
        let mut now_ms = 0.0;
        while !self.finished() {
            now_ms += delta_ms;
            self.step(Frame::new(delta_ms, now_ms));
        }
        self.report()
    }

    /// Drive the session in real time on a tokio interval
    pub async fn run(mut self) -> SessionReport {
        info!(frame_rate = self.frame_rate, "Session started");

        let frame_duration = Duration::from_secs_f64(frame_delta_ms(self.frame_rate) / 1000.0);
        let mut frame_interval = interval(frame_duration);
        frame_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let clock = Stopwatch::new();
        let mut last_ms = clock.now_ms();

        while !self.finished() {
            frame_interval.tick().await;

            let now_ms = clock.now_ms();
            let delta_ms = now_ms - last_ms;
            last_ms = now_ms;
            self.step(Frame::new(delta_ms, now_ms));
        }

        let report = self.report();
        info!(frames = report.frames, outcome = ?report.outcome, "Session finished");
        report
    }

    fn finished(&self) -> bool {
        if self.coordinator.is_over() {
            return true;
        }
        self.max_frames
            .is_some_and(|max| self.coordinator.frame_count() >= max)
    }

    fn report(&self) -> SessionReport {
        SessionReport {
            frames: self.coordinator.frame_count(),
            outcome: self.coordinator.outcome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::host::{frame_catalogue, HeadlessHost};
    use crate::config::Tuning;
    use crate::game::{PhaseName, Viewport};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn session(seed: u64, tuning: Tuning) -> Session<HeadlessHost, ChaCha8Rng> {
        let host = HeadlessHost::new(Some(Viewport::new(1000.0, 800.0)), frame_catalogue(&tuning));
        let rng = ChaCha8Rng::seed_from_u64(seed);
        let coordinator = PhaseCoordinator::new(host, tuning, rng).unwrap();
        Session::new(coordinator, Autopilot::default(), 60)
    }

    #[test]
    fn fixed_session_reaches_an_outcome() {
        let mut session = session(7, Tuning::default()).with_max_frames(Some(20_000));
        let report = session.run_fixed(16.0);

        let outcome = report.outcome.expect("game should end well before the frame cap");
        assert_eq!(session.coordinator().phase(), PhaseName::End);
        assert_eq!(session.coordinator().host().outcome(), Some(outcome));
        assert_eq!(session.coordinator().host().history().first(), Some(&PhaseName::Approach));
        assert_eq!(session.coordinator().host().history().last(), Some(&PhaseName::End));
    }

    #[test]
    fn empty_pitch_always_gets_a_shot() {
        let mut tuning = Tuning::default();
        tuning.formation.defenders = 0;
        tuning.formation.midfielders = 0;
        tuning.formation.attackers = 0;
        let mut session = session(11, tuning);
        let report = session.run_fixed(16.0);

        assert!(report.outcome.is_some());
        assert_eq!(
            session.coordinator().host().history(),
            &[
                PhaseName::Approach,
                PhaseName::ShotSetup,
                PhaseName::Shoot,
                PhaseName::Resolve,
                PhaseName::End
            ]
        );
    }

    #[test]
    fn async_run_honours_frame_cap() {
        let session = session(3, Tuning::default()).with_max_frames(Some(5));
        let report = tokio_test::block_on(session.with_snapshot_every(1).run());
        assert_eq!(report.frames, 5);
        assert_eq!(report.outcome, None);
    }
}
