//! Headless presentation host: a fixed surface plus a frame catalogue

use std::collections::HashSet;

use tracing::{debug, info};

use crate::config::{Config, Tuning};
use crate::game::{Outcome, PhaseHost, PhaseName, PhaseTransitionPayload, Viewport};

/// Host without a renderer. Records lifecycle calls and answers frame lookups
/// from the catalogue it was built with.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    viewport: Option<Viewport>,
    frames: HashSet<String>,
    active: Option<PhaseName>,
    history: Vec<PhaseName>,
    outcome: Option<Outcome>,
}

impl HeadlessHost {
    pub fn new(viewport: Option<Viewport>, frames: impl IntoIterator<Item = String>) -> Self {
        Self {
            viewport,
            frames: frames.into_iter().collect(),
            active: None,
            history: Vec::new(),
            outcome: None,
        }
    }

    /// Surface from the config, catalogue holding every frame the tuning names
    pub fn from_config(config: &Config, tuning: &Tuning) -> Self {
        let viewport = Viewport::new(config.viewport_width, config.viewport_height);
        Self::new(Some(viewport), frame_catalogue(tuning))
    }

    pub fn without_frame(mut self, key: &str) -> Self {
        self.frames.remove(key);
        self
    }

    pub fn active(&self) -> Option<PhaseName> {
        self.active
    }

    /// Every phase started, in order
    pub fn history(&self) -> &[PhaseName] {
        &self.history
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }
}

impl PhaseHost for HeadlessHost {
    fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn has_frame(&self, key: &str) -> bool {
        self.frames.contains(key)
    }

    fn start(&mut self, phase: PhaseName, payload: Option<&PhaseTransitionPayload>) {
        match payload {
            Some(payload) => info!(?phase, ?payload, "Host starting phase"),
            None => info!(?phase, "Host starting phase"),
        }
        self.active = Some(phase);
        self.history.push(phase);
    }

    fn stop(&mut self, phase: PhaseName) {
        debug!(?phase, "Host stopping phase");
        if self.active == Some(phase) {
            self.active = None;
        }
    }

    fn end(&mut self, outcome: &Outcome) {
        info!(scored = outcome.scored, caption = outcome.caption(), "Host showing result");
        self.outcome = Some(*outcome);
    }
}

/// All frame keys the tuning refers to, plus the ball
pub fn frame_catalogue(tuning: &Tuning) -> Vec<String> {
    let mut frames: Vec<String> = tuning
        .player
        .run_frames
        .iter()
        .chain(&tuning.formation.opponent_frames)
        .chain(&tuning.formation.keeper_frames)
        .cloned()
        .collect();
    frames.push(tuning.player.ready_frame.clone());
    frames.push(tuning.shoot.launch_frame.clone());
    frames.push("ball".to_string());
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_covers_tuning_frames() {
        let tuning = Tuning::default();
        let host = HeadlessHost::new(Some(Viewport::new(1000.0, 800.0)), frame_catalogue(&tuning));
        assert!(host.has_frame(&tuning.player.ready_frame));
        assert!(host.has_frame(&tuning.shoot.launch_frame));
        assert!(host.has_frame("ball"));

        let host = host.without_frame(&tuning.shoot.launch_frame);
        assert!(!host.has_frame(&tuning.shoot.launch_frame));
    }

    #[test]
    fn tracks_active_phase() {
        let mut host = HeadlessHost::new(Some(Viewport::new(1000.0, 800.0)), Vec::new());
        host.start(PhaseName::Approach, None);
        assert_eq!(host.active(), Some(PhaseName::Approach));
        host.stop(PhaseName::Approach);
        assert_eq!(host.active(), None);
        host.start(PhaseName::ShotSetup, None);
        assert_eq!(host.history(), &[PhaseName::Approach, PhaseName::ShotSetup]);
    }
}
