//! Scripted input for headless sessions

use crate::game::snapshot::{SpriteKind, SpriteView};
use crate::game::{FrameInput, PhaseName, SceneSnapshot};

/// Plays the game from snapshots alone: sidesteps defenders on the run-up,
/// presses action a few frames into each tackle countdown and shoots when the
/// aim swings wide of the keeper.
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Frames between a countdown appearing and the escape press
    reaction_frames: u32,
    /// Defenders ahead and closer than this are avoided
    avoid_radius: f64,
    /// Fraction of the widest aim offset seen that triggers the shot
    commit_ratio: f64,
    /// Minimum frames of aiming before shooting
    min_aim_frames: u32,

    countdown_frames: u32,
    aim_frames: u32,
    widest_aim: f64,
    committed: bool,
}

impl Autopilot {
    pub fn new(reaction_frames: u32) -> Self {
        Self {
            reaction_frames,
            avoid_radius: 260.0,
            commit_ratio: 0.9,
            min_aim_frames: 60,
            countdown_frames: 0,
            aim_frames: 0,
            widest_aim: 0.0,
            committed: false,
        }
    }

    /// Input for the next frame given the latest scene
    pub fn next_input(&mut self, snapshot: &SceneSnapshot) -> FrameInput {
        match snapshot.phase {
            PhaseName::Approach => self.approach_input(snapshot),
            PhaseName::Shoot => self.shoot_input(snapshot),
            PhaseName::ShotSetup | PhaseName::Resolve | PhaseName::End => FrameInput::default(),
        }
    }

    fn approach_input(&mut self, snapshot: &SceneSnapshot) -> FrameInput {
        let mut input = FrameInput::default();

        if snapshot.countdown.is_some() {
            self.countdown_frames += 1;
            input.action = self.countdown_frames == self.reaction_frames.max(1);
            return input;
        }
        self.countdown_frames = 0;

        let Some(player) = find(snapshot, SpriteKind::Player) else {
            return input;
        };

        let threat = snapshot
            .sprites
            .iter()
            .filter(|s| s.kind == SpriteKind::Defender && s.y < player.y)
            .map(|s| (s, distance(s, player)))
            .filter(|(_, d)| *d < self.avoid_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((defender, _)) = threat {
            if defender.x >= player.x {
                input.left = true;
            } else {
                input.right = true;
            }
        }
        input
    }

    fn shoot_input(&mut self, snapshot: &SceneSnapshot) -> FrameInput {
        let mut input = FrameInput::default();
        if self.committed {
            return input;
        }
        let keeper = find(snapshot, SpriteKind::Keeper);
        let (Some(aim), Some(keeper)) = (snapshot.aim_point, keeper) else {
            return input;
        };

        self.aim_frames += 1;
        let offset = (aim.x - keeper.x).abs();
        self.widest_aim = self.widest_aim.max(offset);

        if self.aim_frames >= self.min_aim_frames && offset >= self.widest_aim * self.commit_ratio {
            self.committed = true;
            input.action = true;
        }
        input
    }
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(10)
    }
}

fn find(snapshot: &SceneSnapshot, kind: SpriteKind) -> Option<&SpriteView> {
    snapshot.sprites.iter().find(|s| s.kind == kind)
}

fn distance(a: &SpriteView, b: &SpriteView) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
