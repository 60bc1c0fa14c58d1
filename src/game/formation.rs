//! One-time formation seeding for the opponent swarm

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::tuning::FormationTuning;

use super::physics::Vec2;
use super::pitch::FieldLayout;

/// Line a defender is seeded into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationRole {
    /// Closest to the player's starting end
    Attacker,
    Midfielder,
    /// Deepest line, nearest the goal
    Defender,
}

impl FormationRole {
    fn prefix(self) -> char {
        match self {
            FormationRole::Attacker => 'A',
            FormationRole::Midfielder => 'M',
            FormationRole::Defender => 'D',
        }
    }
}

/// A seeded unit position
#[derive(Debug, Clone, PartialEq)]
pub struct FormationSlot {
    pub role: FormationRole,
    pub label: String,
    pub position: Vec2,
}

/// Band geometry for one line
#[derive(Debug, Clone, Copy)]
struct Band {
    role: FormationRole,
    count: usize,
    /// Band centre, measured upward from the world bottom
    offset_from_bottom: f64,
    /// Full vertical jitter range
    spread: f64,
}

/// Seed attackers, midfielders and defenders in banded rows.
///
/// Bands are fixed fractions of world height; jitter is bounded so a unit
/// can never cross into a neighbouring band.
pub fn seed_formation<R: Rng + ?Sized>(
    tuning: &FormationTuning,
    field: &FieldLayout,
    rng: &mut R,
) -> Vec<FormationSlot> {
    let world_height = field.world_height;
    let world_width = field.world_width;
    let pad = (world_width * tuning.padding_fraction).floor();
    let usable = world_height - pad;

    let attack_offset = usable / 3.0;
    let midfield_offset = usable / 2.0;
    let defence_offset = usable * 3.0 / 4.0;

    let attack_gap = midfield_offset - attack_offset;
    let defence_gap = defence_offset - midfield_offset;

    let bands = [
        Band {
            role: FormationRole::Attacker,
            count: tuning.attackers,
            offset_from_bottom: attack_offset,
            spread: tuning.attackers_band_spread.min(attack_gap * 0.45 * 2.0),
        },
        Band {
            role: FormationRole::Midfielder,
            count: tuning.midfielders,
            offset_from_bottom: midfield_offset,
            spread: (world_width / 4.0).min(attack_gap.min(defence_gap) * 0.45 * 2.0),
        },
        Band {
            role: FormationRole::Defender,
            count: tuning.defenders,
            offset_from_bottom: defence_offset,
            spread: (world_width / 4.0).min(defence_gap * 0.45 * 2.0),
        },
    ];

    let left_bound = pad + 40.0;
    let right_bound = world_width - pad - 40.0;
    let center_x = world_width / 2.0;
    let pair_half_spacing = (world_width / 4.0 / 2.0).round();

    let mut slots = Vec::new();
    for band in bands {
        if band.count == 0 {
            continue;
        }

        let paired = band.count == 2;
        if !paired && band.count > 1 && right_bound <= left_bound {
            warn!(
                role = ?band.role,
                left_bound,
                right_bound,
                "Skipping formation row with no playable width"
            );
            continue;
        }

        let half_spread = (band.spread / 2.0).round().max(0.0);
        for index in 0..band.count {
            let x = if paired {
                let offset = if index == 0 { -pair_half_spacing } else { pair_half_spacing };
                let jitter = (tuning.jitter_x / 3.0).round();
                center_x + offset + jitter_between(rng, jitter)
            } else {
                line_x(band.count, index, left_bound, right_bound)
                    + jitter_between(rng, tuning.jitter_x.round())
            };
            let y = world_height - band.offset_from_bottom + jitter_between(rng, half_spread);

            slots.push(FormationSlot {
                role: band.role,
                label: format!("{}{}", band.role.prefix(), index + 1),
                position: Vec2::new(x, y),
            });
        }
    }

    slots
}

/// Keeper spot just below the top goal line
pub fn keeper_spot(field: &FieldLayout) -> Vec2 {
    Vec2::new(field.center_x, field.goal_line_top_y + 8.0)
}

/// Evenly distribute `count` units across `[left, right]`
fn line_x(count: usize, index: usize, left: f64, right: f64) -> f64 {
    if count <= 1 {
        return ((left + right) / 2.0).round();
    }
    let step = (right - left) / (count - 1) as f64;
    (left + index as f64 * step).round()
}

/// Integer jitter in `[-range, range]`
fn jitter_between<R: Rng + ?Sized>(rng: &mut R, range: f64) -> f64 {
    let range = range.max(0.0) as i64;
    rng.gen_range(-range..=range) as f64
}
