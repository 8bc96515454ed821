//! Round profiles
//!
//! Every round of an ordinary bracket carries one placement range per
//! outcome. With `c` match-ups in the round and the structure's offset
//! `off`:
//!
//! ```text
//! winner: [off + 1,     off + c]
//! loser:  [off + c + 1, off + 2c]
//! ```
//!
//! Groups inside a container have no per-round profile; their placements
//! come from group order.

use crate::models::draw::DrawDefinition;
use crate::models::matchup::FinishingPositionRange;
use crate::models::structure::{BracketStructure, Structure};

/// Placement bounds shared by every match-up of one round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundProfile {
    pub round_number: u32,
    pub match_up_count: u32,
    pub range: FinishingPositionRange,
}

impl RoundProfile {
    /// One profile per round, in round order
    pub fn for_bracket(bracket: &BracketStructure) -> Vec<RoundProfile> {
        let offset = bracket.finishing_position_offset;
        bracket
            .round_counts()
            .into_iter()
            .map(|(round_number, count)| RoundProfile {
                round_number,
                match_up_count: count,
                range: FinishingPositionRange {
                    winner: [offset + 1, offset + count],
                    loser: [offset + count + 1, offset + 2 * count],
                },
            })
            .collect()
    }
}

/// Write each round's range onto its match-ups
pub fn assign_finishing_ranges(draw: &mut DrawDefinition) {
    for structure in draw.structures.iter_mut() {
        match structure {
            Structure::Bracket(bracket) => {
                let profiles = RoundProfile::for_bracket(bracket);
                for m in bracket.match_ups.iter_mut() {
                    m.finishing_position_range = profiles
                        .iter()
                        .find(|p| p.round_number == m.round_number)
                        .map(|p| p.range);
                }
            }
            Structure::Container(container) => {
                for group in container.structures.iter_mut() {
                    for m in group.match_ups.iter_mut() {
                        m.finishing_position_range = None;
                    }
                }
            }
        }
    }
}
