//! Participant finishing positions
//!
//! Collects a `[best, worst]` candidate from every decided match-up a
//! participant played and keeps the narrowest as the best range.
//!
//! Round-robin groups fall back to group order (`o`), with `G` groups of
//! `size` entries:
//!
//! ```text
//! single group, no playoff     -> [o, o]
//! several groups, no playoff   -> [(o - 1)G + 1, oG]
//! playoff, o advanced          -> ranges of the playoff match-ups
//! playoff, o eliminated        -> worst = size*G - (size - o)G, best = worst - G + 1
//! ```

use crate::error::DrawError;
use crate::models::draw::DrawDefinition;
use crate::models::link::LinkType;
use crate::models::matchup::MatchUp;
use crate::models::status::MatchUpStatus;
use crate::models::structure::ContainerStructure;
use serde::{Deserialize, Serialize};

/// Candidate placement ranges of one participant
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishingPositions {
    pub ranges: Vec<[u32; 2]>,

    /// Narrowest range, first found on ties
    pub best_range: Option<[u32; 2]>,
}

/// Placement ranges for a participant across the whole draw
pub fn finishing_positions(
    draw: &DrawDefinition,
    participant_id: &str,
) -> Result<FinishingPositions, DrawError> {
    if draw.structures.is_empty() {
        return Err(DrawError::MissingDrawDefinition);
    }
    if participant_id.is_empty() {
        return Err(DrawError::invalid("participantId is required"));
    }

    let mut ranges = Vec::new();
    let mut containers_seen: Vec<&str> = Vec::new();

    for bracket in draw.brackets() {
        for m in &bracket.match_ups {
            let Some(side) = m.side_of_participant(participant_id) else {
                continue;
            };
            if !is_decided(m) {
                continue;
            }
            match draw.container_of(&bracket.structure_id) {
                Some(container) => {
                    if containers_seen.contains(&container.structure_id.as_str()) {
                        continue;
                    }
                    containers_seen.push(&container.structure_id);
                    if let Some(range) = group_range(draw, container, participant_id) {
                        ranges.push(range);
                    }
                }
                None => {
                    if let Some(range) = m.finishing_position_range {
                        if advanced(m, side) {
                            ranges.push(range.winner);
                        } else {
                            ranges.push(range.loser);
                        }
                    }
                }
            }
        }
    }

    let best_range = best_of(&ranges);
    Ok(FinishingPositions { ranges, best_range })
}

fn is_decided(m: &MatchUp) -> bool {
    matches!(
        m.match_up_status,
        MatchUpStatus::Completed | MatchUpStatus::Bye
    ) || m.winning_side.is_some()
}

/// Participant on `side` moved on from this match-up
fn advanced(m: &MatchUp, side: u8) -> bool {
    match m.winning_side {
        Some(winner) => winner == side,
        None => m.match_up_status == MatchUpStatus::Bye,
    }
}

/// Narrowest range; the first one wins ties
fn best_of(ranges: &[[u32; 2]]) -> Option<[u32; 2]> {
    let mut best: Option<[u32; 2]> = None;
    for range in ranges {
        let width = range[1].saturating_sub(range[0]);
        match best {
            Some(current) if current[1].saturating_sub(current[0]) <= width => {}
            _ => best = Some(*range),
        }
    }
    best
}

/// Range implied by group order inside a container
fn group_range(
    draw: &DrawDefinition,
    container: &ContainerStructure,
    participant_id: &str,
) -> Option<[u32; 2]> {
    let order = container
        .position_assignments()
        .into_iter()
        .find(|a| a.participant_id.as_deref() == Some(participant_id))?
        .group_order?;
    let groups = container.structures.len() as u32;
    let size = container.group_size();
    let offset = container.finishing_position_offset;

    let playoff_positions: Vec<u32> = draw
        .links_from(&container.structure_id)
        .into_iter()
        .filter(|l| l.link_type == LinkType::Position)
        .flat_map(|l| l.source.finishing_positions.clone().unwrap_or_default())
        .collect();

    if playoff_positions.is_empty() {
        if groups == 1 {
            return Some([offset + order, offset + order]);
        }
        return Some([
            offset + order.saturating_sub(1) * groups + 1,
            offset + order * groups,
        ]);
    }

    if playoff_positions.contains(&order) {
        // placement comes from the playoff match-ups
        return None;
    }
    let worst = (size * groups).saturating_sub(size.saturating_sub(order) * groups);
    let best = worst.saturating_sub(groups) + 1;
    Some([offset + best, offset + worst])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_of_prefers_narrowest_then_first() {
        assert_eq!(best_of(&[]), None);
        assert_eq!(best_of(&[[1, 4], [3, 3], [5, 8]]), Some([3, 3]));
        assert_eq!(best_of(&[[5, 6], [1, 2]]), Some([5, 6]));
    }
}
