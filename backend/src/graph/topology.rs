//! Bracket topology
//!
//! Implicit progression inside one bracket and the slot layout of link
//! targets.
//!
//! Inside a bracket, winners move to the next round without any link:
//!
//! ```text
//! halving round (c -> c/2):  position p -> position ceil(p/2), side 1 if p odd else 2
//! feed round    (c -> c):    position p -> position p, the target's non-fixed side
//! ```
//!
//! A link target round exposes its *fed slots*: the fixed sides of its
//! match-ups, ordered by round position then side number. Source round
//! positions map onto that list top-down or bottom-up.

use crate::error::DrawError;
use crate::models::link::FeedProfile;
use crate::models::matchup::MatchUp;
use crate::models::structure::BracketStructure;
use std::collections::BTreeSet;

/// One fixed side in a link target round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FedSlot {
    pub match_up_id: String,
    pub round_position: u32,
    pub side_number: u8,
    pub draw_position: u32,
}

/// Where a winner moves inside its own bracket: `(round, position, side)`
pub fn next_in_bracket(bracket: &BracketStructure, m: &MatchUp) -> Option<(u32, u32, u8)> {
    let counts = bracket.round_counts();
    let current = *counts.get(&m.round_number)?;
    let next_round = m.round_number + 1;
    let next = *counts.get(&next_round)?;

    if next * 2 == current {
        let position = m.round_position.div_ceil(2);
        let side = if m.round_position % 2 == 1 { 1 } else { 2 };
        Some((next_round, position, side))
    } else if next == current {
        let target = bracket.match_up_at(next_round, m.round_position)?;
        let side = target.sides.iter().find(|s| !s.fixed)?.side_number;
        Some((next_round, m.round_position, side))
    } else {
        None
    }
}

/// Match-up whose winner fills a non-fixed side
pub fn feeder_in_bracket<'a>(
    bracket: &'a BracketStructure,
    m: &MatchUp,
    side_number: u8,
) -> Option<&'a MatchUp> {
    if m.round_number <= 1 {
        return None;
    }
    let side = m.side(side_number)?;
    if side.fixed {
        return None;
    }
    let counts = bracket.round_counts();
    let current = *counts.get(&m.round_number)?;
    let prev_round = m.round_number - 1;
    let previous = *counts.get(&prev_round)?;

    if previous == current * 2 {
        let position = m
            .round_position
            .checked_mul(2)?
            .checked_add(side_number as u32)?
            .checked_sub(2)?;
        bracket.match_up_at(prev_round, position)
    } else if previous == current {
        bracket.match_up_at(prev_round, m.round_position)
    } else {
        None
    }
}

/// Fixed sides of a round in feed order
pub fn fed_slots(bracket: &BracketStructure, round_number: u32) -> Vec<FedSlot> {
    bracket
        .round_match_ups(round_number)
        .into_iter()
        .flat_map(|m| {
            m.fixed_sides().filter_map(move |side| {
                side.draw_position.map(|draw_position| FedSlot {
                    match_up_id: m.match_up_id.clone(),
                    round_position: m.round_position,
                    side_number: side.side_number,
                    draw_position,
                })
            })
        })
        .collect()
}

/// Index into the fed-slot list for a 1-based source position
pub fn slot_index(
    profile: FeedProfile,
    source_position: u32,
    slot_count: usize,
) -> Result<usize, DrawError> {
    let position = source_position as usize;
    if position == 0 || position > slot_count {
        return Err(DrawError::invalid(format!(
            "no fed slot for source position {} (target round has {} slots)",
            source_position, slot_count
        )));
    }
    Ok(match profile {
        FeedProfile::TopDown => position - 1,
        FeedProfile::BottomUp => slot_count - position,
    })
}

/// Inverse of [`slot_index`]: the 1-based source position for a slot
pub fn source_position(profile: FeedProfile, index: usize, slot_count: usize) -> u32 {
    match profile {
        FeedProfile::TopDown => (index + 1) as u32,
        FeedProfile::BottomUp => (slot_count - index) as u32,
    }
}

/// Round positions of the first-round match-ups that feed `m`
///
/// A first-round match-up is one with only fixed sides.
pub fn first_round_ancestors(bracket: &BracketStructure, m: &MatchUp) -> BTreeSet<u32> {
    let mut positions = BTreeSet::new();
    let mut stack = vec![m];
    while let Some(current) = stack.pop() {
        if current.sides.iter().all(|s| s.fixed) {
            positions.insert(current.round_position);
            continue;
        }
        for side in [1u8, 2] {
            if let Some(feeder) = feeder_in_bracket(bracket, current, side) {
                stack.push(feeder);
            }
        }
    }
    positions
}

/// First match-up a draw position appears in (lowest round, fixed side)
pub fn first_match_up_of<'a>(
    bracket: &'a BracketStructure,
    draw_position: u32,
) -> Option<&'a MatchUp> {
    bracket
        .match_ups
        .iter()
        .filter(|m| {
            m.fixed_sides()
                .any(|s| s.draw_position == Some(draw_position))
        })
        .min_by_key(|m| m.round_number)
}
