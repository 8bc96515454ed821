//! Active-downstream detection
//!
//! A change upstream is only safe while nothing downstream has been played
//! on the strength of it. The walk follows every winner and loser route
//! (breadth-first, visited-set keyed by match-up id) and stops at the first
//! match-up showing genuine play.

use crate::error::DrawError;
use crate::graph::targets::{downstream_edges, EdgeKind};
use crate::models::draw::DrawDefinition;
use crate::models::matchup::MatchUp;
use crate::models::status::MatchUpStatus;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Match-up shows genuine play
///
/// Either a winner decided on court (not by a produced exit), or a pairing
/// of two real participants. Placeholder pairings only count once the
/// match is under way or has a score.
pub fn is_active(m: &MatchUp) -> bool {
    if m.has_contested_winner() {
        return true;
    }
    if m.is_produced() {
        return false;
    }
    m.has_two_participants()
        || (m.resolved_side_count() == 2 && (m.match_up_status.is_active() || m.score.is_some()))
}

/// Does anything downstream of `match_up_id` already depend on genuine play?
///
/// FIRST_MATCHUP routes ending in a BYE are not followed: an untouched bye
/// slot never blocks a change upstream.
pub fn is_active_downstream(draw: &DrawDefinition, match_up_id: &str) -> Result<bool, DrawError> {
    if draw.structures.is_empty() {
        return Err(DrawError::MissingDrawDefinition);
    }
    if match_up_id.is_empty() {
        return Err(DrawError::MissingMatchUpId);
    }
    let origin = draw
        .match_up(match_up_id)
        .ok_or_else(|| DrawError::MatchUpNotFound(match_up_id.to_string()))?;

    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(origin.match_up_id.clone());
    let mut queue: VecDeque<&MatchUp> = VecDeque::from([origin]);

    while let Some(current) = queue.pop_front() {
        for edge in downstream_edges(draw, current)? {
            let Some(target) = draw.match_up(&edge.match_up_id) else {
                continue;
            };
            if edge.kind == EdgeKind::FirstMatchup
                && target.match_up_status == MatchUpStatus::Bye
            {
                continue;
            }
            if !visited.insert(target.match_up_id.clone()) {
                continue;
            }
            if is_active(target) {
                debug!(
                    origin = %match_up_id,
                    active = %target.match_up_id,
                    "downstream match-up is active"
                );
                return Ok(true);
            }
            queue.push_back(target);
        }
    }
    Ok(false)
}
