//! Slot feeds
//!
//! What a match-up hands downstream: the occupant that moves to its winner
//! target and the occupant that moves to its loser target. Feeds are pure
//! functions of the match-up's current sides and status, so recomputing
//! them after any edit always yields the same downstream state no matter in
//! which order results were entered.

use crate::models::matchup::{MatchUp, SideBinding};
use crate::models::outcome::PropagationOptions;
use crate::models::status::{ExitKind, MatchUpStatus};

/// Occupant delivered into one downstream slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotFeed {
    pub binding: SideBinding,

    /// Draw position travelling with the occupant (advancement inside a bracket)
    pub draw_position: Option<u32>,

    /// Status of the match-up that produced this feed
    pub source_status: Option<MatchUpStatus>,
}

impl SlotFeed {
    pub fn unresolved() -> Self {
        Self {
            binding: SideBinding::Unresolved,
            draw_position: None,
            source_status: None,
        }
    }

    pub fn bye() -> Self {
        Self {
            binding: SideBinding::Bye,
            draw_position: None,
            source_status: None,
        }
    }

    pub fn exited(exit_kind: ExitKind) -> Self {
        Self {
            binding: SideBinding::Exited { exit_kind },
            draw_position: None,
            source_status: None,
        }
    }

    fn from_side(m: &MatchUp, side_number: u8) -> Self {
        match m.side(side_number) {
            Some(side) => Self {
                binding: side.binding.clone(),
                draw_position: side.draw_position,
                source_status: None,
            },
            None => Self::unresolved(),
        }
    }

    fn with_source(mut self, status: MatchUpStatus) -> Self {
        self.source_status = Some(status);
        self
    }

    /// Feed identity without the source status
    pub fn signature(&self) -> (SideBinding, Option<u32>) {
        (self.binding.clone(), self.draw_position)
    }
}

fn other_side(side_number: u8) -> u8 {
    if side_number == 1 {
        2
    } else {
        1
    }
}

/// Occupant that advances to the winner target
pub fn winner_feed(m: &MatchUp, options: &PropagationOptions) -> SlotFeed {
    let status = m.match_up_status;
    let feed = match status {
        MatchUpStatus::DoubleWalkover | MatchUpStatus::DoubleDefault => {
            SlotFeed::exited(status.exit_kind().unwrap_or(ExitKind::Walkover))
        }
        MatchUpStatus::Completed
        | MatchUpStatus::Retired
        | MatchUpStatus::Walkover
        | MatchUpStatus::Defaulted => match m.winning_side {
            Some(w) => SlotFeed::from_side(m, w),
            None => produced_exit_without_winner(m, options),
        },
        MatchUpStatus::Bye => {
            let byes = m.sides.iter().filter(|s| s.binding.is_bye()).count();
            if byes == 2 {
                SlotFeed::bye()
            } else {
                match m.sides.iter().find(|s| !s.binding.is_bye()) {
                    Some(side) if side.binding.is_resolved() => SlotFeed::from_side(m, side.side_number),
                    _ => SlotFeed::unresolved(),
                }
            }
        }
        _ => SlotFeed::unresolved(),
    };
    feed.with_source(status)
}

/// A single exit with no winning side: one slot exited, the other is still open
fn produced_exit_without_winner(m: &MatchUp, options: &PropagationOptions) -> SlotFeed {
    let exit_kind = m
        .sides
        .iter()
        .find_map(|s| s.binding.exit_kind())
        .or_else(|| m.match_up_status.exit_kind())
        .unwrap_or(ExitKind::Walkover);
    let open_side = m.sides.iter().find(|s| s.binding.exit_kind().is_none());
    match open_side {
        Some(side) if side.binding.is_bye() => {
            if options.double_exit_propagates_bye {
                SlotFeed::bye()
            } else {
                SlotFeed::exited(exit_kind)
            }
        }
        _ => SlotFeed::unresolved(),
    }
}

/// Occupant that moves to the loser target
pub fn loser_feed(m: &MatchUp) -> SlotFeed {
    let status = m.match_up_status;
    let feed = match status {
        MatchUpStatus::Completed | MatchUpStatus::Retired => match m.winning_side {
            Some(w) => SlotFeed::from_side(m, other_side(w)),
            None => SlotFeed::unresolved(),
        },
        MatchUpStatus::Walkover | MatchUpStatus::Defaulted => match m.winning_side {
            Some(_) => SlotFeed::exited(status.exit_kind().unwrap_or(ExitKind::Walkover)),
            None => SlotFeed::unresolved(),
        },
        MatchUpStatus::DoubleWalkover | MatchUpStatus::DoubleDefault => {
            SlotFeed::exited(status.exit_kind().unwrap_or(ExitKind::Walkover))
        }
        MatchUpStatus::Bye => SlotFeed::bye(),
        _ => SlotFeed::unresolved(),
    };
    feed.with_source(status)
}
