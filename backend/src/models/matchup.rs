//! MatchUp model
//!
//! A single contest inside a structure. Each match-up has two sides; a side
//! is either *fixed* (its draw position was placed when the draw was
//! created) or *advanced* (filled by propagation from the previous round or
//! from a link).
//!
//! Only the propagation engine mutates sides, status, winning side and the
//! status-code stack after creation. The stack records, per exited side,
//! the status the match-up held before propagation overwrote it, so a
//! produced exit can always be told apart from a locally entered one and
//! unwound on reversal.

use crate::models::status::{ExitKind, MatchUpStatus};
use serde::{Deserialize, Serialize};

/// What currently occupies one side of a match-up
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SideBinding {
    /// Nothing has been decided upstream yet
    #[default]
    Unresolved,

    /// A draw position is known but no participant is bound to it
    /// (empty assignment or qualifier placeholder)
    Placeholder,

    /// A real participant
    Participant {
        #[serde(rename = "participantId")]
        participant_id: String,
    },

    /// A bye
    Bye,

    /// The slot exited upstream (walkover/default with no one advancing)
    Exited {
        #[serde(rename = "exitKind")]
        exit_kind: ExitKind,
    },
}

impl SideBinding {
    /// Side holds a draw position that can contest (participant or placeholder)
    pub fn is_resolved(&self) -> bool {
        matches!(
            self,
            SideBinding::Participant { .. } | SideBinding::Placeholder
        )
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, SideBinding::Bye)
    }

    /// Exit kind if this side exited upstream
    pub fn exit_kind(&self) -> Option<ExitKind> {
        match self {
            SideBinding::Exited { exit_kind } => Some(*exit_kind),
            _ => None,
        }
    }

    pub fn participant_id(&self) -> Option<&str> {
        match self {
            SideBinding::Participant { participant_id } => Some(participant_id),
            _ => None,
        }
    }
}

/// One side of a match-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Side {
    /// 1 or 2
    pub side_number: u8,

    /// Draw position currently occupying this side
    pub draw_position: Option<u32>,

    /// Draw position placed at creation time (never moved by propagation)
    pub fixed: bool,

    /// Current occupant
    pub binding: SideBinding,
}

impl Side {
    /// Side filled by propagation
    pub fn advanced(side_number: u8) -> Self {
        Self {
            side_number,
            draw_position: None,
            fixed: false,
            binding: SideBinding::Unresolved,
        }
    }

    /// Side with a draw position placed at creation time
    pub fn fixed(side_number: u8, draw_position: u32) -> Self {
        Self {
            side_number,
            draw_position: Some(draw_position),
            fixed: true,
            binding: SideBinding::Unresolved,
        }
    }
}

/// Status-history entry pushed when propagation exits one side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCode {
    /// Side that exited
    pub side_number: u8,

    /// Status of this match-up before the exit was propagated in
    pub prior_status: MatchUpStatus,

    /// Status of the upstream match-up that caused the exit
    pub source_status: Option<MatchUpStatus>,
}

/// Inclusive `[best, worst]` placement bounds for winning/losing a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishingPositionRange {
    pub winner: [u32; 2],
    pub loser: [u32; 2],
}

/// A single contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchUp {
    pub match_up_id: String,

    /// Structure (bracket) holding this match-up
    pub structure_id: String,

    pub round_number: u32,

    pub round_position: u32,

    /// Sorted draw positions present on either side
    pub draw_positions: Vec<u32>,

    pub sides: [Side; 2],

    pub match_up_status: MatchUpStatus,

    pub winning_side: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,

    /// Stack of `{side, priorStatus}` entries for produced exits
    #[serde(default)]
    pub match_up_status_codes: Vec<StatusCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishing_position_range: Option<FinishingPositionRange>,

    /// Status was entered directly rather than derived from upstream
    #[serde(default)]
    pub result_entered: bool,
}

impl MatchUp {
    /// Create a match-up whose sides are both filled by propagation
    pub fn new(
        match_up_id: impl Into<String>,
        structure_id: impl Into<String>,
        round_number: u32,
        round_position: u32,
    ) -> Self {
        Self {
            match_up_id: match_up_id.into(),
            structure_id: structure_id.into(),
            round_number,
            round_position,
            draw_positions: Vec::new(),
            sides: [Side::advanced(1), Side::advanced(2)],
            match_up_status: MatchUpStatus::ToBePlayed,
            winning_side: None,
            score: None,
            match_up_status_codes: Vec::new(),
            finishing_position_range: None,
            result_entered: false,
        }
    }

    /// Place a draw position on one side (builder pattern)
    pub fn with_fixed_side(mut self, side_number: u8, draw_position: u32) -> Self {
        if let Some(side) = self.side_mut(side_number) {
            *side = Side::fixed(side_number, draw_position);
        }
        self.refresh_draw_positions();
        self
    }

    pub fn side(&self, side_number: u8) -> Option<&Side> {
        match side_number {
            1 => Some(&self.sides[0]),
            2 => Some(&self.sides[1]),
            _ => None,
        }
    }

    pub fn side_mut(&mut self, side_number: u8) -> Option<&mut Side> {
        match side_number {
            1 => Some(&mut self.sides[0]),
            2 => Some(&mut self.sides[1]),
            _ => None,
        }
    }

    /// Recompute `draw_positions` from the sides
    pub fn refresh_draw_positions(&mut self) {
        let mut positions: Vec<u32> = self
            .sides
            .iter()
            .filter_map(|side| side.draw_position)
            .collect();
        positions.sort_unstable();
        self.draw_positions = positions;
    }

    /// Status was produced by upstream exits rather than entered here
    pub fn is_produced(&self) -> bool {
        !self.match_up_status_codes.is_empty()
    }

    /// Number of sides that can contest
    pub fn resolved_side_count(&self) -> usize {
        self.sides
            .iter()
            .filter(|side| side.binding.is_resolved())
            .count()
    }

    /// Both sides hold real participants
    pub fn has_two_participants(&self) -> bool {
        self.sides
            .iter()
            .all(|side| side.binding.participant_id().is_some())
    }

    /// Side number holding the participant, if present
    pub fn side_of_participant(&self, participant_id: &str) -> Option<u8> {
        self.sides
            .iter()
            .find(|side| side.binding.participant_id() == Some(participant_id))
            .map(|side| side.side_number)
    }

    /// Fixed sides of this match-up in side order
    pub fn fixed_sides(&self) -> impl Iterator<Item = &Side> {
        self.sides.iter().filter(|side| side.fixed)
    }

    /// Winning side set by genuine play (not by a produced exit)
    ///
    /// A result entered while the winning side is still unresolved only
    /// advances the abstract slot, so it does not count until someone
    /// occupies that side.
    pub fn has_contested_winner(&self) -> bool {
        let winner_known = self
            .winning_side
            .and_then(|n| self.side(n))
            .is_some_and(|side| side.binding.is_resolved());
        winner_known && !self.is_produced() && self.result_entered
    }
}
