//! MatchUp status model
//!
//! The closed set of statuses a match-up can hold, plus the exit kinds used
//! by propagation. Statuses serialize as `SCREAMING_SNAKE_CASE` strings
//! (`"TO_BE_PLAYED"`, `"DOUBLE_WALKOVER"`, ...).
//!
//! # Status classes
//!
//! - **Completed class**: a result has been decided (COMPLETED, RETIRED,
//!   WALKOVER, DEFAULTED, DOUBLE_WALKOVER, DOUBLE_DEFAULT, ABANDONED,
//!   CANCELLED, BYE)
//! - **Exit**: at most one side contested (WALKOVER, DEFAULTED, the doubled
//!   forms, ABANDONED, CANCELLED)
//! - **Active**: play has started but not finished (IN_PROGRESS, SUSPENDED)

use crate::error::DrawError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a single match-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchUpStatus {
    #[default]
    ToBePlayed,
    Bye,
    InProgress,
    Suspended,
    Completed,
    Retired,
    Walkover,
    Defaulted,
    Abandoned,
    Cancelled,
    DoubleWalkover,
    DoubleDefault,
}

/// Which kind of non-appearance an exit represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitKind {
    Walkover,
    Default,
}

impl ExitKind {
    /// Status for a single exit of this kind
    pub fn single_status(self) -> MatchUpStatus {
        match self {
            ExitKind::Walkover => MatchUpStatus::Walkover,
            ExitKind::Default => MatchUpStatus::Defaulted,
        }
    }

    /// Status for a double exit of this kind
    pub fn double_status(self) -> MatchUpStatus {
        match self {
            ExitKind::Walkover => MatchUpStatus::DoubleWalkover,
            ExitKind::Default => MatchUpStatus::DoubleDefault,
        }
    }

    /// Combine the kinds of two exited sides.
    ///
    /// Two defaults stay a default; any walkover makes it a walkover.
    pub fn combine(self, other: ExitKind) -> ExitKind {
        match (self, other) {
            (ExitKind::Default, ExitKind::Default) => ExitKind::Default,
            _ => ExitKind::Walkover,
        }
    }
}

impl MatchUpStatus {
    /// All statuses in the closed set
    pub const ALL: [MatchUpStatus; 12] = [
        MatchUpStatus::ToBePlayed,
        MatchUpStatus::Bye,
        MatchUpStatus::InProgress,
        MatchUpStatus::Suspended,
        MatchUpStatus::Completed,
        MatchUpStatus::Retired,
        MatchUpStatus::Walkover,
        MatchUpStatus::Defaulted,
        MatchUpStatus::Abandoned,
        MatchUpStatus::Cancelled,
        MatchUpStatus::DoubleWalkover,
        MatchUpStatus::DoubleDefault,
    ];

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchUpStatus::ToBePlayed => "TO_BE_PLAYED",
            MatchUpStatus::Bye => "BYE",
            MatchUpStatus::InProgress => "IN_PROGRESS",
            MatchUpStatus::Suspended => "SUSPENDED",
            MatchUpStatus::Completed => "COMPLETED",
            MatchUpStatus::Retired => "RETIRED",
            MatchUpStatus::Walkover => "WALKOVER",
            MatchUpStatus::Defaulted => "DEFAULTED",
            MatchUpStatus::Abandoned => "ABANDONED",
            MatchUpStatus::Cancelled => "CANCELLED",
            MatchUpStatus::DoubleWalkover => "DOUBLE_WALKOVER",
            MatchUpStatus::DoubleDefault => "DOUBLE_DEFAULT",
        }
    }

    /// Exit statuses: at most one side actually contested
    pub fn is_exit(&self) -> bool {
        matches!(
            self,
            MatchUpStatus::Walkover
                | MatchUpStatus::Defaulted
                | MatchUpStatus::DoubleWalkover
                | MatchUpStatus::DoubleDefault
                | MatchUpStatus::Abandoned
                | MatchUpStatus::Cancelled
        )
    }

    /// Neither side contested
    pub fn is_double_exit(&self) -> bool {
        matches!(
            self,
            MatchUpStatus::DoubleWalkover | MatchUpStatus::DoubleDefault
        )
    }

    /// Exit kind carried by WALKOVER/DEFAULTED and their doubled forms
    pub fn exit_kind(&self) -> Option<ExitKind> {
        match self {
            MatchUpStatus::Walkover | MatchUpStatus::DoubleWalkover => Some(ExitKind::Walkover),
            MatchUpStatus::Defaulted | MatchUpStatus::DoubleDefault => Some(ExitKind::Default),
            _ => None,
        }
    }

    /// A result has been decided (including byes and non-advancing exits)
    pub fn is_completed_class(&self) -> bool {
        matches!(
            self,
            MatchUpStatus::Bye
                | MatchUpStatus::Completed
                | MatchUpStatus::Retired
                | MatchUpStatus::Walkover
                | MatchUpStatus::Defaulted
                | MatchUpStatus::Abandoned
                | MatchUpStatus::Cancelled
                | MatchUpStatus::DoubleWalkover
                | MatchUpStatus::DoubleDefault
        )
    }

    /// Play has started but no result exists yet
    pub fn is_active(&self) -> bool {
        matches!(self, MatchUpStatus::InProgress | MatchUpStatus::Suspended)
    }

    /// Statuses that must name a winning side when entered directly
    pub fn requires_winning_side(&self) -> bool {
        matches!(
            self,
            MatchUpStatus::Completed
                | MatchUpStatus::Retired
                | MatchUpStatus::Walkover
                | MatchUpStatus::Defaulted
        )
    }

    /// Statuses that need both sides resolved before they can be entered
    pub fn requires_both_sides(&self) -> bool {
        matches!(
            self,
            MatchUpStatus::Completed
                | MatchUpStatus::Retired
                | MatchUpStatus::InProgress
                | MatchUpStatus::Suspended
        )
    }
}

impl fmt::Display for MatchUpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchUpStatus {
    type Err = DrawError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchUpStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DrawError::InvalidValues(format!("unknown matchUpStatus: {}", s)))
    }
}
