//! Change feed for propagation results.
//!
//! Every successful propagation call reports the match-ups it changed, in
//! the order they were visited, together with the status each one held
//! before the call. Observers (schedulers, UI) consume the `{ matchUp,
//! priorStatus }` pairs; the `ChangeLog` keeps them across calls.
//!
//! # Example
//!
//! ```rust
//! use draw_progression_core_rs::models::{ChangeLog, ChangeRecord, MatchUp, MatchUpStatus};
//!
//! let mut log = ChangeLog::new();
//! log.log(ChangeRecord {
//!     sequence: 1,
//!     match_up: MatchUp::new("m1", "main", 1, 1),
//!     prior_status: MatchUpStatus::ToBePlayed,
//! });
//!
//! assert_eq!(log.len(), 1);
//! assert_eq!(log.records_for_match_up("m1").len(), 1);
//! ```

use crate::models::matchup::MatchUp;
use crate::models::status::MatchUpStatus;
use serde::{Deserialize, Serialize};

/// One changed match-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    /// Propagation call that produced the change (1-based, per engine; 0
    /// when the free functions are called directly)
    pub sequence: usize,

    /// Match-up after the change
    pub match_up: MatchUp,

    /// Status before the change
    pub prior_status: MatchUpStatus,
}

/// Result of one propagation call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResult {
    /// Changed match-ups, breadth-first from the origin
    pub updated_match_ups: Vec<MatchUp>,

    /// Side channel: the same match-ups paired with their prior status
    pub changes: Vec<ChangeRecord>,
}

impl ApplyResult {
    /// Ids of the changed match-ups in notification order
    pub fn updated_ids(&self) -> Vec<&str> {
        self.updated_match_ups
            .iter()
            .map(|m| m.match_up_id.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.updated_match_ups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updated_match_ups.len()
    }
}

/// Cumulative change feed.
///
/// This is a simple wrapper around Vec<ChangeRecord> with convenience methods.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    records: Vec<ChangeRecord>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn log(&mut self, record: ChangeRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    /// Records produced by one propagation call
    pub fn records_for_sequence(&self, sequence: usize) -> Vec<&ChangeRecord> {
        self.records
            .iter()
            .filter(|r| r.sequence == sequence)
            .collect()
    }

    pub fn records_for_match_up(&self, match_up_id: &str) -> Vec<&ChangeRecord> {
        self.records
            .iter()
            .filter(|r| r.match_up.match_up_id == match_up_id)
            .collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
