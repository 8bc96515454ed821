//! Draw engine
//!
//! Owns one draw and the options it is propagated under, and keeps the
//! cumulative change feed. Every method delegates to the free functions in
//! `propagation`, `graph`, `groups` and `finishing`; the engine adds
//! loading, sequencing and snapshots.
//!
//! # Example
//!
//! ```rust
//! use draw_progression_core_rs::{mocks, DrawEngine, MatchUpStatus, Outcome, PropagationOptions};
//!
//! let mut engine = DrawEngine::new(PropagationOptions::default());
//! engine.load(mocks::elimination(4)).unwrap();
//!
//! let first = engine.match_up_id_at("main", 1, 1).unwrap();
//! let result = engine.apply_outcome(&first, &Outcome::double_walkover()).unwrap();
//! assert_eq!(result.len(), 2);
//!
//! let final_id = engine.match_up_id_at("main", 2, 1).unwrap();
//! let final_match = engine.draw().unwrap().match_up(&final_id).unwrap();
//! assert_eq!(final_match.match_up_status, MatchUpStatus::Walkover);
//! ```

pub mod snapshot;

pub use snapshot::{state_digest, DrawSnapshot};

use crate::error::DrawError;
use crate::finishing::positions::{finishing_positions, FinishingPositions};
use crate::graph::targets::{resolve_targets, ResolvedTargets};
use crate::groups::{apply_group_order, GroupFinish};
use crate::models::draw::DrawDefinition;
use crate::models::event::{ApplyResult, ChangeLog};
use crate::models::outcome::{Outcome, PropagationOptions};
use crate::propagation::{apply_outcome, is_active_downstream, mark_entered_results, refresh_draw};
use crate::validation::validate_draw;
use tracing::debug;

/// Stateful facade over one draw
#[derive(Debug, Clone, Default)]
pub struct DrawEngine {
    draw: Option<DrawDefinition>,
    options: PropagationOptions,
    change_log: ChangeLog,
    sequence: usize,
}

impl DrawEngine {
    pub fn new(options: PropagationOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Validate, load and derive a draw in one step
    pub fn from_draw(draw: DrawDefinition, options: PropagationOptions) -> Result<Self, DrawError> {
        let mut engine = Self::new(options);
        engine.load(draw)?;
        Ok(engine)
    }

    /// Replace the current draw
    ///
    /// The draw is validated, results without an upstream explanation are
    /// marked as entered, and every match-up is derived once.
    pub fn load(&mut self, mut draw: DrawDefinition) -> Result<(), DrawError> {
        validate_draw(&draw)?;
        mark_entered_results(&mut draw);
        refresh_draw(&mut draw, &self.options)?;
        debug!(draw = %draw.draw_id, "loaded draw");
        self.draw = Some(draw);
        self.change_log.clear();
        self.sequence = 0;
        Ok(())
    }

    pub fn draw(&self) -> Result<&DrawDefinition, DrawError> {
        self.draw.as_ref().ok_or(DrawError::MissingDrawDefinition)
    }

    pub fn into_draw(self) -> Option<DrawDefinition> {
        self.draw
    }

    pub fn options(&self) -> &PropagationOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: PropagationOptions) {
        self.options = options;
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.change_log
    }

    /// Propagation calls that succeeded since the draw was loaded
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    /// Id of the match-up at a structure, round and position
    pub fn match_up_id_at(&self, structure_id: &str, round: u32, position: u32) -> Option<String> {
        self.draw
            .as_ref()?
            .match_up_at(structure_id, round, position)
            .map(|m| m.match_up_id.clone())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub fn apply_outcome(&mut self, match_up_id: &str, outcome: &Outcome) -> Result<ApplyResult, DrawError> {
        let options = self.options;
        let draw = self.draw.as_mut().ok_or(DrawError::MissingDrawDefinition)?;
        let result = apply_outcome(draw, match_up_id, outcome, &options)?;
        Ok(self.record(result))
    }

    pub fn apply_group_order(
        &mut self,
        group_id: &str,
        finishes: &[GroupFinish],
    ) -> Result<ApplyResult, DrawError> {
        let options = self.options;
        let draw = self.draw.as_mut().ok_or(DrawError::MissingDrawDefinition)?;
        let result = apply_group_order(draw, group_id, finishes, &options)?;
        Ok(self.record(result))
    }

    fn record(&mut self, mut result: ApplyResult) -> ApplyResult {
        self.sequence += 1;
        for change in result.changes.iter_mut() {
            change.sequence = self.sequence;
            self.change_log.log(change.clone());
        }
        result
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn resolve_targets(&self, match_up_id: &str) -> Result<ResolvedTargets, DrawError> {
        resolve_targets(self.draw()?, match_up_id)
    }

    pub fn is_active_downstream(&self, match_up_id: &str) -> Result<bool, DrawError> {
        is_active_downstream(self.draw()?, match_up_id)
    }

    pub fn finishing_positions(&self, participant_id: &str) -> Result<FinishingPositions, DrawError> {
        finishing_positions(self.draw()?, participant_id)
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    pub fn snapshot(&self) -> Result<DrawSnapshot, DrawError> {
        DrawSnapshot::capture(self.draw()?, self.options, self.sequence)
    }

    /// Restore a snapshot taken earlier; the change log starts empty
    pub fn restore(&mut self, snapshot: DrawSnapshot) -> Result<(), DrawError> {
        snapshot.verify()?;
        validate_draw(&snapshot.draw)?;
        self.draw = Some(snapshot.draw);
        self.options = snapshot.options;
        self.sequence = snapshot.sequence;
        self.change_log.clear();
        Ok(())
    }
}
