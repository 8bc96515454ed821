//! Structure model
//!
//! A structure is one stage of a draw. It is either an ordinary bracket
//! holding match-ups directly, or a container (round-robin) holding group
//! brackets. A container's position assignments are the union of its
//! groups' assignments; it stores none of its own.

use crate::models::matchup::MatchUp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stage of competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Qualifying,
    Main,
    Consolation,
    Playoff,
    VoluntaryConsolation,
}

/// Binds one draw position to a participant, a bye, a qualifier, or nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionAssignment {
    pub draw_position: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,

    #[serde(default)]
    pub bye: bool,

    #[serde(default)]
    pub qualifier: bool,

    /// Finishing order inside a round-robin group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_order: Option<u32>,
}

impl PositionAssignment {
    /// Unassigned draw position
    pub fn empty(draw_position: u32) -> Self {
        Self {
            draw_position,
            participant_id: None,
            bye: false,
            qualifier: false,
            group_order: None,
        }
    }

    pub fn participant(draw_position: u32, participant_id: impl Into<String>) -> Self {
        Self {
            participant_id: Some(participant_id.into()),
            ..Self::empty(draw_position)
        }
    }

    pub fn bye(draw_position: u32) -> Self {
        Self {
            bye: true,
            ..Self::empty(draw_position)
        }
    }

    pub fn qualifier(draw_position: u32) -> Self {
        Self {
            qualifier: true,
            ..Self::empty(draw_position)
        }
    }

    /// Nothing is bound to this position
    pub fn is_vacant(&self) -> bool {
        self.participant_id.is_none() && !self.bye && !self.qualifier
    }
}

/// Ordinary structure holding match-ups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketStructure {
    pub structure_id: String,

    #[serde(default)]
    pub structure_name: String,

    pub stage: Stage,

    #[serde(default = "default_stage_sequence")]
    pub stage_sequence: u32,

    /// Added to every finishing position computed for this structure
    #[serde(default)]
    pub finishing_position_offset: u32,

    pub match_ups: Vec<MatchUp>,

    #[serde(default)]
    pub position_assignments: Vec<PositionAssignment>,
}

fn default_stage_sequence() -> u32 {
    1
}

impl BracketStructure {
    pub fn new(structure_id: impl Into<String>, stage: Stage) -> Self {
        Self {
            structure_id: structure_id.into(),
            structure_name: String::new(),
            stage,
            stage_sequence: 1,
            finishing_position_offset: 0,
            match_ups: Vec::new(),
            position_assignments: Vec::new(),
        }
    }

    pub fn assignment(&self, draw_position: u32) -> Option<&PositionAssignment> {
        self.position_assignments
            .iter()
            .find(|a| a.draw_position == draw_position)
    }

    /// Get or create the assignment for a draw position
    pub fn assignment_mut(&mut self, draw_position: u32) -> &mut PositionAssignment {
        let idx = match self
            .position_assignments
            .iter()
            .position(|a| a.draw_position == draw_position)
        {
            Some(idx) => idx,
            None => {
                self.position_assignments
                    .push(PositionAssignment::empty(draw_position));
                self.position_assignments
                    .sort_by_key(|a| a.draw_position);
                self.position_assignments
                    .iter()
                    .position(|a| a.draw_position == draw_position)
                    .unwrap_or(0)
            }
        };
        &mut self.position_assignments[idx]
    }

    /// Draw position held by a participant
    pub fn draw_position_of(&self, participant_id: &str) -> Option<u32> {
        self.position_assignments
            .iter()
            .find(|a| a.participant_id.as_deref() == Some(participant_id))
            .map(|a| a.draw_position)
    }

    /// Match-up count per round, in round order
    pub fn round_counts(&self) -> BTreeMap<u32, u32> {
        let mut counts = BTreeMap::new();
        for m in &self.match_ups {
            *counts.entry(m.round_number).or_insert(0) += 1;
        }
        counts
    }

    /// Match-ups of one round ordered by round position
    pub fn round_match_ups(&self, round_number: u32) -> Vec<&MatchUp> {
        let mut round: Vec<&MatchUp> = self
            .match_ups
            .iter()
            .filter(|m| m.round_number == round_number)
            .collect();
        round.sort_by_key(|m| m.round_position);
        round
    }

    pub fn match_up_at(&self, round_number: u32, round_position: u32) -> Option<&MatchUp> {
        self.match_ups
            .iter()
            .find(|m| m.round_number == round_number && m.round_position == round_position)
    }

    /// Number of draw positions in the structure
    pub fn draw_size(&self) -> usize {
        self.position_assignments.len()
    }
}

/// Container structure holding round-robin groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStructure {
    pub structure_id: String,

    #[serde(default)]
    pub structure_name: String,

    pub stage: Stage,

    #[serde(default = "default_stage_sequence")]
    pub stage_sequence: u32,

    #[serde(default)]
    pub finishing_position_offset: u32,

    /// Groups, in group order
    pub structures: Vec<BracketStructure>,
}

impl ContainerStructure {
    /// Union of the groups' position assignments
    pub fn position_assignments(&self) -> Vec<&PositionAssignment> {
        self.structures
            .iter()
            .flat_map(|group| group.position_assignments.iter())
            .collect()
    }

    /// Largest group size
    pub fn group_size(&self) -> u32 {
        self.structures
            .iter()
            .map(|group| group.position_assignments.len() as u32)
            .max()
            .unwrap_or(0)
    }
}

/// A stage of the draw: bracket or container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "structureType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Structure {
    Bracket(BracketStructure),
    Container(ContainerStructure),
}

impl Structure {
    pub fn structure_id(&self) -> &str {
        match self {
            Structure::Bracket(b) => &b.structure_id,
            Structure::Container(c) => &c.structure_id,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Structure::Bracket(b) => b.stage,
            Structure::Container(c) => c.stage,
        }
    }

    /// Brackets holding match-ups (the bracket itself or a container's groups)
    pub fn brackets(&self) -> Vec<&BracketStructure> {
        match self {
            Structure::Bracket(b) => vec![b],
            Structure::Container(c) => c.structures.iter().collect(),
        }
    }

    pub fn brackets_mut(&mut self) -> Vec<&mut BracketStructure> {
        match self {
            Structure::Bracket(b) => vec![b],
            Structure::Container(c) => c.structures.iter_mut().collect(),
        }
    }
}
