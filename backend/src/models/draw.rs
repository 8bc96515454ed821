//! Draw definition
//!
//! The whole graph handed to the engine: structures, links, and (inside the
//! structures) match-ups and position assignments.
//!
//! # Critical Invariants
//!
//! 1. **Structure identity**: structure ids are unique across the draw,
//!    including groups inside containers
//! 2. **MatchUp identity**: match-up ids are unique across the draw
//! 3. **Acyclic**: the structure-level link graph has no cycles

use crate::models::link::Link;
use crate::models::matchup::MatchUp;
use crate::models::structure::{BracketStructure, ContainerStructure, Structure};
use serde::{Deserialize, Serialize};

/// Complete draw graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawDefinition {
    pub draw_id: String,

    pub structures: Vec<Structure>,

    #[serde(default)]
    pub links: Vec<Link>,
}

impl DrawDefinition {
    pub fn new(draw_id: impl Into<String>) -> Self {
        Self {
            draw_id: draw_id.into(),
            structures: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Top-level structure or container by id
    pub fn structure(&self, structure_id: &str) -> Option<&Structure> {
        self.structures
            .iter()
            .find(|s| s.structure_id() == structure_id)
    }

    /// Bracket by id, searching inside containers
    pub fn bracket(&self, structure_id: &str) -> Option<&BracketStructure> {
        self.brackets()
            .into_iter()
            .find(|b| b.structure_id == structure_id)
    }

    pub fn bracket_mut(&mut self, structure_id: &str) -> Option<&mut BracketStructure> {
        self.structures
            .iter_mut()
            .flat_map(|s| s.brackets_mut())
            .find(|b| b.structure_id == structure_id)
    }

    /// Every bracket in draw order (containers expand to their groups)
    pub fn brackets(&self) -> Vec<&BracketStructure> {
        self.structures.iter().flat_map(|s| s.brackets()).collect()
    }

    pub fn container(&self, structure_id: &str) -> Option<&ContainerStructure> {
        match self.structure(structure_id) {
            Some(Structure::Container(c)) => Some(c),
            _ => None,
        }
    }

    /// Container holding a group bracket
    pub fn container_of(&self, bracket_id: &str) -> Option<&ContainerStructure> {
        self.structures.iter().find_map(|s| match s {
            Structure::Container(c)
                if c.structures.iter().any(|g| g.structure_id == bracket_id) =>
            {
                Some(c)
            }
            _ => None,
        })
    }

    /// Bracket is a round-robin group inside a container
    pub fn is_group(&self, bracket_id: &str) -> bool {
        self.container_of(bracket_id).is_some()
    }

    pub fn match_up(&self, match_up_id: &str) -> Option<&MatchUp> {
        self.brackets()
            .into_iter()
            .flat_map(|b| b.match_ups.iter())
            .find(|m| m.match_up_id == match_up_id)
    }

    pub fn match_up_mut(&mut self, match_up_id: &str) -> Option<&mut MatchUp> {
        self.structures
            .iter_mut()
            .flat_map(|s| s.brackets_mut())
            .flat_map(|b| b.match_ups.iter_mut())
            .find(|m| m.match_up_id == match_up_id)
    }

    pub fn match_up_at(
        &self,
        structure_id: &str,
        round_number: u32,
        round_position: u32,
    ) -> Option<&MatchUp> {
        self.bracket(structure_id)?
            .match_up_at(round_number, round_position)
    }

    /// Every match-up in draw order
    pub fn all_match_ups(&self) -> Vec<&MatchUp> {
        self.brackets()
            .into_iter()
            .flat_map(|b| b.match_ups.iter())
            .collect()
    }

    /// Links leaving a structure
    pub fn links_from(&self, structure_id: &str) -> Vec<&Link> {
        self.links
            .iter()
            .filter(|l| l.source.structure_id == structure_id)
            .collect()
    }

    /// Links feeding one round of a structure
    pub fn links_into(&self, structure_id: &str, round_number: u32) -> Vec<&Link> {
        self.links
            .iter()
            .filter(|l| {
                l.target.structure_id == structure_id && l.target.round_number == round_number
            })
            .collect()
    }
}
