//! Link model
//!
//! A link routes the winners, losers or group finishers of one structure
//! round into a round of another structure.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkType {
    Winner,
    Loser,
    /// Group finishers of a container, keyed by finishing position
    Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkCondition {
    /// Route only participants whose first match-up in the source structure was a bye
    FirstMatchup,
}

/// Order in which source round positions fill the target round's fed slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedProfile {
    #[default]
    TopDown,
    BottomUp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSource {
    pub structure_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_number: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishing_positions: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkTarget {
    pub structure_id: String,

    pub round_number: u32,

    #[serde(default)]
    pub feed_profile: FeedProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub link_type: LinkType,
    pub source: LinkSource,
    pub target: LinkTarget,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_condition: Option<LinkCondition>,
}

impl Link {
    /// Link routing winners or losers of a bracket round
    pub fn new(
        link_type: LinkType,
        source_structure: impl Into<String>,
        source_round: u32,
        target_structure: impl Into<String>,
        target_round: u32,
    ) -> Self {
        Self {
            link_type,
            source: LinkSource {
                structure_id: source_structure.into(),
                round_number: Some(source_round),
                finishing_positions: None,
            },
            target: LinkTarget {
                structure_id: target_structure.into(),
                round_number: target_round,
                feed_profile: FeedProfile::TopDown,
            },
            link_condition: None,
        }
    }

    /// Link routing group finishers of a container
    pub fn position(
        container_id: impl Into<String>,
        finishing_positions: Vec<u32>,
        target_structure: impl Into<String>,
        target_round: u32,
    ) -> Self {
        Self {
            link_type: LinkType::Position,
            source: LinkSource {
                structure_id: container_id.into(),
                round_number: None,
                finishing_positions: Some(finishing_positions),
            },
            target: LinkTarget {
                structure_id: target_structure.into(),
                round_number: target_round,
                feed_profile: FeedProfile::TopDown,
            },
            link_condition: None,
        }
    }

    pub fn with_condition(mut self, condition: LinkCondition) -> Self {
        self.link_condition = Some(condition);
        self
    }

    pub fn with_feed_profile(mut self, profile: FeedProfile) -> Self {
        self.target.feed_profile = profile;
        self
    }

    pub fn with_finishing_positions(mut self, positions: Vec<u32>) -> Self {
        self.source.finishing_positions = Some(positions);
        self
    }

    /// Does the finishing-position filter overlap `[best, worst]`?
    ///
    /// A link without a filter accepts every range.
    pub fn accepts_range(&self, range: [u32; 2]) -> bool {
        match &self.source.finishing_positions {
            None => true,
            Some(positions) => positions
                .iter()
                .any(|p| *p >= range[0] && *p <= range[1]),
        }
    }

    /// Width of the filter; unfiltered links are the widest
    pub fn filter_width(&self) -> usize {
        self.source
            .finishing_positions
            .as_ref()
            .map(|p| p.len())
            .unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_range() {
        let link = Link::new(LinkType::Loser, "main", 2, "playoff", 1)
            .with_finishing_positions(vec![3, 4]);
        assert!(link.accepts_range([3, 4]));
        assert!(link.accepts_range([4, 8]));
        assert!(!link.accepts_range([5, 8]));
        assert_eq!(link.filter_width(), 2);

        let open = Link::new(LinkType::Loser, "main", 1, "cons", 1);
        assert!(open.accepts_range([5, 8]));
        assert_eq!(open.filter_width(), usize::MAX);
    }

    #[test]
    fn test_link_json_shape() {
        let link = Link::new(LinkType::Winner, "q", 2, "main", 1);
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["linkType"], "WINNER");
        assert_eq!(json["source"]["roundNumber"], 2);
        assert_eq!(json["target"]["feedProfile"], "TOP_DOWN");
    }
}
