//! Outcome submission and propagation options

use crate::error::DrawError;
use crate::models::status::MatchUpStatus;
use serde::{Deserialize, Serialize};

/// A result submitted for one match-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub match_up_status: MatchUpStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_side: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
}

impl Outcome {
    pub fn new(match_up_status: MatchUpStatus) -> Self {
        Self {
            match_up_status,
            winning_side: None,
            score: None,
        }
    }

    /// Scored win for one side
    pub fn completed(winning_side: u8, score: impl Into<String>) -> Self {
        Self {
            match_up_status: MatchUpStatus::Completed,
            winning_side: Some(winning_side),
            score: Some(score.into()),
        }
    }

    pub fn walkover(winning_side: u8) -> Self {
        Self::new(MatchUpStatus::Walkover).with_winning_side(winning_side)
    }

    pub fn defaulted(winning_side: u8) -> Self {
        Self::new(MatchUpStatus::Defaulted).with_winning_side(winning_side)
    }

    pub fn double_walkover() -> Self {
        Self::new(MatchUpStatus::DoubleWalkover)
    }

    pub fn double_default() -> Self {
        Self::new(MatchUpStatus::DoubleDefault)
    }

    /// Remove whatever result was entered
    pub fn clear() -> Self {
        Self::new(MatchUpStatus::ToBePlayed)
    }

    pub fn with_winning_side(mut self, side: u8) -> Self {
        self.winning_side = Some(side);
        self
    }

    pub fn with_score(mut self, score: impl Into<String>) -> Self {
        self.score = Some(score.into());
        self
    }

    /// Outcome removes an existing result
    pub fn is_clear(&self) -> bool {
        self.match_up_status == MatchUpStatus::ToBePlayed
            && self.winning_side.is_none()
            && self.score.is_none()
    }

    /// Check the payload on its own, without looking at the draw
    pub fn validate(&self) -> Result<(), DrawError> {
        let status = self.match_up_status;
        if let Some(side) = self.winning_side {
            if side != 1 && side != 2 {
                return Err(DrawError::invalid(format!("invalid winningSide: {}", side)));
            }
            if !status.requires_winning_side() {
                return Err(DrawError::invalid(format!(
                    "{} cannot have a winningSide",
                    status
                )));
            }
        } else if status.requires_winning_side() {
            return Err(DrawError::invalid(format!("{} requires a winningSide", status)));
        }
        match status {
            MatchUpStatus::Bye => Err(DrawError::invalid("BYE cannot be entered as an outcome")),
            MatchUpStatus::ToBePlayed if self.score.is_some() => Err(DrawError::invalid(
                "TO_BE_PLAYED cannot carry a score",
            )),
            _ => Ok(()),
        }
    }
}

/// Behaviour switches passed into every propagation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PropagationOptions {
    /// An exit facing a bye lets the bye advance (for finishing positions only)
    pub bye_advancements: bool,

    /// An exit facing a bye forwards a bye instead of an exited slot
    pub double_exit_propagates_bye: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_winning_side_rules() {
        assert!(Outcome::completed(1, "6-1 6-2").validate().is_ok());
        assert!(Outcome::double_walkover().validate().is_ok());
        assert!(Outcome::clear().validate().is_ok());

        let bad_side = Outcome::completed(3, "6-1 6-2");
        assert!(matches!(bad_side.validate(), Err(DrawError::InvalidValues(_))));

        let missing = Outcome::new(MatchUpStatus::Walkover);
        assert!(matches!(missing.validate(), Err(DrawError::InvalidValues(_))));

        let extra = Outcome::double_walkover().with_winning_side(1);
        assert!(matches!(extra.validate(), Err(DrawError::InvalidValues(_))));
    }

    #[test]
    fn test_options_default_from_empty_json() {
        let options: PropagationOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, PropagationOptions::default());

        let options: PropagationOptions =
            serde_json::from_str(r#"{"byeAdvancements": true}"#).unwrap();
        assert!(options.bye_advancements);
        assert!(!options.double_exit_propagates_bye);
    }
}
