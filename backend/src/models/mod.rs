//! Domain models for the draw progression engine

pub mod draw;
pub mod event;
pub mod link;
pub mod matchup;
pub mod outcome;
pub mod status;
pub mod structure;

// Re-exports
pub use draw::DrawDefinition;
pub use event::{ApplyResult, ChangeLog, ChangeRecord};
pub use link::{FeedProfile, Link, LinkCondition, LinkSource, LinkTarget, LinkType};
pub use matchup::{FinishingPositionRange, MatchUp, Side, SideBinding, StatusCode};
pub use outcome::{Outcome, PropagationOptions};
pub use status::{ExitKind, MatchUpStatus};
pub use structure::{BracketStructure, ContainerStructure, PositionAssignment, Stage, Structure};
