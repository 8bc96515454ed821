//! Draw Progression Core - Rust Engine
//!
//! Result propagation for competitive brackets: structures linked by
//! winner, loser and position routes, match-ups whose sides and statuses
//! follow from the results entered upstream, and the finishing-position
//! ranges those results imply.
//!
//! # Architecture
//!
//! - **models**: Domain types (DrawDefinition, Structure, Link, MatchUp, Outcome)
//! - **graph**: In-bracket topology, slot feeds and target resolution
//! - **propagation**: Outcome application, derivation and the active-downstream guard
//! - **finishing**: Round profiles and participant finishing positions
//! - **groups**: Round-robin group order feeding playoffs
//! - **validation**: Structural checks on load
//! - **engine**: Stateful facade, change log and snapshots
//! - **mocks**: Fixed-shape draws for tests and demos
//!
//! # Critical Invariants
//!
//! 1. Every derived field is a function of the entered results (order independent)
//! 2. A failed call never leaves a partially propagated draw
//! 3. No ambient state: behaviour switches travel in `PropagationOptions`

// Module declarations
pub mod engine;
pub mod error;
pub mod finishing;
pub mod graph;
pub mod groups;
pub mod mocks;
pub mod models;
pub mod propagation;
pub mod validation;

// Re-exports for convenience
pub use engine::{state_digest, DrawEngine, DrawSnapshot};
pub use error::{DrawError, ErrorKind, ErrorResponse};
pub use finishing::{finishing_positions, FinishingPositions, RoundProfile};
pub use graph::{resolve_targets, ResolvedTargets, TargetSlot};
pub use groups::{apply_group_order, GroupFinish};
pub use models::{
    ApplyResult, BracketStructure, ChangeLog, ChangeRecord, ContainerStructure, DrawDefinition,
    ExitKind, FeedProfile, FinishingPositionRange, Link, LinkCondition, LinkType, MatchUp,
    MatchUpStatus, Outcome, PositionAssignment, PropagationOptions, Side, SideBinding, Stage,
    StatusCode, Structure,
};
pub use propagation::{apply_outcome, is_active_downstream, refresh_draw};
pub use validation::validate_draw;
