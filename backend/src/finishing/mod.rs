//! Finishing positions
//!
//! `ranges` stamps round profiles onto match-ups when a draw is loaded;
//! `positions` reads them back per participant.

pub mod positions;
pub mod ranges;

pub use positions::{finishing_positions, FinishingPositions};
pub use ranges::{assign_finishing_ranges, RoundProfile};
