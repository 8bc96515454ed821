//! Link graph
//!
//! Read-only views over a draw: how winners move inside a bracket
//! (`topology`), what each match-up hands downstream (`feeds`), and where
//! those feeds land through links (`targets`).

pub mod feeds;
pub mod targets;
pub mod topology;

pub use feeds::{loser_feed, winner_feed, SlotFeed};
pub use targets::{
    downstream_edges, resolve_targets, DownstreamEdge, EdgeKind, ResolvedTargets, TargetSlot,
};
pub use topology::FedSlot;
