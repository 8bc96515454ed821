//! Outcome propagation
//!
//! Applies a result to one match-up and carries every consequence
//! downstream: advancements, byes, produced exits and their reversal.
//!
//! # How a call runs
//!
//! 1. Validate the request against the draw (nothing is touched yet)
//! 2. Clone the draw and write the local result onto the clone
//! 3. Collect the downstream cone of the origin over every potential route
//! 4. Re-derive the cone in topological order (FIFO, origin first)
//! 5. Reject the call if the origin's feeds changed while genuine play
//!    depends on them downstream
//! 6. Diff the cone against the original and commit the clone
//!
//! # Critical Invariants
//!
//! 1. **Atomicity**: any error leaves the caller's draw untouched
//! 2. **Order independence**: every derived field is a function of the
//!    entered results, so the final state does not depend on the order
//!    results were entered in
//! 3. **Exact notification**: `updatedMatchUps` holds precisely the
//!    match-ups whose status, sides, draw positions, winner or score
//!    changed, in visit order

pub mod derive;
pub mod guard;

pub use derive::derive_match_up;
pub use guard::{is_active, is_active_downstream};

use crate::error::DrawError;
use crate::finishing::ranges::assign_finishing_ranges;
use crate::graph::feeds::{loser_feed, winner_feed};
use crate::graph::targets::downstream_edges;
use crate::models::draw::DrawDefinition;
use crate::models::event::{ApplyResult, ChangeRecord};
use crate::models::matchup::MatchUp;
use crate::models::outcome::{Outcome, PropagationOptions};
use crate::models::status::MatchUpStatus;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

// ============================================================================
// Entry points
// ============================================================================

/// Enter, change or clear the result of one match-up
///
/// Returns the changed match-ups in visit order. On error the draw is left
/// exactly as it was.
pub fn apply_outcome(
    draw: &mut DrawDefinition,
    match_up_id: &str,
    outcome: &Outcome,
    options: &PropagationOptions,
) -> Result<ApplyResult, DrawError> {
    if draw.structures.is_empty() {
        return Err(DrawError::MissingDrawDefinition);
    }
    if match_up_id.is_empty() {
        return Err(DrawError::MissingMatchUpId);
    }
    let current = draw
        .match_up(match_up_id)
        .ok_or_else(|| DrawError::MatchUpNotFound(match_up_id.to_string()))?;
    outcome.validate()?;
    check_outcome_allowed(current, outcome)?;

    let before = (
        winner_feed(current, options).signature(),
        loser_feed(current).signature(),
    );

    let mut working = draw.clone();
    if let Some(target) = working.match_up_mut(match_up_id) {
        write_local_result(target, outcome);
    }

    let seeds = vec![match_up_id.to_string()];
    let result = propagate(draw, &mut working, &seeds, options)?;

    let after = working
        .match_up(match_up_id)
        .map(|m| (winner_feed(m, options).signature(), loser_feed(m).signature()));
    if after.as_ref() != Some(&before) && is_active_downstream(draw, match_up_id)? {
        warn!(
            match_up = %match_up_id,
            status = %outcome.match_up_status,
            "rejected outcome: downstream play depends on this result"
        );
        return Err(DrawError::incompatible(format!(
            "{}: downstream match-ups already depend on this result",
            match_up_id
        )));
    }

    debug!(
        match_up = %match_up_id,
        status = %outcome.match_up_status,
        changes = result.len(),
        "applied outcome"
    );
    *draw = working;
    Ok(result)
}

/// Assign round ranges and derive every match-up once
///
/// Brings a freshly loaded draw into its canonical derived state. Running
/// it on a derived draw changes nothing.
pub fn refresh_draw(draw: &mut DrawDefinition, options: &PropagationOptions) -> Result<(), DrawError> {
    if draw.structures.is_empty() {
        return Err(DrawError::MissingDrawDefinition);
    }
    assign_finishing_ranges(draw);

    let nodes: Vec<String> = draw
        .all_match_ups()
        .iter()
        .map(|m| m.match_up_id.clone())
        .collect();
    let mut adjacency = HashMap::new();
    for m in draw.all_match_ups() {
        let targets: Vec<String> = downstream_edges(draw, m)?
            .into_iter()
            .map(|e| e.match_up_id)
            .collect();
        adjacency.insert(m.match_up_id.clone(), targets);
    }

    for id in topological_order(&nodes, &adjacency)? {
        derive_match_up(draw, &id, options)?;
    }
    debug!(draw = %draw.draw_id, match_ups = nodes.len(), "refreshed draw");
    Ok(())
}

/// Flag results present on a loaded draw that no upstream exit explains
///
/// Serialized draws carry `resultEntered`; this covers input written by
/// hand or by another tool.
pub fn mark_entered_results(draw: &mut DrawDefinition) {
    for structure in draw.structures.iter_mut() {
        for bracket in structure.brackets_mut() {
            for m in bracket.match_ups.iter_mut() {
                let derivable = matches!(
                    m.match_up_status,
                    MatchUpStatus::ToBePlayed | MatchUpStatus::Bye
                );
                if !derivable && !m.is_produced() {
                    m.result_entered = true;
                }
            }
        }
    }
}

// ============================================================================
// Internals
// ============================================================================

fn check_outcome_allowed(m: &MatchUp, outcome: &Outcome) -> Result<(), DrawError> {
    if outcome.is_clear() {
        return Ok(());
    }
    let status = outcome.match_up_status;
    if m.match_up_status == MatchUpStatus::Bye {
        return Err(DrawError::incompatible(format!(
            "{} is a BYE and cannot take a result",
            m.match_up_id
        )));
    }
    if m.is_produced() {
        return Err(DrawError::incompatible(format!(
            "{} holds an exit produced upstream",
            m.match_up_id
        )));
    }
    if status.requires_both_sides() && m.resolved_side_count() < 2 {
        return Err(DrawError::incompatible(format!(
            "{} requires both sides of {} to be resolved",
            status, m.match_up_id
        )));
    }
    if status.is_exit() && m.sides.iter().any(|s| s.binding.is_bye()) {
        return Err(DrawError::incompatible(format!(
            "{} cannot be entered against a bye in {}",
            status, m.match_up_id
        )));
    }
    Ok(())
}

fn write_local_result(m: &mut MatchUp, outcome: &Outcome) {
    if outcome.is_clear() {
        m.result_entered = false;
        m.match_up_status = MatchUpStatus::ToBePlayed;
        m.winning_side = None;
        m.score = None;
    } else {
        m.result_entered = true;
        m.match_up_status = outcome.match_up_status;
        m.winning_side = outcome.winning_side;
        m.score = outcome.score.clone();
    }
}

/// Re-derive everything downstream of `seeds` on `working`
///
/// The seeds themselves are derived first. Changes are reported against
/// `original`.
pub(crate) fn propagate(
    original: &DrawDefinition,
    working: &mut DrawDefinition,
    seeds: &[String],
    options: &PropagationOptions,
) -> Result<ApplyResult, DrawError> {
    let (nodes, adjacency) = downstream_cone(working, seeds)?;
    let order = topological_order(&nodes, &adjacency)?;
    for id in &order {
        derive_match_up(working, id, options)?;
    }

    let mut result = ApplyResult::default();
    for id in &order {
        let (Some(prior), Some(updated)) = (original.match_up(id), working.match_up(id)) else {
            continue;
        };
        if changed(prior, updated) {
            result.updated_match_ups.push(updated.clone());
            result.changes.push(ChangeRecord {
                sequence: 0,
                match_up: updated.clone(),
                prior_status: prior.match_up_status,
            });
        }
    }
    Ok(result)
}

fn changed(prior: &MatchUp, updated: &MatchUp) -> bool {
    prior.match_up_status != updated.match_up_status
        || prior.sides != updated.sides
        || prior.draw_positions != updated.draw_positions
        || prior.winning_side != updated.winning_side
        || prior.score != updated.score
}

type Adjacency = HashMap<String, Vec<String>>;

/// Seeds plus everything reachable from them, breadth-first
fn downstream_cone(
    draw: &DrawDefinition,
    seeds: &[String],
) -> Result<(Vec<String>, Adjacency), DrawError> {
    let mut nodes = Vec::new();
    let mut adjacency: Adjacency = HashMap::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();

    for seed in seeds {
        if visited.insert(seed.clone()) {
            queue.push_back(seed.clone());
        }
    }
    while let Some(id) = queue.pop_front() {
        let m = draw
            .match_up(&id)
            .ok_or_else(|| DrawError::MatchUpNotFound(id.clone()))?;
        let targets: Vec<String> = downstream_edges(draw, m)?
            .into_iter()
            .map(|e| e.match_up_id)
            .collect();
        for target in &targets {
            if visited.insert(target.clone()) {
                queue.push_back(target.clone());
            }
        }
        adjacency.insert(id.clone(), targets);
        nodes.push(id);
    }
    Ok((nodes, adjacency))
}

/// Kahn's algorithm over `nodes`, FIFO, ties kept in node order
fn topological_order(nodes: &[String], adjacency: &Adjacency) -> Result<Vec<String>, DrawError> {
    let members: HashSet<&str> = nodes.iter().map(String::as_str).collect();
    let mut in_degree: HashMap<&str, usize> = nodes.iter().map(|n| (n.as_str(), 0)).collect();
    for node in nodes {
        for target in adjacency.get(node).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(target.as_str()) {
                *degree += 1;
            }
        }
    }

    let mut queue: VecDeque<&str> = nodes
        .iter()
        .map(String::as_str)
        .filter(|n| in_degree.get(n) == Some(&0))
        .collect();
    let mut order = Vec::with_capacity(nodes.len());
    while let Some(node) = queue.pop_front() {
        order.push(node.to_string());
        for target in adjacency.get(node).into_iter().flatten() {
            if !members.contains(target.as_str()) {
                continue;
            }
            if let Some(degree) = in_degree.get_mut(target.as_str()) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(target.as_str());
                }
            }
        }
    }

    if order.len() != nodes.len() {
        let stuck: Vec<&str> = nodes
            .iter()
            .map(String::as_str)
            .filter(|n| in_degree.get(n).is_some_and(|d| *d > 0))
            .collect();
        return Err(DrawError::invalid(format!(
            "match-up dependencies form a cycle through {}",
            stuck.join(", ")
        )));
    }
    Ok(order)
}
