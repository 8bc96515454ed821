//! Draw validation
//!
//! Structural checks run when a draw is loaded, before anything is derived.
//! They cover what the propagation code relies on without re-checking:
//! unique ids, anchored links that point at real structures and rounds, an
//! acyclic structure graph, and well-formed position assignments.

use crate::error::DrawError;
use crate::models::draw::DrawDefinition;
use crate::models::link::{Link, LinkType};
use crate::models::structure::{Stage, Structure};
use std::collections::{HashMap, HashSet};

/// Check a draw definition; the first problem found is returned
pub fn validate_draw(draw: &DrawDefinition) -> Result<(), DrawError> {
    if draw.structures.is_empty() {
        return Err(DrawError::MissingDrawDefinition);
    }
    check_unique_ids(draw)?;
    for link in &draw.links {
        check_link(draw, link)?;
    }
    check_inbound_links(draw)?;
    check_acyclic(draw)?;
    check_assignments(draw)?;
    Ok(())
}

fn check_unique_ids(draw: &DrawDefinition) -> Result<(), DrawError> {
    let mut structure_ids = HashSet::new();
    for structure in &draw.structures {
        if !structure_ids.insert(structure.structure_id()) {
            return Err(DrawError::invalid(format!(
                "duplicate structureId {}",
                structure.structure_id()
            )));
        }
        if let Structure::Container(container) = structure {
            for group in &container.structures {
                if !structure_ids.insert(group.structure_id.as_str()) {
                    return Err(DrawError::invalid(format!(
                        "duplicate structureId {}",
                        group.structure_id
                    )));
                }
            }
        }
    }

    let mut match_up_ids = HashSet::new();
    for bracket in draw.brackets() {
        for m in &bracket.match_ups {
            if m.match_up_id.is_empty() {
                return Err(DrawError::MissingMatchUpId);
            }
            if !match_up_ids.insert(m.match_up_id.as_str()) {
                return Err(DrawError::invalid(format!(
                    "duplicate matchUpId {}",
                    m.match_up_id
                )));
            }
            if m.round_number == 0 || m.round_position == 0 {
                return Err(DrawError::invalid(format!(
                    "matchUp {} has round {} position {}; both start at 1",
                    m.match_up_id, m.round_number, m.round_position
                )));
            }
            if m.structure_id != bracket.structure_id {
                return Err(DrawError::invalid(format!(
                    "matchUp {} claims structure {} but sits in {}",
                    m.match_up_id, m.structure_id, bracket.structure_id
                )));
            }
        }
    }
    Ok(())
}

fn check_link(draw: &DrawDefinition, link: &Link) -> Result<(), DrawError> {
    let source_id = &link.source.structure_id;
    let target_id = &link.target.structure_id;

    let Some(source) = draw.structure(source_id) else {
        return Err(DrawError::UnlinkedStructures(format!(
            "link source {} does not exist",
            source_id
        )));
    };
    let Some(Structure::Bracket(target)) = draw.structure(target_id) else {
        return Err(DrawError::UnlinkedStructures(format!(
            "link target {} is not a bracket in this draw",
            target_id
        )));
    };
    if !target.round_counts().contains_key(&link.target.round_number) {
        return Err(DrawError::invalid(format!(
            "link target {} has no round {}",
            target_id, link.target.round_number
        )));
    }

    match (link.link_type, source) {
        (LinkType::Winner | LinkType::Loser, Structure::Bracket(bracket)) => {
            let Some(round) = link.source.round_number else {
                return Err(DrawError::invalid(format!(
                    "{:?} link from {} has no source round",
                    link.link_type, source_id
                )));
            };
            if !bracket.round_counts().contains_key(&round) {
                return Err(DrawError::invalid(format!(
                    "link source {} has no round {}",
                    source_id, round
                )));
            }
            Ok(())
        }
        (LinkType::Winner | LinkType::Loser, Structure::Container(_)) => Err(DrawError::invalid(
            format!(
                "{:?} link cannot leave container {}; use POSITION links",
                link.link_type, source_id
            ),
        )),
        (LinkType::Position, Structure::Container(_)) => {
            match &link.source.finishing_positions {
                Some(positions) if !positions.is_empty() => Ok(()),
                _ => Err(DrawError::invalid(format!(
                    "POSITION link from {} has no finishingPositions",
                    source_id
                ))),
            }
        }
        (LinkType::Position, Structure::Bracket(_)) => Err(DrawError::invalid(format!(
            "POSITION link must leave a container, {} is a bracket",
            source_id
        ))),
    }
}

fn check_inbound_links(draw: &DrawDefinition) -> Result<(), DrawError> {
    for structure in &draw.structures {
        if matches!(structure.stage(), Stage::Main | Stage::Qualifying) {
            continue;
        }
        let id = structure.structure_id();
        if !draw.links.iter().any(|l| l.target.structure_id == id) {
            return Err(DrawError::UnlinkedStructures(format!(
                "{:?} structure {} has no inbound link",
                structure.stage(),
                id
            )));
        }
    }
    Ok(())
}

fn check_acyclic(draw: &DrawDefinition) -> Result<(), DrawError> {
    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for link in &draw.links {
        edges
            .entry(link.source.structure_id.as_str())
            .or_default()
            .push(link.target.structure_id.as_str());
    }

    // 0 = unvisited, 1 = on stack, 2 = done
    let mut state: HashMap<&str, u8> = HashMap::new();
    for structure in &draw.structures {
        let start = structure.structure_id();
        if state.get(start).copied().unwrap_or(0) != 0 {
            continue;
        }
        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
        state.insert(start, 1);
        while let Some((node, next)) = stack.pop() {
            let targets = edges.get(node).map(Vec::as_slice).unwrap_or(&[]);
            if let Some(&target) = targets.get(next) {
                stack.push((node, next + 1));
                match state.get(target).copied().unwrap_or(0) {
                    0 => {
                        state.insert(target, 1);
                        stack.push((target, 0));
                    }
                    1 => {
                        return Err(DrawError::invalid(format!(
                            "structure links form a cycle through {}",
                            target
                        )))
                    }
                    _ => {}
                }
            } else {
                state.insert(node, 2);
            }
        }
    }
    Ok(())
}

fn check_assignments(draw: &DrawDefinition) -> Result<(), DrawError> {
    for bracket in draw.brackets() {
        let mut positions = HashSet::new();
        let mut participants = HashSet::new();
        for assignment in &bracket.position_assignments {
            if !positions.insert(assignment.draw_position) {
                return Err(DrawError::invalid(format!(
                    "draw position {} assigned twice in {}",
                    assignment.draw_position, bracket.structure_id
                )));
            }
            if let Some(participant_id) = &assignment.participant_id {
                if !participants.insert(participant_id.as_str()) {
                    return Err(DrawError::invalid(format!(
                        "participant {} placed twice in {}",
                        participant_id, bracket.structure_id
                    )));
                }
                if assignment.bye {
                    return Err(DrawError::invalid(format!(
                        "draw position {} in {} holds both a participant and a bye",
                        assignment.draw_position, bracket.structure_id
                    )));
                }
            }
        }
    }
    Ok(())
}
