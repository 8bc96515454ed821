//! Position target resolution
//!
//! Maps a match-up onto the slots its winner and loser move into, and
//! enumerates every match-up that can depend on it.
//!
//! # Link selection
//!
//! For one source round and one link type, candidate links are those whose
//! finishing-position filter overlaps the round's range and whose condition
//! holds. Conditioned links beat unconditioned ones, then the narrowest
//! filter wins. Two candidates left at the same rank is a configuration
//! error, never an arbitrary pick.
//!
//! # Slot layout
//!
//! Unconditioned links into one target round ("primary" links) share the
//! round's fed slots in link order: each takes a contiguous range sized by
//! its source (match-ups in the source round, or groups times finishing
//! positions for a POSITION link) and maps source positions onto it through
//! its feed profile.

use crate::error::DrawError;
use crate::graph::feeds::loser_feed;
use crate::graph::topology::{
    fed_slots, first_match_up_of, first_round_ancestors, next_in_bracket, slot_index, FedSlot,
};
use crate::models::draw::DrawDefinition;
use crate::models::link::{Link, LinkCondition, LinkType};
use crate::models::matchup::MatchUp;
use crate::models::status::MatchUpStatus;
use crate::models::structure::{BracketStructure, Structure};
use serde::{Deserialize, Serialize};

// ============================================================================
// Public types
// ============================================================================

/// Destination of a winner or loser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSlot {
    pub match_up_id: String,
    pub structure_id: String,
    pub round_number: u32,
    pub round_position: u32,
    pub side_number: u8,
}

/// Result of [`resolve_targets`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTargets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_target: Option<TargetSlot>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub loser_target: Option<TargetSlot>,

    /// Link used for the winner (none when advancing inside the bracket)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_link: Option<Link>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub loser_link: Option<Link>,
}

/// How a downstream match-up depends on its source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Implicit next round inside the same bracket
    InBracket,
    Winner,
    Loser,
    /// Conditional loser route replacing a bye
    FirstMatchup,
}

/// One dependency from a match-up to a downstream match-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamEdge {
    pub match_up_id: String,
    pub kind: EdgeKind,
}

/// Unconditioned link into a target round with its slot range
#[derive(Debug, Clone, Copy)]
pub struct PrimaryFeed<'a> {
    pub link: &'a Link,
    pub offset: usize,
    pub count: usize,
}

// ============================================================================
// Link selection
// ============================================================================

/// `[best, worst]` range for one outcome of a round, if assigned
pub fn round_range(bracket: &BracketStructure, round_number: u32, link_type: LinkType) -> Option<[u32; 2]> {
    let range = bracket
        .round_match_ups(round_number)
        .first()?
        .finishing_position_range?;
    match link_type {
        LinkType::Winner => Some(range.winner),
        LinkType::Loser => Some(range.loser),
        LinkType::Position => None,
    }
}

/// Reject WINNER/LOSER links out of a structure that lack a source round
pub fn check_anchored(draw: &DrawDefinition, structure_id: &str) -> Result<(), DrawError> {
    let unanchored = draw.links_from(structure_id).into_iter().find(|l| {
        matches!(l.link_type, LinkType::Winner | LinkType::Loser) && l.source.round_number.is_none()
    });
    match unanchored {
        Some(link) => Err(DrawError::invalid(format!(
            "{:?} link from {} to {} has no source round",
            link.link_type, structure_id, link.target.structure_id
        ))),
        None => Ok(()),
    }
}

/// Pick the applicable link of one type for a source round
///
/// `eligible` decides whether a candidate's condition holds.
pub fn select_link<'a>(
    draw: &'a DrawDefinition,
    structure_id: &str,
    round_number: u32,
    link_type: LinkType,
    range: Option<[u32; 2]>,
    eligible: impl Fn(&Link) -> bool,
) -> Result<Option<&'a Link>, DrawError> {
    check_anchored(draw, structure_id)?;

    let mut candidates: Vec<&Link> = draw
        .links_from(structure_id)
        .into_iter()
        .filter(|l| l.link_type == link_type && l.source.round_number == Some(round_number))
        .filter(|l| range.map_or(true, |r| l.accepts_range(r)))
        .filter(|l| eligible(l))
        .collect();

    candidates.sort_by_key(|l| (l.link_condition.is_none(), l.filter_width()));
    let Some(best) = candidates.first().copied() else {
        return Ok(None);
    };
    let rank = (best.link_condition.is_none(), best.filter_width());
    let tied = candidates
        .iter()
        .filter(|l| (l.link_condition.is_none(), l.filter_width()) == rank)
        .count();
    if tied > 1 {
        return Err(DrawError::invalid(format!(
            "{} {:?} links from {} round {} share the same filter",
            tied, link_type, structure_id, round_number
        )));
    }
    Ok(Some(best))
}

/// The unconditioned link that routes one source round, if any
fn selected_primary<'a>(
    draw: &'a DrawDefinition,
    source: &BracketStructure,
    round_number: u32,
    link_type: LinkType,
) -> Result<Option<&'a Link>, DrawError> {
    if link_type == LinkType::Winner {
        let last_round = source.round_counts().keys().next_back().copied();
        if last_round != Some(round_number) {
            return Ok(None);
        }
    }
    select_link(
        draw,
        &source.structure_id,
        round_number,
        link_type,
        round_range(source, round_number, link_type),
        |l| l.link_condition.is_none(),
    )
}

// ============================================================================
// Slot layout
// ============================================================================

/// Fixed sides of a target round that links feed
///
/// When the round carries qualifier placeholders only those are fed; the
/// rest are direct entries.
pub fn link_fed_slots(bracket: &BracketStructure, round_number: u32) -> Vec<FedSlot> {
    let slots = fed_slots(bracket, round_number);
    let is_qualifier = |slot: &FedSlot| {
        bracket
            .assignment(slot.draw_position)
            .is_some_and(|a| a.qualifier)
    };
    if slots.iter().any(is_qualifier) {
        slots.into_iter().filter(|s| is_qualifier(s)).collect()
    } else {
        slots
    }
}

/// Number of entries a primary link delivers
fn feed_count(draw: &DrawDefinition, link: &Link) -> usize {
    match link.link_type {
        LinkType::Position => {
            let groups = draw
                .container(&link.source.structure_id)
                .map(|c| c.structures.len())
                .unwrap_or(0);
            let positions = link
                .source
                .finishing_positions
                .as_ref()
                .map(|p| p.len())
                .unwrap_or(0);
            groups * positions
        }
        LinkType::Winner | LinkType::Loser => {
            match (
                draw.bracket(&link.source.structure_id),
                link.source.round_number,
            ) {
                (Some(source), Some(round)) => source.round_match_ups(round).len(),
                _ => 0,
            }
        }
    }
}

/// Primary links into a target round, with their slot ranges
pub fn primary_feeds<'a>(
    draw: &'a DrawDefinition,
    target_structure: &str,
    target_round: u32,
) -> Result<Vec<PrimaryFeed<'a>>, DrawError> {
    let mut feeds = Vec::new();
    let mut offset = 0;
    for link in draw.links_into(target_structure, target_round) {
        if link.link_condition.is_some() {
            continue;
        }
        let applies = match link.link_type {
            LinkType::Position => true,
            LinkType::Winner | LinkType::Loser => {
                let Some(source) = draw.bracket(&link.source.structure_id) else {
                    continue;
                };
                let Some(round) = link.source.round_number else {
                    return Err(DrawError::invalid(format!(
                        "{:?} link into {} has no source round",
                        link.link_type, target_structure
                    )));
                };
                selected_primary(draw, source, round, link.link_type)?
                    .is_some_and(|selected| std::ptr::eq(selected, link))
            }
        };
        if !applies {
            continue;
        }
        let count = feed_count(draw, link);
        feeds.push(PrimaryFeed {
            link,
            offset,
            count,
        });
        offset += count;
    }
    Ok(feeds)
}

/// Fed slot that one source position of a primary link lands in
pub fn slot_for_source(
    draw: &DrawDefinition,
    link: &Link,
    source_position: u32,
) -> Result<Option<(String, FedSlot)>, DrawError> {
    let target_id = &link.target.structure_id;
    let target_round = link.target.round_number;
    let Some(target) = draw.bracket(target_id) else {
        return Err(DrawError::UnlinkedStructures(format!(
            "link target {} does not exist",
            target_id
        )));
    };
    let feeds = primary_feeds(draw, target_id, target_round)?;
    let Some(feed) = feeds.iter().find(|f| std::ptr::eq(f.link, link)) else {
        return Ok(None);
    };
    let index = feed.offset + slot_index(link.target.feed_profile, source_position, feed.count)?;
    let slots = link_fed_slots(target, target_round);
    match slots.into_iter().nth(index) {
        Some(slot) => Ok(Some((target.structure_id.clone(), slot))),
        None => Err(DrawError::invalid(format!(
            "{} round {} has no fed slot {} for link from {}",
            target_id,
            target_round,
            index + 1,
            link.source.structure_id
        ))),
    }
}

/// Slot a FIRST_MATCHUP link sends a loser to, given their first match-up
///
/// The slot is the one the first match-up's own loser route fills, which
/// holds the bye that first match-up produced.
pub fn first_matchup_slot(
    draw: &DrawDefinition,
    link: &Link,
    first: &MatchUp,
) -> Result<Option<(String, FedSlot)>, DrawError> {
    let feeds = primary_feeds(draw, &link.target.structure_id, link.target.round_number)?;
    let primary = feeds.iter().find(|f| {
        f.link.link_type == LinkType::Loser
            && f.link.source.structure_id == first.structure_id
            && f.link.source.round_number == Some(first.round_number)
    });
    match primary {
        Some(feed) => slot_for_source(draw, feed.link, first.round_position),
        None => Ok(None),
    }
}

/// First match-up of a draw position, when it was a BYE in an earlier round
pub fn bye_first_match_up<'a>(
    source: &'a BracketStructure,
    draw_position: u32,
    before_round: u32,
) -> Option<&'a MatchUp> {
    first_match_up_of(source, draw_position)
        .filter(|m| m.match_up_status == MatchUpStatus::Bye && m.round_number < before_round)
}

// ============================================================================
// Resolution
// ============================================================================

fn target_of(m: &MatchUp, side_number: u8) -> TargetSlot {
    TargetSlot {
        match_up_id: m.match_up_id.clone(),
        structure_id: m.structure_id.clone(),
        round_number: m.round_number,
        round_position: m.round_position,
        side_number,
    }
}

fn target_of_slot(draw: &DrawDefinition, structure_id: &str, slot: &FedSlot) -> Option<TargetSlot> {
    let m = draw.match_up(&slot.match_up_id)?;
    Some(TargetSlot {
        match_up_id: slot.match_up_id.clone(),
        structure_id: structure_id.to_string(),
        round_number: m.round_number,
        round_position: slot.round_position,
        side_number: slot.side_number,
    })
}

fn lookup<'a>(draw: &'a DrawDefinition, match_up_id: &str) -> Result<&'a MatchUp, DrawError> {
    if draw.structures.is_empty() {
        return Err(DrawError::MissingDrawDefinition);
    }
    if match_up_id.is_empty() {
        return Err(DrawError::MissingMatchUpId);
    }
    draw.match_up(match_up_id)
        .ok_or_else(|| DrawError::MatchUpNotFound(match_up_id.to_string()))
}

/// Where the winner and loser of a match-up go next
///
/// Group (round-robin) match-ups resolve to nothing: their participants
/// leave the container by group order through POSITION links.
pub fn resolve_targets(draw: &DrawDefinition, match_up_id: &str) -> Result<ResolvedTargets, DrawError> {
    let m = lookup(draw, match_up_id)?;
    if draw.is_group(&m.structure_id) {
        return Ok(ResolvedTargets::default());
    }
    let bracket = draw
        .bracket(&m.structure_id)
        .ok_or_else(|| DrawError::UnlinkedStructures(m.structure_id.clone()))?;
    check_anchored(draw, &bracket.structure_id)?;

    let mut resolved = ResolvedTargets::default();

    match next_in_bracket(bracket, m) {
        Some((round, position, side)) => {
            resolved.winner_target = bracket
                .match_up_at(round, position)
                .map(|next| target_of(next, side));
        }
        None => {
            if let Some(link) = selected_primary(draw, bracket, m.round_number, LinkType::Winner)? {
                resolved.winner_target = slot_for_source(draw, link, m.round_position)?
                    .and_then(|(sid, slot)| target_of_slot(draw, &sid, &slot));
                resolved.winner_link = Some(link.clone());
            }
        }
    }

    let loser = loser_feed(m);
    let loser_first = loser
        .draw_position
        .filter(|_| loser.binding.participant_id().is_some())
        .and_then(|dp| bye_first_match_up(bracket, dp, m.round_number));

    let loser_link = select_link(
        draw,
        &bracket.structure_id,
        m.round_number,
        LinkType::Loser,
        round_range(bracket, m.round_number, LinkType::Loser),
        |l| match l.link_condition {
            None => true,
            Some(LinkCondition::FirstMatchup) => loser_first.is_some(),
        },
    )?;

    if let Some(link) = loser_link {
        let slot = match (link.link_condition, loser_first) {
            (Some(LinkCondition::FirstMatchup), Some(first)) => first_matchup_slot(draw, link, first)?,
            _ => slot_for_source(draw, link, m.round_position)?,
        };
        resolved.loser_target = slot.and_then(|(sid, slot)| target_of_slot(draw, &sid, &slot));
        resolved.loser_link = Some(link.clone());
    }

    Ok(resolved)
}

// ============================================================================
// Dependency edges
// ============================================================================

/// Every match-up whose derived state can depend on `m`
///
/// Edges cover all potential routes, not just the ones the current state
/// uses: FIRST_MATCHUP routes contribute an edge per first-round ancestor.
pub fn downstream_edges(draw: &DrawDefinition, m: &MatchUp) -> Result<Vec<DownstreamEdge>, DrawError> {
    let mut edges = Vec::new();
    if draw.is_group(&m.structure_id) {
        return Ok(edges);
    }
    let Some(bracket) = draw.bracket(&m.structure_id) else {
        return Ok(edges);
    };

    let next = next_in_bracket(bracket, m);
    if let Some((round, position, _)) = next {
        if let Some(target) = bracket.match_up_at(round, position) {
            edges.push(DownstreamEdge {
                match_up_id: target.match_up_id.clone(),
                kind: EdgeKind::InBracket,
            });
        }
    }

    for link in draw.links_from(&bracket.structure_id) {
        if link.source.round_number != Some(m.round_number) {
            continue;
        }
        match (link.link_type, link.link_condition) {
            (LinkType::Winner, None) | (LinkType::Loser, None) => {
                if link.link_type == LinkType::Winner && next.is_some() {
                    continue;
                }
                if let Some((_, slot)) = slot_for_source(draw, link, m.round_position)? {
                    let kind = if link.link_type == LinkType::Winner {
                        EdgeKind::Winner
                    } else {
                        EdgeKind::Loser
                    };
                    edges.push(DownstreamEdge {
                        match_up_id: slot.match_up_id,
                        kind,
                    });
                }
            }
            (LinkType::Loser, Some(LinkCondition::FirstMatchup)) => {
                for position in first_round_ancestors(bracket, m) {
                    let Some(first) = bracket
                        .round_match_ups(1)
                        .into_iter()
                        .find(|f| f.round_position == position)
                    else {
                        continue;
                    };
                    if let Some((_, slot)) = first_matchup_slot(draw, link, first)? {
                        edges.push(DownstreamEdge {
                            match_up_id: slot.match_up_id,
                            kind: EdgeKind::FirstMatchup,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    let mut seen = std::collections::HashSet::new();
    edges.retain(|e| seen.insert((e.match_up_id.clone(), e.kind)));
    Ok(edges)
}

/// Match-ups fed by POSITION links out of a container
pub fn position_fed_match_ups(draw: &DrawDefinition, container_id: &str) -> Vec<String> {
    let mut ids = Vec::new();
    for link in draw.links_from(container_id) {
        if link.link_type != LinkType::Position {
            continue;
        }
        if let Some(Structure::Bracket(target)) = draw.structure(&link.target.structure_id) {
            for m in target.round_match_ups(link.target.round_number) {
                if !ids.contains(&m.match_up_id) {
                    ids.push(m.match_up_id.clone());
                }
            }
        }
    }
    ids
}
