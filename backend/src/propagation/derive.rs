//! Match-up derivation
//!
//! Recomputes one match-up from what feeds it. Sides come from three places:
//!
//! - a non-fixed side takes the winner feed of its in-bracket feeder
//! - a fixed side in a linked round takes the feed its link routes there
//!   (with FIRST_MATCHUP losers replacing the bye their first match-up left)
//! - any other fixed side reads its position assignment
//!
//! Status follows from the sides unless a result was entered locally:
//!
//! ```text
//! exited sides = 2          -> DOUBLE_<kind>, no winner
//! exited sides = 1          -> <kind>, winner = the other side if it can advance
//! exited sides = 0, any bye -> BYE
//! otherwise                 -> TO_BE_PLAYED
//! ```
//!
//! The status-code stack gets one entry per exited side, pushed when the
//! side exits and dropped when it no longer does.

use crate::error::DrawError;
use crate::graph::feeds::{loser_feed, winner_feed, SlotFeed};
use crate::graph::targets::{bye_first_match_up, first_matchup_slot, link_fed_slots, primary_feeds};
use crate::graph::topology::{feeder_in_bracket, source_position};
use crate::models::draw::DrawDefinition;
use crate::models::link::{Link, LinkCondition, LinkType};
use crate::models::matchup::{MatchUp, SideBinding, StatusCode};
use crate::models::outcome::PropagationOptions;
use crate::models::status::MatchUpStatus;
use crate::models::structure::BracketStructure;
use tracing::trace;

/// Feed for one side and whether a link delivered it
#[derive(Debug, Clone)]
struct SideFeed {
    feed: SlotFeed,
    link_fed: bool,
}

/// Re-derive one match-up in place
pub fn derive_match_up(
    draw: &mut DrawDefinition,
    match_up_id: &str,
    options: &PropagationOptions,
) -> Result<(), DrawError> {
    let current = draw
        .match_up(match_up_id)
        .cloned()
        .ok_or_else(|| DrawError::MatchUpNotFound(match_up_id.to_string()))?;

    let feeds = [
        side_feed(draw, &current, 1, options)?,
        side_feed(draw, &current, 2, options)?,
    ];

    let mut next = current.clone();
    for (side, side_feed) in next.sides.iter_mut().zip(feeds.iter()) {
        side.binding = side_feed.feed.binding.clone();
        if !side.fixed {
            side.draw_position = side_feed.feed.draw_position;
        }

        let side_number = side.side_number;
        let exited = side.binding.exit_kind().is_some();
        let recorded = next
            .match_up_status_codes
            .iter()
            .any(|code| code.side_number == side_number);
        if exited && !recorded {
            next.match_up_status_codes.push(StatusCode {
                side_number,
                prior_status: current.match_up_status,
                source_status: side_feed.feed.source_status,
            });
        } else if !exited && recorded {
            next.match_up_status_codes
                .retain(|code| code.side_number != side_number);
        }
    }
    next.refresh_draw_positions();
    if !next.result_entered {
        derive_status(&mut next, options);
    }

    trace!(
        match_up = %next.match_up_id,
        status = %next.match_up_status,
        winning_side = ?next.winning_side,
        "derived match-up"
    );

    for (side, side_feed) in next.sides.iter().zip(feeds.iter()) {
        if side_feed.link_fed {
            if let Some(draw_position) = side.draw_position {
                write_assignment(draw, &next.structure_id, draw_position, &side.binding);
            }
        }
    }

    if let Some(slot) = draw.match_up_mut(match_up_id) {
        *slot = next;
    }
    Ok(())
}

/// Status and winner implied by the sides alone
fn derive_status(m: &mut MatchUp, options: &PropagationOptions) {
    let exits: Vec<(u8, _)> = m
        .sides
        .iter()
        .filter_map(|s| s.binding.exit_kind().map(|kind| (s.side_number, kind)))
        .collect();

    m.score = None;
    m.winning_side = None;
    m.match_up_status = match exits.as_slice() {
        [(_, first), (_, second)] => first.combine(*second).double_status(),
        [(exited_side, kind)] => {
            let other = if *exited_side == 1 { 2 } else { 1 };
            let advances = m.side(other).is_some_and(|side| {
                side.binding.is_resolved() || (side.binding.is_bye() && options.bye_advancements)
            });
            if advances {
                m.winning_side = Some(other);
            }
            kind.single_status()
        }
        _ if m.sides.iter().any(|s| s.binding.is_bye()) => MatchUpStatus::Bye,
        _ => MatchUpStatus::ToBePlayed,
    };
}

fn side_feed(
    draw: &DrawDefinition,
    m: &MatchUp,
    side_number: u8,
    options: &PropagationOptions,
) -> Result<SideFeed, DrawError> {
    let side = m
        .side(side_number)
        .ok_or_else(|| DrawError::invalid(format!("invalid side number {}", side_number)))?;
    let bracket = draw
        .bracket(&m.structure_id)
        .ok_or_else(|| DrawError::UnlinkedStructures(m.structure_id.clone()))?;

    if !side.fixed {
        let feed = match feeder_in_bracket(bracket, m, side_number) {
            Some(feeder) => winner_feed(feeder, options),
            None => SlotFeed::unresolved(),
        };
        return Ok(SideFeed {
            feed,
            link_fed: false,
        });
    }

    if let Some(feed) = link_feed(draw, bracket, m, side_number, options)? {
        return Ok(SideFeed {
            feed,
            link_fed: true,
        });
    }

    let binding = match side.draw_position.and_then(|dp| bracket.assignment(dp)) {
        Some(a) => match &a.participant_id {
            Some(participant_id) => SideBinding::Participant {
                participant_id: participant_id.clone(),
            },
            None if a.bye => SideBinding::Bye,
            None if a.qualifier => SideBinding::Placeholder,
            None => SideBinding::Unresolved,
        },
        None => SideBinding::Unresolved,
    };
    Ok(SideFeed {
        feed: SlotFeed {
            binding,
            draw_position: side.draw_position,
            source_status: None,
        },
        link_fed: false,
    })
}

/// Feed delivered by links into a fixed side, `None` when no link feeds it
fn link_feed(
    draw: &DrawDefinition,
    bracket: &BracketStructure,
    m: &MatchUp,
    side_number: u8,
    options: &PropagationOptions,
) -> Result<Option<SlotFeed>, DrawError> {
    let inbound = draw.links_into(&bracket.structure_id, m.round_number);
    if inbound.is_empty() {
        return Ok(None);
    }
    let slots = link_fed_slots(bracket, m.round_number);
    let Some(index) = slots
        .iter()
        .position(|s| s.match_up_id == m.match_up_id && s.side_number == side_number)
    else {
        return Ok(None);
    };

    let mut feed = SlotFeed::unresolved();
    for primary in primary_feeds(draw, &bracket.structure_id, m.round_number)? {
        if index >= primary.offset && index < primary.offset + primary.count {
            let position = source_position(
                primary.link.target.feed_profile,
                index - primary.offset,
                primary.count,
            );
            feed = source_feed(draw, primary.link, position, options);
            break;
        }
    }

    for link in inbound {
        if link.link_type != LinkType::Loser
            || link.link_condition != Some(LinkCondition::FirstMatchup)
        {
            continue;
        }
        if let Some(replacement) = first_matchup_feed(draw, link, m, side_number)? {
            feed = replacement;
        }
    }

    Ok(Some(feed))
}

/// Loser routed by a FIRST_MATCHUP link into this exact slot, if any
fn first_matchup_feed(
    draw: &DrawDefinition,
    link: &Link,
    m: &MatchUp,
    side_number: u8,
) -> Result<Option<SlotFeed>, DrawError> {
    let (Some(source), Some(round)) = (
        draw.bracket(&link.source.structure_id),
        link.source.round_number,
    ) else {
        return Ok(None);
    };
    for source_match_up in source.round_match_ups(round) {
        let loser = loser_feed(source_match_up);
        let Some(draw_position) = loser
            .draw_position
            .filter(|_| loser.binding.participant_id().is_some())
        else {
            continue;
        };
        let Some(first) = bye_first_match_up(source, draw_position, round) else {
            continue;
        };
        if let Some((_, slot)) = first_matchup_slot(draw, link, first)? {
            if slot.match_up_id == m.match_up_id && slot.side_number == side_number {
                return Ok(Some(loser));
            }
        }
    }
    Ok(None)
}

/// Feed for one source position of a primary link
fn source_feed(
    draw: &DrawDefinition,
    link: &Link,
    position: u32,
    options: &PropagationOptions,
) -> SlotFeed {
    match link.link_type {
        LinkType::Winner | LinkType::Loser => {
            let source = link
                .source
                .round_number
                .and_then(|round| draw.match_up_at(&link.source.structure_id, round, position));
            match source {
                Some(s) if link.link_type == LinkType::Winner => winner_feed(s, options),
                Some(s) => loser_feed(s),
                None => SlotFeed::unresolved(),
            }
        }
        LinkType::Position => group_finisher(draw, link, position),
    }
}

/// Group finisher at one index of a POSITION link
///
/// Finishers are ordered by finishing position, then by group.
fn group_finisher(draw: &DrawDefinition, link: &Link, position: u32) -> SlotFeed {
    let Some(container) = draw.container(&link.source.structure_id) else {
        return SlotFeed::unresolved();
    };
    let mut finishing: Vec<u32> = link.source.finishing_positions.clone().unwrap_or_default();
    finishing.sort_unstable();

    let group_count = container.structures.len();
    if group_count == 0 || position == 0 {
        return SlotFeed::unresolved();
    }
    let index = position as usize - 1;
    let (Some(order), Some(group)) = (
        finishing.get(index / group_count),
        container.structures.get(index % group_count),
    ) else {
        return SlotFeed::unresolved();
    };

    if *order as usize > group.position_assignments.len() {
        return SlotFeed::bye();
    }
    let finisher = group
        .position_assignments
        .iter()
        .find(|a| a.group_order == Some(*order))
        .and_then(|a| a.participant_id.clone());
    match finisher {
        Some(participant_id) => SlotFeed {
            binding: SideBinding::Participant { participant_id },
            draw_position: None,
            source_status: None,
        },
        None => SlotFeed::unresolved(),
    }
}

/// Mirror a link-fed binding onto the target structure's assignment
fn write_assignment(
    draw: &mut DrawDefinition,
    structure_id: &str,
    draw_position: u32,
    binding: &SideBinding,
) {
    let Some(bracket) = draw.bracket_mut(structure_id) else {
        return;
    };
    let assignment = bracket.assignment_mut(draw_position);
    match binding {
        SideBinding::Participant { participant_id } => {
            assignment.participant_id = Some(participant_id.clone());
            assignment.bye = false;
        }
        SideBinding::Bye => {
            assignment.participant_id = None;
            assignment.bye = true;
        }
        _ => {
            assignment.participant_id = None;
            assignment.bye = false;
        }
    }
}
