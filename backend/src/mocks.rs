//! Draw fixtures
//!
//! Fixed-shape draws for tests, demos and the CLI: plain elimination,
//! elimination with a first-match-loser consolation, and round-robin groups
//! with an optional playoff. Participants are `P<drawPosition>`; match-up
//! ids are random v4 UUIDs, so look match-ups up by structure, round and
//! position (`DrawDefinition::match_up_at`).
//!
//! These builders never seed or balance anything; they only lay out
//! positions in order.

use crate::models::draw::DrawDefinition;
use crate::models::link::{Link, LinkCondition, LinkType};
use crate::models::matchup::MatchUp;
use crate::models::structure::{
    BracketStructure, ContainerStructure, PositionAssignment, Stage, Structure,
};
use uuid::Uuid;

pub const MAIN: &str = "main";
pub const CONSOLATION: &str = "consolation";
pub const ROUND_ROBIN: &str = "round-robin";
pub const PLAYOFF: &str = "playoff";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Participant id used for a draw position
pub fn participant(draw_position: u32) -> String {
    format!("P{}", draw_position)
}

/// Group bracket id inside the round-robin container (1-based)
pub fn group_id(group: u32) -> String {
    format!("{}-g{}", ROUND_ROBIN, group)
}

/// Halving bracket: round 1 holds every position, each round halves
fn elimination_bracket(structure_id: &str, stage: Stage, draw_size: u32) -> BracketStructure {
    let mut bracket = BracketStructure::new(structure_id, stage);
    bracket.structure_name = structure_id.to_uppercase();

    let mut count = draw_size / 2;
    let mut round = 1;
    while count >= 1 {
        for position in 1..=count {
            let m = MatchUp::new(new_id(), structure_id, round, position);
            let m = if round == 1 {
                m.with_fixed_side(1, position * 2 - 1)
                    .with_fixed_side(2, position * 2)
            } else {
                m
            };
            bracket.match_ups.push(m);
        }
        count /= 2;
        round += 1;
    }
    bracket
}

/// Single elimination with a participant on every position
pub fn elimination(draw_size: u32) -> DrawDefinition {
    elimination_with_byes(draw_size, &[])
}

/// Single elimination with byes on the listed positions
pub fn elimination_with_byes(draw_size: u32, byes: &[u32]) -> DrawDefinition {
    let mut main = elimination_bracket(MAIN, Stage::Main, draw_size);
    main.position_assignments = (1..=draw_size)
        .map(|dp| {
            if byes.contains(&dp) {
                PositionAssignment::bye(dp)
            } else {
                PositionAssignment::participant(dp, participant(dp))
            }
        })
        .collect();

    let mut draw = DrawDefinition::new(new_id());
    draw.structures.push(Structure::Bracket(main));
    draw
}

/// Elimination plus a consolation for first-match losers
///
/// Round 1 losers enter the consolation directly. A participant whose first
/// match-up was a bye and who then loses in round 2 takes the consolation
/// slot their bye left behind.
pub fn first_match_loser_consolation(draw_size: u32, byes: &[u32]) -> DrawDefinition {
    let mut draw = elimination_with_byes(draw_size, byes);

    let consolation_size = draw_size / 2;
    let mut consolation = elimination_bracket(CONSOLATION, Stage::Consolation, consolation_size);
    consolation.finishing_position_offset = draw_size / 2;
    consolation.position_assignments = (1..=consolation_size)
        .map(PositionAssignment::empty)
        .collect();
    draw.structures.push(Structure::Bracket(consolation));

    draw.links
        .push(Link::new(LinkType::Loser, MAIN, 1, CONSOLATION, 1));
    draw.links.push(
        Link::new(LinkType::Loser, MAIN, 2, CONSOLATION, 1)
            .with_condition(LinkCondition::FirstMatchup),
    );
    draw
}

/// Round-robin pairings for one group, by the circle method
///
/// Returns `(round, drawPosition, drawPosition)` triples.
fn circle_pairings(positions: &[u32]) -> Vec<(u32, u32, u32)> {
    let mut slots: Vec<Option<u32>> = positions.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();
    let mut pairings = Vec::new();
    for round in 1..n as u32 {
        for i in 0..n / 2 {
            if let (Some(a), Some(b)) = (slots[i], slots[n - 1 - i]) {
                pairings.push((round, a.min(b), a.max(b)));
            }
        }
        if n > 2 {
            let last = slots.remove(n - 1);
            slots.insert(1, last);
        }
    }
    pairings
}

/// Round-robin container, optionally feeding an elimination playoff
///
/// With a playoff, the top two of every group advance through one POSITION
/// link into a playoff of `2 * group_count` positions.
pub fn round_robin(group_count: u32, group_size: u32, playoff: bool) -> DrawDefinition {
    let mut groups = Vec::new();
    for group in 1..=group_count {
        let id = group_id(group);
        let mut bracket = BracketStructure::new(id.clone(), Stage::Main);
        bracket.structure_name = format!("Group {}", group);

        let first = (group - 1) * group_size + 1;
        let positions: Vec<u32> = (first..first + group_size).collect();
        bracket.position_assignments = positions
            .iter()
            .map(|dp| PositionAssignment::participant(*dp, participant(*dp)))
            .collect();

        let mut per_round = std::collections::BTreeMap::new();
        for (round, a, b) in circle_pairings(&positions) {
            let position = per_round.entry(round).or_insert(0u32);
            *position += 1;
            bracket.match_ups.push(
                MatchUp::new(new_id(), id.clone(), round, *position)
                    .with_fixed_side(1, a)
                    .with_fixed_side(2, b),
            );
        }
        groups.push(bracket);
    }

    let mut draw = DrawDefinition::new(new_id());
    draw.structures.push(Structure::Container(ContainerStructure {
        structure_id: ROUND_ROBIN.to_string(),
        structure_name: "Round Robin".to_string(),
        stage: Stage::Main,
        stage_sequence: 1,
        finishing_position_offset: 0,
        structures: groups,
    }));

    if playoff {
        let size = 2 * group_count;
        let mut bracket = elimination_bracket(PLAYOFF, Stage::Playoff, size);
        bracket.stage_sequence = 2;
        bracket.position_assignments = (1..=size).map(PositionAssignment::empty).collect();
        draw.structures.push(Structure::Bracket(bracket));
        draw.links
            .push(Link::position(ROUND_ROBIN, vec![1, 2], PLAYOFF, 1));
    }
    draw
}
