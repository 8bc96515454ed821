//! Consolation Tests - Losers Crossing Into a Linked Structure
//!
//! Uses the first-match-loser consolation fixture: round 1 losers of an
//! 8-draw enter a 4-draw consolation, and a round 2 loser whose first
//! match-up was a bye takes the slot that bye left behind.
//!
//! Critical invariants tested:
//! - Loser routes carry exits and participants across structures
//! - Notification covers every changed match-up in both structures
//! - FIRST_MATCHUP replacement happens only when the loser's first
//!   match-up was a bye, and is undone when the result is cleared
//! - A consolation pairing completed by a replacement blocks the clear

use draw_progression_core_rs::mocks::{self, participant, CONSOLATION, MAIN};
use draw_progression_core_rs::{
    state_digest, DrawEngine, DrawError, LinkCondition, MatchUp, MatchUpStatus, Outcome,
    PropagationOptions, SideBinding,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn consolation_engine(byes: &[u32]) -> DrawEngine {
    DrawEngine::from_draw(
        mocks::first_match_loser_consolation(8, byes),
        PropagationOptions::default(),
    )
    .unwrap()
}

fn id_in(engine: &DrawEngine, structure: &str, round: u32, position: u32) -> String {
    engine.match_up_id_at(structure, round, position).unwrap()
}

fn match_up_in(engine: &DrawEngine, structure: &str, round: u32, position: u32) -> MatchUp {
    engine
        .draw()
        .unwrap()
        .match_up_at(structure, round, position)
        .unwrap()
        .clone()
}

fn apply_main(engine: &mut DrawEngine, round: u32, position: u32, outcome: Outcome) -> Vec<String> {
    let id = id_in(engine, MAIN, round, position);
    engine
        .apply_outcome(&id, &outcome)
        .unwrap()
        .updated_ids()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn holds(binding: &SideBinding, draw_position: u32) -> bool {
    binding.participant_id() == Some(participant(draw_position).as_str())
}

// ============================================================================
// Loser routes
// ============================================================================

#[test]
fn test_double_walkover_reaches_the_consolation() {
    let mut engine = consolation_engine(&[]);

    let changed = apply_main(&mut engine, 1, 1, Outcome::double_walkover());
    assert_eq!(
        changed,
        vec![
            id_in(&engine, MAIN, 1, 1),
            id_in(&engine, MAIN, 2, 1),
            id_in(&engine, CONSOLATION, 1, 1),
        ]
    );

    let consolation = match_up_in(&engine, CONSOLATION, 1, 1);
    assert_eq!(consolation.match_up_status, MatchUpStatus::Walkover);
    assert!(consolation.sides[0].binding.exit_kind().is_some());
    assert_eq!(consolation.winning_side, None);
}

/// Draw of 8 with a 4-draw consolation. The double walkover changes three
/// match-ups (main R1P1 and R2P1, consolation R1P1). The sibling win then
/// changes five: main R1P2, main R2P1 (produced walkover, winner side 2),
/// main R3P1 (receives that winner), consolation R1P1 (the loser meets the
/// exited slot and wins by walkover) and consolation R2P1 (receives it).
#[test]
fn test_sibling_win_updates_both_structures() {
    let mut engine = consolation_engine(&[]);
    let first = apply_main(&mut engine, 1, 1, Outcome::double_walkover());

    let second = apply_main(&mut engine, 1, 2, Outcome::completed(1, "6-4 6-4"));
    assert_eq!(
        second,
        vec![
            id_in(&engine, MAIN, 1, 2),
            id_in(&engine, MAIN, 2, 1),
            id_in(&engine, MAIN, 3, 1),
            id_in(&engine, CONSOLATION, 1, 1),
            id_in(&engine, CONSOLATION, 2, 1),
        ]
    );
    assert_eq!(first.len() + second.len(), 8);

    let main_semi = match_up_in(&engine, MAIN, 2, 1);
    assert_eq!(main_semi.match_up_status, MatchUpStatus::Walkover);
    assert_eq!(main_semi.winning_side, Some(2));
    assert_eq!(main_semi.draw_positions, vec![3]);

    let consolation = match_up_in(&engine, CONSOLATION, 1, 1);
    assert_eq!(consolation.match_up_status, MatchUpStatus::Walkover);
    assert_eq!(consolation.winning_side, Some(2));
    assert!(holds(&consolation.sides[1].binding, 4));

    let consolation_semi = match_up_in(&engine, CONSOLATION, 2, 1);
    assert!(holds(&consolation_semi.sides[0].binding, 4));
}

#[test]
fn test_consolation_assignments_follow_the_losers() {
    let mut engine = consolation_engine(&[]);
    apply_main(&mut engine, 1, 3, Outcome::completed(2, "6-4 6-4"));

    let draw = engine.draw().unwrap();
    let consolation = draw.bracket(CONSOLATION).unwrap();
    let assignment = consolation.assignment(3).unwrap();
    assert_eq!(assignment.participant_id.as_deref(), Some("P5"));

    let targets = engine
        .resolve_targets(&id_in(&engine, MAIN, 1, 3))
        .unwrap();
    let loser = targets.loser_target.unwrap();
    assert_eq!(loser.structure_id, CONSOLATION);
    assert_eq!((loser.round_number, loser.round_position, loser.side_number), (1, 2, 1));
}

// ============================================================================
// FIRST_MATCHUP replacement
// ============================================================================

/// Position 2 is a bye, so P1 reaches round 2 without playing.
fn bye_first_engine() -> DrawEngine {
    let mut engine = consolation_engine(&[2]);
    apply_main(&mut engine, 1, 2, Outcome::completed(1, "6-1 6-1"));
    engine
}

#[test]
fn test_bye_leaves_a_bye_in_the_consolation() {
    let engine = bye_first_engine();

    let consolation = match_up_in(&engine, CONSOLATION, 1, 1);
    assert_eq!(consolation.match_up_status, MatchUpStatus::Bye);
    assert_eq!(consolation.sides[0].binding, SideBinding::Bye);
    assert!(holds(&consolation.sides[1].binding, 4));

    let consolation_semi = match_up_in(&engine, CONSOLATION, 2, 1);
    assert!(holds(&consolation_semi.sides[0].binding, 4));
}

#[test]
fn test_round_two_loser_replaces_the_bye() {
    let mut engine = bye_first_engine();
    let semi_id = id_in(&engine, MAIN, 2, 1);

    let changed = apply_main(&mut engine, 2, 1, Outcome::completed(2, "6-3 6-3"));
    assert_eq!(
        changed,
        vec![
            semi_id.clone(),
            id_in(&engine, MAIN, 3, 1),
            id_in(&engine, CONSOLATION, 1, 1),
            id_in(&engine, CONSOLATION, 2, 1),
        ]
    );

    let consolation = match_up_in(&engine, CONSOLATION, 1, 1);
    assert_eq!(consolation.match_up_status, MatchUpStatus::ToBePlayed);
    assert!(holds(&consolation.sides[0].binding, 1));
    assert!(holds(&consolation.sides[1].binding, 4));
    assert_eq!(
        match_up_in(&engine, CONSOLATION, 2, 1).sides[0].binding,
        SideBinding::Unresolved
    );

    let targets = engine.resolve_targets(&semi_id).unwrap();
    let link = targets.loser_link.unwrap();
    assert_eq!(link.link_condition, Some(LinkCondition::FirstMatchup));
    let slot = targets.loser_target.unwrap();
    assert_eq!(slot.match_up_id, id_in(&engine, CONSOLATION, 1, 1));
    assert_eq!(slot.side_number, 1);
}

#[test]
fn test_populated_consolation_pairing_blocks_clearing_the_round_two_loss() {
    let mut engine = bye_first_engine();
    apply_main(&mut engine, 2, 1, Outcome::completed(2, "6-3 6-3"));
    let before = state_digest(engine.draw().unwrap()).unwrap();

    let semi_id = id_in(&engine, MAIN, 2, 1);
    let err = engine.apply_outcome(&semi_id, &Outcome::clear()).unwrap_err();
    assert!(matches!(err, DrawError::IncompatibleMatchUpStatus(_)));
    assert_eq!(state_digest(engine.draw().unwrap()).unwrap(), before);
}

/// P1 has a bye and P3 beats P4 by walkover, so the consolation slot P1
/// may take holds a bye facing an exit.
fn bye_facing_exit_engine() -> DrawEngine {
    let mut engine = consolation_engine(&[2]);
    apply_main(&mut engine, 1, 2, Outcome::walkover(1));
    engine
}

#[test]
fn test_clearing_the_round_two_loss_restores_the_bye() {
    let mut engine = bye_facing_exit_engine();
    let before = state_digest(engine.draw().unwrap()).unwrap();

    apply_main(&mut engine, 2, 1, Outcome::completed(2, "6-3 6-3"));
    let consolation = match_up_in(&engine, CONSOLATION, 1, 1);
    assert!(holds(&consolation.sides[0].binding, 1));
    assert_eq!(consolation.match_up_status, MatchUpStatus::Walkover);

    apply_main(&mut engine, 2, 1, Outcome::clear());
    let consolation = match_up_in(&engine, CONSOLATION, 1, 1);
    assert_eq!(consolation.sides[0].binding, SideBinding::Bye);
    assert_eq!(state_digest(engine.draw().unwrap()).unwrap(), before);
}

#[test]
fn test_no_replacement_when_first_match_was_played() {
    let mut engine = consolation_engine(&[]);
    apply_main(&mut engine, 1, 1, Outcome::completed(1, "6-1 6-1"));
    apply_main(&mut engine, 1, 2, Outcome::completed(1, "6-1 6-1"));
    let changed = apply_main(&mut engine, 2, 1, Outcome::completed(1, "6-2 6-2"));

    assert!(!changed.contains(&id_in(&engine, CONSOLATION, 1, 1)));
    let targets = engine
        .resolve_targets(&id_in(&engine, MAIN, 2, 1))
        .unwrap();
    assert!(targets.loser_target.is_none());
}

#[test]
fn test_played_consolation_blocks_clearing_the_main_result() {
    let mut engine = bye_first_engine();
    apply_main(&mut engine, 2, 1, Outcome::completed(2, "6-3 6-3"));

    let consolation_id = id_in(&engine, CONSOLATION, 1, 1);
    engine
        .apply_outcome(&consolation_id, &Outcome::completed(1, "6-0 6-0"))
        .unwrap();

    let semi_id = id_in(&engine, MAIN, 2, 1);
    assert!(engine.is_active_downstream(&semi_id).unwrap());
    assert!(engine.apply_outcome(&semi_id, &Outcome::clear()).is_err());
}
