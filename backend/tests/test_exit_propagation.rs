//! Exit Propagation Tests - Walkovers, Defaults and Byes Through a Bracket
//!
//! Critical invariants tested:
//! - A double exit sends an exited slot to the winner target
//! - A produced exit advances the opposing side once it is known
//! - Two exits meeting produce a double exit, whose kind combines both
//! - Clearing the origin reverses every produced consequence
//! - Bye handling follows `PropagationOptions`, never ambient state

use draw_progression_core_rs::mocks::{self, participant, MAIN};
use draw_progression_core_rs::{
    DrawDefinition, DrawEngine, ExitKind, MatchUp, MatchUpStatus, Outcome, PropagationOptions,
    SideBinding,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn engine_with(draw: DrawDefinition, options: PropagationOptions) -> DrawEngine {
    DrawEngine::from_draw(draw, options).unwrap()
}

fn engine_for(draw: DrawDefinition) -> DrawEngine {
    engine_with(draw, PropagationOptions::default())
}

fn id_at(engine: &DrawEngine, round: u32, position: u32) -> String {
    engine.match_up_id_at(MAIN, round, position).unwrap()
}

fn match_up_at(engine: &DrawEngine, round: u32, position: u32) -> MatchUp {
    engine
        .draw()
        .unwrap()
        .match_up_at(MAIN, round, position)
        .unwrap()
        .clone()
}

fn apply(engine: &mut DrawEngine, round: u32, position: u32, outcome: Outcome) -> Vec<String> {
    let id = id_at(engine, round, position);
    let result = engine.apply_outcome(&id, &outcome).unwrap();
    result
        .updated_ids()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn holds(binding: &SideBinding, draw_position: u32) -> bool {
    binding.participant_id() == Some(participant(draw_position).as_str())
}

// ============================================================================
// Draw of 4
// ============================================================================

#[test]
fn test_double_walkover_produces_walkover_without_winner() {
    let mut engine = engine_for(mocks::elimination(4));

    let changed = apply(&mut engine, 1, 1, Outcome::double_walkover());
    assert_eq!(changed, vec![id_at(&engine, 1, 1), id_at(&engine, 2, 1)]);

    let final_match = match_up_at(&engine, 2, 1);
    assert_eq!(final_match.match_up_status, MatchUpStatus::Walkover);
    assert_eq!(final_match.winning_side, None);
    assert!(final_match.draw_positions.is_empty());
    assert_eq!(
        final_match.sides[0].binding,
        SideBinding::Exited {
            exit_kind: ExitKind::Walkover
        }
    );
    assert_eq!(final_match.match_up_status_codes.len(), 1);
    let code = &final_match.match_up_status_codes[0];
    assert_eq!(code.side_number, 1);
    assert_eq!(code.prior_status, MatchUpStatus::ToBePlayed);
    assert_eq!(code.source_status, Some(MatchUpStatus::DoubleWalkover));
    assert!(final_match.is_produced());
}

#[test]
fn test_produced_walkover_advances_the_known_side() {
    let mut engine = engine_for(mocks::elimination(4));
    apply(&mut engine, 1, 1, Outcome::double_walkover());

    let changed = apply(&mut engine, 1, 2, Outcome::completed(1, "6-1 6-2"));
    assert_eq!(changed.len(), 2);

    let final_match = match_up_at(&engine, 2, 1);
    assert_eq!(final_match.match_up_status, MatchUpStatus::Walkover);
    assert_eq!(final_match.winning_side, Some(2));
    assert_eq!(final_match.draw_positions, vec![3]);
    assert!(holds(&final_match.sides[1].binding, 3));
}

#[test]
fn test_clearing_double_walkover_reverts_the_final() {
    let mut engine = engine_for(mocks::elimination(4));
    apply(&mut engine, 1, 1, Outcome::double_walkover());
    apply(&mut engine, 1, 2, Outcome::completed(1, "6-1 6-2"));

    let changed = apply(&mut engine, 1, 1, Outcome::clear());
    assert_eq!(changed, vec![id_at(&engine, 1, 1), id_at(&engine, 2, 1)]);

    let first = match_up_at(&engine, 1, 1);
    assert_eq!(first.match_up_status, MatchUpStatus::ToBePlayed);
    assert!(holds(&first.sides[0].binding, 1));
    assert!(holds(&first.sides[1].binding, 2));

    let final_match = match_up_at(&engine, 2, 1);
    assert_eq!(final_match.match_up_status, MatchUpStatus::ToBePlayed);
    assert_eq!(final_match.draw_positions, vec![3]);
    assert_eq!(final_match.winning_side, None);
    assert!(final_match.match_up_status_codes.is_empty());
    assert_eq!(final_match.sides[0].binding, SideBinding::Unresolved);
}

#[test]
fn test_single_walkover_advances_the_winner() {
    let mut engine = engine_for(mocks::elimination(4));
    apply(&mut engine, 1, 1, Outcome::walkover(2));

    let first = match_up_at(&engine, 1, 1);
    assert_eq!(first.match_up_status, MatchUpStatus::Walkover);
    assert_eq!(first.winning_side, Some(2));

    let final_match = match_up_at(&engine, 2, 1);
    assert_eq!(final_match.match_up_status, MatchUpStatus::ToBePlayed);
    assert_eq!(final_match.draw_positions, vec![2]);
    assert_eq!(final_match.sides[0].draw_position, Some(2));
    assert!(holds(&final_match.sides[0].binding, 2));
}

#[test]
fn test_double_default_produces_defaulted() {
    let mut engine = engine_for(mocks::elimination(4));
    apply(&mut engine, 1, 1, Outcome::double_default());

    let final_match = match_up_at(&engine, 2, 1);
    assert_eq!(final_match.match_up_status, MatchUpStatus::Defaulted);
    assert_eq!(final_match.winning_side, None);
}

#[test]
fn test_mixed_double_exits_combine_to_walkover() {
    let mut engine = engine_for(mocks::elimination(4));
    apply(&mut engine, 1, 1, Outcome::double_default());
    apply(&mut engine, 1, 2, Outcome::double_walkover());

    let final_match = match_up_at(&engine, 2, 1);
    assert_eq!(final_match.match_up_status, MatchUpStatus::DoubleWalkover);
    assert_eq!(final_match.match_up_status_codes.len(), 2);
}

#[test]
fn test_reentering_the_same_outcome_changes_nothing() {
    let mut engine = engine_for(mocks::elimination(4));
    apply(&mut engine, 1, 1, Outcome::double_walkover());
    let again = apply(&mut engine, 1, 1, Outcome::double_walkover());
    assert!(again.is_empty());
}

// ============================================================================
// Draw of 8
// ============================================================================

#[test]
fn test_sibling_double_walkovers_chain_to_the_final() {
    let mut engine = engine_for(mocks::elimination(8));

    let first = apply(&mut engine, 1, 1, Outcome::double_walkover());
    assert_eq!(first.len(), 2);
    assert_eq!(match_up_at(&engine, 3, 1).match_up_status, MatchUpStatus::ToBePlayed);

    let second = apply(&mut engine, 1, 2, Outcome::double_walkover());
    assert_eq!(
        second,
        vec![id_at(&engine, 1, 2), id_at(&engine, 2, 1), id_at(&engine, 3, 1)]
    );

    let semi = match_up_at(&engine, 2, 1);
    assert_eq!(semi.match_up_status, MatchUpStatus::DoubleWalkover);
    assert_eq!(semi.winning_side, None);

    let final_match = match_up_at(&engine, 3, 1);
    assert_eq!(final_match.match_up_status, MatchUpStatus::Walkover);
    assert_eq!(final_match.winning_side, None);
    assert!(final_match.draw_positions.is_empty());
}

#[test]
fn test_produced_final_walkover_goes_to_other_half_winner() {
    let mut engine = engine_for(mocks::elimination(8));
    apply(&mut engine, 1, 1, Outcome::double_walkover());
    apply(&mut engine, 1, 2, Outcome::double_walkover());
    apply(&mut engine, 1, 3, Outcome::completed(1, "6-3 6-3"));
    apply(&mut engine, 1, 4, Outcome::completed(1, "7-5 6-4"));

    let semi = match_up_at(&engine, 2, 2);
    assert_eq!(semi.draw_positions, vec![5, 7]);
    assert_eq!(
        match_up_at(&engine, 3, 1).match_up_status,
        MatchUpStatus::Walkover
    );

    apply(&mut engine, 2, 2, Outcome::completed(1, "6-2 6-2"));
    let final_match = match_up_at(&engine, 3, 1);
    assert_eq!(final_match.match_up_status, MatchUpStatus::Walkover);
    assert_eq!(final_match.winning_side, Some(2));
    assert_eq!(final_match.draw_positions, vec![5]);
}

#[test]
fn test_clearing_one_sibling_unwinds_the_chain() {
    let mut engine = engine_for(mocks::elimination(8));
    apply(&mut engine, 1, 1, Outcome::double_walkover());
    apply(&mut engine, 1, 2, Outcome::double_walkover());
    apply(&mut engine, 1, 3, Outcome::completed(1, "6-3 6-3"));
    apply(&mut engine, 1, 4, Outcome::completed(1, "7-5 6-4"));
    apply(&mut engine, 2, 2, Outcome::completed(1, "6-2 6-2"));

    let changed = apply(&mut engine, 1, 2, Outcome::clear());
    assert_eq!(
        changed,
        vec![id_at(&engine, 1, 2), id_at(&engine, 2, 1), id_at(&engine, 3, 1)]
    );

    let semi = match_up_at(&engine, 2, 1);
    assert_eq!(semi.match_up_status, MatchUpStatus::Walkover);
    assert_eq!(semi.winning_side, None);

    let final_match = match_up_at(&engine, 3, 1);
    assert_eq!(final_match.match_up_status, MatchUpStatus::ToBePlayed);
    assert_eq!(final_match.sides[0].binding, SideBinding::Unresolved);
    assert_eq!(final_match.draw_positions, vec![5]);
    assert!(final_match.match_up_status_codes.is_empty());
}

#[test]
fn test_walkover_winner_meets_exit_and_advances() {
    let mut engine = engine_for(mocks::elimination(8));
    apply(&mut engine, 1, 1, Outcome::walkover(2));
    apply(&mut engine, 1, 2, Outcome::double_walkover());

    let semi = match_up_at(&engine, 2, 1);
    assert_eq!(semi.match_up_status, MatchUpStatus::Walkover);
    assert_eq!(semi.winning_side, Some(1));
    assert!(holds(&semi.sides[0].binding, 2));

    let final_match = match_up_at(&engine, 3, 1);
    assert_eq!(final_match.match_up_status, MatchUpStatus::ToBePlayed);
    assert_eq!(final_match.sides[0].draw_position, Some(2));
}

// ============================================================================
// Byes
// ============================================================================

#[test]
fn test_bye_winner_takes_walkover_from_exit() {
    let mut engine = engine_for(mocks::elimination_with_byes(4, &[2]));
    let first = match_up_at(&engine, 1, 1);
    assert_eq!(first.match_up_status, MatchUpStatus::Bye);
    assert_eq!(match_up_at(&engine, 2, 1).draw_positions, vec![1]);

    apply(&mut engine, 1, 2, Outcome::double_walkover());
    let final_match = match_up_at(&engine, 2, 1);
    assert_eq!(final_match.match_up_status, MatchUpStatus::Walkover);
    assert_eq!(final_match.winning_side, Some(1));
    assert_eq!(final_match.draw_positions, vec![1]);
}

/// Positions 1 and 2 are byes, so the first semi pits a bye against
/// whatever leaves R1P2.
fn exit_facing_bye(options: PropagationOptions) -> DrawEngine {
    let mut engine = engine_with(mocks::elimination_with_byes(8, &[1, 2]), options);
    apply(&mut engine, 1, 2, Outcome::double_walkover());
    engine
}

#[test]
fn test_exit_facing_bye_forwards_an_exit_by_default() {
    let engine = exit_facing_bye(PropagationOptions::default());

    let semi = match_up_at(&engine, 2, 1);
    assert_eq!(semi.match_up_status, MatchUpStatus::Walkover);
    assert_eq!(semi.winning_side, None);

    let final_match = match_up_at(&engine, 3, 1);
    assert!(final_match.sides[0].binding.exit_kind().is_some());
    assert_eq!(final_match.match_up_status, MatchUpStatus::Walkover);
}

#[test]
fn test_exit_facing_bye_can_forward_a_bye() {
    let options = PropagationOptions {
        double_exit_propagates_bye: true,
        ..PropagationOptions::default()
    };
    let engine = exit_facing_bye(options);

    let final_match = match_up_at(&engine, 3, 1);
    assert_eq!(final_match.sides[0].binding, SideBinding::Bye);
    assert_eq!(final_match.match_up_status, MatchUpStatus::Bye);
}

#[test]
fn test_bye_advancements_let_the_bye_win() {
    let options = PropagationOptions {
        bye_advancements: true,
        ..PropagationOptions::default()
    };
    let engine = exit_facing_bye(options);

    let semi = match_up_at(&engine, 2, 1);
    assert_eq!(semi.match_up_status, MatchUpStatus::Walkover);
    assert_eq!(semi.winning_side, Some(1));
    assert_eq!(match_up_at(&engine, 3, 1).sides[0].binding, SideBinding::Bye);
}
