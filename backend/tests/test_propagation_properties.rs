//! Propagation Property Tests - Arbitrary Results Anywhere in a Draw
//!
//! Drives draws of 8 (plain elimination, and a first-match-loser
//! consolation with and without a bye) with random sequences of outcomes
//! on any match-up of any round or structure: completions, walkovers,
//! defaults, double exits, matches under way and clears. Calls the engine
//! refuses are part of the sequence.
//!
//! Critical invariants tested:
//! - A refused call leaves the draw byte for byte as it was
//! - Re-entering the current outcome is a no-op
//! - Entering and clearing an outcome restores the draw byte for byte
//!   whenever the clear is allowed
//! - The derived bracket does not depend on the order results arrive in
//! - Each call reports exactly the match-ups it changed

use draw_progression_core_rs::mocks::{self, CONSOLATION, MAIN};
use draw_progression_core_rs::{
    state_digest, DrawDefinition, DrawEngine, DrawError, MatchUpStatus, Outcome,
    PropagationOptions, Side,
};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::BTreeMap;

// ============================================================================
// Test Helpers
// ============================================================================

const CLEAR: u8 = 6;

fn outcome_for(code: u8) -> Outcome {
    match code {
        0 => Outcome::completed(1, "6-4 6-4"),
        1 => Outcome::completed(2, "4-6 4-6"),
        2 => Outcome::walkover(1),
        3 => Outcome::defaulted(2),
        4 => Outcome::double_walkover(),
        5 => Outcome::double_default(),
        7 => Outcome::new(MatchUpStatus::InProgress),
        _ => Outcome::clear(),
    }
}

fn fixture(kind: usize) -> DrawDefinition {
    match kind {
        0 => mocks::elimination(8),
        1 => mocks::first_match_loser_consolation(8, &[]),
        _ => mocks::first_match_loser_consolation(8, &[2]),
    }
}

fn engine_for(draw: DrawDefinition) -> DrawEngine {
    DrawEngine::from_draw(draw, PropagationOptions::default()).unwrap()
}

/// Match-up ids of the draw in structure, round and position order
fn match_up_ids(engine: &DrawEngine) -> Vec<String> {
    let mut ids = Vec::new();
    for structure in [MAIN, CONSOLATION] {
        for round in 1..=3 {
            for position in 1..=4 {
                if let Some(id) = engine.match_up_id_at(structure, round, position) {
                    ids.push(id);
                }
            }
        }
    }
    ids
}

fn apply(engine: &mut DrawEngine, index: usize, code: u8) -> Result<Vec<String>, DrawError> {
    let ids = match_up_ids(engine);
    let id = ids[index % ids.len()].clone();
    engine.apply_outcome(&id, &outcome_for(code)).map(|result| {
        result
            .updated_ids()
            .into_iter()
            .map(str::to_string)
            .collect()
    })
}

fn digest(engine: &DrawEngine) -> String {
    state_digest(engine.draw().unwrap()).unwrap()
}

/// Apply every step; refused steps must leave the draw untouched
fn replay(engine: &mut DrawEngine, history: &[(usize, u8)]) -> Result<(), TestCaseError> {
    for (index, code) in history {
        let before = digest(engine);
        if apply(engine, *index, *code).is_err() {
            prop_assert_eq!(digest(engine), before);
        }
    }
    Ok(())
}

type Projection = (MatchUpStatus, [Side; 2], Vec<u32>, Option<u8>, Option<String>);

/// Observable fields of every match-up, keyed by id
fn project(engine: &DrawEngine) -> BTreeMap<String, Projection> {
    engine
        .draw()
        .unwrap()
        .all_match_ups()
        .into_iter()
        .map(|m| {
            (
                m.match_up_id.clone(),
                (
                    m.match_up_status,
                    m.sides.clone(),
                    m.draw_positions.clone(),
                    m.winning_side,
                    m.score.clone(),
                ),
            )
        })
        .collect()
}

fn steps() -> impl Strategy<Value = Vec<(usize, u8)>> {
    prop::collection::vec((0usize..32, 0u8..8), 0..16)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_reentering_an_outcome_is_a_no_op(
        kind in 0usize..3,
        history in steps(),
        index in 0usize..32,
        code in 0u8..8,
    ) {
        let mut engine = engine_for(fixture(kind));
        replay(&mut engine, &history)?;

        if apply(&mut engine, index, code).is_ok() {
            let before = digest(&engine);
            let again = apply(&mut engine, index, code);
            prop_assert!(again.is_ok());
            prop_assert!(again.unwrap_or_default().is_empty());
            prop_assert_eq!(digest(&engine), before);
        }
    }

    #[test]
    fn prop_enter_then_clear_restores_the_draw(
        kind in 0usize..3,
        history in steps(),
        index in 0usize..32,
        code in 0u8..8,
    ) {
        let mut engine = engine_for(fixture(kind));
        replay(&mut engine, &history)?;
        if apply(&mut engine, index, CLEAR).is_err() {
            return Ok(());
        }
        let before = digest(&engine);

        if apply(&mut engine, index, code).is_err() {
            prop_assert_eq!(digest(&engine), before);
            return Ok(());
        }
        let entered = digest(&engine);
        match apply(&mut engine, index, CLEAR) {
            Ok(_) => prop_assert_eq!(digest(&engine), before),
            Err(err) => {
                prop_assert!(matches!(err, DrawError::IncompatibleMatchUpStatus(_)));
                prop_assert_eq!(digest(&engine), entered);
            }
        }
    }

    #[test]
    fn prop_arrival_order_does_not_matter(
        kind in 0usize..2,
        results in prop::collection::vec(0u8..6, 4),
        order in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
    ) {
        let draw = fixture(kind);
        let mut in_order = engine_for(draw.clone());
        let mut shuffled = engine_for(draw);

        for index in 0..4usize {
            prop_assert!(apply(&mut in_order, index, results[index]).is_ok());
        }
        for index in &order {
            prop_assert!(apply(&mut shuffled, *index, results[*index]).is_ok());
        }
        prop_assert_eq!(project(&in_order), project(&shuffled));
    }

    #[test]
    fn prop_notification_is_exact(kind in 0usize..3, history in steps()) {
        let mut engine = engine_for(fixture(kind));
        for (index, code) in &history {
            let before = project(&engine);
            let before_digest = digest(&engine);
            match apply(&mut engine, *index, *code) {
                Ok(mut reported) => {
                    let after = project(&engine);
                    let mut changed: Vec<String> = after
                        .iter()
                        .filter(|(id, fields)| before.get(*id) != Some(*fields))
                        .map(|(id, _)| id.clone())
                        .collect();
                    reported.sort();
                    changed.sort();
                    prop_assert_eq!(reported, changed);
                }
                Err(_) => prop_assert_eq!(digest(&engine), before_digest),
            }
        }
    }
}
