//! Prediction against the calculator grammar's decisions.

use llstar::base::Bitset;
use llstar::errors::{ErrorCode, FailureKind, RecognitionError};
use llstar::predict;
use llstar::recognizer::{Recognize, RecognizerOptions};
use llstar::stream::IntStream;

use crate::helpers::calc::{ATOM_DFA, Calc, D_STAT, D_TERM, PROG_LOOP_DFA, STAT_DFA, TERM_DFA};
use crate::helpers::fixtures::{CalcSource, ID, INT, LPAREN, lex};

fn calc(source: &str) -> Calc<CalcSource<'_>> {
    Calc::new(lex(source))
}

fn calc_with(source: &str, options: RecognizerOptions) -> Calc<CalcSource<'_>> {
    Calc::with_options(lex(source), options)
}

/// Cursor, open marks and backtracking depth.
fn position(calc: &mut Calc<CalcSource<'_>>) -> (usize, usize, u32) {
    (
        calc.input().index(),
        calc.input().mark_depth(),
        calc.backtracking(),
    )
}

// =============================================================================
// TABLE WALKS
// =============================================================================

#[test]
fn test_fixed_lookahead_decisions() {
    assert_eq!(predict(&mut calc("x = 1;"), &STAT_DFA).unwrap(), 1);
    assert_eq!(predict(&mut calc("x + 1;"), &STAT_DFA).unwrap(), 2);
    assert_eq!(predict(&mut calc("7;"), &STAT_DFA).unwrap(), 2);
    assert_eq!(predict(&mut calc("x"), &PROG_LOOP_DFA).unwrap(), 1);
    assert_eq!(predict(&mut calc(""), &PROG_LOOP_DFA).unwrap(), 2);
}

#[test]
fn test_packed_decision() {
    assert_eq!(predict(&mut calc("x"), &ATOM_DFA).unwrap(), 1);
    assert_eq!(predict(&mut calc("42"), &ATOM_DFA).unwrap(), 2);
    assert_eq!(predict(&mut calc("(x)"), &ATOM_DFA).unwrap(), 3);
}

#[test]
fn test_no_viable_alternative_lists_expected_tokens() {
    let mut calc = calc(";");
    let err = predict(&mut calc, &STAT_DFA).unwrap_err();
    let failure = err.failure().expect("a recorded failure");
    assert!(matches!(
        failure.kind,
        FailureKind::NoViableAlt { decision: D_STAT, state: 0, .. }
    ));
    assert_eq!(failure.expected, Some(Bitset::of(&[ID, INT, LPAREN])));
    assert_eq!(failure.code(), ErrorCode::E0301);
    assert_eq!(failure.found.text, ";");
    assert_eq!(position(&mut calc), (0, 0, 0));
}

#[test]
fn test_failure_after_lookahead_points_at_offending_token() {
    let mut calc = calc("x )");
    let err = predict(&mut calc, &STAT_DFA).unwrap_err();
    let failure = err.failure().expect("a recorded failure");
    assert!(matches!(failure.kind, FailureKind::NoViableAlt { state: 1, .. }));
    assert_eq!(failure.found.text, ")");
    assert_eq!(position(&mut calc), (0, 0, 0));
}

// =============================================================================
// PREDICATES
// =============================================================================

#[test]
fn test_true_predicate_selects_declaration() {
    let mut calc = calc("int x;");
    assert_eq!(predict(&mut calc, &STAT_DFA).unwrap(), 3);
    assert_eq!(position(&mut calc), (0, 0, 0));
    assert!(calc.speculated.is_empty());
}

#[test]
fn test_false_predicate_takes_fallback() {
    let mut calc = calc("foo x;");
    assert_eq!(predict(&mut calc, &STAT_DFA).unwrap(), 2);
}

#[test]
fn test_predicate_sees_decision_start() {
    // The predicate runs after two tokens of lookahead but must judge `x`.
    let mut calc = calc("x int;");
    assert_eq!(predict(&mut calc, &STAT_DFA).unwrap(), 2);
}

// =============================================================================
// FULL SIMULATION
// =============================================================================

#[test]
fn test_simulation_picks_cast() {
    let mut calc = calc("(a) b;");
    assert_eq!(predict(&mut calc, &TERM_DFA).unwrap(), 1);
    assert_eq!(calc.speculated, vec![(D_TERM, 1)]);
    assert_eq!(position(&mut calc), (0, 0, 0));
}

#[test]
fn test_simulation_falls_through_to_parenthesized_expression() {
    let mut calc = calc("(a + b);");
    assert_eq!(predict(&mut calc, &TERM_DFA).unwrap(), 2);
    assert_eq!(calc.speculated, vec![(D_TERM, 1), (D_TERM, 2)]);
    assert_eq!(position(&mut calc), (0, 0, 0));
    assert!(calc.parser.diagnostics().is_empty());
}

#[test]
fn test_ambiguity_resolves_to_lowest_alternative() {
    let options = RecognizerOptions {
        report_ambiguities: true,
        ..RecognizerOptions::default()
    };
    let mut calc = calc_with("(a) b;", options);
    assert_eq!(predict(&mut calc, &TERM_DFA).unwrap(), 1);
    assert_eq!(calc.speculated, vec![(D_TERM, 1), (D_TERM, 2)]);
}

#[test]
fn test_simulation_leaves_no_trees_or_diagnostics() {
    let mut calc = calc("(a + b);");
    predict(&mut calc, &TERM_DFA).unwrap();
    assert!(calc.parser.adaptor().tree().is_empty());
    assert_eq!(calc.parser.mode(), llstar::Mode::Normal);
}

// =============================================================================
// BOUNDS
// =============================================================================

#[test]
fn test_speculation_depth_bound_disables_simulation() {
    let options = RecognizerOptions {
        max_speculation_depth: 0,
        ..RecognizerOptions::default()
    };
    let mut calc = calc_with("(a + b);", options);
    let err = predict(&mut calc, &TERM_DFA).unwrap_err();
    assert!(matches!(
        err.failure().map(|f| &f.kind),
        Some(FailureKind::NoViableAlt { decision: D_TERM, .. })
    ));
    assert!(calc.speculated.is_empty());
    assert_eq!(position(&mut calc), (0, 0, 0));
}

#[test]
fn test_lookahead_bound() {
    let bounded = |max_lookahead| RecognizerOptions {
        max_lookahead,
        ..RecognizerOptions::default()
    };
    let mut short = calc_with("x = 1;", bounded(1));
    assert!(predict(&mut short, &STAT_DFA).unwrap_err().failure().is_some());
    let mut enough = calc_with("x = 1;", bounded(2));
    assert_eq!(predict(&mut enough, &STAT_DFA).unwrap(), 1);
}

#[test]
fn test_failure_while_backtracking_carries_no_record() {
    let mut calc = calc(";");
    calc.state_mut().backtracking = 1;
    let err = predict(&mut calc, &STAT_DFA).unwrap_err();
    assert_eq!(err, RecognitionError::Backtracking);
    assert!(calc.state().failed);
    assert!(calc.parser.diagnostics().is_empty());
}
