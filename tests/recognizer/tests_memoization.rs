//! Memoized speculation gives the same parses as unmemoized speculation.

use llstar::recognizer::{Recognize, RecognizerOptions};
use rstest::rstest;

use crate::helpers::calc::Calc;
use crate::helpers::fixtures::lex;

/// Tree, diagnostic codes and memo size of one parse.
fn run(source: &str, memoize: bool) -> (String, Vec<String>, usize) {
    let options = RecognizerOptions::default().with_memoize(memoize);
    let mut calc = Calc::with_options(lex(source), options);
    let root = calc.prog().expect("recovers");
    let codes = calc
        .parser
        .diagnostics()
        .iter()
        .map(|d| d.code.to_string())
        .collect();
    (calc.tree_string(root), codes, calc.state().memo_size())
}

#[rstest]
#[case("(a) b;")]
#[case("(a + b);")]
#[case("(a) (b) c + 1;")]
#[case("((a + b) + c);")]
#[case("x = (a) ((b)) + (c + d);")]
#[case("(a) ) b; y;")]
fn test_memoized_parse_matches_plain_parse(#[case] source: &str) {
    let (plain_tree, plain_codes, plain_memo) = run(source, false);
    let (memo_tree, memo_codes, memo_size) = run(source, true);
    assert_eq!(plain_tree, memo_tree);
    assert_eq!(plain_codes, memo_codes);
    assert_eq!(plain_memo, 0);
    assert!(memo_size > 0);
}

#[test]
fn test_memo_is_only_filled_while_speculating() {
    // No decision here needs full simulation.
    let (tree, codes, memo_size) = run("x = 1 + 2; y;", true);
    assert_eq!(tree, "(= x (+ 1 2)) y");
    assert!(codes.is_empty());
    assert_eq!(memo_size, 0);
}
