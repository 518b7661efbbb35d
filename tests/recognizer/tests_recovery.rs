//! Recovery on malformed calculator programs.

use llstar::errors::{ErrorCode, Severity};
use llstar::recognizer::{Mode, Recognize, RecognizerOptions};

use crate::helpers::calc::Calc;
use crate::helpers::fixtures::{CalcSource, lex};

fn calc(source: &str) -> Calc<CalcSource<'_>> {
    Calc::new(lex(source))
}

fn codes(calc: &Calc<CalcSource<'_>>) -> Vec<ErrorCode> {
    calc.parser.diagnostics().iter().map(|d| d.code).collect()
}

#[test]
fn test_missing_semicolon_is_inserted() {
    let mut calc = calc("x = 1 y = 2;");
    let root = calc.prog().unwrap();
    assert_eq!(calc.tree_string(root), "(= x 1) (= y 2)");
    assert_eq!(codes(&calc), vec![ErrorCode::E0203]);

    let diagnostic = &calc.parser.diagnostics()[0];
    assert_eq!(diagnostic.message, "missing ';' at 'y'");
    assert_eq!(diagnostic.hint.as_deref(), Some("insert ';'"));
    assert_eq!((diagnostic.line, diagnostic.column), (1, 6));
    assert_eq!(calc.parser.mode(), Mode::Normal);
}

#[test]
fn test_extra_token_is_deleted() {
    let mut calc = calc("x = 1 1;");
    let root = calc.prog().unwrap();
    assert_eq!(calc.tree_string(root), "(= x 1)");
    assert_eq!(codes(&calc), vec![ErrorCode::E0204]);
    assert_eq!(
        calc.parser.diagnostics()[0].hint.as_deref(),
        Some("remove '1'")
    );
}

#[test]
fn test_unrecognizable_statement_resynchronizes() {
    let mut calc = calc("x ) ; y = 2;");
    let root = calc.prog().unwrap();

    // The first attempt reports and resumes at `x` itself; the retry fails
    // on the same token, is suppressed, and skips past it to `y`.
    assert_eq!(codes(&calc), vec![ErrorCode::E0301]);
    assert_eq!(calc.state().error_count(), 1);
    assert!(calc.tree_string(root).ends_with("<error: x ) ;> (= y 2)"));
    assert_eq!(calc.parser.mode(), Mode::Normal);
}

#[test]
fn test_skipped_tokens_are_noted() {
    let mut calc = calc("x = ) ) 1; y;");
    let root = calc.prog().unwrap();
    let diagnostics = calc.parser.diagnostics();
    assert_eq!(diagnostics[0].code, ErrorCode::E0301);
    let note = diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::E0901)
        .expect("a resynchronization note");
    assert_eq!(note.severity, Severity::Hint);
    assert!(note.message.starts_with("skipped "));
    assert!(calc.tree_string(root).ends_with('y'));
}

#[test]
fn test_unlexable_input_is_skipped_inside_operand() {
    let mut calc = calc("x = $ 1;");
    let root = calc.prog().unwrap();
    // `$` cannot start a term; the term becomes an error node and the
    // leftover `1` is dropped without a second report.
    assert_eq!(codes(&calc), vec![ErrorCode::E0301, ErrorCode::E0901]);
    assert_eq!(calc.state().error_count(), 1);
    assert_eq!(calc.tree_string(root), "(= x <error: $>)");
}

#[test]
fn test_error_budget_escalates() {
    let options = RecognizerOptions::default().with_max_errors(0);
    let mut calc = Calc::with_options(lex("x = 1 y = 2;"), options);
    let err = calc.prog().unwrap_err();
    assert_eq!(err.failure().map(|f| f.code()), Some(ErrorCode::E0203));
    assert_eq!(codes(&calc), vec![ErrorCode::E0203, ErrorCode::E0902]);
    assert_eq!(calc.parser.mode(), Mode::Failed);
}

#[test]
fn test_budget_allows_errors_up_to_limit() {
    let options = RecognizerOptions::default().with_max_errors(2);
    let mut calc = Calc::with_options(lex("x = 1 y = 2 z = 3;"), options);
    assert!(calc.prog().is_ok());
    assert_eq!(codes(&calc), vec![ErrorCode::E0203, ErrorCode::E0203]);
}

#[test]
fn test_without_repairs_every_mismatch_resynchronizes() {
    let mut calc = Calc::with_options(lex("x = 1 y = 2;"), RecognizerOptions::without_repairs());
    let root = calc.prog().unwrap();
    assert_eq!(codes(&calc), vec![ErrorCode::E0201]);
    assert!(calc.tree_string(root).ends_with("(= y 2)"));
}
