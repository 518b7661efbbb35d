//! Walking parser output with a tree grammar.

use llstar::base::{DOWN, EOF, UP};
use llstar::errors::ErrorCode;
use llstar::recognizer::{Mode, Recognize};
use llstar::stream::IntStream;
use llstar::tree::TreeNodeStream;

use crate::helpers::calc::Calc;
use crate::helpers::eval::Eval;
use crate::helpers::fixtures::{CalcSource, EQ, ID, INT, PLUS, lex};

fn parsed(source: &str) -> (Calc<CalcSource<'_>>, llstar::tree::NodeId) {
    let mut calc = Calc::new(lex(source));
    let root = calc.prog().unwrap().expect("a tree");
    assert!(calc.parser.diagnostics().is_empty());
    (calc, root)
}

#[test]
fn test_assignment_reads_with_navigation_markers() {
    let (calc, root) = parsed("x = 1 + 2;");
    let mut nodes = TreeNodeStream::new(calc.parser.adaptor().tree(), root);
    let types: Vec<_> = (1..=nodes.len() as isize + 1).map(|i| nodes.la(i)).collect();
    assert_eq!(
        types,
        vec![EQ, DOWN, ID, PLUS, DOWN, INT, INT, UP, UP, EOF]
    );
}

#[test]
fn test_evaluates_program() {
    let (calc, root) = parsed("x = 1 + 2; y = x + 3; x = y + y + 1;");
    let mut eval = Eval::new(TreeNodeStream::new(calc.parser.adaptor().tree(), root));
    eval.prog().unwrap();

    let env: Vec<_> = eval.env.iter().map(|(n, v)| (n.as_str(), *v)).collect();
    assert_eq!(env, vec![("x", 3), ("y", 6), ("x", 13)]);
    assert_eq!(eval.walker.mode(), Mode::Normal);
    assert_eq!(eval.input().la(1), EOF);
}

#[test]
fn test_expression_statement_does_not_fit_the_walker() {
    let (calc, root) = parsed("x + 1;");
    let mut eval = Eval::new(TreeNodeStream::new(calc.parser.adaptor().tree(), root));
    let err = eval.prog().unwrap_err();

    assert_eq!(err.failure().map(|f| f.code()), Some(ErrorCode::E0201));
    assert_eq!(eval.walker.mode(), Mode::Failed);
    let diagnostics = eval.walker.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "mismatched input '+' expecting '='");
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (1, 2));
    assert_eq!(diagnostics[0].context.innermost(), Some("stat"));
}

#[test]
fn test_undefined_variable_fails_predicate() {
    let (calc, root) = parsed("x = y;");
    let mut eval = Eval::new(TreeNodeStream::new(calc.parser.adaptor().tree(), root));
    let err = eval.prog().unwrap_err();
    assert_eq!(err.failure().map(|f| f.code()), Some(ErrorCode::E0303));
    assert_eq!(eval.walker.diagnostics()[0].context.path(), "prog > stat > expr");
    assert!(eval.env.is_empty());
}
