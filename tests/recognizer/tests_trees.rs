//! Trees built while parsing the calculator grammar.

use llstar::base::TokenType;
use llstar::tree::green::to_green;
use rowan::SyntaxKind;
use rstest::rstest;

use crate::helpers::calc::Calc;
use crate::helpers::fixtures::lex;

fn parse(source: &str) -> String {
    let mut calc = Calc::new(lex(source));
    let root = calc.prog().expect("parses");
    assert!(
        calc.parser.diagnostics().is_empty(),
        "unexpected diagnostics: {:?}",
        calc.parser.diagnostics()
    );
    calc.tree_string(root)
}

#[rstest]
#[case("x;", "x")]
#[case("42;", "42")]
#[case("x = 1;", "(= x 1)")]
#[case("a + b + c;", "(+ (+ a b) c)")]
#[case("x = 1 + 2;", "(= x (+ 1 2))")]
#[case("(a + b);", "(+ a b)")]
#[case("((a));", "a")]
#[case("(a) b;", "(( a b)")]
#[case("(a) (b) c + 1;", "(+ (( a (( b c)) 1)")]
#[case("int x;", "int x")]
#[case("x = 1; y = x + 2;", "(= x 1) (= y (+ x 2))")]
fn test_tree_shapes(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(parse(source), expected);
}

#[test]
fn test_trees_record_token_boundaries() {
    let mut calc = Calc::new(lex("x = 1 + 2;"));
    let root = calc.prog().expect("parses").expect("a tree");
    let tree = calc.parser.adaptor().tree();
    let node = tree.node(root);
    assert_eq!(node.start_index, Some(0));
    // `;` sits at buffer index 9; the statement ends there.
    assert_eq!(node.stop_index, Some(9));
}

#[test]
fn test_green_export() {
    let mut calc = Calc::new(lex("x = 1 + 2;"));
    let root = calc.prog().expect("parses").expect("a tree");
    let green = to_green(calc.parser.adaptor().tree(), root, SyntaxKind(1000), |t: TokenType| {
        SyntaxKind(t as u16)
    });
    assert_eq!(u32::from(green.text_len()), 5);
    assert_eq!(green.to_string(), "=x+12");
    assert_eq!(green.children().count(), 1);
}
