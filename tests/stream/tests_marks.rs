//! Mark, rewind and release behavior shared by every stream.

use llstar::base::{EOF, TokenType};
use llstar::stream::{CharStream, IntStream, MarkGuard, StringStream};
use rstest::rstest;

use crate::helpers::fixtures::{ID, INT, SEMI, stream};

// =============================================================================
// MARK / ADVANCE / REWIND
// =============================================================================

#[rstest]
#[case("", 0)]
#[case("abc", 0)]
#[case("abc", 2)]
#[case("abc", 5)]
#[case("x\ny\nz", 4)]
fn test_char_stream_rewind_restores_cursor(#[case] text: &str, #[case] k: usize) {
    let mut input = StringStream::new(text);
    input.consume();
    let before = (input.index(), input.la(1), input.line(), input.column());
    let mark = input.mark();
    for _ in 0..k {
        input.consume();
    }
    input.rewind(mark).unwrap();
    assert_eq!(before, (input.index(), input.la(1), input.line(), input.column()));
    assert_eq!(input.mark_depth(), 0);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(3)]
#[case(10)]
fn test_token_stream_rewind_restores_cursor(#[case] k: usize) {
    let mut input = stream("a = 1 ; b = 2 ;");
    let mark = input.mark();
    let before: Vec<TokenType> = (1..=4).map(|i| input.la(i)).collect();
    for _ in 0..k {
        input.consume();
    }
    input.rewind(mark).unwrap();
    let after: Vec<TokenType> = (1..=4).map(|i| input.la(i)).collect();
    assert_eq!(before, after);
    assert_eq!(input.index(), 0);
}

#[test]
fn test_consume_past_end_stays_at_eof() {
    let mut input = stream("a");
    input.consume();
    input.consume();
    input.consume();
    assert_eq!(input.la(1), EOF);
    assert_eq!(input.la(5), EOF);
}

// =============================================================================
// NESTED MARKS
// =============================================================================

#[test]
fn test_rewinding_outer_mark_invalidates_inner() {
    let mut input = stream("a 1 ; b");
    let outer = input.mark();
    input.consume();
    let inner = input.mark();
    input.consume();
    assert_eq!(input.mark_depth(), 2);

    input.rewind(outer).unwrap();
    assert_eq!(input.la(1), ID);
    assert_eq!(input.mark_depth(), 0);
    assert!(input.rewind(inner).unwrap_err().is_invalid_argument());
    assert!(input.release(inner).unwrap_err().is_invalid_argument());
}

#[test]
fn test_stale_mark_is_rejected_at_reused_depth() {
    let mut input = stream("a 1 ;");
    let first = input.mark();
    input.rewind(first).unwrap();
    let second = input.mark();
    assert_eq!(first.depth(), second.depth());
    assert!(input.rewind(first).unwrap_err().is_invalid_argument());
    input.release(second).unwrap();
}

#[test]
fn test_release_must_target_innermost() {
    let mut input = stream("a 1 ;");
    let outer = input.mark();
    let inner = input.mark();
    assert!(input.release(outer).unwrap_err().is_invalid_argument());
    input.release(inner).unwrap();
    input.consume();
    input.release(outer).unwrap();
    assert_eq!(input.la(1), INT);
    assert_eq!(input.mark_depth(), 0);
}

#[test]
fn test_inner_rewind_keeps_outer_mark() {
    let mut input = stream("a 1 ; b");
    let outer = input.mark();
    input.consume();
    let inner = input.mark();
    input.consume();
    input.rewind(inner).unwrap();
    assert_eq!(input.la(1), INT);
    input.consume();
    assert_eq!(input.la(1), SEMI);
    input.rewind(outer).unwrap();
    assert_eq!(input.la(1), ID);
}

// =============================================================================
// SCOPED GUARDS
// =============================================================================

#[test]
fn test_guard_rewinds_on_early_return() {
    fn speculate(input: &mut StringStream) -> Result<(), ()> {
        let mut guard = MarkGuard::new(input);
        guard.consume();
        if guard.la(1) != 'z' as TokenType {
            return Err(());
        }
        guard.commit().map_err(drop)
    }

    let mut input = StringStream::new("abc");
    assert!(speculate(&mut input).is_err());
    assert_eq!(input.index(), 0);
    assert_eq!(input.mark_depth(), 0);
}

#[test]
fn test_nested_guards_commit_inner_rewind_outer() {
    let mut input = stream("a 1 ; b");
    {
        let mut outer = MarkGuard::new(&mut input);
        outer.consume();
        {
            let mut inner = MarkGuard::new(&mut *outer);
            inner.consume();
            inner.commit().unwrap();
        }
        assert_eq!(outer.la(1), SEMI);
    }
    assert_eq!(input.la(1), ID);
    assert_eq!(input.mark_depth(), 0);
}
