//! Buffered token stream over a logos token source.

use llstar::base::{DEFAULT_CHANNEL, EOF, HIDDEN_CHANNEL, INVALID_TOKEN_TYPE};
use llstar::stream::{BufferedTokenStream, IntStream, TokenSource};

use crate::helpers::fixtures::{EQ, ID, INT, SEMI, WS, lex, stream, types};

#[test]
fn test_logos_source_positions() {
    let mut source = lex("ab =\n  12;");
    let tokens: Vec<_> = std::iter::from_fn(|| source.next_token()).collect();
    let types: Vec<_> = tokens.iter().map(|t| t.token_type).collect();
    assert_eq!(types, vec![ID, WS, EQ, WS, INT, SEMI]);

    let int = &tokens[4];
    assert_eq!(int.text, "12");
    assert_eq!((int.line, int.column), (2, 2));
    assert_eq!(u32::from(int.range.start()), 7);
    assert_eq!(tokens[1].channel, HIDDEN_CHANNEL);
    assert_eq!(source.source_name(), "calc");
}

#[test]
fn test_unlexable_input_becomes_invalid_token() {
    let mut input = stream("a $ 1");
    assert_eq!(input.la(1), ID);
    assert_eq!(input.la(2), INVALID_TOKEN_TYPE);
    assert_eq!(input.la(3), INT);
}

#[test]
fn test_hidden_tokens_are_buffered_but_skipped() {
    let mut input = stream("a = 1;");
    assert_eq!(input.la(1), ID);
    input.consume();
    assert_eq!(input.la(1), EQ);
    assert_eq!(input.index(), 2);
    assert_eq!(input.lt(-1).map(|t| t.text.as_str()), Some("a"));

    input.fill();
    let hidden = input
        .tokens()
        .iter()
        .filter(|t| t.channel == HIDDEN_CHANNEL)
        .count();
    assert_eq!(hidden, 2);
    assert_eq!(input.full_text(), "a = 1;");
}

#[test]
fn test_tokens_are_indexed_in_buffer_order() {
    let mut input = stream("a = 1;");
    input.fill();
    for (i, token) in input.tokens().iter().enumerate() {
        assert_eq!(token.index, Some(i));
    }
    let last = input.tokens().last().unwrap();
    assert_eq!(last.token_type, EOF);
    assert_eq!(u32::from(last.range.start()), 6);
}

#[test]
fn test_text_across_range_includes_hidden() {
    let mut input = stream("x = 1 ; y");
    assert_eq!(input.text(0, 4), "x = 1");
}

#[test]
fn test_hidden_channel_stream_sees_only_whitespace() {
    let mut input = BufferedTokenStream::with_channel(lex("a b"), HIDDEN_CHANNEL);
    assert_eq!(input.la(1), WS);
    assert_eq!(input.la(2), EOF);
    assert_ne!(input.channel(), DEFAULT_CHANNEL);
}

#[test]
fn test_list_source_ends_with_eof() {
    let mut input = BufferedTokenStream::new(types(&[ID, EQ, INT]));
    assert_eq!(input.la(3), INT);
    assert_eq!(input.lt(2).map(|t| t.text.as_str()), Some("'='"));
    assert_eq!(input.la(4), EOF);
    assert_eq!(input.la(9), EOF);
    assert_eq!(input.lt(0), None);
}
