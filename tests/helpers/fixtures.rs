//! Token vocabulary and token sources shared by the integration tests.

use llstar::base::{Channel, DEFAULT_CHANNEL, HIDDEN_CHANNEL, TokenType};
use llstar::stream::{BufferedTokenStream, ListSource, LogosSource, TokenKind};
use logos::Logos;

pub const ID: TokenType = 4;
pub const INT: TokenType = 5;
pub const EQ: TokenType = 6;
pub const SEMI: TokenType = 7;
pub const LPAREN: TokenType = 8;
pub const RPAREN: TokenType = 9;
pub const PLUS: TokenType = 10;
pub const WS: TokenType = 11;

pub static NAMES: &[&str] = &[
    "<invalid>", "<EOR>", "<DOWN>", "<UP>", "ID", "INT", "'='", "';'", "'('", "')'", "'+'", "WS",
];

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcToken {
    #[regex(r"[a-z]+")]
    Ident,
    #[regex(r"[0-9]+")]
    Int,
    #[token("=")]
    Eq,
    #[token(";")]
    Semi,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("+")]
    Plus,
    #[regex(r"[ \t\r\n]+")]
    Whitespace,
}

impl TokenKind for CalcToken {
    fn token_type(&self) -> TokenType {
        match self {
            CalcToken::Ident => ID,
            CalcToken::Int => INT,
            CalcToken::Eq => EQ,
            CalcToken::Semi => SEMI,
            CalcToken::LParen => LPAREN,
            CalcToken::RParen => RPAREN,
            CalcToken::Plus => PLUS,
            CalcToken::Whitespace => WS,
        }
    }

    fn channel(&self) -> Channel {
        match self {
            CalcToken::Whitespace => HIDDEN_CHANNEL,
            _ => DEFAULT_CHANNEL,
        }
    }
}

pub type CalcSource<'s> = LogosSource<'s, CalcToken>;

/// Tokenize `source` with the logos calculator lexer.
pub fn lex(source: &str) -> CalcSource<'_> {
    LogosSource::new(source).with_name("calc")
}

/// Buffered stream over `source`, whitespace on the hidden channel.
pub fn stream(source: &str) -> BufferedTokenStream<CalcSource<'_>> {
    BufferedTokenStream::new(lex(source))
}

/// Token source from bare token types, each named after its vocabulary
/// entry.
pub fn types(types: &[TokenType]) -> ListSource {
    let pairs: Vec<_> = types
        .iter()
        .map(|&t| (t, NAMES.get(t as usize).copied().unwrap_or("?")))
        .collect();
    ListSource::from_pairs(&pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use llstar::stream::IntStream;

    #[test]
    fn test_stream_skips_whitespace() {
        let mut input = stream("a = 1;");
        assert_eq!(input.la(1), ID);
        assert_eq!(input.la(2), EQ);
        assert_eq!(input.la(3), INT);
        assert_eq!(input.la(4), SEMI);
    }
}
