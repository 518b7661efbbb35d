//! Upstream token producers.

use logos::Logos;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::base::{Channel, DEFAULT_CHANNEL, INVALID_TOKEN_TYPE, Token, TokenType};

/// A pull-style producer of tokens.
///
/// `None` means the input is exhausted. Buffered streams call
/// `next_token` at most once per produced token and never again after
/// `None` (or after an `EOF`-typed token).
pub trait TokenSource {
    fn next_token(&mut self) -> Option<Token>;

    fn source_name(&self) -> &str {
        "<unknown>"
    }
}

/// Replays a fixed list of tokens.
#[derive(Debug, Clone)]
pub struct ListSource {
    tokens: std::vec::IntoIter<Token>,
    name: SmolStr,
}

impl ListSource {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter(),
            name: SmolStr::new_static("<list>"),
        }
    }

    /// Build tokens from `(type, text)` pairs, laid out on one line and
    /// separated by a single space.
    pub fn from_pairs(pairs: &[(TokenType, &str)]) -> Self {
        let mut offset = 0u32;
        let tokens = pairs
            .iter()
            .map(|&(ttype, text)| {
                let start = TextSize::new(offset);
                let token = Token::new(ttype, text)
                    .with_range(TextRange::at(start, TextSize::of(text)))
                    .with_position(1, offset);
                offset += u32::from(TextSize::of(text)) + 1;
                token
            })
            .collect();
        Self::new(tokens)
    }

    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = name.into();
        self
    }
}

impl TokenSource for ListSource {
    fn next_token(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Logos adapter
// ============================================================================

/// Maps a logos token enum onto runtime token types and channels.
pub trait TokenKind {
    fn token_type(&self) -> TokenType;

    fn channel(&self) -> Channel {
        DEFAULT_CHANNEL
    }
}

/// Adapts a logos lexer into a [`TokenSource`].
///
/// Input logos cannot tokenize becomes an `INVALID_TOKEN_TYPE` token so the
/// parser's recovery deals with it.
pub struct LogosSource<'s, K>
where
    K: Logos<'s, Source = str>,
{
    lexer: logos::Lexer<'s, K>,
    /// Byte offset up to which line/column have been counted
    scanned: usize,
    line: u32,
    line_start: usize,
    name: SmolStr,
}

impl<'s, K> LogosSource<'s, K>
where
    K: Logos<'s, Source = str> + TokenKind,
    K::Extras: Default,
{
    pub fn new(source: &'s str) -> Self {
        Self {
            lexer: K::lexer(source),
            scanned: 0,
            line: 1,
            line_start: 0,
            name: SmolStr::new_static("<logos>"),
        }
    }

    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = name.into();
        self
    }

    fn scan_to(&mut self, offset: usize) {
        let source = self.lexer.source();
        let Some(chunk) = source.get(self.scanned..offset) else {
            return;
        };
        for (i, c) in chunk.char_indices() {
            if c == '\n' {
                self.line += 1;
                self.line_start = self.scanned + i + 1;
            }
        }
        self.scanned = offset;
    }
}

impl<'s, K> TokenSource for LogosSource<'s, K>
where
    K: Logos<'s, Source = str> + TokenKind,
    K::Extras: Default,
{
    fn next_token(&mut self) -> Option<Token> {
        let result = self.lexer.next()?;
        let span = self.lexer.span();
        let text = self.lexer.slice();
        self.scan_to(span.start);

        let source = self.lexer.source();
        let column = source
            .get(self.line_start..span.start)
            .map_or(0, |prefix| prefix.chars().count() as u32);
        let range = TextRange::new(
            TextSize::new(span.start as u32),
            TextSize::new(span.end as u32),
        );
        let (ttype, channel) = match result {
            Ok(kind) => (kind.token_type(), kind.channel()),
            Err(_) => (INVALID_TOKEN_TYPE, DEFAULT_CHANNEL),
        };
        let token = Token::new(ttype, text)
            .with_channel(channel)
            .with_range(range)
            .with_position(self.line, column);

        self.scan_to(span.end);
        Some(token)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
