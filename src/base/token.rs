//! Token representation and vocabulary.

use std::fmt;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::{Bitset, Channel, DEFAULT_CHANNEL, EOF, TokenType};

/// A unit of a token stream: type, channel, text and source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub channel: Channel,
    pub text: SmolStr,
    /// Byte range in the source text
    pub range: TextRange,
    /// 1-based line of the first character
    pub line: u32,
    /// 0-based column (in characters) of the first character
    pub column: u32,
    /// Position in the token buffer, assigned when buffered
    pub index: Option<usize>,
}

impl Token {
    pub fn new(token_type: TokenType, text: impl Into<SmolStr>) -> Self {
        let text = text.into();
        Self {
            token_type,
            channel: DEFAULT_CHANNEL,
            range: TextRange::at(TextSize::new(0), TextSize::of(text.as_str())),
            text,
            line: 1,
            column: 0,
            index: None,
        }
    }

    /// The end-of-input token, positioned just past the last character.
    pub fn eof(offset: TextSize, line: u32, column: u32) -> Self {
        Self {
            token_type: EOF,
            channel: DEFAULT_CHANNEL,
            text: SmolStr::new_static("<EOF>"),
            range: TextRange::empty(offset),
            line,
            column,
            index: None,
        }
    }

    /// A token synthesized by single-token insertion, placed where the
    /// real input resumes.
    pub fn conjured(token_type: TokenType, text: impl Into<SmolStr>, near: &Token) -> Self {
        Self {
            token_type,
            channel: DEFAULT_CHANNEL,
            text: text.into(),
            range: TextRange::empty(near.range.start()),
            line: near.line,
            column: near.column,
            index: None,
        }
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_range(mut self, range: TextRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn is_eof(&self) -> bool {
        self.token_type == EOF
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index = self.index.map_or(-1, |i| i as i64);
        let text = self
            .text
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t");
        write!(
            f,
            "[@{},{}:{}='{}',<{}>",
            index,
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            text,
            self.token_type
        )?;
        if self.channel != DEFAULT_CHANNEL {
            write!(f, ",channel={}", self.channel)?;
        }
        write!(f, ",{}:{}]", self.line, self.column)
    }
}

/// How token types are named in diagnostics.
///
/// Parsers index a name table by token type; lexers show the character
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    Tokens(&'static [&'static str]),
    Chars,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::Tokens(&[])
    }
}

impl Vocabulary {
    /// Display name of a single token type (or character code).
    pub fn display(&self, ttype: TokenType) -> String {
        if ttype == EOF {
            return "<EOF>".to_string();
        }
        match self {
            Self::Tokens(names) => usize::try_from(ttype)
                .ok()
                .and_then(|i| names.get(i))
                .map_or_else(|| format!("<{ttype}>"), |name| (*name).to_string()),
            Self::Chars => u32::try_from(ttype)
                .ok()
                .and_then(char::from_u32)
                .map_or_else(|| format!("<{ttype}>"), |c| format!("{:?}", c)),
        }
    }

    /// Display a set as `{A, B}`; a single member prints bare.
    pub fn display_set(&self, set: &Bitset) -> String {
        let names: Vec<String> = set.types().map(|t| self.display(t)).collect();
        match names.as_slice() {
            [single] => single.clone(),
            _ => format!("{{{}}}", names.join(", ")),
        }
    }
}
