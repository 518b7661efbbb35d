//! In-memory character stream.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::{IntStream, Mark, MarkStack};
use crate::base::{EOF, INVALID_TOKEN_TYPE, Token, TokenType};
use crate::errors::RecognitionResult;

/// A stream of characters that also reports source positions.
pub trait CharStream: IntStream {
    /// Text of the characters `start..=stop` (character indices).
    fn substring(&self, start: usize, stop: usize) -> &str;

    /// Byte offset of the character at `index` (end of text past the end).
    fn byte_offset(&self, index: usize) -> TextSize;

    /// 1-based line of the current character.
    fn line(&self) -> u32;

    /// 0-based column of the current character.
    fn column(&self) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CharPos {
    index: usize,
    line: u32,
    column: u32,
}

impl CharPos {
    const START: CharPos = CharPos {
        index: 0,
        line: 1,
        column: 0,
    };
}

/// Character stream over an owned string.
#[derive(Debug, Clone)]
pub struct StringStream {
    text: String,
    /// Byte offset of each character
    offsets: Vec<u32>,
    chars: Vec<char>,
    /// Character index where each line starts, ascending
    line_starts: Vec<usize>,
    pos: CharPos,
    marks: MarkStack<CharPos>,
    name: SmolStr,
}

impl StringStream {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let (offsets, chars) = text
            .char_indices()
            .map(|(offset, c)| (offset as u32, c))
            .unzip();
        let chars: Vec<char> = chars;
        let line_starts = std::iter::once(0)
            .chain(
                chars
                    .iter()
                    .enumerate()
                    .filter(|&(_, &c)| c == '\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();
        Self {
            text,
            offsets,
            chars,
            line_starts,
            pos: CharPos::START,
            marks: MarkStack::new(),
            name: SmolStr::new_static("<string>"),
        }
    }

    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = name.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    fn step(&self, mut pos: CharPos) -> CharPos {
        if let Some(&c) = self.chars.get(pos.index) {
            if c == '\n' {
                pos.line += 1;
                pos.column = 0;
            } else {
                pos.column += 1;
            }
            pos.index += 1;
        }
        pos
    }

    /// Position of the character at `index`, found in the line table.
    fn position_of(&self, index: usize) -> CharPos {
        let line = self.line_starts.partition_point(|&start| start <= index);
        let start = self.line_starts[line - 1];
        CharPos {
            index,
            line: line as u32,
            column: (index - start) as u32,
        }
    }
}

impl IntStream for StringStream {
    fn la(&mut self, i: isize) -> TokenType {
        let index = match i {
            0 => return INVALID_TOKEN_TYPE,
            i if i > 0 => self.pos.index + (i as usize - 1),
            i => match self.pos.index.checked_sub(i.unsigned_abs()) {
                Some(index) => index,
                None => return INVALID_TOKEN_TYPE,
            },
        };
        self.chars.get(index).map_or(EOF, |&c| c as TokenType)
    }

    fn consume(&mut self) {
        self.pos = self.step(self.pos);
    }

    fn index(&self) -> usize {
        self.pos.index
    }

    fn seek(&mut self, index: usize) {
        self.pos = self.position_of(index.min(self.chars.len()));
    }

    fn mark(&mut self) -> Mark {
        self.marks.push(self.pos)
    }

    fn rewind(&mut self, mark: Mark) -> RecognitionResult<()> {
        self.pos = self.marks.rewind(mark)?;
        Ok(())
    }

    fn release(&mut self, mark: Mark) -> RecognitionResult<()> {
        self.marks.release(mark)
    }

    fn mark_depth(&self) -> usize {
        self.marks.depth()
    }

    fn source_name(&self) -> &str {
        &self.name
    }

    fn current_symbol(&mut self) -> Token {
        let start = self.byte_offset(self.pos.index);
        match self.chars.get(self.pos.index) {
            Some(&c) => {
                let mut buf = [0u8; 4];
                Token::new(c as TokenType, &*c.encode_utf8(&mut buf))
                    .with_range(TextRange::at(start, TextSize::of(c)))
                    .with_position(self.pos.line, self.pos.column)
            }
            None => Token::eof(start, self.pos.line, self.pos.column),
        }
    }
}

impl CharStream for StringStream {
    fn substring(&self, start: usize, stop: usize) -> &str {
        let from = u32::from(self.byte_offset(start)) as usize;
        let to = u32::from(self.byte_offset(stop + 1)) as usize;
        self.text.get(from..to.max(from)).unwrap_or("")
    }

    fn byte_offset(&self, index: usize) -> TextSize {
        match self.offsets.get(index) {
            Some(&offset) => TextSize::new(offset),
            None => TextSize::of(self.text.as_str()),
        }
    }

    fn line(&self) -> u32 {
        self.pos.line
    }

    fn column(&self) -> u32 {
        self.pos.column
    }
}
