//! Rewindable streams of characters and tokens.
//!
//! - [`IntStream`] is the cursor capability every recognizer drives:
//!   lookahead by type, consume, mark/rewind/release savepoints.
//! - [`StringStream`] is the in-memory character stream lexers read.
//! - [`BufferedTokenStream`] pulls tokens lazily from a [`TokenSource`]
//!   into a random-access buffer so parsers can look arbitrarily far ahead.
//! - [`TokenRewriter`] renders a token buffer with queued edits.
//!
//! Marks nest like savepoints. Rewinding a mark pops it together with every
//! mark taken after it; releasing is only allowed for the innermost mark.
//! [`MarkGuard`] ties a mark to a scope so it is rewound on every exit path
//! unless explicitly committed.

mod char_stream;
mod marks;
mod rewrite;
mod source;
mod token_stream;

use std::ops::{Deref, DerefMut};

use tracing::warn;

pub use char_stream::{CharStream, StringStream};
pub use marks::{Mark, MarkStack};
pub use rewrite::{DEFAULT_PROGRAM, TokenRewriter};
pub use source::{ListSource, LogosSource, TokenKind, TokenSource};
pub use token_stream::BufferedTokenStream;

use crate::base::{Token, TokenType};
use crate::errors::RecognitionResult;

/// Cursor over a sequence of discrete units identified by type.
pub trait IntStream {
    /// Type of the unit `i` positions from the cursor: `la(1)` is the
    /// current unit, `la(-1)` the previous one. Past the end this is `EOF`.
    fn la(&mut self, i: isize) -> TokenType;

    /// Move past the current unit. No-op at end of input.
    fn consume(&mut self);

    /// Position of the current unit.
    fn index(&self) -> usize;

    /// Move the cursor to `index` without touching the mark stack.
    fn seek(&mut self, index: usize);

    /// Save the cursor on the mark stack.
    fn mark(&mut self) -> Mark;

    /// Restore the cursor saved by `mark`, popping it and all newer marks.
    fn rewind(&mut self, mark: Mark) -> RecognitionResult<()>;

    /// Discard the innermost mark without moving the cursor.
    fn release(&mut self, mark: Mark) -> RecognitionResult<()>;

    /// Number of open marks.
    fn mark_depth(&self) -> usize;

    fn source_name(&self) -> &str;

    /// The current unit as a token, for failure records and tree building.
    fn current_symbol(&mut self) -> Token;

    /// Type of the current unit, `EOF` at end of input.
    fn current(&mut self) -> TokenType {
        self.la(1)
    }

    fn advance(&mut self) {
        self.consume();
    }
}

// ============================================================================
// Scoped marks
// ============================================================================

/// A mark that is rewound when the guard goes out of scope.
///
/// Call [`MarkGuard::commit`] to keep the consumed input instead. The guard
/// dereferences to the stream, so speculative code reads through it.
pub struct MarkGuard<'a, S: IntStream + ?Sized> {
    stream: &'a mut S,
    mark: Mark,
    settled: bool,
}

impl<'a, S: IntStream + ?Sized> MarkGuard<'a, S> {
    pub fn new(stream: &'a mut S) -> Self {
        let mark = stream.mark();
        Self {
            stream,
            mark,
            settled: false,
        }
    }

    pub fn mark(&self) -> Mark {
        self.mark
    }

    /// Keep everything consumed under the guard.
    pub fn commit(mut self) -> RecognitionResult<()> {
        self.settled = true;
        self.stream.release(self.mark)
    }

    /// Rewind now and report misuse instead of logging it.
    pub fn rollback(mut self) -> RecognitionResult<()> {
        self.settled = true;
        self.stream.rewind(self.mark)
    }
}

impl<S: IntStream + ?Sized> Deref for MarkGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.stream
    }
}

impl<S: IntStream + ?Sized> DerefMut for MarkGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.stream
    }
}

impl<S: IntStream + ?Sized> Drop for MarkGuard<'_, S> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if let Err(err) = self.stream.rewind(self.mark) {
            warn!(depth = self.mark.depth(), %err, "mark guard could not rewind");
        }
    }
}
