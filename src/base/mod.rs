//! Foundation types for the llstar runtime.
//!
//! This module provides the primitives every other layer builds on:
//! - [`TokenType`] and the reserved token type constants
//! - [`Token`] - the unit a token stream yields
//! - [`Vocabulary`] - display names used in diagnostics
//! - [`Bitset`] - token-set membership for follow and recovery sets
//!
//! This module has NO dependencies on other llstar modules apart from the
//! error type returned by checked [`Bitset`] operations.

mod bitset;
mod token;

pub use bitset::{Bitset, Bits};
pub use token::{Token, Vocabulary};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};

/// Integer type of a token (or character code for lexers).
pub type TokenType = i32;

/// End of input. Also the value `LA(k)` yields past the last unit.
pub const EOF: TokenType = -1;

/// Never produced by a token source; used for "no lookahead" (`LA(0)`).
pub const INVALID_TOKEN_TYPE: TokenType = 0;

/// End-of-rule marker: a follow set containing it means the rule can end
/// at that point, so the caller's follow set applies too.
pub const EOR_TOKEN_TYPE: TokenType = 1;

/// Navigation marker emitted when descending into a tree.
pub const DOWN: TokenType = 2;

/// Navigation marker emitted when climbing out of a tree.
pub const UP: TokenType = 3;

/// First token type available to grammars.
pub const MIN_USER_TOKEN_TYPE: TokenType = UP + 1;

/// Token channel number.
pub type Channel = u32;

/// Channel parsers listen to unless told otherwise.
pub const DEFAULT_CHANNEL: Channel = 0;

/// Conventional channel for whitespace and comments.
pub const HIDDEN_CHANNEL: Channel = 99;
