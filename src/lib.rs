//! # llstar-runtime
//!
//! Runtime for generated LL(*) recognizers: adaptive DFA prediction,
//! speculative lookahead over rewindable streams, and error recovery.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! recognizer → Parser/Lexer/TreeParser state machine, matching, recovery, synpreds
//!   ↓
//! dfa        → Decision automata, packed tables, prediction
//!   ↓
//! tree       → TreeAdaptor, arena trees, node streams, rowan export
//!   ↓
//! stream     → IntStream, marks, buffered token stream, rewriter
//!   ↓
//! errors     → RecognitionError, Failure records, SyntaxError diagnostics
//!   ↓
//! base       → Token types, Token, Vocabulary, Bitset
//! ```
//!
//! Generated code wraps a [`Parser`] (or [`Lexer`]) in a grammar struct,
//! implements [`Recognize`] by delegation and supplies the semantic
//! predicate and speculation hooks. Rules call [`Parser::enter_rule`],
//! the `match_*` methods, [`predict`] for every decision and
//! [`Parser::exit_rule`].

// ============================================================================
// MODULES (dependency order: base → errors → stream → tree → dfa → recognizer)
// ============================================================================

/// Foundation types: token types, Token, Vocabulary, Bitset
pub mod base;

/// Errors: recognition failures and caller-visible diagnostics
pub mod errors;

/// Streams: character and token cursors with mark/rewind
pub mod stream;

/// Tree construction through a TreeAdaptor
pub mod tree;

/// Decision automata and prediction
pub mod dfa;

/// Recognizer state machine: parsers, lexers, recovery
pub mod recognizer;

// Re-export the types generated code touches on every rule
pub use base::{Bitset, EOF, EOR_TOKEN_TYPE, Token, TokenType, Vocabulary};
pub use dfa::{Dfa, DfaBuilder, predict};
pub use errors::{ErrorCode, RecognitionError, RecognitionResult, SyntaxError};
pub use recognizer::{
    Lexer, LexerSource, Mode, Parser, Recognize, RecognizerOptions, Rule, TreeParser, synpred,
};
pub use stream::{BufferedTokenStream, IntStream, StringStream, TokenSource};
