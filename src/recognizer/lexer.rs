//! Character-level recognizer and its token-source adapter.

use text_size::TextRange;
use tracing::{debug, trace, warn};

use super::{Recognize, RecognizerOptions, RecognizerState, Report};
use crate::base::{
    Bitset, Channel, DEFAULT_CHANNEL, EOF, INVALID_TOKEN_TYPE, Token, TokenType, Vocabulary,
};
use crate::errors::{Failure, FailureKind, RecognitionError, RecognitionResult, SyntaxError};
use crate::stream::{CharStream, IntStream, TokenSource};

/// Start of the token being matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TokenStart {
    index: usize,
    line: u32,
    column: u32,
}

/// Matches characters from a [`CharStream`] and builds tokens from them.
///
/// Generated lexer rules call the `match_*` methods, then set the token's
/// type (and optionally channel or text). [`LexerSource`] turns each
/// matched token into a [`Token`].
pub struct Lexer<C: CharStream> {
    input: C,
    state: RecognizerState,
    start: TokenStart,
    token_type: TokenType,
    channel: Channel,
    text: Option<String>,
    skip: bool,
    emitted: Option<Token>,
}

impl<C: CharStream> Lexer<C> {
    pub fn new(input: C) -> Self {
        Self::with_options(input, RecognizerOptions::default())
    }

    pub fn with_options(input: C, options: RecognizerOptions) -> Self {
        Self {
            input,
            state: RecognizerState::new(options, Vocabulary::Chars),
            start: TokenStart {
                index: 0,
                line: 1,
                column: 0,
            },
            token_type: INVALID_TOKEN_TYPE,
            channel: DEFAULT_CHANNEL,
            text: None,
            skip: false,
            emitted: None,
        }
    }

    pub fn chars(&self) -> &C {
        &self.input
    }

    pub fn diagnostics(&self) -> &[SyntaxError] {
        self.state.diagnostics()
    }

    /// Reset per-token state with the token starting at the cursor.
    pub fn begin_token(&mut self) {
        self.start = TokenStart {
            index: self.input.index(),
            line: self.input.line(),
            column: self.input.column(),
        };
        self.token_type = INVALID_TOKEN_TYPE;
        self.channel = DEFAULT_CHANNEL;
        self.text = None;
        self.skip = false;
        self.emitted = None;
    }

    // =========================================================================
    // Matching
    // =========================================================================

    pub fn match_char(&mut self, c: char) -> RecognitionResult<()> {
        if self.input.la(1) == c as TokenType {
            self.input.consume();
            return Ok(());
        }
        Err(self.fail(
            FailureKind::MismatchedToken {
                expected: c as TokenType,
            },
            None,
        ))
    }

    /// Match one character in `low..=high`.
    pub fn match_range(&mut self, low: char, high: char) -> RecognitionResult<()> {
        let c = self.input.la(1);
        if (low as TokenType..=high as TokenType).contains(&c) {
            self.input.consume();
            return Ok(());
        }
        Err(self.fail(
            FailureKind::MismatchedRange {
                low: low as TokenType,
                high: high as TokenType,
            },
            None,
        ))
    }

    pub fn match_str(&mut self, s: &str) -> RecognitionResult<()> {
        s.chars().try_for_each(|c| self.match_char(c))
    }

    /// Match one character from `set`.
    pub fn match_set(&mut self, set: &Bitset) -> RecognitionResult<()> {
        if set.member(self.input.la(1)) {
            self.input.consume();
            return Ok(());
        }
        Err(self.fail(FailureKind::MismatchedSet, Some(set.clone())))
    }

    /// Match any character except end of input.
    pub fn match_any(&mut self) -> RecognitionResult<()> {
        if self.input.la(1) == EOF {
            return Err(self.fail(FailureKind::MismatchedNotSet, Some(Bitset::of(&[EOF]))));
        }
        self.input.consume();
        Ok(())
    }

    /// No token rule matches the current character.
    pub fn no_viable_char(&mut self, description: &'static str) -> RecognitionError {
        self.fail(
            FailureKind::NoViableAlt {
                decision: 0,
                state: 0,
                alternatives: Vec::new(),
                description,
            },
            None,
        )
    }

    // =========================================================================
    // Token construction
    // =========================================================================

    pub fn set_type(&mut self, token_type: TokenType) {
        self.token_type = token_type;
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn set_channel(&mut self, channel: Channel) {
        self.channel = channel;
    }

    /// Replace the matched text of the current token.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Text matched so far for the current token.
    pub fn text(&self) -> &str {
        match &self.text {
            Some(text) => text,
            None => self.matched_text(),
        }
    }

    fn matched_text(&self) -> &str {
        let stop = self.input.index();
        if stop <= self.start.index {
            return "";
        }
        self.input.substring(self.start.index, stop - 1)
    }

    /// Drop the current token; the source moves on to the next one.
    pub fn skip(&mut self) {
        self.skip = true;
    }

    /// Build the current token now. Later matching in the same rule is
    /// still consumed but not part of the emitted token.
    pub fn emit(&mut self) -> Token {
        let token = self.build_token();
        self.emitted = Some(token.clone());
        token
    }

    fn build_token(&self) -> Token {
        let range = TextRange::new(
            self.input.byte_offset(self.start.index),
            self.input.byte_offset(self.input.index()),
        );
        Token::new(self.token_type, self.text())
            .with_channel(self.channel)
            .with_range(range)
            .with_position(self.start.line, self.start.column)
    }

    fn take_token(&mut self) -> Option<Token> {
        if self.skip {
            return None;
        }
        Some(self.emitted.take().unwrap_or_else(|| self.build_token()))
    }

    fn eof_token(&self) -> Token {
        Token::eof(
            self.input.byte_offset(self.input.index()),
            self.input.line(),
            self.input.column(),
        )
    }

    /// Report a lexical failure and drop one character.
    fn recover(&mut self, failure: &Failure) -> Report {
        let report = self.state.report(failure);
        debug!(
            index = failure.index,
            message = %failure.message,
            "dropping character after lexical error"
        );
        self.input.consume();
        // Lexical errors do not cascade.
        self.state.error_recovery = false;
        report
    }
}

impl<C: CharStream> Recognize for Lexer<C> {
    type Input = C;

    fn input(&mut self) -> &mut C {
        &mut self.input
    }

    fn state(&self) -> &RecognizerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RecognizerState {
        &mut self.state
    }
}

/// Token rules of a generated lexer.
pub trait TokenRules {
    type Chars: CharStream;

    fn lexer(&mut self) -> &mut Lexer<Self::Chars>;

    fn lexer_ref(&self) -> &Lexer<Self::Chars>;

    /// Match exactly one token starting at the cursor and set its type.
    fn next_rule(&mut self) -> RecognitionResult<()>;
}

impl<C: CharStream> TokenRules for Lexer<C> {
    type Chars = C;

    fn lexer(&mut self) -> &mut Lexer<C> {
        self
    }

    fn lexer_ref(&self) -> &Lexer<C> {
        self
    }

    /// A bare lexer knows no tokens.
    fn next_rule(&mut self) -> RecognitionResult<()> {
        Err(self.no_viable_char("no token rules"))
    }
}

/// Adapts a generated lexer into a [`TokenSource`].
///
/// Lexical failures are reported on the lexer and skipped one character at
/// a time. API misuse and an exhausted error budget end the stream; the
/// error is kept for [`LexerSource::take_fatal`].
pub struct LexerSource<R: TokenRules> {
    rules: R,
    fatal: Option<RecognitionError>,
    done: bool,
}

impl<R: TokenRules> LexerSource<R> {
    pub fn new(rules: R) -> Self {
        Self {
            rules,
            fatal: None,
            done: false,
        }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut R {
        &mut self.rules
    }

    pub fn diagnostics(&self) -> &[SyntaxError] {
        self.rules.lexer_ref().diagnostics()
    }

    /// The error that ended the stream early, if any.
    pub fn take_fatal(&mut self) -> Option<RecognitionError> {
        self.fatal.take()
    }

    pub fn into_inner(self) -> R {
        self.rules
    }

    fn stop(&mut self, err: RecognitionError) -> Option<Token> {
        warn!(%err, "lexer stopped");
        self.fatal = Some(err);
        self.done = true;
        None
    }
}

impl<R: TokenRules> TokenSource for LexerSource<R> {
    fn next_token(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        loop {
            let lexer = self.rules.lexer();
            lexer.begin_token();
            if lexer.input.la(1) == EOF {
                self.done = true;
                return Some(lexer.eof_token());
            }

            match self.rules.next_rule() {
                Ok(()) => {
                    let lexer = self.rules.lexer();
                    if let Some(token) = lexer.take_token() {
                        trace!(ttype = token.token_type, text = %token.text, "token");
                        return Some(token);
                    }
                }
                Err(RecognitionError::Failed(failure)) => {
                    if self.rules.lexer().recover(&failure) == Report::BudgetExhausted {
                        let failure = self.rules.lexer().state.escalate(*failure);
                        return self.stop(failure.into());
                    }
                }
                Err(RecognitionError::Backtracking) => {
                    // A rule left backtracking raised; nothing was reported.
                    let lexer = self.rules.lexer();
                    lexer.state.failed = false;
                    lexer.input.consume();
                }
                Err(err) => return self.stop(err),
            }
        }
    }

    fn source_name(&self) -> &str {
        self.rules.lexer_ref().chars().source_name()
    }
}
