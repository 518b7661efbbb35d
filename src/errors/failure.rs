//! Recognition failure records and the runtime error type.

use std::fmt;

use thiserror::Error;

use super::codes::ErrorCode;
use super::context::RuleContext;
use crate::base::{Bitset, EOF, Token, TokenType, Vocabulary};
use crate::dfa::{Alt, DecisionId, StateId};

/// Result type of every matching, prediction and stream operation.
pub type RecognitionResult<T> = Result<T, RecognitionError>;

/// Errors flowing through recognizer calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    /// A recognition failure outside speculation.
    #[error("{0}")]
    Failed(Box<Failure>),

    /// Failure while backtracking: the speculative path is not viable.
    /// Carries no record; it only tells the caller to try something else.
    #[error("speculative alternative is not viable")]
    Backtracking,

    /// Misuse of the stream, mark or bitset API. Never recovered.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl RecognitionError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_backtracking(&self) -> bool {
        matches!(self, Self::Backtracking)
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

impl From<Failure> for RecognitionError {
    fn from(failure: Failure) -> Self {
        Self::Failed(Box::new(failure))
    }
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// `match` expected a single token type (or character).
    MismatchedToken { expected: TokenType },
    /// `match` expected a member of the failure's expected set.
    MismatchedSet,
    /// `match` expected anything outside the failure's expected set.
    MismatchedNotSet,
    /// A lexer expected a character in `low..=high`.
    MismatchedRange { low: TokenType, high: TokenType },
    /// Single-token insertion synthesized `expected`.
    MissingToken { expected: TokenType },
    /// Single-token deletion dropped the offending unit; what it made way
    /// for is the failure's expected set.
    UnwantedToken,
    /// No automaton edge or predicate resolved the decision.
    NoViableAlt {
        decision: DecisionId,
        state: StateId,
        alternatives: Vec<Alt>,
        description: &'static str,
    },
    /// A required repetition matched zero times.
    EarlyExit { decision: DecisionId },
    /// A validating semantic predicate evaluated false.
    FailedPredicate {
        rule: &'static str,
        predicate: &'static str,
    },
}

/// A finalized failure: kind, offending input, expectation and rule path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    /// Stream index of the offending unit
    pub index: usize,
    /// The offending unit (a synthesized token for character streams)
    pub found: Token,
    /// What would have been accepted, when known
    pub expected: Option<Bitset>,
    /// Active rules, outermost first
    pub context: RuleContext,
    /// Rendered expected-vs-found summary
    pub message: String,
    /// Raised by a character-level recognizer
    pub lexical: bool,
}

impl Failure {
    pub fn new(
        kind: FailureKind,
        found: Token,
        index: usize,
        expected: Option<Bitset>,
        context: RuleContext,
        vocabulary: &Vocabulary,
    ) -> Self {
        let lexical = matches!(vocabulary, Vocabulary::Chars);
        let message = render_message(&kind, &found, expected.as_ref(), vocabulary);
        Self {
            kind,
            index,
            found,
            expected,
            context,
            message,
            lexical,
        }
    }

    /// The diagnostic code for this failure.
    pub fn code(&self) -> ErrorCode {
        match (&self.kind, self.lexical) {
            (FailureKind::NoViableAlt { .. }, true) => ErrorCode::E0101,
            (FailureKind::MismatchedToken { .. }, true) => ErrorCode::E0102,
            (FailureKind::MismatchedRange { .. }, _) => ErrorCode::E0103,
            (FailureKind::MismatchedSet | FailureKind::MismatchedNotSet, true) => ErrorCode::E0103,
            (FailureKind::MismatchedToken { .. }, false) => ErrorCode::E0201,
            (FailureKind::MismatchedSet | FailureKind::MismatchedNotSet, false) => {
                ErrorCode::E0202
            }
            (FailureKind::MissingToken { .. }, _) => ErrorCode::E0203,
            (FailureKind::UnwantedToken, _) => ErrorCode::E0204,
            (FailureKind::NoViableAlt { .. }, false) => ErrorCode::E0301,
            (FailureKind::EarlyExit { .. }, _) => ErrorCode::E0302,
            (FailureKind::FailedPredicate { .. }, _) => ErrorCode::E0303,
        }
    }

    pub fn line(&self) -> u32 {
        self.found.line
    }

    pub fn column(&self) -> u32 {
        self.found.column
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.found.line, self.found.column, self.message)?;
        if !self.context.is_empty() {
            write!(f, " (rule path: {})", self.context.path())?;
        }
        Ok(())
    }
}

fn describe_found(found: &Token, vocabulary: &Vocabulary) -> String {
    if found.token_type == EOF {
        return "<EOF>".to_string();
    }
    match vocabulary {
        Vocabulary::Chars => vocabulary.display(found.token_type),
        Vocabulary::Tokens(_) => format!("'{}'", found.text.escape_debug()),
    }
}

fn render_message(
    kind: &FailureKind,
    found: &Token,
    expected: Option<&Bitset>,
    vocabulary: &Vocabulary,
) -> String {
    let input = describe_found(found, vocabulary);
    let lexical = matches!(vocabulary, Vocabulary::Chars);
    let expected_set = || expected.map_or_else(|| "{}".to_string(), |s| vocabulary.display_set(s));
    match kind {
        FailureKind::MismatchedToken { expected } if lexical => format!(
            "mismatched character {input} expecting {}",
            vocabulary.display(*expected)
        ),
        FailureKind::MismatchedToken { expected } => format!(
            "mismatched input {input} expecting {}",
            vocabulary.display(*expected)
        ),
        FailureKind::MismatchedSet => {
            format!("mismatched input {input} expecting set {}", expected_set())
        }
        FailureKind::MismatchedNotSet => {
            format!("mismatched input {input} expecting anything but {}", expected_set())
        }
        FailureKind::MismatchedRange { low, high } => format!(
            "mismatched character {input} expecting set {}..{}",
            vocabulary.display(*low),
            vocabulary.display(*high)
        ),
        FailureKind::MissingToken { expected } => {
            format!("missing {} at {input}", vocabulary.display(*expected))
        }
        FailureKind::UnwantedToken => match expected {
            Some(set) if set.count() > 1 => {
                format!("extraneous input {input} expecting set {}", expected_set())
            }
            _ => format!("extraneous input {input} expecting {}", expected_set()),
        },
        FailureKind::NoViableAlt { .. } if lexical => {
            format!("no viable alternative at character {input}")
        }
        FailureKind::NoViableAlt { .. } => format!("no viable alternative at input {input}"),
        FailureKind::EarlyExit { .. } => {
            format!("required (...)+ loop did not match anything at input {input}")
        }
        FailureKind::FailedPredicate { rule, predicate } => {
            format!("rule {rule} failed predicate: {{{predicate}}}?")
        }
    }
}
