//! Recognizers: the state machine generated rule code drives.
//!
//! - [`Recognize`] is the capability prediction and speculation need:
//!   access to the input and the [`RecognizerState`], plus the hooks a
//!   generated grammar supplies (semantic predicates, speculative
//!   alternatives).
//! - [`Parser`] matches tokens from a [`BufferedTokenStream`], recovers
//!   from mismatches and reports matched tokens to a tree adaptor.
//! - [`Lexer`] matches characters and emits tokens; [`LexerSource`] turns a
//!   generated lexer into a [`TokenSource`].
//! - [`TreeParser`] walks a finished tree for tree grammars.
//!
//! A recognizer is always in one [`Mode`]. Failures while backtracking
//! never reach diagnostics: they surface as
//! [`RecognitionError::Backtracking`] and speculative code turns them into
//! `false`.
//!
//! [`BufferedTokenStream`]: crate::stream::BufferedTokenStream
//! [`TokenSource`]: crate::stream::TokenSource

mod config;
mod lexer;
mod parser;
mod recovery;
mod state;
mod tree_parser;

use std::ops::{Deref, DerefMut};

use tracing::{trace, warn};

pub use config::RecognizerOptions;
pub use lexer::{Lexer, LexerSource, TokenRules};
pub use parser::{Parser, RuleStart};
pub use state::{MemoEntry, RecognizerState, Report, RuleFrame};
pub use tree_parser::TreeParser;

use crate::base::Bitset;
use crate::dfa::{Alt, DecisionId, Dfa, PredicateId};
use crate::errors::{Failure, FailureKind, RecognitionError, RecognitionResult};
use crate::stream::{IntStream, Mark};

/// A grammar rule, as generated code names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rule {
    pub index: u32,
    pub name: &'static str,
}

impl Rule {
    pub const fn new(index: u32, name: &'static str) -> Self {
        Self { index, name }
    }
}

/// Recognizer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Inside speculative parsing at the given depth
    Backtracking(u32),
    /// Between a reported error and the next successful match
    Recovering,
    /// Recovery gave up; the failure propagates to the caller
    Failed,
}

/// Capability shared by lexers, parsers and the grammars built on them.
pub trait Recognize {
    type Input: IntStream;

    fn input(&mut self) -> &mut Self::Input;

    fn state(&self) -> &RecognizerState;

    fn state_mut(&mut self) -> &mut RecognizerState;

    /// Evaluate semantic predicate `predicate` with the input positioned at
    /// the start of the decision being predicted.
    fn eval_predicate(&mut self, predicate: PredicateId) -> RecognitionResult<bool> {
        Err(RecognitionError::invalid_argument(format!(
            "no semantic predicate {predicate} in this recognizer"
        )))
    }

    /// Parse alternative `alt` of `decision` speculatively. Called with
    /// backtracking enabled and the input at the start of the decision.
    fn speculate(&mut self, decision: DecisionId, alt: Alt) -> RecognitionResult<()> {
        Err(RecognitionError::invalid_argument(format!(
            "decision {decision} cannot simulate alternative {alt}"
        )))
    }

    fn backtracking(&self) -> u32 {
        self.state().backtracking
    }

    /// Build the error for a failure at the current input position.
    ///
    /// While backtracking this only flags the speculative path as failed.
    fn fail(&mut self, kind: FailureKind, expected: Option<Bitset>) -> RecognitionError {
        if self.state().backtracking > 0 {
            self.state_mut().failed = true;
            return RecognitionError::Backtracking;
        }
        RecognitionError::from(self.failure_here(kind, expected))
    }

    /// A finalized failure record at the current input position.
    fn failure_here(&mut self, kind: FailureKind, expected: Option<Bitset>) -> Failure {
        let found = self.input().current_symbol();
        let index = self.input().index();
        let state = self.state();
        let failure = Failure::new(
            kind,
            found,
            index,
            expected,
            state.context(),
            state.vocabulary(),
        );
        self.state_mut().last_failure = Some(failure.clone());
        failure
    }

    /// A `(...)+` loop matched nothing.
    fn early_exit(&mut self, decision: DecisionId) -> RecognitionError {
        self.fail(FailureKind::EarlyExit { decision }, None)
    }

    /// A validating semantic predicate evaluated false.
    fn failed_predicate(&mut self, rule: &'static str, predicate: &'static str) -> RecognitionError {
        self.fail(FailureKind::FailedPredicate { rule, predicate }, None)
    }

    /// Choose an alternative of `dfa`'s decision.
    fn predict(&mut self, dfa: &Dfa) -> RecognitionResult<Alt>
    where
        Self: Sized,
    {
        crate::dfa::predict(self, dfa)
    }

    /// Run `fragment` speculatively; see [`synpred`].
    fn synpred<F>(&mut self, fragment: F) -> RecognitionResult<bool>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> RecognitionResult<()>,
    {
        synpred(self, fragment)
    }
}

// ============================================================================
// Speculation
// ============================================================================

/// Scoped mark over a recognizer's input.
///
/// The input is rewound when the guard is dropped unless it was committed.
/// A backtracking guard also raises the backtracking depth for its
/// lifetime. The guard dereferences to the recognizer.
pub struct Speculation<'a, R: Recognize + ?Sized> {
    recognizer: &'a mut R,
    mark: Mark,
    backtracking: bool,
    settled: bool,
}

impl<'a, R: Recognize + ?Sized> Speculation<'a, R> {
    /// Mark the input without entering backtracking mode.
    pub fn begin(recognizer: &'a mut R) -> Self {
        let mark = recognizer.input().mark();
        Self {
            recognizer,
            mark,
            backtracking: false,
            settled: false,
        }
    }

    /// Mark the input and enter backtracking mode.
    pub fn backtrack(recognizer: &'a mut R) -> Self {
        let mark = recognizer.input().mark();
        recognizer.state_mut().backtracking += 1;
        trace!(depth = recognizer.state().backtracking, "begin speculation");
        Self {
            recognizer,
            mark,
            backtracking: true,
            settled: false,
        }
    }

    fn leave(&mut self) {
        if self.backtracking {
            let state = self.recognizer.state_mut();
            state.backtracking -= 1;
            trace!(depth = state.backtracking, "end speculation");
        }
    }

    /// Rewind the input and leave backtracking mode.
    pub fn finish(mut self) -> RecognitionResult<()> {
        self.settled = true;
        self.leave();
        self.recognizer.input().rewind(self.mark)
    }

    /// Keep the consumed input and leave backtracking mode.
    pub fn commit(mut self) -> RecognitionResult<()> {
        self.settled = true;
        self.leave();
        self.recognizer.input().release(self.mark)
    }
}

impl<R: Recognize + ?Sized> Deref for Speculation<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.recognizer
    }
}

impl<R: Recognize + ?Sized> DerefMut for Speculation<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.recognizer
    }
}

impl<R: Recognize + ?Sized> Drop for Speculation<'_, R> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.leave();
        if let Err(err) = self.recognizer.input().rewind(self.mark) {
            warn!(depth = self.mark.depth(), %err, "speculation could not rewind");
        }
    }
}

/// Run `fragment` as a syntactic predicate.
///
/// The fragment runs with backtracking raised and the input is always
/// rewound afterwards. Returns whether it matched; recognition failures
/// become `false`, misuse errors propagate.
pub fn synpred<R, F>(recognizer: &mut R, fragment: F) -> RecognitionResult<bool>
where
    R: Recognize + ?Sized,
    F: FnOnce(&mut R) -> RecognitionResult<()>,
{
    let mut speculation = Speculation::backtrack(recognizer);
    let outcome = fragment(&mut *speculation);
    speculation.state_mut().failed = false;
    speculation.finish()?;
    match outcome {
        Ok(()) => Ok(true),
        Err(RecognitionError::Backtracking | RecognitionError::Failed(_)) => Ok(false),
        Err(err) => Err(err),
    }
}
