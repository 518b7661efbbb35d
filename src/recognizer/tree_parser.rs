//! Recognizer for tree grammars.
//!
//! A [`TreeParser`] walks a finished tree through a [`TreeNodeStream`]:
//! rules match node types and the `DOWN`/`UP` markers around children,
//! and predict with the same automata token parsers use.
//!
//! The trees walked here came out of a parser, so a mismatch means tree and
//! grammar disagree. There is no inline repair or resynchronization: the
//! failure is reported at the innermost rule it escapes and the walk stops
//! in [`Mode::Failed`].

use tracing::{debug, trace};

use super::{MemoEntry, Mode, Recognize, RecognizerOptions, RecognizerState, Rule, RuleStart};
use crate::base::{Bitset, DOWN, EOF, TokenType, UP, Vocabulary};
use crate::errors::{FailureKind, RecognitionError, RecognitionResult, SyntaxError};
use crate::stream::IntStream;
use crate::tree::{NodeId, Tree, TreeNodeStream};

pub struct TreeParser<'t> {
    input: TreeNodeStream<'t>,
    state: RecognizerState,
}

impl<'t> TreeParser<'t> {
    pub fn new(input: TreeNodeStream<'t>, vocabulary: Vocabulary) -> Self {
        Self::with_options(input, vocabulary, RecognizerOptions::default())
    }

    pub fn with_options(
        input: TreeNodeStream<'t>,
        vocabulary: Vocabulary,
        options: RecognizerOptions,
    ) -> Self {
        Self {
            input,
            state: RecognizerState::new(options, vocabulary),
        }
    }

    pub fn nodes(&self) -> &TreeNodeStream<'t> {
        &self.input
    }

    /// The tree being walked.
    pub fn tree(&self) -> &'t Tree {
        self.input.tree()
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn diagnostics(&self) -> &[SyntaxError] {
        self.state.diagnostics()
    }

    /// Push a frame for `rule`. Memoized rules behave as in
    /// [`Parser::enter_rule`](super::Parser::enter_rule).
    pub fn enter_rule(&mut self, rule: Rule) -> RecognitionResult<Option<RuleStart>> {
        let index = self.input.index();
        if self.state.backtracking > 0 && self.state.options().memoize {
            match self.state.memo(rule, index) {
                Some(MemoEntry::Failed) => {
                    self.state.failed = true;
                    return Err(RecognitionError::Backtracking);
                }
                Some(MemoEntry::Parsed { stop }) => {
                    self.input.seek(stop);
                    return Ok(None);
                }
                None => {}
            }
        }
        let token = self.input.current_symbol();
        self.state.push_frame(rule, Bitset::new(0), index);
        trace!(rule = rule.name, index, "enter tree rule");
        Ok(Some(RuleStart { rule, index, token }))
    }

    /// Pop the rule's frame. A failure that escapes the rule body is
    /// reported here and fails the walk.
    pub fn exit_rule<N>(
        &mut self,
        start: RuleStart,
        outcome: RecognitionResult<N>,
    ) -> RecognitionResult<N> {
        let result = match outcome {
            Err(RecognitionError::Failed(failure))
                if self.state.backtracking == 0 && !self.state.is_failed() =>
            {
                self.state.report(&failure);
                debug!(rule = start.rule.name, index = failure.index, "tree walk failed");
                Err(self.state.escalate(*failure).into())
            }
            other => other,
        };
        if self.state.backtracking > 0 && self.state.options().memoize {
            let entry = match &result {
                Ok(_) => MemoEntry::Parsed {
                    stop: self.input.index(),
                },
                Err(_) => MemoEntry::Failed,
            };
            self.state.memoize(start.rule, start.index, entry);
        }
        self.state.pop_frame();
        result
    }

    /// Match a node of type `ttype` (or a `DOWN`/`UP` marker, which yields
    /// `None`).
    pub fn match_token(&mut self, ttype: TokenType) -> RecognitionResult<Option<NodeId>> {
        if self.input.la(1) == ttype {
            return Ok(self.matched());
        }
        Err(self.fail(
            FailureKind::MismatchedToken { expected: ttype },
            Some(Bitset::of(&[ttype])),
        ))
    }

    pub fn match_set(&mut self, set: &Bitset) -> RecognitionResult<Option<NodeId>> {
        if set.member(self.input.la(1)) {
            return Ok(self.matched());
        }
        Err(self.fail(FailureKind::MismatchedSet, Some(set.clone())))
    }

    /// Match `DOWN`, if the current node has children.
    pub fn match_down(&mut self) -> RecognitionResult<()> {
        self.match_token(DOWN).map(drop)
    }

    pub fn match_up(&mut self) -> RecognitionResult<()> {
        self.match_token(UP).map(drop)
    }

    /// Match the current node together with its whole subtree (the `.`
    /// wildcard). Returns the subtree's root.
    pub fn match_any(&mut self) -> RecognitionResult<Option<NodeId>> {
        if matches!(self.input.la(1), EOF | DOWN | UP) {
            return Err(self.fail(
                FailureKind::MismatchedNotSet,
                Some(Bitset::of(&[EOF, DOWN, UP])),
            ));
        }
        let root = self.matched();
        if self.input.la(1) == DOWN {
            self.input.consume();
            let mut level = 1usize;
            while level > 0 {
                match self.input.la(1) {
                    DOWN => level += 1,
                    UP => level -= 1,
                    EOF => break,
                    _ => {}
                }
                self.input.consume();
            }
        }
        Ok(root)
    }

    fn matched(&mut self) -> Option<NodeId> {
        let node = self.input.lt(1);
        self.input.consume();
        self.state.error_recovery = false;
        self.state.failed = false;
        node
    }
}

impl<'t> Recognize for TreeParser<'t> {
    type Input = TreeNodeStream<'t>;

    fn input(&mut self) -> &mut TreeNodeStream<'t> {
        &mut self.input
    }

    fn state(&self) -> &RecognizerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RecognizerState {
        &mut self.state
    }
}
