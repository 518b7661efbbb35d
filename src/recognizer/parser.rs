//! Token-stream recognizer driven by generated rule code.
//!
//! A generated rule looks like:
//!
//! ```ignore
//! fn stat(&mut self) -> RecognitionResult<Option<NodeId>> {
//!     let Some(start) = self.p.enter_rule(STAT, &FOLLOW_STAT)? else {
//!         return Ok(None); // memoized while backtracking
//!     };
//!     let outcome = self.stat_body(&start);
//!     self.p.exit_rule(start, outcome)
//! }
//! ```
//!
//! `exit_rule` reports and recovers from failures the body did not repair
//! inline, so callers only ever see failures once recovery gave up.

use tracing::trace;

use super::recovery::Repair;
use super::{MemoEntry, Mode, Recognize, RecognizerOptions, RecognizerState, Rule};
use crate::base::{Bitset, Token, TokenType, Vocabulary};
use crate::errors::{FailureKind, RecognitionError, RecognitionResult, SyntaxError};
use crate::stream::{BufferedTokenStream, IntStream, TokenSource};
use crate::tree::{ArenaAdaptor, TreeAdaptor};

/// A rule invocation in progress, returned by [`Parser::enter_rule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleStart {
    pub rule: Rule,
    /// Input index of the rule's first token
    pub index: usize,
    /// The rule's first token
    pub token: Token,
}

/// Parser over a buffered token stream with tree construction.
pub struct Parser<T: TokenSource, A: TreeAdaptor = ArenaAdaptor> {
    pub(super) input: BufferedTokenStream<T>,
    pub(super) state: RecognizerState,
    adaptor: A,
}

impl<T: TokenSource> Parser<T> {
    pub fn new(source: T, vocabulary: Vocabulary) -> Self {
        Self::with_options(source, vocabulary, RecognizerOptions::default())
    }

    pub fn with_options(source: T, vocabulary: Vocabulary, options: RecognizerOptions) -> Self {
        Self::with_adaptor(
            BufferedTokenStream::new(source),
            vocabulary,
            options,
            ArenaAdaptor::new(),
        )
    }
}

impl<T: TokenSource, A: TreeAdaptor> Parser<T, A> {
    pub fn with_adaptor(
        input: BufferedTokenStream<T>,
        vocabulary: Vocabulary,
        options: RecognizerOptions,
        adaptor: A,
    ) -> Self {
        Self {
            input,
            state: RecognizerState::new(options, vocabulary),
            adaptor,
        }
    }

    pub fn tokens(&mut self) -> &mut BufferedTokenStream<T> {
        &mut self.input
    }

    pub fn adaptor(&self) -> &A {
        &self.adaptor
    }

    pub fn adaptor_mut(&mut self) -> &mut A {
        &mut self.adaptor
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn diagnostics(&self) -> &[SyntaxError] {
        self.state.diagnostics()
    }

    pub fn into_parts(self) -> (BufferedTokenStream<T>, RecognizerState, A) {
        (self.input, self.state, self.adaptor)
    }

    // =========================================================================
    // Rule entry and exit
    // =========================================================================

    /// Push a frame for `rule`; `follow` is what may follow this invocation.
    ///
    /// While backtracking with memoization on, a rule already tried at this
    /// position returns `Ok(None)` after skipping to where it stopped, or
    /// fails straight away if it failed before.
    pub fn enter_rule(&mut self, rule: Rule, follow: &Bitset) -> RecognitionResult<Option<RuleStart>> {
        let index = self.input.index();
        if self.state.backtracking > 0 && self.state.options().memoize {
            match self.state.memo(rule, index) {
                Some(MemoEntry::Failed) => {
                    trace!(rule = rule.name, index, "memoized failure");
                    self.state.failed = true;
                    return Err(RecognitionError::Backtracking);
                }
                Some(MemoEntry::Parsed { stop }) => {
                    trace!(rule = rule.name, index, stop, "memoized success");
                    self.input.seek(stop);
                    return Ok(None);
                }
                None => {}
            }
        }
        let token = self.input.current_symbol();
        let index = self.input.index();
        self.state.push_frame(rule, follow.clone(), index);
        trace!(rule = rule.name, index, "enter rule");
        Ok(Some(RuleStart { rule, index, token }))
    }

    /// Pop the rule's frame, recovering from a failure of its body first.
    ///
    /// A recovered failure yields an error node in place of the rule's tree.
    pub fn exit_rule(
        &mut self,
        start: RuleStart,
        outcome: RecognitionResult<Option<A::Node>>,
    ) -> RecognitionResult<Option<A::Node>> {
        let result = match outcome {
            Err(RecognitionError::Failed(failure))
                if self.state.backtracking == 0 && !self.state.is_failed() =>
            {
                self.recover_in_rule(&start, *failure)
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
        trace!(rule = start.rule.name, ok = result.is_ok(), "exit rule");
        result
    }

    // =========================================================================
    // Matching
    // =========================================================================

    /// Match a token of type `ttype`. `follow` is what may come after it,
    /// used to decide whether a missing token can be conjured.
    pub fn match_token(&mut self, ttype: TokenType, follow: &Bitset) -> RecognitionResult<Token> {
        if self.input.la(1) == ttype {
            return Ok(self.matched());
        }
        if self.state.backtracking > 0 {
            self.state.failed = true;
            return Err(RecognitionError::Backtracking);
        }
        match self.repair_token(ttype, follow)? {
            Repair::Deleted(token) | Repair::Inserted(token) => Ok(token),
            Repair::Unrepaired => Err(self.fail(
                FailureKind::MismatchedToken { expected: ttype },
                Some(Bitset::of(&[ttype])),
            )),
        }
    }

    /// Match any member of `set`.
    pub fn match_set(&mut self, set: &Bitset, follow: &Bitset) -> RecognitionResult<Token> {
        if set.member(self.input.la(1)) {
            return Ok(self.matched());
        }
        if self.state.backtracking > 0 {
            self.state.failed = true;
            return Err(RecognitionError::Backtracking);
        }
        match self.repair_set(set, follow)? {
            Repair::Deleted(token) | Repair::Inserted(token) => Ok(token),
            Repair::Unrepaired => Err(self.fail(FailureKind::MismatchedSet, Some(set.clone()))),
        }
    }

    /// Match whatever comes next.
    pub fn match_any(&mut self) -> Token {
        self.matched()
    }

    fn matched(&mut self) -> Token {
        let token = self.input.current_symbol();
        self.input.consume();
        self.state.error_recovery = false;
        self.state.failed = false;
        token
    }

    // =========================================================================
    // Tree construction (suppressed while backtracking)
    // =========================================================================

    /// A fresh nil root for a rule's tree.
    pub fn begin_tree(&mut self) -> Option<A::Node> {
        (self.state.backtracking == 0).then(|| self.adaptor.nil())
    }

    pub fn add_leaf(&mut self, parent: Option<A::Node>, token: &Token) {
        if let Some(parent) = parent.filter(|_| self.state.backtracking == 0) {
            let leaf = self.adaptor.create(token.clone());
            self.adaptor.add_child(parent, leaf);
        }
    }

    pub fn add_subtree(&mut self, parent: Option<A::Node>, child: Option<A::Node>) {
        if let (Some(parent), Some(child)) = (parent, child) {
            if self.state.backtracking == 0 {
                self.adaptor.add_child(parent, child);
            }
        }
    }

    /// Match `ttype` and add it under `parent`.
    pub fn match_child(
        &mut self,
        parent: Option<A::Node>,
        ttype: TokenType,
        follow: &Bitset,
    ) -> RecognitionResult<Token> {
        let token = self.match_token(ttype, follow)?;
        self.add_leaf(parent, &token);
        Ok(token)
    }

    /// Match `ttype` and make it the root over `root`.
    pub fn match_root(
        &mut self,
        root: Option<A::Node>,
        ttype: TokenType,
        follow: &Bitset,
    ) -> RecognitionResult<Option<A::Node>> {
        let token = self.match_token(ttype, follow)?;
        match root.filter(|_| self.state.backtracking == 0) {
            Some(root) => {
                let new_root = self.adaptor.create(token);
                self.adaptor.become_root(new_root, root).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Post-process a rule's root and record the tokens it spans.
    pub fn finish_tree(&mut self, root: Option<A::Node>, start: &RuleStart) -> Option<A::Node> {
        if self.state.backtracking > 0 {
            return None;
        }
        let tree = self.adaptor.rule_post_processing(root?)?;
        let stop = self.input.lb(1).and_then(|t| t.index);
        self.adaptor
            .set_token_boundaries(tree, start.token.index, stop);
        Some(tree)
    }
}

impl<T: TokenSource, A: TreeAdaptor> Recognize for Parser<T, A> {
    type Input = BufferedTokenStream<T>;

    fn input(&mut self) -> &mut BufferedTokenStream<T> {
        &mut self.input
    }

    fn state(&self) -> &RecognizerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RecognizerState {
        &mut self.state
    }
}
