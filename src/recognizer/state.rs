//! Mutable per-run recognizer state.

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};
use tracing::debug;

use super::{Mode, RecognizerOptions, Rule};
use crate::base::{Bitset, EOR_TOKEN_TYPE, Vocabulary};
use crate::errors::{ErrorCode, Failure, RuleContext, Severity, SyntaxError};

/// One active rule invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFrame {
    pub rule: Rule,
    /// Tokens that may follow this invocation at its call site
    pub follow: Bitset,
    /// Input index where the rule started
    pub start_index: usize,
    /// Identity of the frame stack up to and including this frame
    signature: u64,
}

/// Outcome of a rule recorded while backtracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoEntry {
    /// The rule matched and stopped before `stop`
    Parsed { stop: usize },
    Failed,
}

/// What [`RecognizerState::report`] did with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Recorded,
    /// An earlier error is still being recovered from
    Suppressed,
    /// Recorded, and the error budget is now exceeded
    BudgetExhausted,
}

/// Everything a recognizer mutates during one run.
///
/// Created with the recognizer, discarded with it. The follow-set cache is
/// keyed by a hash of the active frames and is never shared.
#[derive(Debug, Clone)]
pub struct RecognizerState {
    frames: Vec<RuleFrame>,
    /// Nesting depth of speculative parsing
    pub backtracking: u32,
    /// Set between a reported error and the next successful match
    pub error_recovery: bool,
    /// Set when a speculative match failed
    pub failed: bool,
    /// Input index of the last resynchronization
    pub last_error_index: Option<usize>,
    /// Errors reported so far
    pub syntax_errors: usize,
    /// Most recent finalized failure
    pub last_failure: Option<Failure>,
    escalated: bool,
    memo: FxHashMap<(u32, usize), MemoEntry>,
    follow_cache: FxHashMap<(u64, bool), Bitset>,
    diagnostics: Vec<SyntaxError>,
    options: RecognizerOptions,
    vocabulary: Vocabulary,
}

impl RecognizerState {
    pub fn new(options: RecognizerOptions, vocabulary: Vocabulary) -> Self {
        Self {
            frames: Vec::new(),
            backtracking: 0,
            error_recovery: false,
            failed: false,
            last_error_index: None,
            syntax_errors: 0,
            last_failure: None,
            escalated: false,
            memo: FxHashMap::default(),
            follow_cache: FxHashMap::default(),
            diagnostics: Vec::new(),
            options,
            vocabulary,
        }
    }

    pub fn options(&self) -> &RecognizerOptions {
        &self.options
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Current position in the recognizer state machine.
    pub fn mode(&self) -> Mode {
        if self.escalated {
            Mode::Failed
        } else if self.backtracking > 0 {
            Mode::Backtracking(self.backtracking)
        } else if self.error_recovery {
            Mode::Recovering
        } else {
            Mode::Normal
        }
    }

    pub fn is_failed(&self) -> bool {
        self.escalated
    }

    /// Enter `Failed`: recovery stops and failures propagate to the caller.
    pub fn escalate(&mut self, failure: Failure) -> Failure {
        self.escalated = true;
        self.last_failure = Some(failure.clone());
        failure
    }

    // =========================================================================
    // Rule invocation stack
    // =========================================================================

    pub fn push_frame(&mut self, rule: Rule, follow: Bitset, start_index: usize) {
        let parent = self.frames.last().map_or(0, |f| f.signature);
        let mut hasher = FxHasher::default();
        parent.hash(&mut hasher);
        rule.index.hash(&mut hasher);
        follow.hash(&mut hasher);
        self.frames.push(RuleFrame {
            rule,
            follow,
            start_index,
            signature: hasher.finish(),
        });
    }

    pub fn pop_frame(&mut self) -> Option<RuleFrame> {
        self.frames.pop()
    }

    pub fn frames(&self) -> &[RuleFrame] {
        &self.frames
    }

    pub fn current_rule(&self) -> Option<Rule> {
        self.frames.last().map(|f| f.rule)
    }

    /// Rule names on the stack, outermost first.
    pub fn context(&self) -> RuleContext {
        RuleContext::new(self.frames.iter().map(|f| f.rule.name).collect())
    }

    /// Union of the follow sets on the stack, innermost outwards.
    ///
    /// With `exact`, the walk stops at the first frame whose follow set
    /// cannot reach the end of its rule (lacks `EOR`), giving the tokens that
    /// can really follow the current rule. Without it, every frame
    /// contributes, giving the resynchronization set.
    pub fn combined_follow(&mut self, exact: bool) -> Bitset {
        let key = (self.frames.last().map_or(0, |f| f.signature), exact);
        if let Some(cached) = self.follow_cache.get(&key) {
            return cached.clone();
        }
        let mut set = Bitset::new(0);
        for (depth, frame) in self.frames.iter().enumerate().rev() {
            set.or_in_place(&frame.follow);
            if exact {
                if !frame.follow.member(EOR_TOKEN_TYPE) {
                    break;
                }
                if depth > 0 {
                    set.remove_type(EOR_TOKEN_TYPE);
                }
            }
        }
        self.follow_cache.insert(key, set.clone());
        set
    }

    /// Resynchronization set: everything that can follow any active rule.
    pub fn error_recovery_set(&mut self) -> Bitset {
        self.combined_follow(false)
    }

    /// What can follow the current rule given the actual callers.
    pub fn context_sensitive_follow(&mut self) -> Bitset {
        self.combined_follow(true)
    }

    // =========================================================================
    // Memoization
    // =========================================================================

    pub fn memo(&self, rule: Rule, start_index: usize) -> Option<MemoEntry> {
        self.memo.get(&(rule.index, start_index)).copied()
    }

    pub fn memoize(&mut self, rule: Rule, start_index: usize, entry: MemoEntry) {
        self.memo.insert((rule.index, start_index), entry);
    }

    pub fn memo_size(&self) -> usize {
        self.memo.len()
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Record a failure as a diagnostic unless one was reported since the
    /// last successful match.
    pub fn report(&mut self, failure: &Failure) -> Report {
        if self.error_recovery {
            debug!(code = %failure.code(), "suppressed cascading error");
            return Report::Suppressed;
        }
        self.syntax_errors += 1;
        self.error_recovery = true;
        debug!(
            code = %failure.code(),
            index = failure.index,
            message = %failure.message,
            "reporting recognition error"
        );
        self.diagnostics.push(SyntaxError::from_failure(failure));
        self.last_failure = Some(failure.clone());

        match self.options.max_errors {
            Some(max) if self.syntax_errors > max => {
                let limit = SyntaxError::builder(ErrorCode::E0902)
                    .message(format!("too many errors (limit {max})"))
                    .range(failure.found.range)
                    .position(failure.found.line, failure.found.column)
                    .context(failure.context.clone())
                    .build();
                self.diagnostics.push(limit);
                Report::BudgetExhausted
            }
            _ => Report::Recorded,
        }
    }

    /// Attach a fix suggestion to the most recent diagnostic.
    pub fn annotate_last(&mut self, hint: impl Into<String>) {
        if let Some(last) = self.diagnostics.last_mut() {
            last.hint = Some(hint.into());
        }
    }

    pub fn push_diagnostic(&mut self, diagnostic: SyntaxError) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[SyntaxError] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn take_diagnostics(&mut self) -> Vec<SyntaxError> {
        std::mem::take(&mut self.diagnostics)
    }
}
