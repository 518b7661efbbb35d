//! Mismatch recovery for [`Parser`].
//!
//! Tried in order when a match fails outside backtracking:
//! - single-token deletion: the unit after the offending one is the
//!   expected one, so the offending unit is dropped
//! - single-token insertion: the offending unit can follow the expected
//!   one, so a token is conjured in its place
//! - resynchronization at rule exit: units are consumed until one can
//!   follow some active rule
//!
//! Repairs report a diagnostic and resume normally. Resynchronization
//! leaves the recognizer recovering until the next successful match so
//! cascading errors are not reported.

use text_size::TextRange;
use tracing::debug;

use super::{Parser, Recognize, Report, RuleStart};
use crate::base::{Bitset, EOF, EOR_TOKEN_TYPE, Token, TokenType};
use crate::errors::{
    ErrorCode, Failure, FailureKind, RecognitionResult, RelatedInfo, Severity, SyntaxError,
};
use crate::stream::{IntStream, TokenSource};
use crate::tree::TreeAdaptor;

/// Outcome of an inline repair attempt.
#[derive(Debug)]
pub(super) enum Repair {
    /// The offending token was dropped; holds the matched token
    Deleted(Token),
    /// Holds the conjured token
    Inserted(Token),
    Unrepaired,
}

impl<T: TokenSource, A: TreeAdaptor> Parser<T, A> {
    pub(super) fn repair_token(
        &mut self,
        ttype: TokenType,
        follow: &Bitset,
    ) -> RecognitionResult<Repair> {
        if self.state.options().single_token_deletion && self.input.la(2) == ttype {
            return self.delete_unwanted(Bitset::of(&[ttype]));
        }
        if self.state.options().single_token_insertion && self.mismatch_is_missing_token(follow) {
            return self.insert_missing(ttype);
        }
        Ok(Repair::Unrepaired)
    }

    /// Deletion works for any set; insertion only when the set has a
    /// single member to conjure.
    pub(super) fn repair_set(&mut self, set: &Bitset, follow: &Bitset) -> RecognitionResult<Repair> {
        if set.is_nil() {
            return Ok(Repair::Unrepaired);
        }
        if self.state.options().single_token_deletion && set.member(self.input.la(2)) {
            return self.delete_unwanted(set.clone());
        }
        let mut members = set.types();
        if let (Some(only), None) = (members.next(), members.next()) {
            if self.state.options().single_token_insertion && self.mismatch_is_missing_token(follow)
            {
                return self.insert_missing(only);
            }
        }
        Ok(Repair::Unrepaired)
    }

    /// Whether the current token could legally follow the one we expected.
    ///
    /// A follow set holding `EOR` means the expected token can end the rule,
    /// so what follows the rule's callers is folded in.
    fn mismatch_is_missing_token(&mut self, follow: &Bitset) -> bool {
        if follow.is_nil() {
            return false;
        }
        let mut viable = follow.clone();
        if follow.member(EOR_TOKEN_TYPE) {
            viable.or_in_place(&self.state.context_sensitive_follow());
            if !self.state.frames().is_empty() {
                viable.remove_type(EOR_TOKEN_TYPE);
            }
        }
        viable.member(self.input.la(1)) || viable.member(EOR_TOKEN_TYPE)
    }

    fn delete_unwanted(&mut self, expected: Bitset) -> RecognitionResult<Repair> {
        let failure = self.failure_here(FailureKind::UnwantedToken, Some(expected));
        debug!(
            index = failure.index,
            token = %failure.found.text,
            "single-token deletion"
        );
        let report = self.report_or_escalate(failure)?;
        self.input.consume();
        if report == Report::Recorded {
            let removed = self.input.lb(1).map(|t| t.text.clone()).unwrap_or_default();
            self.state.annotate_last(format!("remove '{removed}'"));
        }
        let token = self.input.current_symbol();
        self.input.consume();
        self.state.error_recovery = false;
        Ok(Repair::Deleted(token))
    }

    fn insert_missing(&mut self, expected: TokenType) -> RecognitionResult<Repair> {
        let failure = self.failure_here(FailureKind::MissingToken { expected }, None);
        let name = self.state.vocabulary().display(expected);
        let token = Token::conjured(expected, format!("<missing {name}>"), &failure.found);
        debug!(index = failure.index, missing = %name, "single-token insertion");
        if self.report_or_escalate(failure)? == Report::Recorded {
            self.state.annotate_last(format!("insert {name}"));
        }
        self.state.error_recovery = false;
        Ok(Repair::Inserted(token))
    }

    /// Report `failure`, escalating to `Failed` once the error budget is
    /// spent.
    fn report_or_escalate(&mut self, failure: Failure) -> RecognitionResult<Report> {
        match self.state.report(&failure) {
            Report::BudgetExhausted => {
                debug!(errors = self.state.syntax_errors, "error budget exhausted");
                Err(self.state.escalate(failure).into())
            }
            report => Ok(report),
        }
    }

    /// Report a failure that escaped a rule body, resynchronize and stand
    /// an error node in for the rule's tree.
    pub(super) fn recover_in_rule(
        &mut self,
        start: &RuleStart,
        failure: Failure,
    ) -> RecognitionResult<Option<A::Node>> {
        let report = self.report_or_escalate(failure.clone())?;
        self.resync(report, failure)?;

        let stop = self.input.lb(1).and_then(|t| t.index);
        let stop_token = self.input.lb(1).cloned();
        let text = match stop {
            Some(stop) if stop >= start.index => self.on_channel_text(start.index, stop),
            _ => String::new(),
        };
        let node = self
            .adaptor_mut()
            .error_node(Some(&start.token), stop_token.as_ref(), &text);
        Ok(Some(node))
    }

    /// Consume until the next token can follow one of the active rules.
    fn resync(&mut self, report: Report, failure: Failure) -> RecognitionResult<()> {
        if self.state.last_error_index == Some(self.input.index()) {
            // Already resynchronized here once; the same token failed again.
            self.input.consume();
        }
        self.state.last_error_index = Some(self.input.index());

        let recovery_set = self.state.error_recovery_set();
        let first = self.input.current_symbol();
        let mut skipped = 0usize;
        while self.input.la(1) != EOF && !recovery_set.member(self.input.la(1)) {
            self.input.consume();
            skipped += 1;
        }
        let resume = self.input.current_symbol();
        debug!(
            skipped,
            resume = %resume.text,
            index = self.input.index(),
            "resynchronized"
        );

        if resume.is_eof() && !recovery_set.member(EOF) {
            debug!("resynchronization ran out of input");
            return Err(self.state.escalate(failure).into());
        }
        if skipped > 0 && report == Report::Recorded {
            let plural = if skipped == 1 { "" } else { "s" };
            let skipped_range = TextRange::new(first.range.start(), resume.range.start());
            let note = SyntaxError::builder(ErrorCode::E0901)
                .message(format!("skipped {skipped} token{plural}"))
                .range(skipped_range)
                .position(first.line, first.column)
                .severity(Severity::Hint)
                .context(failure.context)
                .build()
                .with_related(RelatedInfo::new("resynchronized here", resume.range));
            self.state.push_diagnostic(note);
        }
        Ok(())
    }

    fn on_channel_text(&self, start: usize, stop: usize) -> String {
        let channel = self.input.channel();
        (start..=stop)
            .filter_map(|i| self.input.get(i))
            .filter(|t| t.channel == channel && !t.is_eof())
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
