//! Diagnostics collected by recognizers.
//!
//! A [`SyntaxError`] is what callers see of a recognition failure: the
//! rendered message, where it happened, the rule path and, for inline
//! repairs, a suggested fix. Recovery notes (skipped input) are recorded
//! with [`Severity::Hint`] so they never count as errors.

use std::fmt;

use text_size::{TextRange, TextSize};

use super::codes::ErrorCode;
use super::context::RuleContext;
use super::failure::Failure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
    /// Recovery bookkeeping, not a problem in the input by itself
    Hint,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Hint => "hint",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A second location a diagnostic points at, such as where
/// resynchronization resumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub message: String,
    pub range: TextRange,
}

impl RelatedInfo {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// One reported recognition problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    /// Byte range of the offending input
    pub range: TextRange,
    /// 1-based line of the offending input
    pub line: u32,
    /// 0-based column of the offending input
    pub column: u32,
    pub code: ErrorCode,
    pub severity: Severity,
    /// Suggested fix, set for inline repairs
    pub hint: Option<String>,
    pub related: Vec<RelatedInfo>,
    /// Rules active when the failure was detected
    pub context: RuleContext,
}

impl SyntaxError {
    /// The diagnostic for a finalized failure.
    pub fn from_failure(failure: &Failure) -> Self {
        Self::builder(failure.code())
            .message(failure.message.clone())
            .range(failure.found.range)
            .position(failure.found.line, failure.found.column)
            .context(failure.context.clone())
            .build()
    }

    /// Start a diagnostic carrying `code`'s default message at offset 0.
    pub fn builder(code: ErrorCode) -> SyntaxErrorBuilder {
        SyntaxErrorBuilder(SyntaxError {
            message: code.default_message().to_string(),
            range: TextRange::empty(TextSize::new(0)),
            line: 0,
            column: 0,
            code,
            severity: Severity::Error,
            hint: None,
            related: Vec::new(),
            context: RuleContext::default(),
        })
    }

    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

/// `line:column severity[code]: message (in rule r)`, with the hint on a
/// second line.
impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}[{}]: {}",
            self.line, self.column, self.severity, self.code, self.message
        )?;
        if !self.context.is_empty() {
            write!(f, " ({})", self.context.description())?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\n  hint: {hint}")?;
        }
        Ok(())
    }
}

/// Fluent construction of a [`SyntaxError`].
#[derive(Debug, Clone)]
pub struct SyntaxErrorBuilder(SyntaxError);

impl SyntaxErrorBuilder {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.0.message = message.into();
        self
    }

    pub fn range(mut self, range: TextRange) -> Self {
        self.0.range = range;
        self
    }

    pub fn position(mut self, line: u32, column: u32) -> Self {
        self.0.line = line;
        self.0.column = column;
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.0.severity = severity;
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.0.hint = Some(hint.into());
        self
    }

    pub fn related(mut self, message: impl Into<String>, range: TextRange) -> Self {
        self.0.related.push(RelatedInfo::new(message, range));
        self
    }

    pub fn context(mut self, context: RuleContext) -> Self {
        self.0.context = context;
        self
    }

    pub fn build(self) -> SyntaxError {
        self.0
    }
}
