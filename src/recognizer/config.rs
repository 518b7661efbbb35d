//! Recognizer configuration

/// Options controlling recovery, memoization and prediction bounds.
///
/// Supplied when a recognizer is created and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerOptions {
    /// Drop one extraneous token when the next one is the expected one
    pub single_token_deletion: bool,
    /// Conjure a missing token when the current one can follow it
    pub single_token_insertion: bool,
    /// Give up after this many reported errors (`None` = never)
    pub max_errors: Option<usize>,
    /// Record rule outcomes while backtracking
    pub memoize: bool,
    /// Deepest nesting of speculative parses during prediction
    pub max_speculation_depth: u32,
    /// Most units one prediction may look at
    pub max_lookahead: usize,
    /// Warn when full simulation finds several viable alternatives
    pub report_ambiguities: bool,
}

impl Default for RecognizerOptions {
    fn default() -> Self {
        Self {
            single_token_deletion: true,
            single_token_insertion: true,
            max_errors: None,
            memoize: false,
            max_speculation_depth: 64,
            max_lookahead: 4096,
            report_ambiguities: false,
        }
    }
}

impl RecognizerOptions {
    /// Options with inline repairs disabled: every mismatch resynchronizes.
    pub fn without_repairs() -> Self {
        Self {
            single_token_deletion: false,
            single_token_insertion: false,
            ..Self::default()
        }
    }

    pub fn with_max_errors(mut self, max: usize) -> Self {
        self.max_errors = Some(max);
        self
    }

    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }
}
