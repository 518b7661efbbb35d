//! Rule context tracking for context-aware error messages
//!
//! A recognizer keeps a stack of active rule invocations. When a failure is
//! detected, the names on that stack are captured so diagnostics can say
//! where in the grammar structure the error occurred.

use std::fmt;

/// The rule-invocation path at the time a failure was detected,
/// outermost rule first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RuleContext {
    rules: Vec<&'static str>,
}

impl RuleContext {
    pub fn new(rules: Vec<&'static str>) -> Self {
        Self { rules }
    }

    pub fn from_names(rules: &[&'static str]) -> Self {
        Self {
            rules: rules.to_vec(),
        }
    }

    /// The rule in which the failure was detected
    pub fn innermost(&self) -> Option<&'static str> {
        self.rules.last().copied()
    }

    pub fn rules(&self) -> &[&'static str] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.rules.len()
    }

    /// Get the invocation path, e.g. `prog > stat > expr`
    pub fn path(&self) -> String {
        self.rules.join(" > ")
    }

    /// Get a human-readable description of this context for error messages
    pub fn description(&self) -> String {
        match self.innermost() {
            Some(rule) => format!("in rule {rule}"),
            None => "at top level".to_string(),
        }
    }
}

impl fmt::Display for RuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("<top level>")
        } else {
            f.write_str(&self.path())
        }
    }
}
