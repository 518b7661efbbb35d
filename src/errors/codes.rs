//! Diagnostic codes.
//!
//! Codes read `E` followed by four digits; the first two digits name the
//! category:
//! - 01: lexical (character-level matching)
//! - 02: token matching and its inline repairs
//! - 03: decisions (prediction, loops, predicates)
//! - 09: recovery bookkeeping and runtime limits

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCode {
    /// No lexer rule matches the character
    E0101,
    /// A specific character was expected
    E0102,
    /// A character from a range or set was expected
    E0103,

    /// A specific token was expected
    E0201,
    /// A token from a set was expected
    E0202,
    /// A missing token was conjured
    E0203,
    /// An extraneous token was dropped
    E0204,

    /// No alternative of a decision matches the lookahead
    E0301,
    /// A `(...)+` loop matched nothing
    E0302,
    /// A validating semantic predicate failed
    E0303,

    /// Input skipped while resynchronizing
    E0901,
    /// Error budget exhausted
    E0902,
    /// Runtime API misuse
    E0999,
}

impl ErrorCode {
    /// The four digits after the `E`.
    pub fn number(&self) -> u16 {
        match self {
            Self::E0101 => 101,
            Self::E0102 => 102,
            Self::E0103 => 103,
            Self::E0201 => 201,
            Self::E0202 => 202,
            Self::E0203 => 203,
            Self::E0204 => 204,
            Self::E0301 => 301,
            Self::E0302 => 302,
            Self::E0303 => 303,
            Self::E0901 => 901,
            Self::E0902 => 902,
            Self::E0999 => 999,
        }
    }

    pub fn category_description(&self) -> &'static str {
        match self.number() / 100 {
            1 => "lexical error",
            2 => "matching error",
            3 => "decision error",
            _ => "recognition error",
        }
    }

    /// Message used when a diagnostic is built without one.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::E0101 => "no viable alternative at character",
            Self::E0102 => "mismatched character",
            Self::E0103 => "character outside expected set",
            Self::E0201 => "mismatched input",
            Self::E0202 => "input not in expected set",
            Self::E0203 => "missing token",
            Self::E0204 => "extraneous input",
            Self::E0301 => "no viable alternative",
            Self::E0302 => "required loop did not match anything",
            Self::E0303 => "failed predicate",
            Self::E0901 => "input skipped during recovery",
            Self::E0902 => "too many errors",
            Self::E0999 => "runtime misuse",
        }
    }

    /// Single-token insertion or deletion fixed the input in place.
    pub fn is_repair(&self) -> bool {
        matches!(self, Self::E0203 | Self::E0204)
    }

    /// Whether recognition carries on after this diagnostic.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::E0902 | Self::E0999)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.number())
    }
}
