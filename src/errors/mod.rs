//! Recognition error handling module
//!
//! This module provides the error surface of the runtime:
//! - `RecognitionError`, the value every fallible operation returns
//! - `Failure` records with kind, offending input and expected set
//! - Categorized error codes for filtering and documentation
//! - `SyntaxError` diagnostics collected by recognizers during recovery

mod codes;
mod context;
mod error;
mod failure;

pub use codes::ErrorCode;
pub use context::RuleContext;
pub use error::{RelatedInfo, Severity, SyntaxError, SyntaxErrorBuilder};
pub use failure::{Failure, FailureKind, RecognitionError, RecognitionResult};
