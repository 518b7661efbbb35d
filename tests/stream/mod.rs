//! Stream layer tests
//!
//! - Mark/rewind/release discipline over character and token streams
//! - Lazy buffering, channels and lookahead over a logos token source
//! - Token rewriting over a filled buffer

pub mod tests_marks;
pub mod tests_token_stream;
