//! Shared test fixtures: token vocabulary, token sources and a
//! hand-written calculator grammar and tree grammar driving the runtime
//! like generated code.

pub mod eval;
pub mod fixtures;
