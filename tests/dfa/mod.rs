//! Prediction tests
//!
//! - Table walks, predicates and full simulation against the calculator
//!   grammar's decisions
//! - Automata shared between threads

pub mod tests_prediction;
