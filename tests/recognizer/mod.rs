//! Recognizer tests
//!
//! - Whole-program parses of the calculator grammar with tree construction
//! - Inline repairs, resynchronization and the error budget
//! - Memoized speculation
//! - A hand-written lexer feeding the parser
//! - A tree grammar walking the parser's output

pub mod tests_lexer_pipeline;
pub mod tests_memoization;
pub mod tests_recovery;
pub mod tests_tree_grammar;
pub mod tests_trees;
