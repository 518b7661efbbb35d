//! Tree construction for parsers with tree output.
//!
//! The parser reports matched tokens and finished rules to a
//! [`TreeAdaptor`]; it never looks inside the trees. Every call is
//! suppressed while backtracking.
//!
//! - `arena`: [`Tree`], an index-addressed node arena, and
//!   [`ArenaAdaptor`] building into it
//! - `green`: export of arena trees as rowan green trees
//! - `node_stream`: [`TreeNodeStream`], a finished tree read back as a
//!   stream with `DOWN`/`UP` markers so tree grammars can walk it

mod arena;
pub mod green;
mod node_stream;

pub use arena::{ArenaAdaptor, NodeData, NodeId, Tree};
pub use node_stream::TreeNodeStream;

use crate::base::Token;
use crate::errors::RecognitionResult;

/// Tree-building capability used by recognizers.
pub trait TreeAdaptor {
    type Node: Copy + Eq + std::fmt::Debug;

    /// A list node with no token. Children added to it are hoisted into
    /// whatever it is later added to.
    fn nil(&mut self) -> Self::Node;

    fn create(&mut self, token: Token) -> Self::Node;

    /// Node standing for input skipped by recovery.
    fn error_node(&mut self, start: Option<&Token>, stop: Option<&Token>, text: &str) -> Self::Node;

    fn is_nil(&self, node: Self::Node) -> bool;

    /// Append `child` to `parent`; a nil `child` contributes its children.
    fn add_child(&mut self, parent: Self::Node, child: Self::Node);

    /// Make `new_root` the parent of `old_root` and return the new root.
    /// A nil `new_root` with a single child is replaced by that child; with
    /// several children it cannot be a root.
    fn become_root(&mut self, new_root: Self::Node, old_root: Self::Node) -> RecognitionResult<Self::Node>;

    /// Collapse a rule's nil root: no children gives no tree, a single
    /// child becomes the result.
    fn rule_post_processing(&mut self, root: Self::Node) -> Option<Self::Node>;

    /// Record the token range `start..=stop` a node covers.
    fn set_token_boundaries(&mut self, node: Self::Node, start: Option<usize>, stop: Option<usize>);
}
