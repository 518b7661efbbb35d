//! Export of arena trees as rowan green trees.
//!
//! Token nodes become rowan tokens, nodes with children become rowan nodes
//! whose first token is the node's own token. Nil nodes splice their
//! children into the parent. The caller maps token types to rowan kinds.

use rowan::{GreenNode, GreenNodeBuilder, SyntaxKind};

use super::{NodeId, Tree};
use crate::base::{INVALID_TOKEN_TYPE, TokenType};

/// Convert the subtree at `root` into a green node of kind `root_kind`.
pub fn to_green(
    tree: &Tree,
    root: NodeId,
    root_kind: SyntaxKind,
    kind_of: impl Fn(TokenType) -> SyntaxKind,
) -> GreenNode {
    let mut builder = GreenNodeBuilder::new();
    builder.start_node(root_kind);
    emit(tree, root, &kind_of, &mut builder);
    builder.finish_node();
    builder.finish()
}

fn emit(
    tree: &Tree,
    id: NodeId,
    kind_of: &impl Fn(TokenType) -> SyntaxKind,
    builder: &mut GreenNodeBuilder<'static>,
) {
    let node = tree.node(id);
    if node.is_nil() {
        for &child in node.children() {
            emit(tree, child, kind_of, builder);
        }
        return;
    }
    let (kind, text) = match &node.token {
        Some(token) => (kind_of(token.token_type), token.text.as_str()),
        None => (
            kind_of(INVALID_TOKEN_TYPE),
            node.error.as_deref().unwrap_or(""),
        ),
    };
    if node.children().is_empty() {
        builder.token(kind, text);
        return;
    }
    builder.start_node(kind);
    builder.token(kind, text);
    for &child in node.children() {
        emit(tree, child, kind_of, builder);
    }
    builder.finish_node();
}
