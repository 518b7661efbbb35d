//! Arena-allocated trees.

use smol_str::SmolStr;

use super::TreeAdaptor;
use crate::base::{INVALID_TOKEN_TYPE, Token, TokenType};
use crate::errors::{RecognitionError, RecognitionResult};

/// Stable index of a node in its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node. Relations are stored as indices; the arena owns every node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeData {
    /// `None` for nil and error nodes
    pub token: Option<Token>,
    /// Skipped input text, for error nodes
    pub error: Option<SmolStr>,
    pub start_index: Option<usize>,
    pub stop_index: Option<usize>,
    parent: Option<NodeId>,
    child_index: usize,
    children: Vec<NodeId>,
}

impl NodeData {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Position among the parent's children
    pub fn child_index(&self) -> usize {
        self.child_index
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_nil(&self) -> bool {
        self.token.is_none() && self.error.is_none()
    }
}

/// Node arena.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child(&self, id: NodeId, i: usize) -> Option<NodeId> {
        self.node(id).children.get(i).copied()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn token_type(&self, id: NodeId) -> TokenType {
        self.node(id)
            .token
            .as_ref()
            .map_or(INVALID_TOKEN_TYPE, |t| t.token_type)
    }

    pub fn text(&self, id: NodeId) -> String {
        let node = self.node(id);
        match (&node.token, &node.error) {
            (Some(token), _) => token.text.to_string(),
            (None, Some(error)) => format!("<error: {error}>"),
            (None, None) => "nil".to_string(),
        }
    }

    /// Detach `id` from its parent, renumbering the remaining siblings.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node_mut(id).parent.take() else {
            return;
        };
        let siblings = &mut self.nodes[parent.index()].children;
        siblings.retain(|&c| c != id);
        let siblings = siblings.clone();
        for (i, sibling) in siblings.into_iter().enumerate() {
            self.node_mut(sibling).child_index = i;
        }
    }

    /// Append `child` under `parent`, moving it from any previous parent.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let index = self.node(parent).children.len();
        self.node_mut(parent).children.push(child);
        let node = self.node_mut(child);
        node.parent = Some(parent);
        node.child_index = index;
    }

    /// LISP-style rendering: `(root child child)`, a nil root lists its
    /// children without parentheses.
    pub fn to_string_tree(&self, id: NodeId) -> String {
        let node = self.node(id);
        if node.children.is_empty() {
            return self.text(id);
        }
        let children: Vec<String> = node
            .children
            .iter()
            .map(|&child| self.to_string_tree(child))
            .collect();
        if node.is_nil() {
            children.join(" ")
        } else {
            format!("({} {})", self.text(id), children.join(" "))
        }
    }
}

/// [`TreeAdaptor`] building into a [`Tree`].
#[derive(Debug, Clone, Default)]
pub struct ArenaAdaptor {
    tree: Tree,
}

impl ArenaAdaptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }
}

impl TreeAdaptor for ArenaAdaptor {
    type Node = NodeId;

    fn nil(&mut self) -> NodeId {
        self.tree.alloc(NodeData::default())
    }

    fn create(&mut self, token: Token) -> NodeId {
        let index = token.index;
        self.tree.alloc(NodeData {
            token: Some(token),
            start_index: index,
            stop_index: index,
            ..NodeData::default()
        })
    }

    fn error_node(&mut self, start: Option<&Token>, stop: Option<&Token>, text: &str) -> NodeId {
        self.tree.alloc(NodeData {
            error: Some(SmolStr::new(text)),
            start_index: start.and_then(|t| t.index),
            stop_index: stop.and_then(|t| t.index),
            ..NodeData::default()
        })
    }

    fn is_nil(&self, node: NodeId) -> bool {
        self.tree.node(node).is_nil()
    }

    fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child {
            return;
        }
        if self.tree.node(child).is_nil() {
            let hoisted = self.tree.children(child).to_vec();
            for grandchild in hoisted {
                self.tree.append(parent, grandchild);
            }
        } else {
            self.tree.append(parent, child);
        }
    }

    fn become_root(&mut self, new_root: NodeId, old_root: NodeId) -> RecognitionResult<NodeId> {
        let mut root = new_root;
        if self.tree.node(new_root).is_nil() {
            match self.tree.children(new_root) {
                [single] => {
                    root = *single;
                    self.tree.detach(root);
                }
                [] => {}
                _ => {
                    return Err(RecognitionError::invalid_argument(
                        "a list of several nodes cannot become a root",
                    ));
                }
            }
        }
        self.add_child(root, old_root);
        Ok(root)
    }

    fn rule_post_processing(&mut self, root: NodeId) -> Option<NodeId> {
        if !self.tree.node(root).is_nil() {
            return Some(root);
        }
        match self.tree.children(root) {
            [] => None,
            [single] => {
                let single = *single;
                self.tree.detach(single);
                Some(single)
            }
            _ => Some(root),
        }
    }

    fn set_token_boundaries(&mut self, node: NodeId, start: Option<usize>, stop: Option<usize>) {
        let data = self.tree.node_mut(node);
        data.start_index = start;
        data.stop_index = stop;
    }
}
