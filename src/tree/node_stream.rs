//! Arena trees as a stream of nodes for tree grammars.

use smol_str::SmolStr;
use text_size::TextSize;

use super::{NodeId, Tree};
use crate::base::{DOWN, EOF, INVALID_TOKEN_TYPE, Token, TokenType, UP};
use crate::errors::RecognitionResult;
use crate::stream::{IntStream, Mark, MarkStack};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Node(NodeId),
    Down,
    Up,
}

/// Depth-first walk of a subtree, flattened so a recognizer can read it
/// like tokens.
///
/// A node with children is followed by `DOWN`, its children and `UP`:
/// `(+ 1 2)` reads as `+ DOWN 1 2 UP`. Nil nodes contribute only their
/// children, so a nil list root reads as its children in sequence.
#[derive(Debug, Clone)]
pub struct TreeNodeStream<'t> {
    tree: &'t Tree,
    units: Vec<Unit>,
    p: usize,
    marks: MarkStack<usize>,
    name: SmolStr,
}

impl<'t> TreeNodeStream<'t> {
    pub fn new(tree: &'t Tree, root: NodeId) -> Self {
        let mut units = Vec::new();
        flatten(tree, root, &mut units);
        Self {
            tree,
            units,
            p: 0,
            marks: MarkStack::new(),
            name: SmolStr::new_static("<tree>"),
        }
    }

    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = name.into();
        self
    }

    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    /// Number of units, `DOWN` and `UP` included.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// The node `k` units from the cursor (`lt(1)` is the current one).
    /// `None` for `DOWN`, `UP` and past either end.
    pub fn lt(&self, k: isize) -> Option<NodeId> {
        match self.unit_at(k)? {
            Unit::Node(id) => Some(id),
            Unit::Down | Unit::Up => None,
        }
    }

    fn unit_at(&self, k: isize) -> Option<Unit> {
        let index = match k {
            0 => return None,
            k if k > 0 => self.p + (k as usize - 1),
            k => self.p.checked_sub(k.unsigned_abs())?,
        };
        self.units.get(index).copied()
    }

    fn unit_type(&self, unit: Unit) -> TokenType {
        match unit {
            Unit::Node(id) => self.tree.token_type(id),
            Unit::Down => DOWN,
            Unit::Up => UP,
        }
    }

    /// Token of the nearest real node at or before `index`, used to place
    /// navigation and end-of-input symbols.
    fn anchor(&self, index: usize) -> Option<&'t Token> {
        let tree = self.tree;
        self.units[..index.min(self.units.len())]
            .iter()
            .rev()
            .find_map(|unit| match unit {
                Unit::Node(id) => tree.node(*id).token.as_ref(),
                Unit::Down | Unit::Up => None,
            })
    }
}

fn flatten(tree: &Tree, id: NodeId, units: &mut Vec<Unit>) {
    let nil = tree.node(id).is_nil();
    let children = tree.children(id);
    if !nil {
        units.push(Unit::Node(id));
    }
    if children.is_empty() {
        return;
    }
    if !nil {
        units.push(Unit::Down);
    }
    for &child in children {
        flatten(tree, child, units);
    }
    if !nil {
        units.push(Unit::Up);
    }
}

impl IntStream for TreeNodeStream<'_> {
    fn la(&mut self, i: isize) -> TokenType {
        if i == 0 {
            return INVALID_TOKEN_TYPE;
        }
        match self.unit_at(i) {
            Some(unit) => self.unit_type(unit),
            None if i < 0 => INVALID_TOKEN_TYPE,
            None => EOF,
        }
    }

    fn consume(&mut self) {
        if self.p < self.units.len() {
            self.p += 1;
        }
    }

    fn index(&self) -> usize {
        self.p
    }

    fn seek(&mut self, index: usize) {
        self.p = index.min(self.units.len());
    }

    fn mark(&mut self) -> Mark {
        self.marks.push(self.p)
    }

    fn rewind(&mut self, mark: Mark) -> RecognitionResult<()> {
        self.p = self.marks.rewind(mark)?;
        Ok(())
    }

    fn release(&mut self, mark: Mark) -> RecognitionResult<()> {
        self.marks.release(mark)
    }

    fn mark_depth(&self) -> usize {
        self.marks.depth()
    }

    fn source_name(&self) -> &str {
        &self.name
    }

    fn current_symbol(&mut self) -> Token {
        let unit = self.units.get(self.p).copied();
        let anchor = self.anchor(self.p + 1);
        let symbol = match unit {
            Some(Unit::Node(id)) => match &self.tree.node(id).token {
                Some(token) => return token.clone(),
                None => (INVALID_TOKEN_TYPE, self.tree.text(id)),
            },
            Some(Unit::Down) => (DOWN, "DOWN".to_string()),
            Some(Unit::Up) => (UP, "UP".to_string()),
            None => {
                return match anchor {
                    Some(last) => Token::eof(last.range.end(), last.line, last.column),
                    None => Token::eof(TextSize::new(0), 1, 0),
                };
            }
        };
        let (ttype, text) = symbol;
        match anchor {
            Some(near) => Token::conjured(ttype, text, near),
            None => Token::new(ttype, text),
        }
    }
}
