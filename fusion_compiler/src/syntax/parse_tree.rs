//! Arena-backed concrete parse tree
//!
//! Nodes are stored by id. Id 0 is the synthetic end-marker node matched
//! against `$`; id 1 is the start symbol and the root of the tree. All other
//! ids follow creation order. The tree is read-only once the parser returns it.

use crate::grammar::EPSILON_LABEL;
use crate::tokens::{Literal, Token};
use crate::utils::Position;
use serde::Serialize;

pub type NodeId = usize;

pub const END_MARKER_NODE: NodeId = 0;
pub const ROOT_NODE: NodeId = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseNode {
    pub id: NodeId,
    pub symbol: String,
    pub value: Option<Literal>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub is_terminal: bool,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl ParseNode {
    fn new(id: NodeId, symbol: &str, is_terminal: bool, parent: Option<NodeId>) -> Self {
        Self {
            id,
            symbol: symbol.to_string(),
            value: None,
            line: None,
            column: None,
            is_terminal,
            children: Vec::new(),
            parent,
        }
    }

    /// Terminal child standing for an empty derivation
    pub fn is_epsilon(&self) -> bool {
        self.is_terminal && self.symbol == EPSILON_LABEL
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn position(&self) -> Option<Position> {
        match (self.line, self.column) {
            (Some(line), Some(column)) => Some(Position::new(line, column)),
            _ => None,
        }
    }

    /// Token value as text, empty when the node was never bound
    pub fn value_text(&self) -> String {
        self.value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseTree {
    nodes: Vec<ParseNode>,
}

impl ParseTree {
    /// Tree holding only the end-marker node and the start-symbol root
    pub(crate) fn with_start(start_symbol: &str) -> Self {
        Self {
            nodes: vec![
                ParseNode::new(END_MARKER_NODE, "$", true, None),
                ParseNode::new(ROOT_NODE, start_symbol, false, None),
            ],
        }
    }

    /// Append a child under `parent` and return its id
    pub(crate) fn add_child(&mut self, parent: NodeId, symbol: &str, is_terminal: bool) -> NodeId {
        let id = self.nodes.len();
        self.nodes
            .push(ParseNode::new(id, symbol, is_terminal, Some(parent)));
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        id
    }

    /// Copy a matched token's value and position onto a terminal node
    pub(crate) fn bind_token(&mut self, id: NodeId, token: &Token) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.value = Some(token.value.clone());
            node.line = Some(token.line);
            node.column = Some(token.column);
        }
    }

    pub fn root(&self) -> &ParseNode {
        &self.nodes[ROOT_NODE]
    }

    pub fn end_marker(&self) -> &ParseNode {
        &self.nodes[END_MARKER_NODE]
    }

    pub fn node(&self, id: NodeId) -> Option<&ParseNode> {
        self.nodes.get(id)
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &ParseNode> + '_ {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|child| self.nodes.get(*child))
    }

    pub fn parent(&self, id: NodeId) -> Option<&ParseNode> {
        self.nodes
            .get(id)
            .and_then(|node| node.parent)
            .and_then(|parent| self.nodes.get(parent))
    }

    /// First child of `id` whose symbol is `symbol`
    pub fn child_by_symbol(&self, id: NodeId, symbol: &str) -> Option<&ParseNode> {
        self.children(id).find(|child| child.symbol == symbol)
    }

    /// Pre-order walk from the root
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![ROOT_NODE],
        }
    }

    /// Nodes in the tree rooted at [`ROOT_NODE`]; the end-marker node is not counted
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Childless nodes in left-to-right order
    pub fn leaves(&self) -> Vec<&ParseNode> {
        self.iter().filter(|node| node.is_leaf()).collect()
    }

    /// Longest root-to-leaf path, counting the root as depth 1
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(ROOT_NODE, 1usize)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Some(node) = self.nodes.get(id) {
                stack.extend(node.children.iter().map(|child| (*child, depth + 1)));
            }
        }
        deepest
    }

    /// Every node including the end marker, ordered by id
    pub fn nodes(&self) -> &[ParseNode] {
        &self.nodes
    }
}

pub struct PreOrder<'a> {
    tree: &'a ParseTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a ParseNode;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.nodes.get(id)?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
