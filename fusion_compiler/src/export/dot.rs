//! Graphviz renderings of the parse tree and the scope tree

use crate::symbols::{SymbolCategory, SymbolEntry, SymbolTable};
use crate::syntax::{NodeId, ParseNode, ParseTree, ROOT_NODE};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Node attribute shown as the label of each parse tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DotLabel {
    #[default]
    Symbol,
    Line,
    Column,
    Value,
    Id,
    Terminal,
}

impl DotLabel {
    pub const ALL: [DotLabel; 6] = [
        DotLabel::Symbol,
        DotLabel::Line,
        DotLabel::Column,
        DotLabel::Value,
        DotLabel::Id,
        DotLabel::Terminal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DotLabel::Symbol => "symbol",
            DotLabel::Line => "line",
            DotLabel::Column => "column",
            DotLabel::Value => "value",
            DotLabel::Id => "id",
            DotLabel::Terminal => "terminal",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str().eq_ignore_ascii_case(name.trim()))
    }

    fn render(&self, node: &ParseNode) -> String {
        let optional = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_default();
        match self {
            DotLabel::Symbol => node.symbol.clone(),
            DotLabel::Line => optional(node.line),
            DotLabel::Column => optional(node.column),
            DotLabel::Value => node.value_text(),
            DotLabel::Id => node.id.to_string(),
            DotLabel::Terminal => node.is_terminal.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotOptions {
    pub label: DotLabel,
    pub highlight_leaves: bool,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            label: DotLabel::Symbol,
            highlight_leaves: true,
        }
    }
}

fn escape_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render the tree below the root. The end-marker node is not drawn.
///
/// Each node is written before the edges to its children, and every edge is
/// immediately followed by the child's subtree. The output has no trailing
/// newline.
pub fn parse_tree_dot(tree: &ParseTree, options: &DotOptions) -> String {
    let mut out = String::from("digraph {\n");
    let mut stack: Vec<(Option<NodeId>, NodeId)> = vec![(None, ROOT_NODE)];

    while let Some((parent, id)) = stack.pop() {
        let Some(node) = tree.node(id) else { continue };

        if let Some(parent) = parent {
            let _ = writeln!(out, "\t{} -> {}", parent, id);
        }

        let label = escape_quoted(&options.label.render(node));
        if options.highlight_leaves && node.is_leaf() {
            let _ = writeln!(
                out,
                "\t{} [label=\"{}\" fillcolor=lightgrey peripheries=2 style=filled]",
                id, label
            );
        } else {
            let _ = writeln!(
                out,
                "\t{} [label=\"{}\" fillcolor=white style=filled]",
                id, label
            );
        }

        stack.extend(node.children.iter().rev().map(|child| (Some(id), *child)));
    }

    out.push('}');
    out
}

fn escape_record(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '{' | '}' | '|' | '<' | '>' | '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn describe_entry(entry: &SymbolEntry) -> String {
    match entry.category {
        SymbolCategory::Function => format!(
            "{}({}) -> {}",
            entry.name,
            entry.parameter_list(),
            entry.return_type.as_deref().unwrap_or_default()
        ),
        _ => format!(
            "{}: {} ({})",
            entry.name,
            entry.declared_type.as_deref().unwrap_or_default(),
            entry.category
        ),
    }
}

/// One record node per scope listing its entries, with parent to child edges
pub fn scope_tree_dot(table: &SymbolTable) -> String {
    let mut out = String::from("digraph scopes {\n\tnode [shape=record]\n");

    for id in table.scope_order() {
        let Some(scope) = table.scope(id) else { continue };

        let mut label = escape_record(&scope.name);
        label.push('|');
        for entry in scope.entries() {
            label.push_str(&escape_record(&describe_entry(entry)));
            label.push_str("\\l");
        }

        let _ = writeln!(out, "\t{} [label=\"{{{}}}\"]", id, label);
        if let Some(parent) = scope.parent {
            let _ = writeln!(out, "\t{} -> {}", parent, id);
        }
    }

    out.push_str("}\n");
    out
}
