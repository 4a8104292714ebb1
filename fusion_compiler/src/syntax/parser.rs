//! Table-driven LL(1) predictive parser
//!
//! The parser keeps an explicit stack of (node, grammar symbol) pairs. It never
//! recurses, and its behaviour is fully determined by the [`GrammarTable`].
//! The first error ends the parse.

use super::error::SyntaxError;
use super::parse_tree::{NodeId, ParseTree, END_MARKER_NODE, ROOT_NODE};
use crate::config::compile_time::syntax::*;
use crate::grammar::{Cell, GrammarSymbol, GrammarTable, Production, EPSILON_LABEL};
use crate::tokens::{Token, TokenKind};
use crate::utils::Position;

/// Counters for one parse
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParseMetrics {
    pub derivation_steps: usize,
    pub matched_tokens: usize,
    pub epsilon_derivations: usize,
    pub max_stack_depth: usize,
}

/// Result of a parse. `tree` is present exactly when `success` is true.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub success: bool,
    pub tree: Option<ParseTree>,
    pub errors: Vec<SyntaxError>,
    pub metrics: ParseMetrics,
}

impl ParseOutcome {
    fn failed(error: SyntaxError, metrics: ParseMetrics) -> Self {
        Self {
            success: false,
            tree: None,
            errors: vec![error],
            metrics,
        }
    }

    pub fn first_error(&self) -> Option<&SyntaxError> {
        self.errors.first()
    }
}

pub struct PredictiveParser<'g> {
    grammar: &'g GrammarTable,
}

impl<'g> PredictiveParser<'g> {
    pub fn new(grammar: &'g GrammarTable) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &GrammarTable {
        self.grammar
    }

    /// Parse a token sequence that ends with the `$` marker
    pub fn parse(&self, tokens: &[Token]) -> ParseOutcome {
        let grammar = self.grammar;
        let start = grammar.start();
        let mut metrics = ParseMetrics::default();
        let mut tree = ParseTree::with_start(grammar.nonterminal_name(start));

        let mut stack: Vec<(NodeId, GrammarSymbol)> = vec![
            (END_MARKER_NODE, GrammarSymbol::Terminal(TokenKind::EndMarker)),
            (ROOT_NODE, GrammarSymbol::NonTerminal(start)),
        ];
        let mut cursor = 0usize;

        while let Some((node, symbol)) = stack.pop() {
            metrics.derivation_steps += 1;
            if metrics.derivation_steps > MAX_DERIVATION_STEPS {
                return ParseOutcome::failed(
                    SyntaxError::ResourceLimit {
                        limit: "derivation steps",
                        value: metrics.derivation_steps,
                        max: MAX_DERIVATION_STEPS,
                    },
                    metrics,
                );
            }

            let current = tokens.get(cursor);

            match symbol {
                GrammarSymbol::Terminal(expected) => match current {
                    Some(token) if token.kind == expected => {
                        tree.bind_token(node, token);
                        cursor += 1;
                        metrics.matched_tokens += 1;
                    }
                    Some(token) => {
                        return ParseOutcome::failed(
                            SyntaxError::UnexpectedToken {
                                expected: expected.as_str().to_string(),
                                found: token.kind.as_str().to_string(),
                                line: token.line,
                                column: token.column,
                            },
                            metrics,
                        );
                    }
                    None => {
                        let last = last_position(tokens);
                        return ParseOutcome::failed(
                            SyntaxError::UnexpectedEndOfInput {
                                expected: expected.as_str().to_string(),
                                line: last.line,
                                column: last.column,
                            },
                            metrics,
                        );
                    }
                },

                GrammarSymbol::NonTerminal(nonterminal) => {
                    let name = grammar.nonterminal_name(nonterminal);
                    let Some(token) = current else {
                        let last = last_position(tokens);
                        return ParseOutcome::failed(
                            SyntaxError::UnexpectedEndOfInput {
                                expected: name.to_string(),
                                line: last.line,
                                column: last.column,
                            },
                            metrics,
                        );
                    };

                    match grammar.lookup(nonterminal, token.kind) {
                        Cell::Production(Production::Epsilon) => {
                            tree.add_child(node, EPSILON_LABEL, true);
                            metrics.epsilon_derivations += 1;
                        }
                        Cell::Production(Production::Symbols(symbols)) => {
                            let children: Vec<(NodeId, GrammarSymbol)> = symbols
                                .iter()
                                .map(|child| {
                                    let id = tree.add_child(
                                        node,
                                        grammar.symbol_name(child),
                                        child.is_terminal(),
                                    );
                                    (id, *child)
                                })
                                .collect();
                            stack.extend(children.into_iter().rev());
                        }
                        Cell::Empty => {
                            return ParseOutcome::failed(
                                SyntaxError::MissingProduction {
                                    expected: name.to_string(),
                                    found: token.kind.as_str().to_string(),
                                    line: token.line,
                                    column: token.column,
                                },
                                metrics,
                            );
                        }
                        Cell::UndeclaredColumn => {
                            return ParseOutcome::failed(
                                SyntaxError::UndeclaredTerminal {
                                    expected: name.to_string(),
                                    token: token.kind.as_str().to_string(),
                                    line: token.line,
                                    column: token.column,
                                },
                                metrics,
                            );
                        }
                    }
                }
            }

            metrics.max_stack_depth = metrics.max_stack_depth.max(stack.len());
            if stack.len() > MAX_STACK_DEPTH {
                return ParseOutcome::failed(
                    SyntaxError::ResourceLimit {
                        limit: "stack depth",
                        value: stack.len(),
                        max: MAX_STACK_DEPTH,
                    },
                    metrics,
                );
            }
            if tree.len() > MAX_TREE_NODES {
                return ParseOutcome::failed(
                    SyntaxError::ResourceLimit {
                        limit: "tree nodes",
                        value: tree.len(),
                        max: MAX_TREE_NODES,
                    },
                    metrics,
                );
            }
        }

        // An empty stack is not enough: every token, `$` included, must be consumed
        if let Some(extra) = tokens.get(cursor) {
            return ParseOutcome::failed(
                SyntaxError::TrailingInput {
                    found: extra.kind.as_str().to_string(),
                    line: extra.line,
                    column: extra.column,
                },
                metrics,
            );
        }

        ParseOutcome {
            success: true,
            tree: Some(tree),
            errors: Vec::new(),
            metrics,
        }
    }
}

/// Where input ran out: the last token of the slice, or the start of an empty one
fn last_position(tokens: &[Token]) -> Position {
    tokens
        .last()
        .map(|token| Position::new(token.line, token.column))
        .unwrap_or_else(Position::start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical;
    use crate::tokens::Literal;
    use assert_matches::assert_matches;

    const TINY: &str = r#"
start = "S"
terminals = ["id", "plus", "$"]

[productions.S]
id = "id TAIL"

[productions.TAIL]
plus = "plus id TAIL"
"$" = "e"
"#;

    fn token(kind: TokenKind, column: u32) -> Token {
        Token::new(kind, Literal::Raw(kind.as_str().into()), 1, column)
    }

    fn parse_source(source: &str) -> ParseOutcome {
        let grammar = GrammarTable::default_grammar().unwrap();
        let lexed = lexical::tokenize(source).unwrap();
        assert!(lexed.is_clean(), "lexical errors: {:?}", lexed.errors);
        PredictiveParser::new(&grammar).parse(&lexed.with_end_marker())
    }

    #[test]
    fn test_epsilon_child_without_consuming_input() {
        let grammar = GrammarTable::from_toml_str(TINY).unwrap();
        let tokens = vec![token(TokenKind::Id, 1), token(TokenKind::EndMarker, 2)];
        let outcome = PredictiveParser::new(&grammar).parse(&tokens);

        assert!(outcome.success);
        let tree = outcome.tree.unwrap();
        let tail = tree.child_by_symbol(ROOT_NODE, "TAIL").unwrap();
        let children: Vec<_> = tree.children(tail.id).collect();
        assert_eq!(children.len(), 1);
        assert!(children[0].is_epsilon());
        assert!(children[0].value.is_none());
        assert_eq!(tree.end_marker().column, Some(2));
        assert_eq!(outcome.metrics.epsilon_derivations, 1);
    }

    #[test]
    fn test_children_in_production_order() {
        let grammar = GrammarTable::from_toml_str(TINY).unwrap();
        let tokens = vec![
            token(TokenKind::Id, 1),
            token(TokenKind::Plus, 2),
            token(TokenKind::Id, 3),
            token(TokenKind::EndMarker, 4),
        ];
        let outcome = PredictiveParser::new(&grammar).parse(&tokens);
        let tree = outcome.tree.unwrap();

        let symbols: Vec<&str> = tree.iter().map(|n| n.symbol.as_str()).collect();
        assert_eq!(
            symbols,
            vec!["S", "id", "TAIL", "plus", "id", "TAIL", "epsilon"]
        );
        let ids: Vec<NodeId> = tree.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(outcome.metrics.matched_tokens, 4);
    }

    #[test]
    fn test_missing_production_is_first_and_only_error() {
        let grammar = GrammarTable::from_toml_str(TINY).unwrap();
        let tokens = vec![token(TokenKind::Plus, 1), token(TokenKind::EndMarker, 2)];
        let outcome = PredictiveParser::new(&grammar).parse(&tokens);

        assert!(!outcome.success);
        assert!(outcome.tree.is_none());
        assert_eq!(outcome.errors.len(), 1);
        assert_matches!(
            &outcome.errors[0],
            SyntaxError::MissingProduction { expected, found, line: 1, column: 1 }
                if expected == "S" && found == "plus"
        );
    }

    #[test]
    fn test_undeclared_column() {
        let grammar = GrammarTable::from_toml_str(TINY).unwrap();
        let tokens = vec![token(TokenKind::Semicolon, 1), token(TokenKind::EndMarker, 2)];
        let outcome = PredictiveParser::new(&grammar).parse(&tokens);
        assert_matches!(&outcome.errors[0], SyntaxError::UndeclaredTerminal { .. });
        assert_eq!(outcome.errors[0].found(), "epsilon");
    }

    #[test]
    fn test_trailing_input_after_end_marker() {
        let grammar = GrammarTable::from_toml_str(TINY).unwrap();
        let tokens = vec![
            token(TokenKind::Id, 1),
            token(TokenKind::EndMarker, 2),
            token(TokenKind::Id, 3),
        ];
        let outcome = PredictiveParser::new(&grammar).parse(&tokens);
        assert!(!outcome.success);
        assert_matches!(
            &outcome.errors[0],
            SyntaxError::TrailingInput { column: 3, .. }
        );
    }

    #[test]
    fn test_missing_end_marker() {
        let grammar = GrammarTable::from_toml_str(TINY).unwrap();
        let tokens = vec![token(TokenKind::Id, 1)];
        let outcome = PredictiveParser::new(&grammar).parse(&tokens);
        assert_matches!(
            &outcome.errors[0],
            SyntaxError::UnexpectedEndOfInput { expected, line: 1, column: 1 } if expected == "TAIL"
        );
        assert_eq!(outcome.errors[0].position(), Some(Position::new(1, 1)));
    }

    #[test]
    fn test_truncated_terminal_points_at_last_token() {
        let grammar = GrammarTable::from_toml_str(TINY).unwrap();
        let tokens = vec![token(TokenKind::Id, 1), token(TokenKind::Plus, 3)];
        let outcome = PredictiveParser::new(&grammar).parse(&tokens);
        assert!(!outcome.success);
        assert_matches!(
            &outcome.errors[0],
            SyntaxError::UnexpectedEndOfInput { expected, line: 1, column: 3 } if expected == "id"
        );
    }

    #[test]
    fn test_terminal_mismatch_reports_unexpected_token() {
        let source = r#"
start = "S"
terminals = ["id", "plus", "$"]

[productions.S]
id = "id plus"
"#;
        let grammar = GrammarTable::from_toml_str(source).unwrap();
        let tokens = vec![
            token(TokenKind::Id, 1),
            token(TokenKind::Id, 2),
            token(TokenKind::EndMarker, 3),
        ];
        let outcome = PredictiveParser::new(&grammar).parse(&tokens);
        assert_matches!(
            &outcome.errors[0],
            SyntaxError::UnexpectedToken { expected, found, column: 2, .. }
                if expected == "plus" && found == "id"
        );
    }

    #[test]
    fn test_fusion_program_parses() {
        let outcome = parse_source(
            r#"
fn main() {
    x int = 5;
    show("x es", x);
}
"#,
        );
        assert!(outcome.success, "errors: {:?}", outcome.errors);
        let tree = outcome.tree.unwrap();
        assert_eq!(tree.root().symbol, "PROGRAM");
        assert_eq!(tree.end_marker().symbol, "$");
        assert!(tree.end_marker().line.is_some());
    }

    #[test]
    fn test_fusion_control_flow_parses() {
        let outcome = parse_source(
            r#"
fn suma(a int, b int) int {
    return a + b * 2;
}

fn main() {
    total int = suma(1, 2);
    if (total > 3 and total <> 10) {
        show(total);
    } elif (total == 3) {
        stop;
    } else {
        read(total);
    }
    while (total < 100) {
        total = total * 2;
    }
    for (i int = 0; i < 10; i = i + 1) {
        show(i % 3);
    }
}
"#,
        );
        assert!(outcome.success, "errors: {:?}", outcome.errors);
    }

    #[test]
    fn test_fusion_missing_semicolon() {
        let outcome = parse_source("fn main() {\n  x int = 5\n}");
        assert!(!outcome.success);
        assert_matches!(
            &outcome.errors[0],
            SyntaxError::MissingProduction { expected, found, line: 3, column: 1 }
                if expected == "TERM_TAIL" && found == "rbrace"
        );
    }

    #[test]
    fn test_every_token_consumed_on_success() {
        let grammar = GrammarTable::default_grammar().unwrap();
        let tokens = lexical::tokenize("fn main() { stop; }")
            .unwrap()
            .with_end_marker();
        let outcome = PredictiveParser::new(&grammar).parse(&tokens);
        assert!(outcome.success);
        assert_eq!(outcome.metrics.matched_tokens, tokens.len());
        let tree = outcome.tree.unwrap();
        let bound = tree
            .iter()
            .filter(|n| n.is_terminal && !n.is_epsilon())
            .count();
        assert_eq!(bound + 1, tokens.len());
    }
}
