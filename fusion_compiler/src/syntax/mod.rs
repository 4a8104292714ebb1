//! Syntax analysis: token sequence to concrete parse tree
//!
//! The predictive parser is driven entirely by a [`GrammarTable`]; this module
//! adds logging around a parse and startup validation of the syntax codes.

mod error;
mod parse_tree;
mod parser;

pub use error::SyntaxError;
pub use parse_tree::{NodeId, ParseNode, ParseTree, PreOrder, END_MARKER_NODE, ROOT_NODE};
pub use parser::{ParseMetrics, ParseOutcome, PredictiveParser};

use crate::grammar::GrammarTable;
use crate::logging::codes;
use crate::tokens::Token;
use crate::{log_debug, log_error, log_success};

/// Parse `tokens` against `grammar` with global logging
pub fn parse_tokens(grammar: &GrammarTable, tokens: &[Token]) -> ParseOutcome {
    log_debug!("Starting syntax analysis",
        "tokens" => tokens.len(),
        "grammar" => grammar
    );

    let outcome = PredictiveParser::new(grammar).parse(tokens);

    match (&outcome.tree, outcome.first_error()) {
        (Some(tree), _) => {
            log_success!(codes::success::PARSE_TREE_COMPLETE, "Parse tree built",
                "nodes" => tree.len(),
                "depth" => tree.depth(),
                "derivation_steps" => outcome.metrics.derivation_steps
            );
        }
        (None, Some(error)) => match error.span() {
            Some(span) => {
                log_error!(error.error_code(), &error.to_string(),
                    span = span,
                    "expected" => error.expected(),
                    "found" => error.found()
                );
            }
            None => {
                log_error!(error.error_code(), &error.to_string(),
                    "expected" => error.expected()
                );
            }
        },
        (None, None) => {
            log_error!(codes::system::INTERNAL_ERROR, "Parse failed without a diagnostic");
        }
    }

    outcome
}

/// Check that every syntax error code is registered
pub fn init_syntax_logging() -> Result<(), String> {
    let syntax_codes = [
        codes::syntax::MISSING_PRODUCTION,
        codes::syntax::UNDECLARED_TERMINAL,
        codes::syntax::UNEXPECTED_TOKEN,
        codes::syntax::UNEXPECTED_END_OF_INPUT,
        codes::syntax::TRAILING_INPUT,
        codes::syntax::RESOURCE_LIMIT,
    ];

    for code in &syntax_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Syntax error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical;

    #[test]
    fn test_parse_tokens_success() {
        let grammar = GrammarTable::default_grammar().unwrap();
        let tokens = lexical::tokenize("fn main() { x float = -3.14; }")
            .unwrap()
            .with_end_marker();
        let outcome = parse_tokens(&grammar, &tokens);
        assert!(outcome.success);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_parse_tokens_failure_has_no_tree() {
        let grammar = GrammarTable::default_grammar().unwrap();
        let tokens = lexical::tokenize("fn main() {").unwrap().with_end_marker();
        let outcome = parse_tokens(&grammar, &tokens);
        assert!(!outcome.success);
        assert!(outcome.tree.is_none());
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn test_init_syntax_logging() {
        assert!(init_syntax_logging().is_ok());
    }
}
