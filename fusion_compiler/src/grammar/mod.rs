//! LL(1) grammar tables for FusionCod
//!
//! The shipped grammar lives in `grammar/fusion_ll1.toml` and is embedded at
//! compile time; a different table can be loaded from disk without code changes.

pub mod table;

pub use table::{
    Cell, GrammarError, GrammarSymbol, GrammarTable, NonTerminalId, Production,
    EPSILON_LABEL, EPSILON_SPELLINGS,
};

use crate::logging::codes;
use crate::{log_error, log_success};
use std::path::Path;

/// Load the grammar at `path`, or the embedded FusionCod grammar when `None`
pub fn load_grammar(path: Option<&Path>) -> Result<GrammarTable, GrammarError> {
    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<embedded>".to_string());

    let result = match path {
        Some(p) => GrammarTable::from_file(p),
        None => GrammarTable::default_grammar(),
    };

    match &result {
        Ok(grammar) => {
            log_success!(codes::success::GRAMMAR_LOADED, "Grammar table loaded",
                "source" => source,
                "nonterminals" => grammar.nonterminal_count(),
                "productions" => grammar.production_count()
            );
        }
        Err(error) => {
            log_error!(error.error_code(), &error.to_string(), "source" => source);
        }
    }

    result
}
