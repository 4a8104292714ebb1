//! Symbol table construction for FusionCod
//!
//! Walks a successful parse tree and records functions, parameters and typed
//! variable declarations in a tree of scopes rooted at "global".

pub mod builder;
pub mod error;
pub mod table;

pub use builder::{SymbolBuildResult, SymbolTableBuilder, DEFAULT_RETURN_TYPE, ENTRY_FUNCTION};
pub use error::{SymbolError, SymbolResult, SymbolWarning};
pub use table::{
    Parameter, Scope, ScopeId, SymbolCategory, SymbolEntry, SymbolRow, SymbolTable,
    GLOBAL_SCOPE, GLOBAL_SCOPE_NAME,
};

use crate::config::runtime::SymbolPreferences;
use crate::logging::codes;
use crate::syntax::ParseTree;
use crate::{log_debug, log_error, log_success};

/// Build the symbol table for `tree` with default preferences
pub fn build_symbol_table(tree: &ParseTree) -> SymbolResult<SymbolBuildResult> {
    build_symbol_table_with_preferences(tree, SymbolPreferences::default())
}

pub fn build_symbol_table_with_preferences(
    tree: &ParseTree,
    preferences: SymbolPreferences,
) -> SymbolResult<SymbolBuildResult> {
    log_debug!("Building symbol table",
        "tree_nodes" => tree.len(),
        "warn_on_redeclaration" => preferences.warn_on_redeclaration
    );

    match SymbolTableBuilder::with_preferences(tree, preferences).build() {
        Ok(result) => {
            log_success!(codes::success::SYMBOL_TABLE_COMPLETE, "Symbol table built",
                "scopes" => result.table.scopes().len(),
                "symbols" => result.table.symbol_count(),
                "warnings" => result.warnings.len()
            );
            Ok(result)
        }
        Err(error) => {
            log_error!(error.error_code(), &error.to_string());
            Err(error)
        }
    }
}

/// Check that every symbol error code is registered
pub fn init_symbol_logging() -> Result<(), String> {
    let symbol_codes = [
        codes::symbols::MALFORMED_TREE,
        codes::symbols::SCOPE_LIMIT_EXCEEDED,
        codes::symbols::SYMBOL_LIMIT_EXCEEDED,
        codes::symbols::PARAMETER_LIMIT_EXCEEDED,
        codes::symbols::WALK_DEPTH_EXCEEDED,
        codes::warnings::SYMBOL_REDECLARED,
    ];

    for code in &symbol_codes {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!(
                "Symbol error code {} has no description",
                code.as_str()
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarTable;
    use crate::lexical;
    use crate::syntax::parse_tokens;

    #[test]
    fn test_build_symbol_table_logs_and_returns() {
        let grammar = GrammarTable::default_grammar().unwrap();
        let tokens = lexical::tokenize("fn main() { saludo text = \"hola\"; }")
            .unwrap()
            .with_end_marker();
        let outcome = parse_tokens(&grammar, &tokens);
        let result = build_symbol_table(outcome.tree.as_ref().unwrap()).unwrap();

        let main = result.table.function_scope("main").unwrap();
        assert_eq!(
            main.get("saludo").unwrap().declared_type.as_deref(),
            Some("text")
        );
    }

    #[test]
    fn test_init_symbol_logging() {
        assert!(init_symbol_logging().is_ok());
    }
}
