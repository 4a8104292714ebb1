use crate::grammar::GrammarTable;
use crate::logging::codes;

/// Check that every stage is wired up before processing any file
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::file_processor::init_file_processor_logging()?;
    crate::lexical::init_lexical_analysis_logging()?;
    crate::syntax::init_syntax_logging()?;
    crate::symbols::init_symbol_logging()?;

    let grammar = GrammarTable::default_grammar()
        .map_err(|e| format!("Embedded grammar failed to load: {}", e))?;

    crate::lexical::validate_tokenization()?;

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline validation succeeded",
        "stages_validated" => super::info::STAGES.len(),
        "grammar_nonterminals" => grammar.nonterminal_count(),
        "config" => crate::config::build_info::source_info()
    );

    Ok(())
}
