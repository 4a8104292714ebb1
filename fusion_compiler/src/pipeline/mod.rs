//! The front end as one pipeline: file -> lexical -> syntax -> symbols
//!
//! Lexical errors do not stop the parse, so a run reports every lexical error
//! together with the first syntax error. Any lexical error still fails the run,
//! and symbols are only built from a successful parse.

mod error;
mod info;
pub mod output;
mod result;
mod validation;

pub use error::{Diagnostic, PipelineError};
pub use info::{get_pipeline_info, PipelineInfo, STAGES};
pub use output::{write_outputs, EmitSet, OutputOptions, PipelineOutput};
pub use result::{PipelineResult, StageDurations};
pub use validation::validate_pipeline;

use crate::config::compile_time::security::MAX_PROCESSING_TIME_SECONDS;
use crate::config::runtime::SymbolPreferences;
use crate::grammar::GrammarTable;
use crate::logging;
use crate::syntax::ParseOutcome;
use crate::{file_processor, lexical, symbols, syntax};
use std::path::PathBuf;
use std::time::Instant;

/// Run a file through every stage using the embedded grammar
pub fn process_file(file_path: &str) -> Result<PipelineResult, PipelineError> {
    let grammar = crate::grammar::load_grammar(None)?;
    process_file_with_grammar(file_path, &grammar)
}

pub fn process_file_with_grammar(
    file_path: &str,
    grammar: &GrammarTable,
) -> Result<PipelineResult, PipelineError> {
    process_file_with_id(file_path, 0, grammar)
}

/// `file_id` identifies the file in the error collector during batch runs
pub(crate) fn process_file_with_id(
    file_path: &str,
    file_id: usize,
    grammar: &GrammarTable,
) -> Result<PipelineResult, PipelineError> {
    logging::with_file_context(PathBuf::from(file_path), file_id, || {
        let start = Instant::now();
        crate::log_info!("Starting FusionCod pipeline", "file" => file_path);

        let file_result = file_processor::process_file(file_path)?;
        let mut result = run_stages(&file_result.metadata.stem(), &file_result.source, grammar)?;

        result.file_path = Some(file_result.metadata.path.clone());
        result.durations.file = file_result.processing_duration;
        result.file_metadata = Some(file_result.metadata);
        result.durations.total = start.elapsed();

        if result.durations.total.as_secs() > MAX_PROCESSING_TIME_SECONDS {
            crate::log_warning!("File exceeded the processing time budget",
                "file" => file_path,
                "seconds" => result.durations.total.as_secs(),
                "limit" => MAX_PROCESSING_TIME_SECONDS
            );
        }

        result.log_success();
        Ok(result)
    })
}

/// Run in-memory source through lexical, syntax and symbol stages
pub fn process_source(
    name: &str,
    source: &str,
    grammar: &GrammarTable,
) -> Result<PipelineResult, PipelineError> {
    let start = Instant::now();
    crate::log_info!("Starting FusionCod pipeline", "source" => name);

    let mut result = run_stages(name, source, grammar)?;
    result.durations.total = start.elapsed();

    result.log_success();
    Ok(result)
}

fn run_stages(
    name: &str,
    source: &str,
    grammar: &GrammarTable,
) -> Result<PipelineResult, PipelineError> {
    let stage = Instant::now();
    let mut lexer = lexical::create_lexer()?;
    let lexed = lexer.tokenize(source);
    let lexical_metrics = lexer.metrics().clone();
    let lexical_time = stage.elapsed();

    let stage = Instant::now();
    let outcome = syntax::parse_tokens(grammar, &lexed.with_end_marker());
    let syntax_time = stage.elapsed();

    if !lexed.is_clean() {
        return Err(PipelineError::LexicalErrors {
            errors: lexed.errors,
            syntax: outcome.errors.into_iter().next(),
        });
    }

    let ParseOutcome {
        tree,
        errors,
        metrics: parse_metrics,
        ..
    } = outcome;
    let Some(tree) = tree else {
        return Err(errors.into_iter().next().map(PipelineError::from).unwrap_or_else(|| {
            PipelineError::pipeline_error("parse failed without a diagnostic")
        }));
    };

    let stage = Instant::now();
    let built = symbols::build_symbol_table_with_preferences(&tree, SymbolPreferences::default())?;
    let symbols_time = stage.elapsed();

    Ok(PipelineResult {
        file_path: None,
        name: name.to_string(),
        file_metadata: None,
        tokens: lexed.tokens,
        lexical_metrics,
        tree,
        parse_metrics,
        symbols: built.table,
        warnings: built.warnings,
        durations: StageDurations {
            lexical: lexical_time,
            syntax: syntax_time,
            symbols: symbols_time,
            ..Default::default()
        },
    })
}
