use crate::config::compile_time::{file_processing, lexical, symbols, syntax};
use crate::file_processor::SOURCE_EXTENSION;
use crate::grammar::GrammarTable;

pub const STAGES: [&str; 4] = ["file processing", "lexical", "syntax", "symbols"];

/// Capabilities and limits baked into this build
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    pub version: &'static str,
    pub stages: Vec<&'static str>,
    pub grammar_nonterminals: usize,
    pub grammar_productions: usize,
    pub max_file_size: u64,
    pub max_token_count: usize,
    pub max_stack_depth: usize,
    pub max_scopes: usize,
    pub supported_extensions: Vec<String>,
    pub config_source: String,
}

impl PipelineInfo {
    pub fn report(&self) -> String {
        format!(
            "FusionCod front end v{}:\n\
             - Stages: {}\n\
             - Embedded grammar: {} nonterminals, {} productions\n\
             - Max file size: {} bytes\n\
             - Max tokens per file: {}\n\
             - Max parser stack depth: {}\n\
             - Max scopes: {}\n\
             - Supported extensions: {}\n\
             - Limits: {}",
            self.version,
            self.stages.join(" -> "),
            self.grammar_nonterminals,
            self.grammar_productions,
            self.max_file_size,
            self.max_token_count,
            self.max_stack_depth,
            self.max_scopes,
            self.supported_extensions.join(", "),
            self.config_source
        )
    }

    pub fn summary(&self) -> String {
        format!(
            "{}-stage FusionCod front end for .{} sources",
            self.stages.len(),
            self.supported_extensions.join(", .")
        )
    }
}

pub fn get_pipeline_info() -> PipelineInfo {
    let (grammar_nonterminals, grammar_productions) = GrammarTable::default_grammar()
        .map(|g| (g.nonterminal_count(), g.production_count()))
        .unwrap_or((0, 0));

    PipelineInfo {
        version: env!("CARGO_PKG_VERSION"),
        stages: STAGES.to_vec(),
        grammar_nonterminals,
        grammar_productions,
        max_file_size: file_processing::MAX_FILE_SIZE,
        max_token_count: lexical::MAX_TOKEN_COUNT,
        max_stack_depth: syntax::MAX_STACK_DEPTH,
        max_scopes: symbols::MAX_SCOPES,
        supported_extensions: vec![SOURCE_EXTENSION.to_string()],
        config_source: crate::config::build_info::source_info(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_info() {
        let info = get_pipeline_info();
        assert_eq!(info.stages.len(), 4);
        assert!(info.grammar_nonterminals > 0);
        assert!(info.report().contains("lexical -> syntax"));
        assert_eq!(info.summary(), "4-stage FusionCod front end for .fc sources");
    }
}
