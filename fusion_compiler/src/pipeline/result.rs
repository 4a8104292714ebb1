use crate::file_processor::FileMetadata;
use crate::lexical::LexicalMetrics;
use crate::symbols::{SymbolTable, SymbolWarning};
use crate::syntax::{ParseMetrics, ParseTree};
use crate::tokens::Token;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageDurations {
    pub file: Duration,
    pub lexical: Duration,
    pub syntax: Duration,
    pub symbols: Duration,
    pub total: Duration,
}

impl StageDurations {
    /// (stage, milliseconds) in pipeline order
    pub fn as_millis(&self) -> Vec<(&'static str, f64)> {
        let ms = |d: Duration| d.as_secs_f64() * 1000.0;
        vec![
            ("file", ms(self.file)),
            ("lexical", ms(self.lexical)),
            ("syntax", ms(self.syntax)),
            ("symbols", ms(self.symbols)),
            ("total", ms(self.total)),
        ]
    }
}

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Canonical path when the source came from disk
    pub file_path: Option<PathBuf>,
    /// Stem used to name output artifacts
    pub name: String,
    pub file_metadata: Option<FileMetadata>,
    /// Lexer output without the end marker
    pub tokens: Vec<Token>,
    pub lexical_metrics: LexicalMetrics,
    pub tree: ParseTree,
    pub parse_metrics: ParseMetrics,
    pub symbols: SymbolTable,
    pub warnings: Vec<SymbolWarning>,
    pub durations: StageDurations,
}

impl PipelineResult {
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.symbol_count()
    }

    pub fn log_success(&self) {
        let display_name = self
            .file_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| self.name.clone());

        crate::log_performance!(
            crate::logging::codes::success::PIPELINE_COMPLETE,
            "FusionCod front end pipeline succeeded",
            duration = self.durations.total,
            "file" => display_name,
            "tokens" => self.token_count(),
            "tree_nodes" => self.tree.len(),
            "scopes" => self.symbols.scopes().len(),
            "symbols" => self.symbol_count(),
            "warnings" => self.warnings.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations_in_pipeline_order() {
        let durations = StageDurations {
            lexical: Duration::from_millis(2),
            total: Duration::from_millis(5),
            ..Default::default()
        };
        let millis = durations.as_millis();
        let stages: Vec<&str> = millis.iter().map(|(s, _)| *s).collect();

        assert_eq!(stages, vec!["file", "lexical", "syntax", "symbols", "total"]);
        assert!((millis[1].1 - 2.0).abs() < 1e-9);
        assert!((millis[4].1 - 5.0).abs() < 1e-9);
    }
}
