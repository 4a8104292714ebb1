//! Serializable run summaries and artifact writing

use super::{PipelineError, PipelineResult};
use crate::config::runtime::OutputPreferences;
use crate::export::{self, DotLabel, DotOptions};
use crate::symbols::SymbolRow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub file: String,
    pub generated_at: DateTime<Utc>,
    pub token_count: usize,
    pub tree_nodes: usize,
    pub tree_depth: usize,
    pub scope_count: usize,
    pub symbol_count: usize,
    pub warnings: Vec<String>,
    pub symbols: Vec<SymbolRow>,
    pub durations_ms: BTreeMap<&'static str, f64>,
}

impl PipelineOutput {
    pub fn new(result: &PipelineResult) -> Self {
        Self {
            file: result
                .file_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| result.name.clone()),
            generated_at: Utc::now(),
            token_count: result.token_count(),
            tree_nodes: result.tree.len(),
            tree_depth: result.tree.depth(),
            scope_count: result.symbols.scopes().len(),
            symbol_count: result.symbol_count(),
            warnings: result.warnings.iter().map(|w| w.to_string()).collect(),
            symbols: result.symbols.rows(),
            durations_ms: result.durations.as_millis().into_iter().collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, PipelineError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PipelineError::pipeline_error(&format!("JSON rendering failed: {}", e)))
    }
}

/// Which artifacts a run writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitSet {
    pub tokens: bool,
    pub tree: bool,
    pub scopes: bool,
    pub symbols: bool,
}

impl EmitSet {
    pub const NAMES: [&'static str; 4] = ["tokens", "tree", "scopes", "symbols"];

    pub fn all() -> Self {
        Self {
            tokens: true,
            tree: true,
            scopes: true,
            symbols: true,
        }
    }

    pub fn none() -> Self {
        Self {
            tokens: false,
            tree: false,
            scopes: false,
            symbols: false,
        }
    }

    /// Parse a comma-separated list such as `tokens,tree`
    pub fn parse(list: &str) -> Result<Self, String> {
        let mut set = Self::none();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match item {
                "tokens" => set.tokens = true,
                "tree" => set.tree = true,
                "scopes" => set.scopes = true,
                "symbols" => set.symbols = true,
                "all" => set = Self::all(),
                other => {
                    return Err(format!(
                        "unknown artifact '{}' (expected one of: {}, all)",
                        other,
                        Self::NAMES.join(", ")
                    ))
                }
            }
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }
}

impl Default for EmitSet {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub dir: PathBuf,
    pub emit: EmitSet,
    pub dot: DotOptions,
}

impl OutputOptions {
    pub fn from_preferences(prefs: &OutputPreferences) -> Self {
        Self {
            dir: PathBuf::from(&prefs.output_dir),
            emit: EmitSet::default(),
            dot: DotOptions {
                label: DotLabel::parse(&prefs.tree_label).unwrap_or_default(),
                highlight_leaves: prefs.highlight_leaves,
            },
        }
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::from_preferences(&OutputPreferences::default())
    }
}

/// Write the selected artifacts for `result`, returning the paths in emit order
pub fn write_outputs(
    result: &PipelineResult,
    options: &OutputOptions,
) -> Result<Vec<PathBuf>, PipelineError> {
    let dir: &Path = &options.dir;
    let stem = result.name.as_str();
    let mut written = Vec::new();

    if options.emit.tokens {
        written.push(export::write_tokens(dir, stem, &result.tokens)?);
    }
    if options.emit.tree {
        written.push(export::write_parse_tree(dir, stem, &result.tree, &options.dot)?);
    }
    if options.emit.scopes {
        written.push(export::write_scope_tree(dir, stem, &result.symbols)?);
    }
    if options.emit.symbols {
        written.push(export::write_symbols(dir, stem, &result.symbols)?);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarTable;
    use crate::pipeline::process_source;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    #[test]
    fn test_emit_set_parse() {
        let set = EmitSet::parse("tokens, tree").unwrap();
        assert!(set.tokens && set.tree);
        assert!(!set.scopes && !set.symbols);

        assert_eq!(EmitSet::parse("all").unwrap(), EmitSet::all());
        assert!(EmitSet::parse("").unwrap().is_empty());
        assert_matches!(EmitSet::parse("tokens,ast"), Err(msg) if msg.contains("'ast'"));
    }

    #[test]
    fn test_pipeline_output_json() {
        let grammar = GrammarTable::default_grammar().unwrap();
        let result = process_source("demo", "fn main() { n int = 1; }", &grammar).unwrap();
        let output = PipelineOutput::new(&result);

        assert_eq!(output.file, "demo");
        assert_eq!(output.symbol_count, 2);
        assert_eq!(output.scope_count, 2);

        let json: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();
        assert_eq!(json["symbols"][1]["symbol"], "n");
        assert!(json["durations_ms"]["total"].is_number());
        assert!(json["generated_at"].is_string());
    }

    #[test]
    fn test_write_selected_outputs() {
        let temp = TempDir::new().unwrap();
        let grammar = GrammarTable::default_grammar().unwrap();
        let result = process_source("demo", "fn main() { stop; }", &grammar).unwrap();

        let options = OutputOptions {
            dir: temp.path().to_path_buf(),
            emit: EmitSet::parse("tree,symbols").unwrap(),
            dot: DotOptions::default(),
        };
        let written = write_outputs(&result, &options).unwrap();

        assert_eq!(
            written,
            vec![
                temp.path().join("tree-demo.dot"),
                temp.path().join("symbols-demo.csv"),
            ]
        );
        assert!(!temp.path().join("demo-tokens.txt").exists());
    }
}
