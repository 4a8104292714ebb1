//! Output artifacts: token dumps, Graphviz trees and symbol tables
//!
//! Renderers are pure string builders. The `write_*` functions place their
//! output under a directory (created on demand), named after the source
//! stem, and return the path written.

pub mod dot;
pub mod symbols;
pub mod tokens;

pub use dot::{parse_tree_dot, scope_tree_dot, DotLabel, DotOptions};
pub use symbols::{symbols_csv, symbols_json, CSV_HEADER};
pub use tokens::{token_kinds_line, token_table};

use crate::logging::{codes, Code};
use crate::symbols::SymbolTable;
use crate::syntax::ParseTree;
use crate::tokens::Token;
use crate::{log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {what}: {message}")]
    Serialization { what: &'static str, message: String },
}

impl ExportError {
    pub fn error_code(&self) -> Code {
        codes::system::OUTPUT_WRITE_FAILURE
    }
}

fn write_artifact(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf, ExportError> {
    let path = dir.join(file_name);

    let result = fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, contents))
        .map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        });

    match result {
        Ok(()) => {
            log_success!(codes::success::OUTPUT_WRITTEN, "Output written",
                "path" => path.display(),
                "bytes" => contents.len()
            );
            Ok(path)
        }
        Err(error) => {
            log_error!(error.error_code(), &error.to_string());
            Err(error)
        }
    }
}

/// `<dir>/<stem>-tokens.txt` holding the kind names on one line
pub fn write_tokens(dir: &Path, stem: &str, tokens: &[Token]) -> Result<PathBuf, ExportError> {
    write_artifact(dir, &format!("{}-tokens.txt", stem), &token_kinds_line(tokens))
}

/// `<dir>/tree-<stem>.dot`
pub fn write_parse_tree(
    dir: &Path,
    stem: &str,
    tree: &ParseTree,
    options: &DotOptions,
) -> Result<PathBuf, ExportError> {
    let dot = parse_tree_dot(tree, options);
    write_artifact(dir, &format!("tree-{}.dot", stem), dot.trim_end_matches(['\n', '\r']))
}

/// `<dir>/scopes-<stem>.dot`
pub fn write_scope_tree(
    dir: &Path,
    stem: &str,
    table: &SymbolTable,
) -> Result<PathBuf, ExportError> {
    write_artifact(dir, &format!("scopes-{}.dot", stem), &scope_tree_dot(table))
}

/// `<dir>/symbols-<stem>.csv`
pub fn write_symbols(dir: &Path, stem: &str, table: &SymbolTable) -> Result<PathBuf, ExportError> {
    write_artifact(dir, &format!("symbols-{}.csv", stem), &symbols_csv(table))
}

/// `<dir>/symbols-<stem>.json`
pub fn write_symbols_json(
    dir: &Path,
    stem: &str,
    table: &SymbolTable,
) -> Result<PathBuf, ExportError> {
    let json = symbols_json(table).map_err(|e| ExportError::Serialization {
        what: "symbol table",
        message: e.to_string(),
    })?;
    write_artifact(dir, &format!("symbols-{}.json", stem), &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarTable;
    use crate::lexical;
    use crate::symbols::SymbolTableBuilder;
    use crate::syntax::PredictiveParser;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    const SOURCE: &str = "fn main() {\n  total int = 3;\n  show(total);\n}\n";

    #[test]
    fn test_writers_create_directory_and_name_files() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("nested").join("output");

        let lexed = lexical::tokenize(SOURCE).unwrap();
        let grammar = GrammarTable::default_grammar().unwrap();
        let tree = PredictiveParser::new(&grammar)
            .parse(&lexed.with_end_marker())
            .tree
            .unwrap();
        let table = SymbolTableBuilder::new(&tree).build().unwrap().table;

        let tokens_path = write_tokens(&out, "demo", &lexed.tokens).unwrap();
        assert_eq!(tokens_path, out.join("demo-tokens.txt"));
        let contents = fs::read_to_string(&tokens_path).unwrap();
        assert!(contents.starts_with("function main lparen rparen lbrace id t_int"));

        let tree_path = write_parse_tree(&out, "demo", &tree, &DotOptions::default()).unwrap();
        assert_eq!(tree_path, out.join("tree-demo.dot"));
        let dot = fs::read_to_string(&tree_path).unwrap();
        assert!(dot.ends_with('}'));

        let scopes_path = write_scope_tree(&out, "demo", &table).unwrap();
        assert_eq!(scopes_path, out.join("scopes-demo.dot"));

        let csv_path = write_symbols(&out, "demo", &table).unwrap();
        let csv = fs::read_to_string(&csv_path).unwrap();
        assert!(csv.contains("total,variable,int,main,,"));

        let json_path = write_symbols_json(&out, "demo", &table).unwrap();
        assert_eq!(json_path, out.join("symbols-demo.json"));
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("occupied");
        fs::write(&blocker, "not a directory").unwrap();

        let result = write_tokens(&blocker, "demo", &[]);
        assert_matches!(result, Err(ExportError::Io { .. }));
    }
}
