//! FusionCod compiler front end: regex lexer, table-driven LL(1) parser and
//! scope builder, with Graphviz and CSV exporters for their results.

// Internal modules
pub mod batch;
pub mod config;
pub mod export;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod symbols;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use grammar::GrammarTable;
pub use pipeline::{process_file, process_source, PipelineError, PipelineResult};

pub use pipeline::output::PipelineOutput;
