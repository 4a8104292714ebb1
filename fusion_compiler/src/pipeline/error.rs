use crate::export::ExportError;
use crate::file_processor::FileProcessorError;
use crate::grammar::GrammarError;
use crate::lexical::LexicalError;
use crate::logging::{codes, Code};
use crate::symbols::SymbolError;
use crate::syntax::SyntaxError;
use crate::utils::{Position, Span};
use std::fmt;

/// One user-facing finding with its code and optional source position
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: Code,
    pub message: String,
    pub position: Option<Position>,
}

impl Diagnostic {
    pub fn span(&self) -> Option<Span> {
        self.position.map(Span::single)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(p) => write!(f, "line {}, column {}: {}", p.line, p.column, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<&LexicalError> for Diagnostic {
    fn from(error: &LexicalError) -> Self {
        Self {
            code: error.error_code(),
            message: error.to_string(),
            position: error.position(),
        }
    }
}

impl From<&SyntaxError> for Diagnostic {
    fn from(error: &SyntaxError) -> Self {
        Self {
            code: error.error_code(),
            message: error.to_string(),
            position: error.position(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Grammar table rejected: {0}")]
    Grammar(#[from] GrammarError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexicalError),

    /// Every lexical error of the pass, plus the syntax error of the parse that
    /// still ran over the surviving tokens
    #[error("Lexical analysis failed with {} error(s)", errors.len())]
    LexicalErrors {
        errors: Vec<LexicalError>,
        syntax: Option<SyntaxError>,
    },

    #[error("Syntax analysis failed: {0}")]
    SyntaxAnalysis(#[from] SyntaxError),

    #[error("Symbol table construction failed: {0}")]
    SymbolTable(#[from] SymbolError),

    #[error("Writing output failed: {0}")]
    Export(#[from] ExportError),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(e) => e.error_code(),
            Self::Grammar(e) => e.error_code(),
            Self::LexicalAnalysis(e) => e.error_code(),
            Self::LexicalErrors { errors, .. } => errors
                .first()
                .map(LexicalError::error_code)
                .unwrap_or(codes::system::INTERNAL_ERROR),
            Self::SyntaxAnalysis(e) => e.error_code(),
            Self::SymbolTable(e) => e.error_code(),
            Self::Export(e) => e.error_code(),
            Self::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    /// Stage that failed, for summaries
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FileProcessing(_) => "file processing",
            Self::Grammar(_) => "grammar loading",
            Self::LexicalAnalysis(_) | Self::LexicalErrors { .. } => "lexical analysis",
            Self::SyntaxAnalysis(_) => "syntax analysis",
            Self::SymbolTable(_) => "symbol table",
            Self::Export(_) => "output",
            Self::Pipeline { .. } => "pipeline",
        }
    }

    /// Individual findings in source order of discovery
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Self::LexicalErrors { errors, syntax } => errors
                .iter()
                .map(Diagnostic::from)
                .chain(syntax.iter().map(Diagnostic::from))
                .collect(),
            Self::LexicalAnalysis(e) => vec![Diagnostic::from(e)],
            Self::SyntaxAnalysis(e) => vec![Diagnostic::from(e)],
            other => vec![Diagnostic {
                code: other.error_code(),
                message: other.to_string(),
                position: None,
            }],
        }
    }
}
