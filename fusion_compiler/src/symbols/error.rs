//! Error and warning types for symbol table construction

use crate::config::compile_time::symbols::*;
use crate::logging::{codes, Code};
use crate::syntax::NodeId;
use crate::utils::{Position, Span};

pub type SymbolResult<T> = Result<T, SymbolError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SymbolError {
    #[error("Malformed parse tree at node {node}: {message}")]
    MalformedTree { node: NodeId, message: String },

    #[error("Scope limit exceeded: more than {MAX_SCOPES} scopes")]
    ScopeLimitExceeded,

    #[error("Symbol limit exceeded in scope '{scope}': more than {MAX_SYMBOLS_PER_SCOPE} symbols")]
    SymbolLimitExceeded { scope: String },

    #[error("Function '{function}' declares {count} parameters (max {MAX_PARAMETERS_PER_FUNCTION})")]
    ParameterLimitExceeded { function: String, count: usize },

    #[error("Block nesting deeper than {MAX_TREE_WALK_DEPTH} levels")]
    WalkDepthExceeded,

    #[error("Unknown scope id {scope}")]
    UnknownScope { scope: usize },
}

impl SymbolError {
    pub fn malformed(node: NodeId, message: &str) -> Self {
        Self::MalformedTree {
            node,
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::MalformedTree { .. } => codes::symbols::MALFORMED_TREE,
            Self::ScopeLimitExceeded => codes::symbols::SCOPE_LIMIT_EXCEEDED,
            Self::SymbolLimitExceeded { .. } => codes::symbols::SYMBOL_LIMIT_EXCEEDED,
            Self::ParameterLimitExceeded { .. } => codes::symbols::PARAMETER_LIMIT_EXCEEDED,
            Self::WalkDepthExceeded => codes::symbols::WALK_DEPTH_EXCEEDED,
            Self::UnknownScope { .. } => codes::system::INTERNAL_ERROR,
        }
    }
}

/// Non-fatal findings reported while building the table
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SymbolWarning {
    #[error("'{name}' redeclared in scope '{scope}'; the later declaration replaces the earlier one")]
    Redeclaration {
        name: String,
        scope: String,
        previous_type: Option<String>,
        new_type: Option<String>,
        position: Option<Position>,
    },
}

impl SymbolWarning {
    pub fn code(&self) -> Code {
        match self {
            Self::Redeclaration { .. } => codes::warnings::SYMBOL_REDECLARED,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Redeclaration { position, .. } => position.map(Span::single),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SymbolError::malformed(4, "FUNCTION without FUNCTION_KIND").error_code(),
            codes::symbols::MALFORMED_TREE
        );
        assert_eq!(
            SymbolError::WalkDepthExceeded.error_code(),
            codes::symbols::WALK_DEPTH_EXCEEDED
        );
    }

    #[test]
    fn test_redeclaration_warning() {
        let warning = SymbolWarning::Redeclaration {
            name: "x".into(),
            scope: "main".into(),
            previous_type: Some("int".into()),
            new_type: Some("float".into()),
            position: Some(Position::new(3, 5)),
        };
        assert_eq!(warning.code().as_str(), "W051");
        assert!(warning.to_string().contains("'x' redeclared in scope 'main'"));
        assert_eq!(warning.span().unwrap().start(), Position::new(3, 5));
    }
}
