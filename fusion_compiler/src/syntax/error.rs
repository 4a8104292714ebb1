//! Syntax errors raised by the predictive parser
//!
//! Every variant maps onto a registry code; positions come from the token at
//! the parser's cursor when the error was detected.

use crate::grammar::EPSILON_LABEL;
use crate::logging::{codes, Code};
use crate::utils::{Position, Span};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    /// The table has no entry for (nonterminal, current token)
    #[error("expected {expected}, found {found} at line {line}, column {column}")]
    MissingProduction {
        expected: String,
        found: String,
        line: u32,
        column: u32,
    },

    /// The current token kind is not a column of the table at all
    #[error("expected {expected}, found epsilon at line {line}, column {column} (no table column for '{token}')")]
    UndeclaredTerminal {
        expected: String,
        token: String,
        line: u32,
        column: u32,
    },

    #[error("expected {expected}, found {found} at line {line}, column {column}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: u32,
        column: u32,
    },

    /// Tokens ran out; the position is that of the last token consumed
    #[error("unexpected end of input: expected {expected} after line {line}, column {column}")]
    UnexpectedEndOfInput {
        expected: String,
        line: u32,
        column: u32,
    },

    #[error("trailing input after end of program: {found} at line {line}, column {column}")]
    TrailingInput { found: String, line: u32, column: u32 },

    #[error("parser limit exceeded: {limit} ({value} > {max})")]
    ResourceLimit {
        limit: &'static str,
        value: usize,
        max: usize,
    },
}

impl SyntaxError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::MissingProduction { .. } => codes::syntax::MISSING_PRODUCTION,
            Self::UndeclaredTerminal { .. } => codes::syntax::UNDECLARED_TERMINAL,
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            Self::TrailingInput { .. } => codes::syntax::TRAILING_INPUT,
            Self::ResourceLimit { .. } => codes::syntax::RESOURCE_LIMIT,
        }
    }

    /// Symbol the parser was trying to derive or match
    pub fn expected(&self) -> &str {
        match self {
            Self::MissingProduction { expected, .. }
            | Self::UndeclaredTerminal { expected, .. }
            | Self::UnexpectedToken { expected, .. }
            | Self::UnexpectedEndOfInput { expected, .. } => expected,
            Self::TrailingInput { .. } | Self::ResourceLimit { .. } => "",
        }
    }

    /// Token kind seen at the cursor; "epsilon" when the kind had no table column
    pub fn found(&self) -> &str {
        match self {
            Self::MissingProduction { found, .. }
            | Self::UnexpectedToken { found, .. }
            | Self::TrailingInput { found, .. } => found,
            Self::UndeclaredTerminal { .. } => EPSILON_LABEL,
            Self::UnexpectedEndOfInput { .. } | Self::ResourceLimit { .. } => "",
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Self::MissingProduction { line, column, .. }
            | Self::UndeclaredTerminal { line, column, .. }
            | Self::UnexpectedToken { line, column, .. }
            | Self::UnexpectedEndOfInput { line, column, .. }
            | Self::TrailingInput { line, column, .. } => Some(Position::new(*line, *column)),
            Self::ResourceLimit { .. } => None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        self.position().map(Span::single)
    }

    pub fn requires_halt(&self) -> bool {
        crate::logging::codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        crate::logging::codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn description(&self) -> &'static str {
        crate::logging::codes::get_description(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        crate::logging::codes::get_action(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_production_message() {
        let error = SyntaxError::MissingProduction {
            expected: "BLOCK".into(),
            found: "semicolon".into(),
            line: 4,
            column: 12,
        };
        assert_eq!(
            error.to_string(),
            "expected BLOCK, found semicolon at line 4, column 12"
        );
        assert_eq!(error.error_code(), codes::syntax::MISSING_PRODUCTION);
        assert_eq!(error.position(), Some(Position::new(4, 12)));
    }

    #[test]
    fn test_undeclared_terminal_reports_epsilon() {
        let error = SyntaxError::UndeclaredTerminal {
            expected: "STATEMENT".into(),
            token: "mod".into(),
            line: 1,
            column: 1,
        };
        assert_eq!(error.found(), "epsilon");
        assert!(error.to_string().contains("found epsilon"));
    }

    #[test]
    fn test_end_of_input_points_at_last_token() {
        let error = SyntaxError::UnexpectedEndOfInput {
            expected: "$".into(),
            line: 7,
            column: 2,
        };
        assert_eq!(error.span(), Some(Span::single(Position::new(7, 2))));
        assert_eq!(error.expected(), "$");
        assert_eq!(
            error.to_string(),
            "unexpected end of input: expected $ after line 7, column 2"
        );
        assert!(error.requires_halt());
    }

    #[test]
    fn test_resource_limit_has_no_position() {
        let error = SyntaxError::ResourceLimit {
            limit: "derivation steps",
            value: 11,
            max: 10,
        };
        assert!(error.position().is_none());
        assert_eq!(error.error_code(), codes::syntax::RESOURCE_LIMIT);
    }
}
