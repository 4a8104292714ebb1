//! Consolidated error codes and classification system
//!
//! Single source of truth for all diagnostic codes and their behavioral metadata.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("E001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("E002");
    pub const OUTPUT_WRITE_FAILURE: Code = Code::new("E003");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E010");
    pub const INVALID_EXTENSION: Code = Code::new("E011");
    pub const FILE_TOO_LARGE: Code = Code::new("E012");
    pub const EMPTY_FILE: Code = Code::new("E013");
    pub const PERMISSION_DENIED: Code = Code::new("E014");
    pub const INVALID_ENCODING: Code = Code::new("E015");
    pub const IO_ERROR: Code = Code::new("E016");
    pub const INVALID_PATH: Code = Code::new("E017");
    pub const TOO_MANY_LINES: Code = Code::new("E018");
}

/// Grammar table error codes
pub mod grammar {
    use super::Code;

    pub const MALFORMED_TABLE: Code = Code::new("E020");
    pub const UNKNOWN_TERMINAL: Code = Code::new("E021");
    pub const UNKNOWN_SYMBOL: Code = Code::new("E022");
    pub const AMBIGUOUS_SYMBOL: Code = Code::new("E023");
    pub const MISSING_START: Code = Code::new("E024");
    pub const INVALID_PRODUCTION: Code = Code::new("E025");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const ILLEGAL_CHARACTER: Code = Code::new("E030");
    pub const INVALID_NUMBER: Code = Code::new("E031");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E032");
    pub const STRING_TOO_LARGE: Code = Code::new("E033");
    pub const TOO_MANY_TOKENS: Code = Code::new("E034");
}

/// Syntax analysis error codes
pub mod syntax {
    use super::Code;

    pub const MISSING_PRODUCTION: Code = Code::new("E040");
    pub const UNDECLARED_TERMINAL: Code = Code::new("E041");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E042");
    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E043");
    pub const TRAILING_INPUT: Code = Code::new("E044");
    pub const RESOURCE_LIMIT: Code = Code::new("E046");
}

/// Symbol table error codes
pub mod symbols {
    use super::Code;

    pub const MALFORMED_TREE: Code = Code::new("E050");
    pub const SCOPE_LIMIT_EXCEEDED: Code = Code::new("E051");
    pub const SYMBOL_LIMIT_EXCEEDED: Code = Code::new("E052");
    pub const PARAMETER_LIMIT_EXCEEDED: Code = Code::new("E053");
    pub const WALK_DEPTH_EXCEEDED: Code = Code::new("E054");
}

/// Warning codes
pub mod warnings {
    use super::Code;

    pub const GENERIC_WARNING: Code = Code::new("W000");
    pub const LARGE_FILE: Code = Code::new("W010");
    pub const SYMBOL_REDECLARED: Code = Code::new("W051");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I002");
    pub const OUTPUT_WRITTEN: Code = Code::new("I003");

    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I010");
    pub const GRAMMAR_LOADED: Code = Code::new("I020");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I030");
    pub const PARSE_TREE_COMPLETE: Code = Code::new("I040");
    pub const SYMBOL_TABLE_COMPLETE: Code = Code::new("I050");
    pub const PIPELINE_COMPLETE: Code = Code::new("I060");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();
        let mut add = |code: Code,
                       category: &'static str,
                       severity: Severity,
                       recoverable: bool,
                       requires_halt: bool,
                       description: &'static str,
                       action: &'static str| {
            registry.insert(
                code.as_str(),
                ErrorMetadata::new(
                    code.as_str(),
                    category,
                    severity,
                    recoverable,
                    requires_halt,
                    description,
                    action,
                ),
            );
        };

        // System
        add(
            system::INTERNAL_ERROR,
            "System",
            Severity::Critical,
            false,
            true,
            "Critical internal compiler error",
            "File a bug report with the offending source file",
        );
        add(
            system::INITIALIZATION_FAILURE,
            "System",
            Severity::Critical,
            false,
            true,
            "Compiler initialization failed",
            "Check configuration and environment variables",
        );
        add(
            system::OUTPUT_WRITE_FAILURE,
            "System",
            Severity::High,
            true,
            false,
            "Failed to write an output artifact",
            "Check permissions of the output directory",
        );

        // File processing
        add(
            file_processing::FILE_NOT_FOUND,
            "FileProcessing",
            Severity::High,
            false,
            true,
            "Source file not found",
            "Verify the file path",
        );
        add(
            file_processing::INVALID_EXTENSION,
            "FileProcessing",
            Severity::Medium,
            false,
            true,
            "Source file does not have the .fc extension",
            "Rename the file or disable the extension requirement",
        );
        add(
            file_processing::FILE_TOO_LARGE,
            "FileProcessing",
            Severity::High,
            false,
            true,
            "Source file exceeds the maximum size",
            "Split the program into smaller units",
        );
        add(
            file_processing::EMPTY_FILE,
            "FileProcessing",
            Severity::Medium,
            false,
            true,
            "Source file is empty",
            "Add at least one function definition",
        );
        add(
            file_processing::PERMISSION_DENIED,
            "FileProcessing",
            Severity::High,
            false,
            true,
            "Permission denied reading source file",
            "Check file permissions",
        );
        add(
            file_processing::INVALID_ENCODING,
            "FileProcessing",
            Severity::High,
            false,
            true,
            "Source file is not valid UTF-8",
            "Re-save the file as UTF-8",
        );
        add(
            file_processing::IO_ERROR,
            "FileProcessing",
            Severity::High,
            false,
            true,
            "I/O error while reading source file",
            "Retry or check the file system",
        );
        add(
            file_processing::INVALID_PATH,
            "FileProcessing",
            Severity::Medium,
            false,
            true,
            "Source path is not a regular file",
            "Pass a file or a directory of .fc files",
        );
        add(
            file_processing::TOO_MANY_LINES,
            "FileProcessing",
            Severity::High,
            false,
            true,
            "Source file exceeds the maximum line count",
            "Split the program into smaller units",
        );

        // Grammar
        add(
            grammar::MALFORMED_TABLE,
            "Grammar",
            Severity::Critical,
            false,
            true,
            "Grammar table could not be read or parsed",
            "Check the TOML syntax of the grammar table",
        );
        add(
            grammar::UNKNOWN_TERMINAL,
            "Grammar",
            Severity::Critical,
            false,
            true,
            "Grammar declares a terminal the lexer never produces",
            "Use token kind names in the terminals list",
        );
        add(
            grammar::UNKNOWN_SYMBOL,
            "Grammar",
            Severity::Critical,
            false,
            true,
            "Production references an undeclared symbol",
            "Declare the symbol as a terminal or add a production row",
        );
        add(
            grammar::AMBIGUOUS_SYMBOL,
            "Grammar",
            Severity::Critical,
            false,
            true,
            "Name is declared as both terminal and nonterminal",
            "Rename the nonterminal",
        );
        add(
            grammar::MISSING_START,
            "Grammar",
            Severity::Critical,
            false,
            true,
            "Start symbol has no production row",
            "Add a production row for the start symbol",
        );
        add(
            grammar::INVALID_PRODUCTION,
            "Grammar",
            Severity::Critical,
            false,
            true,
            "Production cell is malformed",
            "Use a space separated symbol list or the epsilon marker",
        );

        // Lexical
        add(
            lexical::ILLEGAL_CHARACTER,
            "Lexical",
            Severity::High,
            true,
            false,
            "Character is not part of the FusionCod alphabet",
            "Remove or replace the character",
        );
        add(
            lexical::INVALID_NUMBER,
            "Lexical",
            Severity::High,
            true,
            false,
            "Numeric literal is out of range",
            "Use a smaller literal",
        );
        add(
            lexical::IDENTIFIER_TOO_LONG,
            "Lexical",
            Severity::Medium,
            true,
            false,
            "Identifier exceeds the maximum length",
            "Shorten the identifier",
        );
        add(
            lexical::STRING_TOO_LARGE,
            "Lexical",
            Severity::Medium,
            true,
            false,
            "Text literal exceeds the maximum size",
            "Shorten the literal",
        );
        add(
            lexical::TOO_MANY_TOKENS,
            "Lexical",
            Severity::High,
            false,
            true,
            "Source produces more tokens than allowed",
            "Split the program into smaller units",
        );

        // Syntax
        add(
            syntax::MISSING_PRODUCTION,
            "Syntax",
            Severity::High,
            false,
            true,
            "No production for the current nonterminal and lookahead",
            "Check the statement near the reported position",
        );
        add(
            syntax::UNDECLARED_TERMINAL,
            "Syntax",
            Severity::High,
            false,
            true,
            "Lookahead token is not in the grammar vocabulary",
            "Check the token near the reported position",
        );
        add(
            syntax::UNEXPECTED_TOKEN,
            "Syntax",
            Severity::High,
            false,
            true,
            "Token does not match the expected terminal",
            "Check the token near the reported position",
        );
        add(
            syntax::UNEXPECTED_END_OF_INPUT,
            "Syntax",
            Severity::High,
            false,
            true,
            "Input ended before the derivation was complete",
            "Complete the unfinished construct",
        );
        add(
            syntax::TRAILING_INPUT,
            "Syntax",
            Severity::High,
            false,
            true,
            "Tokens remain after the derivation completed",
            "Remove the trailing tokens",
        );
        add(
            syntax::RESOURCE_LIMIT,
            "Syntax",
            Severity::Critical,
            false,
            true,
            "Parser resource limit exceeded",
            "Reduce program nesting or size",
        );

        // Symbols
        add(
            symbols::MALFORMED_TREE,
            "Symbols",
            Severity::Critical,
            false,
            true,
            "Parse tree does not have the expected declaration shape",
            "Check that the grammar table matches the symbol builder",
        );
        add(
            symbols::SCOPE_LIMIT_EXCEEDED,
            "Symbols",
            Severity::High,
            false,
            true,
            "Too many scopes",
            "Reduce the number of functions",
        );
        add(
            symbols::SYMBOL_LIMIT_EXCEEDED,
            "Symbols",
            Severity::High,
            false,
            true,
            "Too many symbols in one scope",
            "Split the function",
        );
        add(
            symbols::PARAMETER_LIMIT_EXCEEDED,
            "Symbols",
            Severity::High,
            false,
            true,
            "Too many parameters in one function",
            "Reduce the parameter list",
        );
        add(
            symbols::WALK_DEPTH_EXCEEDED,
            "Symbols",
            Severity::High,
            false,
            true,
            "Block nesting too deep",
            "Flatten nested blocks",
        );

        // Warnings
        add(
            warnings::GENERIC_WARNING,
            "Warning",
            Severity::Low,
            true,
            false,
            "General warning",
            "Review the message",
        );
        add(
            warnings::LARGE_FILE,
            "Warning",
            Severity::Low,
            true,
            false,
            "Source file is larger than the large file threshold",
            "Expect longer processing time",
        );
        add(
            warnings::SYMBOL_REDECLARED,
            "Warning",
            Severity::Low,
            true,
            false,
            "Symbol redeclared in the same scope; last declaration wins",
            "Rename one of the declarations if both are needed",
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_errors_are_recoverable() {
        assert!(is_recoverable(lexical::ILLEGAL_CHARACTER.as_str()));
        assert!(!requires_halt(lexical::ILLEGAL_CHARACTER.as_str()));
    }

    #[test]
    fn test_syntax_errors_halt() {
        for code in [
            syntax::MISSING_PRODUCTION,
            syntax::UNEXPECTED_TOKEN,
            syntax::TRAILING_INPUT,
        ] {
            assert!(requires_halt(code.as_str()), "{} should halt", code);
        }
    }

    #[test]
    fn test_unknown_code_fallbacks() {
        assert_eq!(get_description("Z999"), "Unknown error");
        assert_eq!(get_category("Z999"), "Unknown");
        assert_eq!(get_severity("Z999"), Severity::Medium);
    }

    #[test]
    fn test_redeclaration_is_low_severity_warning() {
        let metadata = get_error_metadata(warnings::SYMBOL_REDECLARED.as_str()).unwrap();
        assert_eq!(metadata.category, "Warning");
        assert_eq!(metadata.severity, Severity::Low);
    }
}
