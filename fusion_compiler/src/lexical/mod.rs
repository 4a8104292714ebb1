//! Lexical analysis for FusionCod source text
//!
//! Wraps [`Lexer`] with module-level helpers and startup validation.

pub mod analyzer;

use crate::config::compile_time::lexical::*;
use crate::tokens::{Token, TokenKind};
use std::collections::BTreeMap;

pub use analyzer::{LexResult, LexicalError, LexicalMetrics, Lexer};

// ============================================================================
// MODULE API
// ============================================================================

/// Tokenize source text with a fresh lexer
pub fn tokenize(source: &str) -> Result<LexResult, LexicalError> {
    let mut lexer = Lexer::new()?;
    Ok(lexer.tokenize(source))
}

pub fn create_lexer() -> Result<Lexer, LexicalError> {
    Lexer::new()
}

// ============================================================================
// MODULE INITIALIZATION AND VALIDATION
// ============================================================================

/// Check that every lexical error code has registry metadata and the rule set compiles
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    let lexical_codes = [
        crate::logging::codes::lexical::ILLEGAL_CHARACTER,
        crate::logging::codes::lexical::INVALID_NUMBER,
        crate::logging::codes::lexical::IDENTIFIER_TOO_LONG,
        crate::logging::codes::lexical::STRING_TOO_LARGE,
        crate::logging::codes::lexical::TOO_MANY_TOKENS,
    ];

    for code in &lexical_codes {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    Lexer::new().map_err(|e| e.to_string())?;

    crate::log_debug!("Lexical limits initialized",
        "max_string_size" => MAX_STRING_SIZE,
        "max_identifier_length" => MAX_IDENTIFIER_LENGTH,
        "max_token_count" => MAX_TOKEN_COUNT,
        "max_lexical_errors" => MAX_LEXICAL_ERRORS
    );

    Ok(())
}

/// Smoke-test the lexer on a fixed snippet
pub fn validate_tokenization() -> Result<(), String> {
    let result = tokenize("fn main() { show(\"ok\"); }").map_err(|e| e.to_string())?;
    if !result.is_clean() {
        return Err(format!(
            "Validation snippet produced {} lexical errors",
            result.errors.len()
        ));
    }
    if result.tokens.len() != 11 {
        return Err(format!(
            "Validation snippet produced {} tokens, expected 11",
            result.tokens.len()
        ));
    }
    Ok(())
}

// ============================================================================
// TOKEN STATISTICS
// ============================================================================

/// Count tokens per kind name
pub fn get_token_counts(tokens: &[Token]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.kind.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Tokens that are neither the end marker nor punctuation
pub fn significant_tokens(tokens: &[Token]) -> usize {
    tokens
        .iter()
        .filter(|t| {
            !matches!(
                t.kind,
                TokenKind::EndMarker
                    | TokenKind::Semicolon
                    | TokenKind::Comma
                    | TokenKind::LParen
                    | TokenKind::RParen
                    | TokenKind::LBrace
                    | TokenKind::RBrace
            )
        })
        .count()
}
