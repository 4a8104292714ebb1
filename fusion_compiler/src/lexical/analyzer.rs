//! Regex-driven lexical analyzer for FusionCod source text
//!
//! Classification rules are tried in a fixed priority order at every offset.
//! Illegal characters are recorded and skipped one at a time so a single pass
//! always covers the whole input.

use crate::config::compile_time::lexical::*;
use crate::logging::codes;
use crate::tokens::{classify_operator, classify_word, Literal, Token, TokenKind};
use crate::utils::{Position, Span};
use crate::{log_debug, log_error, log_success, log_warning};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Rule alternation in priority order. Alternation is leftmost-first, so
/// floats win over integers and two-character operators over their prefixes.
const RULES: &str = concat!(
    r#"\A(?:"#,
    r#"(?P<text>"[^"]*")"#,
    r#"|(?P<word>[a-zA-Z_][a-zA-Z0-9_]*)"#,
    r#"|(?P<float>-?\d+\.\d+)"#,
    r#"|(?P<int>-?\d+)"#,
    r#"|(?P<op><=|>=|==|<>|&&|\|\||[;(){}+\-*/%<>=,])"#,
    r#"|(?P<comment>\#[^\n]*)"#,
    r#"|(?P<newline>\n+)"#,
    r#"|(?P<blank>[ \t\r]+)"#,
    r#")"#
);

static RULE_SET: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

/// Lexical analysis errors with compile-time security boundaries
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexicalError {
    #[error("illegal character '{character}' at line {line}, column {column}")]
    IllegalCharacter {
        character: char,
        line: u32,
        column: u32,
    },

    #[error("invalid number '{text}' at line {line}, column {column}")]
    InvalidNumber { text: String, line: u32, column: u32 },

    #[error("identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH}) at line {line}, column {column}")]
    IdentifierTooLong { length: usize, line: u32, column: u32 },

    #[error("string too large: {size} bytes (max {MAX_STRING_SIZE}) at line {line}, column {column}")]
    StringTooLarge { size: usize, line: u32, column: u32 },

    #[error("too many tokens: {count} (max {max}) at line {line}, column {column}")]
    TooManyTokens {
        count: usize,
        max: usize,
        line: u32,
        column: u32,
    },

    #[error("lexer rule set failed to compile: {message}")]
    RuleCompilation { message: String },
}

impl LexicalError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexicalError::IllegalCharacter { .. } => codes::lexical::ILLEGAL_CHARACTER,
            LexicalError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexicalError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexicalError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexicalError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            LexicalError::RuleCompilation { .. } => codes::system::INITIALIZATION_FAILURE,
        }
    }

    /// Source position of the error; `None` for errors not tied to the input
    pub fn position(&self) -> Option<Position> {
        match self {
            LexicalError::IllegalCharacter { line, column, .. }
            | LexicalError::InvalidNumber { line, column, .. }
            | LexicalError::IdentifierTooLong { line, column, .. }
            | LexicalError::StringTooLarge { line, column, .. }
            | LexicalError::TooManyTokens { line, column, .. } => {
                Some(Position::new(*line, *column))
            }
            LexicalError::RuleCompilation { .. } => None,
        }
    }

    pub fn line(&self) -> u32 {
        self.position().map(|p| p.line).unwrap_or(0)
    }

    pub fn column(&self) -> u32 {
        self.position().map(|p| p.column).unwrap_or(0)
    }
}

/// Per-pass counters
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub keyword_tokens: usize,
    pub identifier_tokens: usize,
    pub literal_tokens: usize,
    pub operator_tokens: usize,
    pub comment_count: usize,
    pub illegal_chars: usize,
    pub suppressed_errors: usize,
    pub line_count: u32,
}

impl LexicalMetrics {
    fn record_token(&mut self, kind: TokenKind) {
        self.total_tokens += 1;
        if kind.is_keyword() {
            self.keyword_tokens += 1;
        } else if kind == TokenKind::Id {
            self.identifier_tokens += 1;
        } else if kind.is_literal() {
            self.literal_tokens += 1;
        } else {
            self.operator_tokens += 1;
        }
    }
}

/// Output of one lexical pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexicalError>,
    /// Position one column past the last character of the input
    pub end: Position,
}

impl LexResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Parser input: the token sequence followed by the `$` end marker
    pub fn with_end_marker(&self) -> Vec<Token> {
        let mut tokens = Vec::with_capacity(self.tokens.len() + 1);
        tokens.extend(self.tokens.iter().cloned());
        tokens.push(Token::end_marker(self.end.line, self.end.column));
        tokens
    }
}

/// Tracks the byte offset together with the running line and column
struct Cursor<'a> {
    source: &'a str,
    offset: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Step over `lexeme`, which may span lines (newline runs, multi-line text)
    fn advance(&mut self, lexeme: &str) {
        self.offset += lexeme.len();
        match lexeme.rfind('\n') {
            Some(last) => {
                self.line += lexeme.bytes().filter(|b| *b == b'\n').count() as u32;
                self.column = lexeme[last + 1..].chars().count() as u32 + 1;
            }
            None => self.column += lexeme.chars().count() as u32,
        }
    }
}

/// Core lexical analyzer with global logging integration
pub struct Lexer {
    rules: &'static Regex,
    metrics: LexicalMetrics,
    max_tokens: usize,
}

impl Lexer {
    pub fn new() -> Result<Self, LexicalError> {
        let rules = RULE_SET
            .get_or_init(|| Regex::new(RULES))
            .as_ref()
            .map_err(|e| LexicalError::RuleCompilation {
                message: e.to_string(),
            })?;

        Ok(Self {
            rules,
            metrics: LexicalMetrics::default(),
            max_tokens: MAX_TOKEN_COUNT,
        })
    }

    #[cfg(test)]
    fn with_token_limit(max_tokens: usize) -> Result<Self, LexicalError> {
        Ok(Self {
            max_tokens,
            ..Self::new()?
        })
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Scan `source` left to right, collecting tokens and errors
    pub fn tokenize(&mut self, source: &str) -> LexResult {
        self.metrics = LexicalMetrics::default();

        log_debug!("Starting lexical analysis",
            "bytes" => source.len(),
            "max_tokens_allowed" => self.max_tokens
        );

        let mut result = LexResult::default();
        let mut cursor = Cursor::new(source);

        while cursor.offset < source.len() {
            let Some(caps) = self.rules.captures(cursor.rest()) else {
                self.illegal_character(&mut cursor, &mut result);
                continue;
            };

            let Some(whole) = caps.get(0) else {
                self.illegal_character(&mut cursor, &mut result);
                continue;
            };
            let lexeme = whole.as_str();
            let start = cursor.position();

            cursor.advance(lexeme);

            if caps.name("newline").is_some() || caps.name("blank").is_some() {
                continue;
            }
            if caps.name("comment").is_some() {
                self.metrics.comment_count += 1;
                continue;
            }

            let classified = self.classify(&caps, lexeme, start);
            match classified {
                Ok(token) => {
                    if result.tokens.len() >= self.max_tokens {
                        let error = LexicalError::TooManyTokens {
                            count: result.tokens.len(),
                            max: self.max_tokens,
                            line: start.line,
                            column: start.column,
                        };
                        log_error!(error.error_code(), "Token limit exceeded",
                            span = Span::single(start),
                            "limit" => self.max_tokens
                        );
                        result.errors.push(error);
                        break;
                    }
                    self.metrics.record_token(token.kind);
                    result.tokens.push(token);
                }
                Err(error) => self.record_error(&mut result, error),
            }
        }

        result.end = cursor.position();
        self.metrics.line_count = cursor.line;

        if result.is_clean() {
            log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization completed",
                "tokens" => result.tokens.len(),
                "lines" => cursor.line
            );
        } else {
            log_warning!("Tokenization finished with lexical errors",
                "tokens" => result.tokens.len(),
                "errors" => result.errors.len()
            );
        }

        result
    }

    fn classify(
        &self,
        caps: &Captures<'_>,
        lexeme: &str,
        start: Position,
    ) -> Result<Token, LexicalError> {
        if caps.name("text").is_some() {
            let content = &lexeme[1..lexeme.len() - 1];
            if content.len() > MAX_STRING_SIZE {
                return Err(LexicalError::StringTooLarge {
                    size: content.len(),
                    line: start.line,
                    column: start.column,
                });
            }
            return Ok(Token::new(
                TokenKind::TextLit,
                Literal::Text(content.to_string()),
                start.line,
                start.column,
            ));
        }

        if caps.name("word").is_some() {
            if lexeme.len() > MAX_IDENTIFIER_LENGTH {
                return Err(LexicalError::IdentifierTooLong {
                    length: lexeme.len(),
                    line: start.line,
                    column: start.column,
                });
            }
            let kind = classify_word(lexeme);
            let value = match kind {
                TokenKind::BoolLit => Literal::Boolean(lexeme == "true"),
                _ => Literal::Raw(lexeme.to_string()),
            };
            return Ok(Token::new(kind, value, start.line, start.column));
        }

        if caps.name("float").is_some() {
            let value = lexeme.parse::<f64>().map_err(|_| LexicalError::InvalidNumber {
                text: lexeme.to_string(),
                line: start.line,
                column: start.column,
            })?;
            return Ok(Token::new(
                TokenKind::FloatLit,
                Literal::Float(value),
                start.line,
                start.column,
            ));
        }

        if caps.name("int").is_some() {
            let value = lexeme.parse::<i64>().map_err(|_| LexicalError::InvalidNumber {
                text: lexeme.to_string(),
                line: start.line,
                column: start.column,
            })?;
            return Ok(Token::new(
                TokenKind::IntLit,
                Literal::Integer(value),
                start.line,
                start.column,
            ));
        }

        match classify_operator(lexeme) {
            Some(kind) => Ok(Token::new(
                kind,
                Literal::Raw(lexeme.to_string()),
                start.line,
                start.column,
            )),
            // Only reachable if the operator alternation and table drift apart
            None => Err(LexicalError::IllegalCharacter {
                character: lexeme.chars().next().unwrap_or('\0'),
                line: start.line,
                column: start.column,
            }),
        }
    }

    fn illegal_character(&mut self, cursor: &mut Cursor<'_>, result: &mut LexResult) {
        let start = cursor.position();
        let Some(character) = cursor.rest().chars().next() else {
            return;
        };
        cursor.offset += character.len_utf8();
        cursor.column += 1;
        self.metrics.illegal_chars += 1;

        self.record_error(
            result,
            LexicalError::IllegalCharacter {
                character,
                line: start.line,
                column: start.column,
            },
        );
    }

    fn record_error(&mut self, result: &mut LexResult, error: LexicalError) {
        if result.errors.len() >= MAX_LEXICAL_ERRORS {
            self.metrics.suppressed_errors += 1;
            return;
        }

        match error.position() {
            Some(position) => {
                log_error!(error.error_code(), &error.to_string(),
                    span = Span::single(position)
                );
            }
            None => {
                log_error!(error.error_code(), &error.to_string());
            }
        }
        result.errors.push(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn lex(source: &str) -> LexResult {
        Lexer::new().unwrap().tokenize(source)
    }

    fn kinds(result: &LexResult) -> Vec<&'static str> {
        result.tokens.iter().map(|t| t.kind.as_str()).collect()
    }

    #[test]
    fn test_reserved_words_lex_to_their_kinds() {
        for (word, kind) in crate::tokens::RESERVED_WORDS {
            let result = lex(word);
            assert!(result.is_clean());
            assert_eq!(result.tokens.len(), 1);
            assert_eq!(result.tokens[0].kind, *kind, "word {}", word);
        }
    }

    #[test]
    fn test_negative_float_is_a_single_token() {
        let result = lex("-3.14");
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].kind, TokenKind::FloatLit);
        assert_eq!(result.tokens[0].value, Literal::Float(-3.14));
    }

    #[test]
    fn test_integer_is_not_truncated_float() {
        let result = lex("42 4.5");
        assert_eq!(kinds(&result), vec!["int_lit", "float_lit"]);
        assert_eq!(result.tokens[0].value, Literal::Integer(42));
    }

    #[test]
    fn test_illegal_character_is_skipped_and_reported() {
        let result = lex("a = 1 @ b = 2;");
        assert_eq!(
            kinds(&result),
            vec!["id", "assign", "int_lit", "id", "assign", "int_lit", "semicolon"]
        );
        assert_eq!(result.errors.len(), 1);
        assert_matches!(
            result.errors[0],
            LexicalError::IllegalCharacter {
                character: '@',
                line: 1,
                column: 7
            }
        );
    }

    #[test]
    fn test_lines_and_columns() {
        let result = lex("fn main() {\n  show(x);\n}");
        let show = &result.tokens[5];
        assert_eq!(show.kind, TokenKind::Show);
        assert_eq!((show.line, show.column), (2, 3));
        let close = result.tokens.last().unwrap();
        assert_eq!((close.line, close.column), (3, 1));
    }

    #[test]
    fn test_blank_lines_advance_line_counter() {
        let result = lex("x\n\n\ny");
        assert_eq!(result.tokens[1].line, 4);
        assert_eq!(result.tokens[1].column, 1);
    }

    #[test]
    fn test_comments_are_discarded() {
        let result = lex("x = 1; # trailing note\ny = 2;");
        assert_eq!(result.tokens.len(), 8);
        assert_eq!(result.tokens[4].line, 2);
    }

    #[test]
    fn test_text_literal_strips_quotes() {
        let result = lex("show(\"hola mundo\");");
        assert_eq!(result.tokens[2].kind, TokenKind::TextLit);
        assert_eq!(result.tokens[2].value, Literal::Text("hola mundo".into()));
    }

    #[test]
    fn test_unterminated_string_reports_quote() {
        let result = lex("\"abc");
        assert_matches!(
            result.errors[0],
            LexicalError::IllegalCharacter { character: '"', .. }
        );
        assert_eq!(kinds(&result), vec!["id"]);
    }

    #[test]
    fn test_operators_prefer_two_characters() {
        let result = lex("a <= b <> c == d && e || f < g");
        assert_eq!(
            kinds(&result),
            vec!["id", "le", "id", "ne", "id", "eq", "id", "and", "id", "or", "id", "lt", "id"]
        );
    }

    #[test]
    fn test_booleans_carry_values() {
        let result = lex("true false");
        assert_eq!(result.tokens[0].value, Literal::Boolean(true));
        assert_eq!(result.tokens[1].value, Literal::Boolean(false));
    }

    #[test]
    fn test_integer_overflow_is_invalid_number() {
        let result = lex("x = 99999999999999999999;");
        assert_matches!(result.errors[0], LexicalError::InvalidNumber { .. });
        assert_eq!(kinds(&result), vec!["id", "assign", "semicolon"]);
    }

    #[test]
    fn test_identifier_too_long_is_dropped() {
        let name = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        let result = lex(&name);
        assert!(result.tokens.is_empty());
        assert_matches!(result.errors[0], LexicalError::IdentifierTooLong { .. });
    }

    #[test]
    fn test_end_marker_follows_last_character() {
        let result = lex("x;\n");
        let tokens = result.with_end_marker();
        let end = tokens.last().unwrap();
        assert_eq!(end.kind, TokenKind::EndMarker);
        assert_eq!((end.line, end.column), (2, 1));

        let result = lex("stop;");
        let end = result.with_end_marker().pop().unwrap();
        assert_eq!((end.line, end.column), (1, 6));
    }

    #[test]
    fn test_empty_source() {
        let result = lex("");
        assert!(result.tokens.is_empty());
        assert!(result.is_clean());
        assert_eq!(result.with_end_marker().len(), 1);
    }

    #[test]
    fn test_columns_stay_exact_across_a_long_line() {
        let pairs = 20_000;
        let result = lex(&"a ".repeat(pairs));
        assert!(result.is_clean());
        assert_eq!(result.tokens.len(), pairs);
        let last = result.tokens.last().unwrap();
        assert_eq!((last.line, last.column), (1, 2 * pairs as u32 - 1));
        assert_eq!(result.end, Position::new(1, 2 * pairs as u32 + 1));
    }

    #[test]
    fn test_columns_count_characters_not_bytes() {
        let result = lex("\"ñé\" x");
        assert_eq!((result.tokens[1].line, result.tokens[1].column), (1, 6));
    }

    #[test]
    fn test_multi_line_text_advances_line_counter() {
        let result = lex("\"a\nb\" x\ny");
        assert_eq!(result.tokens[0].value, Literal::Text("a\nb".into()));
        assert_eq!((result.tokens[1].line, result.tokens[1].column), (2, 4));
        assert_eq!((result.tokens[2].line, result.tokens[2].column), (3, 1));
    }

    #[test]
    fn test_errors_past_the_cap_are_suppressed() {
        let extra = 5;
        let mut lexer = Lexer::new().unwrap();
        let result = lexer.tokenize(&"@".repeat(MAX_LEXICAL_ERRORS + extra));
        assert!(!result.is_clean());
        assert_eq!(result.errors.len(), MAX_LEXICAL_ERRORS);
        assert_eq!(lexer.metrics().suppressed_errors, extra);
        assert_eq!(lexer.metrics().illegal_chars, MAX_LEXICAL_ERRORS + extra);
        assert_matches!(
            result.errors.last(),
            Some(LexicalError::IllegalCharacter { column, .. }) if *column == MAX_LEXICAL_ERRORS as u32
        );
    }

    #[test]
    fn test_token_limit_stops_the_scan() {
        let mut lexer = Lexer::with_token_limit(3).unwrap();
        let result = lexer.tokenize("a b c d e f");
        assert_eq!(kinds(&result), vec!["id", "id", "id"]);
        assert_eq!(result.errors.len(), 1);
        assert_matches!(
            result.errors[0],
            LexicalError::TooManyTokens {
                count: 3,
                max: 3,
                line: 1,
                column: 7
            }
        );
        assert_eq!(result.errors[0].error_code(), codes::lexical::TOO_MANY_TOKENS);
        assert_eq!(lexer.metrics().total_tokens, 3);
    }

    #[test]
    fn test_metrics_are_reset_per_pass() {
        let mut lexer = Lexer::new().unwrap();
        lexer.tokenize("fn x # c\n");
        assert_eq!(lexer.metrics().keyword_tokens, 1);
        assert_eq!(lexer.metrics().comment_count, 1);
        lexer.tokenize("y");
        assert_eq!(lexer.metrics().total_tokens, 1);
        assert_eq!(lexer.metrics().comment_count, 0);
    }
}
