//! FusionCod token kinds, literal values and the reserved-word table
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of token kinds produced by the lexer.
///
/// The names returned by [`TokenKind::as_str`] are the terminal names used as
/// column headers in the LL(1) grammar table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenKind {
    // Keywords
    Function,
    Main,
    Show,
    Return,
    Stop,
    If,
    Elif,
    Else,
    While,
    For,
    Read,

    // Type names
    TInt,
    TFloat,
    TBool,
    TText,
    TVoid,

    // Logical operators
    And,
    Or,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,

    // Arithmetic
    Plus,
    Minus,
    Mul,
    Div,
    Mod,

    // Relational and assignment
    Lt,
    Gt,
    Le,
    Ge,
    Assign,
    Eq,
    Ne,

    // Identifiers and literals
    Id,
    IntLit,
    FloatLit,
    TextLit,
    BoolLit,

    /// Synthetic end-of-input marker (`$`)
    EndMarker,
}

impl TokenKind {
    /// Every kind, in grammar-table column order
    pub const ALL: [TokenKind; 42] = [
        TokenKind::Function,
        TokenKind::Main,
        TokenKind::LParen,
        TokenKind::RParen,
        TokenKind::Show,
        TokenKind::Id,
        TokenKind::Comma,
        TokenKind::Semicolon,
        TokenKind::Return,
        TokenKind::Stop,
        TokenKind::LBrace,
        TokenKind::RBrace,
        TokenKind::TInt,
        TokenKind::TFloat,
        TokenKind::TBool,
        TokenKind::TText,
        TokenKind::TVoid,
        TokenKind::If,
        TokenKind::And,
        TokenKind::Or,
        TokenKind::Elif,
        TokenKind::Else,
        TokenKind::While,
        TokenKind::For,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Mul,
        TokenKind::Div,
        TokenKind::Mod,
        TokenKind::Lt,
        TokenKind::Gt,
        TokenKind::Le,
        TokenKind::Ge,
        TokenKind::Assign,
        TokenKind::Eq,
        TokenKind::Ne,
        TokenKind::IntLit,
        TokenKind::FloatLit,
        TokenKind::TextLit,
        TokenKind::BoolLit,
        TokenKind::Read,
        TokenKind::EndMarker,
    ];

    /// Terminal name as it appears in grammar tables and token dumps
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Function => "function",
            TokenKind::Main => "main",
            TokenKind::Show => "show",
            TokenKind::Return => "return",
            TokenKind::Stop => "stop",
            TokenKind::If => "if",
            TokenKind::Elif => "elif",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::Read => "read",
            TokenKind::TInt => "t_int",
            TokenKind::TFloat => "t_float",
            TokenKind::TBool => "t_bool",
            TokenKind::TText => "t_text",
            TokenKind::TVoid => "t_void",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::LParen => "lparen",
            TokenKind::RParen => "rparen",
            TokenKind::LBrace => "lbrace",
            TokenKind::RBrace => "rbrace",
            TokenKind::Comma => "comma",
            TokenKind::Semicolon => "semicolon",
            TokenKind::Plus => "plus",
            TokenKind::Minus => "minus",
            TokenKind::Mul => "mul",
            TokenKind::Div => "div",
            TokenKind::Mod => "mod",
            TokenKind::Lt => "lt",
            TokenKind::Gt => "gt",
            TokenKind::Le => "le",
            TokenKind::Ge => "ge",
            TokenKind::Assign => "assign",
            TokenKind::Eq => "eq",
            TokenKind::Ne => "ne",
            TokenKind::Id => "id",
            TokenKind::IntLit => "int_lit",
            TokenKind::FloatLit => "float_lit",
            TokenKind::TextLit => "text_lit",
            TokenKind::BoolLit => "bool_lit",
            TokenKind::EndMarker => "$",
        }
    }

    /// Resolve a terminal name back to its kind
    pub fn from_name(name: &str) -> Option<TokenKind> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == name)
    }

    /// Position of this kind in [`TokenKind::ALL`]
    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|kind| kind == self)
            .unwrap_or(Self::ALL.len() - 1)
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Function
                | TokenKind::Main
                | TokenKind::Show
                | TokenKind::Return
                | TokenKind::Stop
                | TokenKind::If
                | TokenKind::Elif
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Read
        ) || self.is_type()
    }

    pub fn is_type(&self) -> bool {
        matches!(
            self,
            TokenKind::TInt | TokenKind::TFloat | TokenKind::TBool | TokenKind::TText | TokenKind::TVoid
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::IntLit | TokenKind::FloatLit | TokenKind::TextLit | TokenKind::BoolLit
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value carried by a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Literal {
    /// Text literal with the surrounding quotes stripped
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Source lexeme of identifiers, keywords and punctuation
    Raw(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Text(s) | Literal::Raw(s) => write!(f, "{}", s),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// A classified lexical unit. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Literal,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, value: Literal, line: u32, column: u32) -> Self {
        Self {
            kind,
            value,
            line,
            column,
        }
    }

    /// The synthetic `$` token appended after the last real token
    pub fn end_marker(line: u32, column: u32) -> Self {
        Self::new(
            TokenKind::EndMarker,
            Literal::Raw("$".to_string()),
            line,
            column,
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.kind, self.value, self.line, self.column)
    }
}

/// Reserved words and word-like operators, with the kind each one lexes to
pub const RESERVED_WORDS: &[(&str, TokenKind)] = &[
    ("fn", TokenKind::Function),
    ("main", TokenKind::Main),
    ("show", TokenKind::Show),
    ("return", TokenKind::Return),
    ("stop", TokenKind::Stop),
    ("int", TokenKind::TInt),
    ("float", TokenKind::TFloat),
    ("text", TokenKind::TText),
    ("bool", TokenKind::TBool),
    ("void", TokenKind::TVoid),
    ("if", TokenKind::If),
    ("and", TokenKind::And),
    ("or", TokenKind::Or),
    ("elif", TokenKind::Elif),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("for", TokenKind::For),
    ("true", TokenKind::BoolLit),
    ("false", TokenKind::BoolLit),
    ("read", TokenKind::Read),
];

/// Classify an identifier-shaped word, falling back to [`TokenKind::Id`]
pub fn classify_word(word: &str) -> TokenKind {
    RESERVED_WORDS
        .iter()
        .find(|(reserved, _)| *reserved == word)
        .map(|(_, kind)| *kind)
        .unwrap_or(TokenKind::Id)
}

/// Operator and punctuation lexemes, two-character forms first
pub const OPERATORS: &[(&str, TokenKind)] = &[
    ("<=", TokenKind::Le),
    (">=", TokenKind::Ge),
    ("==", TokenKind::Eq),
    ("<>", TokenKind::Ne),
    ("&&", TokenKind::And),
    ("||", TokenKind::Or),
    (";", TokenKind::Semicolon),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Mul),
    ("/", TokenKind::Div),
    ("%", TokenKind::Mod),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("=", TokenKind::Assign),
    (",", TokenKind::Comma),
];

/// Look up the kind of an operator lexeme
pub fn classify_operator(symbol: &str) -> Option<TokenKind> {
    OPERATORS
        .iter()
        .find(|(lexeme, _)| *lexeme == symbol)
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_name() {
        for kind in TokenKind::ALL {
            assert_eq!(TokenKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(TokenKind::from_name("PROGRAM"), None);
    }

    #[test]
    fn test_index_matches_all_order() {
        assert_eq!(TokenKind::Function.index(), 0);
        assert_eq!(TokenKind::EndMarker.index(), TokenKind::ALL.len() - 1);
    }

    #[test]
    fn test_classify_word() {
        assert_eq!(classify_word("fn"), TokenKind::Function);
        assert_eq!(classify_word("true"), TokenKind::BoolLit);
        assert_eq!(classify_word("or"), TokenKind::Or);
        assert_eq!(classify_word("counter"), TokenKind::Id);
        assert_eq!(classify_word("Fn"), TokenKind::Id);
    }

    #[test]
    fn test_classify_operator() {
        assert_eq!(classify_operator("<>"), Some(TokenKind::Ne));
        assert_eq!(classify_operator("&&"), Some(TokenKind::And));
        assert_eq!(classify_operator("="), Some(TokenKind::Assign));
        assert_eq!(classify_operator("!"), None);
    }

    #[test]
    fn test_kind_categories() {
        assert!(TokenKind::TVoid.is_type());
        assert!(TokenKind::TVoid.is_keyword());
        assert!(TokenKind::While.is_keyword());
        assert!(!TokenKind::Id.is_keyword());
        assert!(TokenKind::BoolLit.is_literal());
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::Float(-3.14).to_string(), "-3.14");
        assert_eq!(Literal::Float(2.0).to_string(), "2.0");
        assert_eq!(Literal::Text("hi".into()).to_string(), "hi");
        assert_eq!(Literal::Boolean(false).to_string(), "false");
    }
}
