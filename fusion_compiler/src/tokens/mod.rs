//! Token system for FusionCod lexical analysis
//!
//! Tokens are the hand-off between the lexer and the predictive parser. Each
//! [`Token`] carries a [`TokenKind`] whose name doubles as a terminal column in
//! the LL(1) grammar table, a [`Literal`] value and its 1-based line/column.
//!
//! ## Reserved words
//!
//! `fn main show return stop int float text bool void if elif else while for
//! read and or true false`. The operators `&&` and `||` lex to the same kinds as
//! `and` and `or`.

pub mod token;

pub use token::{
    classify_operator, classify_word, Literal, Token, TokenKind, OPERATORS, RESERVED_WORDS,
};
