//! Strongly typed LL(1) parse table
//!
//! The table is persisted as TOML and validated once at load time: every
//! column must be a declared terminal, every production symbol must resolve to
//! a declared terminal or a known nonterminal, and no name may be both.

use crate::logging::codes;
use crate::tokens::TokenKind;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

/// Spellings of the empty production accepted in table cells
pub const EPSILON_SPELLINGS: [&str; 2] = ["e", "epsilon"];

/// Label given to the terminal child created for an epsilon derivation
pub const EPSILON_LABEL: &str = "epsilon";

static DEFAULT_GRAMMAR_SOURCE: &str = include_str!("../../grammar/fusion_ll1.toml");

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrammarError {
    #[error("Malformed grammar table: {message}")]
    Malformed { message: String },

    #[error("Unknown terminal '{name}' in grammar table")]
    UnknownTerminal { name: String },

    #[error("Production {nonterminal} -> ... on '{terminal}' references unknown symbol '{symbol}'")]
    UnknownSymbol {
        nonterminal: String,
        terminal: String,
        symbol: String,
    },

    #[error("Symbol '{name}' is declared both as a terminal and as a nonterminal")]
    AmbiguousSymbol { name: String },

    #[error("Start symbol '{name}' has no productions")]
    MissingStart { name: String },

    #[error("Invalid production for {nonterminal} on '{terminal}': {message}")]
    InvalidProduction {
        nonterminal: String,
        terminal: String,
        message: String,
    },

    #[error("Cannot read grammar file {path}: {message}")]
    Io { path: String, message: String },
}

impl GrammarError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            GrammarError::Malformed { .. } => codes::grammar::MALFORMED_TABLE,
            GrammarError::UnknownTerminal { .. } => codes::grammar::UNKNOWN_TERMINAL,
            GrammarError::UnknownSymbol { .. } => codes::grammar::UNKNOWN_SYMBOL,
            GrammarError::AmbiguousSymbol { .. } => codes::grammar::AMBIGUOUS_SYMBOL,
            GrammarError::MissingStart { .. } => codes::grammar::MISSING_START,
            GrammarError::InvalidProduction { .. } => codes::grammar::INVALID_PRODUCTION,
            GrammarError::Io { .. } => codes::file_processing::IO_ERROR,
        }
    }
}

/// Index of a nonterminal inside its [`GrammarTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonTerminalId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarSymbol {
    Terminal(TokenKind),
    NonTerminal(NonTerminalId),
}

impl GrammarSymbol {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GrammarSymbol::Terminal(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Production {
    Epsilon,
    Symbols(Vec<GrammarSymbol>),
}

impl Production {
    pub fn len(&self) -> usize {
        match self {
            Production::Epsilon => 0,
            Production::Symbols(symbols) => symbols.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of looking up one table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    Production(&'a Production),
    /// The column exists but this nonterminal has no entry for it
    Empty,
    /// The token kind is not part of the grammar's terminal vocabulary
    UndeclaredColumn,
}

#[derive(Debug, Deserialize)]
struct RawGrammar {
    start: String,
    terminals: Vec<String>,
    productions: BTreeMap<String, BTreeMap<String, String>>,
}

/// Validated LL(1) parse table
#[derive(Debug, Clone)]
pub struct GrammarTable {
    start: NonTerminalId,
    nonterminals: Vec<String>,
    terminals: Vec<TokenKind>,
    declared: BTreeSet<TokenKind>,
    rows: Vec<BTreeMap<TokenKind, Production>>,
}

impl GrammarTable {
    /// The FusionCod grammar shipped with the compiler
    pub fn default_grammar() -> Result<Self, GrammarError> {
        Self::from_toml_str(DEFAULT_GRAMMAR_SOURCE)
    }

    pub fn from_file(path: &Path) -> Result<Self, GrammarError> {
        let content = std::fs::read_to_string(path).map_err(|e| GrammarError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, GrammarError> {
        let raw: RawGrammar = toml::from_str(content).map_err(|e| GrammarError::Malformed {
            message: e.to_string(),
        })?;

        let mut terminals = Vec::with_capacity(raw.terminals.len());
        let mut declared = BTreeSet::new();
        for name in &raw.terminals {
            let kind = TokenKind::from_name(name)
                .ok_or_else(|| GrammarError::UnknownTerminal { name: name.clone() })?;
            if declared.insert(kind) {
                terminals.push(kind);
            }
        }

        let nonterminals: Vec<String> = raw.productions.keys().cloned().collect();
        for name in &nonterminals {
            if TokenKind::from_name(name).is_some_and(|kind| declared.contains(&kind))
                || EPSILON_SPELLINGS.contains(&name.as_str())
            {
                return Err(GrammarError::AmbiguousSymbol { name: name.clone() });
            }
        }

        let start = nonterminals
            .iter()
            .position(|name| *name == raw.start)
            .map(NonTerminalId)
            .ok_or_else(|| GrammarError::MissingStart {
                name: raw.start.clone(),
            })?;

        let resolve = |nonterminal: &str, terminal: &str, symbol: &str| {
            if let Some(kind) = TokenKind::from_name(symbol).filter(|k| declared.contains(k)) {
                return Ok(GrammarSymbol::Terminal(kind));
            }
            if let Some(index) = nonterminals.iter().position(|name| name == symbol) {
                return Ok(GrammarSymbol::NonTerminal(NonTerminalId(index)));
            }
            if EPSILON_SPELLINGS.contains(&symbol) {
                return Err(GrammarError::InvalidProduction {
                    nonterminal: nonterminal.to_string(),
                    terminal: terminal.to_string(),
                    message: "epsilon must be the whole production".to_string(),
                });
            }
            Err(GrammarError::UnknownSymbol {
                nonterminal: nonterminal.to_string(),
                terminal: terminal.to_string(),
                symbol: symbol.to_string(),
            })
        };

        let mut rows = Vec::with_capacity(nonterminals.len());
        for (nonterminal, cells) in &raw.productions {
            let mut row = BTreeMap::new();
            for (terminal, body) in cells {
                let kind = TokenKind::from_name(terminal)
                    .filter(|k| declared.contains(k))
                    .ok_or_else(|| GrammarError::UnknownTerminal {
                        name: terminal.clone(),
                    })?;

                let body = body.trim();
                let production = if EPSILON_SPELLINGS.contains(&body) {
                    Production::Epsilon
                } else if body.is_empty() {
                    return Err(GrammarError::InvalidProduction {
                        nonterminal: nonterminal.clone(),
                        terminal: terminal.clone(),
                        message: "empty production string".to_string(),
                    });
                } else {
                    let symbols = body
                        .split_whitespace()
                        .map(|symbol| resolve(nonterminal, terminal, symbol))
                        .collect::<Result<Vec<_>, _>>()?;
                    Production::Symbols(symbols)
                };
                row.insert(kind, production);
            }
            rows.push(row);
        }

        Ok(Self {
            start,
            nonterminals,
            terminals,
            declared,
            rows,
        })
    }

    pub fn start(&self) -> NonTerminalId {
        self.start
    }

    pub fn nonterminal_name(&self, id: NonTerminalId) -> &str {
        self.nonterminals
            .get(id.0)
            .map(String::as_str)
            .unwrap_or("?")
    }

    pub fn nonterminal_id(&self, name: &str) -> Option<NonTerminalId> {
        self.nonterminals
            .iter()
            .position(|n| n == name)
            .map(NonTerminalId)
    }

    pub fn nonterminal_count(&self) -> usize {
        self.nonterminals.len()
    }

    /// Terminal vocabulary in declaration order
    pub fn terminals(&self) -> &[TokenKind] {
        &self.terminals
    }

    pub fn is_declared_terminal(&self, kind: TokenKind) -> bool {
        self.declared.contains(&kind)
    }

    pub fn symbol_name(&self, symbol: &GrammarSymbol) -> &str {
        match symbol {
            GrammarSymbol::Terminal(kind) => kind.as_str(),
            GrammarSymbol::NonTerminal(id) => self.nonterminal_name(*id),
        }
    }

    pub fn lookup(&self, nonterminal: NonTerminalId, kind: TokenKind) -> Cell<'_> {
        if !self.is_declared_terminal(kind) {
            return Cell::UndeclaredColumn;
        }
        match self.rows.get(nonterminal.0).and_then(|row| row.get(&kind)) {
            Some(production) => Cell::Production(production),
            None => Cell::Empty,
        }
    }

    /// Terminals with a non-empty cell in this nonterminal's row
    pub fn expected_terminals(&self, nonterminal: NonTerminalId) -> Vec<TokenKind> {
        self.rows
            .get(nonterminal.0)
            .map(|row| row.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn production_count(&self) -> usize {
        self.rows.iter().map(BTreeMap::len).sum()
    }

    /// Render a production as its space-separated symbol names
    pub fn format_production(&self, production: &Production) -> String {
        match production {
            Production::Epsilon => EPSILON_LABEL.to_string(),
            Production::Symbols(symbols) => symbols
                .iter()
                .map(|s| self.symbol_name(s))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl fmt::Display for GrammarTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "grammar(start={}, nonterminals={}, terminals={}, productions={})",
            self.nonterminal_name(self.start),
            self.nonterminals.len(),
            self.terminals.len(),
            self.production_count()
        )
    }
}
