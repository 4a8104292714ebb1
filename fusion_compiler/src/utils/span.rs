//! Source location tracking for the FusionCod compiler
//!
//! Tokens and parse tree nodes carry a line and a column; these types bundle
//! them for diagnostics and give the CLI a way to quote the offending line.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text (1-based line and column)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Create the starting position (line 1, column 1)
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Create a single-character span
    pub fn single(pos: Position) -> Self {
        Self {
            start: pos,
            end: Position::new(pos.line, pos.column + 1),
        }
    }

    /// Span covering `width` characters on one line
    pub fn on_line(line: u32, column: u32, width: u32) -> Self {
        Self {
            start: Position::new(line, column),
            end: Position::new(line, column + width.max(1)),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A source map that tracks line starts for quoting source lines
#[derive(Debug, Clone)]
pub struct SourceMap {
    pub source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: String) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    /// Get a line of text by line number (1-based)
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        if line_num == 0 {
            return None;
        }

        let line_idx = (line_num - 1) as usize;
        let start = *self.line_starts.get(line_idx)?;
        let end = match self.line_starts.get(line_idx + 1) {
            Some(next) => next - 1,
            None => self.source.len(),
        };

        Some(self.source[start..end].trim_end_matches('\r'))
    }

    /// Format an error message with source context
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut result = String::new();

        result.push_str(&format!("error: {}\n", message));
        result.push_str(&format!(
            "  --> {}:{}\n",
            span.start.line, span.start.column
        ));

        if let Some(line) = self.get_line(span.start.line) {
            let line_num_str = format!("{}", span.start.line);
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!("{} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));

            let caret_count = if span.start.line == span.end.line {
                span.end.column.saturating_sub(span.start.column) as usize
            } else {
                1
            };
            let indent = " ".repeat(span.start.column.saturating_sub(1) as usize);

            result.push_str(&format!(
                "{} | {}{}\n",
                padding,
                indent,
                "^".repeat(caret_count.max(1))
            ));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_line() {
        let map = SourceMap::new("fn main() {\n  x int = 1;\n}".to_string());
        assert_eq!(map.get_line(2), Some("  x int = 1;"));
        assert_eq!(map.get_line(3), Some("}"));
        assert_eq!(map.get_line(0), None);
        assert_eq!(map.get_line(4), None);
    }

    #[test]
    fn test_format_error_underlines_span() {
        let map = SourceMap::new("a = 1 @ b".to_string());
        let rendered = map.format_error(&Span::on_line(1, 7, 1), "illegal character '@'");

        assert!(rendered.contains("--> 1:7"));
        assert!(rendered.contains("1 | a = 1 @ b"));
        assert!(rendered.contains("\n  |       ^") || rendered.contains("\n |       ^"));
        assert!(rendered.ends_with("|       ^\n"));
    }

    #[test]
    fn test_span_display() {
        assert_eq!(Span::on_line(4, 2, 3).to_string(), "4:2-5");
    }
}
