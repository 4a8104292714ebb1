//! Plain-text token dumps

use crate::tokens::Token;

const HEADERS: [&str; 4] = ["Kind", "Value", "Line", "Column"];

/// Kind names joined by single spaces, the input format LL(1) table
/// checkers accept
pub fn token_kinds_line(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| token.kind.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fixed-width table of kind, value, line and column
pub fn token_table(tokens: &[Token]) -> String {
    let rows: Vec<[String; 4]> = tokens
        .iter()
        .map(|token| {
            [
                token.kind.as_str().to_string(),
                token.value.to_string(),
                token.line.to_string(),
                token.column.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: [&str; 4]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let separator = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut out = String::new();
    out.push_str(&render(HEADERS));
    out.push('\n');
    out.push_str(&separator);
    out.push('\n');
    for row in &rows {
        out.push_str(&render([&row[0], &row[1], &row[2], &row[3]]));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical;

    #[test]
    fn test_token_kinds_line() {
        let result = lexical::tokenize("fn main() { show(\"hola\"); }").unwrap();
        assert_eq!(
            token_kinds_line(&result.tokens),
            "function main lparen rparen lbrace show lparen text_lit rparen semicolon rbrace"
        );
        assert_eq!(token_kinds_line(&[]), "");
    }

    #[test]
    fn test_token_table_layout() {
        let result = lexical::tokenize("x int = 42;").unwrap();
        let table = token_table(&result.tokens);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 2 + result.tokens.len());
        assert!(lines[0].starts_with("Kind"));
        assert!(lines[1].starts_with("-------"));
        assert!(lines[2].starts_with("id"));
        assert!(lines[5].contains("42"));

        let column_of = |line: &str| line.find('|');
        assert_eq!(column_of(lines[0]), column_of(lines[3]));
    }
}
