//! Tabular symbol table exports

use crate::symbols::{SymbolRow, SymbolTable};

pub const CSV_HEADER: &str = "symbol,category,type,scope,parameters,return_type";

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_row(row: &SymbolRow) -> String {
    [
        row.symbol.as_str(),
        row.category.as_str(),
        row.symbol_type.as_str(),
        row.scope.as_str(),
        row.parameters.as_str(),
        row.return_type.as_str(),
    ]
    .iter()
    .map(|field| csv_field(field))
    .collect::<Vec<_>>()
    .join(",")
}

/// One line per symbol, scopes in pre-order
pub fn symbols_csv(table: &SymbolTable) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for row in table.rows() {
        out.push_str(&csv_row(&row));
        out.push('\n');
    }
    out
}

pub fn symbols_json(table: &SymbolTable) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&table.rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{Parameter, SymbolEntry, GLOBAL_SCOPE};

    fn sample() -> SymbolTable {
        let mut table = SymbolTable::new();
        table
            .insert(
                GLOBAL_SCOPE,
                SymbolEntry::function(
                    "area",
                    vec![
                        Parameter { name: "b".into(), param_type: "float".into() },
                        Parameter { name: "h".into(), param_type: "float".into() },
                    ],
                    "float",
                ),
            )
            .unwrap();
        let area = table.create_scope(GLOBAL_SCOPE, "area").unwrap();
        table.insert(area, SymbolEntry::parameter("b", "float")).unwrap();
        table.insert(area, SymbolEntry::variable("r", "float")).unwrap();
        table
    }

    #[test]
    fn test_symbols_csv() {
        let csv = symbols_csv(&sample());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "area,function,,global,\"b: float, h: float\",float");
        assert_eq!(lines[2], "b,parameter,float,area,,");
        assert_eq!(lines[3], "r,variable,float,area,,");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_symbols_json() {
        let json = symbols_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value.as_array().unwrap().len(), 3);
        assert_eq!(value[0]["symbol"], "area");
        assert_eq!(value[0]["type"], "");
        assert_eq!(value[2]["scope"], "area");
    }
}
