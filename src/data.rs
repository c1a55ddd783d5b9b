//! Query-result data model and loading.
//!
//! The analytics backend answers every query with a JSON envelope of tables;
//! each table carries declared columns plus positionally-aligned rows. Cells
//! are kept as raw [`serde_json::Value`]s so the variable-schema dimensions
//! column survives untouched until flattening.

use std::{fs, io::Read, path::Path};

use anyhow::{Context, Result, anyhow};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

/// Fixed textual column present in every record.
pub const TIMESTAMP_COLUMN: &str = "timestamp";
/// Fixed textual column present in every record.
pub const MESSAGE_COLUMN: &str = "message";
/// Variable-schema column holding the nested dimensions bag.
pub const DIMENSIONS_COLUMN: &str = "customDimensions";

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResult {
    pub tables: Vec<ResultTable>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultTable {
    #[serde(default)]
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(default, rename = "type")]
    pub column_type: String,
}

impl QueryResult {
    /// The first table is the primary result; the backend appends auxiliary
    /// tables (render hints, statistics) after it.
    pub fn primary_table(&self) -> Result<&ResultTable> {
        self.tables
            .first()
            .ok_or_else(|| anyhow!("Query result contains no tables"))
    }
}

impl ResultTable {
    /// Position of a declared column, matched case-insensitively by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(name))
    }

    pub fn cell(&self, row_index: usize, column_index: usize) -> Option<&Value> {
        self.rows.get(row_index).and_then(|row| row.get(column_index))
    }
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn load_result(path: &Path) -> Result<QueryResult> {
    let raw = if is_dash(path) {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading query result from stdin")?;
        buffer
    } else {
        fs::read_to_string(path).with_context(|| format!("Reading query result {path:?}"))?
    };
    serde_json::from_str(&raw).with_context(|| format!("Parsing query result {path:?}"))
}

/// Renders one non-dimensions cell for display.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Normalizes an RFC 3339 record timestamp for terminal display; anything
/// unparsable is shown verbatim.
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_index_is_case_insensitive() {
        let table: ResultTable = serde_json::from_value(json!({
            "name": "PrimaryResult",
            "columns": [
                {"name": "Timestamp", "type": "datetime"},
                {"name": "customDimensions", "type": "dynamic"},
            ],
            "rows": [],
        }))
        .unwrap();
        assert_eq!(table.column_index("timestamp"), Some(0));
        assert_eq!(table.column_index("CUSTOMDIMENSIONS"), Some(1));
        assert_eq!(table.column_index("severity"), None);
    }

    #[test]
    fn cell_text_renders_scalars_and_blanks_null() {
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!("boot")), "boot");
        assert_eq!(cell_text(&json!(12)), "12");
        assert_eq!(cell_text(&json!(true)), "true");
    }

    #[test]
    fn format_timestamp_accepts_rfc3339_and_passes_through_garbage() {
        assert_eq!(
            format_timestamp("2024-05-06T14:30:00.250Z"),
            "2024-05-06 14:30:00.250"
        );
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }
}
