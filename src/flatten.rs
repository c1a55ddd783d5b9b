//! Flattening of the variable-schema dimensions value.
//!
//! Turns one row's nested dimensions bag into ordered leaf key/value text
//! pairs: nested objects become dot-joined paths (`nest.x`), arrays get
//! bracket-index suffixes (`nest.y[0]`). A string payload is first attempted
//! as JSON; a payload that does not parse degrades to a `(parse_warning)`
//! field followed by a `raw` field instead of aborting the row.

use serde_json::Value;
use thiserror::Error;

use crate::data::{DIMENSIONS_COLUMN, MESSAGE_COLUMN, ResultTable, TIMESTAMP_COLUMN, cell_text};

/// Upper bound on leaf fields emitted per row; protects downstream consumers
/// from pathologically wide single rows.
pub const MAX_FIELDS_PER_ROW: usize = 256;
/// Payloads nested deeper than this are rejected outright.
pub const MAX_NESTING_DEPTH: usize = 32;

pub const PARSE_WARNING_KEY: &str = "(parse_warning)";
pub const RAW_KEY: &str = "raw";

#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("row {row} is out of range for a result of {len} row(s)")]
    RowOutOfRange { row: usize, len: usize },
    #[error("dimensions value nested deeper than {MAX_NESTING_DEPTH} level(s)")]
    DepthExceeded,
}

/// One leaf of a flattened dimensions value, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatField {
    pub key: String,
    pub value: String,
}

/// One fully flattened record: the two fixed fields plus the dimension leaves.
#[derive(Debug, Clone)]
pub struct FlatRow {
    pub timestamp: String,
    pub message: String,
    pub fields: Vec<FlatField>,
}

/// Flattens row `row_index` of `table` into its fixed fields and ordered
/// dimension leaves.
pub fn flatten_row(table: &ResultTable, row_index: usize) -> Result<FlatRow, FlattenError> {
    if row_index >= table.rows.len() {
        return Err(FlattenError::RowOutOfRange {
            row: row_index,
            len: table.rows.len(),
        });
    }
    let text_of = |column: &str| {
        table
            .column_index(column)
            .and_then(|idx| table.cell(row_index, idx))
            .map(cell_text)
            .unwrap_or_default()
    };
    let mut fields = Vec::new();
    if let Some(dims_idx) = table.column_index(DIMENSIONS_COLUMN)
        && let Some(value) = table.cell(row_index, dims_idx)
    {
        flatten_dimensions(value, &mut fields)?;
    }
    Ok(FlatRow {
        timestamp: text_of(TIMESTAMP_COLUMN),
        message: text_of(MESSAGE_COLUMN),
        fields,
    })
}

/// Flattens one dimensions cell into `out`, appending at most
/// [`MAX_FIELDS_PER_ROW`] leaves. `out` is not cleared, so callers may reuse
/// one buffer across rows.
pub fn flatten_dimensions(value: &Value, out: &mut Vec<FlatField>) -> Result<(), FlattenError> {
    match value {
        Value::Null => Ok(()),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => walk(&parsed, "", 0, out),
            Err(err) => {
                push_field(out, PARSE_WARNING_KEY.to_string(), err.to_string());
                push_field(out, RAW_KEY.to_string(), raw.clone());
                Ok(())
            }
        },
        other => walk(other, "", 0, out),
    }
}

fn walk(value: &Value, path: &str, depth: usize, out: &mut Vec<FlatField>) -> Result<(), FlattenError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(FlattenError::DepthExceeded);
    }
    if out.len() >= MAX_FIELDS_PER_ROW {
        return Ok(());
    }
    match value {
        Value::Object(entries) => {
            for (name, nested) in entries {
                let joined = if path.is_empty() {
                    name.clone()
                } else {
                    format!("{path}.{name}")
                };
                walk(nested, &joined, depth + 1, out)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                walk(nested, &format!("{path}[{index}]"), depth + 1, out)?;
            }
            Ok(())
        }
        leaf => {
            let key = if path.is_empty() {
                // Scalar at the root: the payload is the whole value.
                "value".to_string()
            } else {
                path.to_string()
            };
            push_field(out, key, cell_text(leaf));
            Ok(())
        }
    }
}

fn push_field(out: &mut Vec<FlatField>, key: String, value: String) {
    if out.len() < MAX_FIELDS_PER_ROW {
        out.push(FlatField { key, value });
    }
}
