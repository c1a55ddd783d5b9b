//! Dimension key discovery and row sampling.

use std::collections::HashMap;

use log::debug;
use serde_json::Value;

use crate::{
    data::{DIMENSIONS_COLUMN, ResultTable},
    flatten::{self, FlatField},
};

/// Rows inspected by the statistics pass when no ceiling is configured.
pub const DEFAULT_SAMPLE_SIZE: usize = 200;

/// One dimension key: a lower-cased canonical identity plus the casing of its
/// first occurrence in row order.
#[derive(Debug, Clone)]
pub struct DiscoveredKey {
    pub canonical: String,
    pub display: String,
}

/// Deduplicated dimension keys in first-seen order.
#[derive(Debug, Default)]
pub struct KeyBook {
    keys: Vec<DiscoveredKey>,
    index: HashMap<String, usize>,
}

impl KeyBook {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiscoveredKey> {
        self.keys.iter()
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.index.contains_key(canonical)
    }

    pub fn display(&self, canonical: &str) -> Option<&str> {
        self.index
            .get(canonical)
            .map(|&position| self.keys[position].display.as_str())
    }

    fn insert(&mut self, original: &str) {
        let canonical = original.to_ascii_lowercase();
        if !self.index.contains_key(&canonical) {
            self.index.insert(canonical.clone(), self.keys.len());
            self.keys.push(DiscoveredKey {
                canonical,
                display: original.to_string(),
            });
        }
    }
}

/// Scans the full row set (never just the sample) and collects every
/// dimension key in first-seen order. A key discovered here is never dropped,
/// even if the eventual sample window misses it. Rows whose dimensions value
/// cannot be flattened contribute no keys; the scan itself never fails.
pub fn discover_keys(table: &ResultTable) -> KeyBook {
    let mut book = KeyBook::default();
    let Some(dims_idx) = table.column_index(DIMENSIONS_COLUMN) else {
        return book;
    };
    let mut scratch: Vec<FlatField> = Vec::new();
    for (row_idx, row) in table.rows.iter().enumerate() {
        let Some(value) = row.get(dims_idx) else {
            continue;
        };
        scratch.clear();
        if let Err(err) = flatten::flatten_dimensions(value, &mut scratch) {
            debug!("Skipping row {row_idx} during key discovery: {err}");
            continue;
        }
        for field in &scratch {
            book.insert(&field.key);
        }
    }
    book
}

/// Deterministic prefix sample: the first `min(sample_size, rows)` rows,
/// unmodified. Zero (unset) falls back to [`DEFAULT_SAMPLE_SIZE`]. Callers
/// rely on first-N semantics; this is never a random sample.
pub fn sample(rows: &[Vec<Value>], sample_size: usize) -> &[Vec<Value>] {
    let ceiling = if sample_size == 0 {
        DEFAULT_SAMPLE_SIZE
    } else {
        sample_size
    };
    &rows[..rows.len().min(ceiling)]
}
