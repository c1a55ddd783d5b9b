#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

use telemetry_lens::data::ResultTable;

/// Builds a full query-result envelope whose primary table has the three
/// standard columns and one row per dimensions value.
pub fn result_envelope(dimensions: &[Value]) -> Value {
    let rows = dimensions
        .iter()
        .enumerate()
        .map(|(idx, dims)| {
            json!([
                format!("2024-05-06T14:30:{:02}Z", idx % 60),
                format!("event {idx}"),
                dims,
            ])
        })
        .collect::<Vec<_>>();
    json!({
        "tables": [{
            "name": "PrimaryResult",
            "columns": [
                {"name": "timestamp", "type": "datetime"},
                {"name": "message", "type": "string"},
                {"name": "customDimensions", "type": "dynamic"},
            ],
            "rows": rows,
        }]
    })
}

/// The primary table of [`result_envelope`], deserialized.
pub fn table_with_dimensions(dimensions: Vec<Value>) -> ResultTable {
    let envelope = result_envelope(&dimensions);
    serde_json::from_value(envelope["tables"][0].clone()).expect("valid table")
}

/// Repeats `dims` across `count` rows.
pub fn repeated(dims: Value, count: usize) -> Vec<Value> {
    (0..count).map(|_| dims.clone()).collect()
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a query-result envelope as pretty JSON and returns the path.
    pub fn write_result(&self, name: &str, dimensions: &[Value]) -> PathBuf {
        let envelope = result_envelope(dimensions);
        self.write(
            name,
            &serde_json::to_string_pretty(&envelope).expect("serialize envelope"),
        )
    }
}
