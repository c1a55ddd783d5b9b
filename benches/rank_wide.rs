//! Benchmarks ranking latency on wide synthetic query results.

use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};

use telemetry_lens::data::ResultTable;
use telemetry_lens::rank::{RankingConfig, ranked_headers};

fn generate_table(rows: usize, keys_per_row: usize) -> ResultTable {
    let rows = (0..rows)
        .map(|row| {
            let mut dims = serde_json::Map::new();
            for key in 0..keys_per_row {
                let value = match key % 4 {
                    0 => json!(format!("value-{row}-{key}")),
                    1 => json!(row % 7),
                    2 => json!(row % 2 == 0),
                    _ => json!({"nested": {"leaf": row}}),
                };
                dims.insert(format!("dim{key:02}"), value);
            }
            json!([
                format!("2024-05-06T14:{:02}:{:02}Z", row / 60 % 60, row % 60),
                format!("event {row}"),
                Value::Object(dims),
            ])
        })
        .collect::<Vec<_>>();
    serde_json::from_value(json!({
        "name": "PrimaryResult",
        "columns": [
            {"name": "timestamp", "type": "datetime"},
            {"name": "message", "type": "string"},
            {"name": "customDimensions", "type": "dynamic"},
        ],
        "rows": rows,
    }))
    .expect("valid table")
}

fn bench_ranked_headers(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranked_headers");
    for (rows, keys) in [(200, 10), (500, 50), (2000, 50)] {
        let table = generate_table(rows, keys);
        let config = RankingConfig::default();
        group.bench_function(format!("{rows}rows_{keys}keys"), |b| {
            b.iter(|| ranked_headers(&table, &config))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ranked_headers);
criterion_main!(benches);
