//! Tabular preview of a query result under the ranked headers.

use std::collections::HashMap;

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::PreviewArgs,
    data::{self, MESSAGE_COLUMN, TIMESTAMP_COLUMN},
    flatten, rank, table,
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let result = data::load_result(&args.input)?;
    let primary = result.primary_table()?;
    let config = rank::resolve_config(&args.ranking)?;
    let headers = rank::ranked_headers(primary, &config);

    let mut rows = Vec::new();
    for row_idx in 0..primary.rows.len().min(args.rows) {
        let flat = flatten::flatten_row(primary, row_idx)
            .with_context(|| format!("Flattening row {}", row_idx + 1))?;
        let mut by_key: HashMap<String, &str> = HashMap::new();
        for field in &flat.fields {
            by_key
                .entry(field.key.to_ascii_lowercase())
                .or_insert(field.value.as_str());
        }
        let cells = headers
            .iter()
            .map(|header| match header.as_str() {
                TIMESTAMP_COLUMN => data::format_timestamp(&flat.timestamp),
                MESSAGE_COLUMN => flat.message.clone(),
                other => by_key
                    .get(&other.to_ascii_lowercase())
                    .map(|value| value.to_string())
                    .unwrap_or_default(),
            })
            .collect::<Vec<_>>();
        rows.push(cells);
    }

    table::print_table(&headers, &rows, args.max_width);
    info!(
        "Displayed {} row(s) across {} column(s) from {:?}",
        rows.len(),
        headers.len(),
        args.input
    );
    Ok(())
}
