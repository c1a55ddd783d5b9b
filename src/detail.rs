//! Leaf-field listing for a single record.
//!
//! Flattens one row's dimensions value and renders the fixed fields plus
//! every leaf as a two-column table, the same shape the interactive detail
//! pane shows.

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::DetailArgs,
    data::{self, MESSAGE_COLUMN, TIMESTAMP_COLUMN},
    flatten, table,
};

pub fn execute(args: &DetailArgs) -> Result<()> {
    let result = data::load_result(&args.input)?;
    let primary = result.primary_table()?;
    let row_index = args
        .row
        .checked_sub(1)
        .context("Row numbers start at 1")?;
    let flat = flatten::flatten_row(primary, row_index)
        .with_context(|| format!("Flattening row {} of {:?}", args.row, args.input))?;

    let mut rows = vec![
        vec![
            TIMESTAMP_COLUMN.to_string(),
            data::format_timestamp(&flat.timestamp),
        ],
        vec![MESSAGE_COLUMN.to_string(), flat.message.clone()],
    ];
    rows.extend(
        flat.fields
            .iter()
            .map(|field| vec![field.key.clone(), field.value.clone()]),
    );

    let headers = vec!["field".to_string(), "value".to_string()];
    table::print_table(&headers, &rows, args.max_width);
    info!(
        "Flattened {} dimension field(s) from row {} of {:?}",
        flat.fields.len(),
        args.row,
        args.input
    );
    Ok(())
}
