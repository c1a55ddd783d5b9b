pub mod cli;
pub mod data;
pub mod detail;
pub mod discover;
pub mod flatten;
pub mod order;
pub mod preview;
pub mod rank;
pub mod rules;
pub mod score;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("telemetry_lens", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Rank(args) => handle_rank(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Detail(args) => detail::execute(&args),
    }
}

fn handle_rank(args: &cli::RankArgs) -> Result<()> {
    let result = data::load_result(&args.input)?;
    let primary = result.primary_table()?;
    let config = rank::resolve_config(&args.ranking)?;
    let headers = rank::ranked_headers(primary, &config);

    let rows = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| vec![(idx + 1).to_string(), header.clone()])
        .collect::<Vec<_>>();
    let table_headers = vec!["#".to_string(), "column".to_string()];
    table::print_table(&table_headers, &rows, 0);
    info!(
        "Ranked {} column(s) over {} row(s) from {:?}",
        headers.len(),
        primary.rows.len(),
        args.input
    );
    Ok(())
}
