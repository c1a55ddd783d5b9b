use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Explore telemetry query results in the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute the ranked column headers for a query result
    Rank(RankArgs),
    /// Render the first rows of a query result under the ranked headers
    Preview(PreviewArgs),
    /// Flatten one row's dimensions into its leaf fields
    Detail(DetailArgs),
}

/// Flags shared by every command that runs the ranking pipeline.
#[derive(Debug, Args, Default)]
pub struct RankingArgs {
    /// Ranking settings file (JSON)
    #[arg(short, long)]
    pub settings: Option<PathBuf>,
    /// Skip score-based ranking and use the structural column ordering
    #[arg(long = "no-rank")]
    pub no_rank: bool,
    /// Maximum rows sampled for scoring (0 = default 200)
    #[arg(long = "sample-size")]
    pub sample_size: Option<usize>,
    /// Comma-separated columns pinned ahead of every scored column
    #[arg(long)]
    pub pin: Option<String>,
    /// Boost rules: JSON object or `pattern=boost` fragments separated by ';'
    #[arg(long)]
    pub rules: Option<String>,
}

#[derive(Debug, Args)]
pub struct RankArgs {
    /// Query result JSON file ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    #[command(flatten)]
    pub ranking: RankingArgs,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Query result JSON file ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Clip cells wider than this many characters (0 = no clipping)
    #[arg(long = "max-width", default_value_t = 40)]
    pub max_width: usize,
    #[command(flatten)]
    pub ranking: RankingArgs,
}

#[derive(Debug, Args)]
pub struct DetailArgs {
    /// Query result JSON file ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// 1-based row number to flatten
    #[arg(long, default_value_t = 1)]
    pub row: usize,
    /// Clip values wider than this many characters (0 = no clipping)
    #[arg(long = "max-width", default_value_t = 120)]
    pub max_width: usize,
}
