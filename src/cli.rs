use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::constants::DEFAULT_WINDOW_DAYS;

#[derive(Parser)]
#[command(name = "nsignals")]
#[command(about = "PriceGuard market data validation and N-level signals", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: feed -> reconcile -> indicators -> signals
    Run {
        /// Watchlist feed: local path or http(s) URL
        #[arg(short, long)]
        feed: String,

        /// Snapshot data directory (default: $NSIGNALS_DATA_DIR or ./data)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Artifact output directory (default: $NSIGNALS_OUT_DIR or ./public)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Trailing evaluation window in daily bars
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: usize,

        /// Also write the n_signals_v1_latest.json alias
        #[arg(long)]
        write_latest: bool,
    },
    /// Show coverage and tier summary of the newest payload
    Status {
        /// Artifact output directory (default: $NSIGNALS_OUT_DIR or ./public)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            feed,
            data_dir,
            out_dir,
            days,
            write_latest,
        } => {
            commands::run::run(feed, data_dir, out_dir, days, write_latest);
        }
        Commands::Status { out_dir } => {
            commands::status::run(out_dir);
        }
    }
}
