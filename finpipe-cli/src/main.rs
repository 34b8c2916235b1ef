//! finpipe: extract financial transactions from the aggregation API, snapshot
//! them to CSV, and load the latest snapshot into the warehouse table.
//!
//! Each subcommand is one stage of the scheduler's DAG (extract -> load ->
//! transform -> verify; the last two are external collaborators). The process
//! exits 0 on success and 1 on failure, nothing else.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod config;
mod stages;

#[derive(Parser, Debug)]
#[command(name = "finpipe", version, about = "Financial transaction ETL pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch transactions for the trailing window and write snapshot artifacts
    Extract,

    /// Load the most recent snapshot into the destination table
    Load,

    /// Extract then load, stopping after a failed extract
    Run,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let ok = match cli.command {
        Command::Extract => stages::run_extract(),
        Command::Load => stages::run_load(),
        Command::Run => stages::run_pipeline(),
    };

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
