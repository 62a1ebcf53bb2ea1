//! Bravais CLI - structure ingestion and deduplication pipeline.

mod cli;
mod commands;
mod settings;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ingest {
            config,
            store,
            error_log,
            report,
        } => commands::ingest::run(config, store, error_log, report, cli.verbose),

        Commands::Status { store, json } => commands::status::run(store, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
