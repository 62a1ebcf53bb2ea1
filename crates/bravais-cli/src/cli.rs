//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bravais: structure ingestion and deduplication pipeline
#[derive(Parser)]
#[command(name = "bravais")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest structure directories into the entry store
    Ingest {
        /// Path to the JSON settings file
        #[arg(value_name = "SETTINGS")]
        config: PathBuf,

        /// Override the store path from the settings file
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Override the error-log path from the settings file
        #[arg(long)]
        error_log: Option<PathBuf>,

        /// Write the full ingest report as JSON
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Show entry-store contents summary
    Status {
        /// Path to the store file
        #[arg(value_name = "STORE")]
        store: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
