//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SDK runtime CLI: run and check declarative paginated endpoints
#[derive(Parser, Debug)]
#[command(name = "sdk-runtime")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Endpoint definition file (YAML)
    #[arg(short, long, global = true)]
    pub endpoint: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every page of the endpoint and print its records
    Paginate {
        /// Stop after this many records
        #[arg(long)]
        max_items: Option<usize>,

        /// Print whole pages with their pagination metadata
        #[arg(long)]
        pages: bool,
    },

    /// Validate the endpoint definition
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
