//! modgraph CLI tool.
//!
//! Usage:
//! ```bash
//! modgraph check [OPTIONS] [ROOTS]...
//! modgraph list-rules
//! modgraph init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Module dependency-graph checker: cycles and boundary rules
#[derive(Parser)]
#[command(name = "modgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file (default: ./modgraph.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan roots, detect cycles, and validate boundary rules
    Check {
        /// Root directories to scan (default: from config, or ./src)
        roots: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Skip cycle detection; boundary rules still run
        #[arg(long)]
        no_cycles: bool,
    },

    /// List the built-in rule shapes
    ListRules,

    /// Write a starter modgraph.toml
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for check results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable grouped summary.
    #[default]
    Text,
    /// The structured result as JSON.
    Json,
    /// One line per violation.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Check {
            roots,
            format,
            exclude,
            no_cycles,
        } => commands::check::run(&roots, format, &exclude, no_cycles, cli.config.as_deref()),
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
