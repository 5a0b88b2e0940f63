//! The check command: scan, detect cycles, validate rules, report.

use anyhow::{Context, Result};
use modgraph_core::{find_cycles, rules, Config, GraphBuilder, Report};
use std::path::{Path, PathBuf};

use crate::OutputFormat;

/// Default config file name probed in the working directory.
const DEFAULT_CONFIG: &str = "modgraph.toml";

/// Runs the check command.
///
/// Exits with status 1 when any blocking-severity violation exists; since
/// every cycle synthesizes one, cycles fail the run even when all
/// configured rules pass. Advisory violations never affect exit status.
pub fn run(
    roots: &[PathBuf],
    format: OutputFormat,
    excludes: &[String],
    no_cycles: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    config.validate().context("config validation failed")?;

    let mut builder = GraphBuilder::new();
    let effective_roots: Vec<PathBuf> = if roots.is_empty() {
        config.scan.roots.clone()
    } else {
        roots.to_vec()
    };
    for root in effective_roots {
        builder = builder.root(root);
    }
    for source_root in &config.scan.source_roots {
        builder = builder.source_root(source_root);
    }
    builder = builder
        .excludes(config.effective_excludes())
        .excludes(excludes.iter().cloned());

    let graph = builder.build().context("scan failed")?;

    let cycles = if no_cycles {
        tracing::info!("cycle detection disabled");
        Vec::new()
    } else {
        find_cycles(&graph)
    };

    let violations = rules::evaluate(&graph, &config.rules, &cycles);
    let report = Report::new(&graph, cycles, violations);

    super::output::print(&report, format)?;

    if report.has_blocking() {
        std::process::exit(1);
    }

    Ok(())
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load {}", path.display())),
        None => {
            let default = Path::new(DEFAULT_CONFIG);
            if default.is_file() {
                tracing::debug!("using {}", default.display());
                Config::from_file(default)
                    .with_context(|| format!("failed to load {}", default.display()))
            } else {
                Ok(Config::default())
            }
        }
    }
}
