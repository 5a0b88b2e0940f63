//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const STARTER_CONFIG: &str = r#"# modgraph configuration

[scan]
# Root directories to scan
roots = ["src"]

# Source roots tried for bare specifiers (path-alias style imports)
# source_roots = ["src"]

# Patterns to exclude; directories are pruned, files are skipped
exclude = [
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/coverage/**",
]

# Boundary rules. Severity is "blocking" (fails the run) or "advisory".

[[rules]]
type = "layer-isolation"
name = "no-web-in-core"
source_prefix = "core/"
target_prefix = "web/"
severity = "blocking"
message = "core must not depend on web"
suggestion = "invert the dependency via an interface in core"

# [[rules]]
# type = "required-dependency"
# name = "handlers-log"
# unit_pattern = "web/handlers/"
# required_any = ["logger", "pino"]
# severity = "advisory"
# message = "handlers must import a logger"

# [[rules]]
# type = "forbidden-dependency"
# name = "no-legacy"
# source_pattern = "app/"
# forbidden_any = ["legacy/"]
# message = "legacy modules are frozen"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("modgraph.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, STARTER_CONFIG)?;

    println!("Created modgraph.toml");
    println!("\nNext steps:");
    println!("  1. Edit modgraph.toml to describe your layers");
    println!("  2. Run: modgraph check");

    Ok(())
}
