//! TOML configuration: the `[scan]` section and the `[[rules]]` tables.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::rules::{Rule, RuleKind};

/// Default directory exclusions applied when the config lists none.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/coverage/**",
];

/// Top-level checker configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Scan settings.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Boundary rules, evaluated in order.
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// The `[scan]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Root directories to scan.
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,

    /// Source roots tried for bare specifiers (path-alias trees).
    #[serde(default)]
    pub source_roots: Vec<PathBuf>,

    /// Exclusion patterns (substring semantics on `/`-separated paths).
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            source_roots: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

fn default_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("src")]
}

/// Errors when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML.
    #[error("invalid config: {message}")]
    Parse {
        /// Parse error detail.
        message: String,
    },
    /// Config is structurally invalid.
    #[error("config validation: {0}")]
    Validation(String),
}

impl Config {
    /// Loads from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// The effective exclusion list: configured patterns, or the defaults
    /// when none are configured.
    #[must_use]
    pub fn effective_excludes(&self) -> Vec<String> {
        if self.scan.exclude.is_empty() {
            DEFAULT_EXCLUDES.iter().map(ToString::to_string).collect()
        } else {
            self.scan.exclude.clone()
        }
    }

    /// Validates rule parameters.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names: HashSet<&str> = HashSet::new();

        for (i, rule) in self.rules.iter().enumerate() {
            if rule.name.is_empty() {
                return Err(ConfigError::Validation(format!("rules[{i}]: empty name")));
            }
            if !names.insert(rule.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "rules[{i}]: duplicate name '{}'",
                    rule.name
                )));
            }
            match &rule.kind {
                RuleKind::LayerIsolation {
                    source_prefix,
                    target_prefix,
                } => {
                    if source_prefix.is_empty() || target_prefix.is_empty() {
                        return Err(ConfigError::Validation(format!(
                            "rules[{i}] '{}': empty layer prefix",
                            rule.name
                        )));
                    }
                }
                RuleKind::RequiredDependency { required_any, .. } => {
                    if required_any.is_empty() {
                        return Err(ConfigError::Validation(format!(
                            "rules[{i}] '{}': required_any is empty",
                            rule.name
                        )));
                    }
                }
                RuleKind::ForbiddenDependency { forbidden_any, .. } => {
                    if forbidden_any.is_empty() {
                        return Err(ConfigError::Validation(format!(
                            "rules[{i}] '{}': forbidden_any is empty",
                            rule.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
