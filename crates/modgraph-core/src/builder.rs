//! Tree traversal and graph assembly.
//!
//! The builder walks the configured roots, constructs one unit per
//! eligible file, runs the extractor and resolver for each, and assembles
//! the [`ModuleGraph`]. Assembly is purely additive and order-independent:
//! units are collected and sorted before any reference is resolved, and
//! the sealed graph compares equal whatever order files were discovered in.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::extract::{extract_references, is_builtin};
use crate::graph::{Edge, ExternalRef, GraphError, ModuleGraph, UnresolvedRef};
use crate::resolve::{normalize, Resolution, Resolver};

/// File extensions that make a file a unit.
const UNIT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

/// File-name infixes that exclude a file from being a unit at all.
const SKIP_FILE_MARKERS: &[&str] = &[".test.", ".spec.", "__tests__", "__mocks__"];

/// Errors that abort a scan.
///
/// Everything else (missing roots, unresolved references, odd syntax) is
/// degraded gracefully, logged, and carried in the graph as data.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A discovered file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// Graph assembly failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Builder for a [`ModuleGraph`] scan.
#[derive(Default)]
pub struct GraphBuilder {
    roots: Vec<PathBuf>,
    source_roots: Vec<PathBuf>,
    excludes: Vec<String>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            roots: config.scan.roots.clone(),
            source_roots: config.scan.source_roots.clone(),
            excludes: config.effective_excludes(),
        }
    }

    /// Adds a root directory to scan.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.roots.push(path.into());
        self
    }

    /// Adds a source root for bare-specifier resolution.
    #[must_use]
    pub fn source_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_roots.push(path.into());
        self
    }

    /// Adds an exclusion pattern (substring semantics, `**` stripped).
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    /// Adds multiple exclusion patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Scans the roots and assembles the graph.
    ///
    /// A root that does not exist is logged and skipped, so a multi-root
    /// run degrades gracefully. Source roots default to the scan roots
    /// when none were configured.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] only for filesystem faults: an unreadable
    /// file or a failed directory walk.
    pub fn build(self) -> Result<ModuleGraph, ScanError> {
        let excludes = cleaned_excludes(&self.excludes);

        // Phase 1: enumerate units across all roots, before any resolution,
        // so the resolver probes against the complete unit set.
        let mut rel_by_path: BTreeMap<PathBuf, String> = BTreeMap::new();
        for root in &self.roots {
            if !root.is_dir() {
                warn!("root {} does not exist, skipping", root.display());
                continue;
            }
            for path in discover(root, &excludes)? {
                let rel = relative_display(&path, root);
                if let Some(previous) = rel_by_path.insert(path.clone(), rel) {
                    debug!(
                        "{} already discovered as '{previous}', keeping first",
                        path.display()
                    );
                }
            }
        }

        info!("discovered {} units", rel_by_path.len());

        let source_roots = if self.source_roots.is_empty() {
            self.roots.iter().map(|r| normalize(r)).collect()
        } else {
            self.source_roots.iter().map(|r| normalize(r)).collect()
        };
        let unit_set: BTreeSet<PathBuf> = rel_by_path.keys().cloned().collect();
        let resolver = Resolver::new(unit_set, source_roots);

        // Phase 2: extract and resolve per unit. BTreeMap iteration fixes
        // the order regardless of how discovery interleaved the roots.
        let mut graph = ModuleGraph::new();
        for rel in rel_by_path.values() {
            graph.add_unit(rel.clone());
        }

        for (path, rel) in &rel_by_path {
            let text = std::fs::read_to_string(path).map_err(|e| ScanError::Io {
                path: path.clone(),
                source: e,
            })?;

            for reference in extract_references(&text) {
                if is_builtin(&reference.specifier) {
                    graph.add_external(ExternalRef {
                        source: rel.clone(),
                        specifier: reference.specifier,
                        line: reference.line,
                    });
                    continue;
                }
                match resolver.resolve(&reference.specifier, path) {
                    Resolution::Internal(target_path) => {
                        let Some(target) = rel_by_path.get(&target_path) else {
                            continue;
                        };
                        graph.add_edge(Edge {
                            source: rel.clone(),
                            target: target.clone(),
                            kind: reference.kind,
                            line: reference.line,
                            column: reference.column,
                        })?;
                    }
                    Resolution::External => {
                        graph.add_external(ExternalRef {
                            source: rel.clone(),
                            specifier: reference.specifier,
                            line: reference.line,
                        });
                    }
                    Resolution::Unresolved => {
                        debug!(
                            "unresolved reference '{}' in {rel}:{}",
                            reference.specifier, reference.line
                        );
                        graph.add_unresolved(UnresolvedRef {
                            source: rel.clone(),
                            specifier: reference.specifier,
                            line: reference.line,
                        });
                    }
                }
            }
        }

        graph.seal();
        info!(
            "graph assembled: {} units, {} edges, {} external, {} unresolved",
            graph.unit_count(),
            graph.edges().len(),
            graph.externals().len(),
            graph.unresolved().len()
        );
        Ok(graph)
    }
}

/// Walks one root, pruning excluded directories and skipping non-unit
/// files. Paths come back normalized.
fn discover(root: &Path, excludes: &[String]) -> Result<Vec<PathBuf>, ScanError> {
    let root_owned = root.to_path_buf();
    let excludes_owned = excludes.to_vec();

    let mut builder = ignore::WalkBuilder::new(root);
    builder.hidden(false).git_ignore(true);
    // Prune whole subtrees (vendor trees, build output) instead of
    // filtering files one by one.
    builder.filter_entry(move |entry| {
        if !entry.file_type().is_some_and(|t| t.is_dir()) {
            return true;
        }
        let rel = entry
            .path()
            .strip_prefix(&root_owned)
            .unwrap_or_else(|_| entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        !excludes_owned.iter().any(|pattern| rel.contains(pattern))
    });

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !is_unit_file(path, root, excludes) {
            continue;
        }
        files.push(normalize(path));
    }
    files.sort();
    Ok(files)
}

/// File-level eligibility: unit extension, not a declaration file, not a
/// test-named file, not excluded.
fn is_unit_file(path: &Path, root: &Path, excludes: &[String]) -> bool {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    if !UNIT_EXTENSIONS.contains(&extension) {
        return false;
    }

    let rel = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");

    // Declaration files validate statically and never exist at runtime.
    if rel.ends_with(".d.ts") || rel.ends_with(".d.mts") || rel.ends_with(".d.cts") {
        return false;
    }
    if SKIP_FILE_MARKERS.iter().any(|marker| rel.contains(marker)) {
        return false;
    }
    !excludes.iter().any(|pattern| rel.contains(pattern))
}

/// Root-relative display path with `/` separators.
fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(&normalize(root))
        .or_else(|_| path.strip_prefix(root))
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Strips `**` glob decoration down to the substring the walk matches on.
fn cleaned_excludes(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| p.replace("**/", "").replace("/**", "").replace("**", ""))
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleaned_excludes_strips_glob_decoration() {
        let cleaned = cleaned_excludes(&[
            "**/node_modules/**".to_owned(),
            "dist/".to_owned(),
            "**".to_owned(),
        ]);
        assert_eq!(cleaned, vec!["node_modules".to_owned(), "dist/".to_owned()]);
    }

    #[test]
    fn unit_file_filter() {
        let root = Path::new("src");
        assert!(is_unit_file(Path::new("src/a.ts"), root, &[]));
        assert!(is_unit_file(Path::new("src/b.mjs"), root, &[]));
        assert!(!is_unit_file(Path::new("src/readme.md"), root, &[]));
        assert!(!is_unit_file(Path::new("src/types.d.ts"), root, &[]));
        assert!(!is_unit_file(Path::new("src/a.test.ts"), root, &[]));
        assert!(!is_unit_file(Path::new("src/__tests__/a.ts"), root, &[]));
        assert!(!is_unit_file(
            Path::new("src/gen/a.ts"),
            root,
            &["gen/".to_owned()]
        ));
    }

    #[test]
    fn missing_root_is_skipped_not_fatal() {
        let graph = GraphBuilder::new()
            .root("definitely/not/a/real/root")
            .build()
            .expect("missing root degrades gracefully");
        assert_eq!(graph.unit_count(), 0);
    }
}
