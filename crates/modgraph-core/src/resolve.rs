//! Specifier resolution against the known unit set.
//!
//! Resolution is purely lexical: candidates are probed against the set of
//! units discovered by the builder, never against the filesystem, so a
//! resolver built from the same unit set always answers the same way.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use crate::extract::is_builtin;

/// Extension candidates probed for a specifier, in order. The empty suffix
/// covers specifiers written with an explicit extension.
const SUFFIXES: &[&str] = &["", ".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"];

/// Directory-index candidates probed after the suffix list.
const INDEX_FILES: &[&str] = &[
    "index.ts",
    "index.tsx",
    "index.js",
    "index.jsx",
    "index.mjs",
    "index.cjs",
];

/// Outcome of resolving one specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The specifier maps to another unit in the scanned tree.
    Internal(PathBuf),
    /// Platform built-in or out-of-tree package.
    External,
    /// Relative or absolute specifier that matched no known unit.
    Unresolved,
}

/// Maps raw specifiers to in-tree units.
pub struct Resolver {
    units: BTreeSet<PathBuf>,
    source_roots: Vec<PathBuf>,
}

impl Resolver {
    /// Builds a resolver over the known unit set.
    ///
    /// `source_roots` are tried in order for bare specifiers, supporting
    /// path-alias style trees (`config/env` resolving under `src/`).
    #[must_use]
    pub fn new(units: BTreeSet<PathBuf>, source_roots: Vec<PathBuf>) -> Self {
        Self {
            units,
            source_roots,
        }
    }

    /// Resolves one specifier written inside the unit at `from`.
    ///
    /// Never fails: a miss is ordinary input, classified [`Resolution::External`]
    /// for bare specifiers and [`Resolution::Unresolved`] for path specifiers.
    #[must_use]
    pub fn resolve(&self, specifier: &str, from: &Path) -> Resolution {
        if is_builtin(specifier) {
            return Resolution::External;
        }

        if specifier.starts_with('.') {
            let base = from.parent().unwrap_or_else(|| Path::new(""));
            let candidate = normalize(&base.join(specifier));
            return match self.probe(&candidate) {
                Some(path) => Resolution::Internal(path),
                None => Resolution::Unresolved,
            };
        }

        if specifier.starts_with('/') {
            let candidate = normalize(Path::new(specifier));
            return match self.probe(&candidate) {
                Some(path) => Resolution::Internal(path),
                None => Resolution::Unresolved,
            };
        }

        // Bare specifier: try each source root (path-alias trees), then
        // fall back to external (assumed package dependency).
        for root in &self.source_roots {
            let candidate = normalize(&root.join(specifier));
            if let Some(path) = self.probe(&candidate) {
                return Resolution::Internal(path);
            }
        }
        Resolution::External
    }

    /// Probes suffix and directory-index candidates, returning the first
    /// that exists among the known units.
    fn probe(&self, candidate: &Path) -> Option<PathBuf> {
        for suffix in SUFFIXES {
            let probed = append_suffix(candidate, suffix);
            if self.units.contains(&probed) {
                return Some(probed);
            }
        }
        for index in INDEX_FILES {
            let probed = candidate.join(index);
            if self.units.contains(&probed) {
                return Some(probed);
            }
        }
        None
    }
}

/// Appends a literal suffix (not an extension swap: `./a.service` + `.ts`
/// must yield `a.service.ts`).
fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    if suffix.is_empty() {
        return path.to_path_buf();
    }
    let mut os = path.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}

/// Lexically normalizes a path, resolving `.` and `..` components without
/// touching the filesystem.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(parts.last(), Some(Component::Normal(_))) {
                    parts.pop();
                } else if !matches!(parts.last(), Some(Component::RootDir | Component::Prefix(_))) {
                    // Leading `..` segments have nothing to cancel against.
                    parts.push(component);
                }
            }
            other => parts.push(other),
        }
    }
    parts.iter().map(|c| c.as_os_str()).collect()
}
