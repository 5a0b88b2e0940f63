//! Regex-based reference extraction from module source text.
//!
//! The extractor is a best-effort text scanner, not a parser: a reference
//! keyword inside a string literal or comment can produce a spurious match.
//! This is an accepted limitation for architectural auditing; references
//! that match no known shape are simply not extracted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a reference is introduced in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    /// `import X from "m"`, `export { X } from "m"`, `require("m")`.
    Static,
    /// `import("m")`, evaluated at some later point.
    Dynamic,
    /// `import "m"`, loaded only for its effects.
    SideEffect,
    /// `import type X from "m"`, erased before runtime.
    TypeOnly,
}

/// One raw dependency mention found in a unit's text, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReference {
    /// Target path-string exactly as written.
    pub specifier: String,
    /// Shape of the introducing statement.
    pub kind: ReferenceKind,
    /// Line of the introducing token (1-indexed).
    pub line: usize,
    /// Column of the introducing token (1-indexed).
    pub column: usize,
}

/// Platform module names that are external by definition and never probed.
const PLATFORM_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Compiles a reference pattern known to be valid at build time.
#[allow(clippy::expect_used)]
fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("reference pattern is a compile-time constant")
}

static TYPE_ONLY: Lazy<Regex> =
    Lazy::new(|| pattern(r#"import\s+type\s[^'"();]*?from\s*['"]([^'"]+)['"]"#));

static STATIC_IMPORT: Lazy<Regex> =
    Lazy::new(|| pattern(r#"import\s+[^'"();]*?from\s*['"]([^'"]+)['"]"#));

static REEXPORT: Lazy<Regex> =
    Lazy::new(|| pattern(r#"export\s+[^'"();]*?from\s*['"]([^'"]+)['"]"#));

static SIDE_EFFECT: Lazy<Regex> = Lazy::new(|| pattern(r#"import\s*['"]([^'"]+)['"]"#));

static DYNAMIC: Lazy<Regex> =
    Lazy::new(|| pattern(r#"import\s*\(\s*['"]([^'"]+)['"]\s*\)"#));

static REQUIRE: Lazy<Regex> =
    Lazy::new(|| pattern(r#"\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#));

/// Returns true for platform built-in specifiers (`fs`, `node:fs`,
/// `fs/promises`). These are marked external without any path probing.
#[must_use]
pub fn is_builtin(specifier: &str) -> bool {
    let name = specifier.strip_prefix("node:").unwrap_or(specifier);
    let base = name.split('/').next().unwrap_or(name);
    specifier.starts_with("node:") || PLATFORM_BUILTINS.contains(&base)
}

/// Extracts every recognized reference from a unit's text, ordered by
/// source position.
///
/// Two passes over identical text yield identical positions: line/column
/// derive from counting newline characters up to the match offset, nothing
/// else. Duplicate references to the same specifier from the same line
/// collapse to one record.
#[must_use]
pub fn extract_references(source: &str) -> Vec<RawReference> {
    // Precedence matters only where two shapes share a start offset:
    // `import type ... from` also matches the plain static pattern.
    let passes: &[(&Regex, ReferenceKind)] = &[
        (&TYPE_ONLY, ReferenceKind::TypeOnly),
        (&STATIC_IMPORT, ReferenceKind::Static),
        (&REEXPORT, ReferenceKind::Static),
        (&SIDE_EFFECT, ReferenceKind::SideEffect),
        (&DYNAMIC, ReferenceKind::Dynamic),
        (&REQUIRE, ReferenceKind::Static),
    ];

    let mut claimed_offsets: HashSet<usize> = HashSet::new();
    let mut candidates: Vec<(usize, RawReference)> = Vec::new();

    for (pattern, kind) in passes {
        for caps in pattern.captures_iter(source) {
            let whole = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            if !claimed_offsets.insert(whole.start()) {
                continue;
            }
            let specifier = match caps.get(1) {
                Some(m) => m.as_str().to_owned(),
                None => continue,
            };
            let (line, column) = position_at(source, whole.start());
            candidates.push((
                whole.start(),
                RawReference {
                    specifier,
                    kind: *kind,
                    line,
                    column,
                },
            ));
        }
    }

    candidates.sort_by_key(|(offset, _)| *offset);

    let mut seen: HashSet<(usize, String)> = HashSet::new();
    let mut references = Vec::new();
    for (_, reference) in candidates {
        if seen.insert((reference.line, reference.specifier.clone())) {
            references.push(reference);
        }
    }
    references
}

/// Computes (line, column), both 1-indexed, for a byte offset.
fn position_at(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, offset - line_start + 1)
}
