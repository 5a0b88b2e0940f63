//! The module dependency graph: units, resolved edges, and degree
//! statistics.
//!
//! Node identity is the unit's normalized relative path with `/`
//! separators, so graphs built from the same tree compare equal regardless
//! of discovery order.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;

use crate::extract::ReferenceKind;

/// Errors raised by graph construction.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An edge endpoint is not a known unit.
    #[error("edge endpoint '{0}' is not a known unit")]
    UnknownEndpoint(String),
}

/// A reference that resolved to another in-tree unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    /// Referencing unit (relative path).
    pub source: String,
    /// Referenced unit (relative path).
    pub target: String,
    /// Shape of the originating reference.
    pub kind: ReferenceKind,
    /// Line of the originating reference (1-indexed).
    pub line: usize,
    /// Column of the originating reference (1-indexed).
    pub column: usize,
}

/// A reference that resolved outside the scanned tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalRef {
    /// Referencing unit (relative path).
    pub source: String,
    /// Specifier as written.
    pub specifier: String,
    /// Line of the reference (1-indexed).
    pub line: usize,
}

/// A reference that matched no in-tree unit and no external pattern.
/// Retained for statistics only; never an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedRef {
    /// Referencing unit (relative path).
    pub source: String,
    /// Specifier as written.
    pub specifier: String,
    /// Line of the reference (1-indexed).
    pub line: usize,
}

/// The assembled dependency graph for one scan.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    units: BTreeSet<String>,
    edges: Vec<Edge>,
    externals: Vec<ExternalRef>,
    unresolved: Vec<UnresolvedRef>,
}

impl ModuleGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a unit. Idempotent.
    pub fn add_unit(&mut self, path: impl Into<String>) {
        self.units.insert(path.into());
    }

    /// Adds a resolved edge. Both endpoints must already be units.
    ///
    /// Self-edges are legal and retained; the cycle detector skips them.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownEndpoint`] if either endpoint was never
    /// registered with [`ModuleGraph::add_unit`].
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if !self.units.contains(&edge.source) {
            return Err(GraphError::UnknownEndpoint(edge.source));
        }
        if !self.units.contains(&edge.target) {
            return Err(GraphError::UnknownEndpoint(edge.target));
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Records an external reference (statistics only).
    pub fn add_external(&mut self, external: ExternalRef) {
        self.externals.push(external);
    }

    /// Records an unresolved reference (statistics only).
    pub fn add_unresolved(&mut self, unresolved: UnresolvedRef) {
        self.unresolved.push(unresolved);
    }

    /// Sorts edge and reference lists into their canonical order.
    ///
    /// Called once by the builder after assembly so that graphs built in
    /// any discovery order emit identical results.
    pub fn seal(&mut self) {
        self.edges.sort_by(|a, b| {
            (&a.source, a.line, a.column, &a.target).cmp(&(&b.source, b.line, b.column, &b.target))
        });
        self.edges.dedup();
        self.externals
            .sort_by(|a, b| (&a.source, a.line, &a.specifier).cmp(&(&b.source, b.line, &b.specifier)));
        self.unresolved
            .sort_by(|a, b| (&a.source, a.line, &a.specifier).cmp(&(&b.source, b.line, &b.specifier)));
    }

    /// Unit paths in sorted order.
    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(String::as_str)
    }

    /// Number of units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Resolved edges in canonical order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// External references in canonical order.
    #[must_use]
    pub fn externals(&self) -> &[ExternalRef] {
        &self.externals
    }

    /// Unresolved references in canonical order.
    #[must_use]
    pub fn unresolved(&self) -> &[UnresolvedRef] {
        &self.unresolved
    }

    /// Adjacency lists over resolved edges, targets sorted and deduplicated.
    #[must_use]
    pub fn adjacency(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut adjacency: BTreeMap<&str, Vec<&str>> =
            self.units.iter().map(|u| (u.as_str(), Vec::new())).collect();
        for edge in &self.edges {
            if let Some(targets) = adjacency.get_mut(edge.source.as_str()) {
                targets.push(edge.target.as_str());
            }
        }
        for targets in adjacency.values_mut() {
            targets.sort_unstable();
            targets.dedup();
        }
        adjacency
    }

    /// Out-degree per unit (distinct targets).
    #[must_use]
    pub fn out_degrees(&self) -> BTreeMap<&str, usize> {
        self.adjacency()
            .into_iter()
            .map(|(unit, targets)| (unit, targets.len()))
            .collect()
    }

    /// In-degree per unit (distinct sources).
    #[must_use]
    pub fn in_degrees(&self) -> BTreeMap<&str, usize> {
        let mut sources: BTreeMap<&str, BTreeSet<&str>> =
            self.units.iter().map(|u| (u.as_str(), BTreeSet::new())).collect();
        for edge in &self.edges {
            if let Some(set) = sources.get_mut(edge.target.as_str()) {
                set.insert(edge.source.as_str());
            }
        }
        sources
            .into_iter()
            .map(|(unit, set)| (unit, set.len()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: &str, target: &str, line: usize) -> Edge {
        Edge {
            source: source.into(),
            target: target.into(),
            kind: ReferenceKind::Static,
            line,
            column: 1,
        }
    }

    fn graph(units: &[&str], edges: &[(&str, &str)]) -> ModuleGraph {
        let mut g = ModuleGraph::new();
        for u in units {
            g.add_unit(*u);
        }
        for (i, (s, t)) in edges.iter().enumerate() {
            g.add_edge(edge(s, t, i + 1)).expect("test edge endpoints exist");
        }
        g.seal();
        g
    }

    #[test]
    fn rejects_edge_to_unknown_unit() {
        let mut g = ModuleGraph::new();
        g.add_unit("a.ts");
        let err = g.add_edge(edge("a.ts", "ghost.ts", 1)).unwrap_err();
        assert!(err.to_string().contains("ghost.ts"));
    }

    #[test]
    fn self_edge_is_retained() {
        let g = graph(&["a.ts"], &[("a.ts", "a.ts")]);
        assert_eq!(g.edges().len(), 1);
    }

    #[test]
    fn seal_orders_edges_canonically() {
        let mut g = ModuleGraph::new();
        g.add_unit("b.ts");
        g.add_unit("a.ts");
        g.add_edge(edge("b.ts", "a.ts", 3)).expect("endpoints exist");
        g.add_edge(edge("a.ts", "b.ts", 1)).expect("endpoints exist");
        g.seal();
        assert_eq!(g.edges()[0].source, "a.ts");
    }

    #[test]
    fn adjacency_dedups_parallel_edges() {
        let g = graph(&["a.ts", "b.ts"], &[("a.ts", "b.ts"), ("a.ts", "b.ts")]);
        assert_eq!(g.adjacency()["a.ts"], vec!["b.ts"]);
    }

    #[test]
    fn degree_counts() {
        let g = graph(
            &["a.ts", "b.ts", "c.ts"],
            &[("a.ts", "b.ts"), ("a.ts", "c.ts"), ("b.ts", "c.ts")],
        );
        assert_eq!(g.out_degrees()["a.ts"], 2);
        assert_eq!(g.out_degrees()["c.ts"], 0);
        assert_eq!(g.in_degrees()["c.ts"], 2);
        assert_eq!(g.in_degrees()["a.ts"], 0);
    }
}
