//! Aggregation of graph, cycles, and violations into the structured
//! result and its plain-text rendering.
//!
//! The structured fields are the stable external contract. Everything is
//! reconstructable from the same inputs; `generated_at` is the only
//! wall-clock-dependent field and is excluded from any determinism
//! comparison.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::graph::ModuleGraph;
use crate::types::{Severity, Violation};

/// Violations shown per rule group in the text rendering.
const GROUP_DISPLAY_LIMIT: usize = 10;

/// Aggregate counts for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Units in the graph.
    pub total_units: usize,
    /// Resolved plus external edges.
    pub total_edges: usize,
    /// References resolved to platform built-ins or packages.
    pub external_edges: usize,
    /// References resolved to in-tree units.
    pub internal_edges: usize,
    /// References that matched nothing; never edges.
    pub unresolved_references: usize,
    /// Violations across all rules, cycles included.
    pub violations_found: usize,
    /// Distinct dependency cycles.
    pub cycles_found: usize,
}

/// Degree statistics over the resolved-edge graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    /// Node count.
    pub nodes: usize,
    /// Resolved edge count.
    pub edges: usize,
    /// Mean distinct out-degree.
    pub avg_out_degree: f64,
    /// Largest distinct out-degree.
    pub max_out_degree: usize,
    /// Unit holding the largest out-degree (first alphabetically on ties).
    pub max_out_degree_unit: Option<String>,
    /// Units with zero in- and out-degree.
    pub disconnected_units: Vec<String>,
}

/// The structured result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Generation timestamp; the one non-deterministic field.
    pub generated_at: DateTime<Utc>,
    /// Aggregate counts.
    pub summary: Summary,
    /// Degree statistics.
    pub graph_stats: GraphStats,
    /// All violations in canonical order.
    pub violations: Vec<Violation>,
    /// All cycles, each an ordered unit-path sequence.
    pub cycles: Vec<Vec<String>>,
    /// Deduplicated remediation hints.
    pub recommended_fixes: Vec<String>,
}

impl Report {
    /// Assembles the report from a sealed graph, its cycles, and its
    /// violations.
    #[must_use]
    pub fn new(graph: &ModuleGraph, cycles: Vec<Vec<String>>, violations: Vec<Violation>) -> Self {
        let internal_edges = graph.edges().len();
        let external_edges = graph.externals().len();

        let out_degrees = graph.out_degrees();
        let in_degrees = graph.in_degrees();

        let max = out_degrees
            .iter()
            .max_by(|(unit_a, deg_a), (unit_b, deg_b)| {
                deg_a.cmp(deg_b).then(unit_b.cmp(unit_a))
            })
            .filter(|(_, degree)| **degree > 0);

        let nodes = graph.unit_count();
        #[allow(clippy::cast_precision_loss)]
        let avg_out_degree = if nodes == 0 {
            0.0
        } else {
            let total: usize = out_degrees.values().sum();
            round2(total as f64 / nodes as f64)
        };

        let disconnected_units: Vec<String> = graph
            .units()
            .filter(|unit| {
                out_degrees.get(unit).copied().unwrap_or(0) == 0
                    && in_degrees.get(unit).copied().unwrap_or(0) == 0
            })
            .map(ToOwned::to_owned)
            .collect();

        let recommended_fixes = recommended_fixes(&violations);

        Self {
            generated_at: Utc::now(),
            summary: Summary {
                total_units: nodes,
                total_edges: internal_edges + external_edges,
                external_edges,
                internal_edges,
                unresolved_references: graph.unresolved().len(),
                violations_found: violations.len(),
                cycles_found: cycles.len(),
            },
            graph_stats: GraphStats {
                nodes,
                edges: internal_edges,
                avg_out_degree,
                max_out_degree: max.map_or(0, |(_, degree)| *degree),
                max_out_degree_unit: max.map(|(unit, _)| (*unit).to_owned()),
                disconnected_units,
            },
            violations,
            cycles,
            recommended_fixes,
        }
    }

    /// True when any blocking-severity violation exists. Cycles always
    /// synthesize blocking violations, so cycles imply true.
    #[must_use]
    pub fn has_blocking(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Blocking)
    }

    /// Plain-text rendering: counts, per-rule violation groups (capped),
    /// per-cycle arrow-joined paths, and a closing pass/fail line.
    ///
    /// Presentation only; carries no information beyond the structured
    /// fields.
    #[must_use]
    pub fn render_text(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "module dependency check");
        let _ = writeln!(
            out,
            "  units: {}  edges: {} ({} internal, {} external)  unresolved: {}",
            self.summary.total_units,
            self.summary.total_edges,
            self.summary.internal_edges,
            self.summary.external_edges,
            self.summary.unresolved_references,
        );
        let _ = writeln!(
            out,
            "  avg out-degree: {:.2}  max out-degree: {}{}",
            self.graph_stats.avg_out_degree,
            self.graph_stats.max_out_degree,
            self.graph_stats
                .max_out_degree_unit
                .as_deref()
                .map(|u| format!(" ({u})"))
                .unwrap_or_default(),
        );
        if !self.graph_stats.disconnected_units.is_empty() {
            let _ = writeln!(
                out,
                "  disconnected units: {}",
                self.graph_stats.disconnected_units.len()
            );
        }

        let mut groups: BTreeMap<&str, Vec<&Violation>> = BTreeMap::new();
        for violation in &self.violations {
            groups.entry(violation.rule.as_str()).or_default().push(violation);
        }

        for (rule, group) in &groups {
            let _ = writeln!(out, "\n[{rule}] {} violation(s)", group.len());
            for violation in group.iter().take(GROUP_DISPLAY_LIMIT) {
                let _ = writeln!(out, "  {violation}");
                if let Some(suggestion) = &violation.suggestion {
                    let _ = writeln!(out, "    = help: {suggestion}");
                }
            }
            if group.len() > GROUP_DISPLAY_LIMIT {
                let _ = writeln!(out, "  ... and {} more", group.len() - GROUP_DISPLAY_LIMIT);
            }
        }

        if !self.cycles.is_empty() {
            let _ = writeln!(out, "\ndependency cycles: {}", self.cycles.len());
            for (index, cycle) in self.cycles.iter().enumerate() {
                let mut path = cycle.join(" -> ");
                if let Some(first) = cycle.first() {
                    path.push_str(" -> ");
                    path.push_str(first);
                }
                let _ = writeln!(out, "  cycle {}: {path}", index + 1);
            }
        }

        if !self.recommended_fixes.is_empty() {
            let _ = writeln!(out, "\nrecommended fixes:");
            for fix in &self.recommended_fixes {
                let _ = writeln!(out, "  - {fix}");
            }
        }

        let blocking = self
            .violations
            .iter()
            .filter(|v| v.severity == Severity::Blocking)
            .count();
        let advisory = self.violations.len() - blocking;
        let verdict = if blocking == 0 { "PASS" } else { "FAIL" };
        let _ = writeln!(
            out,
            "\n{verdict}: {blocking} blocking, {advisory} advisory violation(s), {} cycle(s)",
            self.summary.cycles_found
        );
        out
    }
}

/// One deduplicated hint per violated rule, in violation order.
fn recommended_fixes(violations: &[Violation]) -> Vec<String> {
    let mut fixes = Vec::new();
    for violation in violations {
        if let Some(suggestion) = &violation.suggestion {
            let fix = format!("{}: {suggestion}", violation.rule);
            if !fixes.contains(&fix) {
                fixes.push(fix);
            }
        }
    }
    fixes
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ReferenceKind;
    use crate::graph::{Edge, ExternalRef, UnresolvedRef};

    fn graph(units: &[&str], edges: &[(&str, &str)]) -> ModuleGraph {
        let mut g = ModuleGraph::new();
        for u in units {
            g.add_unit(*u);
        }
        for (i, (s, t)) in edges.iter().enumerate() {
            g.add_edge(Edge {
                source: (*s).into(),
                target: (*t).into(),
                kind: ReferenceKind::Static,
                line: i + 1,
                column: 1,
            })
            .expect("test edge endpoints exist");
        }
        g.seal();
        g
    }

    #[test]
    fn summary_counts_internal_external_unresolved() {
        let mut g = graph(&["a.ts", "b.ts"], &[("a.ts", "b.ts")]);
        g.add_external(ExternalRef {
            source: "a.ts".into(),
            specifier: "fs".into(),
            line: 1,
        });
        g.add_unresolved(UnresolvedRef {
            source: "a.ts".into(),
            specifier: "./ghost".into(),
            line: 2,
        });
        g.seal();

        let report = Report::new(&g, vec![], vec![]);
        assert_eq!(report.summary.internal_edges, 1);
        assert_eq!(report.summary.external_edges, 1);
        assert_eq!(report.summary.total_edges, 2);
        assert_eq!(report.summary.unresolved_references, 1);
    }

    #[test]
    fn stats_pick_max_out_degree_unit() {
        let g = graph(
            &["a.ts", "b.ts", "c.ts"],
            &[("a.ts", "b.ts"), ("a.ts", "c.ts"), ("b.ts", "c.ts")],
        );
        let report = Report::new(&g, vec![], vec![]);
        assert_eq!(report.graph_stats.max_out_degree, 2);
        assert_eq!(report.graph_stats.max_out_degree_unit.as_deref(), Some("a.ts"));
        assert!((report.graph_stats.avg_out_degree - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn disconnected_units_listed() {
        let g = graph(&["a.ts", "b.ts", "lone.ts"], &[("a.ts", "b.ts")]);
        let report = Report::new(&g, vec![], vec![]);
        assert_eq!(report.graph_stats.disconnected_units, vec!["lone.ts".to_owned()]);
    }

    #[test]
    fn empty_graph_has_zero_stats() {
        let g = ModuleGraph::new();
        let report = Report::new(&g, vec![], vec![]);
        assert_eq!(report.graph_stats.nodes, 0);
        assert!((report.graph_stats.avg_out_degree - 0.0).abs() < f64::EPSILON);
        assert!(report.graph_stats.max_out_degree_unit.is_none());
        assert!(!report.has_blocking());
    }

    #[test]
    fn blocking_violation_flips_verdict() {
        let g = graph(&["a.ts"], &[]);
        let violation = Violation::for_unit("r", Severity::Blocking, "a.ts", "bad");
        let report = Report::new(&g, vec![], vec![violation]);
        assert!(report.has_blocking());
        assert!(report.render_text().contains("FAIL"));
    }

    #[test]
    fn advisory_only_passes() {
        let g = graph(&["a.ts"], &[]);
        let violation = Violation::for_unit("r", Severity::Advisory, "a.ts", "meh");
        let report = Report::new(&g, vec![], vec![violation]);
        assert!(!report.has_blocking());
        assert!(report.render_text().contains("PASS"));
    }

    #[test]
    fn text_groups_by_rule_and_caps_display() {
        let g = graph(&["a.ts"], &[]);
        let violations: Vec<Violation> = (0..15)
            .map(|i| Violation::for_unit("big-rule", Severity::Advisory, format!("u{i}.ts"), "m"))
            .collect();
        let report = Report::new(&g, vec![], violations);
        let text = report.render_text();
        assert!(text.contains("[big-rule] 15 violation(s)"));
        assert!(text.contains("... and 5 more"));
    }

    #[test]
    fn text_renders_cycle_paths() {
        let g = graph(&["a.ts", "b.ts"], &[]);
        let cycles = vec![vec!["a.ts".to_owned(), "b.ts".to_owned()]];
        let report = Report::new(&g, cycles, vec![]);
        assert!(report
            .render_text()
            .contains("cycle 1: a.ts -> b.ts -> a.ts"));
    }

    #[test]
    fn recommended_fixes_dedup_per_rule() {
        let g = graph(&["a.ts"], &[]);
        let v1 = Violation::for_unit("r", Severity::Advisory, "a.ts", "m")
            .with_suggestion("do the thing");
        let v2 = Violation::for_unit("r", Severity::Advisory, "b.ts", "m")
            .with_suggestion("do the thing");
        let report = Report::new(&g, vec![], vec![v1, v2]);
        assert_eq!(report.recommended_fixes.len(), 1);
    }

    #[test]
    fn structured_result_serializes() {
        let g = graph(&["a.ts", "b.ts"], &[("a.ts", "b.ts")]);
        let report = Report::new(&g, vec![], vec![]);
        let json = serde_json::to_value(&report).expect("report serializes");
        assert!(json.get("generated_at").is_some());
        assert!(json.get("summary").is_some());
        assert!(json.get("graph_stats").is_some());
        assert!(json.get("recommended_fixes").is_some());
    }
}
