//! Declarative boundary rules evaluated against the graph.
//!
//! Rule shapes are a closed set of tagged variants dispatched in one
//! place; adding a shape means adding a variant, not threading a new
//! predicate through the callers. Evaluation never short-circuits: every
//! rule sees the whole graph, and the returned set does not depend on
//! rule order.

use serde::Deserialize;
use tracing::debug;

use crate::graph::ModuleGraph;
use crate::types::{Severity, Violation};

/// Rule name used for the violations synthesized from detected cycles.
pub const CYCLE_RULE: &str = "dependency-cycle";

/// The built-in rule shapes.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RuleKind {
    /// Forbids edges from units under `source_prefix` to units under
    /// `target_prefix`.
    LayerIsolation {
        /// Path prefix of the restricted source layer.
        source_prefix: String,
        /// Path prefix of the forbidden target layer.
        target_prefix: String,
    },
    /// Requires every unit matching `unit_pattern` to have at least one
    /// edge or external reference whose target matches one of
    /// `required_any`. Reported per unit when absent.
    RequiredDependency {
        /// Substring selecting the units the rule applies to.
        unit_pattern: String,
        /// Substrings of which at least one must appear among the unit's
        /// edge targets or external specifiers.
        required_any: Vec<String>,
    },
    /// Forbids edges whose source matches `source_pattern` and whose
    /// target matches any of `forbidden_any`.
    ForbiddenDependency {
        /// Substring selecting the edges' source units.
        source_pattern: String,
        /// Substrings disallowed among matching units' edge targets.
        forbidden_any: Vec<String>,
    },
}

/// One configured boundary rule.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Rule {
    /// Rule name, carried into violations.
    pub name: String,
    /// Severity for violations of this rule.
    #[serde(default = "default_severity")]
    pub severity: Severity,
    /// Human-readable message, carried verbatim.
    #[serde(default)]
    pub message: String,
    /// Remediation hint, carried verbatim.
    #[serde(default)]
    pub suggestion: Option<String>,
    /// The rule's shape and parameters.
    #[serde(flatten)]
    pub kind: RuleKind,
}

fn default_severity() -> Severity {
    Severity::Blocking
}

/// Evaluates every rule against the whole graph and synthesizes one
/// blocking violation per detected cycle.
///
/// The result is sorted by (source, line, rule) so presentation order is
/// stable under any rule or discovery order.
#[must_use]
pub fn evaluate(graph: &ModuleGraph, rules: &[Rule], cycles: &[Vec<String>]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for rule in rules {
        let before = violations.len();
        check_rule(graph, rule, &mut violations);
        debug!(
            rule = rule.name.as_str(),
            violations = violations.len() - before,
            "rule evaluated"
        );
    }

    for cycle in cycles {
        let mut path = cycle.join(" -> ");
        if let Some(first) = cycle.first() {
            path.push_str(" -> ");
            path.push_str(first);
        }
        let mut violation = Violation::for_unit(
            CYCLE_RULE,
            Severity::Blocking,
            cycle.first().cloned().unwrap_or_default(),
            path,
        );
        violation.suggestion =
            Some("break the cycle by extracting the shared piece into its own module".to_owned());
        violations.push(violation);
    }

    violations.sort_by(|a, b| {
        (&a.source, a.line, &a.rule, &a.target).cmp(&(&b.source, b.line, &b.rule, &b.target))
    });
    violations
}

fn check_rule(graph: &ModuleGraph, rule: &Rule, violations: &mut Vec<Violation>) {
    match &rule.kind {
        RuleKind::LayerIsolation {
            source_prefix,
            target_prefix,
        } => {
            for edge in graph.edges() {
                if edge.source.starts_with(source_prefix.as_str())
                    && edge.target.starts_with(target_prefix.as_str())
                {
                    violations.push(apply_suggestion(
                        Violation::for_edge(
                            &rule.name,
                            rule.severity,
                            &edge.source,
                            &edge.target,
                            edge.line,
                            &rule.message,
                        ),
                        rule,
                    ));
                }
            }
        }
        RuleKind::RequiredDependency {
            unit_pattern,
            required_any,
        } => {
            for unit in graph.units() {
                if !unit.contains(unit_pattern.as_str()) {
                    continue;
                }
                let in_edges = graph
                    .edges()
                    .iter()
                    .any(|e| e.source == unit && required_any.iter().any(|r| e.target.contains(r)));
                let in_externals = graph.externals().iter().any(|x| {
                    x.source == unit && required_any.iter().any(|r| x.specifier.contains(r))
                });
                if !in_edges && !in_externals {
                    violations.push(apply_suggestion(
                        Violation::for_unit(&rule.name, rule.severity, unit, &rule.message),
                        rule,
                    ));
                }
            }
        }
        RuleKind::ForbiddenDependency {
            source_pattern,
            forbidden_any,
        } => {
            for edge in graph.edges() {
                if edge.source.contains(source_pattern.as_str())
                    && forbidden_any.iter().any(|f| edge.target.contains(f))
                {
                    violations.push(apply_suggestion(
                        Violation::for_edge(
                            &rule.name,
                            rule.severity,
                            &edge.source,
                            &edge.target,
                            edge.line,
                            &rule.message,
                        ),
                        rule,
                    ));
                }
            }
        }
    }
}

fn apply_suggestion(mut violation: Violation, rule: &Rule) -> Violation {
    violation.suggestion.clone_from(&rule.suggestion);
    violation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ReferenceKind;
    use crate::graph::{Edge, ExternalRef};

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

    fn layer_rule(source: &str, target: &str) -> Rule {
        Rule {
            name: "no-web-in-core".into(),
            severity: Severity::Blocking,
            message: "core must not depend on web".into(),
            suggestion: Some("invert the dependency".into()),
            kind: RuleKind::LayerIsolation {
                source_prefix: source.into(),
                target_prefix: target.into(),
            },
        }
    }

    #[test]
    fn layer_isolation_flags_crossing_edge() {
        let g = graph(
            &["core/a.ts", "web/b.ts"],
            &[("core/a.ts", "web/b.ts")],
        );
        let v = evaluate(&g, &[layer_rule("core/", "web/")], &[]);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].source, "core/a.ts");
        assert_eq!(v[0].target.as_deref(), Some("web/b.ts"));
        assert_eq!(v[0].severity, Severity::Blocking);
        assert_eq!(v[0].message, "core must not depend on web");
    }

    #[test]
    fn layer_isolation_ignores_reverse_direction() {
        let g = graph(
            &["core/a.ts", "web/b.ts"],
            &[("web/b.ts", "core/a.ts")],
        );
        assert!(evaluate(&g, &[layer_rule("core/", "web/")], &[]).is_empty());
    }

    #[test]
    fn required_dependency_reports_per_unit() {
        let mut g = ModuleGraph::new();
        g.add_unit("web/h1.ts");
        g.add_unit("web/h2.ts");
        g.add_external(ExternalRef {
            source: "web/h1.ts".into(),
            specifier: "pino".into(),
            line: 1,
        });
        g.seal();

        let rule = Rule {
            name: "handlers-log".into(),
            severity: Severity::Advisory,
            message: "handlers must import a logger".into(),
            suggestion: None,
            kind: RuleKind::RequiredDependency {
                unit_pattern: "web/".into(),
                required_any: vec!["pino".into(), "logger".into()],
            },
        };

        let v = evaluate(&g, &[rule], &[]);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].source, "web/h2.ts");
        assert!(v[0].target.is_none());
        assert!(v[0].line.is_none());
    }

    #[test]
    fn required_dependency_satisfied_by_internal_edge() {
        let g = graph(
            &["web/h.ts", "lib/logger.ts"],
            &[("web/h.ts", "lib/logger.ts")],
        );
        let rule = Rule {
            name: "handlers-log".into(),
            severity: Severity::Advisory,
            message: String::new(),
            suggestion: None,
            kind: RuleKind::RequiredDependency {
                unit_pattern: "web/".into(),
                required_any: vec!["logger".into()],
            },
        };
        assert!(evaluate(&g, &[rule], &[]).is_empty());
    }

    #[test]
    fn forbidden_dependency_matches_substring() {
        let g = graph(
            &["app/a.ts", "legacy/old.ts"],
            &[("app/a.ts", "legacy/old.ts")],
        );
        let rule = Rule {
            name: "no-legacy".into(),
            severity: Severity::Advisory,
            message: "legacy modules are frozen".into(),
            suggestion: None,
            kind: RuleKind::ForbiddenDependency {
                source_pattern: "app/".into(),
                forbidden_any: vec!["legacy/".into()],
            },
        };
        let v = evaluate(&g, &[rule], &[]);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].severity, Severity::Advisory);
    }

    #[test]
    fn cycle_violations_synthesized_as_blocking() {
        let g = graph(&["a.ts", "b.ts"], &[("a.ts", "b.ts"), ("b.ts", "a.ts")]);
        let cycles = vec![vec!["a.ts".to_owned(), "b.ts".to_owned()]];
        let v = evaluate(&g, &[], &cycles);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].rule, CYCLE_RULE);
        assert_eq!(v[0].severity, Severity::Blocking);
        assert_eq!(v[0].message, "a.ts -> b.ts -> a.ts");
    }

    #[test]
    fn all_rules_evaluated_no_short_circuit() {
        let g = graph(
            &["core/a.ts", "web/b.ts"],
            &[("core/a.ts", "web/b.ts")],
        );
        let forbid = Rule {
            name: "no-web-substring".into(),
            severity: Severity::Advisory,
            message: String::new(),
            suggestion: None,
            kind: RuleKind::ForbiddenDependency {
                source_pattern: "core/".into(),
                forbidden_any: vec!["web/".into()],
            },
        };
        let v = evaluate(&g, &[layer_rule("core/", "web/"), forbid], &[]);
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn violations_sorted_by_source_then_line() {
        let g = graph(
            &["core/a.ts", "core/b.ts", "web/x.ts"],
            &[("core/b.ts", "web/x.ts"), ("core/a.ts", "web/x.ts")],
        );
        let v = evaluate(&g, &[layer_rule("core/", "web/")], &[]);
        assert_eq!(v[0].source, "core/a.ts");
        assert_eq!(v[1].source, "core/b.ts");
    }
}
