//! Core types for boundary violations.

use serde::{Deserialize, Serialize};

/// Severity level for a boundary violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported but never affects exit status.
    Advisory,
    /// Fails the run when present.
    Blocking,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Advisory => write!(f, "advisory"),
            Self::Blocking => write!(f, "blocking"),
        }
    }
}

/// One rule failure for one edge or unit.
///
/// Violations are produced fresh on every run and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Name of the rule that failed.
    pub rule: String,
    /// Severity declared by the rule.
    pub severity: Severity,
    /// Human-readable message, carried verbatim from the rule.
    pub message: String,
    /// Offending unit (edge source, or the unit itself for per-unit rules).
    pub source: String,
    /// Edge target, when the violation derives from an edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Source line of the offending reference, when edge-derived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Remediation hint, carried verbatim from the rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Violation {
    /// Creates a violation for a unit, with no edge position.
    #[must_use]
    pub fn for_unit(
        rule: impl Into<String>,
        severity: Severity,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            severity,
            message: message.into(),
            source: source.into(),
            target: None,
            line: None,
            suggestion: None,
        }
    }

    /// Creates a violation for an edge.
    #[must_use]
    pub fn for_edge(
        rule: impl Into<String>,
        severity: Severity,
        source: impl Into<String>,
        target: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            severity,
            message: message.into(),
            source: source.into(),
            target: Some(target.into()),
            line: Some(line),
            suggestion: None,
        }
    }

    /// Attaches a remediation hint.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        write!(f, ": {} [{}] {}", self.severity, self.rule, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_blocking_above_advisory() {
        assert!(Severity::Blocking > Severity::Advisory);
    }

    #[test]
    fn edge_violation_display_includes_line() {
        let v = Violation::for_edge(
            "no-web-in-core",
            Severity::Blocking,
            "core/a.ts",
            "web/b.ts",
            7,
            "core must not depend on web",
        );
        let s = format!("{v}");
        assert!(s.contains("core/a.ts:7"));
        assert!(s.contains("[no-web-in-core]"));
    }

    #[test]
    fn unit_violation_display_omits_line() {
        let v = Violation::for_unit(
            "handlers-need-logging",
            Severity::Advisory,
            "web/handler.ts",
            "missing required import",
        );
        assert!(!format!("{v}").contains("web/handler.ts:0"));
    }
}
