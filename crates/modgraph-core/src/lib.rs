//! # modgraph-core
//!
//! Module dependency-graph checking for ECMAScript/TypeScript trees.
//!
//! The library scans one or more source roots, reconstructs the directed
//! graph of inter-module references, detects dependency cycles, and
//! validates declarative boundary rules. It provides:
//!
//! - [`GraphBuilder`] for tree traversal and graph assembly
//! - [`find_cycles`] for elementary-cycle detection
//! - [`rules::evaluate`] for boundary-rule validation
//! - [`Report`] for the structured result and text rendering
//!
//! ## Example
//!
//! ```ignore
//! use modgraph_core::{find_cycles, rules, GraphBuilder, Report};
//!
//! let graph = GraphBuilder::new().root("./src").build()?;
//! let cycles = find_cycles(&graph);
//! let violations = rules::evaluate(&graph, &config.rules, &cycles);
//! let report = Report::new(&graph, cycles, violations);
//! println!("{}", report.render_text());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod cycles;
mod graph;
mod report;
mod types;

/// Reference extraction from module source text.
pub mod extract;
/// Specifier resolution against the known unit set.
pub mod resolve;
/// Declarative boundary rules.
pub mod rules;

pub use builder::{GraphBuilder, ScanError};
pub use config::{Config, ConfigError, ScanConfig, DEFAULT_EXCLUDES};
pub use cycles::find_cycles;
pub use graph::{Edge, ExternalRef, GraphError, ModuleGraph, UnresolvedRef};
pub use report::{GraphStats, Report, Summary};
pub use types::{Severity, Violation};
