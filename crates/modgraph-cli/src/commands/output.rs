//! Shared output formatting for check results.

use anyhow::Result;
use modgraph_core::Report;

use crate::OutputFormat;

/// Prints the report in the selected format.
pub fn print(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Compact => {
            for violation in &report.violations {
                println!("{violation}");
            }
        }
    }
    Ok(())
}
