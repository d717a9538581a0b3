//! CSV reporter
//!
//! Emits the sweep table alone, one row per candidate threshold, for
//! spreadsheets and downstream charting. Percentages with a zero
//! denominator come out as empty cells.

use crate::engine::AnalysisReport;
use anyhow::{Context, Result};

/// Render the sweep table as CSV
pub fn render(report: &AnalysisReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in &report.rows {
        writer.serialize(row).context("serializing sweep row")?;
    }
    let bytes = writer.into_inner().context("flushing CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}
