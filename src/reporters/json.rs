//! JSON reporter
//!
//! Outputs the full AnalysisReport as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use crate::engine::{AnalysisReport, InspectReport};
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render an interactive lookup as JSON
pub fn render_inspect(report: &InspectReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_json_render_valid() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert!(parsed["funnel"]["total_records"].is_u64());
        assert!(!parsed["rows"].as_array().expect("rows array").is_empty());
    }

    #[test]
    fn test_json_null_percentages() {
        let mut report = test_report();
        // Force a degenerate row: no problematic cases at all.
        for row in &mut report.rows {
            row.problematic_cases = 0;
            row.solved_percent = None;
        }
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert!(parsed["rows"][0]["solved_percent"].is_null());
    }
}
