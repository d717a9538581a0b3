//! Output reporters for Turnaround analysis results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON
//! - `markdown` - GitHub-flavored Markdown
//! - `csv` - The sweep table alone, for spreadsheets

mod csv_table;
mod json;
mod markdown;
mod text;

use crate::engine::{AnalysisReport, InspectReport};
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown, csv",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Render an analysis report in the specified format
pub fn report(report: &AnalysisReport, format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(report, fmt)
}

/// Render an analysis report using an OutputFormat enum
pub fn report_with_format(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
        OutputFormat::Markdown => markdown::render(report),
        OutputFormat::Csv => csv_table::render(report),
    }
}

/// Render an interactive-lookup report (text and json only).
pub fn inspect(report: &InspectReport, format: &str) -> Result<String> {
    match OutputFormat::from_str(format)? {
        OutputFormat::Text => text::render_inspect(report),
        OutputFormat::Json => json::render_inspect(report),
        other => Err(anyhow!("inspect does not support the '{other}' format")),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::engine::{analyze, AnalysisConfig, SweepConfig};
    use crate::models::RentalRecord;

    /// Create a small AnalysisReport for reporter tests
    pub(crate) fn test_report() -> AnalysisReport {
        let record = |rental_id, delay: f64, previous, delta| RentalRecord {
            rental_id,
            car_id: Some(7),
            delay_at_checkout_in_minutes: Some(delay),
            previous_ended_rental_id: previous,
            time_delta_with_previous_rental_in_minutes: delta,
            ..Default::default()
        };
        let records = vec![
            record(1, 20.0, None, None),
            record(2, 30.0, Some(1), Some(15.0)),
            record(3, -5.0, Some(2), Some(40.0)),
            record(4, 3.0, Some(3), Some(30.0)),
        ];
        let config = AnalysisConfig {
            sweep: SweepConfig {
                start: 0.0,
                stop: 50.0,
                step: 10.0,
            },
            ..Default::default()
        };
        analyze(&records, &config).expect("analysis")
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("md").unwrap(), OutputFormat::Markdown);
        assert_eq!(OutputFormat::from_str("csv").unwrap(), OutputFormat::Csv);
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn every_format_renders() {
        let r = test_report();
        for format in ["text", "json", "markdown", "csv"] {
            let out = report(&r, format).expect("render");
            assert!(!out.is_empty(), "{format} output empty");
        }
    }
}
