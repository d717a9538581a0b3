//! CLI command definitions and handlers

pub(crate) mod analyze;
mod init;
mod inspect;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate a positive minutes value
fn parse_positive_minutes(s: &str) -> Result<f64, String> {
    let n: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number of minutes", s))?;
    if n <= 0.0 {
        Err("must be a positive number of minutes".to_string())
    } else {
        Ok(n)
    }
}

/// Parse a non-negative minutes value
fn parse_minutes(s: &str) -> Result<f64, String> {
    let n: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number of minutes", s))?;
    if n < 0.0 {
        Err("must be a non-negative number of minutes".to_string())
    } else {
        Ok(n)
    }
}

/// Turnaround - rental safety-margin analysis
///
/// Classifies every rental against the checkout delay of the previous
/// rental of the same car, sweeps candidate safety-margin thresholds, and
/// reports how many conflicts each threshold would solve and what it would
/// cost in displaced bookings.
#[derive(Parser, Debug)]
#[command(name = "turnaround")]
#[command(
    version,
    about = "Safety-margin analysis for rental turnaround delays",
    after_help = "\
Examples:
  turnaround analyze delays.csv                 Full sweep, text report
  turnaround analyze delays.csv --format json   JSON for scripting
  turnaround analyze delays.csv --stop 200      Sweep 0..200 minutes
  turnaround inspect delays.csv --threshold 45  One threshold in detail
  turnaround init                               Write a sample turnaround.toml"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Path to a turnaround.toml (default: ./turnaround.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sweep candidate thresholds over a rental-delay dataset
    #[command(after_help = "\
Examples:
  turnaround analyze delays.csv                          Text report to stdout
  turnaround analyze delays.csv --format csv -o sweep.csv  Sweep table for a spreadsheet
  turnaround analyze delays.csv --step 10 --stop 240     Coarser, wider sweep
  turnaround analyze delays.csv --outlier-statistic p95  Gentler outlier rule")]
    Analyze {
        /// Path to the rental-delay CSV export
        data: PathBuf,

        /// Output format: text, json, markdown (or md), csv
        #[arg(long, short = 'f', value_parser = ["text", "json", "markdown", "md", "csv"])]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// First candidate threshold in minutes
        #[arg(long, value_parser = parse_minutes)]
        start: Option<f64>,

        /// Sweep ceiling in minutes (exclusive)
        #[arg(long, value_parser = parse_positive_minutes)]
        stop: Option<f64>,

        /// Distance between candidate thresholds in minutes
        #[arg(long, value_parser = parse_positive_minutes)]
        step: Option<f64>,

        /// Outlier cutoff multiplier (default 1.5)
        #[arg(long, value_parser = parse_positive_minutes)]
        outlier_multiplier: Option<f64>,

        /// Statistic anchoring the outlier cutoff: median, or p<0-100>
        #[arg(long)]
        outlier_statistic: Option<String>,

        /// Disable the progress bar (cleaner for CI logs)
        #[arg(long)]
        no_progress: bool,
    },

    /// Evaluate a single threshold in detail
    Inspect {
        /// Path to the rental-delay CSV export
        data: PathBuf,

        /// Threshold to inspect, in minutes
        #[arg(long, short = 't', value_parser = parse_minutes)]
        threshold: f64,

        /// Snap to the nearest swept threshold instead of failing
        #[arg(long)]
        nearest: bool,

        /// Output format: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,
    },

    /// Initialize a turnaround.toml config file with example settings
    Init,
}

/// Dispatch to the command handlers
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            ref data,
            ref format,
            ref output,
            start,
            stop,
            step,
            outlier_multiplier,
            ref outlier_statistic,
            no_progress,
        } => analyze::run(analyze::AnalyzeArgs {
            data,
            config: cli.config.as_deref(),
            format: format.as_deref(),
            output: output.as_deref(),
            start,
            stop,
            step,
            outlier_multiplier,
            outlier_statistic: outlier_statistic.as_deref(),
            no_progress,
        }),
        Commands::Inspect {
            ref data,
            threshold,
            nearest,
            ref format,
        } => inspect::run(data, cli.config.as_deref(), threshold, nearest, format.as_deref()),
        Commands::Init => init::run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_parsers() {
        assert_eq!(parse_minutes("0").unwrap(), 0.0);
        assert_eq!(parse_minutes("12.5").unwrap(), 12.5);
        assert!(parse_minutes("-3").is_err());
        assert!(parse_positive_minutes("0").is_err());
        assert_eq!(parse_positive_minutes("5").unwrap(), 5.0);
        assert!(parse_positive_minutes("abc").is_err());
    }

    #[test]
    fn test_cli_parses_analyze() {
        let cli = Cli::try_parse_from([
            "turnaround", "analyze", "delays.csv", "--step", "10", "--format", "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze { step, format, .. } => {
                assert_eq!(step, Some(10.0));
                assert_eq!(format.as_deref(), Some("json"));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_cli_rejects_negative_threshold() {
        assert!(Cli::try_parse_from([
            "turnaround", "inspect", "delays.csv", "--threshold", "-5",
        ])
        .is_err());
    }
}
