//! Analyze command implementation
//!
//! This command runs the full pipeline:
//! 1. Resolve configuration (file, then CLI overrides)
//! 2. Load the rental-delay CSV
//! 3. Build the filtered snapshot (delay index, eligibility, outlier cut)
//! 4. Sweep the candidate thresholds
//! 5. Output results (text, json, markdown, csv)

use crate::config::{load_project_config, ProjectConfig};
use crate::engine::{self, AnalysisConfig, OutlierStatistic};
use crate::loader;
use crate::reporters;

use anyhow::{anyhow, Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;

/// Everything `turnaround analyze` was invoked with.
pub struct AnalyzeArgs<'a> {
    pub data: &'a Path,
    pub config: Option<&'a Path>,
    pub format: Option<&'a str>,
    pub output: Option<&'a Path>,
    pub start: Option<f64>,
    pub stop: Option<f64>,
    pub step: Option<f64>,
    pub outlier_multiplier: Option<f64>,
    pub outlier_statistic: Option<&'a str>,
    pub no_progress: bool,
}

/// Resolve file config plus CLI overrides into the engine configuration.
fn resolve_config(args: &AnalyzeArgs<'_>) -> Result<(AnalysisConfig, String)> {
    let project = match args.config {
        Some(path) => ProjectConfig::from_path(path)?,
        None => load_project_config(Path::new(".")),
    };

    let mut config = project.analysis();
    if let Some(start) = args.start {
        config.sweep.start = start;
    }
    if let Some(stop) = args.stop {
        config.sweep.stop = stop;
    }
    if let Some(step) = args.step {
        config.sweep.step = step;
    }
    if let Some(multiplier) = args.outlier_multiplier {
        config.outliers.multiplier = multiplier;
    }
    if let Some(statistic) = args.outlier_statistic {
        config.outliers.statistic = statistic
            .parse::<OutlierStatistic>()
            .map_err(|e| anyhow!(e))?;
    }

    let format = args
        .format
        .map(str::to_string)
        .unwrap_or(project.defaults.format);
    Ok((config, format))
}

pub fn run(args: AnalyzeArgs<'_>) -> Result<()> {
    let start_time = Instant::now();
    let (config, format) = resolve_config(&args)?;

    let records = loader::load_records_file(args.data)?;

    let candidates = config.sweep.thresholds().len() as u64;
    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(candidates);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}")?.progress_chars("=> "),
        );
        bar.set_message("sweeping thresholds");
        bar
    };

    let report = engine::analyze_with_progress(&records, &config, |done, _| {
        progress.set_position(done as u64);
    })?;
    progress.finish_and_clear();

    let rendered = reporters::report(&report, &format)?;
    match args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            eprintln!(
                "{} report written to {}",
                style("✔").green(),
                path.display()
            );
        }
        None => println!("{rendered}"),
    }

    if format == "text" && args.output.is_none() {
        eprintln!(
            "{}",
            style(format!(
                "Analyzed {} records in {:.2}s",
                records.len(),
                start_time.elapsed().as_secs_f64()
            ))
            .dim()
        );
    }

    Ok(())
}
