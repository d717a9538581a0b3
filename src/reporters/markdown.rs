//! Markdown reporter
//!
//! GitHub-flavored Markdown: a funnel list and the sweep table, ready to
//! paste into an issue or a report.

use crate::engine::AnalysisReport;
use anyhow::Result;
use std::fmt::Write;

fn pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => "—".to_string(),
    }
}

/// Render report as Markdown
pub fn render(report: &AnalysisReport) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "# Turnaround Analysis\n")?;

    writeln!(out, "## Filtering funnel\n")?;
    for (stage, count) in report.funnel.stages() {
        writeln!(out, "- {stage}: **{count}**")?;
    }
    if let Some(cutoff) = report.funnel.outlier_cutoff {
        writeln!(
            out,
            "- Outlier cutoff: **{cutoff:.1} min** ({} events dropped)",
            report.funnel.delay_outliers_excluded
        )?;
    }
    writeln!(out)?;

    if let (Some(delay), Some(delta)) = (&report.delay, &report.delta) {
        writeln!(out, "## Distributions (non-negative delays)\n")?;
        writeln!(out, "| series | min | median | mean | max | samples |")?;
        writeln!(out, "|---|---|---|---|---|---|")?;
        writeln!(
            out,
            "| checkout delay | {:.0} | {:.0} | {:.1} | {:.0} | {} |",
            delay.min, delay.median, delay.mean, delay.max, delay.count
        )?;
        writeln!(
            out,
            "| planned delta | {:.0} | {:.0} | {:.1} | {:.0} | {} |",
            delta.min, delta.median, delta.mean, delta.max, delta.count
        )?;
        writeln!(out)?;
    }

    writeln!(out, "## Threshold sweep\n")?;
    writeln!(
        out,
        "| threshold | problematic | solved | solved % | unsolved | affected | affected % | lost minutes |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|---|")?;
    for row in &report.rows {
        writeln!(
            out,
            "| {:.0} | {} | {} | {} | {} | {} | {} | {:.0} |",
            row.threshold,
            row.problematic_cases,
            row.solved_cases,
            pct(row.solved_percent),
            row.unsolved_cases,
            row.affected_cases,
            pct(row.affected_percent),
            row.affected_minutes,
        )?;
    }
    writeln!(out)?;

    if let Some(t) = report.threshold_for_full_coverage {
        writeln!(
            out,
            "**A safety margin of {t:.0} minutes solves every problematic case.**"
        )?;
    }
    if let Some(t) = report.threshold_for_80_percent {
        writeln!(
            out,
            "80% of problematic cases are solved from {t:.0} minutes."
        )?;
    }

    Ok(out)
}
