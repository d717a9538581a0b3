//! Text (terminal) reporter with colors and formatting

use crate::engine::{AnalysisReport, InspectReport};
use crate::models::{Classification, Status};
use anyhow::Result;

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Percentage cell, or a dash when the denominator was zero.
fn pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}%"),
        None => "-".to_string(),
    }
}

fn minutes(value: f64) -> String {
    format!("{value:.0} min")
}

/// Render report as formatted terminal output
pub fn render(report: &AnalysisReport) -> Result<String> {
    let mut out = String::new();

    // Header
    out.push_str(&format!("\n{BOLD}Turnaround Analysis{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    let f = &report.funnel;
    out.push_str(&format!(
        "Records: {}  Cars: {}  Retained events: {BOLD}{}{RESET}\n\n",
        f.total_records, f.unique_cars, f.retained
    ));

    // Filtering funnel
    out.push_str(&format!("{BOLD}FUNNEL{RESET}\n"));
    for (stage, count) in f.stages() {
        let share = if f.total_records > 0 {
            count as f64 / f.total_records as f64 * 100.0
        } else {
            0.0
        };
        out.push_str(&format!(
            "  {:<44} {:>7}  {DIM}{:>5.1}%{RESET}\n",
            stage, count, share
        ));
    }
    if f.unresolved_references > 0 || f.missing_delay_of_previous > 0 {
        out.push_str(&format!(
            "  {DIM}dropped: {} unresolved references, {} missing previous delays, {} missing deltas{RESET}\n",
            f.unresolved_references, f.missing_delay_of_previous, f.missing_delta
        ));
    }
    if let Some(cutoff) = f.outlier_cutoff {
        out.push_str(&format!(
            "  {DIM}outlier cutoff {:.1} min dropped {} events{RESET}\n",
            cutoff, f.delay_outliers_excluded
        ));
    }
    out.push('\n');

    // General statistics
    out.push_str(&format!("{BOLD}DISTRIBUTIONS{RESET} {DIM}(non-negative delays){RESET}\n"));
    if let Some(delay) = &report.delay {
        out.push_str(&format!(
            "  Checkout delay:  min {:.0}  median {:.0}  mean {:.1}  max {:.0}  ({} samples)\n",
            delay.min, delay.median, delay.mean, delay.max, delay.count
        ));
    }
    if let Some(delta) = &report.delta {
        out.push_str(&format!(
            "  Planned delta:   min {:.0}  median {:.0}  mean {:.1}  max {:.0}  ({} samples)\n",
            delta.min, delta.median, delta.mean, delta.max, delta.count
        ));
    }
    for breakdown in &report.delay_by_checkin {
        out.push_str(&format!(
            "  {DIM}{:<8} delay median {:.0}, mean {:.1} over {} samples{RESET}\n",
            breakdown.checkin_type.to_string(),
            breakdown.delay.median,
            breakdown.delay.mean,
            breakdown.delay.count
        ));
    }
    out.push('\n');

    // Sweep table
    out.push_str(&format!(
        "{BOLD}SWEEP{RESET} {DIM}({} candidates, step {} min){RESET}\n",
        report.rows.len(),
        report.sweep.step
    ));
    out.push_str(&format!(
        "{DIM}  THRESHOLD  PROBLEMATIC  SOLVED  SOLVED%  AFFECTED  AFFECTED%     LOSS{RESET}\n"
    ));
    out.push_str(&format!(
        "{DIM}  ──────────────────────────────────────────────────────────────────────{RESET}\n"
    ));
    for row in &report.rows {
        let solved_color = match row.solved_percent {
            Some(p) if p >= 100.0 => GREEN,
            Some(p) if p >= 80.0 => YELLOW,
            _ => "",
        };
        out.push_str(&format!(
            "  {:>9} {:>12} {:>7}  {solved_color}{:>7}{RESET} {:>9}  {:>9} {:>8}\n",
            format!("{:.0}", row.threshold),
            row.problematic_cases,
            row.solved_cases,
            pct(row.solved_percent),
            row.affected_cases,
            pct(row.affected_percent),
            minutes(row.affected_minutes),
        ));
    }
    out.push('\n');

    // Recommendations
    match report.threshold_for_full_coverage {
        Some(t) => out.push_str(&format!(
            "{GREEN}A threshold of {:.0} min solves every problematic case.{RESET}\n",
            t
        )),
        None => out.push_str(&format!(
            "{RED}No swept threshold solves every problematic case; raise the sweep ceiling.{RESET}\n"
        )),
    }
    if let Some(t) = report.threshold_for_80_percent {
        out.push_str(&format!(
            "{DIM}80% of problematic cases are solved from {:.0} min.{RESET}\n",
            t
        ));
    }

    Ok(out)
}

/// Render an interactive lookup as terminal text.
pub fn render_inspect(report: &InspectReport) -> Result<String> {
    let mut out = String::new();
    let row = &report.row;

    out.push_str(&format!(
        "\n{BOLD}Threshold {:.0} min{RESET}\n",
        report.threshold
    ));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "  Problematic:     {:>6}   solved {} ({}), unsolved {}\n",
        row.problematic_cases,
        row.solved_cases,
        pct(row.solved_percent),
        row.unsolved_cases
    ));
    out.push_str(&format!(
        "  Non-problematic: {:>6}   affected {} ({}), not affected {}\n",
        row.non_problematic_cases,
        row.affected_cases,
        pct(row.affected_percent),
        row.not_affected_cases
    ));
    out.push_str(&format!(
        "  Lost minutes:    {:>6}\n\n",
        format!("{:.0}", row.affected_minutes)
    ));

    // Per-classification status counts.
    let mut counts: Vec<((Classification, Option<Status>), usize)> = Vec::new();
    for evaluated in &report.breakdown {
        let key = (evaluated.event.classification, evaluated.status);
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, n)) => *n += 1,
            None => counts.push((key, 1)),
        }
    }
    out.push_str(&format!("{BOLD}BREAKDOWN{RESET}\n"));
    for ((classification, status), n) in counts {
        let status_label = status.map_or_else(|| "no status".to_string(), |s| s.to_string());
        out.push_str(&format!(
            "  {:<16} {:<13} {:>6}\n",
            classification.to_string(),
            status_label,
            n
        ));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{inspect, LookupMode, Snapshot, SweepConfig};
    use crate::reporters::tests::test_report;

    #[test]
    fn test_text_render_contains_sections() {
        let output = render(&test_report()).expect("render text");
        assert!(output.contains("Turnaround Analysis"));
        assert!(output.contains("FUNNEL"));
        assert!(output.contains("SWEEP"));
        assert!(output.contains("Total rental records"));
    }

    #[test]
    fn test_pct_formats_missing_denominators() {
        assert_eq!(pct(Some(42.5)), "42.5%");
        assert_eq!(pct(None), "-");
    }

    #[test]
    fn test_inspect_render() {
        let record = |rental_id, delay: f64, previous, delta| crate::models::RentalRecord {
            rental_id,
            delay_at_checkout_in_minutes: Some(delay),
            previous_ended_rental_id: previous,
            time_delta_with_previous_rental_in_minutes: delta,
            ..Default::default()
        };
        let records = vec![
            record(1, 20.0, None, None),
            record(2, 0.0, Some(1), Some(15.0)),
        ];
        let snapshot = Snapshot::build(&records, &Default::default());
        let rows =
            crate::engine::sweep::run(&snapshot.events, &SweepConfig::default()).unwrap();
        let report = inspect(&snapshot, &rows, 25.0, LookupMode::Exact).unwrap();
        let output = render_inspect(&report).expect("render inspect");
        assert!(output.contains("Threshold 25 min"));
        assert!(output.contains("BREAKDOWN"));
        assert!(output.contains("problematic"));
    }
}
