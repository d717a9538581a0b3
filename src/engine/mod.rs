//! Threshold impact engine
//!
//! This module owns the whole safety-margin analysis: screening the raw
//! table into an immutable snapshot, classifying events, sweeping candidate
//! thresholds, and aggregating per-threshold outcomes.
//!
//! # Classification contract
//!
//! ```text
//! delay_of_previous < 0                  => ReturnedEarly
//! delta - delay_of_previous >= 0         => NonProblematic
//! otherwise                              => Problematic
//! ```
//!
//! # Status contract (per candidate threshold T)
//!
//! ```text
//! Problematic:    Solved      if T - delay_of_previous >= 0, else Unsolved
//! ReturnedEarly:  (no status)
//! NonProblematic: NotAffected if T - delta <= 0, else Affected
//! ```
//!
//! Classification is computed once per snapshot and never changes during a
//! sweep; only status, losses, and threshold_minus_delay vary with T. The
//! snapshot itself is read-only, which is what makes the per-threshold
//! aggregation safe to run in parallel.

pub mod classifier;
pub mod snapshot;
pub mod stats;
pub mod sweep;

pub use classifier::{classify, evaluate};
pub use snapshot::{FilterFunnel, OutlierConfig, OutlierStatistic, Snapshot};
pub use stats::{DistributionSummary, HistogramBin};
pub use sweep::{LookupMode, SweepConfig, SweepRow};

use crate::models::{CheckinType, EvaluatedEvent, RentalRecord};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Typed error kinds for the engine.
///
/// The filtering-stage kinds (`MissingField`, `UnresolvedReference`) are
/// absorbed into [`FilterFunnel`] counts during snapshot construction and
/// never abort a run; `DivisionByZero` is absorbed into `None` percentages.
/// Only `NotFound` and `InvalidSweep` surface to callers.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("rental {rental_id}: required field '{field}' is missing")]
    MissingField { rental_id: u64, field: &'static str },

    #[error("rental {rental_id}: previous rental {previous_id} does not resolve to any row")]
    UnresolvedReference { rental_id: u64, previous_id: u64 },

    #[error("division by zero computing {quantity}")]
    DivisionByZero { quantity: &'static str },

    #[error("threshold {threshold} is not in the swept table")]
    NotFound { threshold: f64 },

    #[error("invalid sweep configuration: {reason}")]
    InvalidSweep { reason: String },
}

/// Everything the engine needs besides the dataset itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisConfig {
    pub sweep: SweepConfig,
    pub outliers: OutlierConfig,
    pub lookup: LookupMode,
}

/// Delay distribution summary for one check-in type.
#[derive(Debug, Clone, Serialize)]
pub struct CheckinBreakdown {
    pub checkin_type: CheckinType,
    pub delay: DistributionSummary,
}

/// The full output of one analysis run, consumed read-only by reporters.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub funnel: FilterFunnel,
    /// Checkout-delay distribution over records with non-negative delay.
    pub delay: Option<DistributionSummary>,
    /// Planned-delta distribution over the same records.
    pub delta: Option<DistributionSummary>,
    pub delay_by_checkin: Vec<CheckinBreakdown>,
    pub delay_histogram: Vec<HistogramBin>,
    pub delta_histogram: Vec<HistogramBin>,
    pub sweep: SweepConfig,
    pub rows: Vec<SweepRow>,
    /// Smallest swept threshold solving every problematic case, if any.
    pub threshold_for_full_coverage: Option<f64>,
    /// Smallest swept threshold solving at least 80% of problematic cases.
    pub threshold_for_80_percent: Option<f64>,
}

/// Result of an interactive lookup at a single threshold.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    /// The threshold actually used (snapped when mode is `nearest`).
    pub threshold: f64,
    pub row: SweepRow,
    pub breakdown: Vec<EvaluatedEvent>,
}

/// Run the whole pipeline: snapshot, distribution statistics, sweep.
pub fn analyze(
    records: &[RentalRecord],
    config: &AnalysisConfig,
) -> Result<AnalysisReport, EngineError> {
    analyze_with_progress(records, config, |_, _| {})
}

/// Same as [`analyze`], reporting sweep progress as (done, total).
pub fn analyze_with_progress(
    records: &[RentalRecord],
    config: &AnalysisConfig,
    on_progress: impl Fn(usize, usize) + Sync,
) -> Result<AnalysisReport, EngineError> {
    let snapshot = Snapshot::build(records, &config.outliers);
    info!(
        eligible = snapshot.funnel.eligible,
        retained = snapshot.funnel.retained,
        "snapshot built"
    );

    let rows = sweep::run_with_progress(&snapshot.events, &config.sweep, on_progress)?;
    info!(
        thresholds = rows.len(),
        start = config.sweep.start,
        stop = config.sweep.stop,
        "sweep complete"
    );

    // General statistics cover records with non-negative delay; early
    // checkouts would skew the distribution sections.
    let general: Vec<&RentalRecord> = records
        .iter()
        .filter(|r| r.delay_at_checkout_in_minutes.is_some_and(|d| d >= 0.0))
        .collect();
    let delays: Vec<f64> = general
        .iter()
        .filter_map(|r| r.delay_at_checkout_in_minutes)
        .collect();
    let deltas: Vec<f64> = general
        .iter()
        .filter_map(|r| r.time_delta_with_previous_rental_in_minutes)
        .collect();

    let mut delay_by_checkin = Vec::new();
    for checkin_type in [CheckinType::Mobile, CheckinType::Connect, CheckinType::Other] {
        let values: Vec<f64> = general
            .iter()
            .filter(|r| r.checkin_type == checkin_type)
            .filter_map(|r| r.delay_at_checkout_in_minutes)
            .collect();
        if let Some(delay) = stats::summarize(&values) {
            delay_by_checkin.push(CheckinBreakdown {
                checkin_type,
                delay,
            });
        }
    }

    let threshold_for_full_coverage = sweep::recommended_threshold(&rows, 100.0);
    let threshold_for_80_percent = sweep::recommended_threshold(&rows, 80.0);

    Ok(AnalysisReport {
        funnel: snapshot.funnel,
        delay: stats::summarize(&delays),
        delta: stats::summarize(&deltas),
        delay_by_checkin,
        delay_histogram: stats::histogram(&delays, 0.0, 200.0, 5.0),
        delta_histogram: stats::histogram(&deltas, 0.0, 200.0, 5.0),
        sweep: config.sweep,
        rows,
        threshold_for_full_coverage,
        threshold_for_80_percent,
    })
}

/// Interactive lookup: find the aggregate row for one externally-chosen
/// threshold and re-evaluate every event at it for chart-style breakdowns.
pub fn inspect(
    snapshot: &Snapshot,
    rows: &[SweepRow],
    threshold: f64,
    mode: LookupMode,
) -> Result<InspectReport, EngineError> {
    let row = sweep::lookup(rows, threshold, mode)?.clone();
    let breakdown = sweep::breakdown(&snapshot.events, row.threshold);
    Ok(InspectReport {
        threshold: row.threshold,
        row,
        breakdown,
    })
}
