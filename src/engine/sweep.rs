//! Threshold sweep and aggregation
//!
//! For each candidate threshold the evaluator runs over every retained
//! event and the outcomes are tallied into one [`SweepRow`]. Candidate
//! thresholds are independent of each other, so the sweep fans out across
//! rayon workers; rows come back in ascending-threshold order either way.

use crate::engine::{classifier, EngineError};
use crate::models::{Classification, EligibleEvent, EvaluatedEvent, Status};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The swept range of candidate thresholds: `start, start+step, ...` up to
/// but excluding `stop`. All three are configuration, not policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        // 0, 5, 10, ... 120 — 25 candidate thresholds
        Self {
            start: 0.0,
            stop: 125.0,
            step: 5.0,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.step > 0.0) {
            return Err(EngineError::InvalidSweep {
                reason: format!("step must be positive, got {}", self.step),
            });
        }
        if self.stop <= self.start {
            return Err(EngineError::InvalidSweep {
                reason: format!("stop ({}) must exceed start ({})", self.stop, self.start),
            });
        }
        Ok(())
    }

    /// Materialize the ascending candidate list.
    ///
    /// Index-based so accumulated float error can never skip or duplicate
    /// a candidate.
    pub fn thresholds(&self) -> Vec<f64> {
        let mut out = Vec::new();
        let mut i = 0u32;
        loop {
            let t = self.start + f64::from(i) * self.step;
            if t >= self.stop {
                break;
            }
            out.push(t);
            i += 1;
        }
        out
    }
}

/// Aggregate outcomes for one candidate threshold.
///
/// Percentages are `None` when their denominator is zero for that
/// threshold; a degenerate row is preferred to aborting the sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub threshold: f64,
    pub total_cases: usize,
    pub problematic_cases: usize,
    pub non_problematic_cases: usize,
    pub solved_cases: usize,
    pub unsolved_cases: usize,
    pub affected_cases: usize,
    pub not_affected_cases: usize,
    /// Total minutes of booking-start displacement across affected
    /// non-problematic events.
    pub affected_minutes: f64,
    pub problematic_percent: Option<f64>,
    pub non_problematic_percent: Option<f64>,
    pub solved_percent: Option<f64>,
    pub unsolved_percent: Option<f64>,
    pub affected_percent: Option<f64>,
    pub not_affected_percent: Option<f64>,
}

/// `part / whole * 100`; a zero denominator is an error, not a NaN.
pub fn ratio(part: usize, whole: usize, quantity: &'static str) -> Result<f64, EngineError> {
    if whole == 0 {
        return Err(EngineError::DivisionByZero { quantity });
    }
    Ok(part as f64 / whole as f64 * 100.0)
}

/// Evaluate every event at `threshold` and tally one row.
pub fn aggregate_at(events: &[EligibleEvent], threshold: f64) -> SweepRow {
    let mut problematic_cases = 0;
    let mut non_problematic_cases = 0;
    let mut solved_cases = 0;
    let mut unsolved_cases = 0;
    let mut affected_cases = 0;
    let mut not_affected_cases = 0;
    let mut affected_minutes = 0.0;

    for event in events {
        match event.classification {
            Classification::Problematic => problematic_cases += 1,
            Classification::NonProblematic => non_problematic_cases += 1,
            Classification::ReturnedEarly => {}
        }

        let evaluated = classifier::evaluate(event, threshold);
        match evaluated.status {
            Some(Status::Solved) => solved_cases += 1,
            Some(Status::Unsolved) => unsolved_cases += 1,
            Some(Status::Affected) => {
                affected_cases += 1;
                affected_minutes += evaluated.losses;
            }
            Some(Status::NotAffected) => not_affected_cases += 1,
            None => {}
        }
    }

    let total_cases = events.len();
    SweepRow {
        threshold,
        total_cases,
        problematic_cases,
        non_problematic_cases,
        solved_cases,
        unsolved_cases,
        affected_cases,
        not_affected_cases,
        affected_minutes,
        problematic_percent: ratio(problematic_cases, total_cases, "problematic share").ok(),
        non_problematic_percent: ratio(non_problematic_cases, total_cases, "non-problematic share")
            .ok(),
        solved_percent: ratio(solved_cases, problematic_cases, "solved share").ok(),
        unsolved_percent: ratio(unsolved_cases, problematic_cases, "unsolved share").ok(),
        affected_percent: ratio(affected_cases, non_problematic_cases, "affected share").ok(),
        not_affected_percent: ratio(not_affected_cases, non_problematic_cases, "not-affected share")
            .ok(),
    }
}

/// Run the sweep over the full candidate range.
pub fn run(events: &[EligibleEvent], config: &SweepConfig) -> Result<Vec<SweepRow>, EngineError> {
    run_with_progress(events, config, |_, _| {})
}

/// Run the sweep, reporting progress as (done, total) after each threshold.
///
/// Candidates are aggregated in parallel; `collect` preserves the ascending
/// candidate order, so output is identical to a sequential run.
pub fn run_with_progress(
    events: &[EligibleEvent],
    config: &SweepConfig,
    on_progress: impl Fn(usize, usize) + Sync,
) -> Result<Vec<SweepRow>, EngineError> {
    config.validate()?;
    let thresholds = config.thresholds();
    let total = thresholds.len();
    let done = AtomicUsize::new(0);

    let rows = thresholds
        .into_par_iter()
        .map(|threshold| {
            let row = aggregate_at(events, threshold);
            on_progress(done.fetch_add(1, Ordering::Relaxed) + 1, total);
            row
        })
        .collect();
    Ok(rows)
}

/// Evaluate every event at one threshold, for per-event reporting.
pub fn breakdown(events: &[EligibleEvent], threshold: f64) -> Vec<EvaluatedEvent> {
    events
        .iter()
        .map(|e| classifier::evaluate(e, threshold))
        .collect()
}

/// How an interactive lookup treats a threshold that was never swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    /// Fail with `NotFound` unless the value is one of the swept candidates.
    #[default]
    Exact,
    /// Snap to the closest swept candidate.
    Nearest,
}

impl FromStr for LookupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(LookupMode::Exact),
            "nearest" => Ok(LookupMode::Nearest),
            other => Err(format!("unknown lookup mode '{other}'. Valid: exact, nearest")),
        }
    }
}

/// Find the aggregate row for an externally-chosen threshold.
pub fn lookup<'a>(
    rows: &'a [SweepRow],
    threshold: f64,
    mode: LookupMode,
) -> Result<&'a SweepRow, EngineError> {
    let exact = rows.iter().find(|r| (r.threshold - threshold).abs() < 1e-9);
    match (exact, mode) {
        (Some(row), _) => Ok(row),
        (None, LookupMode::Exact) => Err(EngineError::NotFound { threshold }),
        (None, LookupMode::Nearest) => rows
            .iter()
            .min_by(|a, b| {
                (a.threshold - threshold)
                    .abs()
                    .total_cmp(&(b.threshold - threshold).abs())
            })
            .ok_or(EngineError::NotFound { threshold }),
    }
}

/// Smallest swept threshold whose solved share reaches `target_percent`.
pub fn recommended_threshold(rows: &[SweepRow], target_percent: f64) -> Option<f64> {
    rows.iter()
        .find(|r| r.solved_percent.is_some_and(|p| p >= target_percent))
        .map(|r| r.threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classify;
    use crate::models::CheckinType;

    fn event(rental_id: u64, delay_of_previous: f64, delta: f64) -> EligibleEvent {
        EligibleEvent {
            rental_id,
            checkin_type: CheckinType::Mobile,
            delay_of_previous,
            delta,
            classification: classify(delay_of_previous, delta),
        }
    }

    fn fixture() -> Vec<EligibleEvent> {
        vec![
            event(1, 20.0, 15.0),  // problematic
            event(2, 45.0, 10.0),  // problematic
            event(3, 30.0, 40.0),  // non-problematic
            event(4, 10.0, 60.0),  // non-problematic
            event(5, -5.0, 30.0),  // returned early
        ]
    }

    #[test]
    fn default_sweep_has_25_candidates() {
        let thresholds = SweepConfig::default().thresholds();
        assert_eq!(thresholds.len(), 25);
        assert_eq!(thresholds[0], 0.0);
        assert_eq!(thresholds[24], 120.0);
    }

    #[test]
    fn validate_rejects_bad_config() {
        let bad_step = SweepConfig {
            step: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_step.validate(),
            Err(EngineError::InvalidSweep { .. })
        ));
        let bad_range = SweepConfig {
            start: 50.0,
            stop: 50.0,
            step: 5.0,
        };
        assert!(bad_range.validate().is_err());
    }

    #[test]
    fn aggregate_counts_partition() {
        let events = fixture();
        for threshold in [0.0, 25.0, 50.0, 120.0] {
            let row = aggregate_at(&events, threshold);
            // problematic + non-problematic = total minus returned-early
            assert_eq!(
                row.problematic_cases + row.non_problematic_cases,
                row.total_cases - 1
            );
            assert_eq!(row.solved_cases + row.unsolved_cases, row.problematic_cases);
            assert_eq!(
                row.affected_cases + row.not_affected_cases,
                row.non_problematic_cases
            );
        }
    }

    #[test]
    fn aggregate_at_fifty() {
        // At T=50: both problematic events solved (50 >= 20, 50 >= 45);
        // event 3 affected (50 - 40 = 10), event 4 not affected (50 - 60 < 0).
        let row = aggregate_at(&fixture(), 50.0);
        assert_eq!(row.solved_cases, 2);
        assert_eq!(row.unsolved_cases, 0);
        assert_eq!(row.affected_cases, 1);
        assert_eq!(row.not_affected_cases, 1);
        assert_eq!(row.affected_minutes, 10.0);
        assert_eq!(row.solved_percent, Some(100.0));
        assert_eq!(row.affected_percent, Some(50.0));
    }

    #[test]
    fn affected_minutes_ignores_problematic_losses() {
        // T=25 makes event 1's "losses" (25 - 15 = 10) positive, but it is
        // problematic, so nothing is added to affected_minutes.
        let row = aggregate_at(&fixture(), 25.0);
        assert_eq!(row.affected_cases, 0);
        assert_eq!(row.affected_minutes, 0.0);
    }

    #[test]
    fn zero_denominator_yields_none_not_error() {
        let events = vec![event(5, -5.0, 30.0)]; // only returned-early
        let row = aggregate_at(&events, 10.0);
        assert_eq!(row.problematic_cases, 0);
        assert_eq!(row.solved_percent, None);
        assert_eq!(row.affected_percent, None);
        // shares over total still defined: total_cases = 1
        assert_eq!(row.problematic_percent, Some(0.0));
    }

    #[test]
    fn empty_event_set_is_degenerate_but_not_fatal() {
        let rows = run(&[], &SweepConfig::default()).unwrap();
        assert_eq!(rows.len(), 25);
        assert!(rows.iter().all(|r| r.total_cases == 0));
        assert!(rows.iter().all(|r| r.problematic_percent.is_none()));
    }

    #[test]
    fn sweep_is_idempotent_and_ordered() {
        let events = fixture();
        let config = SweepConfig::default();
        let first = run(&events, &config).unwrap();
        let second = run(&events, &config).unwrap();
        assert_eq!(first, second);
        assert!(first
            .windows(2)
            .all(|pair| pair[0].threshold < pair[1].threshold));
    }

    #[test]
    fn lookup_exact_and_nearest() {
        let rows = run(&fixture(), &SweepConfig::default()).unwrap();
        assert_eq!(lookup(&rows, 45.0, LookupMode::Exact).unwrap().threshold, 45.0);
        assert!(matches!(
            lookup(&rows, 42.0, LookupMode::Exact),
            Err(EngineError::NotFound { .. })
        ));
        assert_eq!(
            lookup(&rows, 42.0, LookupMode::Nearest).unwrap().threshold,
            40.0
        );
        assert!(matches!(
            lookup(&[], 0.0, LookupMode::Nearest),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn recommended_threshold_finds_smallest_covering() {
        let rows = run(&fixture(), &SweepConfig::default()).unwrap();
        // Event 2 needs T >= 45 to be solved, event 1 needs T >= 20.
        assert_eq!(recommended_threshold(&rows, 100.0), Some(45.0));
        // 50% coverage is reached at T = 20 (1 of 2 solved).
        assert_eq!(recommended_threshold(&rows, 50.0), Some(20.0));
        assert_eq!(recommended_threshold(&rows, 101.0), None);
    }

    #[test]
    fn ratio_reports_division_by_zero() {
        assert!(matches!(
            ratio(1, 0, "anything"),
            Err(EngineError::DivisionByZero { .. })
        ));
        assert_eq!(ratio(1, 4, "share").unwrap(), 25.0);
    }
}
