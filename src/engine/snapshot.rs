//! Snapshot construction: eligibility screening and outlier exclusion
//!
//! Turns the raw rental table into an immutable set of [`EligibleEvent`]s.
//! The previous-rental delay lookup is a prebuilt id-to-delay index built
//! once per dataset load, so resolving each row is O(1) instead of a linear
//! scan per row. Rows that cannot be screened in are counted in the
//! [`FilterFunnel`], never propagated as errors.

use crate::engine::{stats, EngineError};
use crate::models::{Classification, EligibleEvent, RentalRecord};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::str::FromStr;
use tracing::{debug, warn};

/// Prebuilt mapping from rental id to its (possibly missing) checkout delay.
///
/// Must be rebuilt whenever the underlying dataset changes.
pub type DelayIndex = FxHashMap<u64, Option<f64>>;

/// Build the delay index over a dataset.
pub fn build_delay_index(records: &[RentalRecord]) -> DelayIndex {
    records
        .iter()
        .map(|r| (r.rental_id, r.delay_at_checkout_in_minutes))
        .collect()
}

/// Resolve the checkout delay of the referenced previous rental.
///
/// Fails with `UnresolvedReference` when the id matches no row, and with
/// `MissingField` when the row exists but recorded no delay. Both kinds are
/// absorbed into funnel counts by [`Snapshot::build`].
pub fn delay_of_previous(
    index: &DelayIndex,
    rental_id: u64,
    previous_id: u64,
) -> Result<f64, EngineError> {
    match index.get(&previous_id) {
        None => Err(EngineError::UnresolvedReference {
            rental_id,
            previous_id,
        }),
        Some(None) => Err(EngineError::MissingField {
            rental_id,
            field: "delay_of_previous",
        }),
        Some(Some(delay)) => Ok(*delay),
    }
}

/// Which order statistic anchors the outlier cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlierStatistic {
    Median,
    /// Percentile in `(0, 100)`, e.g. `p90`.
    Percentile(f64),
}

impl OutlierStatistic {
    /// Apply the statistic to a sample; `None` for an empty one.
    pub fn compute(&self, values: &[f64]) -> Option<f64> {
        match self {
            OutlierStatistic::Median => stats::median(values),
            OutlierStatistic::Percentile(p) => stats::percentile(values, *p),
        }
    }
}

impl Default for OutlierStatistic {
    fn default() -> Self {
        OutlierStatistic::Median
    }
}

impl FromStr for OutlierStatistic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "median" {
            return Ok(OutlierStatistic::Median);
        }
        if let Some(digits) = s.strip_prefix('p') {
            let p: f64 = digits
                .parse()
                .map_err(|_| format!("'{s}' is not a valid statistic"))?;
            if p > 0.0 && p < 100.0 {
                return Ok(OutlierStatistic::Percentile(p));
            }
            return Err(format!("percentile {p} out of range (0, 100)"));
        }
        Err(format!(
            "unknown statistic '{s}'. Valid: median, p<0-100> (e.g. p90)"
        ))
    }
}

impl std::fmt::Display for OutlierStatistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutlierStatistic::Median => write!(f, "median"),
            OutlierStatistic::Percentile(p) => write!(f, "p{p}"),
        }
    }
}

impl Serialize for OutlierStatistic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for OutlierStatistic {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How far past the anchor statistic a previous delay may go before the
/// event is dropped as an outlier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    pub multiplier: f64,
    pub statistic: OutlierStatistic,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            multiplier: 1.5,
            statistic: OutlierStatistic::Median,
        }
    }
}

/// Stage-by-stage account of how many rows survived screening.
///
/// Mirrors the executive-summary funnel: every excluded row lands in exactly
/// one counter instead of surfacing as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterFunnel {
    pub total_records: usize,
    pub unique_cars: usize,
    /// Records with a recorded, non-negative checkout delay (informational;
    /// feeds the general statistics, not the engine's event set).
    pub non_negative_delay: usize,
    pub with_previous_reference: usize,
    /// Previous-rental id matched no row.
    pub unresolved_references: usize,
    /// Previous rental found but its delay was never recorded.
    pub missing_delay_of_previous: usize,
    /// Previous delay resolved but the planned delta is missing.
    pub missing_delta: usize,
    /// Rows with both delta and delay_of_previous present.
    pub eligible: usize,
    /// `multiplier x statistic` over eligible positive previous delays;
    /// `None` when no eligible event has a positive previous delay.
    pub outlier_cutoff: Option<f64>,
    pub delay_outliers_excluded: usize,
    /// Eligible rows that survived the outlier cut; the sweep's event set.
    pub retained: usize,
    pub problematic: usize,
    pub non_problematic: usize,
    pub returned_early: usize,
}

impl FilterFunnel {
    /// The funnel stages in reporting order.
    pub fn stages(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("Total rental records", self.total_records),
            ("With a previous-rental reference", self.with_previous_reference),
            ("Eligible (delta and previous delay present)", self.eligible),
            ("After excluding delay outliers", self.retained),
            ("Problematic cases", self.problematic),
        ]
    }
}

/// Immutable filtered view of the dataset, computed once per load.
///
/// Sweeps read `events` concurrently; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub events: Vec<EligibleEvent>,
    pub funnel: FilterFunnel,
}

impl Snapshot {
    /// Screen the raw table into eligible events and apply the outlier cut.
    pub fn build(records: &[RentalRecord], outliers: &OutlierConfig) -> Snapshot {
        let index = build_delay_index(records);
        let mut funnel = FilterFunnel {
            total_records: records.len(),
            ..Default::default()
        };

        let mut cars: FxHashSet<u64> = FxHashSet::default();
        let mut candidates: Vec<EligibleEvent> = Vec::new();

        for record in records {
            if let Some(car_id) = record.car_id {
                cars.insert(car_id);
            }
            if record
                .delay_at_checkout_in_minutes
                .is_some_and(|d| d >= 0.0)
            {
                funnel.non_negative_delay += 1;
            }

            let Some(previous_id) = record.previous_ended_rental_id else {
                continue;
            };
            funnel.with_previous_reference += 1;

            let prev_delay = match delay_of_previous(&index, record.rental_id, previous_id) {
                Ok(delay) => delay,
                Err(EngineError::UnresolvedReference { .. }) => {
                    debug!(
                        rental_id = record.rental_id,
                        previous_id, "previous rental not found"
                    );
                    funnel.unresolved_references += 1;
                    continue;
                }
                Err(_) => {
                    funnel.missing_delay_of_previous += 1;
                    continue;
                }
            };

            let Some(delta) = record.time_delta_with_previous_rental_in_minutes else {
                funnel.missing_delta += 1;
                continue;
            };
            funnel.eligible += 1;

            candidates.push(EligibleEvent {
                rental_id: record.rental_id,
                checkin_type: record.checkin_type,
                delay_of_previous: prev_delay,
                delta,
                // placeholder until the outlier cut fixes the final set
                classification: Classification::NonProblematic,
            });
        }

        funnel.unique_cars = cars.len();
        if funnel.unresolved_references > 0 {
            warn!(
                unresolved = funnel.unresolved_references,
                "previous-rental references did not resolve"
            );
        }

        // Outlier cutoff over eligible events with a positive previous delay.
        let positive_delays: Vec<f64> = candidates
            .iter()
            .map(|e| e.delay_of_previous)
            .filter(|&d| d > 0.0)
            .collect();
        funnel.outlier_cutoff = outliers
            .statistic
            .compute(&positive_delays)
            .map(|anchor| anchor * outliers.multiplier);

        let mut events: Vec<EligibleEvent> = match funnel.outlier_cutoff {
            Some(cutoff) => candidates
                .into_iter()
                .filter(|e| e.delay_of_previous < cutoff)
                .collect(),
            None => candidates,
        };
        funnel.retained = events.len();
        funnel.delay_outliers_excluded = funnel.eligible - funnel.retained;

        for event in &mut events {
            event.classification = super::classify(event.delay_of_previous, event.delta);
            match event.classification {
                Classification::Problematic => funnel.problematic += 1,
                Classification::NonProblematic => funnel.non_problematic += 1,
                Classification::ReturnedEarly => funnel.returned_early += 1,
            }
        }

        Snapshot { events, funnel }
    }
}
