//! Distribution statistics
//!
//! Small numeric helpers shared by the snapshot's outlier cut and the
//! report's general-statistics section: summaries, order statistics, and
//! fixed-width histogram bins.

use serde::Serialize;

/// Five-number-ish summary of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

/// One fixed-width histogram bin over `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
    /// Share of the *binned* samples, in percent.
    pub percent: f64,
}

/// Summarize a sample; `None` for an empty one.
pub fn summarize(values: &[f64]) -> Option<DistributionSummary> {
    if values.is_empty() {
        return None;
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    Some(DistributionSummary {
        count: values.len(),
        min,
        max,
        mean: sum / values.len() as f64,
        median: median(values)?,
    })
}

/// Median of a sample; `None` for an empty one.
pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

/// Percentile by linear interpolation between closest ranks.
///
/// `p` is clamped to `[0, 100]`. `None` for an empty sample.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let p = p.clamp(0.0, 100.0);
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let weight = rank - lo as f64;
    Some(sorted[lo] * (1.0 - weight) + sorted[hi] * weight)
}

/// Bin `values` into fixed-width buckets over `[start, end)`.
///
/// Samples outside the range are ignored. Percentages are relative to the
/// samples that landed in a bin, not the full input.
pub fn histogram(values: &[f64], start: f64, end: f64, width: f64) -> Vec<HistogramBin> {
    if width <= 0.0 || end <= start {
        return Vec::new();
    }
    let bin_count = ((end - start) / width).ceil() as usize;
    let mut counts = vec![0usize; bin_count];
    let mut binned = 0usize;

    for &v in values {
        if v < start || v >= end {
            continue;
        }
        let idx = (((v - start) / width) as usize).min(bin_count - 1);
        counts[idx] += 1;
        binned += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let bin_start = start + i as f64 * width;
            HistogramBin {
                start: bin_start,
                end: (bin_start + width).min(end),
                count,
                percent: if binned == 0 {
                    0.0
                } else {
                    count as f64 / binned as f64 * 100.0
                },
            }
        })
        .collect()
}
