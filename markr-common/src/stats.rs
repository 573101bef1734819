//! Descriptive statistics over score sequences
//!
//! Every function returns `None` for an empty slice. Results are computed in a
//! fixed order (left-to-right summation, interpolation on the sorted copy) so the
//! same input always yields bit-identical output.

use serde::Serialize;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let total: f64 = values.iter().sum();
    Some(total / values.len() as f64)
}

/// Population standard deviation (divides by N, not N-1)
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let squared: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((squared / values.len() as f64).sqrt())
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Percentile by linear interpolation between closest ranks
///
/// `q` is on the 0-100 scale. With `pos = (n - 1) * q / 100`, the result
/// interpolates between the sorted values at `floor(pos)` and `floor(pos) + 1`.
/// Returns `None` for an empty slice or `q` outside `[0, 100]`.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(percentile_of_sorted(&sorted, q))
}

fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    let position = ((sorted.len() - 1) as f64 * q) / 100.0;
    let base = position.floor() as usize;
    let rest = position - base as f64;
    match sorted.get(base + 1) {
        Some(next) => sorted[base] + rest * (next - sorted[base]),
        None => sorted[base],
    }
}

/// Summary statistics of a test's percentage scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub count: usize,
}

impl AggregateSummary {
    /// Summarize a score sequence; `None` when there are no observations
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let mut sorted = scores.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            mean: mean(scores)?,
            stddev: std_dev(scores)?,
            min: min(scores)?,
            max: max(scores)?,
            p25: percentile_of_sorted(&sorted, 25.0),
            p50: percentile_of_sorted(&sorted, 50.0),
            p75: percentile_of_sorted(&sorted, 75.0),
            count: scores.len(),
        })
    }
}
