//! Aggregate statistics for a test
//!
//! Scores are percentages (`obtained / available * 100`). Rows with no available
//! marks have no meaningful percentage and are left out of every statistic,
//! including `count`.

use markr_common::db::{ResultStore, ScorePair};
use markr_common::stats::AggregateSummary;
use markr_common::Result;
use tracing::warn;

/// Percentage score of one stored result, `None` when no marks were available
pub fn percentage(pair: &ScorePair) -> Option<f64> {
    if pair.marks_available <= 0 {
        return None;
    }
    Some((pair.marks_obtained as f64 / pair.marks_available as f64) * 100.0)
}

/// Summarize a test's stored results; `None` when there are no scores
pub async fn aggregate_results(store: &ResultStore, test_id: i64) -> Result<Option<AggregateSummary>> {
    let pairs = store.get_results_by_test(test_id).await?;
    let scores: Vec<f64> = pairs.iter().filter_map(percentage).collect();

    let excluded = pairs.len() - scores.len();
    if excluded > 0 {
        warn!(test_id, excluded, "Skipped results with no available marks");
    }

    Ok(AggregateSummary::from_scores(&scores))
}
