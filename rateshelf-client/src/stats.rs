//! Aggregate statistics over a collection's ratings

use rateshelf_common::Rating;
use serde::Serialize;

/// Summary of a rating list; every field is zero for an empty list
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub mean: f64,
    pub median: f64,
    pub highest: f64,
    pub lowest: f64,
}

/// Compute statistics over the full (unfiltered) list
pub fn compute(ratings: &[Rating]) -> Stats {
    let mut scores: Vec<f64> = ratings.iter().map(|r| r.rating).collect();
    if scores.is_empty() {
        return Stats::default();
    }

    scores.sort_by(f64::total_cmp);
    let total = scores.len();
    let highest = scores[total - 1];
    let lowest = scores[0];
    // Summation rounding can land just outside the observed range
    let mean = (scores.iter().sum::<f64>() / total as f64).clamp(lowest, highest);
    let median = if total % 2 == 0 {
        (scores[total / 2 - 1] + scores[total / 2]) / 2.0
    } else {
        scores[total / 2]
    };

    Stats {
        total,
        mean,
        median,
        highest,
        lowest,
    }
}
