//! Reuse-intent distributions and the reuse-rate comparison.

use serde::Serialize;

use crate::analyzers::types::MetricDelta;
use crate::analyzers::utility::{pct, round_half_even};
use crate::error::{AnalyticsError, Result};
use crate::parser::SurveyResponse;

/// Share of respondents who gave one reuse-intent answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReuseShare {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

/// Frequency of each reuse-intent answer among respondents who answered.
///
/// Shares are ordered by count descending, ties by first appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReuseDistribution {
    pub answered: usize,
    pub unanswered: usize,
    pub shares: Vec<ReuseShare>,
}

impl ReuseDistribution {
    pub fn percent(&self, label: &str) -> Option<f64> {
        self.shares
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.percent)
    }

    pub fn total_percent(&self) -> f64 {
        self.shares.iter().map(|s| s.percent).sum()
    }
}

/// Builds the distribution of reuse-intent answers. Missing answers are left
/// out of the denominator.
pub fn reuse_distribution(responses: &[&SurveyResponse]) -> ReuseDistribution {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut unanswered = 0;

    for r in responses {
        match &r.reuse_intent {
            None => unanswered += 1,
            Some(label) => match counts.iter_mut().find(|(l, _)| l == label) {
                Some((_, n)) => *n += 1,
                None => counts.push((label.clone(), 1)),
            },
        }
    }

    let answered: usize = counts.iter().map(|(_, n)| n).sum();
    // stable sort keeps first-appearance order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let shares = counts
        .into_iter()
        .map(|(label, count)| ReuseShare {
            percent: pct(count, answered).unwrap_or(0.0),
            label,
            count,
        })
        .collect();

    ReuseDistribution {
        answered,
        unanswered,
        shares,
    }
}

/// One answer label compared across both periods. Absent labels count as 0%.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReuseComparisonRow {
    pub label: String,
    pub earlier: f64,
    pub later: f64,
    pub delta: f64,
}

/// Outer join of both periods' distributions plus the affirmative answer's rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReuseComparison {
    pub rows: Vec<ReuseComparisonRow>,
    pub affirmative: ReuseComparisonRow,
}

impl ReuseComparison {
    /// The affirmative rate rounded half-to-even for display, with its delta.
    pub fn rate(&self) -> MetricDelta {
        MetricDelta::new(
            round_half_even(self.affirmative.earlier),
            round_half_even(self.affirmative.later),
        )
    }
}

/// Compares reuse intent between two periods for `store`.
///
/// A label present in one period only is treated as 0% in the other. If the
/// affirmative label never appears in either period the comparison fails with
/// [`AnalyticsError::MissingCategory`] rather than reporting 0%.
pub fn compare_reuse(
    store: &str,
    earlier: &ReuseDistribution,
    later: &ReuseDistribution,
    affirmative_label: &str,
) -> Result<ReuseComparison> {
    let mut labels: Vec<&str> = Vec::new();
    for share in earlier.shares.iter().chain(later.shares.iter()) {
        if !labels.contains(&share.label.as_str()) {
            labels.push(share.label.as_str());
        }
    }

    let rows: Vec<ReuseComparisonRow> = labels
        .into_iter()
        .map(|label| {
            let e = earlier.percent(label).unwrap_or(0.0);
            let l = later.percent(label).unwrap_or(0.0);
            ReuseComparisonRow {
                label: label.to_string(),
                earlier: e,
                later: l,
                delta: l - e,
            }
        })
        .collect();

    let affirmative = rows
        .iter()
        .find(|row| row.label == affirmative_label)
        .cloned()
        .ok_or_else(|| AnalyticsError::MissingCategory {
            label: affirmative_label.to_string(),
            store: store.to_string(),
        })?;

    Ok(ReuseComparison { rows, affirmative })
}
