use serde::Serialize;

use crate::analyzers::reuse::{ReuseComparison, compare_reuse};
use crate::analyzers::types::{MetricDelta, StorePeriodAggregate};
use crate::error::{AnalyticsError, Result};

/// Period-over-period change of the two composite indices for one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexDeltas {
    pub satisfaction: MetricDelta,
    pub ncsi: MetricDelta,
}

/// Signed `later - earlier` for both indices. Negative values are declines and
/// are never clamped.
pub fn compare_indices(earlier: &StorePeriodAggregate, later: &StorePeriodAggregate) -> IndexDeltas {
    debug_assert_eq!(earlier.store, later.store);
    debug_assert!(earlier.period < later.period);

    IndexDeltas {
        satisfaction: MetricDelta::new(earlier.satisfaction.score, later.satisfaction.score),
        ncsi: MetricDelta::new(earlier.ncsi.score, later.ncsi.score),
    }
}

/// Reuse-rate comparison between two aggregates of the same store.
///
/// A period in which nobody answered the reuse question has no rate, so the
/// comparison fails with [`AnalyticsError::NoReuseAnswers`] instead of
/// reporting 0%.
pub fn compare_reuse_rates(
    earlier: &StorePeriodAggregate,
    later: &StorePeriodAggregate,
    affirmative_label: &str,
) -> Result<ReuseComparison> {
    for aggregate in [earlier, later] {
        if aggregate.reuse.answered == 0 {
            return Err(AnalyticsError::NoReuseAnswers {
                store: aggregate.store.clone(),
                period: aggregate.period,
            });
        }
    }
    compare_reuse(&later.store, &earlier.reuse, &later.reuse, affirmative_label)
}
