use crate::analyzers::reuse::reuse_distribution;
use crate::analyzers::types::{
    Dimension, DimensionScore, ExpectationDimension, IndexScore, ServiceDimension,
    StorePeriodAggregate,
};
use crate::analyzers::utility::{mean, rescale, round_half_even};
use crate::dataset::SurveyDataset;
use crate::error::{AnalyticsError, Result};
use crate::parser::SurveyResponse;
use crate::period::Period;
use tracing::debug;

/// Combines the dimensions of family `D` into one 0–100 index.
///
/// Per-dimension mean, then rescale, then the mean of the rescaled values,
/// and only then rounding. Returns `None` when there are no responses.
pub fn index_score<D: Dimension>(responses: &[&SurveyResponse]) -> Option<IndexScore> {
    if responses.is_empty() {
        return None;
    }

    let mut dimensions = Vec::with_capacity(D::ALL.len());
    for dim in D::ALL {
        let ratings: Vec<f64> = responses.iter().map(|r| dim.rating(r) as f64).collect();
        let raw_mean = mean(&ratings)?;
        let rescaled = rescale(raw_mean);
        dimensions.push(DimensionScore {
            column: dim.column(),
            raw_mean,
            rescaled,
            score: round_half_even(rescaled),
        });
    }

    let rescaled: Vec<f64> = dimensions.iter().map(|d| d.rescaled).collect();
    let composite = mean(&rescaled)?;

    Some(IndexScore {
        dimensions,
        composite,
        score: round_half_even(composite),
    })
}

/// Composite satisfaction over the five service dimensions.
pub fn composite_satisfaction(
    store: &str,
    period: Period,
    responses: &[&SurveyResponse],
) -> Result<IndexScore> {
    index_score::<ServiceDimension>(responses).ok_or_else(|| empty(store, period))
}

/// NCSI over the three expectation dimensions.
pub fn ncsi(store: &str, period: Period, responses: &[&SurveyResponse]) -> Result<IndexScore> {
    index_score::<ExpectationDimension>(responses).ok_or_else(|| empty(store, period))
}

/// Aggregates one store in one period.
///
/// Fails with [`AnalyticsError::EmptyAggregate`] when the store has no
/// respondents in `period`.
pub fn aggregate_store_period(
    dataset: &SurveyDataset,
    store: &str,
    period: Period,
) -> Result<StorePeriodAggregate> {
    let rows = dataset.for_store_period(store, period);
    let satisfaction = composite_satisfaction(store, period, &rows)?;
    let ncsi = ncsi(store, period, &rows)?;
    let reuse = reuse_distribution(&rows);

    debug!(
        store,
        %period,
        respondents = rows.len(),
        satisfaction = satisfaction.score,
        ncsi = ncsi.score,
        "Store period aggregated"
    );

    Ok(StorePeriodAggregate {
        store: store.to_string(),
        period,
        respondents: rows.len(),
        satisfaction,
        ncsi,
        reuse,
    })
}

fn empty(store: &str, period: Period) -> AnalyticsError {
    AnalyticsError::EmptyAggregate {
        store: store.to_string(),
        period,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::response;

    fn april() -> Period {
        "2024-04".parse().unwrap()
    }

    fn may() -> Period {
        "2024-05".parse().unwrap()
    }

    #[test]
    fn test_all_sevens_scores_one_hundred() {
        let rows: Vec<_> = (0..3)
            .map(|_| response("A", "2024-04-10 12:00:00", 7, 7))
            .collect();
        let refs: Vec<_> = rows.iter().collect();

        let score = composite_satisfaction("A", april(), &refs).unwrap();
        assert_eq!(score.score, 100);
        assert_eq!(score.composite, 100.0);
        assert!(score.dimensions.iter().all(|d| d.rescaled == 100.0));
        assert_eq!(ncsi("A", april(), &refs).unwrap().score, 100);
    }

    #[test]
    fn test_all_ones_scores_fourteen() {
        let rows: Vec<_> = (0..3)
            .map(|_| response("A", "2024-05-10 12:00:00", 1, 1))
            .collect();
        let refs: Vec<_> = rows.iter().collect();

        let score = composite_satisfaction("A", may(), &refs).unwrap();
        assert_eq!(score.score, 14);
        assert!((score.composite - 100.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_rounding_happens_after_combining() {
        // Dimension means 4,4,4,4,5 rescale to 57.14 x4 and 71.43.
        // Rounding each first gives (57*4 + 71) / 5 = 59.8; combining first gives 60.0.
        let mut r = response("A", "2024-04-10 12:00:00", 4, 4);
        r.service = [4, 4, 4, 4, 5];
        let refs = vec![&r];

        let score = composite_satisfaction("A", april(), &refs).unwrap();
        assert!((score.composite - 60.0).abs() < 1e-9);
        assert_eq!(score.score, 60);
        assert_eq!(score.dimensions[4].score, 71);
    }

    #[test]
    fn test_per_dimension_means_use_dimension_columns() {
        let mut a = response("A", "2024-04-10 12:00:00", 7, 7);
        let mut b = response("A", "2024-04-11 12:00:00", 7, 7);
        a.expectation = [7, 6, 5];
        b.expectation = [5, 6, 7];
        let refs = vec![&a, &b];

        let score = ncsi("A", april(), &refs).unwrap();
        assert_eq!(score.dimensions.len(), 3);
        assert_eq!(score.dimensions[0].column, "고객기대수준");
        assert!(score.dimensions.iter().all(|d| d.raw_mean == 6.0));
        assert_eq!(score.score, 86);
    }

    #[test]
    fn test_scores_stay_within_bounds() {
        for service in 1..=7 {
            let rows = vec![response("A", "2024-04-10 12:00:00", service, 8 - service)];
            let refs: Vec<_> = rows.iter().collect();
            let s = composite_satisfaction("A", april(), &refs).unwrap().score;
            let n = ncsi("A", april(), &refs).unwrap().score;
            assert!((0..=100).contains(&s));
            assert!((0..=100).contains(&n));
        }
    }

    #[test]
    fn test_empty_input_is_an_error_not_zero() {
        let err = composite_satisfaction("A", april(), &[]).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::EmptyAggregate { ref store, period } if store == "A" && period == april()
        ));
        assert!(ncsi("A", april(), &[]).is_err());
    }

    #[test]
    fn test_aggregate_store_period_filters_store_and_month() {
        let dataset = SurveyDataset::from_parts(
            vec!["A".to_string(), "B".to_string()],
            vec![
                response("A", "2024-04-10 12:00:00", 7, 7),
                response("A", "2024-05-10 12:00:00", 1, 1),
                response("B", "2024-04-10 12:00:00", 1, 1),
            ],
            vec![],
        );

        let agg = aggregate_store_period(&dataset, "A", april()).unwrap();
        assert_eq!(agg.respondents, 1);
        assert_eq!(agg.satisfaction.score, 100);

        let missing = aggregate_store_period(&dataset, "B", may());
        assert!(matches!(missing, Err(AnalyticsError::EmptyAggregate { .. })));
    }
}
