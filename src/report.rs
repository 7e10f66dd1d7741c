//! Dashboard assembly and Markdown rendering.
//!
//! Each store/period computation can fail independently. Failures are kept as
//! explicit "no data" or "data error" states on the affected metric instead of
//! aborting the whole report or showing a misleading zero.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::analyzers::aggregate::aggregate_store_period;
use crate::analyzers::comments::{
    ReasonCount, StoreComment, longest_comments, low_expectation_reasons,
};
use crate::analyzers::compare::{compare_indices, compare_reuse_rates};
use crate::analyzers::reuse::ReuseComparisonRow;
use crate::analyzers::tier::{TierDistribution, tier_distribution};
use crate::analyzers::types::{IndexScore, MetricDelta, StorePeriodAggregate};
use crate::config::SurveyConfig;
use crate::dataset::SurveyDataset;
use crate::error::AnalyticsError;
use crate::period::Period;

/// A dashboard value, or the reason it cannot be shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum Metric<T> {
    Value(T),
    NoData(String),
    DataError(String),
}

impl<T> Metric<T> {
    pub fn from_error(err: &AnalyticsError) -> Self {
        match err {
            AnalyticsError::EmptyAggregate { .. } | AnalyticsError::NoReuseAnswers { .. } => {
                Metric::NoData(err.to_string())
            }
            _ => Metric::DataError(err.to_string()),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Metric::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// One dimension's 0–100 score in both periods; `None` where the period has no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionRow {
    pub column: &'static str,
    pub earlier: Option<i64>,
    pub later: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreSection {
    pub store: String,
    pub earlier_responses: usize,
    pub later_responses: usize,
    pub satisfaction: Metric<MetricDelta>,
    pub ncsi: Metric<MetricDelta>,
    pub reuse_rate: Metric<MetricDelta>,
    pub reuse_table: Vec<ReuseComparisonRow>,
    pub service_dimensions: Vec<DimensionRow>,
    pub expectation_dimensions: Vec<DimensionRow>,
    /// Expected-quality tiers in the later period.
    pub tiers: TierDistribution,
    pub low_expectation_reasons: Vec<ReasonCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub generated_at: DateTime<Utc>,
    pub earlier_period: Period,
    pub later_period: Period,
    pub accepted_rows: usize,
    pub rejected_rows: usize,
    pub stores: Vec<StoreSection>,
    pub longest_comments: Vec<StoreComment>,
}

/// Builds the full dashboard from a loaded dataset.
#[tracing::instrument(skip_all, fields(earlier = %config.earlier_period, later = %config.later_period))]
pub fn build_dashboard(dataset: &SurveyDataset, config: &SurveyConfig) -> Dashboard {
    let stores = config
        .stores
        .iter()
        .map(|store| build_store_section(dataset, config, store))
        .collect();

    let dashboard = Dashboard {
        generated_at: Utc::now(),
        earlier_period: config.earlier_period,
        later_period: config.later_period,
        accepted_rows: dataset.responses().len(),
        rejected_rows: dataset.rejected().len(),
        stores,
        longest_comments: longest_comments(dataset.responses(), &config.stores),
    };
    info!(stores = dashboard.stores.len(), "Dashboard built");
    dashboard
}

fn build_store_section(dataset: &SurveyDataset, config: &SurveyConfig, store: &str) -> StoreSection {
    let earlier = aggregate_store_period(dataset, store, config.earlier_period);
    let later = aggregate_store_period(dataset, store, config.later_period);

    let (satisfaction, ncsi, reuse_rate, reuse_table) = match (&earlier, &later) {
        (Ok(e), Ok(l)) => {
            let deltas = compare_indices(e, l);
            let (reuse_rate, reuse_table) =
                match compare_reuse_rates(e, l, &config.affirmative_label) {
                    Ok(cmp) => (Metric::Value(cmp.rate()), cmp.rows),
                    Err(err) => {
                        warn!(store, error = %err, "Reuse rate unavailable");
                        (Metric::from_error(&err), Vec::new())
                    }
                };
            (
                Metric::Value(deltas.satisfaction),
                Metric::Value(deltas.ncsi),
                reuse_rate,
                reuse_table,
            )
        }
        (Err(err), _) | (_, Err(err)) => {
            warn!(store, error = %err, "Store metrics unavailable");
            (
                Metric::from_error(err),
                Metric::from_error(err),
                Metric::from_error(err),
                Vec::new(),
            )
        }
    };

    let earlier = earlier.ok();
    let later = later.ok();
    let later_rows = dataset.for_store_period(store, config.later_period);

    StoreSection {
        store: store.to_string(),
        earlier_responses: earlier.as_ref().map_or(0, |a| a.respondents),
        later_responses: later_rows.len(),
        satisfaction,
        ncsi,
        reuse_rate,
        reuse_table,
        service_dimensions: dimension_rows(earlier.as_ref(), later.as_ref(), |a| &a.satisfaction),
        expectation_dimensions: dimension_rows(earlier.as_ref(), later.as_ref(), |a| &a.ncsi),
        tiers: tier_distribution(&later_rows),
        low_expectation_reasons: low_expectation_reasons(dataset.responses(), store),
    }
}

fn dimension_rows(
    earlier: Option<&StorePeriodAggregate>,
    later: Option<&StorePeriodAggregate>,
    index: impl Fn(&StorePeriodAggregate) -> &IndexScore,
) -> Vec<DimensionRow> {
    let Some(template) = earlier.or(later) else {
        return Vec::new();
    };
    index(template)
        .dimensions
        .iter()
        .enumerate()
        .map(|(i, d)| DimensionRow {
            column: d.column,
            earlier: earlier.map(|a| index(a).dimensions[i].score),
            later: later.map(|a| index(a).dimensions[i].score),
        })
        .collect()
}

/// Renders the dashboard as Markdown.
pub fn render_markdown(dashboard: &Dashboard) -> String {
    let mut output = String::new();
    let later = dashboard.later_period;
    let earlier = dashboard.earlier_period;

    let _ = writeln!(output, "# Customer Satisfaction {later}");
    let _ = writeln!(
        output,
        "Compared with {earlier}. {} responses accepted, {} rejected. Generated {}.",
        dashboard.accepted_rows,
        dashboard.rejected_rows,
        dashboard.generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Composite Satisfaction");
    for section in &dashboard.stores {
        let _ = writeln!(output, "- {}: {}", section.store, score_text(&section.satisfaction, ""));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## NCSI");
    for section in &dashboard.stores {
        let _ = writeln!(output, "- {}: {}", section.store, score_text(&section.ncsi, ""));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Comments");
    if dashboard.longest_comments.is_empty() {
        let _ = writeln!(output, "No comments recorded.");
    } else {
        for c in &dashboard.longest_comments {
            let _ = writeln!(output, "- {}: {}", c.store, c.comment);
        }
    }

    for section in &dashboard.stores {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "## {} ({} responses in {later})",
            section.store, section.later_responses
        );
        let _ = writeln!(output, "- Composite satisfaction: {}", score_text(&section.satisfaction, ""));
        let _ = writeln!(output, "- NCSI: {}", score_text(&section.ncsi, ""));
        let _ = writeln!(output, "- Reuse intention: {}", score_text(&section.reuse_rate, "%"));

        let tiers = &section.tiers;
        let _ = writeln!(output);
        let _ = writeln!(output, "### Expectation Tiers ({later})");
        if tiers.total() == 0 {
            let _ = writeln!(output, "No responses in this period.");
        } else {
            let _ = writeln!(
                output,
                "- Low: {}\n- Mid: {}\n- High: {}",
                tiers.low, tiers.mid, tiers.high
            );
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "### Low Expectation Reasons");
        if section.low_expectation_reasons.is_empty() {
            let _ = writeln!(output, "No reasons recorded.");
        } else {
            for r in &section.low_expectation_reasons {
                let _ = writeln!(output, "- {} ({})", r.reason, r.count);
            }
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "### Scores by Item");
        if section.service_dimensions.is_empty() {
            let _ = writeln!(output, "No scores available.");
        } else {
            let _ = writeln!(output, "| Item | {earlier} | {later} |");
            let _ = writeln!(output, "|------|------|------|");
            for row in section
                .service_dimensions
                .iter()
                .chain(section.expectation_dimensions.iter())
            {
                let _ = writeln!(
                    output,
                    "| {} | {} | {} |",
                    row.column,
                    optional(row.earlier),
                    optional(row.later)
                );
            }
        }
    }

    output
}

fn score_text(metric: &Metric<MetricDelta>, unit: &str) -> String {
    match metric {
        Metric::Value(m) => format!("{}{unit} ({:+}{unit})", m.later, m.delta),
        Metric::NoData(reason) => format!("no data ({reason})"),
        Metric::DataError(reason) => format!("data error ({reason})"),
    }
}

fn optional(score: Option<i64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::response;

    fn config() -> SurveyConfig {
        SurveyConfig {
            stores: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            affirmative_label: "yes".to_string(),
            ..Default::default()
        }
    }

    fn dataset() -> SurveyDataset {
        let mut rows = Vec::new();
        for day in 1..=3 {
            let mut r = response("A", &format!("2024-04-0{day} 10:00:00"), 7, 7);
            r.reuse_intent = Some("yes".to_string());
            rows.push(r);
            let mut r = response("A", &format!("2024-05-0{day} 10:00:00"), 1, 3);
            r.reuse_intent = Some(if day == 3 { "no" } else { "yes" }.to_string());
            r.low_expectation_reason = Some("price".to_string());
            r.comment = Some(format!("comment {day}{}", "!".repeat(day)));
            rows.push(r);
        }
        // B answered only in May
        rows.push(response("B", "2024-05-04 10:00:00", 5, 5));
        // C answered both months but never with the affirmative label
        let mut c1 = response("C", "2024-04-04 10:00:00", 6, 6);
        c1.reuse_intent = Some("네".to_string());
        let mut c2 = response("C", "2024-05-04 10:00:00", 6, 6);
        c2.reuse_intent = Some("네".to_string());
        rows.push(c1);
        rows.push(c2);
        SurveyDataset::from_parts(config().stores, rows, vec![])
    }

    fn section<'a>(dashboard: &'a Dashboard, store: &str) -> &'a StoreSection {
        dashboard.stores.iter().find(|s| s.store == store).unwrap()
    }

    #[test]
    fn test_store_with_both_periods_has_values() {
        let dashboard = build_dashboard(&dataset(), &config());
        let a = section(&dashboard, "A");

        assert_eq!(a.satisfaction.value(), Some(&MetricDelta::new(100, 14)));
        assert_eq!(a.ncsi.value(), Some(&MetricDelta::new(100, 43)));
        assert_eq!(a.reuse_rate.value(), Some(&MetricDelta::new(100, 67)));
        assert_eq!(a.earlier_responses, 3);
        assert_eq!(a.later_responses, 3);
        assert_eq!(a.tiers, TierDistribution { low: 3, mid: 0, high: 0 });
        assert_eq!(a.low_expectation_reasons[0].count, 3);
        assert_eq!(a.service_dimensions.len(), 5);
        assert_eq!(a.expectation_dimensions[0].earlier, Some(100));
    }

    #[test]
    fn test_missing_period_is_no_data_not_zero() {
        let dashboard = build_dashboard(&dataset(), &config());
        let b = section(&dashboard, "B");

        assert!(matches!(b.satisfaction, Metric::NoData(_)));
        assert!(matches!(b.reuse_rate, Metric::NoData(_)));
        assert_eq!(b.later_responses, 1);
        assert!(b.service_dimensions.iter().all(|d| d.earlier.is_none() && d.later.is_some()));
    }

    #[test]
    fn test_missing_affirmative_label_is_data_error() {
        let dashboard = build_dashboard(&dataset(), &config());
        let c = section(&dashboard, "C");

        assert!(matches!(c.satisfaction, Metric::Value(_)));
        assert!(matches!(c.reuse_rate, Metric::DataError(_)));
        assert!(c.reuse_table.is_empty());
    }

    #[test]
    fn test_blank_reuse_answers_are_no_data_not_zero() {
        let mut april = response("A", "2024-04-01 10:00:00", 6, 6);
        april.reuse_intent = Some("yes".to_string());
        let may = response("A", "2024-05-01 10:00:00", 6, 6);
        let dataset = SurveyDataset::from_parts(config().stores, vec![april, may], vec![]);

        let dashboard = build_dashboard(&dataset, &config());
        let a = section(&dashboard, "A");
        assert!(matches!(a.satisfaction, Metric::Value(_)));
        assert!(matches!(a.reuse_rate, Metric::NoData(_)));
        assert!(a.reuse_table.is_empty());
    }

    #[test]
    fn test_longest_comment_in_dashboard() {
        let dashboard = build_dashboard(&dataset(), &config());
        assert_eq!(dashboard.longest_comments.len(), 1);
        assert_eq!(dashboard.longest_comments[0].comment, "comment 3!!!");
    }

    #[test]
    fn test_render_markdown_sections() {
        let dashboard = build_dashboard(&dataset(), &config());
        let md = render_markdown(&dashboard);

        assert!(md.starts_with("# Customer Satisfaction 2024-05"));
        assert!(md.contains("- A: 14 (-86)"));
        assert!(md.contains("- Reuse intention: 67% (-33%)"));
        assert!(md.contains("- B: no data ("));
        assert!(md.contains("- Reuse intention: data error ("));
        assert!(md.contains("| 직원 서비스 | 100 | 14 |"));
        assert!(md.contains("| 직원 서비스 | - | 71 |"));
    }

    #[test]
    fn test_metric_serializes_with_state_tag() {
        let value: Metric<MetricDelta> = Metric::Value(MetricDelta::new(1, 3));
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["state"], "value");
        assert_eq!(json["detail"]["delta"], 2);

        let none: Metric<MetricDelta> = Metric::NoData("empty".to_string());
        let json = serde_json::to_value(&none).unwrap();
        assert_eq!(json["state"], "no_data");
    }
}
