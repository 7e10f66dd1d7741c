//! CSV parser and row validation for survey exports.

use std::io::Read;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::analyzers::types::{Dimension, ExpectationDimension, ServiceDimension};
use crate::error::{AnalyticsError, DataQualityError, Result};

pub const STORE_COLUMN: &str = "점포";
pub const TIMESTAMP_COLUMN: &str = "시작일시";
pub const REUSE_INTENT_COLUMN: &str = "재이용의향률";

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// One row as it appears in the CSV, before validation.
#[derive(Debug, Deserialize)]
struct RawSurveyRow {
    #[serde(rename = "점포")]
    store: Option<String>,
    #[serde(rename = "시작일시")]
    timestamp: Option<String>,

    #[serde(rename = "직원 서비스")]
    staff_service: Option<String>,
    #[serde(rename = "정보 제공")]
    information_provision: Option<String>,
    #[serde(rename = "상품 준비")]
    product_readiness: Option<String>,
    #[serde(rename = "신속 결제")]
    checkout_speed: Option<String>,
    #[serde(rename = "매장 환경")]
    store_environment: Option<String>,

    #[serde(rename = "고객기대수준")]
    expected_quality: Option<String>,
    #[serde(rename = "고객인지품질")]
    perceived_quality: Option<String>,
    #[serde(rename = "고객인지가치")]
    perceived_value: Option<String>,

    #[serde(rename = "재이용의향률")]
    reuse_intent: Option<String>,
    #[serde(rename = "낮은 기대수준 이유")]
    low_expectation_reason: Option<String>,
    #[serde(rename = "추가 의견")]
    comment: Option<String>,
}

/// A validated respondent. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyResponse {
    /// Line of the source CSV this row came from (header is line 1).
    pub line: usize,
    pub store: String,
    pub timestamp: NaiveDateTime,
    /// Indexed by [`ServiceDimension`].
    pub service: [u8; 5],
    /// Indexed by [`ExpectationDimension`].
    pub expectation: [u8; 3],
    pub reuse_intent: Option<String>,
    pub low_expectation_reason: Option<String>,
    pub comment: Option<String>,
}

impl SurveyResponse {
    pub fn expected_quality(&self) -> u8 {
        ExpectationDimension::ExpectedQuality.rating(self)
    }
}

/// A row refused by validation, kept for the rejected-rows report.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub line: usize,
    pub store: Option<String>,
    pub error: DataQualityError,
}

/// Result of parsing a whole export: accepted and rejected rows.
#[derive(Debug, Default)]
pub struct ParsedSurvey {
    pub responses: Vec<SurveyResponse>,
    pub rejected: Vec<RejectedRow>,
}

/// Reads a survey export, validating every row against the known `stores`.
///
/// Structural problems (unreadable file, missing header column) fail the
/// whole parse. Row-level problems are collected into
/// [`ParsedSurvey::rejected`]. Short rows are read with their missing trailing
/// fields left empty.
pub fn parse_survey<R: Read>(reader: R, stores: &[String]) -> Result<ParsedSurvey> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    debug!(columns = headers.len(), "Survey header read");
    check_columns(&headers)?;

    let mut parsed = ParsedSurvey::default();

    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        let raw: RawSurveyRow = record.deserialize(Some(&headers))?;

        match validate_row(raw, line, stores) {
            Ok(response) => parsed.responses.push(response),
            Err(rejected) => {
                warn!(line, store = ?rejected.store, error = %rejected.error, "Rejected survey row");
                parsed.rejected.push(rejected);
            }
        }
    }

    info!(
        accepted = parsed.responses.len(),
        rejected = parsed.rejected.len(),
        "Survey parsed"
    );
    Ok(parsed)
}

/// Every analytic column must be present; the free-text columns may be absent.
fn check_columns(headers: &csv::StringRecord) -> Result<()> {
    let required = [STORE_COLUMN, TIMESTAMP_COLUMN, REUSE_INTENT_COLUMN]
        .into_iter()
        .chain(ServiceDimension::ALL.iter().map(|d| d.column()))
        .chain(ExpectationDimension::ALL.iter().map(|d| d.column()));
    for column in required {
        if !headers.iter().any(|h| h == column) {
            return Err(AnalyticsError::MissingColumn(column.to_string()));
        }
    }
    Ok(())
}

fn validate_row(
    raw: RawSurveyRow,
    line: usize,
    stores: &[String],
) -> std::result::Result<SurveyResponse, RejectedRow> {
    let store = non_empty(raw.store);
    let reject = |error| RejectedRow {
        line,
        store: store.clone(),
        error,
    };

    let known_store = match &store {
        None => return Err(reject(DataQualityError::MissingStore)),
        Some(s) if !stores.iter().any(|known| known == s) => {
            return Err(reject(DataQualityError::UnknownStore(s.clone())));
        }
        Some(s) => s.clone(),
    };

    let timestamp = match non_empty(raw.timestamp) {
        None => return Err(reject(DataQualityError::MissingTimestamp)),
        Some(t) => parse_timestamp(&t).map_err(reject)?,
    };

    let service_values = [
        raw.staff_service,
        raw.information_provision,
        raw.product_readiness,
        raw.checkout_speed,
        raw.store_environment,
    ];
    let mut service = [0u8; 5];
    for (dim, value) in ServiceDimension::ALL.iter().zip(service_values) {
        service[*dim as usize] = parse_rating(dim.column(), value.as_deref()).map_err(reject)?;
    }

    let expectation_values = [raw.expected_quality, raw.perceived_quality, raw.perceived_value];
    let mut expectation = [0u8; 3];
    for (dim, value) in ExpectationDimension::ALL.iter().zip(expectation_values) {
        expectation[*dim as usize] =
            parse_rating(dim.column(), value.as_deref()).map_err(reject)?;
    }

    Ok(SurveyResponse {
        line,
        store: known_store,
        timestamp,
        service,
        expectation,
        reuse_intent: non_empty(raw.reuse_intent),
        low_expectation_reason: non_empty(raw.low_expectation_reason),
        comment: non_empty(raw.comment),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parses a survey timestamp. Date-only values land at midnight.
pub fn parse_timestamp(value: &str) -> std::result::Result<NaiveDateTime, DataQualityError> {
    let value = value.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| DataQualityError::MalformedTimestamp(value.to_string()))
}

/// Parses a 1–7 rating. Integral floats such as `6.0` are accepted.
pub fn parse_rating(
    column: &'static str,
    value: Option<&str>,
) -> std::result::Result<u8, DataQualityError> {
    let value = match value.map(str::trim) {
        None | Some("") => return Err(DataQualityError::MissingRating { column }),
        Some(v) => v,
    };
    let number: f64 = value
        .parse()
        .ok()
        .filter(|n: &f64| n.is_finite())
        .ok_or_else(|| DataQualityError::NonNumericRating {
            column,
            value: value.to_string(),
        })?;
    if number.fract() != 0.0 {
        return Err(DataQualityError::NonIntegralRating {
            column,
            value: value.to_string(),
        });
    }
    if !(1.0..=7.0).contains(&number) {
        return Err(DataQualityError::RatingOutOfRange {
            column,
            value: value.to_string(),
        });
    }
    Ok(number as u8)
}
