//! Error taxonomy for loading and aggregating survey data.

use thiserror::Error;

use crate::period::Period;

/// Why a single CSV row was refused by validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataQualityError {
    #[error("unrecognized store {0:?}")]
    UnknownStore(String),

    #[error("missing store")]
    MissingStore,

    #[error("missing timestamp")]
    MissingTimestamp,

    #[error("malformed timestamp {0:?}")]
    MalformedTimestamp(String),

    #[error("missing rating for {column}")]
    MissingRating { column: &'static str },

    #[error("non-numeric rating {value:?} for {column}")]
    NonNumericRating { column: &'static str, value: String },

    #[error("rating {value} for {column} is not a whole number")]
    NonIntegralRating { column: &'static str, value: String },

    #[error("rating {value} for {column} is outside 1..=7")]
    RatingOutOfRange { column: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("data quality error on line {line}: {source}")]
    DataQuality {
        line: usize,
        #[source]
        source: DataQualityError,
    },

    #[error("no respondents for store {store:?} in {period}")]
    EmptyAggregate { store: String, period: Period },

    #[error("no reuse-intent answers for store {store:?} in {period}")]
    NoReuseAnswers { store: String, period: Period },

    #[error("reuse-intent label {label:?} never appears for store {store:?} in either period")]
    MissingCategory { label: String, store: String },

    #[error("input is missing column {0:?}")]
    MissingColumn(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("workbook error: {0}")]
    Workbook(String),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
