//! Data types used by the aggregation pipeline.

use serde::Serialize;

use crate::analyzers::reuse::ReuseDistribution;
use crate::parser::SurveyResponse;
use crate::period::Period;

/// A rated survey question that feeds one of the composite indices.
pub trait Dimension: Copy + std::fmt::Debug + 'static {
    /// Every dimension of this family, in column order.
    const ALL: &'static [Self];

    /// Header of the CSV column holding this rating.
    fn column(self) -> &'static str;

    /// The respondent's 1–7 rating for this dimension.
    fn rating(self, response: &SurveyResponse) -> u8;
}

/// The five service questions averaged into the composite satisfaction score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceDimension {
    StaffService,
    InformationProvision,
    ProductReadiness,
    CheckoutSpeed,
    StoreEnvironment,
}

impl Dimension for ServiceDimension {
    const ALL: &'static [Self] = &[
        ServiceDimension::StaffService,
        ServiceDimension::InformationProvision,
        ServiceDimension::ProductReadiness,
        ServiceDimension::CheckoutSpeed,
        ServiceDimension::StoreEnvironment,
    ];

    fn column(self) -> &'static str {
        match self {
            ServiceDimension::StaffService => "직원 서비스",
            ServiceDimension::InformationProvision => "정보 제공",
            ServiceDimension::ProductReadiness => "상품 준비",
            ServiceDimension::CheckoutSpeed => "신속 결제",
            ServiceDimension::StoreEnvironment => "매장 환경",
        }
    }

    fn rating(self, response: &SurveyResponse) -> u8 {
        response.service[self as usize]
    }
}

/// The three expectation questions averaged into the NCSI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpectationDimension {
    ExpectedQuality,
    PerceivedQuality,
    PerceivedValue,
}

impl Dimension for ExpectationDimension {
    const ALL: &'static [Self] = &[
        ExpectationDimension::ExpectedQuality,
        ExpectationDimension::PerceivedQuality,
        ExpectationDimension::PerceivedValue,
    ];

    fn column(self) -> &'static str {
        match self {
            ExpectationDimension::ExpectedQuality => "고객기대수준",
            ExpectationDimension::PerceivedQuality => "고객인지품질",
            ExpectationDimension::PerceivedValue => "고객인지가치",
        }
    }

    fn rating(self, response: &SurveyResponse) -> u8 {
        response.expectation[self as usize]
    }
}

/// Mean rating of one dimension, raw and on the 0–100 scale.
#[derive(Debug, Clone, Serialize)]
pub struct DimensionScore {
    pub column: &'static str,
    pub raw_mean: f64,
    pub rescaled: f64,
    /// `rescaled` rounded half-to-even, for charts.
    pub score: i64,
}

/// A composite index: per-dimension scores and their combined value.
#[derive(Debug, Clone, Serialize)]
pub struct IndexScore {
    pub dimensions: Vec<DimensionScore>,
    /// Mean of the rescaled dimension means, before rounding.
    pub composite: f64,
    /// `composite` rounded half-to-even.
    pub score: i64,
}

/// Everything computed for one store in one reporting period.
#[derive(Debug, Clone, Serialize)]
pub struct StorePeriodAggregate {
    pub store: String,
    pub period: Period,
    pub respondents: usize,
    pub satisfaction: IndexScore,
    pub ncsi: IndexScore,
    pub reuse: ReuseDistribution,
}

/// An integer metric in both periods and the signed change between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricDelta {
    pub earlier: i64,
    pub later: i64,
    pub delta: i64,
}

impl MetricDelta {
    pub fn new(earlier: i64, later: i64) -> Self {
        Self {
            earlier,
            later,
            delta: later - earlier,
        }
    }
}
