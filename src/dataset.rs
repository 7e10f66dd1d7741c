//! The load-once survey dataset handle.
//!
//! A [`SurveyDataset`] is built once at startup and passed by reference to
//! every aggregation call. It is never mutated after loading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::parser::{RejectedRow, SurveyResponse, parse_survey};
use crate::period::{Period, filter_period};

#[derive(Debug)]
pub struct SurveyDataset {
    stores: Vec<String>,
    responses: Vec<SurveyResponse>,
    rejected: Vec<RejectedRow>,
}

impl SurveyDataset {
    /// Loads and validates the survey CSV at `path` against the known `stores`.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path, stores: &[String]) -> crate::error::Result<Self> {
        let file = File::open(path)?;
        let dataset = Self::from_reader(file, stores)?;
        info!(
            responses = dataset.responses.len(),
            rejected = dataset.rejected.len(),
            "Survey dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R, stores: &[String]) -> crate::error::Result<Self> {
        let parsed = parse_survey(reader, stores)?;
        Ok(Self::from_parts(stores.to_vec(), parsed.responses, parsed.rejected))
    }

    pub fn from_parts(
        stores: Vec<String>,
        responses: Vec<SurveyResponse>,
        rejected: Vec<RejectedRow>,
    ) -> Self {
        Self {
            stores,
            responses,
            rejected,
        }
    }

    pub fn stores(&self) -> &[String] {
        &self.stores
    }

    pub fn responses(&self) -> &[SurveyResponse] {
        &self.responses
    }

    /// Rows refused during loading, in file order.
    pub fn rejected(&self) -> &[RejectedRow] {
        &self.rejected
    }

    /// All of a store's responses, regardless of period.
    pub fn for_store(&self, store: &str) -> Vec<&SurveyResponse> {
        self.responses.iter().filter(|r| r.store == store).collect()
    }

    pub fn for_period(&self, period: Period) -> Vec<&SurveyResponse> {
        filter_period(&self.responses, period)
    }

    pub fn for_store_period(&self, store: &str, period: Period) -> Vec<&SurveyResponse> {
        self.for_period(period)
            .into_iter()
            .filter(|r| r.store == store)
            .collect()
    }
}
