//! Calendar-month reporting periods and the period filter.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::parser::SurveyResponse;

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The calendar month immediately after this one.
    pub const fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Whether `timestamp` falls inside this month.
    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        timestamp.year() == self.year && timestamp.month() == self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("period {s:?} is not YYYY-MM"))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(format!("period {s:?} is not YYYY-MM"));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| format!("period {s:?} has a non-numeric year"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("period {s:?} has a non-numeric month"))?;
        Period::new(year, month).ok_or_else(|| format!("period {s:?} has month out of range"))
    }
}

impl TryFrom<String> for Period {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.to_string()
    }
}

/// Returns the responses whose timestamp falls in `period`, in dataset order.
pub fn filter_period(responses: &[SurveyResponse], period: Period) -> Vec<&SurveyResponse> {
    responses
        .iter()
        .filter(|r| period.contains(&r.timestamp))
        .collect()
}
