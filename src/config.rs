//! Report configuration: which stores exist, which two months are compared,
//! and which reuse-intent answer counts as "yes".

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalyticsError, Result};
use crate::period::Period;

const DEFAULT_EARLIER: Period = match Period::new(2024, 4) {
    Some(p) => p,
    None => panic!("invalid default period"),
};
const DEFAULT_LATER: Period = DEFAULT_EARLIER.next();

/// Stored as a JSON object on disk; any field may be omitted:
/// ```json
/// {
///   "stores": ["명동점", "인천공항점", "부산점"],
///   "earlier_period": "2024-04",
///   "later_period": "2024-05",
///   "affirmative_label": "예."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurveyConfig {
    pub stores: Vec<String>,
    pub earlier_period: Period,
    pub later_period: Period,
    pub affirmative_label: String,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            stores: vec![
                "명동점".to_string(),
                "인천공항점".to_string(),
                "부산점".to_string(),
            ],
            earlier_period: DEFAULT_EARLIER,
            later_period: DEFAULT_LATER,
            affirmative_label: "예.".to_string(),
        }
    }
}

impl SurveyConfig {
    /// Loads the config from a JSON file at `path` and validates it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SurveyConfig = serde_json::from_str(&content)?;
        debug!(path = %path.display(), ?config, "Configuration loaded");
        config.validate()?;
        Ok(config)
    }

    /// Both periods, earlier first.
    pub fn periods(&self) -> [Period; 2] {
        [self.earlier_period, self.later_period]
    }

    pub fn validate(&self) -> Result<()> {
        if self.stores.is_empty() {
            return Err(AnalyticsError::Config("store list is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for store in &self.stores {
            if store.trim().is_empty() {
                return Err(AnalyticsError::Config("store name is blank".to_string()));
            }
            if !seen.insert(store.as_str()) {
                return Err(AnalyticsError::Config(format!(
                    "store {store:?} is listed twice"
                )));
            }
        }
        if self.earlier_period.next() != self.later_period {
            return Err(AnalyticsError::Config(format!(
                "later period {} must be the month right after {}",
                self.later_period, self.earlier_period
            )));
        }
        if self.affirmative_label.trim().is_empty() {
            return Err(AnalyticsError::Config(
                "affirmative reuse label is blank".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_default_is_valid() {
        let config = SurveyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stores.len(), 3);
        assert_eq!(config.periods()[0].to_string(), "2024-04");
        assert_eq!(config.periods()[1].to_string(), "2024-05");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = temp_path("store_satisfaction_test_partial_config.json");
        fs::write(&path, r#"{"stores": ["A", "B"]}"#).unwrap();

        let config = SurveyConfig::load(&path).unwrap();
        assert_eq!(config.stores, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(config.affirmative_label, "예.");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_non_consecutive_periods_are_rejected() {
        let config = SurveyConfig {
            later_period: "2024-06".parse().unwrap(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AnalyticsError::Config(_))));
    }

    #[test]
    fn test_duplicate_store_is_rejected() {
        let config = SurveyConfig {
            stores: vec!["A".to_string(), "A".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let path = temp_path("store_satisfaction_test_unknown_config.json");
        fs::write(&path, r#"{"shops": ["A"]}"#).unwrap();

        assert!(matches!(SurveyConfig::load(&path), Err(AnalyticsError::Json(_))));

        fs::remove_file(&path).unwrap();
    }
}
