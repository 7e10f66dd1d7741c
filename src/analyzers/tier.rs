use serde::Serialize;

use crate::parser::SurveyResponse;

/// Ordinal bucket of an expected-quality rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ExpectationTier {
    Low,
    Mid,
    High,
}

/// Maps a 1–7 expectation score to its tier.
///
/// | Score | Tier |
/// |-------|------|
/// | 1–4   | Low  |
/// | 5     | Mid  |
/// | 6–7   | High |
///
/// Returns `None` for scores outside the scale.
pub fn classify(score: u8) -> Option<ExpectationTier> {
    match score {
        1..=4 => Some(ExpectationTier::Low),
        5 => Some(ExpectationTier::Mid),
        6..=7 => Some(ExpectationTier::High),
        _ => None,
    }
}

/// Respondent counts per expected-quality tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierDistribution {
    pub low: usize,
    pub mid: usize,
    pub high: usize,
}

impl TierDistribution {
    pub fn total(&self) -> usize {
        self.low + self.mid + self.high
    }
}

pub fn tier_distribution(responses: &[&SurveyResponse]) -> TierDistribution {
    let mut d = TierDistribution::default();
    for r in responses {
        match classify(r.expected_quality()) {
            Some(ExpectationTier::Low) => d.low += 1,
            Some(ExpectationTier::Mid) => d.mid += 1,
            Some(ExpectationTier::High) => d.high += 1,
            None => {}
        }
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::response;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(classify(1), Some(ExpectationTier::Low));
        assert_eq!(classify(4), Some(ExpectationTier::Low));
        assert_eq!(classify(5), Some(ExpectationTier::Mid));
        assert_eq!(classify(6), Some(ExpectationTier::High));
        assert_eq!(classify(7), Some(ExpectationTier::High));
        assert_eq!(classify(0), None);
        assert_eq!(classify(8), None);
    }

    #[test]
    fn test_distribution_uses_expected_quality_only() {
        let mut a = response("A", "2024-05-01", 7, 7);
        a.expectation = [2, 7, 7];
        let b = response("A", "2024-05-02", 7, 5);
        let c = response("A", "2024-05-03", 7, 6);
        let d = response("A", "2024-05-04", 7, 4);

        let dist = tier_distribution(&[&a, &b, &c, &d]);
        assert_eq!(dist, TierDistribution { low: 2, mid: 1, high: 1 });
        assert_eq!(dist.total(), 4);
    }
}
