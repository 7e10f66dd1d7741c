//! Free-text analysis: longest comment per store, comment search and
//! low-expectation reasons.

use serde::Serialize;

use crate::analyzers::tier::{ExpectationTier, classify};
use crate::parser::SurveyResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreComment {
    pub store: String,
    pub line: usize,
    pub comment: String,
}

/// The longest non-empty comment of each store, measured in characters.
///
/// Looks at every response regardless of period. Ties go to the earliest row.
/// Stores without any comment are left out. Output follows `stores` order.
pub fn longest_comments(responses: &[SurveyResponse], stores: &[String]) -> Vec<StoreComment> {
    stores
        .iter()
        .filter_map(|store| {
            let mut best: Option<(&SurveyResponse, usize)> = None;
            for r in responses.iter().filter(|r| &r.store == store) {
                let Some(comment) = &r.comment else { continue };
                let len = comment.chars().count();
                if best.is_none_or(|(_, best_len)| len > best_len) {
                    best = Some((r, len));
                }
            }
            best.and_then(|(r, _)| {
                r.comment.as_ref().map(|c| StoreComment {
                    store: store.clone(),
                    line: r.line,
                    comment: c.clone(),
                })
            })
        })
        .collect()
}

/// Comments of `store` containing `term`, ignoring case, in dataset order.
///
/// An empty term matches every non-empty comment of the store. Any other term,
/// whitespace included, is matched as a plain substring.
pub fn search_comments(responses: &[SurveyResponse], store: &str, term: &str) -> Vec<StoreComment> {
    let needle = term.to_lowercase();
    responses
        .iter()
        .filter(|r| r.store == store)
        .filter_map(|r| r.comment.as_ref().map(|c| (r, c)))
        .filter(|(_, c)| needle.is_empty() || c.to_lowercase().contains(&needle))
        .map(|(r, c)| StoreComment {
            store: r.store.clone(),
            line: r.line,
            comment: c.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonCount {
    pub reason: String,
    pub count: usize,
}

/// Counts the reasons given by `store`'s respondents with a low expected-quality
/// rating. Sorted by count descending, ties by first appearance.
pub fn low_expectation_reasons(responses: &[SurveyResponse], store: &str) -> Vec<ReasonCount> {
    let mut counts: Vec<ReasonCount> = Vec::new();

    for r in responses.iter().filter(|r| r.store == store) {
        if classify(r.expected_quality()) != Some(ExpectationTier::Low) {
            continue;
        }
        let Some(reason) = &r.low_expectation_reason else {
            continue;
        };
        match counts.iter_mut().find(|c| &c.reason == reason) {
            Some(c) => c.count += 1,
            None => counts.push(ReasonCount {
                reason: reason.clone(),
                count: 1,
            }),
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
