//! Survey aggregation and comparison.
//!
//! Turns validated responses into per-store, per-month satisfaction indices,
//! compares two months, and extracts the reuse-intent, expectation-tier and
//! free-text views shown on the dashboard.

pub mod aggregate;
pub mod comments;
pub mod compare;
pub mod reuse;
pub mod tier;
pub mod types;
pub mod utility;
