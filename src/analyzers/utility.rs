/// Top of the survey rating scale.
pub const SCALE_MAX: f64 = 7.0;

/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Maps a mean on the 1–7 scale onto 0–100.
pub fn rescale(raw_mean: f64) -> f64 {
    raw_mean * 100.0 / SCALE_MAX
}

/// Rounds to the nearest integer, ties to even (banker's rounding).
///
/// `62.5` becomes `62`, `63.5` becomes `64`.
pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Share of `part` in `total` as a percentage. Returns `None` when `total` is zero.
pub fn pct(part: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some((part as f64 / total as f64) * 100.0)
    }
}
