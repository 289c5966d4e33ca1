//! Numeric helpers shared by the filter and the aggregator.

/// Computes the arithmetic mean of a slice of values. Empty input has no
/// mean, so the caller gets `None` rather than a sentinel.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Computes the `q`-th percentile (`q` in `[0, 1]`) by linear interpolation
/// between order statistics at rank `q * (n - 1)`.
///
/// Returns `None` for empty input.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }

    let t = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * t)
}
