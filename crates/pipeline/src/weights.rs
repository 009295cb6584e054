//! Sample weights derived from a stabilizer signal
//!
//! Rows with a stabilizer near 1.0 are treated as noisy and down-weighted.
//! Raw weights are clamped at [`WEIGHT_FLOOR`], then rescaled to mean 1.
//! The floor survives rescaling only while every stabilizer is non-negative;
//! a negative value lifts the mean above 1 and can push other rows under it.

pub const WEIGHT_FLOOR: f32 = 0.01;
pub const STABILIZER_SLOPE: f32 = 0.9;

/// `max(0.01, 1 - 0.9 * s)` for every row, divided by the mean weight.
pub fn sample_weights(stabilizer: &[f32]) -> Vec<f32> {
    if stabilizer.is_empty() {
        return Vec::new();
    }

    let raw: Vec<f32> = stabilizer
        .iter()
        .map(|&s| (1.0 - STABILIZER_SLOPE * s).max(WEIGHT_FLOOR))
        .collect();

    let mean = raw.iter().map(|&w| w as f64).sum::<f64>() / raw.len() as f64;
    raw.into_iter().map(|w| (w as f64 / mean) as f32).collect()
}

/// Weights for `rows` training rows, or `None` when the stabilizer is
/// absent, empty, not aligned with the rows or holds a non-finite value.
pub fn derive_weights(rows: usize, stabilizer: Option<&[f32]>) -> Option<Vec<f32>> {
    let stabilizer = stabilizer.filter(|s| !s.is_empty())?;
    if stabilizer.len() != rows {
        tracing::warn!(
            "stabilizer has {} values for {} rows; training without sample weights",
            stabilizer.len(),
            rows
        );
        return None;
    }
    if let Some(row) = stabilizer.iter().position(|s| !s.is_finite()) {
        tracing::warn!(
            "stabilizer is {} at row {row}; training without sample weights",
            stabilizer[row]
        );
        return None;
    }
    Some(sample_weights(stabilizer))
}
