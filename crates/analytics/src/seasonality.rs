//! Weekly seasonality detection via lag-7 autocorrelation.

use crate::stats::{mean, ratio_or};

/// Lag used for the weekly pattern.
pub const WEEKLY_LAG: usize = 7;

/// Minimum number of aggregated points (four weeks) before testing.
pub const MIN_SEASONALITY_POINTS: usize = 28;

/// Correlation magnitude above which the pattern counts as seasonal.
pub const SEASONALITY_THRESHOLD: f64 = 0.5;

/// Autocorrelation of `values` at `lag`, centered on the mean of the whole
/// series and normalized by the lagged base's variance.
///
/// Returns `0.0` when the series is shorter than the lag or the base has no
/// variance.
pub fn lag_autocorrelation(values: &[f64], lag: usize) -> f64 {
    if lag == 0 || values.len() <= lag {
        return 0.0;
    }

    let m = mean(values);
    let subset = &values[lag..];
    let base = &values[..values.len() - lag];

    let numerator: f64 = subset
        .iter()
        .zip(base)
        .map(|(s, b)| (s - m) * (b - m))
        .sum();
    let denominator: f64 = base.iter().map(|b| (b - m) * (b - m)).sum();

    ratio_or(numerator, denominator, 0.0)
}

/// Whether the daily series repeats on a 7-day cycle.
pub fn detect_weekly_seasonality(values: &[f64]) -> bool {
    if values.len() < MIN_SEASONALITY_POINTS {
        return false;
    }
    lag_autocorrelation(values, WEEKLY_LAG).abs() > SEASONALITY_THRESHOLD
}
