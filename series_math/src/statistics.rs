//! Descriptive statistics over short economic series
//!
//! Contains the building blocks used by every forecaster:
//! - Trailing moving average
//! - Ordinary least squares regression
//! - Volatility of first differences
//! - Linear-interpolated percentiles
//!
//! None of these functions fail. Degenerate inputs (empty or very short
//! series) resolve to fixed fallback values documented on each function.

/// Volatility returned when a series is too short to estimate one.
pub const DEFAULT_VOLATILITY: f64 = 0.5;

/// Trailing moving average with partial windows at the start.
///
/// Entry `i` is the mean of the up to `window` values ending at `i`.
/// A zero window is treated as a window of one.
pub fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);

    series
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let start = (i + 1).saturating_sub(window);
            let slice = &series[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Ordinary least squares fit of `y` on `x`, returning `(slope, intercept)`.
///
/// With fewer than two points the slope is 0 and the intercept is the single
/// `y` value (or 0 when empty). A vertical cloud (all `x` equal) yields slope 0
/// and the mean of `y`. Extra points in the longer slice are ignored.
pub fn linear_regression(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len().min(y.len());
    if n < 2 {
        return (0.0, y.first().copied().unwrap_or(0.0));
    }

    let (x, y) = (&x[..n], &y[..n]);
    let n_f = n as f64;

    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(xi, yi)| xi * yi).sum();
    let sum_x2: f64 = x.iter().map(|xi| xi * xi).sum();

    let denominator = n_f * sum_x2 - sum_x * sum_x;
    if denominator.abs() < 1e-12 {
        return (0.0, sum_y / n_f);
    }

    let slope = (n_f * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n_f;

    (slope, intercept)
}

/// Arithmetic mean, 0 for an empty series.
pub fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().sum::<f64>() / series.len() as f64
}

/// Sample standard deviation (n - 1 denominator), 0 below two points.
pub fn sample_std_dev(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }

    let m = mean(series);
    let variance =
        series.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (series.len() - 1) as f64;

    variance.sqrt()
}

/// Standard deviation of the first differences of `series`.
///
/// Returns [`DEFAULT_VOLATILITY`] when fewer than 3 points are available so
/// that confidence bands built on top of it never collapse to zero width.
pub fn volatility(series: &[f64]) -> f64 {
    if series.len() < 3 {
        return DEFAULT_VOLATILITY;
    }

    let variations: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();
    sample_std_dev(&variations)
}

/// Linear-interpolated percentile on a 0-100 scale.
///
/// Works on a sorted copy of `series`. `p` is clamped to `[0, 100]`;
/// an empty series yields 0.
pub fn percentile(series: &[f64], p: f64) -> f64 {
    if series.is_empty() {
        return 0.0;
    }

    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (sorted.len() - 1) as f64 * p.clamp(0.0, 100.0) / 100.0;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        return sorted[lower];
    }

    sorted[lower] * (upper as f64 - rank) + sorted[upper] * (rank - lower as f64)
}

/// Round to `decimals` places, normalizing negative zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_moving_average_partial_windows() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0], 3);

        assert_eq!(ma.len(), 4);
        assert_relative_eq!(ma[0], 1.0);
        assert_relative_eq!(ma[1], 1.5);
        assert_relative_eq!(ma[2], 2.0);
        assert_relative_eq!(ma[3], 3.0);
    }

    #[test]
    fn test_moving_average_zero_window() {
        assert_eq!(moving_average(&[4.0, 5.0], 0), vec![4.0, 5.0]);
        assert!(moving_average(&[], 3).is_empty());
    }

    #[test]
    fn test_linear_regression_degenerate_cases() {
        assert_eq!(linear_regression(&[], &[]), (0.0, 0.0));
        assert_eq!(linear_regression(&[0.0], &[5.0]), (0.0, 5.0));
        assert_eq!(linear_regression(&[2.0, 2.0], &[1.0, 3.0]), (0.0, 2.0));
    }

    #[test]
    fn test_linear_regression_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let (slope, intercept) = linear_regression(&x, &y);

        assert_relative_eq!(slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(intercept, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_volatility_short_series_uses_default() {
        assert_eq!(volatility(&[]), DEFAULT_VOLATILITY);
        assert_eq!(volatility(&[1.0, 2.0]), DEFAULT_VOLATILITY);
    }

    #[test]
    fn test_volatility_of_differences() {
        // Differences: 1, 1, 1 -> zero spread
        assert_relative_eq!(volatility(&[1.0, 2.0, 3.0, 4.0]), 0.0);
        // Differences: 1, -1 -> sample std = sqrt(2)
        assert_relative_eq!(volatility(&[0.0, 1.0, 0.0]), 2_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_percentile_interpolation() {
        let data = [5.0, 1.0, 3.0, 2.0, 4.0];

        assert_relative_eq!(percentile(&data, 0.0), 1.0);
        assert_relative_eq!(percentile(&data, 50.0), 3.0);
        assert_relative_eq!(percentile(&data, 100.0), 5.0);
        assert_relative_eq!(percentile(&data, 10.0), 1.4, epsilon = 1e-12);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn test_round_to_normalizes_negative_zero() {
        assert_eq!(round_to(-0.0001, 2).to_bits(), 0.0_f64.to_bits());
        assert_relative_eq!(round_to(1.456, 1), 1.5);
    }
}
