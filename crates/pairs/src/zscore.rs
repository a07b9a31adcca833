//! Rolling z-score of a spread.

/// Rolling standardized score over `window` samples.
///
/// For `i >= window - 1` the value is `(spread[i] - mean) / std` over
/// `spread[i + 1 - window..=i]`, with the sample (n - 1) standard deviation.
/// Warm-up positions are NaN. A zero or non-finite standard deviation yields
/// NaN rather than an infinity, and so does any `window < 2`.
#[must_use]
pub fn rolling_zscore(spread: &[f64], window: usize) -> Vec<f64> {
    let mut zscore = vec![f64::NAN; spread.len()];
    if window < 2 {
        return zscore;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = window as f64;

    for (start, values) in spread.windows(window).enumerate() {
        let index = start + window - 1;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std_dev = variance.sqrt();

        if std_dev > 0.0 && std_dev.is_finite() {
            zscore[index] = (spread[index] - mean) / std_dev;
        }
    }

    zscore
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warm_up_is_nan_and_length_preserved() {
        let spread = [0.0, 1.0, 2.0, 1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0];
        let z = rolling_zscore(&spread, 5);

        assert_eq!(z.len(), spread.len());
        assert!(z[..4].iter().all(|v| v.is_nan()));
        assert!(z[4..].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn matches_hand_computation() {
        // window [1, 2, 3]: mean 2, sample std 1
        let z = rolling_zscore(&[1.0, 2.0, 3.0], 3);
        assert!((z[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flat_window_is_nan() {
        let z = rolling_zscore(&[2.0, 2.0, 2.0, 2.0, 5.0], 3);
        assert!(z[2].is_nan());
        assert!(z[3].is_nan());
        assert!(z[4].is_finite());
    }

    #[test]
    fn window_longer_than_series_is_all_nan() {
        let z = rolling_zscore(&[1.0, 2.0], 5);
        assert_eq!(z.len(), 2);
        assert!(z.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn degenerate_windows_are_all_nan() {
        assert!(rolling_zscore(&[1.0, 2.0, 3.0], 1).iter().all(|v| v.is_nan()));
        assert!(rolling_zscore(&[1.0, 2.0, 3.0], 0).iter().all(|v| v.is_nan()));
    }
}
