//! Per-pair evaluation: Engle-Granger statistics, hedge ratio, spread and
//! the hot-pair classification.

use crate::engle_granger::{engle_granger, CriticalValues};
use crate::spread::{hedge_ratio, spread, zero_crossings};
use crate::types::{CointegrationResult, PairZScore};
use crate::zscore::rolling_zscore;
use cointegrator_core::{Result, ScannerConfig};

/// Everything computed for one ordered pair of aligned series.
#[derive(Debug, Clone)]
pub struct PairEvaluation {
    pub statistic: f64,
    /// Unrounded p-value; classification uses this one.
    pub pvalue: f64,
    pub critical_values: CriticalValues,
    pub hedge_ratio: f64,
    pub spread: Vec<f64>,
    pub zero_crossings: usize,
    pub zscore: Vec<f64>,
    pub hot: bool,
}

impl PairEvaluation {
    /// Labels the evaluation, splitting it into the table row and the z-score series.
    #[must_use]
    pub fn into_parts(self, symbol1: &str, symbol2: &str) -> (CointegrationResult, PairZScore) {
        let result = CointegrationResult {
            symbol1: symbol1.to_string(),
            symbol2: symbol2.to_string(),
            hot: self.hot,
            pvalue: round_to(self.pvalue, 3),
            cointegration_value: self.statistic,
            critical_value: self.critical_values.five_pct,
            hedge_ratio: self.hedge_ratio,
            zero_crossings: self.zero_crossings,
        };
        let zscore = PairZScore {
            symbol1: symbol1.to_string(),
            symbol2: symbol2.to_string(),
            zscore: self.zscore,
        };
        (result, zscore)
    }
}

/// Engle-Granger evaluation of a pair plus its trading signal.
#[derive(Debug, Clone, Copy)]
pub struct CointegrationTest {
    p_threshold: f64,
    zscore_window: usize,
}

impl CointegrationTest {
    #[must_use]
    pub const fn new(p_threshold: f64, zscore_window: usize) -> Self {
        Self {
            p_threshold,
            zscore_window,
        }
    }

    #[must_use]
    pub const fn from_config(config: &ScannerConfig) -> Self {
        Self::new(config.p_threshold, config.zscore_window)
    }

    #[must_use]
    pub const fn zscore_window(&self) -> usize {
        self.zscore_window
    }

    /// Evaluates `a` against `b`; both must already be aligned.
    ///
    /// # Errors
    /// Propagates dimension, sample-size and degeneracy failures of the test
    /// and of the hedge regression.
    pub fn evaluate(&self, a: &[f64], b: &[f64]) -> Result<PairEvaluation> {
        let test = engle_granger(a, b)?;
        let ratio = hedge_ratio(a, b)?;
        let spread = spread(a, b, ratio)?;
        let crossings = zero_crossings(&spread);
        let zscore = rolling_zscore(&spread, self.zscore_window);

        Ok(PairEvaluation {
            statistic: test.statistic,
            pvalue: test.pvalue,
            critical_values: test.critical_values,
            hedge_ratio: ratio,
            spread,
            zero_crossings: crossings,
            zscore,
            hot: is_hot(
                test.pvalue,
                test.statistic,
                test.critical_values.five_pct,
                self.p_threshold,
            ),
        })
    }
}

/// A pair is hot only when both the p-value and the statistic clear their bounds.
#[must_use]
pub fn is_hot(pvalue: f64, statistic: f64, critical_value: f64, p_threshold: f64) -> bool {
    pvalue < p_threshold && statistic < critical_value
}

#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_ramps_are_hot_with_flat_spread() {
        let a: Vec<f64> = (1..=10).map(f64::from).collect();
        let test = CointegrationTest::new(0.05, 3);

        let evaluation = test.evaluate(&a, &a).unwrap();

        assert_eq!(evaluation.hedge_ratio, 1.0);
        assert_eq!(evaluation.spread, vec![0.0; 10]);
        assert_eq!(evaluation.zero_crossings, 0);
        assert_eq!(evaluation.pvalue, 0.0);
        assert!(evaluation.hot);
        assert_eq!(evaluation.zscore.len(), 10);
        assert!(evaluation.zscore.iter().all(|z| z.is_nan()));
    }

    #[test]
    fn into_parts_rounds_pvalue_and_takes_five_percent_level() {
        let evaluation = PairEvaluation {
            statistic: -3.9,
            pvalue: 0.012_345,
            critical_values: CriticalValues {
                one_pct: -4.0,
                five_pct: -3.4,
                ten_pct: -3.1,
            },
            hedge_ratio: 0.8,
            spread: vec![1.0, -1.0],
            zero_crossings: 1,
            zscore: vec![f64::NAN, f64::NAN],
            hot: true,
        };

        let (result, zscore) = evaluation.into_parts("ETH", "BTC");

        assert_eq!(result.symbol1, "ETH");
        assert_eq!(result.symbol2, "BTC");
        assert_eq!(result.pvalue, 0.012);
        assert_eq!(result.critical_value, -3.4);
        assert_eq!(zscore.symbol1, "ETH");
        assert_eq!(zscore.zscore.len(), 2);
    }

    #[test]
    fn hot_requires_both_conditions() {
        assert!(is_hot(0.01, -4.0, -3.4, 0.05));
        assert!(!is_hot(0.06, -4.0, -3.4, 0.05));
        assert!(!is_hot(0.01, -3.0, -3.4, 0.05));
        assert!(!is_hot(0.05, -4.0, -3.4, 0.05));
    }

    #[test]
    fn rounding_to_three_decimals() {
        assert_eq!(round_to(0.123_56, 3), 0.124);
        assert_eq!(round_to(0.0, 3), 0.0);
    }

    proptest! {
        #[test]
        fn hot_is_a_strict_conjunction(
            pvalue in 0.0f64..1.0,
            statistic in -10.0f64..2.0,
            critical in -4.0f64..-2.5,
            threshold in 0.001f64..0.2,
        ) {
            let hot = is_hot(pvalue, statistic, critical, threshold);
            if pvalue >= threshold || statistic >= critical {
                prop_assert!(!hot);
            } else {
                prop_assert!(hot);
            }
        }
    }
}
