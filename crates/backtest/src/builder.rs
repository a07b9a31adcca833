use cointegrator_core::{AlignmentPolicy, CointError, Result, ScannerConfig};
use cointegrator_data::PriceHistory;
use cointegrator_pairs::{align, extract_close_prices, hedge_ratio, rolling_zscore, spread};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One step of a pair backtest table.
///
/// `symbol1`/`symbol2` hold the aligned close prices of the two coins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRow {
    pub symbol1: f64,
    pub symbol2: f64,
    pub symbol1_normalized: f64,
    pub symbol2_normalized: f64,
    pub spread: f64,
    pub zscore: f64,
}

/// Builds the normalized price, spread and z-score table for one pair.
#[derive(Debug, Clone, Copy)]
pub struct BacktestBuilder {
    zscore_window: usize,
    alignment: AlignmentPolicy,
}

impl BacktestBuilder {
    #[must_use]
    pub const fn new(config: &ScannerConfig) -> Self {
        Self {
            zscore_window: config.zscore_window,
            alignment: config.alignment,
        }
    }

    /// Builds the table for `coin1` against `coin2`.
    ///
    /// # Errors
    /// Returns [`CointError::MissingSymbolData`] when either coin is absent
    /// from the history, and alignment or hedge-regression failures otherwise.
    pub fn build(&self, history: &PriceHistory, coin1: &str, coin2: &str) -> Result<Vec<BacktestRow>> {
        let closes1 = closes_for(history, coin1)?;
        let closes2 = closes_for(history, coin2)?;
        let (a, b) = align(&closes1, &closes2, self.alignment)?;

        let ratio = hedge_ratio(a, b)?;
        let spread = spread(a, b, ratio)?;
        let zscore = rolling_zscore(&spread, self.zscore_window);

        let rows: Vec<BacktestRow> = a
            .iter()
            .zip(b)
            .zip(normalize(a).into_iter().zip(normalize(b)))
            .zip(spread.iter().zip(&zscore))
            .map(|(((&p1, &p2), (n1, n2)), (&s, &z))| BacktestRow {
                symbol1: p1,
                symbol2: p2,
                symbol1_normalized: n1,
                symbol2_normalized: n2,
                spread: s,
                zscore: z,
            })
            .collect();

        info!(coin1, coin2, rows = rows.len(), hedge_ratio = ratio, "Built backtest table");
        Ok(rows)
    }
}

fn closes_for(history: &PriceHistory, symbol: &str) -> Result<Vec<f64>> {
    history
        .get(symbol)
        .map(|records| extract_close_prices(symbol, records))
        .ok_or_else(|| CointError::MissingSymbolData {
            symbol: symbol.to_string(),
        })
}

/// `p[i] / p[0]`; a zero first price makes every value NaN.
fn normalize(prices: &[f64]) -> Vec<f64> {
    match prices.first() {
        Some(&first) if first != 0.0 => prices.iter().map(|p| p / first).collect(),
        _ => vec![f64::NAN; prices.len()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cointegrator_data::history_from_closes;

    fn config(window: usize) -> ScannerConfig {
        ScannerConfig {
            zscore_window: window,
            ..ScannerConfig::default()
        }
    }

    #[test]
    fn builds_normalized_spread_table() {
        let history = history_from_closes([
            ("ETH", vec![10.0, 12.0, 11.0, 13.0, 12.0]),
            ("BTC", vec![5.0, 5.5, 5.8, 6.2, 6.1]),
        ]);

        let rows = BacktestBuilder::new(&config(3)).build(&history, "ETH", "BTC").unwrap();

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].symbol1, 10.0);
        assert_eq!(rows[0].symbol1_normalized, 1.0);
        assert_eq!(rows[0].symbol2_normalized, 1.0);
        assert!((rows[1].symbol1_normalized - 1.2).abs() < 1e-12);
        assert!(rows[0].zscore.is_nan());
        assert!(rows[1].zscore.is_nan());
        assert!(rows[2].zscore.is_finite());

        let ratio = hedge_ratio(
            &[10.0, 12.0, 11.0, 13.0, 12.0],
            &[5.0, 5.5, 5.8, 6.2, 6.1],
        )
        .unwrap();
        assert!((rows[3].spread - (13.0 - ratio * 6.2)).abs() < 1e-12);
    }

    #[test]
    fn missing_symbol_is_reported() {
        let history = history_from_closes([("ETH", vec![1.0, 2.0, 3.0])]);

        let err = BacktestBuilder::new(&config(2))
            .build(&history, "ETH", "DOGE")
            .unwrap_err();

        assert!(matches!(err, CointError::MissingSymbolData { ref symbol } if symbol == "DOGE"));
        assert!(err.is_fatal());
    }

    #[test]
    fn zero_first_price_normalizes_to_nan() {
        assert!(normalize(&[0.0, 1.0, 2.0]).iter().all(|v| v.is_nan()));
        assert_eq!(normalize(&[2.0, 4.0]), vec![1.0, 2.0]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn strict_alignment_rejects_different_lengths() {
        let history = history_from_closes([
            ("ETH", vec![1.0, 2.0, 3.0]),
            ("BTC", vec![1.0, 2.0]),
        ]);

        let result = BacktestBuilder::new(&config(2)).build(&history, "ETH", "BTC");

        assert!(matches!(result, Err(CointError::DimensionMismatch { .. })));
    }

    #[test]
    fn truncation_keeps_latest_prices() {
        let history = history_from_closes([
            ("ETH", vec![1.0, 2.0, 3.0, 4.0]),
            ("BTC", vec![6.0, 8.0]),
        ]);
        let config = ScannerConfig {
            alignment: AlignmentPolicy::Truncate,
            ..config(2)
        };

        let rows = BacktestBuilder::new(&config).build(&history, "ETH", "BTC").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol1, 3.0);
        assert_eq!(rows[1].symbol1_normalized, 4.0 / 3.0);
    }
}
