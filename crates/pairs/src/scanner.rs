//! All-pairs cointegration scan over a price history.

use crate::evaluation::{CointegrationTest, PairEvaluation};
use crate::extractor::extract_close_prices;
use crate::spread::align;
use crate::types::{CointegrationResult, PairKey, PairZScore, ZScoreRow};
use cointegrator_core::{AlignmentPolicy, Result, ScannerConfig};
use cointegrator_data::PriceHistory;
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Result of one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Hot pairs in evaluation order.
    pub hot_pairs: Vec<CointegrationResult>,
    /// Z-scores of every evaluated pair, hot or not.
    pub zscores: Vec<PairZScore>,
    pub evaluated: usize,
    pub skipped: usize,
}

impl ScanOutcome {
    /// Hot pairs ordered by descending zero crossings; ties keep evaluation order.
    #[must_use]
    pub fn hot_pairs_by_crossings(&self) -> Vec<CointegrationResult> {
        let mut sorted = self.hot_pairs.clone();
        sorted.sort_by_key(|pair| Reverse(pair.zero_crossings));
        sorted
    }

    /// Long-format z-score rows in accumulation order.
    #[must_use]
    pub fn zscore_rows(&self) -> Vec<ZScoreRow> {
        self.zscores.iter().flat_map(PairZScore::to_rows).collect()
    }
}

/// Seam between the service layer and the scan implementation.
pub trait PairScan {
    fn scan(&self, history: &PriceHistory) -> ScanOutcome;
}

/// Evaluates every unordered pair of symbols exactly once.
#[derive(Debug, Clone, Copy)]
pub struct PairScanner {
    test: CointegrationTest,
    alignment: AlignmentPolicy,
}

impl PairScanner {
    #[must_use]
    pub const fn new(config: &ScannerConfig) -> Self {
        Self {
            test: CointegrationTest::from_config(config),
            alignment: config.alignment,
        }
    }

    /// Aligns two close series and evaluates them.
    ///
    /// # Errors
    /// Returns alignment failures and any numeric failure of the evaluation.
    pub fn evaluate_pair(&self, a: &[f64], b: &[f64]) -> Result<PairEvaluation> {
        let (a, b) = align(a, b, self.alignment)?;
        self.test.evaluate(a, b)
    }
}

impl PairScan for PairScanner {
    fn scan(&self, history: &PriceHistory) -> ScanOutcome {
        let series: Vec<(&str, Vec<f64>)> = history
            .iter()
            .map(|(symbol, records)| (symbol.as_str(), extract_close_prices(symbol, records)))
            .collect();

        info!(
            symbols = series.len(),
            window = self.test.zscore_window(),
            "Scanning for cointegrated pairs"
        );

        let mut visited: HashSet<PairKey> = HashSet::new();
        let mut outcome = ScanOutcome::default();

        for (i, (symbol1, closes1)) in series.iter().enumerate() {
            info!(symbol = *symbol1, index = i + 1, total = series.len(), "Evaluating symbol");

            for (symbol2, closes2) in &series[i + 1..] {
                if !visited.insert(PairKey::new(symbol1, symbol2)) {
                    debug!(symbol1, symbol2, "Pair already evaluated");
                    continue;
                }

                match self.evaluate_pair(closes1, closes2) {
                    Ok(evaluation) => {
                        outcome.evaluated += 1;
                        let (result, zscore) = evaluation.into_parts(symbol1, symbol2);
                        if result.hot {
                            info!(
                                symbol1,
                                symbol2,
                                pvalue = result.pvalue,
                                zero_crossings = result.zero_crossings,
                                "Found cointegrated pair"
                            );
                            outcome.hot_pairs.push(result);
                        }
                        outcome.zscores.push(zscore);
                    }
                    Err(e) => {
                        outcome.skipped += 1;
                        warn!(symbol1, symbol2, error = %e, "Skipping pair");
                    }
                }
            }
        }

        info!(
            evaluated = outcome.evaluated,
            skipped = outcome.skipped,
            hot = outcome.hot_pairs.len(),
            "Scan complete"
        );

        outcome
    }
}
