use cointegrator_backtest::{BacktestBuilder, BacktestRow};
use cointegrator_core::{AppConfig, RankOrder, Result, ScannerConfig};
use cointegrator_data::{Fingerprint, JsonPriceHistory, PriceHistory, PriceHistorySource, ResultCache};
use cointegrator_pairs::{
    CointegrationResult, PairScan, PairScanner, PairZScore, RankedPair, ZScoreRow,
};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, error, info};

/// Inputs that determine a backtest table besides the price history.
#[derive(Serialize)]
struct BacktestParams<'a> {
    scanner: &'a ScannerConfig,
    coin1: &'a str,
    coin2: &'a str,
}

/// Serves cointegration results, z-scores and backtests, scanning only when
/// the cached tables do not match the current inputs.
pub struct Cointegrator<P, S = PairScanner> {
    config: AppConfig,
    source: P,
    scanner: S,
    backtester: BacktestBuilder,
    cache: ResultCache,
}

/// The service as wired by the binary: price history read from its JSON file.
pub type FileCointegrator = Cointegrator<JsonPriceHistory>;

impl FileCointegrator {
    /// Creates a service reading the configured price-history file.
    #[must_use]
    pub fn from_config(config: AppConfig) -> Self {
        let source = JsonPriceHistory::from_config(&config.storage);
        Self::new(config, source)
    }
}

impl<P: PriceHistorySource> Cointegrator<P> {
    #[must_use]
    pub fn new(config: AppConfig, source: P) -> Self {
        let scanner = PairScanner::new(&config.scanner);
        Self::with_scanner(config, source, scanner)
    }
}

impl<P: PriceHistorySource, S: PairScan> Cointegrator<P, S> {
    #[must_use]
    pub fn with_scanner(config: AppConfig, source: P, scanner: S) -> Self {
        Self {
            backtester: BacktestBuilder::new(&config.scanner),
            cache: ResultCache::from_config(&config.storage),
            config,
            source,
            scanner,
        }
    }

    /// Returns the `top` hot pairs ranked by p-value.
    ///
    /// The direction follows `selector.rank_order`; ties keep the saved order.
    ///
    /// # Errors
    /// Returns an error if the price history cannot be loaded.
    pub fn get_best_cointegrated_pairs(&self, top: usize) -> Result<Vec<RankedPair>> {
        let mut pairs = self.get_cointegration()?;

        match self.config.selector.rank_order {
            RankOrder::Ascending => {
                pairs.sort_by(|a, b| a.pvalue.partial_cmp(&b.pvalue).unwrap_or(Ordering::Equal));
            }
            RankOrder::Descending => {
                pairs.sort_by(|a, b| b.pvalue.partial_cmp(&a.pvalue).unwrap_or(Ordering::Equal));
            }
        }

        let best: Vec<RankedPair> = pairs.into_iter().take(top).map(RankedPair::from).collect();
        info!(requested = top, returned = best.len(), "Selected best cointegrated pairs");
        Ok(best)
    }

    /// Returns the hot-pair table, scanning if the cache is missing or stale.
    ///
    /// # Errors
    /// Returns an error if the price history cannot be loaded.
    pub fn get_cointegration(&self) -> Result<Vec<CointegrationResult>> {
        Ok(self.scan_tables()?.0)
    }

    /// Returns the z-score series of every evaluated pair.
    ///
    /// # Errors
    /// Returns an error if the price history cannot be loaded.
    pub fn get_zscore(&self) -> Result<Vec<PairZScore>> {
        Ok(PairZScore::from_rows(self.scan_tables()?.1))
    }

    /// Returns the backtest table of one pair.
    ///
    /// # Errors
    /// Returns an error if the price history cannot be loaded or does not
    /// contain both coins.
    pub fn get_backtests(&self, coin1: &str, coin2: &str) -> Result<Vec<BacktestRow>> {
        let history = self.source.load()?;
        let name = self.config.storage.backtest_name(coin1, coin2);
        let fingerprint = Fingerprint::compute(
            &history,
            &BacktestParams {
                scanner: &self.config.scanner,
                coin1,
                coin2,
            },
        )?;

        if let Some(rows) = self.cache.lookup(&name, &fingerprint) {
            return Ok(rows);
        }

        let rows = self.backtester.build(&history, coin1, coin2)?;
        if let Err(e) = self.cache.store(&name, &fingerprint, &rows) {
            error!(artifact = %name, error = %e, "Failed to save backtest table");
        }
        Ok(rows)
    }

    /// Drops both cached scan tables so the next request rescans.
    ///
    /// # Errors
    /// Returns an error if an existing table cannot be removed.
    pub fn refresh_scan(&self) -> Result<()> {
        self.cache.invalidate(&self.config.storage.cointegration_name())?;
        self.cache.invalidate(&self.config.storage.zscore_name())?;
        info!("Cached scan tables dropped");
        Ok(())
    }

    /// Drops the cached backtest table of one pair.
    ///
    /// # Errors
    /// Returns an error if an existing table cannot be removed.
    pub fn refresh_backtest(&self, coin1: &str, coin2: &str) -> Result<()> {
        self.cache.invalidate(&self.config.storage.backtest_name(coin1, coin2))?;
        info!(coin1, coin2, "Cached backtest table dropped");
        Ok(())
    }

    /// Both scan tables, served from cache only when both are valid.
    fn scan_tables(&self) -> Result<(Vec<CointegrationResult>, Vec<ZScoreRow>)> {
        let history = self.source.load()?;
        let fingerprint = Fingerprint::compute(&history, &self.config.scanner)?;
        let cointegration_name = self.config.storage.cointegration_name();
        let zscore_name = self.config.storage.zscore_name();

        if let Some(pairs) = self.cache.lookup(&cointegration_name, &fingerprint) {
            if let Some(zscores) = self.cache.lookup(&zscore_name, &fingerprint) {
                return Ok((pairs, zscores));
            }
        }
        debug!(fingerprint = %fingerprint, "Scan tables not cached, scanning");

        let (pairs, zscores) = self.scan(&history);

        if let Err(e) = self.cache.store(&cointegration_name, &fingerprint, &pairs) {
            error!(artifact = %cointegration_name, error = %e, "Failed to save cointegration table");
        }
        if let Err(e) = self.cache.store(&zscore_name, &fingerprint, &zscores) {
            error!(artifact = %zscore_name, error = %e, "Failed to save z-score table");
        }

        Ok((pairs, zscores))
    }

    fn scan(&self, history: &PriceHistory) -> (Vec<CointegrationResult>, Vec<ZScoreRow>) {
        let outcome = self.scanner.scan(history);
        (outcome.hot_pairs_by_crossings(), outcome.zscore_rows())
    }
}
