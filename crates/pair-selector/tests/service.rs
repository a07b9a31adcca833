use cointegrator_core::{AppConfig, CointError, RankOrder};
use cointegrator_data::{history_from_closes, PriceHistory};
use cointegrator_pairs::{CointegrationResult, PairScan, PairScanner, PairZScore, ScanOutcome};
use cointegrator_selector::Cointegrator;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Delegates to a real scanner and counts invocations.
struct CountingScan {
    inner: PairScanner,
    calls: Arc<AtomicUsize>,
}

impl PairScan for CountingScan {
    fn scan(&self, history: &PriceHistory) -> ScanOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.scan(history)
    }
}

/// Returns a fixed outcome.
struct FixedScan(ScanOutcome);

impl PairScan for FixedScan {
    fn scan(&self, _history: &PriceHistory) -> ScanOutcome {
        self.0.clone()
    }
}

fn config_in(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.output_dir = dir.to_path_buf();
    config.scanner.zscore_window = 3;
    config
}

fn ramp(scale: f64) -> Vec<f64> {
    (1..=10).map(|i| scale * f64::from(i)).collect()
}

fn counting(config: &AppConfig, history: PriceHistory) -> (Cointegrator<PriceHistory, CountingScan>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let scanner = CountingScan {
        inner: PairScanner::new(&config.scanner),
        calls: Arc::clone(&calls),
    };
    (Cointegrator::with_scanner(config.clone(), history, scanner), calls)
}

fn hot(symbol1: &str, pvalue: f64, zero_crossings: usize) -> CointegrationResult {
    CointegrationResult {
        symbol1: symbol1.to_string(),
        symbol2: "USD".to_string(),
        hot: true,
        pvalue,
        cointegration_value: -4.0,
        critical_value: -3.4,
        hedge_ratio: 1.0,
        zero_crossings,
    }
}

fn five_hot_pairs() -> ScanOutcome {
    ScanOutcome {
        hot_pairs: vec![
            hot("A", 0.03, 4),
            hot("B", 0.001, 9),
            hot("C", 0.02, 1),
            hot("D", 0.04, 7),
            hot("E", 0.01, 3),
        ],
        zscores: vec![PairZScore {
            symbol1: "A".to_string(),
            symbol2: "USD".to_string(),
            zscore: vec![f64::NAN, 0.5],
        }],
        evaluated: 5,
        skipped: 0,
    }
}

#[test]
fn valid_cache_short_circuits_the_scan() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    let history = history_from_closes([("A", ramp(1.0)), ("B", ramp(1.0))]);
    let (service, calls) = counting(&config, history);

    let first = service.get_cointegration().unwrap();
    let second = service.get_cointegration().unwrap();
    let zscores = service.get_zscore().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].hedge_ratio, 1.0);
    assert_eq!(zscores.len(), 1);
    assert_eq!(zscores[0].zscore.len(), 10);
    assert!(tmp.path().join("cointegration_USDT.csv").is_file());
    assert!(tmp.path().join("zscore_USDT.csv.manifest.json").is_file());
}

#[test]
fn changed_history_triggers_a_rescan() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());

    let (service, calls) = counting(&config, history_from_closes([("A", ramp(1.0)), ("B", ramp(1.0))]));
    service.get_cointegration().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let (service, calls) = counting(&config, history_from_closes([("A", ramp(1.0)), ("B", ramp(2.0))]));
    let pairs = service.get_cointegration().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!((pairs[0].hedge_ratio - 0.5).abs() < 1e-12);
}

#[test]
fn changed_scanner_config_triggers_a_rescan() {
    let tmp = TempDir::new().unwrap();
    let mut config = config_in(tmp.path());
    let history = history_from_closes([("A", ramp(1.0)), ("B", ramp(1.0))]);

    let (service, _) = counting(&config, history.clone());
    service.get_cointegration().unwrap();

    config.scanner.zscore_window = 5;
    let (service, calls) = counting(&config, history);
    service.get_zscore().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn missing_zscore_table_forces_full_rescan() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    let history = history_from_closes([("A", ramp(1.0)), ("B", ramp(1.0))]);
    let (service, calls) = counting(&config, history);

    service.get_cointegration().unwrap();
    std::fs::remove_file(tmp.path().join("zscore_USDT.csv")).unwrap();
    service.get_cointegration().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn refresh_scan_forces_a_rescan_of_valid_tables() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    let history = history_from_closes([("A", ramp(1.0)), ("B", ramp(1.0))]);
    let (service, calls) = counting(&config, history);

    service.get_cointegration().unwrap();
    service.refresh_scan().unwrap();
    assert!(!tmp.path().join("cointegration_USDT.csv").exists());
    assert!(!tmp.path().join("zscore_USDT.csv.manifest.json").exists());

    service.get_zscore().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn refresh_scan_without_cached_tables_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    let (service, calls) = counting(&config, PriceHistory::new());

    service.refresh_scan().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn best_pairs_returns_top_n_lowest_pvalue_first() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    let service = Cointegrator::with_scanner(config, PriceHistory::new(), FixedScan(five_hot_pairs()));

    let best = service.get_best_cointegrated_pairs(2).unwrap();

    assert_eq!(best.len(), 2);
    assert_eq!(best[0].symbol1, "B");
    assert_eq!(best[1].symbol1, "E");
}

#[test]
fn descending_rank_order_puts_largest_pvalue_first() {
    let tmp = TempDir::new().unwrap();
    let mut config = config_in(tmp.path());
    config.selector.rank_order = RankOrder::Descending;
    let service = Cointegrator::with_scanner(config, PriceHistory::new(), FixedScan(five_hot_pairs()));

    let best = service.get_best_cointegrated_pairs(3).unwrap();

    let names: Vec<&str> = best.iter().map(|p| p.symbol1.as_str()).collect();
    assert_eq!(names, vec!["D", "A", "C"]);
}

#[test]
fn saved_table_is_sorted_by_zero_crossings() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    let service = Cointegrator::with_scanner(config, PriceHistory::new(), FixedScan(five_hot_pairs()));

    let pairs = service.get_cointegration().unwrap();
    let crossings: Vec<usize> = pairs.iter().map(|p| p.zero_crossings).collect();
    assert_eq!(crossings, vec![9, 7, 4, 3, 1]);

    let cached = service.get_cointegration().unwrap();
    assert_eq!(cached, pairs);
}

#[test]
fn persistence_failure_still_returns_results() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let config = config_in(&blocker.join("out"));
    let history = history_from_closes([("A", ramp(1.0)), ("B", ramp(1.0))]);
    let (service, calls) = counting(&config, history);

    let pairs = service.get_cointegration().unwrap();
    service.get_cointegration().unwrap();

    assert_eq!(pairs.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn backtests_are_built_then_cached() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    let history = history_from_closes([
        ("ETH", vec![10.0, 12.0, 11.0, 13.0, 12.0]),
        ("BTC", vec![5.0, 5.5, 5.8, 6.2, 6.1]),
    ]);
    let service = Cointegrator::new(config, history);

    let built = service.get_backtests("ETH", "BTC").unwrap();
    assert!(tmp.path().join("backtest_ETH_BTC.csv").is_file());
    let cached = service.get_backtests("ETH", "BTC").unwrap();

    assert_eq!(built.len(), 5);
    assert_eq!(cached.len(), 5);
    assert_eq!(cached[3].spread, built[3].spread);
    assert!(cached[0].zscore.is_nan());
}

#[test]
fn refresh_backtest_drops_only_that_pair() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    let history = history_from_closes([
        ("ETH", vec![10.0, 12.0, 11.0, 13.0, 12.0]),
        ("BTC", vec![5.0, 5.5, 5.8, 6.2, 6.1]),
        ("SOL", vec![2.0, 2.2, 2.1, 2.4, 2.3]),
    ]);
    let service = Cointegrator::new(config, history);

    service.get_backtests("ETH", "BTC").unwrap();
    service.get_backtests("ETH", "SOL").unwrap();
    service.refresh_backtest("ETH", "BTC").unwrap();

    assert!(!tmp.path().join("backtest_ETH_BTC.csv").exists());
    assert!(!tmp.path().join("backtest_ETH_BTC.csv.manifest.json").exists());
    assert!(tmp.path().join("backtest_ETH_SOL.csv").is_file());
    assert_eq!(service.get_backtests("ETH", "BTC").unwrap().len(), 5);
}

#[test]
fn backtest_for_unknown_coin_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let history = history_from_closes([("ETH", ramp(1.0))]);
    let service = Cointegrator::new(config_in(tmp.path()), history);

    let err = service.get_backtests("ETH", "DOGE").unwrap_err();

    assert!(matches!(err, CointError::MissingSymbolData { .. }));
}

#[test]
fn missing_price_history_file_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let service = Cointegrator::from_config(config_in(tmp.path()));

    let err = service.get_cointegration().unwrap_err();

    assert!(matches!(err, CointError::MissingPrerequisiteData { .. }));
    assert!(err.is_fatal());
}
