//! Pair discovery for statistical arbitrage.
//!
//! This crate provides:
//! - Close-price extraction from raw price records
//! - Hedge ratio, spread and rolling z-score signals
//! - The Engle-Granger cointegration test with MacKinnon p-values
//! - An all-pairs scanner that reports hot pairs

pub mod engle_granger;
pub mod evaluation;
pub mod extractor;
pub mod regression;
pub mod scanner;
pub mod spread;
pub mod types;
pub mod zscore;

pub use engle_granger::{
    adf_no_trend, engle_granger, mackinnon_critical_values, mackinnon_pvalue, AdfResult,
    CriticalValues, EngleGrangerResult,
};
pub use evaluation::{is_hot, round_to, CointegrationTest, PairEvaluation};
pub use extractor::extract_close_prices;
pub use regression::OlsFit;
pub use scanner::{PairScan, PairScanner, ScanOutcome};
pub use spread::{align, hedge_ratio, spread, zero_crossings};
pub use types::{CointegrationResult, PairKey, PairZScore, RankedPair, ZScoreRow};
pub use zscore::rolling_zscore;
