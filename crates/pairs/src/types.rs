//! Row and key types shared by the scanner, the cache tables and the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Undirected pair identity: the two symbols in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey(String, String);

impl PairKey {
    #[must_use]
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

/// Engle-Granger outcome for one symbol pair, as persisted in the cointegration table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CointegrationResult {
    pub symbol1: String,
    pub symbol2: String,
    pub hot: bool,
    /// Rounded to 3 decimals.
    pub pvalue: f64,
    /// Engle-Granger test statistic.
    pub cointegration_value: f64,
    /// 5% critical value.
    pub critical_value: f64,
    pub hedge_ratio: f64,
    pub zero_crossings: usize,
}

impl CointegrationResult {
    #[must_use]
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.symbol1, &self.symbol2)
    }
}

/// A cointegration row as returned by best-pair queries, without the `hot` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPair {
    pub symbol1: String,
    pub symbol2: String,
    pub pvalue: f64,
    pub cointegration_value: f64,
    pub critical_value: f64,
    pub hedge_ratio: f64,
    pub zero_crossings: usize,
}

impl From<CointegrationResult> for RankedPair {
    fn from(result: CointegrationResult) -> Self {
        Self {
            symbol1: result.symbol1,
            symbol2: result.symbol2,
            pvalue: result.pvalue,
            cointegration_value: result.cointegration_value,
            critical_value: result.critical_value,
            hedge_ratio: result.hedge_ratio,
            zero_crossings: result.zero_crossings,
        }
    }
}

/// Rolling z-score of one evaluated pair's spread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairZScore {
    pub symbol1: String,
    pub symbol2: String,
    pub zscore: Vec<f64>,
}

/// Long-format row of the persisted z-score table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZScoreRow {
    pub symbol1: String,
    pub symbol2: String,
    pub step: usize,
    pub zscore: f64,
}

impl PairZScore {
    #[must_use]
    pub fn to_rows(&self) -> Vec<ZScoreRow> {
        self.zscore
            .iter()
            .enumerate()
            .map(|(step, &zscore)| ZScoreRow {
                symbol1: self.symbol1.clone(),
                symbol2: self.symbol2.clone(),
                step,
                zscore,
            })
            .collect()
    }

    /// Regroups long-format rows into per-pair series, keeping the row order.
    #[must_use]
    pub fn from_rows(rows: Vec<ZScoreRow>) -> Vec<Self> {
        let mut grouped: Vec<Self> = Vec::new();
        for row in rows {
            match grouped.last_mut() {
                Some(last) if last.symbol1 == row.symbol1 && last.symbol2 == row.symbol2 => {
                    last.zscore.push(row.zscore);
                }
                _ => grouped.push(Self {
                    symbol1: row.symbol1,
                    symbol2: row.symbol2,
                    zscore: vec![row.zscore],
                }),
            }
        }
        grouped
    }
}
