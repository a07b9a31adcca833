use crate::error::CointError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub selector: SelectorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where price history is read from and where result tables are written.
///
/// File names are templates: `{currency}` is replaced by [`StorageConfig::currency`],
/// `{coin1}`/`{coin2}` by the requested backtest pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub output_dir: PathBuf,
    pub currency: String,
    pub price_history_file: String,
    pub cointegration_file: String,
    pub zscore_file: String,
    pub backtest_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// A pair is only hot when its p-value is strictly below this limit.
    pub p_threshold: f64,
    /// Rolling window (in samples) for the spread z-score.
    pub zscore_window: usize,
    pub alignment: AlignmentPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub rank_order: RankOrder,
    pub default_top: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter used when `RUST_LOG` is not set.
    pub level: String,
}

/// How two close-price series of different lengths are paired up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentPolicy {
    /// Lengths must match; otherwise the pair fails with a dimension mismatch.
    #[default]
    Strict,
    /// Keep the most recent `min(len_a, len_b)` observations of both series.
    Truncate,
}

/// Direction in which best pairs are ranked by p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankOrder {
    /// Lowest p-value first (strongest evidence of cointegration).
    #[default]
    Ascending,
    /// Highest p-value first.
    Descending,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            currency: "USDT".to_string(),
            price_history_file: "price_history_{currency}.json".to_string(),
            cointegration_file: "cointegration_{currency}.csv".to_string(),
            zscore_file: "zscore_{currency}.csv".to_string(),
            backtest_file: "backtest_{coin1}_{coin2}.csv".to_string(),
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            p_threshold: 0.05,
            zscore_window: 21,
            alignment: AlignmentPolicy::Strict,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            rank_order: RankOrder::Ascending,
            default_top: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub fn price_history_path(&self) -> PathBuf {
        self.output_dir.join(self.with_currency(&self.price_history_file))
    }

    #[must_use]
    pub fn cointegration_name(&self) -> String {
        self.with_currency(&self.cointegration_file)
    }

    #[must_use]
    pub fn zscore_name(&self) -> String {
        self.with_currency(&self.zscore_file)
    }

    #[must_use]
    pub fn backtest_name(&self, coin1: &str, coin2: &str) -> String {
        self.with_currency(&self.backtest_file)
            .replace("{coin1}", coin1)
            .replace("{coin2}", coin2)
    }

    fn with_currency(&self, template: &str) -> String {
        template.replace("{currency}", &self.currency)
    }
}

impl AppConfig {
    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`CointError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), CointError> {
        let scanner = &self.scanner;
        if !(scanner.p_threshold > 0.0 && scanner.p_threshold <= 1.0) {
            return Err(CointError::Config(format!(
                "scanner.p_threshold must be in (0, 1], got {}",
                scanner.p_threshold
            )));
        }
        if scanner.zscore_window < 2 {
            return Err(CointError::Config(
                "scanner.zscore_window must be at least 2 (a window of 1 produces no z-score)"
                    .to_string(),
            ));
        }
        if self.storage.currency.trim().is_empty() {
            return Err(CointError::Config("storage.currency is empty".to_string()));
        }
        if !self.storage.backtest_file.contains("{coin1}")
            || !self.storage.backtest_file.contains("{coin2}")
        {
            return Err(CointError::Config(format!(
                "storage.backtest_file must contain {{coin1}} and {{coin2}}, got '{}'",
                self.storage.backtest_file
            )));
        }
        for (field, name) in [
            ("storage.price_history_file", &self.storage.price_history_file),
            ("storage.cointegration_file", &self.storage.cointegration_file),
            ("storage.zscore_file", &self.storage.zscore_file),
        ] {
            if name.trim().is_empty() {
                return Err(CointError::Config(format!("{field} is empty")));
            }
        }
        Ok(())
    }
}
