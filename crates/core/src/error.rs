//! Error types for the cointegration scanner.
//!
//! Fatal preconditions (missing price history, missing symbol) and per-pair
//! numeric failures share one enum so callers can decide which to recover.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CointError {
    /// The price-history store does not exist yet.
    #[error("price history not found at {}: generate price history first", path.display())]
    MissingPrerequisiteData {
        /// Expected location of the store.
        path: PathBuf,
    },

    /// A requested symbol is absent from the price history.
    #[error("price history does not have {symbol}")]
    MissingSymbolData {
        /// The symbol that was looked up.
        symbol: String,
    },

    /// Two series that must be paired element by element differ in length.
    #[error("dimension mismatch: {left} vs {right} observations")]
    DimensionMismatch { left: usize, right: usize },

    /// Not enough observations for the requested computation.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A test cannot be computed, e.g. on a constant series.
    #[error("degenerate input: {0}")]
    Degenerate(String),

    /// Reading or writing a cached artifact failed.
    #[error("persistence failure at {}: {message}", path.display())]
    Persistence { path: PathBuf, message: String },

    /// Configuration values out of range.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CointError {
    /// Creates a persistence error for `path`.
    pub fn persistence(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Persistence {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Creates an insufficient data error.
    pub fn insufficient(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Returns true for errors that end the whole run rather than a single pair.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingPrerequisiteData { .. } | Self::MissingSymbolData { .. } | Self::Config(_)
        )
    }
}
