//! Price history store produced by the collector.
//!
//! The store is a JSON object mapping each symbol to its ordered list of
//! candle records. Only the `close` field is interpreted; other fields are
//! carried through untouched.

use cointegrator_core::{CointError, Result, StorageConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Symbol → ordered price records. Sorted keys keep scans and fingerprints deterministic.
pub type PriceHistory = BTreeMap<String, Vec<PriceRecord>>;

/// One candle as stored by the collector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceRecord(Map<String, Value>);

/// Outcome of reading the `close` field of a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClosePrice {
    /// Field not present at all.
    Missing,
    /// Present but NaN, null, infinite or not a number.
    Invalid,
    Value(f64),
}

impl PriceRecord {
    /// Creates a record holding only a close price. Non-finite prices are stored as null.
    #[must_use]
    pub fn from_close(close: f64) -> Self {
        Self::default().with_field("close", finite_or_null(close))
    }

    /// Adds or replaces a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn close(&self) -> ClosePrice {
        match self.0.get("close") {
            None => ClosePrice::Missing,
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() => ClosePrice::Value(v),
                _ => ClosePrice::Invalid,
            },
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => ClosePrice::Value(v),
                _ => ClosePrice::Invalid,
            },
            Some(_) => ClosePrice::Invalid,
        }
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

fn finite_or_null(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Builds a price history from plain close-price vectors.
#[must_use]
pub fn history_from_closes<S, I>(series: I) -> PriceHistory
where
    S: Into<String>,
    I: IntoIterator<Item = (S, Vec<f64>)>,
{
    series
        .into_iter()
        .map(|(symbol, closes)| {
            let records = closes.into_iter().map(PriceRecord::from_close).collect();
            (symbol.into(), records)
        })
        .collect()
}

/// Anything that can hand the scanner a complete price history.
pub trait PriceHistorySource {
    /// Loads the full history.
    ///
    /// # Errors
    ///
    /// Returns [`CointError::MissingPrerequisiteData`] when the store does not exist.
    fn load(&self) -> Result<PriceHistory>;
}

impl PriceHistorySource for PriceHistory {
    fn load(&self) -> Result<PriceHistory> {
        Ok(self.clone())
    }
}

/// Reads the JSON store written by the price collector.
#[derive(Debug, Clone)]
pub struct JsonPriceHistory {
    path: PathBuf,
}

impl JsonPriceHistory {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(storage.price_history_path())
    }
}

impl PriceHistorySource for JsonPriceHistory {
    fn load(&self) -> Result<PriceHistory> {
        if !self.path.is_file() {
            return Err(CointError::MissingPrerequisiteData {
                path: self.path.clone(),
            });
        }

        let raw = fs::read_to_string(&self.path)?;
        let history: PriceHistory = serde_json::from_str(&replace_non_finite_literals(&raw))?;

        info!(
            path = %self.path.display(),
            symbols = history.len(),
            "Price history loaded"
        );

        Ok(history)
    }
}

/// Rewrites bare `NaN`/`Infinity`/`-Infinity` tokens (emitted by some JSON writers) as `null`.
fn replace_non_finite_literals(raw: &str) -> Cow<'_, str> {
    if !raw.contains("NaN") && !raw.contains("Infinity") {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = raw;

    while let Some(c) = rest.chars().next() {
        let width = c.len_utf8();
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            rest = &rest[width..];
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
            rest = &rest[width..];
            continue;
        }

        if let Some(literal) = ["-Infinity", "Infinity", "NaN"]
            .iter()
            .find(|literal| rest.starts_with(**literal))
        {
            out.push_str("null");
            rest = &rest[literal.len()..];
            continue;
        }

        out.push(c);
        rest = &rest[width..];
    }

    Cow::Owned(out)
}
