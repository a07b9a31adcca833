//! Data access for the cointegration scanner.
//!
//! This crate provides:
//! - The price-history store model and its JSON loader
//! - CSV table storage
//! - Fingerprinted on-disk caching of result tables

pub mod cache;
pub mod csv_storage;
pub mod price_history;

pub use cache::{CacheManifest, Fingerprint, ResultCache, CACHE_SCHEMA_VERSION};
pub use csv_storage::CsvStorage;
pub use price_history::{
    history_from_closes, ClosePrice, JsonPriceHistory, PriceHistory, PriceHistorySource,
    PriceRecord,
};
