//! Close-price extraction from raw price records.

use cointegrator_data::{ClosePrice, PriceRecord};
use tracing::{trace, warn};

/// Extracts the finite close prices of `records`, preserving order.
///
/// Records without a `close` field are reported and skipped; NaN or
/// otherwise unusable closes are skipped silently.
#[must_use]
pub fn extract_close_prices(symbol: &str, records: &[PriceRecord]) -> Vec<f64> {
    let mut closes = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        match record.close() {
            ClosePrice::Value(close) => closes.push(close),
            ClosePrice::Invalid => trace!(symbol, index, "Skipping invalid close price"),
            ClosePrice::Missing => warn!(
                symbol,
                index,
                record = ?record.fields(),
                "Could not find close price"
            ),
        }
    }

    closes
}
