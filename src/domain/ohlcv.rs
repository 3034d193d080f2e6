//! OHLCV candle representation.

use chrono::NaiveDateTime;

use super::error::ZonetraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Check that timestamps are strictly increasing (no duplicates, no reordering).
pub fn validate_series(candles: &[Candle]) -> Result<(), ZonetraderError> {
    for (i, pair) in candles.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(ZonetraderError::Data {
                reason: format!(
                    "timestamps not strictly increasing at bar {}: {} after {}",
                    i + 1,
                    pair[1].timestamp,
                    pair[0].timestamp
                ),
            });
        }
    }
    Ok(())
}
