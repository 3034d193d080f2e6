//! Market data port: the external OHLCV provider.

use crate::domain::error::ZonetraderError;
use crate::domain::ohlcv::Candle;

pub trait CandleSource {
    /// The most recent `limit` closed candles for `symbol` on `timeframe`,
    /// oldest first.
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, ZonetraderError>;
}
