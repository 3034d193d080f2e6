//! Simple Moving Average over closes.
//!
//! SMA(n)[i] = sum(C[i-n+1..=i]) / n. Warmup: first (n-1) bars have no value.
//! Each window is summed directly so equal inputs give bit-identical averages.

use crate::domain::ohlcv::Candle;

/// SMA of closes for the window ending at `index` (inclusive).
pub fn sma_at(candles: &[Candle], index: usize, period: usize) -> Option<f64> {
    if period == 0 || index >= candles.len() || index + 1 < period {
        return None;
    }
    let window = &candles[index + 1 - period..=index];
    let mean = window.iter().map(|c| c.close).sum::<f64>() / period as f64;
    mean.is_finite().then_some(mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn make_candles(prices: &[f64]) -> Vec<Candle> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: start + Duration::minutes(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn sma_warmup() {
        let candles = make_candles(&[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(sma_at(&candles, 0, 3), None);
        assert_eq!(sma_at(&candles, 1, 3), None);
        assert_eq!(sma_at(&candles, 2, 3), Some(20.0));
        assert_eq!(sma_at(&candles, 3, 3), Some(30.0));
    }

    #[test]
    fn sma_period_1_is_close() {
        let candles = make_candles(&[10.0, 20.0, 30.0]);
        assert_eq!(sma_at(&candles, 0, 1), Some(10.0));
        assert_eq!(sma_at(&candles, 2, 1), Some(30.0));
    }

    #[test]
    fn sma_period_0_has_no_value() {
        let candles = make_candles(&[10.0, 20.0]);
        assert_eq!(sma_at(&candles, 1, 0), None);
        assert_eq!(sma_at(&[], 0, 3), None);
    }

    #[test]
    fn sma_at_out_of_range() {
        let candles = make_candles(&[10.0, 20.0]);
        assert_eq!(sma_at(&candles, 5, 1), None);
    }

    #[test]
    fn sma_nan_close_has_no_value() {
        let candles = make_candles(&[10.0, f64::NAN, 30.0]);
        assert_eq!(sma_at(&candles, 2, 2), None);
        assert_eq!(sma_at(&candles, 0, 1), Some(10.0));
    }

    #[test]
    fn sma_flat_series_is_exact() {
        let candles = make_candles(&[100.0; 60]);
        assert_eq!(sma_at(&candles, 59, 10), sma_at(&candles, 59, 50));
    }
}
