#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use zonetrader::domain::error::ZonetraderError;
pub use zonetrader::domain::ohlcv::Candle;
use zonetrader::ports::candle_source::CandleSource;

pub struct MockCandleSource {
    pub data: HashMap<(String, String), Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockCandleSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, timeframe: &str, candles: Vec<Candle>) -> Self {
        self.data
            .insert((symbol.to_string(), timeframe.to_string()), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl CandleSource for MockCandleSource {
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, ZonetraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ZonetraderError::Data {
                reason: reason.clone(),
            });
        }
        let candles = self
            .data
            .get(&(symbol.to_string(), timeframe.to_string()))
            .cloned()
            .unwrap_or_default();
        if candles.is_empty() {
            return Err(ZonetraderError::NoData {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
            });
        }
        let skip = candles.len().saturating_sub(limit);
        Ok(candles.into_iter().skip(skip).collect())
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// 5-minute bar `i` with explicit OHLC.
pub fn make_bar(i: usize, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        timestamp: start_time() + Duration::minutes(5 * i as i64),
        open,
        high,
        low,
        close,
        volume: 10.0,
    }
}

/// Bars with `high = close + spread`, `low = close - spread`.
pub fn candles_from_closes(closes: &[f64], spread: f64) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c, c + spread, c - spread, c))
        .collect()
}

/// Flat base, swing high at 54, BOS at 60, first pivot high after the
/// break at 62 (confirmed on bar 63), then a fade.
pub fn zone_setup_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 50];
    closes.extend_from_slice(&[
        101.0, 102.0, 103.0, 104.0, 106.0, 104.0, 103.0, 102.0, 103.0, 105.0, 107.0, 109.0,
        111.0, 110.0, 109.0, 108.0, 107.0, 106.0, 105.0,
    ]);
    closes
}

/// Flat at 100 before bar 60, 110 from bar 60 on: the 10/50 SMA cross is at 60.
pub fn sma_cross_closes(len: usize) -> Vec<f64> {
    (0..len).map(|i| if i < 60 { 100.0 } else { 110.0 }).collect()
}

pub fn write_candles_csv(dir: &Path, symbol: &str, timeframe: &str, candles: &[Candle]) {
    let mut content = String::from("timestamp,open,high,low,close,volume\n");
    for c in candles {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            c.timestamp.format("%Y-%m-%d %H:%M:%S"),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        ));
    }
    let name = format!("{}_{}.csv", symbol.replace('/', "-"), timeframe);
    fs::write(dir.join(name), content).unwrap();
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
