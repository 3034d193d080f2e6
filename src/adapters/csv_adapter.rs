//! CSV file candle source.
//!
//! One file per symbol and timeframe, named `{symbol}_{timeframe}.csv` with
//! `/` in the symbol replaced by `-` (e.g. `BTC-USDT_5m.csv`). Columns are
//! `timestamp,open,high,low,close,volume`; the timestamp is either
//! `YYYY-MM-DD HH:MM:SS` or epoch milliseconds.

use crate::domain::error::ZonetraderError;
use crate::domain::ohlcv::Candle;
use crate::ports::candle_source::CandleSource;
use chrono::{DateTime, NaiveDateTime};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol.replace('/', "-"), timeframe))
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ZonetraderError> {
    let value = value.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Ok(ts);
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| ZonetraderError::Data {
            reason: format!("invalid timestamp '{}'", value),
        })
}

fn parse_field(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, ZonetraderError> {
    record
        .get(index)
        .ok_or_else(|| ZonetraderError::Data {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| ZonetraderError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl CandleSource for CsvAdapter {
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, ZonetraderError> {
        let path = self.csv_path(symbol, timeframe);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ZonetraderError::NoData {
                    symbol: symbol.to_string(),
                    timeframe: timeframe.to_string(),
                });
            }
            Err(e) => {
                return Err(ZonetraderError::Data {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| ZonetraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let ts_str = record.get(0).ok_or_else(|| ZonetraderError::Data {
                reason: "missing timestamp column".into(),
            })?;

            candles.push(Candle {
                timestamp: parse_timestamp(ts_str)?,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_field(&record, 5, "volume")?,
            });
        }

        if candles.is_empty() {
            return Err(ZonetraderError::NoData {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
            });
        }

        candles.sort_by_key(|c| c.timestamp);
        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }
        log::debug!(
            "loaded {} candles for {} {} from {}",
            candles.len(),
            symbol,
            timeframe,
            path.display()
        );
        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "timestamp,open,high,low,close,volume\n\
            2024-01-15 00:10:00,110.0,120.0,105.0,115.0,5.5\n\
            2024-01-15 00:00:00,100.0,110.0,90.0,105.0,5.0\n\
            2024-01-15 00:05:00,105.0,115.0,100.0,110.0,6.0\n";

        fs::write(path.join("BTC-USDT_5m.csv"), csv_content).unwrap();
        fs::write(
            path.join("ETH-USDT_5m.csv"),
            "timestamp,open,high,low,close,volume\n",
        )
        .unwrap();
        fs::write(
            path.join("SOL-USDT_1h.csv"),
            "timestamp,open,high,low,close,volume\n1704067200000,10,11,9,10.5,100\n",
        )
        .unwrap();
        fs::write(
            path.join("BAD-USDT_5m.csv"),
            "timestamp,open,high,low,close,volume\n2024-01-15 00:00:00,abc,1,1,1,1\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn file_name_from_symbol() {
        let adapter = CsvAdapter::new(PathBuf::from("/data"));
        assert_eq!(
            adapter.csv_path("BTC/USDT", "5m"),
            PathBuf::from("/data/BTC-USDT_5m.csv")
        );
    }

    #[test]
    fn fetch_candles_sorted() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let candles = adapter.fetch_candles("BTC/USDT", "5m", 100).unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(
            candles[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(candles[0].open, 100.0);
        assert_eq!(candles[0].high, 110.0);
        assert_eq!(candles[0].low, 90.0);
        assert_eq!(candles[0].close, 105.0);
        assert_eq!(candles[0].volume, 5.0);
        assert_eq!(candles[2].close, 115.0);
    }

    #[test]
    fn limit_keeps_most_recent() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let candles = adapter.fetch_candles("BTC/USDT", "5m", 2).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 110.0);
        assert_eq!(candles[1].close, 115.0);
    }

    #[test]
    fn epoch_millis_timestamps() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let candles = adapter.fetch_candles("SOL/USDT", "1h", 10).unwrap();
        assert_eq!(
            candles[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn empty_file_is_no_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter.fetch_candles("ETH/USDT", "5m", 10).unwrap_err();
        assert!(matches!(err, ZonetraderError::NoData { .. }));
    }

    #[test]
    fn missing_file_is_no_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter.fetch_candles("DOGE/USDT", "5m", 10).unwrap_err();
        assert!(matches!(err, ZonetraderError::NoData { .. }));
    }

    #[test]
    fn malformed_value_is_data_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter.fetch_candles("BAD/USDT", "5m", 10).unwrap_err();
        assert!(matches!(err, ZonetraderError::Data { .. }));
    }

    #[test]
    fn bad_timestamp_rejected() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp(" 2024-01-15 00:00:00 ").is_ok());
    }
}
