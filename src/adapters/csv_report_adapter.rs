//! CSV report writer for closed trades and the metrics snapshot.

use crate::domain::error::ZonetraderError;
use crate::domain::metrics::Metrics;
use crate::domain::trade::Trade;
use crate::ports::report_port::ReportPort;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TRADE_HEADER: [&str; 14] = [
    "id",
    "symbol",
    "strategy",
    "direction",
    "status",
    "entry_index",
    "exit_index",
    "opened_at",
    "closed_at",
    "entry_price",
    "exit_price",
    "size",
    "pnl",
    "exit_reason",
];

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn report_err(path: &str, e: impl std::fmt::Display) -> ZonetraderError {
    ZonetraderError::Report {
        reason: format!("{}: {}", path, e),
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl ReportPort for CsvReportAdapter {
    fn write_trades(&self, trades: &[Trade], output_path: &str) -> Result<(), ZonetraderError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| report_err(output_path, e))?;
        wtr.write_record(TRADE_HEADER)
            .map_err(|e| report_err(output_path, e))?;

        for t in trades {
            wtr.write_record([
                t.id.to_string(),
                t.symbol.clone(),
                t.strategy_name.clone(),
                t.direction.to_string(),
                t.status.to_string(),
                optional(t.entry_index),
                optional(t.exit_index),
                optional(t.opened_at.map(|ts| ts.format(TIME_FORMAT))),
                optional(t.closed_at.map(|ts| ts.format(TIME_FORMAT))),
                format!("{:.8}", t.entry_price_avg),
                optional(t.exit_price.map(|p| format!("{:.8}", p))),
                format!("{:.8}", t.size_total),
                format!("{:.8}", t.pnl),
                optional(t.exit_reason),
            ])
            .map_err(|e| report_err(output_path, e))?;
        }

        wtr.flush().map_err(|e| report_err(output_path, e))?;
        Ok(())
    }

    fn write_metrics(&self, metrics: &Metrics, output_path: &str) -> Result<(), ZonetraderError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| report_err(output_path, e))?;
        wtr.write_record(["metric", "value"])
            .map_err(|e| report_err(output_path, e))?;
        for (name, value) in metrics.named_values() {
            wtr.write_record([name.to_string(), value.to_string()])
                .map_err(|e| report_err(output_path, e))?;
        }
        wtr.flush().map_err(|e| report_err(output_path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::{Direction, Signal, SignalKind, SignalMeta};
    use crate::domain::trade::ExitReason;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn closed_trade() -> Trade {
        let t0 = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(4, 10, 0)
            .unwrap();
        let signal = Signal::new(
            "sma",
            SignalKind::MarketEntry,
            Direction::Long,
            vec![100.0],
            97.0,
            103.0,
            SignalMeta {
                signal_index: 50,
                signal_time: t0,
                setup: None,
            },
        )
        .unwrap();
        let mut trade = Trade::from_signal(1, "BTC/USDT", &signal, &[2.0]).unwrap();
        trade.open(t0, 50).unwrap();
        trade
            .close(t0 + chrono::Duration::minutes(15), 53, 103.0, ExitReason::TakeProfit)
            .unwrap();
        trade
    }

    #[test]
    fn writes_trades_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        let path = path.to_str().unwrap();

        CsvReportAdapter::new()
            .write_trades(&[closed_trade()], path)
            .unwrap();

        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,symbol,strategy,direction"));
        assert!(lines[1].starts_with("1,BTC/USDT,sma,long,closed,50,53,2024-01-01 04:10:00"));
        assert!(lines[1].ends_with("take_profit"));
    }

    #[test]
    fn writes_metrics_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metrics.csv");
        let path = path.to_str().unwrap();

        let metrics = Metrics::compute(&[closed_trade()], 1000.0);
        CsvReportAdapter::new().write_metrics(&metrics, path).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert!(content.starts_with("metric,value\n"));
        assert!(content.contains("ending_balance,1006\n"));
        assert!(content.contains("num_trades,1\n"));
    }

    #[test]
    fn unwritable_path_is_report_error() {
        let err = CsvReportAdapter::new()
            .write_trades(&[], "/nonexistent/dir/trades.csv")
            .unwrap_err();
        assert!(matches!(err, ZonetraderError::Report { .. }));
    }
}
