//! Report output port trait.

use crate::domain::error::ZonetraderError;
use crate::domain::metrics::Metrics;
use crate::domain::trade::Trade;

/// Port for writing backtest results downstream.
pub trait ReportPort {
    fn write_trades(&self, trades: &[Trade], output_path: &str) -> Result<(), ZonetraderError>;

    fn write_metrics(&self, metrics: &Metrics, output_path: &str) -> Result<(), ZonetraderError>;
}
