//! Bar-by-bar backtest loop.
//!
//! Starting at the warm-up offset, the strategy is evaluated on each prefix.
//! A market entry is sized against the running balance, opened at its entry
//! price and walked forward until stop-loss, take-profit or the last bar.
//! Scanning resumes on the bar after the exit, so trades never overlap.

use super::ohlcv::Candle;
use super::signal::{Direction, SignalKind};
use super::sizing::size_equal;
use super::strategy::SignalStrategy;
use super::trade::{ExitReason, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    pub starting_balance: f64,
    pub risk_pct: f64,
    pub warmup_bars: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            symbol: "BTC/USDT".to_string(),
            starting_balance: 2000.0,
            risk_pct: 0.02,
            warmup_bars: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub starting_balance: f64,
    pub ending_balance: f64,
    /// Signals seen but not simulated (limit bundles).
    pub skipped_signals: usize,
}

/// Walk forward from `entry_index` until the trade exits.
///
/// The stop is checked before the target on every bar, for both directions,
/// and both fill exactly at their level. With no exit before the series
/// ends, the trade closes at the final close.
pub fn simulate_trade(
    candles: &[Candle],
    entry_index: usize,
    direction: Direction,
    stop_loss: f64,
    take_profit: f64,
) -> (usize, f64, ExitReason) {
    for (i, bar) in candles.iter().enumerate().skip(entry_index + 1) {
        let (stopped, targeted) = match direction {
            Direction::Long => (bar.low <= stop_loss, bar.high >= take_profit),
            Direction::Short => (bar.high >= stop_loss, bar.low <= take_profit),
        };
        if stopped {
            return (i, stop_loss, ExitReason::StopLoss);
        }
        if targeted {
            return (i, take_profit, ExitReason::TakeProfit);
        }
    }

    let last = candles.len().saturating_sub(1);
    let exit_price = candles.get(last).map_or(f64::NAN, |c| c.close);
    (last, exit_price, ExitReason::EndOfData)
}

pub fn run_backtest<S: SignalStrategy + ?Sized>(
    candles: &[Candle],
    strategy: &S,
    config: &BacktestConfig,
) -> BacktestResult {
    let mut trades = Vec::new();
    let mut balance = config.starting_balance;
    let mut skipped_signals = 0;
    let mut i = config.warmup_bars;

    while i < candles.len() {
        let Some(signal) = strategy.generate(&candles[..=i]) else {
            i += 1;
            continue;
        };

        if signal.kind != SignalKind::MarketEntry {
            log::debug!("bar {}: {} not simulated, skipping", i, signal.kind);
            skipped_signals += 1;
            i += 1;
            continue;
        }

        let sizes = match size_equal(&signal.entries, signal.stop_loss, balance, config.risk_pct) {
            Ok(sizes) => sizes,
            Err(e) => {
                log::warn!("bar {}: sizing failed: {}", i, e);
                i += 1;
                continue;
            }
        };

        let mut trade = match Trade::from_signal(trades.len() + 1, &config.symbol, &signal, &sizes) {
            Ok(trade) => trade,
            Err(e) => {
                log::warn!("bar {}: {}", i, e);
                i += 1;
                continue;
            }
        };

        let (exit_index, exit_price, reason) =
            simulate_trade(candles, i, signal.direction, signal.stop_loss, signal.take_profit);

        let filled = trade.open(candles[i].timestamp, i).and_then(|_| {
            trade.close(candles[exit_index].timestamp, exit_index, exit_price, reason)
        });
        if let Err(e) = filled {
            log::warn!("bar {}: {}", i, e);
            i += 1;
            continue;
        }

        balance += trade.pnl;
        log::info!(
            "trade {} {} @ {:.4} -> {:.4} ({}) pnl {:.2} balance {:.2}",
            trade.id,
            trade.direction,
            trade.entry_price_avg,
            exit_price,
            reason,
            trade.pnl,
            balance
        );

        trades.push(trade);
        i = exit_index + 1;
    }

    BacktestResult {
        trades,
        starting_balance: config.starting_balance,
        ending_balance: balance,
        skipped_signals,
    }
}
