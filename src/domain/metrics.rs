//! Performance metrics over closed trades.

use super::trade::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub starting_balance: f64,
    pub ending_balance: f64,
    pub net_profit: f64,
    pub net_return_pct: f64,
    pub num_trades: usize,
    pub win_rate_pct: f64,
    pub avg_trade_duration_secs: f64,
    pub max_trade_duration_secs: f64,
    pub min_trade_duration_secs: f64,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub max_drawdown_pct: f64,
}

impl Metrics {
    /// Reduce `trades` (only closed ones count) starting from `starting_balance`.
    pub fn compute(trades: &[Trade], starting_balance: f64) -> Self {
        let closed: Vec<&Trade> = trades.iter().filter(|t| t.is_closed()).collect();

        let net_profit: f64 = closed.iter().map(|t| t.pnl).sum();
        let ending_balance = starting_balance + net_profit;
        let net_return_pct = if starting_balance > 0.0 {
            net_profit / starting_balance * 100.0
        } else {
            0.0
        };

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;

        for trade in &closed {
            let pnl = trade.pnl;
            if pnl > 0.0 {
                trades_won += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            }
        }

        let num_trades = closed.len();
        let win_rate_pct = if num_trades > 0 {
            trades_won as f64 / num_trades as f64 * 100.0
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };

        let avg_loss = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        let durations: Vec<f64> = closed.iter().filter_map(|t| t.duration_secs()).collect();
        let (avg_trade_duration_secs, max_trade_duration_secs, min_trade_duration_secs) =
            if durations.is_empty() {
                (0.0, 0.0, 0.0)
            } else {
                (
                    durations.iter().sum::<f64>() / durations.len() as f64,
                    durations.iter().copied().fold(f64::MIN, f64::max),
                    durations.iter().copied().fold(f64::MAX, f64::min),
                )
            };

        let max_drawdown_pct = compute_drawdown_pct(starting_balance, &closed);

        Metrics {
            starting_balance,
            ending_balance,
            net_profit,
            net_return_pct,
            num_trades,
            win_rate_pct,
            avg_trade_duration_secs,
            max_trade_duration_secs,
            min_trade_duration_secs,
            trades_won,
            trades_lost,
            profit_factor,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            max_drawdown_pct,
        }
    }

    /// The snapshot as ordered name/value pairs for reports.
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("starting_balance", self.starting_balance),
            ("ending_balance", self.ending_balance),
            ("net_profit", self.net_profit),
            ("net_return_pct", self.net_return_pct),
            ("num_trades", self.num_trades as f64),
            ("win_rate_pct", self.win_rate_pct),
            ("avg_trade_duration_secs", self.avg_trade_duration_secs),
            ("max_trade_duration_secs", self.max_trade_duration_secs),
            ("min_trade_duration_secs", self.min_trade_duration_secs),
            ("trades_won", self.trades_won as f64),
            ("trades_lost", self.trades_lost as f64),
            ("profit_factor", self.profit_factor),
            ("avg_win", self.avg_win),
            ("avg_loss", self.avg_loss),
            ("largest_win", self.largest_win),
            ("largest_loss", self.largest_loss),
            ("max_drawdown_pct", self.max_drawdown_pct),
        ]
    }
}

/// Largest peak-to-trough drop of the balance after each closed trade.
fn compute_drawdown_pct(starting_balance: f64, closed: &[&Trade]) -> f64 {
    let mut peak = starting_balance;
    let mut balance = starting_balance;
    let mut max_dd = 0.0_f64;

    for trade in closed {
        balance += trade.pnl;
        if balance > peak {
            peak = balance;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - balance) / peak * 100.0);
        }
    }

    max_dd
}
