//! Trades and their entry orders.
//!
//! A trade moves `Pending -> Open -> Closed`, or `Pending -> Cancelled`.
//! It owns its orders and is never changed once closed.

use chrono::NaiveDateTime;
use std::fmt;

use super::signal::{Direction, Signal, SignalKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Limit,
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Open,
    Filled,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub side: OrderSide,
    pub kind: OrderKind,
    pub price: f64,
    pub size: f64,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Pending,
    Open,
    Closed,
    Cancelled,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeStatus::Pending => "pending",
            TradeStatus::Open => "open",
            TradeStatus::Closed => "closed",
            TradeStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    EndOfData,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TakeProfit => "take_profit",
            ExitReason::EndOfData => "end_of_data",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TradeError {
    #[error("trade cannot move from {from} to {to}")]
    InvalidTransition { from: TradeStatus, to: TradeStatus },

    #[error("{entries} entries but {sizes} sizes")]
    SizeMismatch { entries: usize, sizes: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub id: usize,
    pub symbol: String,
    pub strategy_name: String,
    pub direction: Direction,
    pub status: TradeStatus,
    pub orders: Vec<Order>,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub opened_at: Option<NaiveDateTime>,
    pub closed_at: Option<NaiveDateTime>,
    pub entry_index: Option<usize>,
    pub exit_index: Option<usize>,
    pub entry_price_avg: f64,
    pub exit_price: Option<f64>,
    pub exit_reason: Option<ExitReason>,
    pub size_total: f64,
    pub pnl: f64,
}

impl Trade {
    /// Pending trade with one order per signal entry. Limit orders start
    /// resting (`Open`), market orders `Pending`.
    pub fn from_signal(
        id: usize,
        symbol: &str,
        signal: &Signal,
        sizes: &[f64],
    ) -> Result<Self, TradeError> {
        if sizes.len() != signal.entries.len() {
            return Err(TradeError::SizeMismatch {
                entries: signal.entries.len(),
                sizes: sizes.len(),
            });
        }

        let side = match signal.direction {
            Direction::Long => OrderSide::Buy,
            Direction::Short => OrderSide::Sell,
        };
        let (kind, status) = match signal.kind {
            SignalKind::MarketEntry => (OrderKind::Market, OrderStatus::Pending),
            SignalKind::LimitBundle => (OrderKind::Limit, OrderStatus::Open),
        };

        let orders = signal
            .entries
            .iter()
            .zip(sizes)
            .map(|(&price, &size)| Order {
                side,
                kind,
                price,
                size,
                status,
            })
            .collect();

        Ok(Trade {
            id,
            symbol: symbol.to_string(),
            strategy_name: signal.strategy_name.clone(),
            direction: signal.direction,
            status: TradeStatus::Pending,
            orders,
            stop_loss: signal.stop_loss,
            take_profit: signal.take_profit,
            opened_at: None,
            closed_at: None,
            entry_index: None,
            exit_index: None,
            entry_price_avg: 0.0,
            exit_price: None,
            exit_reason: None,
            size_total: 0.0,
            pnl: 0.0,
        })
    }

    /// Fill every order at its price.
    pub fn open(&mut self, at: NaiveDateTime, index: usize) -> Result<(), TradeError> {
        self.transition(TradeStatus::Open)?;

        for order in &mut self.orders {
            order.status = OrderStatus::Filled;
        }
        self.size_total = self.orders.iter().map(|o| o.size).sum();
        self.entry_price_avg = if self.size_total > 0.0 {
            self.orders.iter().map(|o| o.price * o.size).sum::<f64>() / self.size_total
        } else {
            self.orders.iter().map(|o| o.price).sum::<f64>() / self.orders.len() as f64
        };
        self.opened_at = Some(at);
        self.entry_index = Some(index);
        Ok(())
    }

    pub fn close(
        &mut self,
        at: NaiveDateTime,
        index: usize,
        exit_price: f64,
        reason: ExitReason,
    ) -> Result<(), TradeError> {
        self.transition(TradeStatus::Closed)?;

        self.pnl = self.direction.sign() * (exit_price - self.entry_price_avg) * self.size_total;
        self.exit_price = Some(exit_price);
        self.exit_reason = Some(reason);
        self.closed_at = Some(at);
        self.exit_index = Some(index);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), TradeError> {
        self.transition(TradeStatus::Cancelled)?;
        for order in &mut self.orders {
            order.status = OrderStatus::Cancelled;
        }
        Ok(())
    }

    fn transition(&mut self, to: TradeStatus) -> Result<(), TradeError> {
        let allowed = matches!(
            (self.status, to),
            (TradeStatus::Pending, TradeStatus::Open)
                | (TradeStatus::Pending, TradeStatus::Cancelled)
                | (TradeStatus::Open, TradeStatus::Closed)
        );
        if !allowed {
            return Err(TradeError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.status == TradeStatus::Closed
    }

    pub fn is_win(&self) -> bool {
        self.is_closed() && self.pnl > 0.0
    }

    /// Seconds between open and close, for closed trades.
    pub fn duration_secs(&self) -> Option<f64> {
        match (self.opened_at, self.closed_at) {
            (Some(open), Some(close)) => Some((close - open).num_seconds() as f64),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::SignalMeta;
    use chrono::{Duration, NaiveDate};

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn signal(kind: SignalKind, direction: Direction, entries: Vec<f64>) -> Signal {
        Signal::new(
            "test",
            kind,
            direction,
            entries,
            95.0,
            110.0,
            SignalMeta {
                signal_index: 0,
                signal_time: t0(),
                setup: None,
            },
        )
        .unwrap()
    }

    fn long_market() -> Trade {
        let s = signal(SignalKind::MarketEntry, Direction::Long, vec![100.0]);
        Trade::from_signal(1, "BTC/USDT", &s, &[2.0]).unwrap()
    }

    #[test]
    fn from_signal_builds_pending_orders() {
        let s = signal(SignalKind::LimitBundle, Direction::Long, vec![102.0, 100.0]);
        let trade = Trade::from_signal(7, "ETH/USDT", &s, &[1.0, 1.0]).unwrap();
        assert_eq!(trade.status, TradeStatus::Pending);
        assert_eq!(trade.orders.len(), 2);
        assert!(trade.orders.iter().all(|o| o.kind == OrderKind::Limit));
        assert!(trade.orders.iter().all(|o| o.side == OrderSide::Buy));
        assert!(trade.orders.iter().all(|o| o.status == OrderStatus::Open));
        assert_eq!(trade.strategy_name, "test");
    }

    #[test]
    fn short_signal_sells() {
        let s = signal(SignalKind::MarketEntry, Direction::Short, vec![100.0]);
        let trade = Trade::from_signal(1, "BTC/USDT", &s, &[1.0]).unwrap();
        assert_eq!(trade.orders[0].side, OrderSide::Sell);
        assert_eq!(trade.orders[0].kind, OrderKind::Market);
        assert_eq!(trade.orders[0].status, OrderStatus::Pending);
    }

    #[test]
    fn size_mismatch_rejected() {
        let s = signal(SignalKind::LimitBundle, Direction::Long, vec![102.0, 100.0]);
        assert_eq!(
            Trade::from_signal(1, "BTC/USDT", &s, &[1.0]),
            Err(TradeError::SizeMismatch {
                entries: 2,
                sizes: 1
            })
        );
    }

    #[test]
    fn open_fills_and_averages() {
        let s = signal(SignalKind::LimitBundle, Direction::Long, vec![104.0, 100.0]);
        let mut trade = Trade::from_signal(1, "BTC/USDT", &s, &[1.0, 3.0]).unwrap();
        trade.open(t0(), 10).unwrap();
        assert_eq!(trade.status, TradeStatus::Open);
        assert!(trade.orders.iter().all(|o| o.status == OrderStatus::Filled));
        assert!((trade.size_total - 4.0).abs() < f64::EPSILON);
        assert!((trade.entry_price_avg - 101.0).abs() < 1e-12);
        assert_eq!(trade.entry_index, Some(10));
    }

    #[test]
    fn long_pnl() {
        let mut trade = long_market();
        trade.open(t0(), 5).unwrap();
        trade
            .close(t0() + Duration::minutes(30), 11, 110.0, ExitReason::TakeProfit)
            .unwrap();
        assert_eq!(trade.status, TradeStatus::Closed);
        assert!((trade.pnl - 20.0).abs() < 1e-12);
        assert_eq!(trade.exit_index, Some(11));
        assert_eq!(trade.exit_reason, Some(ExitReason::TakeProfit));
        assert_eq!(trade.duration_secs(), Some(1800.0));
        assert!(trade.is_win());
    }

    #[test]
    fn short_pnl() {
        let s = signal(SignalKind::MarketEntry, Direction::Short, vec![100.0]);
        let mut trade = Trade::from_signal(1, "BTC/USDT", &s, &[2.0]).unwrap();
        trade.open(t0(), 0).unwrap();
        trade.close(t0(), 3, 104.0, ExitReason::StopLoss).unwrap();
        assert!((trade.pnl + 8.0).abs() < 1e-12);
        assert!(!trade.is_win());
    }

    #[test]
    fn illegal_transitions() {
        let mut trade = long_market();
        assert_eq!(
            trade.close(t0(), 1, 100.0, ExitReason::EndOfData),
            Err(TradeError::InvalidTransition {
                from: TradeStatus::Pending,
                to: TradeStatus::Closed
            })
        );

        trade.open(t0(), 0).unwrap();
        assert!(trade.open(t0(), 0).is_err());
        assert!(trade.cancel().is_err());

        trade.close(t0(), 1, 100.0, ExitReason::EndOfData).unwrap();
        assert!(trade.close(t0(), 2, 90.0, ExitReason::StopLoss).is_err());
        assert_eq!(trade.exit_price, Some(100.0));
    }

    #[test]
    fn cancel_pending() {
        let mut trade = long_market();
        trade.cancel().unwrap();
        assert_eq!(trade.status, TradeStatus::Cancelled);
        assert!(trade.orders.iter().all(|o| o.status == OrderStatus::Cancelled));
        assert!(trade.open(t0(), 0).is_err());
        assert_eq!(trade.duration_secs(), None);
    }

    #[test]
    fn error_message() {
        let err = TradeError::InvalidTransition {
            from: TradeStatus::Closed,
            to: TradeStatus::Open,
        };
        assert_eq!(err.to_string(), "trade cannot move from closed to open");
    }
}
