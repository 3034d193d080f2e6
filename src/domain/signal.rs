//! Normalised trade signal produced by a strategy at one evaluation bar.

use chrono::NaiveDateTime;
use std::fmt;

use super::fib::NetZone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    MarketEntry,
    LimitBundle,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::MarketEntry => write!(f, "market_entry"),
            SignalKind::LimitBundle => write!(f, "limit_bundle"),
        }
    }
}

/// Structure behind a zone signal, kept for reporting and overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneSetup {
    pub swing_index: usize,
    pub bos_index: usize,
    pub pivot_low_index: usize,
    pub pivot_high_index: usize,
    pub swing_low: f64,
    pub swing_high: f64,
    pub zone: NetZone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalMeta {
    pub signal_index: usize,
    pub signal_time: NaiveDateTime,
    pub setup: Option<ZoneSetup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub strategy_name: String,
    pub kind: SignalKind,
    pub direction: Direction,
    pub entries: Vec<f64>,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub meta: SignalMeta,
}

impl Signal {
    /// `None` when `entries` is empty.
    pub fn new(
        strategy_name: &str,
        kind: SignalKind,
        direction: Direction,
        entries: Vec<f64>,
        stop_loss: f64,
        take_profit: f64,
        meta: SignalMeta,
    ) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        Some(Signal {
            strategy_name: strategy_name.to_string(),
            kind,
            direction,
            entries,
            stop_loss,
            take_profit,
            meta,
        })
    }

    /// The first (highest-priority) entry price.
    pub fn primary_entry(&self) -> f64 {
        self.entries[0]
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self.entries.iter().map(|e| format!("{:.4}", e)).collect();
        write!(
            f,
            "{} {} {} @ [{}] SL {:.4} TP {:.4} (bar {})",
            self.strategy_name,
            self.kind,
            self.direction,
            entries.join(", "),
            self.stop_loss,
            self.take_profit,
            self.meta.signal_index
        )
    }
}
