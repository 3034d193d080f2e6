//! Headless bar-by-bar replay of a finished backtest.
//!
//! The session borrows the candle series and trades, so it can only read the
//! backtest result.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::ohlcv::Candle;
use super::trade::Trade;

pub const DEFAULT_START_BAR: usize = 50;
pub const DEFAULT_WINDOW: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplaySpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl ReplaySpeed {
    pub fn interval(self) -> Duration {
        match self {
            ReplaySpeed::Slow => Duration::from_millis(1000),
            ReplaySpeed::Normal => Duration::from_millis(400),
            ReplaySpeed::Fast => Duration::from_millis(150),
        }
    }
}

impl FromStr for ReplaySpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "slow" => Ok(ReplaySpeed::Slow),
            "normal" => Ok(ReplaySpeed::Normal),
            "fast" => Ok(ReplaySpeed::Fast),
            other => Err(format!("unknown replay speed '{other}'")),
        }
    }
}

impl fmt::Display for ReplaySpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReplaySpeed::Slow => "slow",
            ReplaySpeed::Normal => "normal",
            ReplaySpeed::Fast => "fast",
        };
        write!(f, "{s}")
    }
}

/// What is visible at the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayFrame<'a> {
    pub cursor: usize,
    /// Index of `candles[0]` in the full series.
    pub window_start: usize,
    pub candles: &'a [Candle],
    pub trades: Vec<&'a Trade>,
}

#[derive(Debug, Clone)]
pub struct ReplaySession<'a> {
    candles: &'a [Candle],
    trades: &'a [Trade],
    cursor: usize,
    window_size: usize,
}

impl<'a> ReplaySession<'a> {
    pub fn new(candles: &'a [Candle], trades: &'a [Trade]) -> Self {
        Self::with_window(candles, trades, DEFAULT_WINDOW)
    }

    pub fn with_window(candles: &'a [Candle], trades: &'a [Trade], window_size: usize) -> Self {
        ReplaySession {
            candles,
            trades,
            cursor: DEFAULT_START_BAR.min(candles.len().saturating_sub(1)),
            window_size: window_size.max(1),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor + 1 >= self.candles.len()
    }

    /// Advance one bar; `false` once the last bar is showing.
    pub fn step(&mut self) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn jump_to_end(&mut self) {
        self.cursor = self.candles.len().saturating_sub(1);
    }

    pub fn frame(&self) -> ReplayFrame<'a> {
        if self.candles.is_empty() {
            return ReplayFrame {
                cursor: 0,
                window_start: 0,
                candles: &[],
                trades: Vec::new(),
            };
        }

        let end = self.cursor + 1;
        let window_start = end.saturating_sub(self.window_size);
        let trades = self
            .trades
            .iter()
            .filter(|t| t.entry_index.is_some_and(|e| e <= self.cursor))
            .collect();

        ReplayFrame {
            cursor: self.cursor,
            window_start,
            candles: &self.candles[window_start..end],
            trades,
        }
    }
}
