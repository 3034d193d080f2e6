//! Rolling store of closed candles plus the currently forming candle.
//!
//! The store is the hand-off point between a candle source and the engine:
//! history is appended in time order and trimmed to `max_bars`, and the
//! engine reads it as an immutable slice.

use std::collections::VecDeque;

use super::error::ZonetraderError;
use super::ohlcv::Candle;

#[derive(Debug, Clone)]
pub struct CandleStore {
    max_bars: usize,
    closed: VecDeque<Candle>,
    forming: Option<Candle>,
}

impl CandleStore {
    pub fn new(max_bars: usize) -> Self {
        Self {
            max_bars: max_bars.max(1),
            closed: VecDeque::with_capacity(max_bars.max(1)),
            forming: None,
        }
    }

    /// Build a store from already-loaded history, keeping the newest `max_bars`.
    pub fn from_history(max_bars: usize, candles: Vec<Candle>) -> Result<Self, ZonetraderError> {
        let mut store = Self::new(max_bars);
        for candle in candles {
            store.push_closed(candle)?;
        }
        Ok(store)
    }

    /// Append a closed candle, evicting the oldest one past capacity.
    pub fn push_closed(&mut self, candle: Candle) -> Result<(), ZonetraderError> {
        if let Some(last) = self.closed.back() {
            if candle.timestamp <= last.timestamp {
                return Err(ZonetraderError::Data {
                    reason: format!(
                        "candle at {} is not after last closed candle at {}",
                        candle.timestamp, last.timestamp
                    ),
                });
            }
        }
        self.closed.push_back(candle);
        while self.closed.len() > self.max_bars {
            self.closed.pop_front();
        }
        Ok(())
    }

    pub fn set_forming(&mut self, candle: Candle) {
        self.forming = Some(candle);
    }

    pub fn forming(&self) -> Option<&Candle> {
        self.forming.as_ref()
    }

    /// Contiguous copy of the closed history, oldest first.
    pub fn closed(&self) -> Vec<Candle> {
        self.closed.iter().cloned().collect()
    }

    pub fn last_closed(&self) -> Option<&Candle> {
        self.closed.back()
    }

    pub fn len(&self) -> usize {
        self.closed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closed.is_empty()
    }

    pub fn max_bars(&self) -> usize {
        self.max_bars
    }
}
