//! Moving average crossover: a long market entry on the bar where the fast
//! SMA moves from at-or-below the slow SMA to strictly above it.

use crate::domain::indicator::sma::sma_at;
use crate::domain::ohlcv::Candle;
use crate::domain::signal::{Direction, Signal, SignalKind, SignalMeta};

use super::{SignalStrategy, SmaParams};

pub const NAME: &str = "sma";

#[derive(Debug, Clone, PartialEq)]
pub struct SmaCrossover {
    pub params: SmaParams,
}

impl SmaCrossover {
    pub fn new(params: SmaParams) -> Self {
        Self { params }
    }
}

impl SignalStrategy for SmaCrossover {
    fn name(&self) -> &'static str {
        NAME
    }

    fn min_bars(&self) -> usize {
        self.params.slow.max(self.params.fast) + 1
    }

    fn generate(&self, candles: &[Candle]) -> Option<Signal> {
        if candles.len() < self.min_bars() {
            return None;
        }

        let i = candles.len() - 1;
        let fast_now = sma_at(candles, i, self.params.fast)?;
        let slow_now = sma_at(candles, i, self.params.slow)?;
        let fast_prev = sma_at(candles, i - 1, self.params.fast)?;
        let slow_prev = sma_at(candles, i - 1, self.params.slow)?;

        if !(fast_prev <= slow_prev && fast_now > slow_now) {
            return None;
        }

        let bar = &candles[i];
        let entry = bar.close;
        if !entry.is_finite() {
            return None;
        }

        log::debug!(
            "sma cross at bar {}: fast {:.4} > slow {:.4}",
            i,
            fast_now,
            slow_now
        );

        Signal::new(
            NAME,
            SignalKind::MarketEntry,
            Direction::Long,
            vec![entry],
            entry * (1.0 - self.params.stop_pct),
            entry * (1.0 + self.params.target_pct),
            SignalMeta {
                signal_index: i,
                signal_time: bar.timestamp,
                setup: None,
            },
        )
    }
}
