//! Pivot (swing point) detection.
//!
//! Bar `i` is a pivot high when `high[i]` equals the maximum high over the
//! window `[i-left, i+right]`; ties count. Pivot lows mirror this with lows
//! and the minimum. Bars closer than `left` to the start or `right` to the
//! end cannot be pivots.

use chrono::NaiveDateTime;

use super::ohlcv::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PivotKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub kind: PivotKind,
}

/// Pivot prices aligned bar-for-bar with the candle series they were
/// computed from; `None` where the bar is not a pivot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotSeries {
    pub highs: Vec<Option<f64>>,
    pub lows: Vec<Option<f64>>,
    pub left: usize,
    pub right: usize,
}

impl PivotSeries {
    pub fn len(&self) -> usize {
        self.highs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.highs.is_empty()
    }

    pub fn is_pivot_high(&self, index: usize) -> bool {
        matches!(self.highs.get(index), Some(Some(_)))
    }

    pub fn is_pivot_low(&self, index: usize) -> bool {
        matches!(self.lows.get(index), Some(Some(_)))
    }

    /// Indices of pivot highs, ascending.
    pub fn high_indices(&self) -> Vec<usize> {
        indices_of(&self.highs)
    }

    /// Indices of pivot lows, ascending.
    pub fn low_indices(&self) -> Vec<usize> {
        indices_of(&self.lows)
    }

    /// First pivot high with index in `(after, before)`.
    pub fn first_high_between(&self, after: usize, before: usize) -> Option<usize> {
        (after + 1..before.min(self.len())).find(|&i| self.is_pivot_high(i))
    }

    /// Last pivot low with index strictly below `before`.
    pub fn last_low_before(&self, before: usize) -> Option<usize> {
        (0..before.min(self.len())).rev().find(|&i| self.is_pivot_low(i))
    }

    /// Pivots as tuples, ordered by index (a bar that is both high and low
    /// yields the high first).
    pub fn pivots(&self, candles: &[Candle]) -> Vec<Pivot> {
        let mut out = Vec::new();
        for (i, candle) in candles.iter().enumerate().take(self.len()) {
            if let Some(price) = self.highs[i] {
                out.push(Pivot {
                    index: i,
                    timestamp: candle.timestamp,
                    price,
                    kind: PivotKind::High,
                });
            }
            if let Some(price) = self.lows[i] {
                out.push(Pivot {
                    index: i,
                    timestamp: candle.timestamp,
                    price,
                    kind: PivotKind::Low,
                });
            }
        }
        out
    }
}

fn indices_of(series: &[Option<f64>]) -> Vec<usize> {
    series
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect()
}

pub fn detect_pivots(candles: &[Candle], left: usize, right: usize) -> PivotSeries {
    let n = candles.len();
    let mut highs = vec![None; n];
    let mut lows = vec![None; n];

    if n > left + right {
        for i in left..n - right {
            let window = &candles[i - left..=i + right];
            let high = candles[i].high;
            let low = candles[i].low;

            if window.iter().all(|c| c.high <= high) {
                highs[i] = Some(high);
            }
            if window.iter().all(|c| c.low >= low) {
                lows[i] = Some(low);
            }
        }
    }

    PivotSeries {
        highs,
        lows,
        left,
        right,
    }
}
