//! Break-of-structure (BOS) detection.
//!
//! Two detectors live here:
//!
//! - [`detect_break_of_structure`] works from a [`PivotSeries`]: a bar is a
//!   bullish BOS when its close is above the most recent confirmed pivot high,
//!   bearish when below the most recent confirmed pivot low.
//! - [`find_active_structure`] works from closes only: a swing high at `i`
//!   closes strictly above every close in the `left` bars before and the
//!   `right` bars after it, and its BOS is the first later bar closing above
//!   the swing close. The pair with the latest BOS bar is the active one.

use chrono::NaiveDateTime;

use super::ohlcv::Candle;
use super::pivot::PivotSeries;

pub const DEFAULT_LOOKBACK_PIVOTS: usize = 10;

/// Per-bar BOS flags from the pivot-based detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BosFlags {
    pub up: bool,
    pub down: bool,
}

/// Pivot-based BOS over the whole series.
///
/// A pivot at `j` can only be broken at `i` once it is confirmed, i.e.
/// `j < i` and `j + right <= i`. Of the confirmed pivots only the last
/// `lookback_pivots` are considered, and the newest of those is the level.
pub fn detect_break_of_structure(
    candles: &[Candle],
    pivots: &PivotSeries,
    lookback_pivots: usize,
) -> Vec<BosFlags> {
    let mut flags = vec![BosFlags::default(); candles.len()];
    if lookback_pivots == 0 {
        return flags;
    }

    let high_indices = pivots.high_indices();
    let low_indices = pivots.low_indices();

    for (i, candle) in candles.iter().enumerate().skip(1) {
        if let Some(level) = latest_confirmed(&high_indices, &pivots.highs, i, pivots.right) {
            flags[i].up = candle.close > level;
        }
        if let Some(level) = latest_confirmed(&low_indices, &pivots.lows, i, pivots.right) {
            flags[i].down = candle.close < level;
        }
    }

    flags
}

fn latest_confirmed(
    indices: &[usize],
    prices: &[Option<f64>],
    at: usize,
    right: usize,
) -> Option<f64> {
    indices
        .iter()
        .rev()
        .find(|&&j| j < at && j + right <= at)
        .and_then(|&j| prices[j])
}

/// A swing high confirmed on closes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingHigh {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub level: f64,
}

/// A swing high together with the bar that first closed above it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Structure {
    pub swing: SwingHigh,
    pub bos_index: usize,
    pub bos_timestamp: NaiveDateTime,
}

/// Close-based swing highs, strict on both sides (no ties).
pub fn find_swing_highs(candles: &[Candle], left: usize, right: usize) -> Vec<SwingHigh> {
    let n = candles.len();
    if n < left + right + 1 {
        return Vec::new();
    }

    (left..n - right)
        .filter(|&i| {
            let close = candles[i].close;
            candles[i - left..i].iter().all(|c| close > c.close)
                && candles[i + 1..=i + right].iter().all(|c| close > c.close)
        })
        .map(|i| SwingHigh {
            index: i,
            timestamp: candles[i].timestamp,
            level: candles[i].close,
        })
        .collect()
}

/// First bar after the swing whose close exceeds the swing close.
pub fn find_bos(candles: &[Candle], swing: &SwingHigh) -> Option<usize> {
    candles
        .iter()
        .enumerate()
        .skip(swing.index + 1)
        .find(|(_, c)| c.close > swing.level)
        .map(|(i, _)| i)
}

/// The most recently confirmed swing/BOS pair, or `None` when no swing has
/// been broken yet. When two swings are broken by the same bar the later
/// swing wins.
pub fn find_active_structure(candles: &[Candle], left: usize, right: usize) -> Option<Structure> {
    let mut active: Option<Structure> = None;

    for swing in find_swing_highs(candles, left, right) {
        let Some(bos_index) = find_bos(candles, &swing) else {
            continue;
        };
        let newer = match &active {
            Some(current) => bos_index >= current.bos_index,
            None => true,
        };
        if newer {
            active = Some(Structure {
                swing,
                bos_index,
                bos_timestamp: candles[bos_index].timestamp,
            });
        }
    }

    active
}
