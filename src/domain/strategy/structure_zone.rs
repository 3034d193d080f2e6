//! Structure/zone strategy ("1pad").
//!
//! 1. Find the active close-based swing high and its break of structure.
//! 2. Take the first pivot high after the BOS and the last pivot low before it.
//! 3. Build Fibonacci levels on that swing and the net zone around 0.618.
//! 4. Emit a long limit bundle laddered across the zone, stop at the swing
//!    low side (1.0), target at 0.236.
//!
//! The bundle is emitted once, on the bar that confirms the pivot high; price
//! does not need to be inside the zone.

use crate::domain::fib::{build_net_zone, compute_fib_levels, ANCHOR_RATIO, DEFAULT_RATIOS, TARGET_RATIO};
use crate::domain::ohlcv::Candle;
use crate::domain::pivot::detect_pivots;
use crate::domain::signal::{Direction, Signal, SignalKind, SignalMeta, ZoneSetup};
use crate::domain::structure::find_active_structure;

use super::{SignalStrategy, ZoneParams};

pub const NAME: &str = "1pad";

#[derive(Debug, Clone, PartialEq)]
pub struct StructureZone {
    pub params: ZoneParams,
    pub num_limit_orders: usize,
}

impl StructureZone {
    pub fn new(params: ZoneParams, num_limit_orders: usize) -> Self {
        Self {
            params,
            num_limit_orders,
        }
    }
}

impl SignalStrategy for StructureZone {
    fn name(&self) -> &'static str {
        NAME
    }

    fn min_bars(&self) -> usize {
        let p = &self.params;
        p.min_bars
            .max(p.structure_left + p.structure_right + 1)
            .max(p.pivot_left + p.pivot_right + 1)
    }

    fn generate(&self, candles: &[Candle]) -> Option<Signal> {
        if candles.len() < self.min_bars() || self.num_limit_orders == 0 {
            return None;
        }
        let p = &self.params;
        let eval = candles.len() - 1;

        let structure = find_active_structure(candles, p.structure_left, p.structure_right)?;
        let pivots = detect_pivots(candles, p.pivot_left, p.pivot_right);

        // with pivot_right == 0 the evaluation bar confirms itself
        let pivot_high_index = pivots.first_high_between(structure.bos_index, eval + 1)?;
        if pivot_high_index + p.pivot_right != eval {
            return None;
        }
        let pivot_low_index = pivots.last_low_before(structure.bos_index)?;

        let swing_low = candles[pivot_low_index].low;
        let swing_high = candles[pivot_high_index].high;

        let fibs = compute_fib_levels(swing_low, swing_high, Direction::Long, &DEFAULT_RATIOS)?;
        let zone = build_net_zone(&fibs, p.net_factor)?;

        log::debug!(
            "1pad setup at bar {}: swing {}..{} bos {} zone [{:.4}, {:.4}]",
            eval,
            pivot_low_index,
            pivot_high_index,
            structure.bos_index,
            zone.bottom,
            zone.top
        );

        Signal::new(
            NAME,
            SignalKind::LimitBundle,
            Direction::Long,
            zone.ladder(self.num_limit_orders),
            fibs.price_at(ANCHOR_RATIO),
            fibs.price_at(TARGET_RATIO),
            SignalMeta {
                signal_index: eval,
                signal_time: candles[eval].timestamp,
                setup: Some(ZoneSetup {
                    swing_index: structure.swing.index,
                    bos_index: structure.bos_index,
                    pivot_low_index,
                    pivot_high_index,
                    swing_low,
                    swing_high,
                    zone,
                }),
            },
        )
    }
}
