//! Signal strategies and the dispatcher over them.
//!
//! Strategies form a closed set ([`Strategy`]); each variant implements
//! [`SignalStrategy`] and evaluates a candle-series prefix whose last bar is
//! the evaluation bar. Too little history or degenerate geometry yields
//! `None`, as does an unknown strategy name.

pub mod sma_crossover;
pub mod structure_zone;

use std::fmt;

use super::ohlcv::Candle;
use super::signal::Signal;

pub use sma_crossover::SmaCrossover;
pub use structure_zone::StructureZone;

pub trait SignalStrategy {
    fn name(&self) -> &'static str;

    /// Fewest bars the strategy will evaluate.
    fn min_bars(&self) -> usize;

    /// Signal for the last bar of `candles`, if any.
    fn generate(&self, candles: &[Candle]) -> Option<Signal>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    MovingAverageCrossover,
    StructureZone,
}

impl StrategyKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "sma" => Some(StrategyKind::MovingAverageCrossover),
            "1pad" => Some(StrategyKind::StructureZone),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::MovingAverageCrossover => sma_crossover::NAME,
            StrategyKind::StructureZone => structure_zone::NAME,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmaParams {
    pub fast: usize,
    pub slow: usize,
    pub stop_pct: f64,
    pub target_pct: f64,
}

impl Default for SmaParams {
    fn default() -> Self {
        SmaParams {
            fast: 10,
            slow: 50,
            stop_pct: 0.03,
            target_pct: 0.03,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneParams {
    pub structure_left: usize,
    pub structure_right: usize,
    pub pivot_left: usize,
    pub pivot_right: usize,
    pub net_factor: f64,
    pub min_bars: usize,
}

impl Default for ZoneParams {
    fn default() -> Self {
        ZoneParams {
            structure_left: 5,
            structure_right: 5,
            pivot_left: 1,
            pivot_right: 1,
            net_factor: super::fib::NET_FACTOR,
            min_bars: 55,
        }
    }
}

/// Strategy selection plus every strategy's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub name: String,
    pub num_limit_orders: usize,
    pub sma: SmaParams,
    pub zone: ZoneParams,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            name: structure_zone::NAME.to_string(),
            num_limit_orders: 3,
            sma: SmaParams::default(),
            zone: ZoneParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    MovingAverageCrossover(SmaCrossover),
    StructureZone(StructureZone),
}

impl Strategy {
    pub fn new(kind: StrategyKind, config: &StrategyConfig) -> Self {
        match kind {
            StrategyKind::MovingAverageCrossover => {
                Strategy::MovingAverageCrossover(SmaCrossover::new(config.sma.clone()))
            }
            StrategyKind::StructureZone => Strategy::StructureZone(StructureZone::new(
                config.zone.clone(),
                config.num_limit_orders,
            )),
        }
    }

    /// `None` for an unknown strategy name.
    pub fn from_config(config: &StrategyConfig) -> Option<Self> {
        StrategyKind::from_name(&config.name).map(|kind| Self::new(kind, config))
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::MovingAverageCrossover(_) => StrategyKind::MovingAverageCrossover,
            Strategy::StructureZone(_) => StrategyKind::StructureZone,
        }
    }
}

impl SignalStrategy for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::MovingAverageCrossover(s) => s.name(),
            Strategy::StructureZone(s) => s.name(),
        }
    }

    fn min_bars(&self) -> usize {
        match self {
            Strategy::MovingAverageCrossover(s) => s.min_bars(),
            Strategy::StructureZone(s) => s.min_bars(),
        }
    }

    fn generate(&self, candles: &[Candle]) -> Option<Signal> {
        match self {
            Strategy::MovingAverageCrossover(s) => s.generate(candles),
            Strategy::StructureZone(s) => s.generate(candles),
        }
    }
}

/// Evaluate the strategy named in `config` at the last bar of `candles`.
pub fn generate_signal(candles: &[Candle], config: &StrategyConfig) -> Option<Signal> {
    let Some(strategy) = Strategy::from_config(config) else {
        log::warn!("unknown strategy '{}', no signal", config.name);
        return None;
    };
    strategy.generate(candles)
}
