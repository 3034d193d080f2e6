//! Fibonacci retracement levels and the net entry zone.
//!
//! For a long swing, ratio 0 sits at the swing high and ratio 1 at the swing
//! low; for a short swing the mapping is mirrored.

use super::signal::Direction;

pub const DEFAULT_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Ratio whose level is the take-profit and the near edge of the net width.
pub const TARGET_RATIO: f64 = 0.236;
/// Ratio the net zone is centred on.
pub const CENTER_RATIO: f64 = 0.618;
/// Ratio of the swing-low side (long) / swing-high side (short).
pub const ANCHOR_RATIO: f64 = 1.0;
/// Fraction of the 0.236..1.0 distance used as the net width.
pub const NET_FACTOR: f64 = 0.375;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibLevel {
    pub ratio: f64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FibLevels {
    pub swing_low: f64,
    pub swing_high: f64,
    pub direction: Direction,
    pub levels: Vec<FibLevel>,
}

impl FibLevels {
    /// Price at `ratio` if that ratio was requested.
    pub fn price(&self, ratio: f64) -> Option<f64> {
        self.levels
            .iter()
            .find(|l| (l.ratio - ratio).abs() < 1e-9)
            .map(|l| l.price)
    }

    /// Price at any ratio, whether or not it was requested.
    pub fn price_at(&self, ratio: f64) -> f64 {
        level_price(self.swing_low, self.swing_high, self.direction, ratio)
    }
}

fn level_price(swing_low: f64, swing_high: f64, direction: Direction, ratio: f64) -> f64 {
    let delta = swing_high - swing_low;
    match direction {
        Direction::Long => swing_high - delta * ratio,
        Direction::Short => swing_low + delta * ratio,
    }
}

/// Levels for every ratio in `ratios`; `None` unless `swing_high > swing_low`.
pub fn compute_fib_levels(
    swing_low: f64,
    swing_high: f64,
    direction: Direction,
    ratios: &[f64],
) -> Option<FibLevels> {
    if !(swing_high > swing_low) || !swing_low.is_finite() || !swing_high.is_finite() {
        return None;
    }

    let levels = ratios
        .iter()
        .map(|&ratio| FibLevel {
            ratio,
            price: level_price(swing_low, swing_high, direction, ratio),
        })
        .collect();

    Some(FibLevels {
        swing_low,
        swing_high,
        direction,
        levels,
    })
}

/// Bounded entry band around the 0.618 level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetZone {
    pub bottom: f64,
    pub top: f64,
    pub center: f64,
}

impl NetZone {
    pub fn width(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.bottom && price <= self.top
    }

    /// `count` prices from `top` down to `bottom` inclusive, equally spaced.
    /// A single price sits at `top`.
    pub fn ladder(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.top],
            n => {
                let step = self.width() / (n - 1) as f64;
                (0..n)
                    .map(|i| if i == n - 1 { self.bottom } else { self.top - step * i as f64 })
                    .collect()
            }
        }
    }
}

/// Net zone for `fibs`: the relative distance between the 0.236 and 1.0
/// levels (relative to the 1.0 level), scaled by `net_factor`, gives the
/// zone width as a fraction of the 0.618 price. Both edges are clamped into
/// the swing range; a zone with `bottom >= top` is rejected.
pub fn build_net_zone(fibs: &FibLevels, net_factor: f64) -> Option<NetZone> {
    let target = fibs.price_at(TARGET_RATIO);
    let anchor = fibs.price_at(ANCHOR_RATIO);
    let center = fibs.price_at(CENTER_RATIO);

    if anchor <= 0.0 || !(net_factor > 0.0) {
        return None;
    }

    let distance_pct = (target - anchor).abs() / anchor;
    let half_width = center * distance_pct * net_factor / 2.0;

    let lo = fibs.swing_low.min(fibs.swing_high);
    let hi = fibs.swing_low.max(fibs.swing_high);
    let bottom = (center - half_width).clamp(lo, hi);
    let top = (center + half_width).clamp(lo, hi);

    if !(bottom < top) {
        return None;
    }

    Some(NetZone {
        bottom,
        top,
        center,
    })
}
