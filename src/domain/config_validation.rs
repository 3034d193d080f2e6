//! Configuration validation and typed settings.
//!
//! Every value is checked before a run. Malformed configuration is the only
//! fatal error class; an unknown strategy name is rejected here even though
//! the dispatcher itself treats it as "no signal".

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::ZonetraderError;
use crate::domain::strategy::{SmaParams, StrategyConfig, StrategyKind, ZoneParams};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_SYMBOL: &str = "BTC/USDT";
pub const DEFAULT_TIMEFRAME: &str = "5m";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_LOOKBACK_BARS: usize = 1000;

/// Where candles come from and how many are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub symbol: String,
    pub timeframe: String,
    pub data_dir: String,
    pub lookback_bars: usize,
}

pub fn load_data_settings(config: &dyn ConfigPort) -> Result<DataSettings, ZonetraderError> {
    let symbol = non_empty_or(config, "backtest", "symbol", DEFAULT_SYMBOL)?;
    let timeframe = non_empty_or(config, "backtest", "timeframe", DEFAULT_TIMEFRAME)?;
    let data_dir = non_empty_or(config, "backtest", "data_dir", DEFAULT_DATA_DIR)?;
    let lookback_bars = count(config, "backtest", "lookback_bars", DEFAULT_LOOKBACK_BARS, 1)?;
    Ok(DataSettings {
        symbol,
        timeframe,
        data_dir,
        lookback_bars,
    })
}

pub fn load_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, ZonetraderError> {
    let defaults = BacktestConfig::default();

    let starting_balance = required_double(config, "backtest", "account_size")?;
    if !(starting_balance > 0.0) || !starting_balance.is_finite() {
        return Err(ZonetraderError::invalid(
            "backtest",
            "account_size",
            "account_size must be positive",
        ));
    }

    let risk_pct = required_double(config, "backtest", "risk_pct")?;
    if !(risk_pct > 0.0 && risk_pct <= 1.0) {
        return Err(ZonetraderError::invalid(
            "backtest",
            "risk_pct",
            "risk_pct must be in (0, 1]",
        ));
    }

    Ok(BacktestConfig {
        symbol: non_empty_or(config, "backtest", "symbol", DEFAULT_SYMBOL)?,
        starting_balance,
        risk_pct,
        warmup_bars: count(config, "backtest", "warmup_bars", defaults.warmup_bars, 0)?,
    })
}

pub fn load_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, ZonetraderError> {
    let defaults = StrategyConfig::default();

    let name = non_empty_or(config, "strategy", "name", &defaults.name)?;
    let Some(kind) = StrategyKind::from_name(&name) else {
        return Err(ZonetraderError::invalid(
            "strategy",
            "name",
            format!("unknown strategy '{}', expected 'sma' or '1pad'", name),
        ));
    };

    let num_limit_orders = count(
        config,
        "strategy",
        "num_limit_orders",
        defaults.num_limit_orders,
        1,
    )?;

    let sma = load_sma_params(config, &defaults.sma)?;
    let zone = load_zone_params(config, &defaults.zone)?;

    Ok(StrategyConfig {
        name: kind.name().to_string(),
        num_limit_orders,
        sma,
        zone,
    })
}

fn load_sma_params(
    config: &dyn ConfigPort,
    defaults: &SmaParams,
) -> Result<SmaParams, ZonetraderError> {
    let fast = count(config, "strategy", "sma_fast", defaults.fast, 1)?;
    let slow = count(config, "strategy", "sma_slow", defaults.slow, 1)?;
    if fast >= slow {
        return Err(ZonetraderError::invalid(
            "strategy",
            "sma_fast",
            "sma_fast must be smaller than sma_slow",
        ));
    }

    let stop_pct = double_or(config, "strategy", "sma_stop_pct", defaults.stop_pct)?;
    if !(stop_pct > 0.0 && stop_pct < 1.0) {
        return Err(ZonetraderError::invalid(
            "strategy",
            "sma_stop_pct",
            "sma_stop_pct must be in (0, 1)",
        ));
    }

    let target_pct = double_or(config, "strategy", "sma_target_pct", defaults.target_pct)?;
    if !(target_pct > 0.0) {
        return Err(ZonetraderError::invalid(
            "strategy",
            "sma_target_pct",
            "sma_target_pct must be positive",
        ));
    }

    Ok(SmaParams {
        fast,
        slow,
        stop_pct,
        target_pct,
    })
}

fn load_zone_params(
    config: &dyn ConfigPort,
    defaults: &ZoneParams,
) -> Result<ZoneParams, ZonetraderError> {
    Ok(ZoneParams {
        structure_left: count(config, "strategy", "structure_left", defaults.structure_left, 1)?,
        structure_right: count(config, "strategy", "structure_right", defaults.structure_right, 1)?,
        pivot_left: count(config, "strategy", "pivot_left", defaults.pivot_left, 0)?,
        pivot_right: count(config, "strategy", "pivot_right", defaults.pivot_right, 0)?,
        ..defaults.clone()
    })
}

fn non_empty_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: &str,
) -> Result<String, ZonetraderError> {
    match config.get_string(section, key) {
        None => Ok(default.to_string()),
        Some(s) if s.trim().is_empty() => Err(ZonetraderError::invalid(
            section,
            key,
            format!("{} must not be empty", key),
        )),
        Some(s) => Ok(s.trim().to_string()),
    }
}

fn required_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<f64, ZonetraderError> {
    config
        .get_double(section, key)?
        .ok_or_else(|| ZonetraderError::missing(section, key))
}

fn double_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, ZonetraderError> {
    Ok(config.get_double(section, key)?.unwrap_or(default))
}

/// Whole number of at least `minimum`, or `default` when the key is absent.
fn count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
    minimum: usize,
) -> Result<usize, ZonetraderError> {
    let Some(value) = config.get_int(section, key)? else {
        return Ok(default);
    };
    if value < minimum as i64 {
        return Err(ZonetraderError::invalid(
            section,
            key,
            format!("{} must be at least {}", key, minimum),
        ));
    }
    Ok(value as usize)
}
