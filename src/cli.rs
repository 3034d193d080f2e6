//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestResult};
use crate::domain::candle_store::CandleStore;
use crate::domain::config_validation::{
    load_backtest_config, load_data_settings, load_strategy_config, DataSettings,
};
use crate::domain::error::ZonetraderError;
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::{validate_series, Candle};
use crate::domain::pivot::detect_pivots;
use crate::domain::replay::{ReplaySession, ReplaySpeed};
use crate::domain::strategy::{SignalStrategy, Strategy, StrategyConfig, StrategyKind};
use crate::domain::structure::{
    detect_break_of_structure, find_active_structure, DEFAULT_LOOKBACK_PIVOTS,
};
use crate::ports::candle_source::CandleSource;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "zonetrader", about = "Market-structure signal engine and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        trades: Option<PathBuf>,
        #[arg(long)]
        metrics: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Evaluate the strategy at the last loaded bar
    Signal {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print pivots, pivot breaks and the active structure
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        left: Option<usize>,
        #[arg(long)]
        right: Option<usize>,
        #[arg(long)]
        lookback: Option<usize>,
    },
    /// Step through a backtest bar by bar
    Replay {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long, default_value = "normal")]
        speed: ReplaySpeed,
        #[arg(long)]
        steps: Option<usize>,
        #[arg(long)]
        realtime: bool,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute_command(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn execute_command(command: Command) -> Result<(), ZonetraderError> {
    match command {
        Command::Backtest {
            config,
            symbol,
            strategy,
            trades,
            metrics,
            dry_run,
        } => {
            let overrides = Overrides {
                symbol,
                strategy,
            };
            if dry_run {
                run_dry_run(&config, &overrides)
            } else {
                run_backtest_command(&config, &overrides, trades, metrics)
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Signal { config } => run_signal(&config),
        Command::Scan {
            config,
            left,
            right,
            lookback,
        } => run_scan(&config, left, right, lookback),
        Command::Replay {
            config,
            speed,
            steps,
            realtime,
        } => run_replay(&config, speed, steps, realtime),
    }
}

#[derive(Debug, Default)]
struct Overrides {
    symbol: Option<String>,
    strategy: Option<String>,
}

/// Everything a run needs, resolved from the config file and overrides.
#[derive(Debug)]
pub struct RunSettings {
    pub data: DataSettings,
    pub backtest: BacktestConfig,
    pub strategy: StrategyConfig,
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ZonetraderError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Validate and resolve every section.
pub fn resolve_settings(config: &dyn ConfigPort) -> Result<RunSettings, ZonetraderError> {
    Ok(RunSettings {
        data: load_data_settings(config)?,
        backtest: load_backtest_config(config)?,
        strategy: load_strategy_config(config)?,
    })
}

fn resolve_with_overrides(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<RunSettings, ZonetraderError> {
    let mut settings = resolve_settings(config)?;

    if let Some(symbol) = overrides.symbol.as_deref().map(str::trim) {
        if symbol.is_empty() {
            return Err(ZonetraderError::invalid("backtest", "symbol", "symbol must not be empty"));
        }
        settings.data.symbol = symbol.to_string();
        settings.backtest.symbol = symbol.to_string();
    }

    if let Some(name) = &overrides.strategy {
        let kind = StrategyKind::from_name(name).ok_or_else(|| {
            ZonetraderError::invalid("strategy", "name", format!("unknown strategy '{}'", name))
        })?;
        settings.strategy.name = kind.name().to_string();
    }

    Ok(settings)
}

fn build_strategy(config: &StrategyConfig) -> Result<Strategy, ZonetraderError> {
    Strategy::from_config(config).ok_or_else(|| {
        ZonetraderError::invalid("strategy", "name", format!("unknown strategy '{}'", config.name))
    })
}

/// Fetch history through the CSV candle source and keep the newest
/// `lookback_bars` in a candle store.
pub fn load_candles(
    source: &dyn CandleSource,
    data: &DataSettings,
) -> Result<Vec<Candle>, ZonetraderError> {
    let candles = source.fetch_candles(&data.symbol, &data.timeframe, data.lookback_bars)?;
    validate_series(&candles)?;
    let store = CandleStore::from_history(data.lookback_bars, candles)?;
    eprintln!(
        "Loaded {}/{} {} candles for {}",
        store.len(),
        store.max_bars(),
        data.timeframe,
        data.symbol
    );
    if let Some(last) = store.last_closed() {
        log::debug!("last closed candle at {}", last.timestamp);
    }
    Ok(store.closed())
}

fn require_history(
    candles: &[Candle],
    strategy: &Strategy,
    symbol: &str,
) -> Result<(), ZonetraderError> {
    let minimum = strategy.min_bars();
    if candles.len() < minimum {
        return Err(ZonetraderError::InsufficientData {
            symbol: symbol.to_string(),
            bars: candles.len(),
            minimum,
        });
    }
    Ok(())
}

/// Load config, candles and strategy, then run the backtest.
fn run_pipeline(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<(RunSettings, Vec<Candle>, BacktestResult), ZonetraderError> {
    let settings = resolve_with_overrides(config, overrides)?;
    let strategy = build_strategy(&settings.strategy)?;

    let source = CsvAdapter::new(PathBuf::from(&settings.data.data_dir));
    let candles = load_candles(&source, &settings.data)?;
    require_history(&candles, &strategy, &settings.data.symbol)?;

    eprintln!(
        "Running backtest: {} on {} bars, strategy {}",
        settings.backtest.symbol,
        candles.len(),
        strategy.name()
    );
    let result = run_backtest(&candles, &strategy, &settings.backtest);
    Ok((settings, candles, result))
}

fn run_backtest_command(
    config_path: &PathBuf,
    overrides: &Overrides,
    trades_path: Option<PathBuf>,
    metrics_path: Option<PathBuf>,
) -> Result<(), ZonetraderError> {
    let config = load_config(config_path)?;
    let (_, _, result) = run_pipeline(&config, overrides)?;

    let metrics = Metrics::compute(&result.trades, result.starting_balance);
    print_summary(&metrics, &result);

    let trades_path = trades_path
        .map(|p| p.display().to_string())
        .or_else(|| config.get_string("report", "trades_path"));
    let metrics_path = metrics_path
        .map(|p| p.display().to_string())
        .or_else(|| config.get_string("report", "metrics_path"));

    let reporter = CsvReportAdapter::new();
    if let Some(path) = trades_path {
        reporter.write_trades(&result.trades, &path)?;
        eprintln!("Trades written to {}", path);
    }
    if let Some(path) = metrics_path {
        reporter.write_metrics(&metrics, &path)?;
        eprintln!("Metrics written to {}", path);
    }
    Ok(())
}

fn print_summary(metrics: &Metrics, result: &BacktestResult) {
    println!("=== Backtest Results ===");
    println!("Starting Balance: {:.2}", metrics.starting_balance);
    println!("Ending Balance:   {:.2}", metrics.ending_balance);
    println!("Net Profit:       {:.2}", metrics.net_profit);
    println!("Net Return:       {:.2}%", metrics.net_return_pct);
    println!("Total Trades:     {}", metrics.num_trades);
    println!("Win Rate:         {:.1}%", metrics.win_rate_pct);
    println!("Profit Factor:    {:.2}", metrics.profit_factor);
    println!("Max Drawdown:     -{:.1}%", metrics.max_drawdown_pct);
    println!(
        "Avg Duration:     {:.0}s (min {:.0}s, max {:.0}s)",
        metrics.avg_trade_duration_secs,
        metrics.min_trade_duration_secs,
        metrics.max_trade_duration_secs
    );
    if result.skipped_signals > 0 {
        println!("Skipped Signals:  {}", result.skipped_signals);
    }
}

fn run_dry_run(config_path: &PathBuf, overrides: &Overrides) -> Result<(), ZonetraderError> {
    let config = load_config(config_path)?;
    let settings = resolve_with_overrides(&config, overrides)?;
    print_settings(&settings);
    eprintln!("\nDry run complete: configuration is valid");
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> Result<(), ZonetraderError> {
    let config = load_config(config_path)?;
    let settings = resolve_settings(&config)?;
    print_settings(&settings);
    eprintln!("\nConfiguration is valid.");
    Ok(())
}

fn print_settings(settings: &RunSettings) {
    let s = &settings.strategy;
    println!("[backtest]");
    println!("  symbol:        {}", settings.data.symbol);
    println!("  timeframe:     {}", settings.data.timeframe);
    println!("  data_dir:      {}", settings.data.data_dir);
    println!("  lookback_bars: {}", settings.data.lookback_bars);
    println!("  account_size:  {}", settings.backtest.starting_balance);
    println!("  risk_pct:      {}", settings.backtest.risk_pct);
    println!("  warmup_bars:   {}", settings.backtest.warmup_bars);
    println!("[strategy]");
    println!("  name:             {}", s.name);
    println!("  num_limit_orders: {}", s.num_limit_orders);
    println!(
        "  sma:              fast {} slow {} stop {} target {}",
        s.sma.fast, s.sma.slow, s.sma.stop_pct, s.sma.target_pct
    );
    println!(
        "  zone:             structure {}/{} pivots {}/{}",
        s.zone.structure_left, s.zone.structure_right, s.zone.pivot_left, s.zone.pivot_right
    );
}

fn run_signal(config_path: &PathBuf) -> Result<(), ZonetraderError> {
    let config = load_config(config_path)?;
    let settings = resolve_settings(&config)?;
    let strategy = build_strategy(&settings.strategy)?;

    let source = CsvAdapter::new(PathBuf::from(&settings.data.data_dir));
    let candles = load_candles(&source, &settings.data)?;
    require_history(&candles, &strategy, &settings.data.symbol)?;

    match strategy.generate(&candles) {
        Some(signal) => {
            println!("{}", signal);
            if let Some(setup) = signal.meta.setup {
                println!(
                    "  swing {:.4}..{:.4} (bars {}..{}), bos bar {}, zone [{:.4}, {:.4}]",
                    setup.swing_low,
                    setup.swing_high,
                    setup.pivot_low_index,
                    setup.pivot_high_index,
                    setup.bos_index,
                    setup.zone.bottom,
                    setup.zone.top
                );
            }
        }
        None => println!("no signal at bar {}", candles.len() - 1),
    }
    Ok(())
}

fn run_scan(
    config_path: &PathBuf,
    left: Option<usize>,
    right: Option<usize>,
    lookback: Option<usize>,
) -> Result<(), ZonetraderError> {
    let config = load_config(config_path)?;
    let settings = resolve_settings(&config)?;
    let zone = &settings.strategy.zone;

    let source = CsvAdapter::new(PathBuf::from(&settings.data.data_dir));
    let candles = load_candles(&source, &settings.data)?;

    let left = left.unwrap_or(zone.pivot_left);
    let right = right.unwrap_or(zone.pivot_right);
    let lookback = lookback.unwrap_or(DEFAULT_LOOKBACK_PIVOTS);

    let pivots = detect_pivots(&candles, left, right);
    let flags = detect_break_of_structure(&candles, &pivots, lookback);
    let bos_up = flags.iter().filter(|f| f.up).count();
    let bos_down = flags.iter().filter(|f| f.down).count();

    println!("Bars:         {}", candles.len());
    println!("Pivot window: {}/{}", left, right);
    println!("Pivot highs:  {}", pivots.high_indices().len());
    println!("Pivot lows:   {}", pivots.low_indices().len());
    println!("BOS up bars:  {}", bos_up);
    println!("BOS down bars: {}", bos_down);

    let recent = pivots.pivots(&candles);
    for pivot in recent.iter().skip(recent.len().saturating_sub(5)) {
        println!(
            "  {:?} {:.4} at {} (bar {})",
            pivot.kind, pivot.price, pivot.timestamp, pivot.index
        );
    }

    match find_active_structure(&candles, zone.structure_left, zone.structure_right) {
        Some(structure) => println!(
            "Active structure: swing {:.4} at {} (bar {}), broken at {} (bar {})",
            structure.swing.level,
            structure.swing.timestamp,
            structure.swing.index,
            structure.bos_timestamp,
            structure.bos_index
        ),
        None => println!("Active structure: none"),
    }
    Ok(())
}

fn run_replay(
    config_path: &PathBuf,
    speed: ReplaySpeed,
    steps: Option<usize>,
    realtime: bool,
) -> Result<(), ZonetraderError> {
    let config = load_config(config_path)?;
    let (_, candles, result) = run_pipeline(&config, &Overrides::default())?;

    let mut session = ReplaySession::new(&candles, &result.trades);
    let max_steps = steps.unwrap_or(usize::MAX);
    let mut taken = 0;

    loop {
        let frame = session.frame();
        if let Some(bar) = frame.candles.last() {
            let open = frame
                .trades
                .iter()
                .filter(|t| t.exit_index.is_none_or(|x| x > frame.cursor))
                .count();
            println!(
                "bar {:>5} {} close {:.4} | window {} bars | trades {} ({} open)",
                frame.cursor,
                bar.timestamp,
                bar.close,
                frame.candles.len(),
                frame.trades.len(),
                open
            );
        }

        if taken >= max_steps || !session.step() {
            break;
        }
        taken += 1;
        if realtime {
            std::thread::sleep(speed.interval());
        }
    }

    eprintln!("Replay finished at bar {} ({} speed)", session.cursor(), speed);
    Ok(())
}
