//! CLI definition and dispatch.

use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::launch_csv_adapter::LaunchCsvAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{parse_date, validate_all};
use crate::domain::error::SwingError;
use crate::domain::event_schedule::{DEFAULT_LOOKAHEAD_DAYS, LaunchSchedule};
use crate::domain::governor::DEFAULT_MAX_TRADES_PER_WEEK;
use crate::domain::indicator::timeline::{IndicatorParams, IndicatorTimeline};
use crate::domain::metrics::Metrics;
use crate::domain::position::ExitParams;
use crate::domain::strategy::SwingParams;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::event_port::EventPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_WARMUP_DAYS: i64 = 60;

#[derive(Parser, Debug)]
#[command(
    name = "swingtrader",
    about = "Event-aware swing trading backtester"
)]
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
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        exchange: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List instruments with price data on an exchange
    ListSymbols {
        #[arg(long)]
        exchange: String,
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            output,
            code,
            exchange,
            dry_run,
        } => {
            let overrides = Overrides {
                code: code.as_deref(),
                exchange: exchange.as_deref(),
            };
            if dry_run {
                run_dry_run(&config, overrides)
            } else {
                run_backtest(&config, output.as_ref(), overrides)
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { exchange, config } => run_list_symbols(&exchange, &config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides<'a> {
    pub code: Option<&'a str>,
    pub exchange: Option<&'a str>,
}

pub fn load_config(path: &PathBuf, overrides: Overrides<'_>) -> Result<FileConfigAdapter, SwingError> {
    eprintln!("Loading config from {}", path.display());
    let mut adapter = FileConfigAdapter::from_file(path)?;
    if let Some(code) = overrides.code {
        adapter.set_override("backtest", "code", code);
    }
    if let Some(exchange) = overrides.exchange {
        adapter.set_override("backtest", "exchange", exchange);
    }
    Ok(adapter)
}

fn run_backtest(
    config_path: &PathBuf,
    output_path: Option<&PathBuf>,
    overrides: Overrides<'_>,
) -> Result<(), SwingError> {
    // Stage 1: load and validate config
    let adapter = load_config(config_path, overrides)?;
    validate_all(&adapter)?;

    // Stage 2: resolve parameters
    let bt_config = build_backtest_config(&adapter)?;
    let swing_params = build_swing_params(&adapter);
    let indicator_params = build_indicator_params(&adapter);
    let instrument = build_instrument(&adapter)?;

    // Stage 3: wire adapters
    let data_port = CsvAdapter::new(PathBuf::from(
        adapter
            .get_string("backtest", "data_dir")
            .unwrap_or_else(|| "data".to_string()),
    ));
    let schedule = build_event_schedule(&adapter)?;

    // Stage 4: run
    let (result, metrics) = run_backtest_pipeline(
        &data_port,
        &schedule,
        &swing_params,
        &indicator_params,
        &bt_config,
        &instrument,
    )?;

    // Stage 5: console summary and report
    print_summary(&result, &metrics);

    let output = output_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from("trades.csv"));
    CsvReportAdapter.write(&result, &metrics, &output.to_string_lossy())?;
    eprintln!("\nTrade log written to: {}", output.display());
    Ok(())
}

/// Instrument selection plus indicator warmup.
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub code: String,
    pub exchange: String,
    pub warmup_days: i64,
}

pub fn build_instrument(adapter: &dyn ConfigPort) -> Result<Instrument, SwingError> {
    let required = |key: &str| {
        adapter
            .get_string("backtest", key)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SwingError::ConfigMissing {
                section: "backtest".into(),
                key: key.into(),
            })
    };
    Ok(Instrument {
        code: required("code")?,
        exchange: required("exchange")?,
        warmup_days: adapter
            .get_int("backtest", "warmup_days", DEFAULT_WARMUP_DAYS)
            .max(0),
    })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, SwingError> {
    Ok(BacktestConfig {
        start_date: parse_date(adapter, "start_date")?,
        end_date: parse_date(adapter, "end_date")?,
        initial_capital: adapter.get_double("backtest", "initial_capital", 1000.0),
        risk_free_rate: adapter.get_double("backtest", "risk_free_rate", 0.05),
    })
}

pub fn build_swing_params(adapter: &dyn ConfigPort) -> SwingParams {
    let defaults = SwingParams::default();
    let exit = ExitParams {
        stop_loss_pct: adapter.get_double("strategy", "stop_loss_pct", defaults.exit.stop_loss_pct),
        take_profit_pct: adapter.get_double(
            "strategy",
            "take_profit_pct",
            defaults.exit.take_profit_pct,
        ),
        max_hold_days: adapter.get_int("strategy", "max_hold_days", defaults.exit.max_hold_days),
        trailing_trigger_pct: adapter.get_double(
            "strategy",
            "trailing_trigger_pct",
            defaults.exit.trailing_trigger_pct,
        ),
        trailing_lock_pct: adapter.get_double(
            "strategy",
            "trailing_lock_pct",
            defaults.exit.trailing_lock_pct,
        ),
    };
    let max_trades = adapter.get_int(
        "strategy",
        "max_trades_per_week",
        i64::from(DEFAULT_MAX_TRADES_PER_WEEK),
    );
    SwingParams {
        exit,
        max_trades_per_week: u32::try_from(max_trades).unwrap_or(DEFAULT_MAX_TRADES_PER_WEEK),
        position_fraction: adapter.get_double(
            "strategy",
            "position_fraction",
            defaults.position_fraction,
        ),
    }
}

fn get_period(adapter: &dyn ConfigPort, key: &str, default: usize) -> usize {
    let value = adapter.get_int("indicators", key, default as i64);
    usize::try_from(value).unwrap_or(default)
}

pub fn build_indicator_params(adapter: &dyn ConfigPort) -> IndicatorParams {
    let d = IndicatorParams::default();
    IndicatorParams {
        rsi_period: get_period(adapter, "rsi_period", d.rsi_period),
        macd_fast: get_period(adapter, "macd_fast", d.macd_fast),
        macd_slow: get_period(adapter, "macd_slow", d.macd_slow),
        macd_signal: get_period(adapter, "macd_signal", d.macd_signal),
        sma_fast: get_period(adapter, "sma_fast", d.sma_fast),
        sma_slow: get_period(adapter, "sma_slow", d.sma_slow),
        bollinger_period: get_period(adapter, "bollinger_period", d.bollinger_period),
        bollinger_mult: adapter.get_double("indicators", "bollinger_mult", d.bollinger_mult),
    }
}

/// Load the launch calendar named by `[backtest] events_file`. A run without
/// one still trades on technicals alone.
pub fn build_event_schedule(adapter: &dyn ConfigPort) -> Result<LaunchSchedule, SwingError> {
    let lookahead = adapter.get_int("events", "lookahead_days", i64::from(DEFAULT_LOOKAHEAD_DAYS));
    let lookahead = u32::try_from(lookahead).unwrap_or(DEFAULT_LOOKAHEAD_DAYS);
    let emit_upcoming = adapter.get_bool("events", "emit_upcoming", true);

    match adapter
        .get_string("backtest", "events_file")
        .filter(|s| !s.trim().is_empty())
    {
        Some(path) => LaunchCsvAdapter::new(path).load_schedule(lookahead, emit_upcoming),
        None => {
            tracing::warn!("no events_file configured, running without event signals");
            Ok(LaunchSchedule::new(Vec::new(), lookahead, emit_upcoming))
        }
    }
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    events: &dyn EventPort,
    swing_params: &SwingParams,
    indicator_params: &IndicatorParams,
    bt_config: &BacktestConfig,
    instrument: &Instrument,
) -> Result<(BacktestResult, Metrics), SwingError> {
    let fetch_start: NaiveDate = bt_config.start_date - Duration::days(instrument.warmup_days);
    let bars = data_port.fetch_ohlcv(
        &instrument.code,
        &instrument.exchange,
        fetch_start,
        bt_config.end_date,
    )?;

    let in_window = bars
        .iter()
        .filter(|b| b.date >= bt_config.start_date && b.date <= bt_config.end_date)
        .count();
    if in_window == 0 {
        return Err(SwingError::NoData {
            code: instrument.code.clone(),
            exchange: instrument.exchange.clone(),
        });
    }

    eprintln!(
        "Running backtest: {} on {}, {} to {}",
        instrument.code, instrument.exchange, bt_config.start_date, bt_config.end_date,
    );
    eprintln!(
        "  Bars: {} ({} warmup)",
        bars.len(),
        bars.len() - in_window
    );

    let timeline = IndicatorTimeline::compute(&bars, indicator_params);
    let result = backtest_engine::run_backtest(&bars, &timeline, events, swing_params, bt_config)?;
    let metrics = Metrics::compute(&result.portfolio, bt_config.risk_free_rate);
    Ok((result, metrics))
}

fn print_summary(result: &BacktestResult, metrics: &Metrics) {
    eprintln!("\n=== Results ===");
    eprintln!("Bars Processed:   {}", result.bars_processed);
    eprintln!("Final Equity:     {:.2}", metrics.final_equity);
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!(
        "Annualized:       {:.2}%",
        metrics.annualized_return * 100.0
    );
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", metrics.sortino_ratio);
    eprintln!(
        "Max Drawdown:     -{:.1}% ({} days)",
        metrics.max_drawdown * 100.0,
        metrics.max_drawdown_duration
    );
    eprintln!("Total Trades:     {}", metrics.total_trades);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);
    eprintln!("Avg Days Held:    {:.1}", metrics.avg_days_held);

    if !metrics.exits_by_reason.is_empty() {
        eprintln!("\n=== Exits ===");
        for (reason, count) in &metrics.exits_by_reason {
            eprintln!("  {:<14} {}", reason, count);
        }
    }
}

pub fn run_dry_run(config_path: &PathBuf, overrides: Overrides<'_>) -> Result<(), SwingError> {
    let adapter = load_config(config_path, overrides)?;
    validate_all(&adapter)?;
    eprintln!("Config validated successfully");

    let bt_config = build_backtest_config(&adapter)?;
    let instrument = build_instrument(&adapter)?;
    let params = build_swing_params(&adapter);
    let indicators = build_indicator_params(&adapter);
    let schedule = build_event_schedule(&adapter)?;

    eprintln!("\nInstrument:");
    eprintln!("  {} on {}", instrument.code, instrument.exchange);
    eprintln!(
        "  {} to {} ({} warmup days)",
        bt_config.start_date, bt_config.end_date, instrument.warmup_days
    );
    eprintln!("  capital: {:.2}", bt_config.initial_capital);

    eprintln!("\nExits:");
    eprintln!("  stop loss:   {:.1}%", params.exit.stop_loss_pct * 100.0);
    eprintln!("  take profit: {:.1}%", params.exit.take_profit_pct * 100.0);
    eprintln!("  time stop:   {} days", params.exit.max_hold_days);
    eprintln!(
        "  trailing:    arm above {:.1}%, exit at {:.1}%",
        params.exit.trailing_trigger_pct * 100.0,
        params.exit.trailing_lock_pct * 100.0
    );
    eprintln!("  weekly cap:  {} entries", params.max_trades_per_week);

    eprintln!(
        "\nIndicators: RSI({}) MACD({},{},{}) SMA({}/{}) BB({}, {:.2})",
        indicators.rsi_period,
        indicators.macd_fast,
        indicators.macd_slow,
        indicators.macd_signal,
        indicators.sma_fast,
        indicators.sma_slow,
        indicators.bollinger_period,
        indicators.bollinger_mult,
    );
    eprintln!("Launches:   {}", schedule.launches().len());

    eprintln!("\nDry run complete: configuration is valid");
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> Result<(), SwingError> {
    let adapter = load_config(config_path, Overrides::default())?;
    validate_all(&adapter)?;
    eprintln!("Configuration is valid");
    Ok(())
}

fn run_list_symbols(exchange: &str, config_path: &PathBuf) -> Result<(), SwingError> {
    let adapter = load_config(config_path, Overrides::default())?;
    let data_dir = adapter
        .get_string("backtest", "data_dir")
        .unwrap_or_else(|| "data".to_string());
    let symbols = CsvAdapter::new(PathBuf::from(data_dir)).list_symbols(exchange)?;

    if symbols.is_empty() {
        eprintln!("No symbols found for exchange {}", exchange);
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}
