//! Configuration validation.
//!
//! Every section is checked before a run starts. Keys that are absent fall
//! back to the engine defaults, so only present-but-wrong values fail.

use crate::domain::error::SwingError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_all(config: &dyn ConfigPort) -> Result<(), SwingError> {
    validate_backtest_config(config)?;
    validate_strategy_config(config)?;
    validate_indicator_config(config)?;
    validate_event_config(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SwingError> {
    validate_initial_capital(config)?;
    validate_risk_free_rate(config)?;
    validate_dates(config)?;
    validate_warmup(config)?;
    require_non_empty(config, "backtest", "code")?;
    require_non_empty(config, "backtest", "exchange")?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SwingError> {
    validate_fraction(config, "strategy", "stop_loss_pct", 0.05)?;
    validate_fraction(config, "strategy", "take_profit_pct", 0.10)?;
    validate_fraction(config, "strategy", "trailing_trigger_pct", 0.05)?;
    validate_fraction(config, "strategy", "trailing_lock_pct", 0.03)?;
    validate_positive_int(config, "strategy", "max_hold_days", 10)?;
    validate_positive_int(config, "strategy", "max_trades_per_week", 5)?;

    let fraction = config.get_double("strategy", "position_fraction", 0.95);
    if fraction <= 0.0 || fraction > 1.0 {
        return Err(invalid(
            "strategy",
            "position_fraction",
            "position_fraction must be in (0, 1]",
        ));
    }

    let trigger = config.get_double("strategy", "trailing_trigger_pct", 0.05);
    let lock = config.get_double("strategy", "trailing_lock_pct", 0.03);
    if lock > trigger {
        return Err(invalid(
            "strategy",
            "trailing_lock_pct",
            "trailing_lock_pct must not exceed trailing_trigger_pct",
        ));
    }
    Ok(())
}

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<(), SwingError> {
    for (key, default) in [
        ("rsi_period", 14),
        ("macd_fast", 12),
        ("macd_slow", 26),
        ("macd_signal", 9),
        ("sma_fast", 20),
        ("sma_slow", 50),
        ("bollinger_period", 20),
    ] {
        validate_positive_int(config, "indicators", key, default)?;
    }

    let sma_fast = config.get_int("indicators", "sma_fast", 20);
    let sma_slow = config.get_int("indicators", "sma_slow", 50);
    if sma_fast >= sma_slow {
        return Err(invalid(
            "indicators",
            "sma_fast",
            "sma_fast must be shorter than sma_slow",
        ));
    }

    let macd_fast = config.get_int("indicators", "macd_fast", 12);
    let macd_slow = config.get_int("indicators", "macd_slow", 26);
    if macd_fast >= macd_slow {
        return Err(invalid(
            "indicators",
            "macd_fast",
            "macd_fast must be shorter than macd_slow",
        ));
    }

    let mult = config.get_double("indicators", "bollinger_mult", 2.0);
    if mult <= 0.0 {
        return Err(invalid(
            "indicators",
            "bollinger_mult",
            "bollinger_mult must be positive",
        ));
    }
    Ok(())
}

pub fn validate_event_config(config: &dyn ConfigPort) -> Result<(), SwingError> {
    validate_positive_int(config, "events", "lookahead_days", 5)
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), SwingError> {
    let value = config.get_double("backtest", "initial_capital", 0.0);
    if value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), SwingError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SwingError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    if start_date >= end_date {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

fn validate_warmup(config: &dyn ConfigPort) -> Result<(), SwingError> {
    if config.get_int("backtest", "warmup_days", 60) < 0 {
        return Err(invalid(
            "backtest",
            "warmup_days",
            "warmup_days must be non-negative",
        ));
    }
    Ok(())
}

/// Read a `YYYY-MM-DD` date from `[backtest]`.
pub fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<NaiveDate, SwingError> {
    match config.get_string("backtest", field) {
        None => Err(SwingError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                "backtest",
                field,
                &format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn require_non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), SwingError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(SwingError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_fraction(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<(), SwingError> {
    let value = config.get_double(section, key, default);
    if value <= 0.0 || value >= 1.0 {
        return Err(invalid(
            section,
            key,
            &format!("{} must be between 0 and 1", key),
        ));
    }
    Ok(())
}

fn validate_positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<(), SwingError> {
    if config.get_int(section, key, default) < 1 {
        return Err(invalid(section, key, &format!("{} must be at least 1", key)));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> SwingError {
    SwingError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
