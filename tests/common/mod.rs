#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use swingtrader::domain::backtest::BacktestConfig;
use swingtrader::domain::error::SwingError;
use swingtrader::domain::event::{EventKind, EventOutcome, EventRecord};
pub use swingtrader::domain::ohlcv::OhlcvBar;
use swingtrader::domain::signal::IndicatorSnapshot;
use swingtrader::domain::strategy::StepInput;
use swingtrader::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        _exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SwingError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(SwingError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self, _exchange: &str) -> Result<Vec<String>, SwingError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A Monday, so offsets 0..=6 share one ISO week.
pub fn monday() -> NaiveDate {
    date(2024, 3, 4)
}

pub fn day(offset: i64) -> NaiveDate {
    monday() + chrono::Duration::days(offset)
}

/// Daily bars from `start_date`, one per close price.
pub fn bars_from_closes(code: &str, start_date: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            code: code.to_string(),
            exchange: "NASDAQ".to_string(),
            date: start_date + chrono::Duration::days(i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1000,
        })
        .collect()
}

/// `flat` bars at 100 followed by `ramp` bars rising by 2 per day.
pub fn flat_then_ramp(flat: usize, ramp: usize) -> Vec<f64> {
    (0..flat)
        .map(|_| 100.0)
        .chain((1..=ramp).map(|i| 100.0 + 2.0 * i as f64))
        .collect()
}

pub fn sample_config(start_date: NaiveDate, end_date: NaiveDate) -> BacktestConfig {
    BacktestConfig {
        start_date,
        end_date,
        initial_capital: 1000.0,
        risk_free_rate: 0.05,
    }
}

/// RSI, MACD and SMA-trend predicates hold at price 10; nothing else does.
pub fn three_point_snapshot() -> IndicatorSnapshot {
    IndicatorSnapshot {
        rsi: 38.0,
        macd: 0.5,
        macd_signal: 0.3,
        macd_histogram: 0.2,
        sma_fast: 11.0,
        sma_slow: 10.0,
        bollinger_lower: 8.0,
        bollinger_middle: 10.0,
        bollinger_upper: 12.0,
    }
}

/// No predicate holds at price 10.
pub fn quiet_snapshot() -> IndicatorSnapshot {
    IndicatorSnapshot {
        rsi: 60.0,
        macd: -0.1,
        macd_signal: 0.0,
        macd_histogram: -0.1,
        sma_fast: 11.0,
        sma_slow: 12.0,
        bollinger_lower: 8.0,
        bollinger_middle: 10.0,
        bollinger_upper: 12.0,
    }
}

pub fn step_input<'a>(
    date: NaiveDate,
    price: f64,
    indicators: Option<&'a IndicatorSnapshot>,
    event: Option<&'a EventRecord>,
    cash: f64,
) -> StepInput<'a> {
    StepInput {
        date,
        price,
        indicators,
        event,
        available_cash: cash,
    }
}

pub fn occurred(date: NaiveDate, outcome: EventOutcome) -> EventRecord {
    EventRecord {
        date,
        kind: EventKind::Occurred {
            outcome,
            label: "Test Mission".to_string(),
        },
    }
}

pub fn upcoming(date: NaiveDate, days_to_event: u32) -> EventRecord {
    EventRecord {
        date,
        kind: EventKind::Upcoming { days_to_event },
    }
}
