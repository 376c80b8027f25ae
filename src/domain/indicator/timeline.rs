//! Per-bar indicator snapshots for the strategy.

use crate::domain::indicator::{
    IndicatorSeries, IndicatorValue, calculate_bollinger, calculate_macd, calculate_rsi,
    calculate_sma,
};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::IndicatorSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub bollinger_period: usize,
    pub bollinger_mult: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            sma_fast: 20,
            sma_slow: 50,
            bollinger_period: 20,
            bollinger_mult: 2.0,
        }
    }
}

/// Per-indicator warmup state at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Readiness {
    pub rsi: bool,
    pub macd: bool,
    pub sma_fast: bool,
    pub sma_slow: bool,
    pub bollinger: bool,
}

impl Readiness {
    pub fn all(&self) -> bool {
        self.rsi && self.macd && self.sma_fast && self.sma_slow && self.bollinger
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorTimeline {
    rsi: IndicatorSeries,
    macd: IndicatorSeries,
    sma_fast: IndicatorSeries,
    sma_slow: IndicatorSeries,
    bollinger: IndicatorSeries,
}

impl IndicatorTimeline {
    pub fn compute(bars: &[OhlcvBar], params: &IndicatorParams) -> Self {
        IndicatorTimeline {
            rsi: calculate_rsi(bars, params.rsi_period),
            macd: calculate_macd(bars, params.macd_fast, params.macd_slow, params.macd_signal),
            sma_fast: calculate_sma(bars, params.sma_fast),
            sma_slow: calculate_sma(bars, params.sma_slow),
            bollinger: calculate_bollinger(bars, params.bollinger_period, params.bollinger_mult),
        }
    }

    pub fn len(&self) -> usize {
        self.rsi.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn readiness(&self, index: usize) -> Readiness {
        Readiness {
            rsi: self.rsi.is_valid_at(index),
            macd: self.macd.is_valid_at(index),
            sma_fast: self.sma_fast.is_valid_at(index),
            sma_slow: self.sma_slow.is_valid_at(index),
            bollinger: self.bollinger.is_valid_at(index),
        }
    }

    /// `None` until every indicator has finished warming up.
    pub fn snapshot(&self, index: usize) -> Option<IndicatorSnapshot> {
        if !self.readiness(index).all() {
            return None;
        }

        let (macd, macd_signal, macd_histogram) = match self.macd.values[index].value {
            IndicatorValue::Macd {
                line,
                signal,
                histogram,
            } => (line, signal, histogram),
            _ => return None,
        };
        let (bollinger_upper, bollinger_middle, bollinger_lower) =
            match self.bollinger.values[index].value {
                IndicatorValue::Bollinger {
                    upper,
                    middle,
                    lower,
                } => (upper, middle, lower),
                _ => return None,
            };

        Some(IndicatorSnapshot {
            rsi: self.rsi.simple_at(index)?,
            macd,
            macd_signal,
            macd_histogram,
            sma_fast: self.sma_fast.simple_at(index)?,
            sma_slow: self.sma_slow.simple_at(index)?,
            bollinger_lower,
            bollinger_middle,
            bollinger_upper,
        })
    }
}
