//! Core domain types and decision logic.

pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod event;
pub mod event_schedule;
pub mod governor;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod portfolio;
pub mod position;
pub mod signal;
pub mod strategy;
pub mod trade_log;
