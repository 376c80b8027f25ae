//! Structured per-trade event records for downstream reporting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::position::{ClosedTrade, ExitReason};
use super::strategy::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeEventKind {
    Entry,
    Exit,
    ForcedExit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub event_kind: TradeEventKind,
    pub date: NaiveDate,
    pub price: f64,
    pub shares: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasons: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_reason: Option<ExitReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_held: Option<i64>,
}

impl TradeEvent {
    /// Build the log record for a decision. Exits take dollar P&L from the
    /// broker's settled trade when one is available.
    pub fn from_decision(decision: &Decision, settled: Option<&ClosedTrade>) -> Self {
        match decision {
            Decision::Enter {
                date,
                price,
                shares,
                score,
            } => TradeEvent {
                event_kind: TradeEventKind::Entry,
                date: *date,
                price: *price,
                shares: *shares,
                signal_score: Some(score.value),
                reasons: Some(score.reason_strings()),
                exit_reason: None,
                pnl_pct: None,
                pnl: None,
                days_held: None,
            },
            Decision::Exit {
                date,
                price,
                intent,
            } => TradeEvent {
                event_kind: TradeEventKind::Exit,
                date: *date,
                price: *price,
                shares: intent.position.shares,
                signal_score: None,
                reasons: None,
                exit_reason: Some(intent.reason),
                pnl_pct: Some(intent.pnl_pct),
                pnl: settled.map(|t| t.pnl),
                days_held: Some(intent.days_held),
            },
            Decision::ForcedExit {
                date,
                price,
                position,
            } => TradeEvent {
                event_kind: TradeEventKind::ForcedExit,
                date: *date,
                price: *price,
                shares: position.shares,
                signal_score: None,
                reasons: None,
                exit_reason: None,
                pnl_pct: (position.entry_price > 0.0).then(|| position.pnl_pct(*price)),
                pnl: settled.map(|t| t.pnl),
                days_held: Some(position.days_held(*date)),
            },
        }
    }

    /// Emit the record through `tracing`.
    pub fn log(&self) {
        match self.event_kind {
            TradeEventKind::Entry => tracing::info!(
                date = %self.date,
                price = self.price,
                shares = self.shares,
                score = self.signal_score.unwrap_or_default(),
                reasons = %self.reasons.as_deref().unwrap_or_default().join(" | "),
                "BUY"
            ),
            TradeEventKind::Exit | TradeEventKind::ForcedExit => tracing::info!(
                date = %self.date,
                price = self.price,
                shares = self.shares,
                reason = self.exit_reason.map_or("END_OF_RUN", |r| r.code()),
                pnl_pct = self.pnl_pct.unwrap_or_default() * 100.0,
                pnl = self.pnl.unwrap_or_default(),
                days_held = self.days_held.unwrap_or_default(),
                "SELL"
            ),
        }
    }
}
