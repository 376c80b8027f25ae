//! Single long position life cycle: Flat -> Open -> Flat.
//!
//! Exit triggers are evaluated in a fixed order and the first match wins:
//! stop-loss, take-profit, time-stop, trailing-stop.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::SwingError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub shares: u64,
    /// Set once unrealized gain exceeds the trailing trigger; never cleared
    /// while the position is open.
    pub trailing_armed: bool,
}

impl Position {
    pub fn pnl_pct(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price
    }

    pub fn days_held(&self, now: NaiveDate) -> i64 {
        (now - self.entry_date).num_days()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    TimeStop,
    TrailingStop,
}

impl ExitReason {
    pub const ALL: [ExitReason; 4] = [
        ExitReason::StopLoss,
        ExitReason::TakeProfit,
        ExitReason::TimeStop,
        ExitReason::TrailingStop,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TakeProfit => "TAKE_PROFIT",
            ExitReason::TimeStop => "TIME_STOP",
            ExitReason::TrailingStop => "TRAILING_STOP",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExitIntent {
    pub reason: ExitReason,
    pub pnl_pct: f64,
    pub days_held: i64,
    /// The position as it was when the trigger fired.
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExitParams {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub max_hold_days: i64,
    pub trailing_trigger_pct: f64,
    pub trailing_lock_pct: f64,
}

impl Default for ExitParams {
    fn default() -> Self {
        ExitParams {
            stop_loss_pct: 0.05,
            take_profit_pct: 0.10,
            max_hold_days: 10,
            trailing_trigger_pct: 0.05,
            trailing_lock_pct: 0.03,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PositionManager {
    params: ExitParams,
    position: Option<Position>,
}

impl PositionManager {
    pub fn new(params: ExitParams) -> Self {
        PositionManager {
            params,
            position: None,
        }
    }

    pub fn with_position(params: ExitParams, position: Option<Position>) -> Self {
        PositionManager { params, position }
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.position.is_some()
    }

    pub fn open(
        &mut self,
        entry_price: f64,
        entry_date: NaiveDate,
        shares: u64,
    ) -> Result<(), SwingError> {
        if let Some(existing) = &self.position {
            return Err(SwingError::InvariantViolation {
                reason: format!(
                    "position already open since {} ({} shares)",
                    existing.entry_date, existing.shares
                ),
            });
        }
        if shares == 0 {
            return Err(SwingError::InvariantViolation {
                reason: "cannot open a position with zero shares".into(),
            });
        }

        self.position = Some(Position {
            entry_price,
            entry_date,
            shares,
            trailing_armed: false,
        });
        Ok(())
    }

    /// Run the exit triggers against `price`. A fired trigger closes the
    /// position as part of producing the intent.
    pub fn evaluate_exit(&mut self, price: f64, now: NaiveDate) -> Option<ExitIntent> {
        let params = &self.params;
        let position = self.position.as_mut()?;

        if position.entry_price <= 0.0 {
            tracing::warn!(
                entry_price = position.entry_price,
                "open position has non-positive entry price, skipping exit evaluation"
            );
            return None;
        }

        let pnl_pct = position.pnl_pct(price);
        let days_held = position.days_held(now);

        let reason = if pnl_pct <= -params.stop_loss_pct {
            Some(ExitReason::StopLoss)
        } else if pnl_pct >= params.take_profit_pct {
            Some(ExitReason::TakeProfit)
        } else if days_held >= params.max_hold_days {
            Some(ExitReason::TimeStop)
        } else {
            if pnl_pct > params.trailing_trigger_pct {
                position.trailing_armed = true;
            }
            let floor = position.entry_price * (1.0 + params.trailing_lock_pct);
            (position.trailing_armed && price <= floor).then_some(ExitReason::TrailingStop)
        }?;

        let position = self.position.take()?;
        Some(ExitIntent {
            reason,
            pnl_pct,
            days_held,
            position,
        })
    }

    /// Close the position without evaluating triggers.
    pub fn force_close(&mut self) -> Option<Position> {
        self.position.take()
    }
}

/// A completed round trip as settled by the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub shares: u64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub pnl: f64,
    /// `None` for an end-of-run liquidation.
    pub exit_reason: Option<ExitReason>,
}

impl ClosedTrade {
    pub fn pnl_pct(&self) -> f64 {
        if self.entry_price > 0.0 {
            (self.exit_price - self.entry_price) / self.entry_price
        } else {
            0.0
        }
    }

    pub fn days_held(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}
