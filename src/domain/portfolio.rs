//! Cash and holding bookkeeping for the single traded instrument.

use chrono::NaiveDate;

use super::error::SwingError;
use super::position::{ClosedTrade, ExitReason};
use crate::ports::broker_port::BrokerPort;

/// Slack allowed when an order spends all remaining cash.
const CASH_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct Holding {
    shares: u64,
    price: f64,
    date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub closed_trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
    holding: Option<Holding>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
            holding: None,
        }
    }

    pub fn shares_held(&self) -> u64 {
        self.holding.as_ref().map_or(0, |h| h.shares)
    }

    pub fn is_invested(&self) -> bool {
        self.holding.is_some()
    }

    pub fn total_equity(&self, price: f64) -> f64 {
        self.cash + self.shares_held() as f64 * price
    }

    pub fn record_equity(&mut self, date: NaiveDate, price: f64) {
        let equity = self.total_equity(price);
        self.equity_curve.push(EquityPoint { date, equity });
    }
}

impl BrokerPort for Portfolio {
    fn available_cash(&self) -> f64 {
        self.cash
    }

    fn buy(&mut self, shares: u64, price: f64, date: NaiveDate) -> Result<(), SwingError> {
        if self.holding.is_some() {
            return Err(SwingError::InvariantViolation {
                reason: "portfolio already holds the instrument".into(),
            });
        }
        let cost = shares as f64 * price;
        if cost > self.cash + CASH_TOLERANCE {
            return Err(SwingError::InvariantViolation {
                reason: format!("order cost {:.2} exceeds cash {:.2}", cost, self.cash),
            });
        }

        self.cash = (self.cash - cost).max(0.0);
        self.holding = Some(Holding {
            shares,
            price,
            date,
        });
        Ok(())
    }

    fn liquidate(
        &mut self,
        price: f64,
        date: NaiveDate,
        reason: Option<ExitReason>,
    ) -> Option<ClosedTrade> {
        let holding = self.holding.take()?;
        self.cash += holding.shares as f64 * price;

        let trade = ClosedTrade {
            shares: holding.shares,
            entry_price: holding.price,
            exit_price: price,
            entry_date: holding.date,
            exit_date: date,
            pnl: holding.shares as f64 * (price - holding.price),
            exit_reason: reason,
        };
        self.closed_trades.push(trade.clone());
        Some(trade)
    }
}
