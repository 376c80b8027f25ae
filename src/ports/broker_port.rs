//! Order execution port trait.

use crate::domain::error::SwingError;
use crate::domain::position::{ClosedTrade, ExitReason};
use chrono::NaiveDate;

/// Accepts order intents and reports cash. Fills are assumed at the requested price.
pub trait BrokerPort {
    fn available_cash(&self) -> f64;

    fn buy(&mut self, shares: u64, price: f64, date: NaiveDate) -> Result<(), SwingError>;

    /// Sell the entire holding. Returns the settled round trip, or `None` when flat.
    fn liquidate(
        &mut self,
        price: f64,
        date: NaiveDate,
        reason: Option<ExitReason>,
    ) -> Option<ClosedTrade>;
}
