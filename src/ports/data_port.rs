//! Price history port trait.

use crate::domain::error::SwingError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for one instrument within `[start_date, end_date]`, oldest first.
    fn fetch_ohlcv(
        &self,
        code: &str,
        exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SwingError>;

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, SwingError>;
}
