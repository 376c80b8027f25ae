//! Event feed port trait.

use crate::domain::event::EventRecord;
use chrono::NaiveDate;

/// Yields zero or one event record per step date.
///
/// `prev` is the date of the previous step, if any. Events dated in
/// `(prev, date]` are reported on `date`, so an event falling between two
/// trading days is delivered on the next one.
pub trait EventPort {
    fn record_for(&self, prev: Option<NaiveDate>, date: NaiveDate) -> Option<EventRecord>;
}
