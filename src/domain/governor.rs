//! Weekly trade-frequency governor.
//!
//! Counts executed entries per ISO week and vetoes new entries once the cap is
//! reached. The week key is the ISO week number alone, without the ISO year.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_TRADES_PER_WEEK: u32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeGovernorState {
    pub trades_this_week: u32,
    /// `None` until the first step; a fresh governor always resets.
    pub current_week: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct TradeGovernor {
    max_trades_per_week: u32,
    state: TradeGovernorState,
}

impl TradeGovernor {
    pub fn new(max_trades_per_week: u32) -> Self {
        Self::from_state(max_trades_per_week, TradeGovernorState::default())
    }

    pub fn from_state(max_trades_per_week: u32, state: TradeGovernorState) -> Self {
        TradeGovernor {
            max_trades_per_week,
            state,
        }
    }

    pub fn state(&self) -> &TradeGovernorState {
        &self.state
    }

    pub fn check_and_reset(&mut self, now: NaiveDate) {
        let week = now.iso_week().week();
        if self.state.current_week != Some(week) {
            self.state.current_week = Some(week);
            self.state.trades_this_week = 0;
        }
    }

    pub fn can_trade(&self) -> bool {
        self.state.trades_this_week < self.max_trades_per_week
    }

    /// Call once per executed entry, never per attempt.
    pub fn record_trade(&mut self) {
        self.state.trades_this_week += 1;
    }

    /// Give back a recorded entry that never executed.
    pub fn revert_trade(&mut self) {
        self.state.trades_this_week = self.state.trades_this_week.saturating_sub(1);
    }
}

impl Default for TradeGovernor {
    fn default() -> Self {
        TradeGovernor::new(DEFAULT_MAX_TRADES_PER_WEEK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_step_always_resets() {
        let mut governor = TradeGovernor::new(5);
        assert_eq!(governor.state().current_week, None);
        governor.check_and_reset(date(2024, 3, 4));
        assert_eq!(governor.state().current_week, Some(10));
        assert_eq!(governor.state().trades_this_week, 0);
    }

    #[test]
    fn caps_entries_within_week() {
        let mut governor = TradeGovernor::new(5);
        let monday = date(2024, 3, 4);
        let mut executed = 0;
        let mut suppressed = 0;

        for _ in 0..6 {
            governor.check_and_reset(monday);
            if governor.can_trade() {
                governor.record_trade();
                executed += 1;
            } else {
                suppressed += 1;
            }
        }

        assert_eq!(executed, 5);
        assert_eq!(suppressed, 1);
        assert_eq!(governor.state().trades_this_week, 5);
    }

    #[test]
    fn same_week_keeps_count() {
        let mut governor = TradeGovernor::new(5);
        governor.check_and_reset(date(2024, 3, 4));
        governor.record_trade();
        governor.check_and_reset(date(2024, 3, 10));
        assert_eq!(governor.state().trades_this_week, 1);
    }

    #[test]
    fn next_week_resets_before_evaluation() {
        let mut governor = TradeGovernor::new(2);
        governor.check_and_reset(date(2024, 3, 6));
        governor.record_trade();
        governor.record_trade();
        assert!(!governor.can_trade());

        governor.check_and_reset(date(2024, 3, 11));
        assert_eq!(governor.state().trades_this_week, 0);
        assert!(governor.can_trade());
    }

    #[test]
    fn week_number_ignores_year() {
        let mut governor = TradeGovernor::new(1);
        governor.check_and_reset(date(2024, 3, 6));
        governor.record_trade();
        // 2025-03-05 is also ISO week 10
        governor.check_and_reset(date(2025, 3, 5));
        assert!(!governor.can_trade());
    }

    #[test]
    fn restored_state_is_not_reset_in_same_week() {
        let state = TradeGovernorState {
            trades_this_week: 3,
            current_week: Some(10),
        };
        let mut governor = TradeGovernor::from_state(5, state);
        governor.check_and_reset(date(2024, 3, 7));
        assert_eq!(governor.state().trades_this_week, 3);
    }
}
