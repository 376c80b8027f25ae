//! Event proximity and recency bookkeeping.
//!
//! The tracker is advanced exactly once per step. It keeps a countdown to the
//! next scheduled event and a counter of days since the last one, which the
//! signal scorer reads to award the event-driven points.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Initial value of `days_since_event` before any event has been seen.
pub const DAYS_SINCE_SENTINEL: u32 = 999;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventOutcome {
    Success,
    Failure,
    Other(String),
}

impl EventOutcome {
    /// Parse a free-text outcome label from the event feed.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        let lower = trimmed.to_lowercase();
        if lower == "success" {
            EventOutcome::Success
        } else if lower.contains("fail") {
            EventOutcome::Failure
        } else {
            EventOutcome::Other(trimmed.to_string())
        }
    }
}

impl fmt::Display for EventOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventOutcome::Success => write!(f, "Success"),
            EventOutcome::Failure => write!(f, "Failure"),
            EventOutcome::Other(label) => write!(f, "{}", label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Upcoming { days_to_event: u32 },
    Occurred { outcome: EventOutcome, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub date: NaiveDate,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTrackerState {
    pub upcoming: bool,
    /// Only meaningful while `upcoming` is true.
    pub days_to_event: u32,
    pub days_since_event: u32,
    pub last_outcome: Option<EventOutcome>,
}

impl Default for EventTrackerState {
    fn default() -> Self {
        EventTrackerState {
            upcoming: false,
            days_to_event: DAYS_SINCE_SENTINEL,
            days_since_event: DAYS_SINCE_SENTINEL,
            last_outcome: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventTracker {
    state: EventTrackerState,
}

impl EventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: EventTrackerState) -> Self {
        EventTracker { state }
    }

    pub fn state(&self) -> &EventTrackerState {
        &self.state
    }

    pub fn advance(&mut self, record: Option<&EventRecord>) -> &EventTrackerState {
        self.state.days_since_event = self
            .state
            .days_since_event
            .saturating_add(1)
            .min(DAYS_SINCE_SENTINEL);

        match record.map(|r| &r.kind) {
            Some(EventKind::Upcoming { days_to_event }) => {
                self.state.upcoming = true;
                self.state.days_to_event = *days_to_event;
            }
            Some(EventKind::Occurred { outcome, .. }) => {
                self.state.days_since_event = 0;
                self.state.last_outcome = Some(outcome.clone());
                self.state.upcoming = false;
            }
            None => {}
        }

        &self.state
    }
}
