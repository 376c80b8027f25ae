//! Launch calendar turned into per-day event records.

use chrono::{Duration, NaiveDate};

use super::event::{EventKind, EventOutcome, EventRecord};
use crate::ports::event_port::EventPort;

pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Launch {
    pub date: NaiveDate,
    pub mission: String,
    pub flight_no: String,
    pub outcome: EventOutcome,
}

#[derive(Debug, Clone)]
pub struct LaunchSchedule {
    launches: Vec<Launch>,
    lookahead_days: u32,
    emit_upcoming: bool,
}

impl LaunchSchedule {
    pub fn new(mut launches: Vec<Launch>, lookahead_days: u32, emit_upcoming: bool) -> Self {
        launches.sort_by_key(|l| l.date);
        LaunchSchedule {
            launches,
            lookahead_days,
            emit_upcoming,
        }
    }

    pub fn empty() -> Self {
        LaunchSchedule::new(Vec::new(), DEFAULT_LOOKAHEAD_DAYS, true)
    }

    pub fn launches(&self) -> &[Launch] {
        &self.launches
    }
}

impl EventPort for LaunchSchedule {
    fn record_for(&self, prev: Option<NaiveDate>, date: NaiveDate) -> Option<EventRecord> {
        let after = self.launches.partition_point(|l| l.date <= date);
        let since = prev.unwrap_or(date - Duration::days(1));

        // latest launch since the previous step
        if let Some(last) = after.checked_sub(1).map(|i| &self.launches[i]) {
            if last.date > since {
                return Some(EventRecord {
                    date,
                    kind: EventKind::Occurred {
                        outcome: last.outcome.clone(),
                        label: last.mission.clone(),
                    },
                });
            }
        }

        if !self.emit_upcoming {
            return None;
        }

        let next = self.launches.get(after)?;
        let days = (next.date - date).num_days();
        (days <= self.lookahead_days as i64).then(|| EventRecord {
            date,
            kind: EventKind::Upcoming {
                days_to_event: days as u32,
            },
        })
    }
}
