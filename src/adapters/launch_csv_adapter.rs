//! Launch calendar adapter.
//!
//! Reads `Date,Mission,FlightNo,Outcome` lines. The header row, blank lines,
//! and lines with too few fields or an unparseable date are skipped with a
//! warning rather than failing the whole file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::error::SwingError;
use crate::domain::event::EventOutcome;
use crate::domain::event_schedule::{Launch, LaunchSchedule};

pub struct LaunchCsvAdapter {
    path: PathBuf,
}

impl LaunchCsvAdapter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load_launches(&self) -> Result<Vec<Launch>, SwingError> {
        let content = fs::read_to_string(&self.path).map_err(|e| SwingError::EventFeed {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        Ok(parse_launches(&content))
    }

    pub fn load_schedule(
        &self,
        lookahead_days: u32,
        emit_upcoming: bool,
    ) -> Result<LaunchSchedule, SwingError> {
        let launches = self.load_launches()?;
        tracing::info!(
            path = %self.path.display(),
            launches = launches.len(),
            "loaded launch calendar"
        );
        Ok(LaunchSchedule::new(launches, lookahead_days, emit_upcoming))
    }
}

fn parse_launches(content: &str) -> Vec<Launch> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut launches = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(line = line + 1, error = %e, "skipping unreadable launch line");
                continue;
            }
        };
        match parse_record(&record) {
            Some(launch) => launches.push(launch),
            None if is_header_or_blank(&record) => {}
            None => tracing::warn!(line = line + 1, "skipping malformed launch line"),
        }
    }
    launches
}

fn is_header_or_blank(record: &csv::StringRecord) -> bool {
    match record.get(0) {
        None => true,
        Some(first) => first.is_empty() || first.starts_with("Date"),
    }
}

fn parse_record(record: &csv::StringRecord) -> Option<Launch> {
    if record.len() < 4 {
        return None;
    }
    let date = NaiveDate::parse_from_str(record.get(0)?, "%Y-%m-%d").ok()?;
    Some(Launch {
        date,
        mission: record.get(1)?.to_string(),
        flight_no: record.get(2)?.to_string(),
        outcome: EventOutcome::from_label(record.get(3)?),
    })
}
