//! Date windows for catalog queries.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved window of calendar dates, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    /// Create a window, rejecting start > end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TimeParseError> {
        if start > end {
            return Err(TimeParseError::Reversed {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Window covering the `days` days before `today`, ending on `today`.
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        Self {
            start: today - Duration::days(i64::from(days)),
            end: today,
        }
    }

    /// Parse "start/end" where each side is an ISO 8601 date or datetime.
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let (start, end) = s
            .split_once('/')
            .ok_or_else(|| TimeParseError::InvalidFormat(s.to_string()))?;
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// ISO date of the first day ("2024-01-01"), as written to the summary table.
    pub fn date_from(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// ISO date of the last day.
    pub fn date_to(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.date_from(), self.date_to())
    }
}

/// How a run's window is specified in configuration.
///
/// Literal windows are fixed. Rolling windows are resolved against the run
/// date, so the same config resolves to the same window on the same day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeWindowSpec {
    Literal { start: NaiveDate, end: NaiveDate },
    Rolling { last_days: u32 },
}

impl TimeWindowSpec {
    pub fn resolve(&self, today: NaiveDate) -> Result<TimeWindow, TimeParseError> {
        match self {
            TimeWindowSpec::Literal { start, end } => TimeWindow::new(*start, *end),
            TimeWindowSpec::Rolling { last_days } => {
                if *last_days == 0 {
                    return Err(TimeParseError::EmptyRollingWindow);
                }
                Ok(TimeWindow::last_days(today, *last_days))
            }
        }
    }

    /// Short label for file names: "last30d" or "2024-01-01_2024-01-31".
    pub fn label(&self) -> String {
        match self {
            TimeWindowSpec::Literal { start, end } => format!("{}_{}", start, end),
            TimeWindowSpec::Rolling { last_days } => format!("last{}d", last_days),
        }
    }
}

/// Parse an ISO 8601 date, accepting full datetimes and keeping the date part.
pub fn parse_date(s: &str) -> Result<NaiveDate, TimeParseError> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    // Full datetime with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    // Without timezone (assume UTC)
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ndt.date());
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Window start {start} is after end {end}")]
    Reversed { start: String, end: String },

    #[error("Rolling window must cover at least one day")]
    EmptyRollingWindow,
}
