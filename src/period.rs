//! Time-of-day windows
//!
//! A [Period] buckets files by the time of day they were last modified.
//! The date is discarded and the time of day is evaluated in UTC.

use std::fmt;

use chrono::{DateTime, NaiveTime, Timelike as _, Utc};
use log::debug;
use serde::Deserialize;
use thiserror::Error;

/// Format of period boundaries in the configuration
const TIME_FORMAT: &str = "%H:%M";

/// Reasons a period from the configuration is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("period name must not be empty")]
    EmptyName,
    #[error("period name '{0}' must not contain '/'")]
    InvalidName(String),
    #[error("period '{name}': cannot parse {field} time '{value}', expected HH:MM")]
    InvalidTime {
        name: String,
        field: &'static str,
        value: String,
    },
    #[error("period '{name}': start {start} is after end {end}, windows past midnight are unsupported")]
    Inverted {
        name: String,
        start: String,
        end: String,
    },
}

/// Period as written in the configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct RawPeriod {
    pub name: String,
    pub start: String,
    pub end: String,
}

/// Validated, named time-of-day window `[start, end]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    name: String,
    start: NaiveTime,
    end: NaiveTime,
}

impl Period {
    /// Create a period, rejecting windows that wrap past midnight
    pub fn new(name: &str, start: NaiveTime, end: NaiveTime) -> Result<Self, PeriodError> {
        if name.is_empty() {
            return Err(PeriodError::EmptyName);
        }
        if name.contains('/') {
            return Err(PeriodError::InvalidName(name.to_owned()));
        }
        if start > end {
            return Err(PeriodError::Inverted {
                name: name.to_owned(),
                start: start.format(TIME_FORMAT).to_string(),
                end: end.format(TIME_FORMAT).to_string(),
            });
        }

        Ok(Self {
            name: name.to_owned(),
            start,
            end,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check whether the time of day of `modified` lies within the window.
    ///
    /// Seconds are dropped first, so a window ending at `09:59` still
    /// contains `09:59:30`.
    pub fn contains(&self, modified: DateTime<Utc>) -> bool {
        let time = modified.time();
        let time = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);
        let result = self.start <= time && time <= self.end;

        debug!("{time} within interval {self}? {result}");
        result
    }
}

impl TryFrom<&RawPeriod> for Period {
    type Error = PeriodError;

    fn try_from(raw: &RawPeriod) -> Result<Self, Self::Error> {
        let parse = |field: &'static str, value: &str| {
            NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| {
                PeriodError::InvalidTime {
                    name: raw.name.clone(),
                    field,
                    value: value.to_owned(),
                }
            })
        };

        let start = parse("start", &raw.start)?;
        let end = parse("end", &raw.end)?;
        Self::new(&raw.name, start, end)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} -- {})",
            self.name,
            self.start.format(TIME_FORMAT),
            self.end.format(TIME_FORMAT)
        )
    }
}
