use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::error::FreshnessError;
use crate::constants::UPDATE_TIMESTAMP_FORMAT;

/// Minute-resolution local wall-clock time published by the ingestion side.
///
/// Ordering is chronological; staleness is "strictly newer than `loaded_at`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UpdateTimestamp(NaiveDateTime);

impl UpdateTimestamp {
    /// Parses the stored `YYYY-MM-DD HH:MM` form (surrounding whitespace ignored).
    pub fn parse(raw: &str) -> Result<Self, FreshnessError> {
        let raw = raw.trim();
        NaiveDateTime::parse_from_str(raw, UPDATE_TIMESTAMP_FORMAT)
            .map(Self)
            .map_err(|e| FreshnessError::InvalidTimestamp {
                value: raw.to_string(),
                reason: e.to_string(),
            })
    }

    /// Current local time, truncated to the minute.
    pub fn now() -> Self {
        Self::truncate(Local::now().naive_local())
    }

    pub fn from_naive(value: NaiveDateTime) -> Self {
        Self::truncate(value)
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Renders the stored form.
    pub fn format(&self) -> String {
        self.0.format(UPDATE_TIMESTAMP_FORMAT).to_string()
    }

    fn truncate(value: NaiveDateTime) -> Self {
        Self(
            value
                .with_second(0)
                .and_then(|v| v.with_nanosecond(0))
                .unwrap_or(value),
        )
    }
}

impl fmt::Display for UpdateTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl FromStr for UpdateTimestamp {
    type Err = FreshnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
