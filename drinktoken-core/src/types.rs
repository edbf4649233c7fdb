//! Domain types for drinktoken
//!
//! Both persisted relations are keyed by a local calendar date stored as
//! `YYYY-MM-DD` text.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// Storage encoding for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a date the way it is stored on disk.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored date.
///
/// A value that is not a `YYYY-MM-DD` date means the file was written by
/// something other than this store.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| Error::InvariantViolation(format!("stored date {:?} is not YYYY-MM-DD: {}", value, e)))
}

/// One calendar day's activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyLogEntry {
    /// Local calendar day
    pub date: NaiveDate,
    /// Events logged on that day, never negative
    pub count: i64,
}

impl DailyLogEntry {
    /// Build an entry from stored values, rejecting negative counts.
    pub fn from_stored(date: &str, count: i64) -> Result<Self> {
        let date = parse_date(date)?;
        let count = checked_count(count, &format_date(date))?;
        Ok(Self { date, count })
    }
}

/// The single metadata record of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreMetadata {
    /// Day the store was first initialized or last cleared
    pub created_date: NaiveDate,
}

/// Reject a negative count read back from storage.
pub(crate) fn checked_count(count: i64, what: &str) -> Result<i64> {
    if count < 0 {
        return Err(Error::InvariantViolation(format!(
            "negative count {} for {}",
            count, what
        )));
    }
    Ok(count)
}
