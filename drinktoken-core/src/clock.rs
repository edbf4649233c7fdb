//! Source of "today" as a local calendar date.
//!
//! Every day-bucketed operation asks a [`Clock`] for the current date instead of
//! reading the system time directly, so tests can step between days.

use chrono::{Duration, Local, NaiveDate};
use std::sync::Mutex;

/// Provides the current local calendar date.
pub trait Clock: Send + Sync {
    /// Today's date in the local timezone.
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a settable date.
#[derive(Debug)]
pub struct FixedClock {
    date: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Mutex::new(date),
        }
    }

    /// Move the pinned date to `date`.
    pub fn set(&self, date: NaiveDate) {
        *self.date.lock().unwrap_or_else(|e| e.into_inner()) = date;
    }

    /// Move the pinned date forward (or backward, for negative values) by whole days.
    pub fn advance_days(&self, days: i64) {
        let mut date = self.date.lock().unwrap_or_else(|e| e.into_inner());
        *date += Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fixed_clock_advances_across_month_end() {
        let clock = FixedClock::new(date(2024, 2, 28));
        clock.advance_days(1);
        assert_eq!(clock.today(), date(2024, 2, 29));
        clock.advance_days(1);
        assert_eq!(clock.today(), date(2024, 3, 1));
        clock.set(date(2023, 12, 31));
        assert_eq!(clock.today(), date(2023, 12, 31));
    }

    #[test]
    fn test_local_clock_matches_local_date() {
        let before = Local::now().date_naive();
        let today = LocalClock.today();
        let after = Local::now().date_naive();
        assert!(before <= today && today <= after);
    }
}
