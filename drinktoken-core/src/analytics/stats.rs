//! Derived statistics over the daily log.
//!
//! Nothing here is persisted; every figure is recomputed from repository
//! queries for a given `today`.

use crate::db::Database;
use crate::error::Result;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Days in the rolling window, today included.
pub const WINDOW_DAYS: i64 = 7;

/// Days per week used to turn elapsed days into elapsed weeks.
pub const DAYS_PER_WEEK: f64 = 7.0;

/// Read access the statistics are computed from.
pub trait CountSource {
    /// Count logged on `day`, 0 if none.
    fn count_on(&self, day: NaiveDate) -> Result<i64>;

    /// Sum of counts over `[start, end]`, 0 if none.
    fn count_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<i64>;

    /// Sum of all counts.
    fn total_count(&self) -> Result<i64>;

    /// Day the store was created or last cleared.
    fn created_date(&self) -> Result<NaiveDate>;
}

impl CountSource for Database {
    fn count_on(&self, day: NaiveDate) -> Result<i64> {
        Database::count_on(self, day)
    }

    fn count_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<i64> {
        Database::count_in_range(self, start, end)
    }

    fn total_count(&self) -> Result<i64> {
        Database::total_count(self)
    }

    fn created_date(&self) -> Result<NaiveDate> {
        Database::created_date(self)
    }
}

/// First day of the rolling window ending on `today`.
pub fn window_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(WINDOW_DAYS - 1)
}

/// Calendar days from `created` through `today`, counting both ends.
///
/// Never less than 1, even if the clock has moved behind the creation date.
pub fn elapsed_days_between(created: NaiveDate, today: NaiveDate) -> i64 {
    ((today - created).num_days() + 1).max(1)
}

/// Elapsed days as a continuous number of weeks.
pub fn weeks_from_days(days: i64) -> f64 {
    days as f64 / DAYS_PER_WEEK
}

/// Count logged today.
pub fn daily_count<S: CountSource + ?Sized>(source: &S, today: NaiveDate) -> Result<i64> {
    source.count_on(today)
}

/// Count logged over the trailing seven calendar days, today included.
pub fn weekly_count<S: CountSource + ?Sized>(source: &S, today: NaiveDate) -> Result<i64> {
    source.count_in_range(window_start(today), today)
}

/// Days since creation, the creation day being day 1.
pub fn elapsed_days<S: CountSource + ?Sized>(source: &S, today: NaiveDate) -> Result<i64> {
    Ok(elapsed_days_between(source.created_date()?, today))
}

/// Weeks since creation (`elapsed_days / 7`).
pub fn elapsed_weeks<S: CountSource + ?Sized>(source: &S, today: NaiveDate) -> Result<f64> {
    Ok(weeks_from_days(elapsed_days(source, today)?))
}

/// Total count per elapsed day.
pub fn daily_average<S: CountSource + ?Sized>(source: &S, today: NaiveDate) -> Result<f64> {
    let total = source.total_count()?;
    Ok(total as f64 / elapsed_days(source, today)? as f64)
}

/// Total count per elapsed week.
pub fn weekly_average<S: CountSource + ?Sized>(source: &S, today: NaiveDate) -> Result<f64> {
    let total = source.total_count()?;
    Ok(total as f64 / elapsed_weeks(source, today)?)
}

/// Every statistic for one day, as shown together by a front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Day the figures were computed for
    pub today: NaiveDate,
    /// Day the store was created or last cleared
    pub created_date: NaiveDate,
    /// Count logged today
    pub daily_count: i64,
    /// Count logged over the rolling seven-day window
    pub weekly_count: i64,
    /// Count logged since creation
    pub total_count: i64,
    /// Days since creation, creation day included
    pub elapsed_days: i64,
    /// `elapsed_days / 7`
    pub elapsed_weeks: f64,
    /// `total_count / elapsed_days`
    pub daily_average: f64,
    /// `total_count / elapsed_weeks`
    pub weekly_average: f64,
}

impl Summary {
    /// Compute all statistics for `today`.
    pub fn collect<S: CountSource + ?Sized>(source: &S, today: NaiveDate) -> Result<Self> {
        let created_date = source.created_date()?;
        let total_count = source.total_count()?;
        let elapsed_days = elapsed_days_between(created_date, today);
        let elapsed_weeks = weeks_from_days(elapsed_days);

        Ok(Self {
            today,
            created_date,
            daily_count: daily_count(source, today)?,
            weekly_count: weekly_count(source, today)?,
            total_count,
            elapsed_days,
            elapsed_weeks,
            daily_average: total_count as f64 / elapsed_days as f64,
            weekly_average: total_count as f64 / elapsed_weeks,
        })
    }

    /// Format an average for display (two decimals).
    pub fn format_average(value: f64) -> String {
        format!("{:.2}", value)
    }
}
