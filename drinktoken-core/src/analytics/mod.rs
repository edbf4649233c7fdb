//! Analytics module for drinktoken
//!
//! Provides the derived statistics shown to users:
//! - Today's count and the rolling seven-day count
//! - Elapsed days and weeks since the store was created
//! - Average count per elapsed day and per elapsed week
//!
//! All figures are computed on demand through the [`CountSource`] trait,
//! which the SQLite [`Database`](crate::db::Database) implements.

pub mod stats;

pub use stats::{
    daily_average, daily_count, elapsed_days, elapsed_days_between, elapsed_weeks,
    weekly_average, weekly_count, weeks_from_days, window_start, CountSource, Summary,
    DAYS_PER_WEEK, WINDOW_DAYS,
};
