//! # drinktoken-core
//!
//! Core library for drinktoken - a personal day-bucketed drink counter.
//!
//! This library provides:
//! - A SQLite-backed daily log with one count per calendar day
//! - Derived statistics (today, rolling week, per-day and per-week averages)
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! - **Storage:** `drink_log` and `meta_data` tables, accessed through [`Database`]
//! - **Analytics:** figures recomputed on demand from repository queries
//! - **Store:** [`Store`] ties the database to a [`Clock`] that decides what "today" is
//!
//! ## Example
//!
//! ```rust,no_run
//! use drinktoken_core::{Config, Store};
//!
//! let config = Config::load().expect("failed to load config");
//! let store = Store::open(&config.resolved_database_path()).expect("failed to open store");
//!
//! store.increment().expect("failed to log drink");
//! println!("today: {}", store.daily_count().expect("query failed"));
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{CountSource, Summary};
pub use clock::{Clock, FixedClock, LocalClock};
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use store::{shared, Store};
pub use types::*;

// Public modules
pub mod analytics;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod store;
pub mod types;
