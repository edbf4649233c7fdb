//! Store lifecycle and the public counter API.
//!
//! A [`Store`] owns the database handle and the clock. Front ends construct
//! one at start-up and pass it around; [`shared`] offers a lazily created
//! process-wide instance for hosts that need a global accessor.

use crate::analytics::{self, Summary};
use crate::clock::{Clock, LocalClock};
use crate::db::Database;
use crate::error::Result;
use crate::types::{DailyLogEntry, StoreMetadata};
use chrono::{Duration, NaiveDate};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Day-bucketed counter store.
pub struct Store {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl Store {
    /// Open (creating if needed) the store at `path`, using local time.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_clock(path, Arc::new(LocalClock))
    }

    /// Open the store at `path` with a custom clock.
    pub fn open_with_clock(path: &Path, clock: Arc<dyn Clock>) -> Result<Self> {
        tracing::info!(path = %path.display(), "Opening store");
        Self::from_database(Database::open(path)?, clock)
    }

    /// A store backed by an in-memory database.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Result<Self> {
        Self::from_database(Database::open_in_memory()?, clock)
    }

    /// Wrap an open database, creating the schema and creation date if absent.
    pub fn from_database(db: Database, clock: Arc<dyn Clock>) -> Result<Self> {
        db.initialize(clock.today())?;
        Ok(Self { db, clock })
    }

    /// Today's date according to the store's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// The underlying repository.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Close the database handle.
    pub fn close(self) -> Result<()> {
        self.db.close()
    }

    // ============================================
    // Mutations
    // ============================================

    /// Log one event today.
    pub fn increment(&self) -> Result<()> {
        self.db.increment(self.today())
    }

    /// Remove one of today's events; `false` if today has none.
    pub fn decrement(&self) -> Result<bool> {
        self.db.decrement(self.today())
    }

    /// Wipe all entries and restart the store from today.
    pub fn clear(&self) -> Result<()> {
        self.db.clear(self.today())
    }

    // ============================================
    // Queries
    // ============================================

    pub fn count_on(&self, day: NaiveDate) -> Result<i64> {
        self.db.count_on(day)
    }

    pub fn count_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<i64> {
        self.db.count_in_range(start, end)
    }

    pub fn total_count(&self) -> Result<i64> {
        self.db.total_count()
    }

    pub fn metadata(&self) -> Result<StoreMetadata> {
        self.db.metadata()
    }

    /// Entries for the last `days` days, today included, oldest first.
    pub fn recent_entries(&self, days: u32) -> Result<Vec<DailyLogEntry>> {
        if days == 0 {
            return Ok(Vec::new());
        }
        let today = self.today();
        // Spans reaching past the earliest representable date cover everything.
        let start = today
            .checked_sub_signed(Duration::days(i64::from(days) - 1))
            .unwrap_or(NaiveDate::MIN);
        self.db.entries(start, today)
    }

    // ============================================
    // Statistics
    // ============================================

    pub fn daily_count(&self) -> Result<i64> {
        analytics::daily_count(&self.db, self.today())
    }

    pub fn weekly_count(&self) -> Result<i64> {
        analytics::weekly_count(&self.db, self.today())
    }

    pub fn elapsed_days(&self) -> Result<i64> {
        analytics::elapsed_days(&self.db, self.today())
    }

    pub fn elapsed_weeks(&self) -> Result<f64> {
        analytics::elapsed_weeks(&self.db, self.today())
    }

    pub fn daily_average(&self) -> Result<f64> {
        analytics::daily_average(&self.db, self.today())
    }

    pub fn weekly_average(&self) -> Result<f64> {
        analytics::weekly_average(&self.db, self.today())
    }

    /// All statistics for today in one snapshot.
    pub fn summary(&self) -> Result<Summary> {
        Summary::collect(&self.db, self.today())
    }
}

static SHARED: OnceLock<Store> = OnceLock::new();
static SHARED_INIT: Mutex<()> = Mutex::new(());

/// Process-wide store, opened from `path` on first call.
///
/// Later calls return the same instance whatever path they pass. Concurrent
/// first calls are serialized so the database is opened and initialized once.
pub fn shared(path: &Path) -> Result<&'static Store> {
    if let Some(store) = SHARED.get() {
        return Ok(store);
    }

    let _init = SHARED_INIT.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(store) = SHARED.get() {
        return Ok(store);
    }

    let store = Store::open(path)?;
    Ok(SHARED.get_or_init(|| store))
}
