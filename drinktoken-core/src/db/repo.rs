//! Database repository layer
//!
//! Per-day counter operations and the point/range queries the analytics
//! layer is built on. Every mutation runs in its own transaction.

use super::schema;
use crate::error::{Error, Result};
use crate::types::{checked_count, format_date, parse_date, DailyLogEntry, StoreMetadata};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row, ToSql, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// How long a writer waits on a lock held by another connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database handle; the single connection is shared behind a mutex
pub struct Database {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        tracing::debug!(path = %path.display(), "Opened database");

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Create the relations if needed and seed the creation date once
    pub fn initialize(&self, today: NaiveDate) -> Result<()> {
        let mut conn = self.lock();
        schema::initialize(&mut conn, today)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.lock()
    }

    /// File backing this database, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Schema version stamped in the file
    pub fn schema_version(&self) -> Result<i32> {
        let conn = self.lock();
        schema::get_schema_version(&conn)
    }

    /// Close the connection, reporting any error SQLite raises while doing so
    pub fn close(self) -> Result<()> {
        let conn = self.conn.into_inner().unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, e)| Error::Database(e))?;
        tracing::debug!("Closed database");
        Ok(())
    }

    // A panic while holding the lock drops any open transaction, which SQLite
    // rolls back, so the connection is still consistent afterwards.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ============================================
    // Counter mutations
    // ============================================

    /// Add one to `day`, creating its entry with a count of 1 if absent
    pub fn increment(&self, day: NaiveDate) -> Result<()> {
        let key = format_date(day);
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Legacy tables have no key on log_date; bump a single row so a
        // duplicated date still grows by exactly one.
        let updated = tx.execute(
            "UPDATE drink_log SET drink_count = drink_count + 1
             WHERE rowid = (
                 SELECT rowid FROM drink_log
                 WHERE log_date = ?1
                 LIMIT 1
             )",
            [&key],
        )?;
        if updated == 0 {
            tx.execute(
                "INSERT INTO drink_log (log_date, drink_count) VALUES (?1, 1)",
                [&key],
            )?;
        }
        tx.commit()?;

        tracing::debug!(day = %key, inserted = updated == 0, "Incremented count");
        Ok(())
    }

    /// Remove one from `day` if it has an entry with a positive count
    ///
    /// Returns `false`, changing nothing, when there is nothing to remove.
    pub fn decrement(&self, day: NaiveDate) -> Result<bool> {
        let key = format_date(day);
        let conn = self.lock();

        let updated = conn.execute(
            "UPDATE drink_log SET drink_count = drink_count - 1
             WHERE rowid = (
                 SELECT rowid FROM drink_log
                 WHERE log_date = ?1 AND drink_count > 0
                 LIMIT 1
             )",
            [&key],
        )?;

        if updated == 0 {
            tracing::debug!(day = %key, "Nothing to decrement");
        } else {
            tracing::debug!(day = %key, "Decremented count");
        }
        Ok(updated > 0)
    }

    /// Delete every log entry and reset the creation date to `today`
    pub fn clear(&self, today: NaiveDate) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let removed = tx.execute("DELETE FROM drink_log", [])?;
        tx.execute("DELETE FROM meta_data", [])?;
        schema::seed_created_date(&tx, today)?;
        tx.commit()?;

        tracing::info!(removed_entries = removed, created_date = %today, "Cleared store");
        Ok(())
    }

    // ============================================
    // Queries
    // ============================================

    /// Count logged on `day`, 0 if it has no entry
    pub fn count_on(&self, day: NaiveDate) -> Result<i64> {
        let key = format_date(day);
        let conn = self.lock();
        sum_counts(&conn, "WHERE log_date = ?1", params![key], &key)
    }

    /// Sum of counts for days in `[start, end]`; an empty or reversed range gives 0
    pub fn count_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<i64> {
        if start > end {
            return Ok(0);
        }
        let (start, end) = (format_date(start), format_date(end));
        let conn = self.lock();
        sum_counts(
            &conn,
            "WHERE log_date BETWEEN ?1 AND ?2",
            params![start, end],
            &format!("{}..={}", start, end),
        )
    }

    /// Sum of all counts
    pub fn total_count(&self) -> Result<i64> {
        let conn = self.lock();
        sum_counts(&conn, "", params![], "all days")
    }

    /// Day the store was created or last cleared
    pub fn created_date(&self) -> Result<NaiveDate> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT created_date FROM meta_data")?;
        let dates = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        match dates.as_slice() {
            [date] => parse_date(date),
            [] => Err(Error::InvariantViolation(
                "store metadata record is missing".to_string(),
            )),
            many => Err(Error::InvariantViolation(format!(
                "expected one store metadata record, found {}",
                many.len()
            ))),
        }
    }

    /// The metadata record
    pub fn metadata(&self) -> Result<StoreMetadata> {
        Ok(StoreMetadata {
            created_date: self.created_date()?,
        })
    }

    /// Entries for days in `[start, end]`, oldest first
    pub fn entries(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyLogEntry>> {
        if start > end {
            return Ok(Vec::new());
        }
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT log_date, drink_count FROM drink_log
             WHERE log_date BETWEEN ?1 AND ?2
             ORDER BY log_date ASC",
        )?;
        let rows = stmt
            .query_map(params![format_date(start), format_date(end)], Self::row_to_stored)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(date, count)| DailyLogEntry::from_stored(&date, count))
            .collect()
    }

    fn row_to_stored(row: &Row) -> rusqlite::Result<(String, i64)> {
        Ok((row.get("log_date")?, row.get("drink_count")?))
    }
}

/// `SUM` of `drink_count` over the rows matched by `filter`.
///
/// Any matched row with a negative count is reported instead of being summed.
fn sum_counts(conn: &Connection, filter: &str, args: &[&dyn ToSql], what: &str) -> Result<i64> {
    let sql = format!(
        "SELECT COALESCE(SUM(drink_count), 0), MIN(drink_count) FROM drink_log {}",
        filter
    );
    let (sum, min): (i64, Option<i64>) =
        conn.query_row(&sql, args, |row| Ok((row.get(0)?, row.get(1)?)))?;

    if let Some(min) = min {
        checked_count(min, what)?;
    }
    Ok(sum)
}
