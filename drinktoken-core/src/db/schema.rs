//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.
//! Version 1 matches the layout of earlier DrinkToken releases, so their
//! database files open without conversion.

use crate::error::Result;
use crate::types::format_date;
use chrono::NaiveDate;
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Table and column names of the on-disk layout.
pub mod names {
    /// Daily log relation
    pub const LOG_TABLE: &str = "drink_log";
    /// Calendar day of a log row (`YYYY-MM-DD`)
    pub const LOG_DATE_COLUMN: &str = "log_date";
    /// Events counted on that day
    pub const LOG_COUNT_COLUMN: &str = "drink_count";
    /// Metadata relation
    pub const META_TABLE: &str = "meta_data";
    /// Creation (or last reset) day of the store
    pub const META_DATE_COLUMN: &str = "created_date";
}

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: daily log and creation metadata
    r#"
    CREATE TABLE IF NOT EXISTS meta_data (
        created_date     DATE NOT NULL
    );

    CREATE TABLE IF NOT EXISTS drink_log (
        log_date         DATE PRIMARY KEY NOT NULL,
        drink_count      INTEGER NOT NULL DEFAULT 0 CHECK (drink_count >= 0)
    );
    "#,
];

/// Create both relations if absent and seed the creation date once.
///
/// Safe to call on every open: existing log rows and an existing creation
/// date are left untouched. Runs inside an immediate transaction so two
/// connections racing on a fresh file cannot both seed metadata.
pub fn initialize(conn: &mut Connection, today: NaiveDate) -> Result<()> {
    let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
    run_migrations(&tx)?;
    let seeded = seed_created_date(&tx, today)?;
    tx.commit()?;

    if seeded {
        tracing::info!(created_date = %today, "Seeded store creation date");
    }
    Ok(())
}

/// Run all pending migrations
///
/// A database stamped with a newer version than this build knows is left
/// as-is; there is no downgrade policy beyond preserving the data.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    if current_version > SCHEMA_VERSION {
        tracing::warn!(
            current_version,
            known_version = SCHEMA_VERSION,
            "Database was written by a newer version, opening without changes"
        );
        return Ok(());
    }

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Insert the creation date unless a metadata record already exists.
///
/// Returns whether a record was written.
pub(crate) fn seed_created_date(conn: &Connection, today: NaiveDate) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT INTO meta_data (created_date)
         SELECT ?1 WHERE NOT EXISTS (SELECT 1 FROM meta_data)",
        [format_date(today)],
    )?;
    Ok(inserted > 0)
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
