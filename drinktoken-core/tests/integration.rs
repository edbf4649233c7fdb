//! Integration tests for the drinktoken store
//!
//! These tests drive a file-backed store through multi-day scenarios with a
//! fixed clock, and reopen files written by older installs.

use chrono::NaiveDate;
use drinktoken_core::{Database, Error, FixedClock, Store};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Create a store in a fresh temp directory with a clock set to `start`
fn file_store(start: NaiveDate) -> (TempDir, PathBuf, Store, Arc<FixedClock>) {
    drinktoken_core::logging::init_test();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("DrinkToken.db");
    let clock = Arc::new(FixedClock::new(start));
    let store = Store::open_with_clock(&path, clock.clone()).unwrap();
    (dir, path, store, clock)
}

// ============================================
// Multi-day Scenarios
// ============================================

#[test]
fn test_ten_day_history() {
    let (_dir, _path, store, clock) = file_store(date(2024, 4, 11));

    // Day 1..=10 with counts 6, 5, 4, 0, 3, 0, 0, 0, 0, 2
    let plan = [6, 5, 4, 0, 3, 0, 0, 0, 0, 2];
    for (i, count) in plan.iter().enumerate() {
        if i > 0 {
            clock.advance_days(1);
        }
        for _ in 0..*count {
            store.increment().unwrap();
        }
    }

    assert_eq!(store.today(), date(2024, 4, 20));
    assert_eq!(store.total_count().unwrap(), 20);
    assert_eq!(store.daily_count().unwrap(), 2);
    assert_eq!(store.weekly_count().unwrap(), 5);
    assert_eq!(store.elapsed_days().unwrap(), 10);
    assert!((store.daily_average().unwrap() - 2.0).abs() < 1e-9);
    assert!((store.elapsed_weeks().unwrap() - 10.0 / 7.0).abs() < 1e-9);
    assert!((store.weekly_average().unwrap() - 14.0).abs() < 1e-9);

    // Only days with a logged count are stored
    let entries = store.recent_entries(10).unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].date, date(2024, 4, 11));
    assert_eq!(entries[0].count, 6);
}

#[test]
fn test_undo_only_touches_today() {
    let (_dir, _path, store, clock) = file_store(date(2024, 5, 1));
    store.increment().unwrap();
    store.increment().unwrap();

    clock.advance_days(1);
    store.increment().unwrap();
    assert!(store.decrement().unwrap());
    assert!(!store.decrement().unwrap());

    assert_eq!(store.daily_count().unwrap(), 0);
    assert_eq!(store.count_on(date(2024, 5, 1)).unwrap(), 2);
    assert_eq!(store.total_count().unwrap(), 2);
}

#[test]
fn test_clear_restarts_from_today() {
    let (_dir, _path, store, clock) = file_store(date(2024, 5, 1));
    store.increment().unwrap();
    clock.advance_days(20);
    store.increment().unwrap();

    store.clear().unwrap();
    assert_eq!(store.metadata().unwrap().created_date, date(2024, 5, 21));
    assert_eq!(store.elapsed_days().unwrap(), 1);
    assert_eq!(store.total_count().unwrap(), 0);

    clock.advance_days(1);
    store.increment().unwrap();
    assert_eq!(store.elapsed_days().unwrap(), 2);
    assert!((store.daily_average().unwrap() - 0.5).abs() < 1e-9);
}

// ============================================
// Persistence
// ============================================

#[test]
fn test_reopen_keeps_counts_and_creation_date() {
    let (_dir, path, store, clock) = file_store(date(2024, 6, 1));
    store.increment().unwrap();
    store.increment().unwrap();
    store.close().unwrap();

    clock.advance_days(4);
    let reopened = Store::open_with_clock(&path, clock.clone()).unwrap();
    assert_eq!(reopened.total_count().unwrap(), 2);
    assert_eq!(reopened.metadata().unwrap().created_date, date(2024, 6, 1));
    assert_eq!(reopened.elapsed_days().unwrap(), 5);
}

#[test]
fn test_open_creates_missing_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("DrinkToken.db");
    let store = Store::open_with_clock(&path, Arc::new(FixedClock::new(date(2024, 1, 1)))).unwrap();

    assert!(path.exists());
    assert_eq!(store.database().path(), Some(path.as_path()));
}

#[test]
fn test_legacy_file_without_version_stamp() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("DrinkToken.db");

    // Layout written by the first release: no unique key, no version stamp
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "
            CREATE TABLE meta_data (created_date DATE NOT NULL);
            CREATE TABLE drink_log (log_date DATE NOT NULL, drink_count INTEGER NOT NULL);
            INSERT INTO meta_data (created_date) VALUES ('2024-02-01');
            INSERT INTO drink_log (log_date, drink_count) VALUES ('2024-02-01', 3);
            INSERT INTO drink_log (log_date, drink_count) VALUES ('2024-02-05', 1);
            ",
        )
        .unwrap();
    }

    let clock = Arc::new(FixedClock::new(date(2024, 2, 7)));
    let store = Store::open_with_clock(&path, clock.clone()).unwrap();

    assert_eq!(store.total_count().unwrap(), 4);
    assert_eq!(store.metadata().unwrap().created_date, date(2024, 2, 1));
    assert_eq!(store.elapsed_days().unwrap(), 7);
    assert_eq!(store.weekly_count().unwrap(), 4);

    store.increment().unwrap();
    assert_eq!(store.daily_count().unwrap(), 1);
    assert_eq!(store.total_count().unwrap(), 5);
}

#[test]
fn test_corrupt_metadata_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("DrinkToken.db");
    let store =
        Store::open_with_clock(&path, Arc::new(FixedClock::new(date(2024, 1, 1)))).unwrap();

    store
        .database()
        .connection()
        .execute(
            "INSERT INTO meta_data (created_date) VALUES ('2023-12-01')",
            [],
        )
        .unwrap();

    assert!(matches!(
        store.elapsed_days(),
        Err(Error::InvariantViolation(_))
    ));
    assert!(matches!(store.summary(), Err(Error::InvariantViolation(_))));
}

// ============================================
// Concurrency
// ============================================

#[test]
fn test_two_handles_on_one_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("DrinkToken.db");
    let today = date(2024, 3, 1);

    let first = Database::open(&path).unwrap();
    first.initialize(today).unwrap();
    let second = Database::open(&path).unwrap();
    second.initialize(today).unwrap();

    let handles: Vec<_> = [first, second]
        .into_iter()
        .map(|db| {
            std::thread::spawn(move || {
                for _ in 0..50 {
                    db.increment(today).unwrap();
                }
                db
            })
        })
        .collect();

    let dbs: Vec<Database> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(dbs[0].count_on(today).unwrap(), 100);
    assert_eq!(dbs[1].total_count().unwrap(), 100);

    // Both handles seeded, but only one creation date exists
    let rows: i64 = dbs[0]
        .connection()
        .query_row("SELECT COUNT(*) FROM meta_data", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn test_shared_store_is_a_single_instance() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("DrinkToken.db");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let path = path.clone();
            std::thread::spawn(move || drinktoken_core::shared(&path).unwrap() as *const Store as usize)
        })
        .collect();
    let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(addrs.windows(2).all(|w| w[0] == w[1]));

    let other = dir.path().join("other.db");
    let again = drinktoken_core::shared(&other).unwrap();
    assert_eq!(again as *const Store as usize, addrs[0]);
    assert!(!other.exists());
}
