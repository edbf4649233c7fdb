//! Database layer for drinktoken
//!
//! This module provides the storage layer using SQLite with:
//! - Schema creation and the version stamp
//! - Repository pattern for per-day counter operations and queries

pub mod repo;
pub mod schema;

pub use repo::Database;
