//! Error types for drinktoken-core

use thiserror::Error;

/// Main error type for the drinktoken-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Storage engine error (I/O or corruption reported by SQLite)
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data breaks a store invariant (negative count, missing metadata, bad date)
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Log sink could not be set up
    #[error("logging error: {0}")]
    Logging(String),
}

impl Error {
    /// True for failures reported by the storage engine or filesystem.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Io(_))
    }
}

/// Result type alias for drinktoken-core
pub type Result<T> = std::result::Result<T, Error>;
