//! Error types for the store module.

use std::path::PathBuf;

use thiserror::Error;
use yanzi_core::ValidationError;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database path is empty or whitespace.
    #[error("sqlite path is required")]
    InvalidPath,

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The record is not in a storable form.
    #[error("invalid intent: {0}")]
    Invalid(#[from] ValidationError),

    /// Record not found.
    #[error("intent not found: {0}")]
    NotFound(String),

    /// A record with this id already exists.
    #[error("intent id already exists: {0}")]
    DuplicateId(String),

    /// A record with this hash already exists.
    #[error("intent hash already exists: {0}")]
    DuplicateHash(String),

    /// A migration script failed; it was rolled back.
    #[error("migration {version} failed: {reason}")]
    Migration { version: String, reason: String },

    /// The migration source produced no scripts.
    #[error("no migration files found")]
    NoMigrations,

    /// A reader or writer panicked while holding the connection.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// I/O error reading migration scripts.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors produced by metadata filtering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A record's metadata could not be decoded as a JSON object.
    #[error("decode meta for intent {id}: {reason}")]
    MalformedMeta { id: String, reason: String },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
