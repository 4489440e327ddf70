//! SQLite implementation of the IntentStore trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite; one connection is shared behind a mutex.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::debug;

use yanzi_core::{sort_key, validate_record, IntentRecord, RawMeta};

use crate::error::{Result, StoreError};
use crate::migration::{self, MigrationSource};
use crate::traits::{effective_limit, IntentStore};

const SELECT_INTENT: &str = "SELECT id, created_at, author, source_type, title, prompt, \
     response, meta, prev_hash, hash FROM intents";

/// Connection settings applied when a store is opened.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout: Duration,
    /// Use write-ahead logging.
    pub wal: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            wal: true,
        }
    }
}

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. The schema is not created on open; call
/// [`SqliteStore::migrate`] first.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path with default settings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, &SqliteConfig::default())
    }

    /// Open a SQLite database at the given path.
    ///
    /// Blank paths are rejected before touching the filesystem.
    pub fn open_with_config(path: impl AsRef<Path>, config: &SqliteConfig) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(StoreError::InvalidPath);
        }

        let conn = Connection::open(path)?;
        configure(&conn, config)?;
        debug!(path = %path.display(), "sqlite store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        configure(
            &conn,
            &SqliteConfig {
                wal: false,
                ..SqliteConfig::default()
            },
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Close the connection, reporting any error SQLite raises doing so.
    pub fn close(self) -> Result<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| StoreError::LockPoisoned)?;
        conn.close().map_err(|(_, e)| StoreError::Database(e))
    }

    /// Apply pending migrations from `source`. Returns the versions applied.
    pub fn migrate(&self, source: &dyn MigrationSource) -> Result<Vec<String>> {
        self.with_conn_mut(|conn| migration::migrate(conn, source))
    }

    /// Versions recorded as applied, ascending.
    pub fn applied_migrations(&self) -> Result<Vec<String>> {
        self.with_conn(migration::applied_versions)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Execute an operation on the connection.
    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Execute an operation that needs mutable access.
    fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.lock()?;
        f(&mut conn)
    }

    fn query_one(&self, clause: &str, key: &str) -> Result<IntentRecord> {
        self.with_conn(|conn| {
            conn.query_row(&format!("{SELECT_INTENT} WHERE {clause} = ?1"), params![key], row_to_record)
                .optional()?
                .ok_or_else(|| StoreError::NotFound(key.to_owned()))
        })
    }
}

fn configure(conn: &Connection, config: &SqliteConfig) -> Result<()> {
    if config.wal {
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(journal_mode = %mode, "journal mode set");
    }
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(config.busy_timeout)?;
    Ok(())
}

// Helper to convert a row to IntentRecord
fn row_to_record(row: &Row<'_>) -> rusqlite::Result<IntentRecord> {
    let meta: Option<String> = row.get("meta")?;
    Ok(IntentRecord {
        id: row.get("id")?,
        created_at: row.get("created_at")?,
        author: row.get("author")?,
        source_type: row.get("source_type")?,
        title: row.get("title")?,
        prompt: row.get("prompt")?,
        response: row.get("response")?,
        meta: meta.filter(|m| !m.is_empty()).map(RawMeta::from),
        prev_hash: row.get("prev_hash")?,
        hash: row.get("hash")?,
    })
}

// Map a failed INSERT to the uniqueness violation it represents.
fn insert_error(err: rusqlite::Error, record: &IntentRecord) -> StoreError {
    if let rusqlite::Error::SqliteFailure(ref failure, Some(ref message)) = err {
        if failure.code == ErrorCode::ConstraintViolation {
            if message.contains("intents.hash") {
                return StoreError::DuplicateHash(record.hash.clone());
            }
            if message.contains("intents.id") {
                return StoreError::DuplicateId(record.id.clone());
            }
        }
    }
    StoreError::Database(err)
}

impl IntentStore for SqliteStore {
    fn create(&self, record: &IntentRecord) -> Result<()> {
        validate_record(record)?;
        let created_at_utc = sort_key(&record.created_at)?;

        self.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM intents WHERE id = ?1",
                    params![record.id],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Err(StoreError::DuplicateId(record.id.clone()));
            }

            conn.execute(
                "INSERT INTO intents (id, created_at, author, source_type, title, prompt, \
                 response, meta, prev_hash, hash, created_at_utc) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    record.id,
                    record.created_at,
                    record.author,
                    record.source_type,
                    record.title(),
                    record.prompt,
                    record.response,
                    record.meta().map(RawMeta::as_str),
                    record.prev_hash(),
                    record.hash,
                    created_at_utc,
                ],
            )
            .map_err(|e| insert_error(e, record))?;

            debug!(id = %record.id, hash = %record.hash, "intent created");
            Ok(())
        })
    }

    fn get(&self, id: &str) -> Result<IntentRecord> {
        self.query_one("id", id)
    }

    fn get_by_hash(&self, hash: &str) -> Result<IntentRecord> {
        self.query_one("hash", hash)
    }

    fn list(&self, limit: Option<i64>) -> Result<Vec<IntentRecord>> {
        let limit = i64::try_from(effective_limit(limit)).unwrap_or(i64::MAX);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_INTENT} ORDER BY created_at_utc DESC, id DESC LIMIT ?1"
            ))?;
            let records = stmt
                .query_map(params![limit], row_to_record)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(records)
        })
    }

    fn has_hash(&self, hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM intents WHERE hash = ?1",
                    params![hash],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM intents", [], |row| row.get(0))?;
            Ok(usize::try_from(count).unwrap_or(0))
        })
    }
}
