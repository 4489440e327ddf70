//! Database schema migrations for SQLite.
//!
//! Migrations are ordered SQL scripts identified by a text version (the
//! script's file name). Each is applied at most once; applied versions are
//! recorded in `schema_migrations`. Versions are applied in ascending
//! lexicographic order, so `0002_x.sql` always runs after `0001_y.sql`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};

const SCHEMA_MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TEXT NOT NULL
);
";

/// A single migration script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub version: String,
    pub script: String,
}

impl Migration {
    pub fn new(version: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            script: script.into(),
        }
    }
}

/// Where migration scripts come from.
pub trait MigrationSource {
    /// All known migrations, in any order.
    fn migrations(&self) -> Result<Vec<Migration>>;
}

/// The schema scripts compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedMigrations;

const EMBEDDED: &[(&str, &str)] = &[
    (
        "0001_create_intents.sql",
        include_str!("../migrations/0001_create_intents.sql"),
    ),
    (
        "0002_index_created_at.sql",
        include_str!("../migrations/0002_index_created_at.sql"),
    ),
    (
        "0003_created_at_utc.sql",
        include_str!("../migrations/0003_created_at_utc.sql"),
    ),
];

impl MigrationSource for EmbeddedMigrations {
    fn migrations(&self) -> Result<Vec<Migration>> {
        Ok(EMBEDDED
            .iter()
            .map(|(version, script)| Migration::new(*version, *script))
            .collect())
    }
}

/// `*.sql` files read from a directory. The file name is the version.
#[derive(Debug, Clone)]
pub struct DirectoryMigrations {
    dir: PathBuf,
}

impl DirectoryMigrations {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MigrationSource for DirectoryMigrations {
    fn migrations(&self) -> Result<Vec<Migration>> {
        let mut migrations = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| io_error(&self.dir, e))? {
            let entry = entry.map_err(|e| io_error(&self.dir, e))?;
            let path = entry.path();
            if entry.file_type().map_err(|e| io_error(&path, e))?.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".sql") {
                continue;
            }
            let script = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            migrations.push(Migration::new(name, script));
        }
        Ok(migrations)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Apply every pending migration from `source`.
///
/// Each script and its bookkeeping row commit in one transaction. A failing
/// script is rolled back and stops the pass; scripts applied before it stay
/// applied. Re-running is a no-op.
///
/// Returns the versions applied by this call.
pub fn migrate(conn: &mut Connection, source: &dyn MigrationSource) -> Result<Vec<String>> {
    conn.execute_batch(SCHEMA_MIGRATIONS_TABLE)?;

    let mut migrations = source.migrations()?;
    if migrations.is_empty() {
        return Err(StoreError::NoMigrations);
    }
    migrations.sort_by(|a, b| a.version.cmp(&b.version));

    let mut applied = Vec::new();
    for migration in migrations {
        if is_applied(conn, &migration.version)? {
            debug!(version = %migration.version, "migration already applied");
            continue;
        }

        if let Err(e) = apply(conn, &migration) {
            warn!(version = %migration.version, error = %e, "migration failed");
            return Err(e);
        }

        info!(version = %migration.version, "migration applied");
        applied.push(migration.version);
    }

    Ok(applied)
}

/// Versions recorded in `schema_migrations`, ascending.
pub fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(versions)
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM schema_migrations WHERE version = ?1",
            params![version],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn apply(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let failed = |e: rusqlite::Error| StoreError::Migration {
        version: migration.version.clone(),
        reason: e.to_string(),
    };

    // Dropping the transaction on any early return rolls it back.
    let tx = conn.transaction().map_err(failed)?;
    tx.execute_batch(&migration.script).map_err(failed)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
        params![
            migration.version,
            Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true)
        ],
    )
    .map_err(failed)?;
    tx.commit().map_err(failed)?;
    Ok(())
}
