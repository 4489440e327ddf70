//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::path::PathBuf;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use tempfile::TempDir;

use yanzi::core::HashError;
use yanzi::store::StoreError;
use yanzi::{
    ChainConfig, EmbeddedMigrations, IntentChain, IntentRecord, MemoryStore, SqliteStore,
};

/// Instant of the first sample record.
pub const SAMPLE_EPOCH: &str = "2026-02-09T10:00:00Z";

/// Creation time of the `n`th sample record, one minute apart.
pub fn sample_timestamp(n: u32) -> String {
    let base = DateTime::parse_from_rfc3339(SAMPLE_EPOCH)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default();
    (base + Duration::minutes(i64::from(n))).to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// An unsealed record with deterministic content.
pub fn sample_record(n: u32) -> IntentRecord {
    IntentRecord::builder(format!("intent-{n:04}"), sample_timestamp(n))
        .author("alice")
        .source_type("cli")
        .prompt(format!("prompt {n}"))
        .response(format!("response {n}"))
        .meta(format!(r#"{{"seq":{n},"env":"test"}}"#))
        .build()
}

/// An in-memory chain of `len` linked sample records.
pub fn sample_chain(len: u32) -> yanzi::Result<IntentChain<MemoryStore>> {
    let chain = IntentChain::new(MemoryStore::new(), ChainConfig::default());
    for n in 0..len {
        chain.append_next(sample_record(n))?;
    }
    Ok(chain)
}

/// Three sealed records with distinct metadata for filter tests.
///
/// `a` is `env=prod, owner=alice`, `b` is `env=staging, owner=bob` and `c`
/// is `env=prod` with a numeric `count`.
pub fn meta_records() -> Result<Vec<IntentRecord>, HashError> {
    [
        ("a", r#"{"env":"prod","owner":"alice"}"#),
        ("b", r#"{"env":"staging","owner":"bob"}"#),
        ("c", r#"{"env":"prod","count":2}"#),
    ]
    .into_iter()
    .enumerate()
    .map(|(n, (id, meta))| {
        IntentRecord::builder(id, sample_timestamp(n as u32))
            .author("alice")
            .source_type("cli")
            .prompt(format!("prompt {id}"))
            .response("ok")
            .meta(meta)
            .seal()
    })
    .collect()
}

/// A migrated SQLite store in a temporary directory.
///
/// The directory is removed when the fixture is dropped.
pub struct SqliteFixture {
    dir: TempDir,
    pub path: PathBuf,
    pub store: SqliteStore,
}

impl SqliteFixture {
    pub fn new() -> yanzi::Result<Self> {
        let dir = tempfile::tempdir().map_err(|source| StoreError::Io {
            path: std::env::temp_dir(),
            source,
        })?;
        let path = dir.path().join("yanzi.db");

        let store = SqliteStore::open(&path)?;
        store.migrate(&EmbeddedMigrations)?;

        Ok(Self {
            dir,
            path,
            store,
        })
    }

    /// Wrap the store in a chain with default settings.
    pub fn into_chain(self) -> (TempDir, IntentChain<SqliteStore>) {
        (self.dir, IntentChain::new(self.store, ChainConfig::default()))
    }
}
