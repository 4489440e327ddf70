//! # Yanzi
//!
//! Append-only intent records with deterministic content hashes.
//!
//! ## Overview
//!
//! An intent is an author-submitted prompt/response interaction with
//! optional JSON metadata. Each record is identified by a SHA-256 hash over
//! its normalized content and may point at a predecessor through
//! `prev_hash`, forming a verifiable chain.
//!
//! - **Hashing**: key order, whitespace, number spelling, line endings, and
//!   timestamp offsets never change a hash
//! - **Storage**: SQLite with explicit, apply-once migrations
//! - **Chain**: sealed appends, link checks, and hash verification on read
//!
//! ## Usage
//!
//! ```rust,no_run
//! use yanzi::{IntentRecord, MetaFilter};
//!
//! let chain = yanzi::open_sqlite("yanzi.db").unwrap();
//!
//! let record = IntentRecord::builder("01HZYFQ7T9ZV54X2G4A8M4J2C1", "2026-02-09T10:00:00Z")
//!     .author("alice")
//!     .source_type("cli")
//!     .prompt("summarize the incident")
//!     .response("...")
//!     .meta(r#"{"env":"prod"}"#)
//!     .build();
//! let sealed = chain.append_next(record).unwrap();
//!
//! let prod = chain.search(&MetaFilter::new().with("env", "prod"), None).unwrap();
//! # let _ = (sealed, prod);
//! ```
//!
//! ## Re-exports
//!
//! - `yanzi::core` - Records, canonicalization, hashing
//! - `yanzi::store` - Storage, migrations, metadata filtering

pub mod chain;
pub mod error;

use std::path::Path;

// Re-export component crates
pub use yanzi_core as core;
pub use yanzi_store as store;

// Re-export main types for convenience
pub use chain::{ChainConfig, IntentChain};
pub use error::{ChainError, Result};

// Re-export commonly used types
pub use yanzi_core::{canonicalize_meta, hash_intent, IntentBuilder, IntentHash, IntentRecord, RawMeta};
pub use yanzi_store::{
    filter_by_meta, EmbeddedMigrations, IntentStore, MemoryStore, MetaFilter, SqliteConfig,
    SqliteStore,
};

/// Open (or create) a SQLite-backed chain with the bundled schema applied.
pub fn open_sqlite(path: impl AsRef<Path>) -> Result<IntentChain<SqliteStore>> {
    let store = SqliteStore::open(path)?;
    store.migrate(&EmbeddedMigrations)?;
    Ok(IntentChain::new(store, ChainConfig::default()))
}
