//! # Yanzi Store
//!
//! Persistence for intent records. Provides a trait-based interface with
//! SQLite and in-memory implementations, schema migrations, and metadata
//! filtering over retrieved records.
//!
//! ## Key Types
//!
//! - [`IntentStore`] - The sync trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`MigrationSource`] - Where schema scripts come from
//! - [`MetaFilter`] - Exact-match metadata constraints
//!
//! ## Usage
//!
//! ```rust,no_run
//! use yanzi_store::{EmbeddedMigrations, IntentStore, MetaFilter, SqliteStore, filter_by_meta};
//!
//! let store = SqliteStore::open("yanzi.db").unwrap();
//! store.migrate(&EmbeddedMigrations).unwrap();
//!
//! let recent = store.list(Some(20)).unwrap();
//! let prod = filter_by_meta(recent, &MetaFilter::new().with("env", "prod")).unwrap();
//! # let _ = prod;
//! ```
//!
//! ## Design Notes
//!
//! - **Append-only**: records are created once and never updated or deleted
//! - **Unique id and hash**: duplicates of either are rejected
//! - **Explicit migrations**: opening a store never changes its schema

pub mod error;
pub mod filter;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{FilterError, Result, StoreError};
pub use filter::{filter_by_meta, MetaFilter};
pub use memory::MemoryStore;
pub use migration::{DirectoryMigrations, EmbeddedMigrations, Migration, MigrationSource};
pub use sqlite::{SqliteConfig, SqliteStore};
pub use traits::{IntentStore, DEFAULT_LIST_LIMIT};
