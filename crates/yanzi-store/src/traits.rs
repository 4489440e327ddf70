//! IntentStore trait: the abstract interface for intent persistence.
//!
//! This trait keeps the chain facade storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use yanzi_core::IntentRecord;

use crate::error::Result;

/// Default and fallback page size for [`IntentStore::list`].
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Resolve a caller-supplied limit: `None` or non-positive means the default.
pub fn effective_limit(limit: Option<i64>) -> usize {
    match limit {
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
        _ => DEFAULT_LIST_LIMIT,
    }
}

/// The store trait: append-only persistence for intent records.
///
/// # Design Notes
///
/// - **Append-only**: there is no update or delete.
/// - **Unique identity**: `id` and `hash` are both unique. Inserting either
///   twice is an error, not a no-op.
/// - **No hash checks**: a hash must be present, but the store does not
///   recompute it. Sealing and verification belong to the caller.
pub trait IntentStore: Send + Sync {
    /// Persist a new record.
    ///
    /// Fails with `Invalid` if the record has no hash or a required field is
    /// missing, and with `DuplicateId` or `DuplicateHash` if either is
    /// already stored.
    fn create(&self, record: &IntentRecord) -> Result<()>;

    /// Load a record by id. Fails with `NotFound` when absent.
    fn get(&self, id: &str) -> Result<IntentRecord>;

    /// Load a record by hash. Fails with `NotFound` when absent.
    fn get_by_hash(&self, hash: &str) -> Result<IntentRecord>;

    /// Newest records first, at most `limit` of them.
    ///
    /// Ordering is by the UTC instant of `created_at`, not its text, with
    /// ties broken by `id` descending.
    fn list(&self, limit: Option<i64>) -> Result<Vec<IntentRecord>>;

    /// Whether a record with this hash exists.
    fn has_hash(&self, hash: &str) -> Result<bool>;

    /// Number of stored records.
    fn count(&self) -> Result<usize>;
}
