//! In-memory implementation of the IntentStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::debug;
use yanzi_core::{parse_timestamp, validate_record, IntentRecord};

use crate::error::{Result, StoreError};
use crate::traits::{effective_limit, IntentStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Records indexed by id.
    records: HashMap<String, StoredIntent>,

    /// Hash index: hash -> id.
    hashes: HashMap<String, String>,
}

struct StoredIntent {
    record: IntentRecord,
    created_at: DateTime<Utc>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentStore for MemoryStore {
    fn create(&self, record: &IntentRecord) -> Result<()> {
        validate_record(record)?;
        let created_at = parse_timestamp(&record.created_at)?;

        let mut inner = self.write()?;

        if inner.records.contains_key(&record.id) {
            return Err(StoreError::DuplicateId(record.id.clone()));
        }
        if inner.hashes.contains_key(&record.hash) {
            return Err(StoreError::DuplicateHash(record.hash.clone()));
        }

        // Match the SQLite row form: empty optionals come back as None.
        let mut stored = record.clone();
        stored.title = record.title().map(str::to_owned);
        stored.meta = record.meta().cloned();
        stored.prev_hash = record.prev_hash().map(str::to_owned);

        inner.hashes.insert(record.hash.clone(), record.id.clone());
        inner.records.insert(
            record.id.clone(),
            StoredIntent {
                record: stored,
                created_at,
            },
        );

        debug!(id = %record.id, hash = %record.hash, "intent created");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<IntentRecord> {
        let inner = self.read()?;
        inner
            .records
            .get(id)
            .map(|stored| stored.record.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))
    }

    fn get_by_hash(&self, hash: &str) -> Result<IntentRecord> {
        let inner = self.read()?;
        inner
            .hashes
            .get(hash)
            .and_then(|id| inner.records.get(id))
            .map(|stored| stored.record.clone())
            .ok_or_else(|| StoreError::NotFound(hash.to_owned()))
    }

    fn list(&self, limit: Option<i64>) -> Result<Vec<IntentRecord>> {
        let inner = self.read()?;
        let mut records: Vec<&StoredIntent> = inner.records.values().collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.record.id.as_bytes().cmp(a.record.id.as_bytes()))
        });
        Ok(records
            .into_iter()
            .take(effective_limit(limit))
            .map(|stored| stored.record.clone())
            .collect())
    }

    fn has_hash(&self, hash: &str) -> Result<bool> {
        Ok(self.read()?.hashes.contains_key(hash))
    }

    fn count(&self) -> Result<usize> {
        Ok(self.read()?.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yanzi_core::{RawMeta, ValidationError};

    fn make_record(id: &str, created_at: &str) -> IntentRecord {
        IntentRecord::builder(id, created_at)
            .author("alice")
            .source_type("cli")
            .prompt(format!("prompt for {id}"))
            .response("response")
            .seal()
            .unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let store = MemoryStore::new();
        let record = make_record("a", "2026-02-09T10:00:00Z");

        store.create(&record).unwrap();

        assert_eq!(store.get("a").unwrap(), record);
        assert_eq!(store.get_by_hash(&record.hash).unwrap(), record);
        assert!(store.has_hash(&record.hash).unwrap());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(store.get("a"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.get_by_hash("ff"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_duplicates_rejected() {
        let store = MemoryStore::new();
        let record = make_record("a", "2026-02-09T10:00:00Z");
        store.create(&record).unwrap();

        assert!(matches!(store.create(&record), Err(StoreError::DuplicateId(_))));

        let mut clash = make_record("b", "2026-02-09T10:00:00Z");
        clash.hash = record.hash.clone();
        assert!(matches!(store.create(&clash), Err(StoreError::DuplicateHash(_))));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_empty_optionals_read_back_as_none() {
        let store = MemoryStore::new();
        let mut record = make_record("a", "2026-02-09T10:00:00Z");
        record.title = Some(String::new());
        record.meta = Some(RawMeta::default());
        record.prev_hash = Some(String::new());
        store.create(&record).unwrap();

        let loaded = store.get("a").unwrap();
        assert_eq!(loaded.title, None);
        assert_eq!(loaded.meta, None);
        assert_eq!(loaded.prev_hash, None);
    }

    #[test]
    fn test_list_order_and_limit() {
        let store = MemoryStore::new();
        store.create(&make_record("a", "2026-02-09T10:00:00Z")).unwrap();
        store.create(&make_record("b", "2026-02-09T12:00:00Z")).unwrap();
        store.create(&make_record("c", "2026-02-09T11:00:00Z")).unwrap();
        store.create(&make_record("d", "2026-02-09T12:00:00Z")).unwrap();

        let ids: Vec<String> = store.list(None).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["d", "b", "c", "a"]);

        let ids: Vec<String> = store.list(Some(1)).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["d"]);
    }

    #[test]
    fn test_list_orders_by_instant() {
        let store = MemoryStore::new();
        store.create(&make_record("older", "2026-02-09T10:00:00Z")).unwrap();
        store.create(&make_record("newer", "2026-02-09T10:00:00.5Z")).unwrap();
        store.create(&make_record("oldest", "2026-02-09T11:00:00+02:00")).unwrap();

        let ids: Vec<String> = store.list(None).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["newer", "older", "oldest"]);
    }

    #[test]
    fn test_create_rejects_unsealed_record() {
        let store = MemoryStore::new();
        let mut first = make_record("a", "2026-02-09T10:00:00Z");
        first.hash.clear();
        let mut second = make_record("b", "2026-02-09T10:00:00Z");
        second.hash.clear();

        for record in [&first, &second] {
            assert!(matches!(
                store.create(record),
                Err(StoreError::Invalid(ValidationError::MissingField("hash")))
            ));
        }
        assert_eq!(store.count().unwrap(), 0);
    }
}
