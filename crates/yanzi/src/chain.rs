//! The IntentChain: sealed appends and link verification over a store.
//!
//! The store persists whatever it is given. The chain is where records get
//! their hash, where stored hashes are re-checked, and where `prev_hash`
//! links are followed.

use std::collections::HashSet;

use tracing::{debug, warn};
use yanzi_core::{intent_digest, validate_record, IntentHash, IntentRecord};
use yanzi_store::{filter_by_meta, IntentStore, MetaFilter, StoreError};

use crate::error::{ChainError, Result};

/// Configuration for the IntentChain.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Reject appends whose `prev_hash` is not already stored.
    pub verify_links: bool,
    /// Recompute the hash of every record read through the chain.
    pub verify_on_read: bool,
    /// Upper bound on records visited by a single walk.
    pub max_walk_depth: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            verify_links: true,
            verify_on_read: true,
            max_walk_depth: 10_000,
        }
    }
}

/// An append-only chain of intent records.
///
/// Provides:
/// - Sealing and appending records
/// - Linking a record to the current head
/// - Reading records with hash verification
/// - Walking `prev_hash` links back to the root
/// - Metadata search over recent records
pub struct IntentChain<S: IntentStore> {
    /// The storage backend.
    store: S,
    /// Configuration.
    config: ChainConfig,
}

impl<S: IntentStore> IntentChain<S> {
    /// Create a chain over `store`.
    pub fn new(store: S, config: ChainConfig) -> Self {
        Self { store, config }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Release the chain and return its store.
    pub fn into_store(self) -> S {
        self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Append
    // ─────────────────────────────────────────────────────────────────────────

    /// Seal a record and persist it.
    ///
    /// The record is normalized and hashed here; any hash it carries is
    /// replaced. Returns the record as stored.
    pub fn append(&self, record: IntentRecord) -> Result<IntentRecord> {
        let sealed = record.seal()?;
        validate_record(&sealed)?;

        if self.config.verify_links {
            if let Some(prev) = sealed.prev_hash() {
                if !self.store.has_hash(prev)? {
                    return Err(ChainError::BrokenLink {
                        hash: prev.to_owned(),
                    });
                }
            }
        }

        self.store.create(&sealed)?;
        debug!(id = %sealed.id, hash = %sealed.hash, "intent appended");
        Ok(sealed)
    }

    /// Link a record to the current head and append it.
    ///
    /// On an empty chain the record becomes a root with no `prev_hash`.
    pub fn append_next(&self, mut record: IntentRecord) -> Result<IntentRecord> {
        record.prev_hash = self.head()?.map(|head| head.hash);
        self.append(record)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read
    // ─────────────────────────────────────────────────────────────────────────

    /// The newest record, if any.
    pub fn head(&self) -> Result<Option<IntentRecord>> {
        let head = self.store.list(Some(1))?.into_iter().next();
        if let Some(record) = &head {
            self.check(record)?;
        }
        Ok(head)
    }

    /// Load a record by id.
    pub fn get(&self, id: &str) -> Result<IntentRecord> {
        let record = self.store.get(id)?;
        self.check(&record)?;
        Ok(record)
    }

    /// Load a record by hash.
    pub fn get_by_hash(&self, hash: &str) -> Result<IntentRecord> {
        let record = self.store.get_by_hash(hash)?;
        self.check(&record)?;
        Ok(record)
    }

    /// Recent records whose metadata satisfies `filter`, newest first.
    pub fn search(&self, filter: &MetaFilter, limit: Option<i64>) -> Result<Vec<IntentRecord>> {
        let records = self.store.list(limit)?;
        for record in &records {
            self.check(record)?;
        }
        Ok(filter_by_meta(records, filter)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Recompute a record's hash and compare it to the stored value.
    ///
    /// A stored hash that does not parse as a digest is a mismatch.
    pub fn verify(&self, record: &IntentRecord) -> Result<()> {
        let computed = intent_digest(record)?;
        let stored = IntentHash::from_hex(&record.hash).ok();
        if stored != Some(computed) {
            warn!(id = %record.id, stored = %record.hash, %computed, "hash mismatch");
            return Err(ChainError::HashMismatch {
                id: record.id.clone(),
                stored: record.hash.clone(),
                computed: computed.to_hex(),
            });
        }
        Ok(())
    }

    /// Follow `prev_hash` links from `hash` back to the root.
    ///
    /// Returns the records newest first; the last element has no
    /// `prev_hash`. Records are verified when `verify_on_read` is set.
    pub fn walk(&self, hash: &str) -> Result<Vec<IntentRecord>> {
        self.walk_from(hash, self.config.verify_on_read)
    }

    /// Verify every record in the chain ending at the current head.
    /// Returns the chain length.
    pub fn verify_chain(&self) -> Result<usize> {
        let Some(head) = self.store.list(Some(1))?.into_iter().next() else {
            return Ok(0);
        };
        Ok(self.walk_from(&head.hash, true)?.len())
    }

    fn walk_from(&self, hash: &str, verify: bool) -> Result<Vec<IntentRecord>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(hash.to_owned());

        while let Some(hash) = next {
            if chain.len() >= self.config.max_walk_depth {
                return Err(ChainError::DepthExceeded {
                    max: self.config.max_walk_depth,
                });
            }
            if !seen.insert(hash.clone()) {
                return Err(ChainError::Cycle { hash });
            }

            let record = match self.store.get_by_hash(&hash) {
                Ok(record) => record,
                Err(StoreError::NotFound(_)) => return Err(ChainError::BrokenLink { hash }),
                Err(e) => return Err(e.into()),
            };
            if verify {
                self.verify(&record)?;
            }

            next = record.prev_hash().map(str::to_owned);
            chain.push(record);
        }

        Ok(chain)
    }

    fn check(&self, record: &IntentRecord) -> Result<()> {
        if self.config.verify_on_read {
            self.verify(record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yanzi_store::MemoryStore;

    fn make_chain() -> IntentChain<MemoryStore> {
        IntentChain::new(MemoryStore::new(), ChainConfig::default())
    }

    fn intent(id: &str, created_at: &str) -> IntentRecord {
        IntentRecord::builder(id, created_at)
            .author("alice")
            .source_type("cli")
            .prompt(format!("prompt {id}"))
            .response("response")
            .build()
    }

    #[test]
    fn test_append_seals_record() {
        let chain = make_chain();
        let mut record = intent("a", "2026-02-09T10:00:00Z");
        record.prompt = "x\r\ny".into();
        record.hash = "bogus".into();

        let sealed = chain.append(record).unwrap();
        assert_eq!(sealed.prompt, "x\ny");
        assert_eq!(sealed.hash.len(), 64);
        assert_eq!(chain.get("a").unwrap(), sealed);
    }

    #[test]
    fn test_append_rejects_unknown_prev() {
        let chain = make_chain();
        let mut record = intent("a", "2026-02-09T10:00:00Z");
        record.prev_hash = Some("ff".repeat(32));

        let result = chain.append(record);
        assert!(matches!(result, Err(ChainError::BrokenLink { .. })));
        assert_eq!(chain.store().count().unwrap(), 0);
    }

    #[test]
    fn test_unverified_links_allowed_when_disabled() {
        let config = ChainConfig {
            verify_links: false,
            ..ChainConfig::default()
        };
        let chain = IntentChain::new(MemoryStore::new(), config);
        let mut record = intent("a", "2026-02-09T10:00:00Z");
        record.prev_hash = Some("ff".repeat(32));

        assert!(chain.append(record).is_ok());
    }

    #[test]
    fn test_append_next_links_to_head() {
        let chain = make_chain();
        let first = chain.append_next(intent("a", "2026-02-09T10:00:00Z")).unwrap();
        assert_eq!(first.prev_hash, None);

        let second = chain.append_next(intent("b", "2026-02-09T10:01:00Z")).unwrap();
        assert_eq!(second.prev_hash.as_deref(), Some(first.hash.as_str()));

        let third = chain.append_next(intent("c", "2026-02-09T10:02:00Z")).unwrap();
        assert_eq!(chain.head().unwrap().unwrap(), third);

        let walked: Vec<String> = chain.walk(&third.hash).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(walked, vec!["c", "b", "a"]);
        assert_eq!(chain.verify_chain().unwrap(), 3);
    }

    #[test]
    fn test_tampered_record_detected_on_read() {
        let chain = make_chain();
        let mut forged = intent("a", "2026-02-09T10:00:00Z").seal().unwrap();
        forged.response = "edited after sealing".into();
        chain.store().create(&forged).unwrap();

        assert!(matches!(chain.get("a"), Err(ChainError::HashMismatch { .. })));
        assert!(matches!(chain.verify_chain(), Err(ChainError::HashMismatch { .. })));
    }

    #[test]
    fn test_walk_broken_link() {
        let config = ChainConfig {
            verify_links: false,
            ..ChainConfig::default()
        };
        let chain = IntentChain::new(MemoryStore::new(), config);
        let missing = "ab".repeat(32);
        let mut record = intent("a", "2026-02-09T10:00:00Z");
        record.prev_hash = Some(missing.clone());
        let sealed = chain.append(record).unwrap();

        let result = chain.walk(&sealed.hash);
        assert!(matches!(result, Err(ChainError::BrokenLink { hash }) if hash == missing));
    }

    #[test]
    fn test_walk_depth_bound() {
        let config = ChainConfig {
            max_walk_depth: 2,
            ..ChainConfig::default()
        };
        let chain = IntentChain::new(MemoryStore::new(), config);
        chain.append_next(intent("a", "2026-02-09T10:00:00Z")).unwrap();
        chain.append_next(intent("b", "2026-02-09T10:01:00Z")).unwrap();
        let head = chain.append_next(intent("c", "2026-02-09T10:02:00Z")).unwrap();

        assert!(matches!(chain.walk(&head.hash), Err(ChainError::DepthExceeded { max: 2 })));
    }

    #[test]
    fn test_walk_cycle() {
        // Rows written directly with rewritten links, so their hashes no
        // longer match; only an unverified walk gets as far as the cycle.
        let store = MemoryStore::new();
        let a = intent("a", "2026-02-09T10:00:00Z").seal().unwrap();
        let b = intent("b", "2026-02-09T10:01:00Z").seal().unwrap();
        let mut a_linked = a.clone();
        a_linked.prev_hash = Some(b.hash.clone());
        let mut b_linked = b.clone();
        b_linked.prev_hash = Some(a.hash.clone());
        store.create(&a_linked).unwrap();
        store.create(&b_linked).unwrap();

        let config = ChainConfig {
            verify_on_read: false,
            ..ChainConfig::default()
        };
        let chain = IntentChain::new(store, config);
        assert!(matches!(chain.walk(&a.hash), Err(ChainError::Cycle { hash }) if hash == a.hash));
        assert!(matches!(chain.verify_chain(), Err(ChainError::HashMismatch { .. })));
    }

    #[test]
    fn test_search_filters_recent() {
        let chain = make_chain();
        let mut a = intent("a", "2026-02-09T10:00:00Z");
        a.meta = Some(r#"{"env":"prod"}"#.into());
        let mut b = intent("b", "2026-02-09T10:01:00Z");
        b.meta = Some(r#"{"env":"dev"}"#.into());
        let mut c = intent("c", "2026-02-09T10:02:00Z");
        c.meta = Some(r#"{"env":"prod"}"#.into());
        for record in [a, b, c] {
            chain.append(record).unwrap();
        }

        let found: Vec<String> = chain
            .search(&MetaFilter::new().with("env", "prod"), None)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(found, vec!["c", "a"]);
    }

    #[test]
    fn test_empty_chain() {
        let chain = make_chain();
        assert!(chain.head().unwrap().is_none());
        assert_eq!(chain.verify_chain().unwrap(), 0);
    }

    proptest::proptest! {
        #[test]
        fn prop_linked_chain_walks_back_to_root(len in 1usize..12) {
            let chain = make_chain();
            let mut hashes = Vec::new();
            for i in 0..len {
                let created_at = format!("2026-02-09T10:{i:02}:00Z");
                hashes.push(chain.append_next(intent(&format!("r{i}"), &created_at)).unwrap().hash);
            }

            let walked: Vec<String> = chain
                .walk(&hashes[len - 1])
                .unwrap()
                .into_iter()
                .map(|r| r.hash)
                .collect();
            hashes.reverse();
            proptest::prop_assert_eq!(walked, hashes);
            proptest::prop_assert_eq!(chain.verify_chain().unwrap(), len);
        }
    }

    #[test]
    fn test_append_next_follows_instants_not_text() {
        let chain = make_chain();
        let a = chain.append_next(intent("a", "2026-02-09T10:00:00Z")).unwrap();
        let b = chain.append_next(intent("b", "2026-02-09T10:00:00.5Z")).unwrap();
        let c = chain.append_next(intent("c", "2026-02-09T12:00:01.25+02:00")).unwrap();

        assert_eq!(b.prev_hash.as_deref(), Some(a.hash.as_str()));
        assert_eq!(c.prev_hash.as_deref(), Some(b.hash.as_str()));
        assert_eq!(chain.head().unwrap().unwrap().id, "c");
        assert_eq!(chain.verify_chain().unwrap(), 3);
    }

    #[test]
    fn test_verify_accepts_uppercase_and_rejects_garbage() {
        let chain = make_chain();
        let mut record = chain.append(intent("a", "2026-02-09T10:00:00Z")).unwrap();

        record.hash = record.hash.to_uppercase();
        assert!(chain.verify(&record).is_ok());

        record.hash = "zz".into();
        assert!(matches!(
            chain.verify(&record),
            Err(ChainError::HashMismatch { ref stored, .. }) if stored == "zz"
        ));
    }
}
