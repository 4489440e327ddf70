//! # Yanzi Testkit
//!
//! Testing utilities for the Yanzi intent chain.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known records with their exact preimage and hash
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Sample records, chains and temporary SQLite stores
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the hashing format so other implementations can be
//! checked against it:
//!
//! ```rust
//! use yanzi_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     let hash = yanzi_core::hash_intent(&vector.record()).unwrap();
//!     assert_eq!(hash, vector.expected_hash);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use yanzi_testkit::generators::{record_from_params, IntentParams};
//!
//! proptest! {
//!     #[test]
//!     fn hash_is_deterministic(params: IntentParams) {
//!         let r1 = record_from_params(&params);
//!         let r2 = record_from_params(&params);
//!         prop_assert_eq!(r1.seal().unwrap().hash, r2.seal().unwrap().hash);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use yanzi_testkit::fixtures::sample_chain;
//!
//! let chain = sample_chain(3).unwrap();
//! assert_eq!(chain.verify_chain().unwrap(), 3);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{meta_records, sample_chain, sample_record, SqliteFixture};
pub use generators::{record_from_params, IntentParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
