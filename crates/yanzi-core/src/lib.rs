//! # Yanzi Core
//!
//! Pure primitives for Yanzi: intent records, canonical metadata, and
//! content hashing.
//!
//! This crate contains no I/O and no storage. It is pure computation over
//! record text.
//!
//! ## Key Types
//!
//! - [`IntentRecord`] - An author-submitted prompt/response interaction
//! - [`RawMeta`] - Metadata JSON text, kept verbatim
//! - [`IntentHash`] - SHA-256 content digest
//! - [`MetaValue`] - Decoded metadata tree
//!
//! ## Hashing
//!
//! A record's hash covers every other field after newline normalization,
//! UTC timestamp normalization, and metadata canonicalization. See the
//! [`hash`] and [`canonical`] modules.

pub mod canonical;
pub mod error;
pub mod hash;
pub mod normalize;
pub mod number;
pub mod record;
pub mod timestamp;
pub mod types;
pub mod validation;

pub use canonical::{canonicalize_meta, decode_meta, MetaValue};
pub use error::{CanonicalError, HashError, ValidationError};
pub use hash::{canonical_preimage, hash_intent, intent_digest};
pub use normalize::{normalize_newlines, normalize_record};
pub use number::CanonicalNumber;
pub use record::{IntentBuilder, IntentRecord, RawMeta};
pub use timestamp::{format_timestamp, normalize_timestamp, parse_timestamp, sort_key};
pub use types::IntentHash;
pub use validation::{validate_for_hashing, validate_record};
