//! Deterministic content hashing for intent records.
//!
//! The hash is SHA-256 over a canonical preimage: a compact JSON object of
//! only the fields that are present, in a fixed order:
//!
//! ```text
//! id, created_at, author, source_type, [title], prompt, response, [meta], [prev_hash]
//! ```
//!
//! Optional fields that are absent or empty are omitted (never `null`), so
//! preimages written before an optional field existed stay reproducible.
//! `created_at` is re-rendered in canonical UTC form and `meta` in canonical
//! JSON. The `hash` field never takes part in its own preimage.
//!
//! **This preimage layout is frozen.** Changing it breaks every stored hash.

use sha2::{Digest, Sha256};

use crate::canonical::{canonicalize_meta, write_json_string};
use crate::error::{HashError, ValidationError};
use crate::record::IntentRecord;
use crate::timestamp::normalize_timestamp;
use crate::types::IntentHash;

/// Preimage field names.
mod keys {
    pub const ID: &str = "id";
    pub const CREATED_AT: &str = "created_at";
    pub const AUTHOR: &str = "author";
    pub const SOURCE_TYPE: &str = "source_type";
    pub const TITLE: &str = "title";
    pub const PROMPT: &str = "prompt";
    pub const RESPONSE: &str = "response";
    pub const META: &str = "meta";
    pub const PREV_HASH: &str = "prev_hash";
}

/// Compute the lowercase hex SHA-256 hash of a record.
///
/// The record is normalized first, so callers may pass it as constructed.
pub fn hash_intent(record: &IntentRecord) -> Result<String, HashError> {
    intent_digest(record).map(|digest| digest.to_hex())
}

/// Compute the typed digest of a record.
pub fn intent_digest(record: &IntentRecord) -> Result<IntentHash, HashError> {
    let preimage = canonical_preimage(record)?;
    let digest: [u8; 32] = Sha256::digest(preimage.as_bytes()).into();
    Ok(IntentHash(digest))
}

/// Build the exact preimage text that [`hash_intent`] digests.
pub fn canonical_preimage(record: &IntentRecord) -> Result<String, HashError> {
    let record = record.normalize();

    require(&record.id, keys::ID)?;
    require(&record.created_at, keys::CREATED_AT)?;
    let created_at = normalize_timestamp(&record.created_at)?;
    require(&record.author, keys::AUTHOR)?;
    require(&record.source_type, keys::SOURCE_TYPE)?;
    require(&record.prompt, keys::PROMPT)?;
    require(&record.response, keys::RESPONSE)?;

    let meta = match record.meta() {
        Some(raw) => Some(canonicalize_meta(raw.as_bytes())?),
        None => None,
    };

    let mut preimage = PreimageWriter::new();
    preimage.string(keys::ID, &record.id);
    preimage.string(keys::CREATED_AT, &created_at);
    preimage.string(keys::AUTHOR, &record.author);
    preimage.string(keys::SOURCE_TYPE, &record.source_type);
    if let Some(title) = record.title() {
        preimage.string(keys::TITLE, title);
    }
    preimage.string(keys::PROMPT, &record.prompt);
    preimage.string(keys::RESPONSE, &record.response);
    if let Some(meta) = meta.as_deref().filter(|m| !m.is_empty()) {
        preimage.raw(keys::META, meta);
    }
    if let Some(prev_hash) = record.prev_hash() {
        preimage.string(keys::PREV_HASH, prev_hash);
    }
    Ok(preimage.finish())
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Appends `"name":value` pairs to a JSON object.
struct PreimageWriter {
    buf: String,
    first: bool,
}

impl PreimageWriter {
    fn new() -> Self {
        Self {
            buf: String::from("{"),
            first: true,
        }
    }

    fn key(&mut self, name: &str) {
        if !self.first {
            self.buf.push(',');
        }
        self.first = false;
        write_json_string(name, &mut self.buf);
        self.buf.push(':');
    }

    fn string(&mut self, name: &str, value: &str) {
        self.key(name);
        write_json_string(value, &mut self.buf);
    }

    fn raw(&mut self, name: &str, canonical: &str) {
        self.key(name);
        self.buf.push_str(canonical);
    }

    fn finish(mut self) -> String {
        self.buf.push('}');
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CanonicalError;
    use crate::record::RawMeta;

    fn base() -> IntentRecord {
        IntentRecord {
            id: "01HZYFQ7T9ZV54X2G4A8M4J2C1".into(),
            created_at: "2026-02-09T10:00:00Z".into(),
            author: "alice".into(),
            source_type: "cli".into(),
            title: None,
            prompt: "line1\nline2".into(),
            response: "resp\nline2".into(),
            meta: Some(RawMeta::new(r#"{"b":2,"a":1}"#)),
            prev_hash: None,
            hash: String::new(),
        }
    }

    fn minimal() -> IntentRecord {
        IntentRecord::builder("x", "2026-02-09T10:00:00Z")
            .author("a")
            .source_type("cli")
            .prompt("p")
            .response("r")
            .build()
    }

    #[test]
    fn test_hash_is_stable() {
        let h1 = hash_intent(&base()).unwrap();
        let h2 = hash_intent(&base()).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_minimal_hash_is_64_lowercase_hex() {
        let h1 = hash_intent(&minimal()).unwrap();
        let h2 = hash_intent(&minimal()).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_meta_key_order_ignored() {
        let mut reordered = base();
        reordered.meta = Some(RawMeta::new(r#"{"a":1,"b":2}"#));
        assert_eq!(hash_intent(&base()).unwrap(), hash_intent(&reordered).unwrap());
    }

    #[test]
    fn test_meta_number_spelling_ignored() {
        let mut respelled = base();
        respelled.meta = Some(RawMeta::new(r#"{ "a": 1.0, "b": 20e-1 }"#));
        assert_eq!(hash_intent(&base()).unwrap(), hash_intent(&respelled).unwrap());
    }

    #[test]
    fn test_newline_variants_ignored() {
        let mut variant = base();
        variant.prompt = "line1\r\nline2".into();
        variant.response = "resp\rline2".into();
        assert_eq!(hash_intent(&base()).unwrap(), hash_intent(&variant).unwrap());
    }

    #[test]
    fn test_timestamp_offset_ignored() {
        let mut shifted = base();
        shifted.created_at = "2026-02-09T11:00:00.000+01:00".into();
        assert_eq!(hash_intent(&base()).unwrap(), hash_intent(&shifted).unwrap());
    }

    #[test]
    fn test_hash_field_excluded() {
        let mut with_hash = base();
        with_hash.hash = "deadbeef".into();
        assert_eq!(hash_intent(&base()).unwrap(), hash_intent(&with_hash).unwrap());
    }

    #[test]
    fn test_empty_optionals_match_absent() {
        let mut empty = base();
        empty.title = Some(String::new());
        empty.prev_hash = Some(String::new());
        assert_eq!(hash_intent(&base()).unwrap(), hash_intent(&empty).unwrap());

        let mut no_meta = base();
        no_meta.meta = None;
        let mut empty_meta = base();
        empty_meta.meta = Some(RawMeta::default());
        assert_eq!(hash_intent(&no_meta).unwrap(), hash_intent(&empty_meta).unwrap());
    }

    #[test]
    fn test_every_field_changes_hash() {
        let original = hash_intent(&base()).unwrap();
        let mutations: Vec<fn(&mut IntentRecord)> = vec![
            |r| r.id.push('x'),
            |r| r.created_at = "2026-02-09T10:00:01Z".into(),
            |r| r.author.push('x'),
            |r| r.source_type.push('x'),
            |r| r.title = Some("t".into()),
            |r| r.prompt.push('x'),
            |r| r.response.push('x'),
            |r| r.meta = Some(RawMeta::new(r#"{"a":1,"b":3}"#)),
            |r| r.prev_hash = Some("abc".into()),
        ];
        for (i, mutate) in mutations.into_iter().enumerate() {
            let mut record = base();
            mutate(&mut record);
            assert_ne!(hash_intent(&record).unwrap(), original, "mutation {i}");
        }
    }

    #[test]
    fn test_preimage_layout() {
        let preimage = canonical_preimage(&minimal()).unwrap();
        assert_eq!(
            preimage,
            r#"{"id":"x","created_at":"2026-02-09T10:00:00Z","author":"a","source_type":"cli","prompt":"p","response":"r"}"#
        );

        let full = IntentRecord::builder("x", "2026-02-09T10:00:00.50Z")
            .author("a")
            .source_type("cli")
            .title("t")
            .prompt("p")
            .response("r")
            .meta(r#"{"z":[1, 2],"a":{}}"#)
            .prev_hash("ff")
            .build();
        assert_eq!(
            canonical_preimage(&full).unwrap(),
            r#"{"id":"x","created_at":"2026-02-09T10:00:00.5Z","author":"a","source_type":"cli","title":"t","prompt":"p","response":"r","meta":{"a":{},"z":[1,2]},"prev_hash":"ff"}"#
        );
    }

    #[test]
    fn test_missing_fields_named() {
        let cases: Vec<(&str, fn(&mut IntentRecord))> = vec![
            ("id", |r| r.id.clear()),
            ("created_at", |r| r.created_at.clear()),
            ("author", |r| r.author.clear()),
            ("source_type", |r| r.source_type.clear()),
            ("prompt", |r| r.prompt.clear()),
            ("response", |r| r.response.clear()),
        ];
        for (field, mutate) in cases {
            let mut record = base();
            mutate(&mut record);
            assert_eq!(
                hash_intent(&record),
                Err(HashError::Validation(ValidationError::MissingField(field)))
            );
        }
    }

    #[test]
    fn test_invalid_timestamp() {
        let mut record = base();
        record.created_at = "not-a-time".into();
        assert!(matches!(
            hash_intent(&record),
            Err(HashError::Validation(ValidationError::InvalidTimestamp { .. }))
        ));
    }

    #[test]
    fn test_meta_errors_propagate() {
        let mut record = base();
        record.meta = Some(RawMeta::new("[1]"));
        assert_eq!(
            hash_intent(&record),
            Err(HashError::Canonical(CanonicalError::InvalidShape("array")))
        );

        record.meta = Some(RawMeta::new(r#"{"env":"#));
        assert!(matches!(
            hash_intent(&record),
            Err(HashError::Canonical(CanonicalError::MalformedInput(_)))
        ));

        record.meta = Some(RawMeta::new(r#"{} {}"#));
        assert!(matches!(
            hash_intent(&record),
            Err(HashError::Canonical(CanonicalError::TrailingData { .. }))
        ));
    }

    #[test]
    fn test_typed_digest_matches_hex() {
        let digest = intent_digest(&base()).unwrap();
        assert_eq!(digest.to_hex(), hash_intent(&base()).unwrap());
    }
}
