//! IntentRecord: an author-submitted prompt/response interaction.
//!
//! A record is immutable once sealed. Its hash covers every other field
//! after normalization, so any edit produces a different record.

use serde::de::Deserializer;
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fmt;

use crate::canonical::canonicalize_meta;
use crate::error::{CanonicalError, HashError};
use crate::hash::{hash_intent, intent_digest};
use crate::types::IntentHash;
use crate::normalize::normalize_record;

/// A persisted intent record.
///
/// `title`, `meta`, and `prev_hash` are optional; an empty string in any of
/// them is treated exactly like `None` when hashing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRecord {
    /// Opaque unique identifier, assigned by the caller.
    pub id: String,

    /// RFC 3339 timestamp, assigned by the caller.
    pub created_at: String,

    pub author: String,

    pub source_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub prompt: String,

    pub response: String,

    /// Raw JSON object text. Kept verbatim; only the hash sees the
    /// canonical form.
    #[serde(default, skip_serializing_if = "meta_absent")]
    pub meta: Option<RawMeta>,

    /// Hash of the predecessor record in the chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_hash: Option<String>,

    /// Lowercase hex SHA-256 of the canonical preimage.
    #[serde(default)]
    pub hash: String,
}

fn meta_absent(meta: &Option<RawMeta>) -> bool {
    meta.as_ref().map_or(true, RawMeta::is_empty)
}

impl IntentRecord {
    /// Start building a record with the caller-assigned identity fields.
    pub fn builder(id: impl Into<String>, created_at: impl Into<String>) -> IntentBuilder {
        IntentBuilder::new(id, created_at)
    }

    /// Return a copy with line endings normalized in every free-text field.
    pub fn normalize(&self) -> IntentRecord {
        normalize_record(self)
    }

    /// The title, if present and non-empty.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// The metadata, if present and non-empty.
    pub fn meta(&self) -> Option<&RawMeta> {
        self.meta.as_ref().filter(|m| !m.is_empty())
    }

    /// The predecessor hash, if present and non-empty.
    pub fn prev_hash(&self) -> Option<&str> {
        self.prev_hash.as_deref().filter(|h| !h.is_empty())
    }

    /// Normalize the record and assign its content hash.
    ///
    /// Any hash already present is replaced.
    pub fn seal(self) -> Result<IntentRecord, HashError> {
        let mut sealed = self.normalize();
        sealed.hash = hash_intent(&sealed)?;
        Ok(sealed)
    }

    /// Recompute the content hash and compare it to the stored one.
    ///
    /// A stored hash that is not 64 hex digits never verifies.
    pub fn verify_hash(&self) -> Result<bool, HashError> {
        let computed = intent_digest(self)?;
        Ok(IntentHash::from_hex(&self.hash).map_or(false, |stored| stored == computed))
    }
}

/// Raw JSON metadata text.
///
/// Stored exactly as supplied. Serializes as embedded JSON rather than a
/// quoted string, and deserializes from any JSON value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RawMeta(String);

impl RawMeta {
    /// Wrap raw JSON text. No validation happens here.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Canonical form of this metadata, see [`canonicalize_meta`].
    pub fn canonicalize(&self) -> Result<String, CanonicalError> {
        canonicalize_meta(self.as_bytes())
    }
}

impl fmt::Display for RawMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RawMeta {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for RawMeta {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl Serialize for RawMeta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw: &RawValue = serde_json::from_str(&self.0).map_err(ser::Error::custom)?;
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RawMeta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Ok(Self(raw.get().to_owned()))
    }
}

/// Builder for intent records.
pub struct IntentBuilder {
    record: IntentRecord,
}

impl IntentBuilder {
    pub fn new(id: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            record: IntentRecord {
                id: id.into(),
                created_at: created_at.into(),
                ..IntentRecord::default()
            },
        }
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.record.author = author.into();
        self
    }

    pub fn source_type(mut self, source_type: impl Into<String>) -> Self {
        self.record.source_type = source_type.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.record.title = Some(title.into());
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.record.prompt = prompt.into();
        self
    }

    pub fn response(mut self, response: impl Into<String>) -> Self {
        self.record.response = response.into();
        self
    }

    pub fn meta(mut self, raw: impl Into<RawMeta>) -> Self {
        self.record.meta = Some(raw.into());
        self
    }

    /// Link this record to its predecessor.
    pub fn prev_hash(mut self, prev_hash: impl Into<String>) -> Self {
        self.record.prev_hash = Some(prev_hash.into());
        self
    }

    /// Build the record without a hash.
    pub fn build(self) -> IntentRecord {
        self.record
    }

    /// Build, normalize, and hash the record.
    pub fn seal(self) -> Result<IntentRecord, HashError> {
        self.record.seal()
    }
}
