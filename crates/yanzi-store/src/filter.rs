//! Exact-match metadata filtering over retrieved records.
//!
//! A [`MetaFilter`] is a set of `key = value` constraints joined with AND.
//! Record metadata is decoded as a flat object; only string-valued entries
//! can satisfy a constraint, so `{"count": 2}` never matches `count = "2"`.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use yanzi_core::IntentRecord;

use crate::error::FilterError;

/// Conjunctive exact-match constraints on metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaFilter {
    constraints: BTreeMap<String, String>,
}

impl MetaFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint. A later value for the same key replaces the earlier.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.constraints.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.constraints.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Test one record's metadata against every constraint.
    pub fn matches(&self, record: &IntentRecord) -> Result<bool, FilterError> {
        if self.is_empty() {
            return Ok(true);
        }
        let Some(raw) = record.meta() else {
            return Ok(false);
        };

        let malformed = |reason: String| FilterError::MalformedMeta {
            id: record.id.clone(),
            reason,
        };
        let object = match serde_json::from_str::<Value>(raw.as_str()) {
            Ok(Value::Object(object)) => object,
            // A null object has no keys to match.
            Ok(Value::Null) => return Ok(false),
            Ok(other) => {
                return Err(malformed(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
            Err(e) => return Err(malformed(e.to_string())),
        };

        Ok(self.matches_object(&object))
    }

    fn matches_object(&self, object: &Map<String, Value>) -> bool {
        self.constraints.iter().all(|(key, want)| {
            matches!(object.get(key), Some(Value::String(have)) if have == want)
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MetaFilter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = MetaFilter::new();
        for (key, value) in iter {
            filter.insert(key, value);
        }
        filter
    }
}

impl From<BTreeMap<String, String>> for MetaFilter {
    fn from(constraints: BTreeMap<String, String>) -> Self {
        Self { constraints }
    }
}

/// Keep the records whose metadata satisfies `filter`, in their original
/// order.
///
/// An empty filter returns `records` untouched without decoding anything.
/// Any record whose metadata cannot be decoded as an object fails the whole
/// call.
pub fn filter_by_meta(
    records: Vec<IntentRecord>,
    filter: &MetaFilter,
) -> Result<Vec<IntentRecord>, FilterError> {
    if filter.is_empty() {
        return Ok(records);
    }

    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if filter.matches(&record)? {
            kept.push(record);
        }
    }
    Ok(kept)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
