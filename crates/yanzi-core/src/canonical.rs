//! Canonical JSON encoding for intent metadata.
//!
//! Metadata arrives as arbitrary JSON object text. Before it can take part in
//! a hash preimage it is decoded into a [`MetaValue`] tree and re-emitted with
//! deterministic rules:
//! - Object keys sorted by byte comparison, recursively
//! - No insignificant whitespace
//! - Numbers in the single spelling defined by [`CanonicalNumber`]
//! - Strings escaped exactly as the reference encoder escapes them
//! - Array order preserved
//!
//! Two payloads that differ only in key order, whitespace, or number spelling
//! produce identical bytes. This encoding is part of every stored hash;
//! changing it invalidates existing chains.

use std::fmt::Write as _;

use serde_json::{Deserializer, Value};

use crate::error::CanonicalError;
use crate::number::CanonicalNumber;

/// A decoded metadata value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Number(CanonicalNumber),
    String(String),
    Array(Vec<MetaValue>),
    /// Entries in decode order. Sorting happens at emission.
    Object(Vec<(String, MetaValue)>),
}

impl MetaValue {
    /// Name of the JSON type, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            MetaValue::Null => "null",
            MetaValue::Bool(_) => "boolean",
            MetaValue::Number(_) => "number",
            MetaValue::String(_) => "string",
            MetaValue::Array(_) => "array",
            MetaValue::Object(_) => "object",
        }
    }

    /// Canonical text of this value.
    pub fn to_canonical_string(&self) -> String {
        let mut out = String::new();
        emit_value(self, &mut out);
        out
    }
}

impl TryFrom<Value> for MetaValue {
    type Error = CanonicalError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => MetaValue::Null,
            Value::Bool(b) => MetaValue::Bool(b),
            // With arbitrary_precision the number keeps its source literal.
            Value::Number(n) => MetaValue::Number(CanonicalNumber::parse(&n.to_string())?),
            Value::String(s) => MetaValue::String(s),
            Value::Array(items) => MetaValue::Array(
                items
                    .into_iter()
                    .map(MetaValue::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => MetaValue::Object(
                map.into_iter()
                    .map(|(k, v)| Ok((k, MetaValue::try_from(v)?)))
                    .collect::<Result<_, CanonicalError>>()?,
            ),
        })
    }
}

/// Decode raw bytes holding exactly one JSON value.
///
/// Trailing whitespace is allowed; anything else after a complete value is
/// `TrailingData`. A scalar run straight into other characters (`42x`) never
/// completes, so the parser reports it as `MalformedInput` instead.
pub fn decode_meta(raw: &[u8]) -> Result<MetaValue, CanonicalError> {
    let mut stream = Deserializer::from_slice(raw).into_iter::<Value>();
    let value = match stream.next() {
        Some(Ok(value)) => value,
        Some(Err(e)) => return Err(CanonicalError::MalformedInput(e.to_string())),
        None => return Err(CanonicalError::MalformedInput("empty input".into())),
    };

    let offset = stream.byte_offset();
    if raw[offset..].iter().any(|b| !is_json_whitespace(*b)) {
        return Err(CanonicalError::TrailingData { offset });
    }

    MetaValue::try_from(value)
}

/// Canonicalize raw metadata text.
///
/// The input must hold a single JSON object. Empty input means "no metadata"
/// and canonicalizes to an empty string.
pub fn canonicalize_meta(raw: impl AsRef<[u8]>) -> Result<String, CanonicalError> {
    let raw = raw.as_ref();
    if raw.is_empty() {
        return Ok(String::new());
    }

    let value = decode_meta(raw)?;
    if !matches!(value, MetaValue::Object(_)) {
        return Err(CanonicalError::InvalidShape(value.kind()));
    }
    Ok(value.to_canonical_string())
}

fn is_json_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn emit_value(value: &MetaValue, out: &mut String) {
    match value {
        MetaValue::Null => out.push_str("null"),
        MetaValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        MetaValue::Number(n) => n.write_canonical(out),
        MetaValue::String(s) => write_json_string(s, out),
        MetaValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                emit_value(item, out);
            }
            out.push(']');
        }
        MetaValue::Object(entries) => emit_object(entries, out),
    }
}

fn emit_object(entries: &[(String, MetaValue)], out: &mut String) {
    let mut sorted: Vec<&(String, MetaValue)> = entries.iter().collect();
    sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    out.push('{');
    for (i, (key, value)) in sorted.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_json_string(key, out);
        out.push(':');
        emit_value(value, out);
    }
    out.push('}');
}

/// Write `s` as a quoted JSON string.
///
/// Escapes `"` and `\`, uses short escapes for `\b \f \n \r \t`, `\u00XX`
/// for the remaining C0 controls, and escapes `<`, `>`, `&`, U+2028 and
/// U+2029 as `\uXXXX`. Everything else is emitted as UTF-8.
pub fn write_json_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' | '>' | '&' | '\u{2028}' | '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c if c < '\u{0020}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
