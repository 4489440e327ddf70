//! RFC 3339 timestamp normalization for hash preimages.
//!
//! Equivalent instants written with different offsets or fractional
//! precision collapse to one UTC form: `YYYY-MM-DDTHH:MM:SS[.f]Z`, where the
//! fraction carries up to nine digits with trailing zeros trimmed and is
//! omitted entirely for whole seconds.

use chrono::{DateTime, Timelike, Utc};

use crate::error::ValidationError;

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Parse an RFC 3339 timestamp into a UTC instant.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let parsed = DateTime::parse_from_rfc3339(value).map_err(|e| invalid(value, e.to_string()))?;
    let utc = parsed.with_timezone(&Utc);
    // chrono encodes a leap second as nanos >= 1e9; it has no stable form.
    if utc.nanosecond() >= NANOS_PER_SECOND {
        return Err(invalid(value, "leap seconds are not supported".into()));
    }
    Ok(utc)
}

/// Reformat an RFC 3339 timestamp into its canonical UTC form.
pub fn normalize_timestamp(value: &str) -> Result<String, ValidationError> {
    parse_timestamp(value).map(|utc| format_timestamp(&utc))
}

/// Format a UTC instant in canonical form.
pub fn format_timestamp(utc: &DateTime<Utc>) -> String {
    let mut out = utc.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = utc.nanosecond() % NANOS_PER_SECOND;
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out.push('Z');
    out
}

/// Fixed-width UTC key that orders the same way as the instants do.
///
/// Always nine fraction digits, so byte order equals chronological order.
pub fn sort_key(value: &str) -> Result<String, ValidationError> {
    parse_timestamp(value).map(|utc| format_sort_key(&utc))
}

fn format_sort_key(utc: &DateTime<Utc>) -> String {
    utc.format("%Y-%m-%dT%H:%M:%S%.9fZ").to_string()
}

fn invalid(value: &str, reason: String) -> ValidationError {
    ValidationError::InvalidTimestamp {
        value: value.to_owned(),
        reason,
    }
}
