//! Record validation: structural checks on the stored form.

use crate::error::ValidationError;
use crate::record::IntentRecord;
use crate::timestamp::parse_timestamp;

/// Validate a record as it would be persisted.
///
/// This performs:
/// - Identity check (`id` present and not blank)
/// - Timestamp check (`created_at` present and RFC 3339)
/// - Content checks (`author`, `source_type`, `prompt`, `response`)
/// - Hash presence
///
/// The hash is not recomputed here; use [`IntentRecord::verify_hash`].
pub fn validate_record(record: &IntentRecord) -> Result<(), ValidationError> {
    validate_for_hashing(record)?;

    if record.hash.is_empty() {
        return Err(ValidationError::MissingField("hash"));
    }

    Ok(())
}

/// Validate the fields a hash is computed from, ignoring `hash` itself.
pub fn validate_for_hashing(record: &IntentRecord) -> Result<(), ValidationError> {
    // Identity
    if record.id.is_empty() {
        return Err(ValidationError::MissingField("id"));
    }
    if record.id.trim().is_empty() {
        return Err(ValidationError::BlankField("id"));
    }

    // Timestamp
    if record.created_at.is_empty() {
        return Err(ValidationError::MissingField("created_at"));
    }
    parse_timestamp(&record.created_at)?;

    // Content
    for (field, value) in [
        ("author", &record.author),
        ("source_type", &record.source_type),
        ("prompt", &record.prompt),
        ("response", &record.response),
    ] {
        if value.is_empty() {
            return Err(ValidationError::MissingField(field));
        }
    }

    Ok(())
}
