//! Error types for Yanzi Core.

use thiserror::Error;

/// Validation errors for required record fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0} must not be blank")]
    BlankField(&'static str),

    #[error("created_at must be RFC3339: {value:?} ({reason})")]
    InvalidTimestamp { value: String, reason: String },
}

/// Errors produced while canonicalizing metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalError {
    /// The input is not valid JSON.
    #[error("malformed metadata JSON: {0}")]
    MalformedInput(String),

    /// The input is valid JSON but the top-level value is not an object.
    #[error("metadata must be a JSON object, got {0}")]
    InvalidShape(&'static str),

    /// Non-whitespace bytes follow the first JSON value.
    #[error("unexpected trailing data after metadata at byte {offset}")]
    TrailingData { offset: usize },
}

/// Errors produced while hashing an intent record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Canonical(#[from] CanonicalError),
}
