//! Error types for the intent chain.

use thiserror::Error;
use yanzi_core::{CanonicalError, HashError, ValidationError};
use yanzi_store::{FilterError, StoreError};

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The record could not be hashed.
    #[error("hash error: {0}")]
    Hash(#[from] HashError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Metadata filter error.
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    /// A stored hash does not match the record's content.
    #[error("hash mismatch for intent {id}: stored {stored}, computed {computed}")]
    HashMismatch {
        id: String,
        stored: String,
        computed: String,
    },

    /// A prev_hash points at a record that does not exist.
    #[error("broken link: no intent with hash {hash}")]
    BrokenLink { hash: String },

    /// Following prev_hash links revisited a record.
    #[error("cycle detected at hash {hash}")]
    Cycle { hash: String },

    /// The chain is longer than the configured walk depth.
    #[error("chain exceeds maximum walk depth {max}")]
    DepthExceeded { max: usize },
}

impl From<ValidationError> for ChainError {
    fn from(e: ValidationError) -> Self {
        ChainError::Hash(HashError::Validation(e))
    }
}

impl From<CanonicalError> for ChainError {
    fn from(e: CanonicalError) -> Self {
        ChainError::Hash(HashError::Canonical(e))
    }
}

/// Result type for chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;
