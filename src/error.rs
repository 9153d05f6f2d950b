//! # Serialization Errors
//!
//! Errors returned when a JWE message cannot be serialized. Every error
//! is returned to the caller; nothing is retried or silently recovered,
//! and no partial output accompanies an error.

use thiserror::Error;

/// Errors arising while serializing a JWE message.
#[derive(Error, Debug)]
pub enum Error {
    /// The protected header is missing or structurally empty.
    #[error("invalid protected header")]
    InvalidHeader,

    /// Compact serialization was attempted on a message whose recipient
    /// count is not exactly one.
    #[error("wrong number of recipients for compact serialization: {0}")]
    UnsupportedRecipientCount(usize),

    /// A compact segment could not be encoded.
    #[error("issue encoding {field}: {source}")]
    EncodingFailure {
        /// The segment that failed to encode.
        field: &'static str,
        /// The underlying cause.
        source: serde_json::Error,
    },

    /// The structural JSON form could not be produced.
    #[error("issue serializing message: {0}")]
    MarshalFailure(#[source] serde_json::Error),
}
