//! Error types for secret handling and tag verification.

use thiserror::Error;

/// Errors produced while constructing secrets or checking tags.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A shared secret must contain at least one byte
    #[error("shared secret is empty")]
    EmptySecret,

    /// The MAC implementation rejected the key
    #[error("invalid HMAC key: {0}")]
    InvalidKey(String),

    /// Tag has the wrong number of bytes
    #[error("tag length mismatch: expected {expected} bytes, got {actual}")]
    TagLength {
        /// Required tag length
        expected: usize,
        /// Length of the supplied tag
        actual: usize,
    },

    /// Tag does not authenticate the data under this secret
    #[error("HMAC tag mismatch")]
    TagMismatch,
}

/// Convenient Result type alias for crypto operations
pub type Result<T> = std::result::Result<T, CryptoError>;
