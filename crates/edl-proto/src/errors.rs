//! Error types for EDL frame encoding and decoding.
//!
//! CRC mismatches are not errors: they are reported as data
//! ([`crate::DecodedFrame::crc_valid`]) so the host pipeline decides what
//! to do with a corrupted frame.

use edl_crypto::CryptoError;
use thiserror::Error;

/// Protocol-level errors that can occur while building or parsing frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer is too short to hold the fields being read
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Minimum size in bytes
        expected: usize,
        /// Actual size received
        actual: usize,
    },

    /// Frame would not fit in the frame-length field
    #[error("frame too large: {size} bytes exceeds maximum {max}")]
    PayloadTooLarge {
        /// Total frame size including trailers
        size: usize,
        /// Largest frame the length field can describe
        max: usize,
    },

    /// Sequence-number and frame-length fields overlap
    #[error("invalid frame layout: sequence field {sequence:?} overlaps length field {length:?}")]
    InvalidLayout {
        /// Byte range of the sequence-number field
        sequence: std::ops::Range<usize>,
        /// Byte range of the frame-length field
        length: std::ops::Range<usize>,
    },

    /// Authentication failure or unusable secret
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Convenient Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
