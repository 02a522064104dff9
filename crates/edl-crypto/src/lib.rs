//! Frame authentication for the Engineering Data Link (EDL).
//!
//! Commands sent to the spacecraft carry an HMAC-SHA-256 trailer computed
//! with a secret shared between the ground station and the flight software.
//! This crate owns the secret type and the tag primitives; it knows nothing
//! about frame layout; `edl-proto` decides which bytes get authenticated.
//!
//! # Security
//!
//! The HMAC trailer authenticates frame origin. It is the only mechanism
//! that does: the CRC trailer appended after it detects wire corruption but
//! anyone can recompute it. Tag verification is constant-time.

#![forbid(unsafe_code)]

pub mod error;
pub mod secret;
pub mod tag;

pub use error::{CryptoError, Result};
pub use secret::SharedSecret;
pub use tag::{TAG_LEN, compute_tag, verify_tag};
