//! Wire format for EDL (Engineering Data Link) transfer frames.
//!
//! An uplink frame is the command bytes with three things stamped on:
//!
//! ```text
//! ┌────────────────────────────────────┬──────────────┬─────────┐
//! │ header + payload                   │ HMAC-SHA-256 │ CRC-16  │
//! │ (frame_length @4, sequence @7)     │ 32 bytes     │ 2 bytes │
//! └────────────────────────────────────┴──────────────┴─────────┘
//! ```
//!
//! The frame-length field already accounts for both trailers when it is
//! written. The HMAC covers everything before it; the CRC covers everything
//! before it, HMAC included.
//!
//! Decoding is deliberately asymmetric. [`decode`] reads the sequence number
//! and checks the CRC but never the HMAC: the side receiving frames back
//! only needs wire integrity. A receiver that holds the secret and must
//! authenticate incoming frames calls [`TransferFrame::verify_hmac`]
//! explicitly.
//!
//! Nothing in this crate performs I/O or keeps state between calls.

#![forbid(unsafe_code)]

pub mod crc;
pub mod errors;
pub mod frame;
pub mod layout;

pub use errors::{ProtocolError, Result};
pub use frame::{DecodedFrame, TransferFrame, decode, encode, sequence_number_at};
pub use layout::{FrameLayout, LengthWidth};
