//! Encode and decode authenticated transfer frames.
//!
//! Encoding builds the complete frame in one buffer:
//!
//! 1. copy the payload (zero-extended to the header length)
//! 2. write the sequence number at its fixed offset
//! 3. write `frame_length = total_octets - 1`, counting trailers not yet
//!    appended
//! 4. append `HMAC-SHA-256(secret, bytes so far)`
//! 5. append `CRC-16(bytes so far)`, which therefore covers the HMAC
//!
//! Decoding never copies: [`TransferFrame`] borrows the received bytes and
//! reads fields in place.

use bytes::{BufMut, Bytes, BytesMut};
use edl_crypto::{SharedSecret, TAG_LEN, compute_tag, verify_tag};

use crate::{
    crc::{CRC_LEN, checksum},
    errors::{ProtocolError, Result},
    layout::FrameLayout,
};

/// Build an authenticated frame around `payload`.
///
/// The payload is expected to carry reserved space for the header fields; any
/// bytes already at the sequence-number and frame-length positions are
/// overwritten.
///
/// # Errors
///
/// - [`ProtocolError::InvalidLayout`] if the header fields overlap
/// - [`ProtocolError::PayloadTooLarge`] if the finished frame cannot be
///   described by the frame-length field
/// - [`ProtocolError::Crypto`] if the MAC rejects the key
pub fn encode(
    layout: &FrameLayout,
    payload: &[u8],
    sequence_number: u32,
    secret: &SharedSecret,
) -> Result<Bytes> {
    let total_len = layout.encoded_len(payload.len())?;
    let body_len = total_len - FrameLayout::TRAILER_LEN;
    let frame_length = (total_len - 1) as u64;

    let mut buf = BytesMut::with_capacity(total_len);
    buf.put_slice(payload);
    buf.resize(body_len, 0);

    buf[layout.sequence_range()].copy_from_slice(&sequence_number.to_be_bytes());
    layout.length_width.write(&mut buf[layout.length_range()], frame_length);

    let tag = compute_tag(secret, &buf)?;
    buf.put_slice(&tag);

    let crc = checksum(&buf);
    buf.put_u16(crc);

    debug_assert_eq!(buf.len(), total_len);
    debug_assert_eq!(buf.len() - 1, frame_length as usize);

    Ok(buf.freeze())
}

/// Read the big-endian sequence number at `offset` without parsing a frame.
///
/// Useful for routing decisions that only need the sequence number.
pub fn sequence_number_at(buffer: &[u8], offset: usize) -> Result<u32> {
    let end = offset.saturating_add(FrameLayout::SEQUENCE_WIDTH);
    let field = buffer
        .get(offset..end)
        .ok_or(ProtocolError::FrameTooShort { expected: end, actual: buffer.len() })?;

    let mut bytes = [0u8; FrameLayout::SEQUENCE_WIDTH];
    bytes.copy_from_slice(field);
    Ok(u32::from_be_bytes(bytes))
}

/// Result of decoding a received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Sequence number read from the header
    pub sequence_number: u32,
    /// Whether the CRC trailer matches the preceding bytes
    pub crc_valid: bool,
}

/// Decode a received EDL frame with the sequence number at `sequence_offset`.
///
/// Checks the CRC only. The HMAC trailer is not verified here; see
/// [`TransferFrame::verify_hmac`].
///
/// # Errors
///
/// [`ProtocolError::FrameTooShort`] if the buffer cannot hold the header
/// fields plus the CRC trailer. A CRC mismatch is not an error.
pub fn decode(raw: &[u8], sequence_offset: usize) -> Result<DecodedFrame> {
    let layout = FrameLayout::EDL.with_sequence_offset(sequence_offset);
    let frame = TransferFrame::parse(raw, layout)?;

    Ok(DecodedFrame { sequence_number: frame.sequence_number(), crc_valid: frame.crc_valid() })
}

/// Borrowed view over a received frame.
///
/// # Invariants
///
/// - The buffer holds at least `layout.header_len() + CRC_LEN` bytes, so
///   both header fields and the CRC trailer are always in bounds.
/// - Nothing is validated beyond length: the CRC and HMAC are checked only
///   when asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferFrame<'a> {
    bytes: &'a [u8],
    layout: FrameLayout,
}

impl<'a> TransferFrame<'a> {
    /// Wrap `bytes` as a frame with the given layout.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::FrameTooShort`] if the buffer cannot hold the header
    /// fields and the CRC trailer.
    pub fn parse(bytes: &'a [u8], layout: FrameLayout) -> Result<Self> {
        let expected = layout.header_len().saturating_add(CRC_LEN);
        if bytes.len() < expected {
            return Err(ProtocolError::FrameTooShort { expected, actual: bytes.len() });
        }

        Ok(Self { bytes, layout })
    }

    /// The whole frame, trailers included.
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Layout this view reads fields with.
    #[must_use]
    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// Sequence number from the header.
    #[must_use]
    pub fn sequence_number(&self) -> u32 {
        let mut bytes = [0u8; FrameLayout::SEQUENCE_WIDTH];
        bytes.copy_from_slice(&self.bytes[self.layout.sequence_range()]);
        u32::from_be_bytes(bytes)
    }

    /// Value of the frame-length field (total octets minus one on a
    /// well-formed frame).
    #[must_use]
    pub fn frame_length(&self) -> u64 {
        self.layout.length_width.read(&self.bytes[self.layout.length_range()])
    }

    /// Whether the frame-length field agrees with the buffer length.
    #[must_use]
    pub fn length_consistent(&self) -> bool {
        self.frame_length() == (self.bytes.len() - 1) as u64
    }

    /// CRC trailer as transmitted.
    #[must_use]
    pub fn crc(&self) -> u16 {
        let len = self.bytes.len();
        u16::from_be_bytes([self.bytes[len - 2], self.bytes[len - 1]])
    }

    /// Whether the CRC trailer matches every byte before it.
    #[must_use]
    pub fn crc_valid(&self) -> bool {
        checksum(&self.bytes[..self.bytes.len() - CRC_LEN]) == self.crc()
    }

    /// HMAC trailer, if the frame is long enough to carry one after the
    /// header.
    #[must_use]
    pub fn hmac_trailer(&self) -> Option<&'a [u8; TAG_LEN]> {
        let bytes: &'a [u8] = self.bytes;
        let len = bytes.len();
        if len < self.layout.header_len().saturating_add(FrameLayout::TRAILER_LEN) {
            return None;
        }

        bytes[len - FrameLayout::TRAILER_LEN..len - CRC_LEN].try_into().ok()
    }

    /// Verify the HMAC trailer against `secret`.
    ///
    /// Only meaningful for a receiver holding the shared secret. Does not
    /// check the CRC.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::FrameTooShort`] if there is no room for an HMAC
    ///   trailer
    /// - [`ProtocolError::Crypto`] wrapping `TagMismatch` if the tag does not
    ///   authenticate the frame
    pub fn verify_hmac(&self, secret: &SharedSecret) -> Result<()> {
        let tag = self.hmac_trailer().ok_or(ProtocolError::FrameTooShort {
            expected: self.layout.header_len().saturating_add(FrameLayout::TRAILER_LEN),
            actual: self.bytes.len(),
        })?;

        let authenticated = &self.bytes[..self.bytes.len() - FrameLayout::TRAILER_LEN];
        verify_tag(secret, authenticated, tag)?;

        Ok(())
    }
}
