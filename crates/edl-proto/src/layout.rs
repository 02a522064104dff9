//! Field placement for transfer frames.
//!
//! A single frame type is parameterized by a [`FrameLayout`] value instead of
//! one type per frame kind. [`FrameLayout::EDL`] is the uplink command frame:
//! a USLP primary header whose 16-bit frame-length field sits at offset 4 and
//! whose virtual-channel frame count (our sequence number) starts at offset 7.

use std::ops::Range;

use edl_crypto::TAG_LEN;

use crate::{
    crc::CRC_LEN,
    errors::{ProtocolError, Result},
};

/// Width of the frame-length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthWidth {
    /// 16-bit big-endian
    Two,
    /// 32-bit big-endian
    Four,
}

impl LengthWidth {
    /// Number of bytes the field occupies.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Four => 4,
        }
    }

    /// Largest value the field can hold.
    #[must_use]
    pub const fn max_value(self) -> u64 {
        match self {
            Self::Two => u16::MAX as u64,
            Self::Four => u32::MAX as u64,
        }
    }

    /// Write `value` big-endian into `dst`, which must be exactly
    /// [`Self::bytes`] long. Callers check `value <= max_value()` first.
    pub(crate) fn write(self, dst: &mut [u8], value: u64) {
        match self {
            Self::Two => dst.copy_from_slice(&(value as u16).to_be_bytes()),
            Self::Four => dst.copy_from_slice(&(value as u32).to_be_bytes()),
        }
    }

    /// Read a big-endian value from `src`, which must be exactly
    /// [`Self::bytes`] long.
    pub(crate) fn read(self, src: &[u8]) -> u64 {
        match self {
            Self::Two => {
                let mut bytes = [0u8; 2];
                bytes.copy_from_slice(src);
                u64::from(u16::from_be_bytes(bytes))
            },
            Self::Four => {
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(src);
                u64::from(u32::from_be_bytes(bytes))
            },
        }
    }
}

/// Offsets and widths of the fixed header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameLayout {
    /// Offset of the 4-byte big-endian sequence number
    pub sequence_offset: usize,
    /// Offset of the frame-length field
    pub length_offset: usize,
    /// Width of the frame-length field
    pub length_width: LengthWidth,
}

impl FrameLayout {
    /// Uplink command frame layout.
    pub const EDL: Self = Self {
        sequence_offset: Self::SEQUENCE_OFFSET,
        length_offset: 4,
        length_width: LengthWidth::Two,
    };

    /// Offset of the sequence number in EDL frames.
    pub const SEQUENCE_OFFSET: usize = 7;

    /// Width of the sequence-number field (big-endian `u32`).
    pub const SEQUENCE_WIDTH: usize = 4;

    /// Bytes appended after the payload: HMAC tag then CRC.
    pub const TRAILER_LEN: usize = TAG_LEN + CRC_LEN;

    /// Same layout with the sequence number moved to `offset`.
    #[must_use]
    pub const fn with_sequence_offset(mut self, offset: usize) -> Self {
        self.sequence_offset = offset;
        self
    }

    /// Byte range of the sequence-number field.
    ///
    /// Saturates at `usize::MAX`; no buffer is ever that long, so an offset
    /// near the top of the address space just makes every frame too short.
    #[must_use]
    pub const fn sequence_range(&self) -> Range<usize> {
        self.sequence_offset..self.sequence_offset.saturating_add(Self::SEQUENCE_WIDTH)
    }

    /// Byte range of the frame-length field. Saturates like
    /// [`Self::sequence_range`].
    #[must_use]
    pub const fn length_range(&self) -> Range<usize> {
        self.length_offset..self.length_offset.saturating_add(self.length_width.bytes())
    }

    /// Bytes that must precede the trailers for both header fields to fit.
    ///
    /// Shorter payloads are zero-extended to this length on encode.
    #[must_use]
    pub const fn header_len(&self) -> usize {
        let sequence_end = self.sequence_range().end;
        let length_end = self.length_range().end;
        if sequence_end > length_end { sequence_end } else { length_end }
    }

    /// Largest total frame size the frame-length field can describe.
    #[must_use]
    pub fn max_frame_len(&self) -> usize {
        usize::try_from(self.length_width.max_value() + 1).unwrap_or(usize::MAX)
    }

    /// Total size of the frame `encode` builds around a payload of
    /// `payload_len` bytes.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::InvalidLayout`] if the header fields overlap
    /// - [`ProtocolError::PayloadTooLarge`] if the frame-length field cannot
    ///   describe the result
    pub fn encoded_len(&self, payload_len: usize) -> Result<usize> {
        self.validate()?;

        let size = payload_len.max(self.header_len()).saturating_add(Self::TRAILER_LEN);
        let max = self.max_frame_len();
        if size > max {
            return Err(ProtocolError::PayloadTooLarge { size, max });
        }

        Ok(size)
    }

    /// Reject layouts whose header fields overlap.
    ///
    /// Encoding with an overlapping layout would let the frame-length write
    /// clobber part of the sequence number.
    pub fn validate(&self) -> Result<()> {
        let sequence = self.sequence_range();
        let length = self.length_range();

        if sequence.start < length.end && length.start < sequence.end {
            return Err(ProtocolError::InvalidLayout { sequence, length });
        }

        Ok(())
    }
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self::EDL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edl_layout_geometry() {
        let layout = FrameLayout::EDL;
        assert_eq!(layout.sequence_range(), 7..11);
        assert_eq!(layout.length_range(), 4..6);
        assert_eq!(layout.header_len(), 11);
        assert_eq!(layout.max_frame_len(), 65_536);
        assert_eq!(FrameLayout::TRAILER_LEN, 34);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn overlapping_fields_rejected() {
        let layout = FrameLayout { length_width: LengthWidth::Four, ..FrameLayout::EDL };
        assert_eq!(
            layout.validate(),
            Err(ProtocolError::InvalidLayout { sequence: 7..11, length: 4..8 })
        );
    }

    #[test]
    fn sequence_before_length() {
        let layout = FrameLayout {
            sequence_offset: 0,
            length_offset: 4,
            length_width: LengthWidth::Four,
        };
        assert!(layout.validate().is_ok());
        assert_eq!(layout.header_len(), 8);
    }

    #[test]
    fn encoded_len_counts_trailers() {
        let layout = FrameLayout::EDL;
        assert_eq!(layout.encoded_len(0), Ok(45));
        assert_eq!(layout.encoded_len(100), Ok(134));
        assert_eq!(
            layout.encoded_len(65_503),
            Err(ProtocolError::PayloadTooLarge { size: 65_537, max: 65_536 })
        );
    }

    #[test]
    fn offsets_near_usize_max_saturate() {
        let layout = FrameLayout::EDL.with_sequence_offset(usize::MAX - 1);
        assert_eq!(layout.sequence_range(), usize::MAX - 1..usize::MAX);
        assert_eq!(layout.header_len(), usize::MAX);
        assert!(matches!(layout.encoded_len(3), Err(ProtocolError::PayloadTooLarge { .. })));

        let layout = FrameLayout { length_offset: usize::MAX, ..FrameLayout::EDL };
        assert_eq!(layout.length_range(), usize::MAX..usize::MAX);
        assert!(layout.validate().is_ok());
        assert!(layout.encoded_len(0).is_err());

        let layout = FrameLayout {
            sequence_offset: usize::MAX - 2,
            length_offset: usize::MAX - 1,
            length_width: LengthWidth::Two,
        };
        assert!(matches!(layout.validate(), Err(ProtocolError::InvalidLayout { .. })));
    }

    #[test]
    #[should_panic(expected = "source slice length")]
    fn length_read_enforces_width() {
        let _ = LengthWidth::Two.read(&[0, 0, 0, 44]);
    }

    #[test]
    fn length_width_round_trip() {
        let mut buf = [0u8; 4];
        LengthWidth::Four.write(&mut buf, 0x0102_0304);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(LengthWidth::Four.read(&buf), 0x0102_0304);

        let mut buf = [0u8; 2];
        LengthWidth::Two.write(&mut buf, 44);
        assert_eq!(buf, [0x00, 0x2c]);
        assert_eq!(LengthWidth::Two.read(&buf), 44);
    }
}
