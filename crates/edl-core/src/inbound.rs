//! Host-pipeline adapter for received frames.
//!
//! The host hands every received packet to [`InboundAdapter::process`],
//! which decodes it (CRC only, the HMAC trailer is not checked) and writes
//! the outcome back onto the packet before it continues down the pipeline.
//! Packets are never dropped here; a bad frame is forwarded marked invalid.

use std::time::SystemTime;

use bytes::Bytes;
use edl_proto::FrameLayout;
use tracing::{debug, warn};

use crate::env::Environment;

/// Packet wrapper owned by the host pipeline.
///
/// The adapter reads the raw bytes and writes the decoded metadata through
/// the setters.
pub trait HostPacket {
    /// Received bytes, frame header first.
    fn raw_bytes(&self) -> &[u8];

    /// Mark the packet as failing (or passing) the integrity check.
    fn set_invalid(&mut self, invalid: bool);

    /// Record the frame's sequence number.
    fn set_sequence_count(&mut self, sequence: u32);

    /// Record when the packet was generated.
    fn set_generation_time(&mut self, time: SystemTime);

    /// Flag the generation time as assigned locally rather than read from
    /// the packet. Hosts without such a flag can ignore it.
    fn set_local_generation_time(&mut self) {}
}

/// Plain owned [`HostPacket`] for hosts without their own wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundPacket {
    raw: Bytes,
    invalid: bool,
    sequence_count: Option<u32>,
    generation_time: Option<SystemTime>,
    local_generation_time: bool,
}

impl InboundPacket {
    /// Wrap received bytes. Nothing is decoded yet.
    pub fn new(raw: impl Into<Bytes>) -> Self {
        Self {
            raw: raw.into(),
            invalid: false,
            sequence_count: None,
            generation_time: None,
            local_generation_time: false,
        }
    }

    /// Received bytes.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Whether the packet failed the integrity check.
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    /// Decoded sequence number, if the frame was long enough to hold one.
    pub fn sequence_count(&self) -> Option<u32> {
        self.sequence_count
    }

    /// Time stamped by the adapter.
    pub fn generation_time(&self) -> Option<SystemTime> {
        self.generation_time
    }

    /// Whether the generation time was assigned locally.
    pub fn is_local_generation_time(&self) -> bool {
        self.local_generation_time
    }
}

impl HostPacket for InboundPacket {
    fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    fn set_invalid(&mut self, invalid: bool) {
        self.invalid = invalid;
    }

    fn set_sequence_count(&mut self, sequence: u32) {
        self.sequence_count = Some(sequence);
    }

    fn set_generation_time(&mut self, time: SystemTime) {
        self.generation_time = Some(time);
    }

    fn set_local_generation_time(&mut self) {
        self.local_generation_time = true;
    }
}

/// Stamps validity, sequence count and receipt time onto host packets.
#[derive(Debug, Clone)]
pub struct InboundAdapter<E: Environment> {
    env: E,
    sequence_offset: usize,
}

impl<E: Environment> InboundAdapter<E> {
    /// Adapter for EDL frames (sequence number at offset 7).
    pub fn new(env: E) -> Self {
        Self { env, sequence_offset: FrameLayout::SEQUENCE_OFFSET }
    }

    /// Read the sequence number from a different offset.
    #[must_use]
    pub fn with_sequence_offset(mut self, offset: usize) -> Self {
        self.sequence_offset = offset;
        self
    }

    /// Decode `packet` and write the result back onto it.
    ///
    /// - invalid = CRC mismatch, or too short to decode at all
    /// - sequence count = header sequence number (left untouched when the
    ///   frame is too short)
    /// - generation time = now, flagged as locally assigned
    pub fn process<P: HostPacket>(&self, mut packet: P) -> P {
        match edl_proto::decode(packet.raw_bytes(), self.sequence_offset) {
            Ok(frame) => {
                if !frame.crc_valid {
                    debug!(sequence = frame.sequence_number, "CRC mismatch on received frame");
                }
                packet.set_invalid(!frame.crc_valid);
                packet.set_sequence_count(frame.sequence_number);
            },
            Err(e) => {
                warn!(len = packet.raw_bytes().len(), error = %e, "Received frame cannot be decoded");
                packet.set_invalid(true);
            },
        }

        packet.set_generation_time(self.env.now());
        packet.set_local_generation_time();
        packet
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[derive(Clone)]
    struct FixedEnv(SystemTime);

    impl Environment for FixedEnv {
        fn now(&self) -> SystemTime {
            self.0
        }
    }

    fn fixed() -> FixedEnv {
        FixedEnv(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000))
    }

    fn frame_with_crc(header: [u8; 11]) -> Vec<u8> {
        let mut raw = header.to_vec();
        raw.extend_from_slice(&edl_proto::crc::checksum(&header).to_be_bytes());
        raw
    }

    #[test]
    fn crc_valid_frame() {
        let raw = frame_with_crc([0x20, 0x01, 0x00, 0x10, 0x00, 0x0C, 0x08, 0x00, 0x00, 0x00, 0x2A]);

        let packet = InboundAdapter::new(fixed()).process(InboundPacket::new(raw));

        assert!(!packet.is_invalid());
        assert_eq!(packet.sequence_count(), Some(42));
        assert_eq!(packet.generation_time(), Some(fixed().0));
        assert!(packet.is_local_generation_time());
    }

    #[test]
    fn crc_mismatch_is_marked_invalid() {
        let mut raw = frame_with_crc([0; 11]);
        raw[12] ^= 0x01;

        let packet = InboundAdapter::new(fixed()).process(InboundPacket::new(raw));

        assert!(packet.is_invalid());
        assert_eq!(packet.sequence_count(), Some(0));
    }

    #[test]
    fn short_buffer_is_invalid_without_sequence() {
        let packet = InboundAdapter::new(fixed()).process(InboundPacket::new(vec![0u8; 5]));

        assert!(packet.is_invalid());
        assert_eq!(packet.sequence_count(), None);
        assert_eq!(packet.generation_time(), Some(fixed().0));
    }

    #[test]
    fn offset_past_any_buffer_marks_invalid() {
        let raw = frame_with_crc([0; 11]);
        let adapter = InboundAdapter::new(fixed()).with_sequence_offset(usize::MAX - 1);
        let packet = adapter.process(InboundPacket::new(raw));

        assert!(packet.is_invalid());
        assert_eq!(packet.sequence_count(), None);
    }

    #[test]
    fn custom_sequence_offset() {
        let mut raw = vec![0xAA, 0xBB, 0xCC, 0xDD, 0x00, 0x00];
        raw.extend_from_slice(&edl_proto::crc::checksum(&raw).to_be_bytes());

        let adapter = InboundAdapter::new(fixed()).with_sequence_offset(0);
        let packet = adapter.process(InboundPacket::new(raw));

        assert!(!packet.is_invalid());
        assert_eq!(packet.sequence_count(), Some(0xAABB_CCDD));
    }
}
