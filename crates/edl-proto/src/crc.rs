//! Frame check sequence.
//!
//! CRC-16/CCITT-FALSE (poly `0x1021`, init `0xFFFF`, no reflection), the
//! checksum CCSDS transfer frames use. Appended big-endian as the last two
//! bytes of every frame.

use crc::{CRC_16_IBM_3740, Crc};

/// Length of the CRC trailer in bytes.
pub const CRC_LEN: usize = 2;

const FRAME_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Compute the frame CRC over `data`.
pub fn checksum(data: &[u8]) -> u16 {
    FRAME_CRC.checksum(data)
}
