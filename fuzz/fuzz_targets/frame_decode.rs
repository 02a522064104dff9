//! Random-input fuzzer for received frames
//!
//! Arbitrary bytes must never panic the receive path: they either parse into
//! a frame view (whose accessors stay in bounds) or fail with
//! `FrameTooShort`.

#![no_main]

use edl_proto::{FrameLayout, ProtocolError, TransferFrame, decode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the sequence offset so non-default layouts are covered
    let (offset, raw) = match data.split_first() {
        Some((first, rest)) => (usize::from(*first % 32), rest),
        None => (FrameLayout::SEQUENCE_OFFSET, data),
    };

    match decode(raw, offset) {
        Ok(decoded) => {
            let layout = FrameLayout::EDL.with_sequence_offset(offset);
            let frame = TransferFrame::parse(raw, layout).expect("decode accepted it");
            assert_eq!(frame.sequence_number(), decoded.sequence_number);
            assert_eq!(frame.crc_valid(), decoded.crc_valid);
            let _ = frame.frame_length();
            let _ = frame.length_consistent();
            let _ = frame.hmac_trailer();
        },
        Err(ProtocolError::FrameTooShort { expected, actual }) => {
            assert_eq!(actual, raw.len());
            assert!(expected > actual);
        },
        Err(e) => panic!("unexpected decode error: {e}"),
    }
});
