//! Encode/decode fuzzer
//!
//! Every encodable payload must come back with the same sequence number, a
//! valid CRC, a consistent frame length and an HMAC that verifies.

#![no_main]

use edl_crypto::SharedSecret;
use edl_proto::{FrameLayout, TransferFrame, encode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 5 {
        return;
    }

    let sequence = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let key_len = usize::from(data[4] % 16) + 1;
    let rest = &data[5..];
    if rest.len() < key_len {
        return;
    }
    let (key, payload) = rest.split_at(key_len);

    let secret = SharedSecret::new(key.to_vec()).expect("key is non-empty");
    let frame = encode(&FrameLayout::EDL, payload, sequence, &secret).expect("payload fits");

    let view = TransferFrame::parse(&frame, FrameLayout::EDL).expect("encoded frame parses");
    assert_eq!(view.sequence_number(), sequence);
    assert!(view.crc_valid());
    assert!(view.length_consistent());
    assert!(view.verify_hmac(&secret).is_ok());
});
