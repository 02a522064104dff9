//! Snapshot tests for wire format stability.
//!
//! These pin the exact bytes of reference frames. If the layout, HMAC input
//! or CRC parameters change, these fail before a ground station and the
//! flight software disagree on the wire.

use edl_crypto::SharedSecret;
use edl_proto::{FrameLayout, TransferFrame, decode, encode};
use insta::assert_snapshot;

fn frame_to_hex(payload: &[u8], sequence: u32, key: &[u8]) -> String {
    let secret = SharedSecret::new(key.to_vec()).expect("non-empty secret");
    let frame = encode(&FrameLayout::EDL, payload, sequence, &secret).expect("encoding should succeed");
    hex::encode(&frame)
}

#[test]
fn snapshot_minimal_command() {
    assert_snapshot!(
        frame_to_hex(b"CMD", 1, b"k"),
        @"434d4400002c00000000019fbf496a2454e72a66c09132cc3f19d25a94a0a799499dcb5cf251e0e6d1287664bf"
    );
}

#[test]
fn snapshot_command_with_uslp_header() {
    // USLP primary header with reserved frame-length and frame-count fields,
    // followed by four bytes of command data.
    let payload = [
        0x20, 0x01, 0x00, 0x10, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0xde, 0xad, 0xbe, 0xef,
    ];

    assert_snapshot!(
        frame_to_hex(&payload, 0x0102_0304, b"topsecret"),
        @"2001001000300801020304deadbeef07fb2b3bf1535a74321f492910bcfa0722d61a540a6d4fb5b34f1d68c112606c759e"
    );
}

#[test]
fn snapshot_fields_decode_back() {
    let raw = hex::decode(
        "434d4400002c00000000019fbf496a2454e72a66c09132cc3f19d25a94a0a799499dcb5cf251e0e6d1287664bf",
    )
    .expect("valid hex");

    let decoded = decode(&raw, FrameLayout::SEQUENCE_OFFSET).expect("should decode");
    assert_eq!(decoded.sequence_number, 1);
    assert!(decoded.crc_valid);

    let view = TransferFrame::parse(&raw, FrameLayout::EDL).expect("should parse");
    assert_eq!(view.frame_length(), 44);
    assert_eq!(view.crc(), 0x64bf);

    let secret = SharedSecret::new(b"k".to_vec()).expect("non-empty secret");
    assert!(view.verify_hmac(&secret).is_ok());
}
