//! HMAC-SHA-256 tags over frame bytes.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{
    SharedSecret,
    error::{CryptoError, Result},
};

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA-256 tag in bytes.
pub const TAG_LEN: usize = 32;

fn keyed(secret: &SharedSecret) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// Compute the HMAC-SHA-256 tag of `data` under `secret`.
pub fn compute_tag(secret: &SharedSecret, data: &[u8]) -> Result<[u8; TAG_LEN]> {
    let mut mac = keyed(secret)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

/// Check that `tag` authenticates `data` under `secret`.
///
/// Comparison is constant-time.
pub fn verify_tag(secret: &SharedSecret, data: &[u8], tag: &[u8]) -> Result<()> {
    if tag.len() != TAG_LEN {
        return Err(CryptoError::TagLength { expected: TAG_LEN, actual: tag.len() });
    }

    let mut mac = keyed(secret)?;
    mac.update(data);
    mac.verify_slice(tag).map_err(|_| CryptoError::TagMismatch)
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use proptest::prelude::*;

    use super::*;

    fn secret(bytes: &[u8]) -> SharedSecret {
        SharedSecret::new(bytes.to_vec()).unwrap()
    }

    #[test]
    fn matches_rfc4231_case_2() {
        let tag = compute_tag(&secret(b"Jefe"), b"what do ya want for nothing?").unwrap();
        assert_eq!(
            tag,
            hex!("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
        );
    }

    #[test]
    fn reject_wrong_tag_length() {
        let result = verify_tag(&secret(b"k"), b"data", &[0u8; 16]);
        assert_eq!(result, Err(CryptoError::TagLength { expected: 32, actual: 16 }));
    }

    proptest! {
        #[test]
        fn tag_verifies_under_same_secret(
            key in prop::collection::vec(any::<u8>(), 1..64),
            data in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            let key = secret(&key);
            let tag = compute_tag(&key, &data).unwrap();
            prop_assert!(verify_tag(&key, &data, &tag).is_ok());
        }

        #[test]
        fn tag_rejected_under_other_secret(
            key in prop::collection::vec(any::<u8>(), 1..64),
            data in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            let original = secret(&key);
            let mut rotated = key.clone();
            rotated.push(0x5a);
            let rotated = secret(&rotated);

            let tag = compute_tag(&original, &data).unwrap();
            prop_assert_ne!(tag, compute_tag(&rotated, &data).unwrap());
            prop_assert_eq!(verify_tag(&rotated, &data, &tag), Err(CryptoError::TagMismatch));
        }
    }
}
