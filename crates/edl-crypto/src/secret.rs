//! The symmetric key shared between ground station and spacecraft.

use std::fmt;

use crate::error::{CryptoError, Result};

/// Opaque HMAC key.
///
/// The bytes are never printed: `Debug` only reports the length so secrets
/// cannot leak through structured log fields.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Wrap raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptySecret`] for a zero-length key. HMAC
    /// accepts an empty key, but a frame authenticated with one proves
    /// nothing about its origin.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(CryptoError::EmptySecret);
        }
        Ok(Self(bytes))
    }

    /// Build a secret from the first line of a text source.
    ///
    /// The line terminator (`\n` or `\r\n`) is not part of the key. Anything
    /// after the first line is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptySecret`] if the text is empty or its first
    /// line is blank.
    pub fn from_first_line(text: &str) -> Result<Self> {
        let line = text.lines().next().unwrap_or_default();
        Self::new(line.as_bytes())
    }

    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key has no bytes. False for any value built by
    /// [`Self::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret").field("len", &self.0.len()).finish_non_exhaustive()
    }
}
