//! Outbound command framing.
//!
//! [`CommandFramer`] is the only place where the store and the codec meet:
//! it pulls the secret and the next sequence number from the [`Store`] and
//! hands both to [`edl_proto::encode`].

use std::sync::Arc;

use bytes::Bytes;
use edl_proto::FrameLayout;
use tracing::debug;

use crate::{bucket::Bucket, error::CoreError, store::Store};

/// Turns command payloads into authenticated uplink frames.
pub struct CommandFramer<B: Bucket> {
    store: Arc<Store<B>>,
    layout: FrameLayout,
}

impl<B: Bucket> CommandFramer<B> {
    /// Framer using the reference EDL layout.
    pub fn new(store: Arc<Store<B>>) -> Self {
        Self { store, layout: FrameLayout::EDL }
    }

    /// Use a different header layout.
    pub fn with_layout(mut self, layout: FrameLayout) -> Self {
        self.layout = layout;
        self
    }

    /// The store this framer draws from.
    pub fn store(&self) -> &Arc<Store<B>> {
        &self.store
    }

    /// Frame one command.
    ///
    /// A sequence number is consumed only once the frame is known to be
    /// encodable, so rejected payloads never leave gaps in the sequence.
    ///
    /// # Errors
    ///
    /// - [`CoreError::EncodePrecondition`] if the store has no secret (or is
    ///   not ready)
    /// - [`CoreError::Protocol`] if the payload does not fit the layout
    /// - [`CoreError::Store`] if the counter cannot advance
    pub fn frame(&self, payload: &[u8]) -> Result<Bytes, CoreError> {
        let secret = self.store.current_secret().map_err(CoreError::EncodePrecondition)?;
        self.layout.encoded_len(payload.len())?;

        let sequence = self.store.next_sequence_number()?;
        let frame = edl_proto::encode(&self.layout, payload, sequence, &secret)?;

        debug!(
            instance = %self.store.config().instance,
            sequence,
            hmac_len = edl_crypto::TAG_LEN,
            frame_len = frame.len(),
            "Framed command"
        );

        Ok(frame)
    }
}
