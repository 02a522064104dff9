//! Sequence counter and shared secret, durable across restarts.
//!
//! # State Machine
//!
//! ```text
//! ┌───────────────┐ start ┌─────────┐       ┌───────┐ stop ┌──────────┐       ┌─────────┐
//! │ Uninitialized │──────>│ Loading │──────>│ Ready │─────>│ Stopping │──────>│ Stopped │
//! └───────────────┘       └─────────┘       └───────┘      └──────────┘       └─────────┘
//!         ↑                    │
//!         └────────────────────┘ bootstrap secret missing (fatal)
//! ```
//!
//! `start` reads both values from the bucket, bootstrapping whichever is
//! absent (counter = 1, secret from the configured source) and persisting it
//! immediately. Read failures are logged and leave the value unset; the
//! store still reaches `Ready`, and the affected accessor reports the gap
//! with [`StoreError::SequenceUnavailable`] or
//! [`StoreError::SecretUnavailable`] instead of handing out a guess.
//!
//! While `Ready`, the in-memory copies are the source of truth. Under
//! [`PersistencePolicy::OnShutdown`] they are written back only by `stop`,
//! so a crash loses every counter advance since startup. `stop` is
//! best-effort: write failures are logged and the store stops anyway.
//!
//! # Concurrency
//!
//! All state sits behind one mutex. `next_sequence_number` is a single
//! critical section, so concurrent callers always receive distinct values.
//! Bucket I/O in `start` and `stop` happens outside the lock; other callers
//! observe `Loading`/`Stopping` and get [`StoreError::NotReady`].
//!
//! A panic while the lock is held (a bucket panicking inside a per-advance
//! write) stops the store. The call that finds the poisoned lock gets
//! [`StoreError::Poisoned`]; every later call sees `Stopped`. No state is left
//! in `Loading` or `Stopping`, and no further sequence numbers are issued.

use std::{
    fs,
    sync::{Mutex, MutexGuard},
};

use edl_crypto::SharedSecret;
use tracing::{debug, error, info, warn};

use crate::{
    bucket::Bucket,
    config::{BootstrapPolicy, PersistencePolicy, StoreConfig},
    error::StoreError,
};

/// Bucket key of the sequence counter (4-byte big-endian).
pub const SEQUENCE_KEY: &str = "seqNum";

/// Bucket key of the shared secret (raw bytes).
pub const SECRET_KEY: &str = "hmacKey";

/// Counter value used when none is stored.
pub const INITIAL_SEQUENCE: u32 = 1;

/// Secret used under [`BootstrapPolicy::Placeholder`].
pub const PLACEHOLDER_SECRET: [u8; 2] = [0x00, 0x00];

/// Lifecycle state of a [`Store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Created, `start` not yet called
    Uninitialized,
    /// `start` is reading from the bucket
    Loading,
    /// Accessors are available
    Ready,
    /// `stop` is writing back to the bucket
    Stopping,
    /// Shut down; accessors refuse
    Stopped,
}

struct StoreInner {
    state: StoreState,
    sequence: Option<u32>,
    secret: Option<SharedSecret>,
}

/// Owner of the uplink sequence counter and shared secret.
///
/// Share it between the components that need it with `Arc<Store<B>>`.
pub struct Store<B: Bucket> {
    bucket: B,
    config: StoreConfig,
    inner: Mutex<StoreInner>,
}

impl<B: Bucket> Store<B> {
    /// Create a store over `bucket`. Nothing is read until [`Self::start`].
    pub fn new(bucket: B, config: StoreConfig) -> Self {
        Self {
            bucket,
            config,
            inner: Mutex::new(StoreInner {
                state: StoreState::Uninitialized,
                sequence: None,
                secret: None,
            }),
        }
    }

    /// Configuration this store was created with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> Result<StoreState, StoreError> {
        Ok(self.lock()?.state)
    }

    /// Whether the store is `Ready` with both values loaded.
    pub fn is_ready(&self) -> bool {
        self.lock().is_ok_and(|inner| {
            inner.state == StoreState::Ready && inner.sequence.is_some() && inner.secret.is_some()
        })
    }

    /// Load state from the bucket and become `Ready`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidTransition`] unless called from `Uninitialized`
    /// - [`StoreError::BootstrapSecretMissing`] if no secret is stored and
    ///   the secret file cannot supply one; the store returns to
    ///   `Uninitialized` so the host can retry
    ///
    /// Bucket failures are not errors here: they are logged and leave the
    /// affected value unset.
    pub fn start(&self) -> Result<(), StoreError> {
        self.transition(StoreState::Uninitialized, StoreState::Loading, "start")?;

        let instance = self.config.instance.as_str();
        info!(instance, "Loading uplink environment");

        let secret = match self.load_secret() {
            Ok(secret) => Some(secret),
            Err(err @ StoreError::BootstrapSecretMissing { .. }) => {
                error!(instance, error = %err, "Cannot bootstrap shared secret");
                self.lock()?.state = StoreState::Uninitialized;
                return Err(err);
            },
            Err(err) => {
                error!(instance, error = %err, "Failed to load shared secret");
                None
            },
        };

        let sequence = match self.load_sequence() {
            Ok(sequence) => Some(sequence),
            Err(err) => {
                error!(instance, error = %err, "Failed to load sequence number");
                None
            },
        };

        let mut inner = self.lock()?;
        inner.state = StoreState::Ready;
        inner.sequence = sequence;
        inner.secret = secret;

        info!(
            instance,
            sequence = ?inner.sequence,
            has_secret = inner.secret.is_some(),
            "Uplink environment ready"
        );

        Ok(())
    }

    /// Hand out the current sequence number and advance the counter by one.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotReady`] outside `Ready`
    /// - [`StoreError::SequenceUnavailable`] if the counter failed to load
    /// - [`StoreError::SequenceExhausted`] once the counter cannot advance
    ///   without wrapping
    pub fn next_sequence_number(&self) -> Result<u32, StoreError> {
        let mut inner = self.lock()?;
        if inner.state != StoreState::Ready {
            return Err(StoreError::NotReady { state: inner.state });
        }

        let current = inner.sequence.ok_or(StoreError::SequenceUnavailable)?;
        let next = current.checked_add(1).ok_or(StoreError::SequenceExhausted)?;
        inner.sequence = Some(next);

        // Written under the lock so concurrent advances reach the bucket in
        // order.
        if self.config.persistence == PersistencePolicy::EveryAdvance
            && let Err(err) = self.bucket.put(SEQUENCE_KEY, &next.to_be_bytes())
        {
            error!(
                instance = %self.config.instance,
                sequence = next,
                error = %err,
                "Failed to persist sequence number"
            );
        }

        debug!(instance = %self.config.instance, sequence = current, "Issued sequence number");

        Ok(current)
    }

    /// The active shared secret.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotReady`] outside `Ready`
    /// - [`StoreError::SecretUnavailable`] if the secret failed to load
    pub fn current_secret(&self) -> Result<SharedSecret, StoreError> {
        let inner = self.lock()?;
        if inner.state != StoreState::Ready {
            return Err(StoreError::NotReady { state: inner.state });
        }

        inner.secret.clone().ok_or(StoreError::SecretUnavailable)
    }

    /// Write both values back to the bucket and stop.
    ///
    /// Write failures are logged, never returned: the store reaches
    /// `Stopped` regardless.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidTransition`] unless called from `Ready`.
    pub fn stop(&self) -> Result<(), StoreError> {
        let (sequence, secret) = {
            let mut inner = self.lock()?;
            if inner.state != StoreState::Ready {
                return Err(StoreError::InvalidTransition { state: inner.state, operation: "stop" });
            }
            inner.state = StoreState::Stopping;
            (inner.sequence, inner.secret.clone())
        };

        let instance = self.config.instance.as_str();

        match sequence {
            Some(sequence) => match self.bucket.put(SEQUENCE_KEY, &sequence.to_be_bytes()) {
                Ok(()) => info!(instance, sequence, "Saved sequence number"),
                Err(err) => error!(instance, sequence, error = %err, "Failed to save sequence number"),
            },
            None => warn!(instance, "No sequence number loaded; nothing to save"),
        }

        match secret {
            Some(secret) => {
                if let Err(err) = self.bucket.put(SECRET_KEY, secret.as_bytes()) {
                    error!(instance, error = %err, "Failed to save shared secret");
                }
            },
            None => warn!(instance, "No shared secret loaded; nothing to save"),
        }

        self.lock()?.state = StoreState::Stopped;
        info!(instance, "Uplink environment stopped");

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreInner>, StoreError> {
        self.inner.lock().map_err(|poisoned| {
            poisoned.into_inner().state = StoreState::Stopped;
            self.inner.clear_poison();
            error!(instance = %self.config.instance, "Store lock poisoned; store stopped");
            StoreError::Poisoned
        })
    }

    fn transition(
        &self,
        from: StoreState,
        to: StoreState,
        operation: &'static str,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.state != from {
            return Err(StoreError::InvalidTransition { state: inner.state, operation });
        }
        inner.state = to;
        Ok(())
    }

    fn load_secret(&self) -> Result<SharedSecret, StoreError> {
        if let Some(bytes) = self.bucket.get(SECRET_KEY)? {
            return SharedSecret::new(bytes)
                .map_err(|e| StoreError::CorruptValue { key: SECRET_KEY, reason: e.to_string() });
        }

        let secret = self.bootstrap_secret()?;
        if let Err(err) = self.bucket.put(SECRET_KEY, secret.as_bytes()) {
            warn!(
                instance = %self.config.instance,
                error = %err,
                "Failed to persist bootstrapped secret; it will be retried at shutdown"
            );
        }

        Ok(secret)
    }

    fn bootstrap_secret(&self) -> Result<SharedSecret, StoreError> {
        let instance = self.config.instance.as_str();

        match self.config.bootstrap {
            BootstrapPolicy::File => {
                let path = self.config.secret_path();
                info!(instance, path = %path.display(), "Shared secret not stored; loading from file");

                let text = fs::read_to_string(&path).map_err(|e| {
                    StoreError::BootstrapSecretMissing { path: path.clone(), reason: e.to_string() }
                })?;

                SharedSecret::from_first_line(&text)
                    .map_err(|e| StoreError::BootstrapSecretMissing { path, reason: e.to_string() })
            },
            BootstrapPolicy::Placeholder => {
                warn!(instance, "Shared secret not stored; using placeholder secret");

                SharedSecret::new(PLACEHOLDER_SECRET.to_vec())
                    .map_err(|_| StoreError::SecretUnavailable)
            },
        }
    }

    fn load_sequence(&self) -> Result<u32, StoreError> {
        let instance = self.config.instance.as_str();

        let Some(bytes) = self.bucket.get(SEQUENCE_KEY)? else {
            info!(instance, sequence = INITIAL_SEQUENCE, "Sequence number not stored; starting fresh");

            if let Err(err) = self.bucket.put(SEQUENCE_KEY, &INITIAL_SEQUENCE.to_be_bytes()) {
                warn!(instance, error = %err, "Failed to persist initial sequence number");
            }
            return Ok(INITIAL_SEQUENCE);
        };

        let field: [u8; 4] = bytes.as_slice().try_into().map_err(|_| StoreError::CorruptValue {
            key: SEQUENCE_KEY,
            reason: format!("expected 4 bytes, got {}", bytes.len()),
        })?;

        let sequence = u32::from_be_bytes(field);
        info!(instance, sequence, "Loaded sequence number");

        Ok(sequence)
    }
}
