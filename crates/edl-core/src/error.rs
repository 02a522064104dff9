//! Error types for the EDL core.
//!
//! Errors are split by boundary:
//! - [`BucketError`]: a single durable read or write failed
//! - [`StoreError`]: lifecycle and accessor failures of the sequence/secret
//!   store
//! - [`CoreError`]: framing an outbound command
//! - [`ConfigError`]: loading configuration
//!
//! CRC mismatches on received frames never appear here; they are reported on
//! the host packet.

use std::{io, path::PathBuf};

use edl_proto::ProtocolError;
use thiserror::Error;

use crate::store::StoreState;

/// Failure of the durable key-value store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BucketError {
    /// The storage engine reported an error
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The store cannot be reached at all
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the sequence/secret store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Durable read or write failed
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] BucketError),

    /// No stored secret and the bootstrap file could not supply one
    #[error("bootstrap secret missing at {}: {reason}", .path.display())]
    BootstrapSecretMissing {
        /// Configured secret file
        path: PathBuf,
        /// Why the file could not be used
        reason: String,
    },

    /// A stored value could not be interpreted
    #[error("stored value for {key} is corrupt: {reason}")]
    CorruptValue {
        /// Bucket key holding the value
        key: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Accessor called outside the `Ready` state
    #[error("store not ready: currently {state:?}")]
    NotReady {
        /// State at the time of the call
        state: StoreState,
    },

    /// Lifecycle call not allowed from the current state
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidTransition {
        /// State at the time of the call
        state: StoreState,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Store is ready but the counter failed to load
    #[error("sequence counter not loaded")]
    SequenceUnavailable,

    /// Store is ready but the secret failed to load
    #[error("shared secret not loaded")]
    SecretUnavailable,

    /// Counter reached the largest value the 4-byte field can hold
    #[error("sequence counter exhausted")]
    SequenceExhausted,

    /// A thread panicked while holding the store lock
    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors from framing an outbound command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Refused to build a frame without a secret to authenticate it
    #[error("cannot encode frame without a shared secret: {0}")]
    EncodePrecondition(StoreError),

    /// Sequence counter could not be advanced
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Frame could not be built
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        /// File that was read
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed values are unusable
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}
