//! Durable key-value storage for the store's two values.
//!
//! A bucket is bound to one instance namespace when it is opened, so the
//! same keys (`seqNum`, `hmacKey`) can be reused by every instance.
//!
//! Implementations must be safe to share between threads. Reads and writes
//! are whole-value: there are no partial updates.

use crate::error::BucketError;

mod memory;
mod redb;

pub use self::{memory::MemoryBucket, redb::RedbBucket};

/// Key-value store for raw byte values.
pub trait Bucket: Send + Sync {
    /// Fetch the value stored under `key`, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BucketError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// The write is durable once this returns `Ok`.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), BucketError>;
}
