use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use super::Bucket;
use crate::error::BucketError;

/// In-memory bucket for testing and simulation.
///
/// Clones share the same map, so a test can hand one clone to a store and
/// keep another to inspect what was persisted, or to "restart" by building
/// a fresh store over the same contents.
///
/// Reads and writes can be made to fail on demand to exercise the store's
/// degraded paths.
#[derive(Clone, Default)]
pub struct MemoryBucket {
    inner: Arc<Mutex<MemoryBucketInner>>,
}

#[derive(Default)]
struct MemoryBucketInner {
    objects: HashMap<String, Vec<u8>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryBucket {
    /// Create a new empty bucket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_reads = fail;
        }
    }

    /// Make every subsequent `put` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_writes = fail;
        }
    }

    /// Raw value under `key`, bypassing fault injection.
    pub fn peek(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.lock().ok().and_then(|inner| inner.objects.get(key).cloned())
    }

    /// Number of keys written.
    pub fn len(&self) -> Result<usize, BucketError> {
        Ok(self.lock()?.objects.len())
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> Result<bool, BucketError> {
        Ok(self.lock()?.objects.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryBucketInner>, BucketError> {
        self.inner.lock().map_err(|_| BucketError::Unavailable("memory bucket poisoned".into()))
    }
}

impl Bucket for MemoryBucket {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BucketError> {
        let inner = self.lock()?;
        if inner.fail_reads {
            return Err(BucketError::Unavailable(format!("injected read failure for {key}")));
        }

        Ok(inner.objects.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), BucketError> {
        let mut inner = self.lock()?;
        if inner.fail_writes {
            return Err(BucketError::Unavailable(format!("injected write failure for {key}")));
        }

        inner.objects.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
