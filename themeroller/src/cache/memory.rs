//! In-memory image store.
//!
//! Holds entries in a `DashMap`; nothing is persisted. Useful for hosts
//! without a writable cache directory and for exercising the service in
//! tests.

use bytes::Bytes;
use dashmap::DashMap;

use super::traits::{BoxFuture, CacheError, ImageStore};

/// Image store backed by a concurrent hash map.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    entries: DashMap<String, Bytes>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `key` is stored.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl ImageStore for MemoryImageStore {
    fn read(&self, key: &str) -> BoxFuture<'_, Result<Option<Bytes>, CacheError>> {
        let value = self.entries.get(key).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(value) })
    }

    fn write(&self, key: &str, data: Bytes) -> BoxFuture<'_, Result<(), CacheError>> {
        self.entries.insert(key.to_string(), data);
        Box::pin(async { Ok(()) })
    }
}
