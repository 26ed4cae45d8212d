//! In-memory store
//!
//! DashMap-backed store for tests and for sessions that should not touch
//! the disk. Failure injection lets callers exercise the degraded read and
//! write paths of the loader without a broken filesystem.

#![allow(missing_docs)]

use crate::{
    error::{StoreError, StoreResult},
    key::RomKey,
    stats::{AtomicStoreMetrics, StoreStats},
    traits::ByteStore,
};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Non-persistent store keeping every entry in memory
#[derive(Debug)]
pub struct MemoryStore {
    namespace: String,
    entries: DashMap<RomKey, Bytes>,
    metrics: AtomicStoreMetrics,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_NAMESPACE)
    }
}

impl MemoryStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: DashMap::new(),
            metrics: AtomicStoreMetrics::new(),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `get` fail with [`StoreError::Unavailable`]
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Make every subsequent `put` fail with [`StoreError::Unavailable`]
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl ByteStore for MemoryStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self, key: &RomKey) -> StoreResult<Option<Bytes>> {
        if self.fail_reads.load(Ordering::Relaxed) {
            self.metrics.record_read_failure();
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }

        let value = self.entries.get(key).map(|entry| entry.value().clone());
        self.metrics.record_get(value.is_some());
        Ok(value)
    }

    async fn put(&self, key: RomKey, value: Bytes) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            self.metrics.record_put(false);
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }

        self.entries.insert(key, value);
        self.metrics.record_put(true);
        Ok(())
    }

    async fn contains(&self, key: &RomKey) -> StoreResult<bool> {
        Ok(self.entries.contains_key(key))
    }

    async fn remove(&self, key: &RomKey) -> StoreResult<bool> {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.metrics.record_remove();
        }
        Ok(removed)
    }

    async fn clear(&self) -> StoreResult<()> {
        self.entries.clear();
        self.metrics.reset();
        Ok(())
    }

    async fn keys(&self) -> StoreResult<Vec<RomKey>> {
        let mut keys: Vec<RomKey> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }

    async fn len(&self) -> StoreResult<usize> {
        Ok(self.entries.len())
    }

    fn stats(&self) -> StoreStats {
        self.metrics.snapshot()
    }
}
