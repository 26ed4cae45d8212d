//! Core store trait
//!
//! Every backend stores opaque byte blobs under a [`RomKey`] inside one
//! namespace. Entries never expire; they stay until removed or cleared.

use crate::{error::StoreResult, key::RomKey, stats::StoreStats};
use async_trait::async_trait;
use bytes::Bytes;

/// Persistent key-value byte store
#[async_trait]
pub trait ByteStore: Send + Sync {
    /// Collection name this store writes into.
    fn namespace(&self) -> &str;

    /// Returns `None` when no entry exists.
    async fn get(&self, key: &RomKey) -> StoreResult<Option<Bytes>>;

    /// Replaces any existing entry atomically.
    async fn put(&self, key: RomKey, value: Bytes) -> StoreResult<()>;

    async fn contains(&self, key: &RomKey) -> StoreResult<bool>;

    /// Returns true if the key was present and removed.
    async fn remove(&self, key: &RomKey) -> StoreResult<bool>;

    async fn clear(&self) -> StoreResult<()>;

    /// Stored keys, sorted.
    async fn keys(&self) -> StoreResult<Vec<RomKey>>;

    /// Entry count, not byte size.
    async fn len(&self) -> StoreResult<usize> {
        Ok(self.keys().await?.len())
    }

    async fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len().await? == 0)
    }

    fn stats(&self) -> StoreStats;
}
