//! Persistent byte store for extracted ROM images
//!
//! Extracted ROMs are cached under a key derived from the archive URL so that
//! the next session can boot without touching the network. The store is a
//! plain namespaced key-value interface over opaque byte blobs:
//!
//! - **No expiry**: entries persist until removed or cleared
//! - **Write-once in practice**: the loader writes an entry once per key and
//!   only reads it afterwards
//! - **Substitutable backends**: [`DiskStore`] for persistence,
//!   [`MemoryStore`] for tests and throwaway sessions
//!
//! # Example
//!
//! ```rust,no_run
//! use retrohub_cache::{ByteStore, DiskStore, RomKey, StoreConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DiskStore::open(StoreConfig::new("/var/cache/retrohub"))?;
//! let key = RomKey::from_url("https://roms.example/files/nes/contra.zip");
//!
//! if store.get(&key).await?.is_none() {
//!     store.put(key, bytes::Bytes::from_static(b"NES\x1a")).await?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::return_self_not_must_use)] // Builder patterns

pub mod config;
pub mod disk_store;
pub mod error;
pub mod key;
pub mod memory_store;
#[allow(missing_docs)]
pub mod stats;
#[allow(missing_docs)]
pub mod traits;

pub use config::{DEFAULT_NAMESPACE, StoreConfig};
pub use disk_store::DiskStore;
pub use error::{StoreError, StoreResult};
pub use key::{CacheKey, RomKey};
pub use memory_store::MemoryStore;
pub use stats::{AtomicStoreMetrics, StoreStats};
pub use traits::ByteStore;
