//! Ephemeral playable handles
//!
//! A handle is a short-lived `blob:` URL that resolves to in-memory ROM bytes
//! for as long as the handle value is alive. The registry plays the role of
//! the browser's object-URL table: the runtime receives only the URL and
//! dereferences it through [`HandleRegistry::resolve`].
//!
//! Release is tied to ownership. A [`PlayableHandle`] is not `Clone`, and its
//! registry entry is revoked exactly once, either by [`PlayableHandle::release`]
//! or when the value is dropped on any exit path.

use bytes::Bytes;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// URL scheme prefix for handles
const HANDLE_PREFIX: &str = "blob:retrohub/";

/// Table of live handles
#[derive(Debug, Default)]
pub struct HandleRegistry {
    entries: DashMap<String, Bytes>,
    next_id: AtomicU64,
    created: AtomicU64,
    released: AtomicU64,
}

impl HandleRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register `bytes` under a fresh URL
    pub fn create(self: &Arc<Self>, bytes: Bytes) -> PlayableHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = format!("{HANDLE_PREFIX}{id:016x}");
        let size = bytes.len();

        self.entries.insert(url.clone(), bytes);
        self.created.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%url, size, "created playable handle");

        PlayableHandle {
            url,
            size,
            registry: Arc::clone(self),
        }
    }

    /// Bytes behind a live handle URL
    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        self.entries.get(url).map(|entry| entry.value().clone())
    }

    /// Number of handles not yet released
    pub fn live(&self) -> usize {
        self.entries.len()
    }

    /// Handles created since the registry was built
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    /// Handles released since the registry was built
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    fn revoke(&self, url: &str) {
        if self.entries.remove(url).is_some() {
            self.released.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(%url, "released playable handle");
        }
    }
}

/// Owned reference to registered ROM bytes
pub struct PlayableHandle {
    url: String,
    size: usize,
    registry: Arc<HandleRegistry>,
}

impl PlayableHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Size of the referenced ROM in bytes
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Revoke the URL now instead of at drop
    pub fn release(self) {
        drop(self);
    }
}

impl fmt::Debug for PlayableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayableHandle")
            .field("url", &self.url)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl Drop for PlayableHandle {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_resolve() {
        let registry = HandleRegistry::new();
        let handle = registry.create(Bytes::from_static(b"NES\x1a"));

        assert!(handle.url().starts_with("blob:retrohub/"));
        assert_eq!(handle.len(), 4);
        assert_eq!(
            registry.resolve(handle.url()),
            Some(Bytes::from_static(b"NES\x1a"))
        );
        assert_eq!(registry.live(), 1);
    }

    #[test]
    fn test_release_exactly_once() {
        let registry = HandleRegistry::new();
        let handle = registry.create(Bytes::from_static(b"rom"));
        let url = handle.url().to_string();

        handle.release();

        assert_eq!(registry.resolve(&url), None);
        assert_eq!(registry.live(), 0);
        assert_eq!(registry.created(), 1);
        assert_eq!(registry.released(), 1);
    }

    #[test]
    fn test_drop_releases() {
        let registry = HandleRegistry::new();
        {
            let _a = registry.create(Bytes::from_static(b"a"));
            let _b = registry.create(Bytes::from_static(b"b"));
            assert_eq!(registry.live(), 2);
        }
        assert_eq!(registry.live(), 0);
        assert_eq!(registry.released(), 2);
    }

    #[test]
    fn test_urls_are_unique() {
        let registry = HandleRegistry::new();
        let a = registry.create(Bytes::new());
        let b = registry.create(Bytes::new());
        assert_ne!(a.url(), b.url());
        assert!(a.is_empty());
    }
}
