//! Cache key types
//!
//! A ROM is cached under the last path segment of the archive URL it was
//! downloaded from. Two archives that share a file name on different hosts
//! therefore map onto the same entry; callers that mix sources should give
//! each source its own store namespace.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix of in-flight writes; hidden names ending in it are never keys
pub(crate) const TEMP_SUFFIX: &str = ".tmp";

/// Common interface for keys understood by a [`ByteStore`](crate::ByteStore).
pub trait CacheKey: fmt::Debug + Clone + PartialEq + Eq + std::hash::Hash + Send + Sync {
    fn as_cache_key(&self) -> &str;

    /// True when the key can be used as a single file name.
    ///
    /// Hidden names ending in `.tmp` are reserved for in-flight writes.
    fn is_path_safe(&self) -> bool {
        let key = self.as_cache_key();
        !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\', '\0'])
            && !(key.starts_with('.') && key.ends_with(TEMP_SUFFIX))
    }
}

/// Key for an extracted ROM image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RomKey(String);

impl RomKey {
    /// Derive the key from an archive URL: everything after the final `/`.
    ///
    /// No URL parsing happens here, so a query string stays part of the key
    /// and a URL ending in `/` yields an empty key.
    pub fn from_url(url: &str) -> Self {
        let segment = url.rsplit_once('/').map_or(url, |(_, last)| last);
        Self(segment.to_string())
    }

    /// Wrap a key read back from a store listing.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl CacheKey for RomKey {
    fn as_cache_key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RomKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
