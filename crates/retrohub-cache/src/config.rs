//! Store configuration
//!
//! Configuration for the persistent ROM store. Defaults mirror the browser
//! deployment: a single `roms` collection, no expiry, no size cap.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default collection name for extracted ROM images
pub const DEFAULT_NAMESPACE: &str = "roms";

/// Persistent store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base directory for all namespaces
    pub root_dir: PathBuf,
    /// Collection name; entries live under `root_dir/namespace`
    pub namespace: String,
    /// Spread entries over hashed subdirectories
    pub use_subdirectories: bool,
    /// Number of subdirectory levels (if use_subdirectories is true)
    pub subdirectory_levels: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("retrohub-cache"),
            namespace: DEFAULT_NAMESPACE.to_string(),
            use_subdirectories: false,
            subdirectory_levels: 2,
        }
    }
}

impl StoreConfig {
    /// Create a store configuration rooted at `root_dir`
    pub fn new<P: Into<PathBuf>>(root_dir: P) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    /// Create configuration from environment variables
    ///
    /// Reads `RETROHUB_CACHE_DIR` and `RETROHUB_CACHE_NAMESPACE`, falling back
    /// to the defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            root_dir: std::env::var_os("RETROHUB_CACHE_DIR")
                .map_or(defaults.root_dir, PathBuf::from),
            namespace: std::env::var("RETROHUB_CACHE_NAMESPACE").unwrap_or(defaults.namespace),
            ..defaults
        }
    }

    /// Set the collection name
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Enable or disable subdirectories
    pub fn with_subdirectories(mut self, enable: bool, levels: usize) -> Self {
        self.use_subdirectories = enable;
        self.subdirectory_levels = levels;
        self
    }

    /// Directory holding this namespace's entries
    pub fn namespace_dir(&self) -> PathBuf {
        self.root_dir.join(&self.namespace)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.namespace.is_empty() {
            return Err("namespace must not be empty".to_string());
        }

        if self.namespace.contains(['/', '\\']) || self.namespace == ".." {
            return Err(format!(
                "namespace must be a single path component, got {:?}",
                self.namespace
            ));
        }

        if self.use_subdirectories && !(1..=4).contains(&self.subdirectory_levels) {
            return Err(
                "subdirectory_levels must be between 1 and 4 when using subdirectories"
                    .to_string(),
            );
        }

        Ok(())
    }
}
