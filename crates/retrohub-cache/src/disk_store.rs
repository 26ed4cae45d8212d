//! File-backed store for persistent ROM storage
//!
//! Each entry is one file under `root_dir/namespace`, optionally spread over
//! hashed subdirectories. Writes go to a hidden temporary file that is
//! synced and then renamed over the final path, so readers never observe a
//! partially written ROM. There is no index: every lookup goes to the
//! filesystem, which keeps entries visible across process restarts.

use crate::{
    config::StoreConfig,
    error::{StoreError, StoreResult},
    key::{CacheKey, RomKey, TEMP_SUFFIX},
    stats::{AtomicStoreMetrics, StoreStats},
    traits::ByteStore,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::{fs, io::AsyncWriteExt, sync::Semaphore};

/// Maximum number of concurrent file operations
const MAX_CONCURRENT_IO: usize = 16;

/// Process-wide counter for temporary file names
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Persistent file-backed store
pub struct DiskStore {
    config: StoreConfig,
    dir: PathBuf,
    metrics: Arc<AtomicStoreMetrics>,
    io_semaphore: Arc<Semaphore>,
}

impl DiskStore {
    /// Open (and create if needed) the namespace directory
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        config
            .validate()
            .map_err(StoreError::InvalidConfiguration)?;

        let dir = config.namespace_dir();
        std::fs::create_dir_all(&dir).map_err(|e| {
            StoreError::Unavailable(format!("cannot create {}: {e}", dir.display()))
        })?;

        tracing::debug!(dir = %dir.display(), "opened ROM store");

        Ok(Self {
            config,
            dir,
            metrics: Arc::new(AtomicStoreMetrics::new()),
            io_semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_IO)),
        })
    }

    /// Directory holding this store's entries
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Generate the file path for a key
    fn entry_path(&self, key: &RomKey) -> StoreResult<PathBuf> {
        if !key.is_path_safe() {
            return Err(StoreError::InvalidKey(key.as_str().to_string()));
        }

        let key_str = key.as_cache_key();
        let mut path = self.dir.clone();

        if self.config.use_subdirectories {
            let hash = key_str.as_bytes().iter().fold(0u64, |acc, &b| {
                acc.wrapping_mul(31).wrapping_add(u64::from(b))
            });

            for level in 0..self.config.subdirectory_levels {
                let dir_byte = ((hash >> (level * 8)) & 0xFF) as u8;
                path.push(format!("{dir_byte:02x}"));
            }
        }

        path.push(key_str);
        Ok(path)
    }

    fn is_temp_file(name: &str) -> bool {
        name.starts_with('.') && name.ends_with(TEMP_SUFFIX)
    }

    /// Unique hidden sibling of `path` for an in-flight write
    ///
    /// The process id keeps processes sharing a cache directory apart.
    fn temp_path(path: &Path) -> StoreResult<PathBuf> {
        let parent = path
            .parent()
            .ok_or_else(|| StoreError::Backend(format!("{} has no parent", path.display())))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        Ok(parent.join(format!(
            ".{file_name}.{}.{seq}{TEMP_SUFFIX}",
            std::process::id()
        )))
    }

    /// Write data to disk atomically
    async fn write_file(&self, path: &Path, data: &Bytes) -> StoreResult<()> {
        let _permit = self
            .io_semaphore
            .acquire()
            .await
            .map_err(|_| StoreError::Backend("I/O semaphore closed".to_string()))?;

        let temp_path = Self::temp_path(path)?;
        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(data).await?;
            file.flush().await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StoreError::Io(e));
        }

        Ok(())
    }

    /// Read an entry, mapping a missing file to `None`
    async fn read_file(&self, path: &Path) -> StoreResult<Option<Bytes>> {
        let _permit = self
            .io_semaphore
            .acquire()
            .await
            .map_err(|_| StoreError::Backend("I/O semaphore closed".to_string()))?;

        match fs::read(path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Collect entry names below `dir`
    async fn collect_keys(&self, dir: &Path, keys: &mut Vec<RomKey>) -> StoreResult<()> {
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::Io(e)),
            };

            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                let file_name = entry.file_name();
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file()
                    && let Some(name) = file_name.to_str()
                    && !Self::is_temp_file(name)
                {
                    keys.push(RomKey::new(name));
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ByteStore for DiskStore {
    fn namespace(&self) -> &str {
        &self.config.namespace
    }

    async fn get(&self, key: &RomKey) -> StoreResult<Option<Bytes>> {
        let result = match self.entry_path(key) {
            Ok(path) => self.read_file(&path).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(found) => self.metrics.record_get(found.is_some()),
            Err(_) => self.metrics.record_read_failure(),
        }
        result
    }

    async fn put(&self, key: RomKey, value: Bytes) -> StoreResult<()> {
        let result = match self.entry_path(&key) {
            Ok(path) => self.write_file(&path, &value).await,
            Err(e) => Err(e),
        };

        self.metrics.record_put(result.is_ok());
        if result.is_ok() {
            tracing::debug!(key = %key, bytes = value.len(), "stored ROM");
        }
        result
    }

    async fn contains(&self, key: &RomKey) -> StoreResult<bool> {
        let path = self.entry_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn remove(&self, key: &RomKey) -> StoreResult<bool> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                self.metrics.record_remove();
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn clear(&self) -> StoreResult<()> {
        match fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::Io(e)),
        }
        fs::create_dir_all(&self.dir).await?;
        self.metrics.reset();
        Ok(())
    }

    async fn keys(&self) -> StoreResult<Vec<RomKey>> {
        let mut keys = Vec::new();
        self.collect_keys(&self.dir, &mut keys).await?;
        keys.sort();
        Ok(keys)
    }

    fn stats(&self) -> StoreStats {
        self.metrics.snapshot()
    }
}
