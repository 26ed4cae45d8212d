//! Asset cache loader
//!
//! [`RomLoader::acquire`] turns an archive URL into playable ROM bytes:
//!
//! 1. derive the [`RomKey`] from the last path segment of the URL
//! 2. probe the store; a hit returns without touching the network
//! 3. on a miss, download the archive once
//! 4. extract the first entry with a ROM extension
//! 5. write the extracted bytes back to the store, best effort
//!
//! Read failures of the store are treated as misses and write failures
//! only skip caching. Fetch failures and archives without a ROM are
//! returned to the caller; nothing is retried.

use crate::archive::{self, ExtractedRom};
use crate::config::LoaderConfig;
use crate::error::{AcquisitionError, FetchError};
use crate::transport::HttpClient;
use bytes::Bytes;
use retrohub_cache::{ByteStore, CacheKey, RomKey};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the bytes of an [`AcquiredRom`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomSource {
    Cache,
    Network,
}

/// Result of a successful acquisition
#[derive(Debug, Clone)]
pub struct AcquiredRom {
    pub key: RomKey,
    pub bytes: Bytes,
    pub source: RomSource,
    /// Archive entry the bytes were extracted from, for network loads
    pub entry_name: Option<String>,
}

/// Fetches, unpacks and caches ROM archives
#[derive(Clone)]
pub struct RomLoader {
    config: LoaderConfig,
    http: HttpClient,
    store: Arc<dyn ByteStore>,
}

impl RomLoader {
    pub fn new(config: LoaderConfig, store: Arc<dyn ByteStore>) -> Result<Self, FetchError> {
        let http = HttpClient::new(&config.http)?;
        Ok(Self::with_client(config, http, store))
    }

    /// Build a loader around an existing HTTP client
    pub fn with_client(config: LoaderConfig, http: HttpClient, store: Arc<dyn ByteStore>) -> Self {
        Self {
            config,
            http,
            store,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ByteStore> {
        &self.store
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Return the ROM bytes for `url`
    pub async fn acquire(&self, url: &str) -> Result<Bytes, AcquisitionError> {
        Ok(self.acquire_rom(url).await?.bytes)
    }

    /// Like [`acquire`](Self::acquire), also reporting where the bytes came from
    pub async fn acquire_rom(&self, url: &str) -> Result<AcquiredRom, AcquisitionError> {
        let key = RomKey::from_url(url);

        if let Some(bytes) = self.probe(&key).await {
            debug!(key = %key, size = bytes.len(), "ROM cache hit");
            return Ok(AcquiredRom {
                key,
                bytes,
                source: RomSource::Cache,
                entry_name: None,
            });
        }

        info!(key = %key, %url, "ROM cache miss, downloading archive");
        let payload = self
            .http
            .get_bytes(url, self.config.max_archive_bytes)
            .await
            .map_err(|source| AcquisitionError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let rom = self.unpack(&key, payload).await?;
        info!(
            key = %key,
            entry = %rom.name,
            size = rom.bytes.len(),
            "extracted ROM"
        );

        self.persist(&key, rom.bytes.clone()).await;

        Ok(AcquiredRom {
            key,
            bytes: rom.bytes,
            source: RomSource::Network,
            entry_name: Some(rom.name),
        })
    }

    async fn probe(&self, key: &RomKey) -> Option<Bytes> {
        if !key.is_path_safe() {
            debug!(key = %key, "key cannot be cached, skipping lookup");
            return None;
        }
        match self.store.get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key = %key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    async fn persist(&self, key: &RomKey, bytes: Bytes) {
        if !key.is_path_safe() {
            debug!(key = %key, "key cannot be cached, skipping write");
            return;
        }
        if let Err(e) = self.store.put(key.clone(), bytes).await {
            warn!(key = %key, error = %e, "cache write failed, continuing without caching");
        }
    }

    async fn unpack(&self, key: &RomKey, payload: Bytes) -> Result<ExtractedRom, AcquisitionError> {
        if self.config.accept_raw_rom && !archive::is_zip(&payload) {
            debug!(key = %key, "payload is not an archive, using it as the ROM");
            return Ok(ExtractedRom {
                name: key.as_str().to_string(),
                bytes: payload,
            });
        }

        let limit = self.config.rom_limit();
        tokio::task::spawn_blocking(move || archive::extract_rom(&payload, limit))
            .await
            .map_err(|e| AcquisitionError::Task(e.to_string()))?
            .map_err(|e| AcquisitionError::from_archive(key.clone(), e))
    }
}

impl std::fmt::Debug for RomLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RomLoader")
            .field("config", &self.config)
            .field("namespace", &self.store.namespace())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::archive::tests::build_zip;
    use crate::error::ArchiveError;
    use retrohub_cache::MemoryStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn loader(store: Arc<MemoryStore>) -> RomLoader {
        RomLoader::new(LoaderConfig::default(), store).expect("loader should build")
    }

    #[tokio::test]
    async fn test_cache_hit_reports_source() {
        let store = Arc::new(MemoryStore::default());
        store
            .put(RomKey::new("mario.zip"), Bytes::from_static(b"cached"))
            .await
            .unwrap();

        let rom = loader(store)
            .acquire_rom("http://127.0.0.1:9/roms/mario.zip")
            .await
            .unwrap();

        assert_eq!(rom.source, RomSource::Cache);
        assert_eq!(rom.entry_name, None);
        assert_eq!(&rom.bytes[..], b"cached");
    }

    #[tokio::test]
    async fn test_read_failure_is_a_miss() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mario.zip"))
            .respond_with(
                ResponseTemplate::new(200).set_body_bytes(build_zip(&[("mario.nes", "NES")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::default());
        store.fail_reads(true);

        let rom = loader(store.clone())
            .acquire_rom(&format!("{}/mario.zip", server.uri()))
            .await
            .unwrap();

        assert_eq!(rom.source, RomSource::Network);
        assert_eq!(rom.entry_name.as_deref(), Some("mario.nes"));
        store.fail_reads(false);
        assert_eq!(
            store.get(&RomKey::new("mario.zip")).await.unwrap(),
            Some(Bytes::from_static(b"NES"))
        );
    }

    #[tokio::test]
    async fn test_raw_rom_opt_in() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"NES\x1araw".to_vec()))
            .mount(&server)
            .await;
        let url = format!("{}/contra.nes", server.uri());

        let strict = loader(Arc::new(MemoryStore::default()));
        assert!(matches!(
            strict.acquire(&url).await,
            Err(AcquisitionError::Archive { .. })
        ));

        let store = Arc::new(MemoryStore::default());
        let lenient = RomLoader::new(
            LoaderConfig::default().with_accept_raw_rom(true),
            store.clone(),
        )
        .unwrap();
        let rom = lenient.acquire_rom(&url).await.unwrap();
        assert_eq!(&rom.bytes[..], b"NES\x1araw");
        assert_eq!(rom.entry_name.as_deref(), Some("contra.nes"));
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_oversized_archive() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4096]))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::default());
        let loader = RomLoader::new(
            LoaderConfig::default().with_max_archive_bytes(1024),
            store.clone(),
        )
        .unwrap();

        let err = loader
            .acquire(&format!("{}/huge.zip", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AcquisitionError::Fetch {
                source: FetchError::TooLarge { limit: 1024, .. },
                ..
            }
        ));
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_inflated_rom_over_limit_is_not_cached() {
        let zeros = "\0".repeat(256 * 1024);
        let archive = build_zip(&[("huge.nes", zeros.as_str())]);
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::default());
        let loader = RomLoader::new(
            LoaderConfig::default().with_max_archive_bytes(64 * 1024),
            store.clone(),
        )
        .unwrap();

        let err = loader
            .acquire(&format!("{}/huge.zip", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AcquisitionError::Archive {
                source: ArchiveError::TooLarge { limit: 65536, .. },
                ..
            }
        ));
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_unsafe_key_skips_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(build_zip(&[("a.gb", "GB")])))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::default());
        let bytes = loader(store.clone())
            .acquire(&format!("{}/roms/", server.uri()))
            .await
            .unwrap();

        assert_eq!(&bytes[..], b"GB");
        assert!(store.is_empty().await.unwrap());
        assert_eq!(store.stats().get_count, 0);
    }
}
