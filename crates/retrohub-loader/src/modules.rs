//! Loading of the runtime's bootstrap modules
//!
//! The runtime ships as two scripts that must be loaded in order: a small
//! loader, then the engine. [`ModuleLoader::ensure_loaded`] is idempotent, so
//! remounting a player does not fetch either script a second time.
//!
//! Each successful `ensure_loaded` registers one user of the module and each
//! [`ModuleLoader::release`] drops one. The host only unloads a module when
//! its last user releases it, so sessions sharing a loader do not pull
//! scripts out from under each other.

use crate::error::{FetchError, ScriptLoadError};
use crate::transport::HttpClient;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Largest module source accepted by [`HttpModuleHost`]
const MAX_MODULE_BYTES: u64 = 16 * 1024 * 1024;

/// One external script resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalModule {
    pub id: String,
    pub url: String,
}

impl ExternalModule {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// The runtime's loader and engine scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorModules {
    pub loader: ExternalModule,
    pub engine: ExternalModule,
}

impl EmulatorModules {
    /// Modules below `base`, e.g. `<base>/loader.js` and `<base>/src/emulator.js`
    pub fn new(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            loader: ExternalModule::new("emulator-loader-script", format!("{base}/loader.js")),
            engine: ExternalModule::new("emulator-main-script", format!("{base}/src/emulator.js")),
        }
    }

    /// Load order: loader first, then engine
    pub fn in_order(&self) -> [&ExternalModule; 2] {
        [&self.loader, &self.engine]
    }
}

/// Environment that can load and unload modules
#[async_trait]
pub trait ModuleHost: Send + Sync {
    async fn load(&self, module: &ExternalModule) -> Result<(), ScriptLoadError>;

    async fn unload(&self, id: &str);
}

/// Host that downloads module sources over HTTP and keeps them in memory
pub struct HttpModuleHost {
    http: HttpClient,
    sources: DashMap<String, Bytes>,
}

impl HttpModuleHost {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            sources: DashMap::new(),
        }
    }

    /// Source of a loaded module
    pub fn source(&self, id: &str) -> Option<Bytes> {
        self.sources.get(id).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl ModuleHost for HttpModuleHost {
    async fn load(&self, module: &ExternalModule) -> Result<(), ScriptLoadError> {
        let source = self
            .http
            .get_bytes(&module.url, MAX_MODULE_BYTES)
            .await
            .map_err(|e| match e {
                FetchError::Status(status) => ScriptLoadError::Status {
                    url: module.url.clone(),
                    status,
                },
                FetchError::Http(source) => ScriptLoadError::Http {
                    url: module.url.clone(),
                    source,
                },
                other => ScriptLoadError::Host {
                    id: module.id.clone(),
                    reason: other.to_string(),
                },
            })?;

        self.sources.insert(module.id.clone(), source);
        Ok(())
    }

    async fn unload(&self, id: &str) {
        self.sources.remove(id);
    }
}

/// Idempotent, reference-counted front of a [`ModuleHost`]
pub struct ModuleLoader {
    host: Arc<dyn ModuleHost>,
    /// Loaded module ids and their user counts
    loaded: Mutex<HashMap<String, usize>>,
}

impl ModuleLoader {
    pub fn new(host: Arc<dyn ModuleHost>) -> Self {
        Self {
            host,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Load `module` unless a module with the same id is already loaded,
    /// and register one more user of it
    pub async fn ensure_loaded(&self, module: &ExternalModule) -> Result<(), ScriptLoadError> {
        // Held across the host call so concurrent callers load once
        let mut loaded = self.loaded.lock().await;
        if let Some(users) = loaded.get_mut(&module.id) {
            *users += 1;
            tracing::debug!(id = %module.id, users = *users, "module already loaded");
            return Ok(());
        }

        tracing::info!(id = %module.id, url = %module.url, "loading runtime module");
        self.host.load(module).await?;
        loaded.insert(module.id.clone(), 1);
        Ok(())
    }

    /// Load all modules strictly in the given order, stopping at the first failure
    ///
    /// On failure the modules this call already registered are released again.
    pub async fn ensure_all<'a>(
        &self,
        modules: impl IntoIterator<Item = &'a ExternalModule>,
    ) -> Result<(), ScriptLoadError> {
        let mut acquired = Vec::<&str>::new();
        for module in modules {
            if let Err(e) = self.ensure_loaded(module).await {
                for id in acquired.iter().rev() {
                    self.release(id).await;
                }
                return Err(e);
            }
            acquired.push(module.id.as_str());
        }
        Ok(())
    }

    pub async fn is_loaded(&self, id: &str) -> bool {
        self.loaded.lock().await.contains_key(id)
    }

    /// Number of users currently holding `id`
    pub async fn users(&self, id: &str) -> usize {
        self.loaded.lock().await.get(id).copied().unwrap_or(0)
    }

    /// Drop one user of `id`; the host unloads it once nobody holds it
    ///
    /// Returns true when the module was unloaded.
    pub async fn release(&self, id: &str) -> bool {
        let mut loaded = self.loaded.lock().await;
        match loaded.get_mut(id) {
            Some(users) if *users > 1 => {
                *users -= 1;
                tracing::debug!(id, users = *users, "module still in use");
                false
            }
            Some(_) => {
                loaded.remove(id);
                self.host.unload(id).await;
                true
            }
            None => false,
        }
    }

    /// Unload one module regardless of its users; returns false if it was not loaded
    pub async fn unload(&self, id: &str) -> bool {
        let mut loaded = self.loaded.lock().await;
        if loaded.remove(id).is_none() {
            return false;
        }
        self.host.unload(id).await;
        true
    }
}
