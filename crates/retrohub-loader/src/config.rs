//! Configuration for the loader and its HTTP transport

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP transport configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    /// Whole-request timeout, body included
    pub request_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
    pub enable_compression: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            // ROM archives for disc systems run to hundreds of megabytes
            request_timeout: Duration::from_secs(300),
            pool_idle_timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 4,
            user_agent: concat!("retrohub-loader/", env!("CARGO_PKG_VERSION")).to_string(),
            enable_compression: true,
        }
    }
}

impl HttpConfig {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// ROM loader configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub http: HttpConfig,
    /// Largest archive accepted from the network
    pub max_archive_bytes: u64,
    /// Largest ROM accepted after decompression; `None` uses `max_archive_bytes`
    pub max_rom_bytes: Option<u64>,
    /// Treat a payload without ZIP magic as the ROM itself
    pub accept_raw_rom: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            max_archive_bytes: 256 * 1024 * 1024,
            max_rom_bytes: None,
            accept_raw_rom: false,
        }
    }
}

impl LoaderConfig {
    /// Create configuration from environment variables
    ///
    /// `RETROHUB_MAX_ARCHIVE_BYTES`, `RETROHUB_MAX_ROM_BYTES`,
    /// `RETROHUB_ACCEPT_RAW_ROM` and `RETROHUB_REQUEST_TIMEOUT` (seconds)
    /// override the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let request_timeout = std::env::var("RETROHUB_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(defaults.http.request_timeout, Duration::from_secs);

        Self {
            http: defaults.http.with_request_timeout(request_timeout),
            max_archive_bytes: std::env::var("RETROHUB_MAX_ARCHIVE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_archive_bytes),
            max_rom_bytes: std::env::var("RETROHUB_MAX_ROM_BYTES")
                .ok()
                .and_then(|v| v.parse().ok()),
            accept_raw_rom: std::env::var("RETROHUB_ACCEPT_RAW_ROM")
                .is_ok_and(|v| matches!(v.as_str(), "1" | "true" | "yes")),
        }
    }

    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    pub fn with_max_archive_bytes(mut self, limit: u64) -> Self {
        self.max_archive_bytes = limit;
        self
    }

    pub fn with_max_rom_bytes(mut self, limit: u64) -> Self {
        self.max_rom_bytes = Some(limit);
        self
    }

    /// Decompressed size limit for an extracted ROM
    pub fn rom_limit(&self) -> u64 {
        self.max_rom_bytes.unwrap_or(self.max_archive_bytes)
    }

    pub fn with_accept_raw_rom(mut self, accept: bool) -> Self {
        self.accept_raw_rom = accept;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_archive_bytes == 0 {
            return Err("max_archive_bytes must be greater than 0".to_string());
        }
        if self.max_rom_bytes == Some(0) {
            return Err("max_rom_bytes must be greater than 0".to_string());
        }
        if self.http.request_timeout.is_zero() {
            return Err("request_timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}
