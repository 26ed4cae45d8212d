//! Deployment configuration for the catalog client

use crate::urls::normalize_api_base;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:8080";
pub const DEFAULT_IMAGE_BASE: &str = "https://bin9.vae88.com/files/img/";
pub const DEFAULT_ROM_BASE: &str = "https://bin9.vae88.com/files/";
pub const DEFAULT_EMULATOR_BASE: &str =
    "https://cdn.jsdelivr.net/npm/@ttgame/emulatorjs@4.2.4/data";

/// Catalog client configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL, stored without trailing slashes
    pub api_base: String,
    /// Static token sent as `Authorization` on user-scoped calls
    pub api_token: Option<String>,
    pub image_base: String,
    pub rom_base: String,
    pub emulator_base: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_token: None,
            image_base: DEFAULT_IMAGE_BASE.to_string(),
            rom_base: DEFAULT_ROM_BASE.to_string(),
            emulator_base: DEFAULT_EMULATOR_BASE.to_string(),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("retrohub-api/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    /// Create configuration from environment variables
    ///
    /// Reads `NES_API_BASE`, `NES_API_TOKEN`, `NES_IMAGE_BASE`,
    /// `NES_ROM_BASE` and `NES_EMULATOR_BASE`; unset or empty values keep
    /// the defaults.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            api_base: var("NES_API_BASE").map_or(defaults.api_base, |base| {
                normalize_api_base(&base).to_string()
            }),
            api_token: var("NES_API_TOKEN"),
            image_base: var("NES_IMAGE_BASE").unwrap_or(defaults.image_base),
            rom_base: var("NES_ROM_BASE").unwrap_or(defaults.rom_base),
            emulator_base: var("NES_EMULATOR_BASE").unwrap_or(defaults.emulator_base),
            ..defaults
        }
    }

    pub fn with_api_base(mut self, base: impl AsRef<str>) -> Self {
        self.api_base = normalize_api_base(base.as_ref()).to_string();
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into()).filter(|t: &String| !t.is_empty());
        self
    }

    pub fn with_image_base(mut self, base: impl Into<String>) -> Self {
        self.image_base = base.into();
        self
    }

    pub fn with_rom_base(mut self, base: impl Into<String>) -> Self {
        self.rom_base = base.into();
        self
    }

    pub fn with_emulator_base(mut self, base: impl Into<String>) -> Self {
        self.emulator_base = base.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn has_token(&self) -> bool {
        self.api_token.is_some()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("api_base", &self.api_base),
            ("rom_base", &self.rom_base),
            ("emulator_base", &self.emulator_base),
        ] {
            url::Url::parse(value).map_err(|e| format!("{name} {value:?} is not a URL: {e}"))?;
        }
        if self.request_timeout.is_zero() {
            return Err("request_timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_base", &self.api_base)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("image_base", &self.image_base)
            .field("rom_base", &self.rom_base)
            .field("emulator_base", &self.emulator_base)
            .field("request_timeout", &self.request_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
