//! Contract with the external emulator runtime
//!
//! The runtime is third-party code. Everything it needs to boot a game is
//! passed in one [`RuntimeConfig`] value to [`EmulatorRuntime::start`],
//! together with a [`GameStartSignal`] the runtime fires once playback
//! begins.

use crate::error::RuntimeError;
use crate::handle::PlayableHandle;
use crate::platform::core_for_system;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Boot parameters handed to the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Selector of the element the player mounts into
    pub player_selector: String,
    /// Handle URL of the ROM
    pub game_url: String,
    /// Core code, see [`core_for_system`]
    pub core: String,
    /// Base path the runtime loads its own assets from
    pub asset_base_path: String,
    pub start_on_load: bool,
    /// Identifier the runtime uses to namespace save states
    pub game_id: Option<String>,
    pub fullscreen_on_load: bool,
}

impl RuntimeConfig {
    pub fn new(
        game_id: &str,
        handle: &PlayableHandle,
        system: &str,
        asset_base_path: impl Into<String>,
    ) -> Self {
        Self {
            player_selector: format!("#emulator-{game_id}"),
            game_url: handle.url().to_string(),
            core: core_for_system(system).to_string(),
            asset_base_path: asset_base_path.into(),
            start_on_load: true,
            game_id: Some(game_id.to_string()),
            fullscreen_on_load: false,
        }
    }

    pub fn with_player_selector(mut self, selector: impl Into<String>) -> Self {
        self.player_selector = selector.into();
        self
    }

    pub fn with_fullscreen_on_load(mut self, fullscreen: bool) -> Self {
        self.fullscreen_on_load = fullscreen;
        self
    }
}

/// Completion callback fired by the runtime when the game starts
#[derive(Debug)]
pub struct GameStartSignal {
    tx: oneshot::Sender<()>,
}

impl GameStartSignal {
    pub fn fire(self) {
        // Receiver gone means the session was torn down first
        let _ = self.tx.send(());
    }
}

/// Receiving side of a [`GameStartSignal`]
pub type GameStarted = oneshot::Receiver<()>;

/// Create a linked start signal and its receiver
pub fn game_start_channel() -> (GameStartSignal, GameStarted) {
    let (tx, rx) = oneshot::channel();
    (GameStartSignal { tx }, rx)
}

/// External emulator runtime
#[async_trait]
pub trait EmulatorRuntime: Send + Sync {
    /// Boot the runtime; `on_start` must be fired once playback begins.
    async fn start(&self, config: RuntimeConfig, on_start: GameStartSignal)
    -> Result<(), RuntimeError>;

    /// Stop playback and close the runtime's connections.
    async fn stop(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::HandleRegistry;
    use bytes::Bytes;

    #[test]
    fn test_config_from_handle() {
        let registry = HandleRegistry::new();
        let handle = registry.create(Bytes::from_static(b"rom"));

        let config = RuntimeConfig::new("42", &handle, "Genesis", "https://cdn.example/data");

        assert_eq!(config.player_selector, "#emulator-42");
        assert_eq!(config.game_url, handle.url());
        assert_eq!(config.core, "segaMD");
        assert_eq!(config.asset_base_path, "https://cdn.example/data");
        assert!(config.start_on_load);
        assert_eq!(config.game_id.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_start_signal() {
        let (signal, started) = game_start_channel();
        signal.fire();
        assert!(started.await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_signal_is_observable() {
        let (signal, started) = game_start_channel();
        drop(signal);
        assert!(started.await.is_err());
    }
}
