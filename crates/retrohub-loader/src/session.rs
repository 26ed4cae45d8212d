//! Play session orchestration
//!
//! A session drives one game from ROM URL to a running emulator:
//! acquire the ROM, register a playable handle, load the runtime modules in
//! order, start the runtime and wait for its start signal. The boot runs in
//! a tokio task; [`SessionHandle`] observes its [`SessionState`] and tears it
//! down.
//!
//! Teardown cancels a boot still in flight, stops the runtime if it was
//! started, releases its modules and drops the playable handle. The handle is
//! owned by the session task, so it is released exactly once when it was
//! created and never when the boot ended before creating it.
//!
//! Sessions may share one [`ModuleLoader`]. Teardown releases only the
//! modules its own boot registered, and the loader unloads a script once the
//! last session holding it is gone.

use crate::error::{LoadError, RuntimeError};
use crate::handle::{HandleRegistry, PlayableHandle};
use crate::loader::RomLoader;
use crate::modules::{EmulatorModules, ModuleLoader};
use crate::runtime::{EmulatorRuntime, RuntimeConfig, game_start_channel};
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Per-game session parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub game_id: String,
    /// Archive URL; empty means the catalog has no binary for the game
    pub rom_url: String,
    /// Catalog system name, mapped to a runtime core
    pub system: String,
    /// Base path of the runtime's own assets and modules
    pub emulator_base: String,
    /// Overrides the default `#emulator-<game_id>` selector
    pub player_selector: Option<String>,
    pub fullscreen_on_load: bool,
}

impl SessionConfig {
    pub fn new(
        game_id: impl Into<String>,
        rom_url: impl Into<String>,
        system: impl Into<String>,
        emulator_base: impl Into<String>,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            rom_url: rom_url.into(),
            system: system.into(),
            emulator_base: emulator_base.into(),
            player_selector: None,
            fullscreen_on_load: false,
        }
    }

    pub fn with_player_selector(mut self, selector: impl Into<String>) -> Self {
        self.player_selector = Some(selector.into());
        self
    }

    pub fn with_fullscreen_on_load(mut self, fullscreen: bool) -> Self {
        self.fullscreen_on_load = fullscreen;
        self
    }
}

/// Observable state of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Playing,
    /// Boot failed; carries the user-visible message
    Failed(String),
    TornDown,
}

impl SessionState {
    /// True once the session will not change state again before teardown
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// Shared collaborators of all sessions
#[derive(Clone)]
pub struct PlaySession {
    loader: RomLoader,
    modules: Arc<ModuleLoader>,
    runtime: Arc<dyn EmulatorRuntime>,
    handles: Arc<HandleRegistry>,
}

impl PlaySession {
    pub fn new(
        loader: RomLoader,
        modules: Arc<ModuleLoader>,
        runtime: Arc<dyn EmulatorRuntime>,
        handles: Arc<HandleRegistry>,
    ) -> Self {
        Self {
            loader,
            modules,
            runtime,
            handles,
        }
    }

    pub fn handles(&self) -> &Arc<HandleRegistry> {
        &self.handles
    }

    /// Spawn the boot sequence for one game
    pub fn start(&self, config: SessionConfig) -> SessionHandle {
        let (state_tx, state_rx) = watch::channel(SessionState::Loading);
        let (cancel_tx, cancel_rx) = oneshot::channel();

        info!(game_id = %config.game_id, system = %config.system, "starting play session");
        let task = tokio::spawn(run(self.clone(), config, state_tx, cancel_rx));

        SessionHandle {
            state: state_rx,
            cancel: Some(cancel_tx),
            task: Some(task),
        }
    }
}

/// Owner side of a running session
///
/// Dropping the handle without calling [`teardown`](Self::teardown) still
/// tears the session down in the background.
#[derive(Debug)]
pub struct SessionHandle {
    state: watch::Receiver<SessionState>,
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Wait until the state satisfies `predicate`
    ///
    /// Returns the last state when the session ends without matching.
    pub async fn wait_for(&self, mut predicate: impl FnMut(&SessionState) -> bool) -> SessionState {
        let mut rx = self.state.clone();
        let matched = rx
            .wait_for(|state| predicate(state))
            .await
            .map(|state| state.clone());
        matched.unwrap_or_else(|_| rx.borrow().clone())
    }

    /// Wait until the boot has either succeeded or failed
    pub async fn settled(&self) -> SessionState {
        self.wait_for(SessionState::is_settled).await
    }

    /// Cancel or stop the session and release everything it holds
    pub async fn teardown(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "play session task ended abnormally");
        }
    }
}

async fn run(
    session: PlaySession,
    config: SessionConfig,
    state: watch::Sender<SessionState>,
    mut cancel: oneshot::Receiver<()>,
) {
    let mut handle = None;
    let mut modules = Vec::new();
    let mut runtime_started = false;

    let outcome = tokio::select! {
        result = boot(&session, &config, &mut handle, &mut modules, &mut runtime_started) => {
            Some(result)
        }
        _ = &mut cancel => None,
    };

    match outcome {
        Some(Ok(())) => {
            info!(game_id = %config.game_id, "game started");
            state.send_replace(SessionState::Playing);
            let _ = cancel.await;
        }
        Some(Err(e)) => {
            warn!(game_id = %config.game_id, error = %e, "play session failed");
            state.send_replace(SessionState::Failed(e.to_string()));
            let _ = cancel.await;
        }
        None => debug!(game_id = %config.game_id, "boot cancelled by teardown"),
    }

    if runtime_started {
        session.runtime.stop().await;
    }
    for id in modules.iter().rev() {
        session.modules.release(id).await;
    }
    drop(handle);

    info!(game_id = %config.game_id, "play session torn down");
    state.send_replace(SessionState::TornDown);
}

async fn boot(
    session: &PlaySession,
    config: &SessionConfig,
    handle: &mut Option<PlayableHandle>,
    acquired_modules: &mut Vec<String>,
    runtime_started: &mut bool,
) -> Result<(), LoadError> {
    if config.rom_url.trim().is_empty() {
        return Err(LoadError::MissingRomUrl);
    }

    let bytes = session.loader.acquire(&config.rom_url).await?;
    let playable = handle.insert(session.handles.create(bytes));

    let mut runtime_config = RuntimeConfig::new(
        &config.game_id,
        playable,
        &config.system,
        config.emulator_base.clone(),
    )
    .with_fullscreen_on_load(config.fullscreen_on_load);
    if let Some(selector) = &config.player_selector {
        runtime_config = runtime_config.with_player_selector(selector.clone());
    }

    let modules = EmulatorModules::new(&config.emulator_base);
    for module in modules.in_order() {
        session.modules.ensure_loaded(module).await?;
        acquired_modules.push(module.id.clone());
    }

    let (signal, started) = game_start_channel();
    *runtime_started = true;
    session.runtime.start(runtime_config, signal).await?;

    started
        .await
        .map_err(|_| RuntimeError("runtime stopped before the game started".to_string()))?;
    Ok(())
}
