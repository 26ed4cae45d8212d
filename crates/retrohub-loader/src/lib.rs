//! # retrohub-loader - ROM acquisition and emulator boot
//!
//! Turns a catalog entry into a running game:
//!
//! 1. **Acquisition** ([`RomLoader`]): download a ROM archive, extract the
//!    first ROM image and cache it in a [`ByteStore`](retrohub_cache::ByteStore)
//!    keyed by the archive's file name
//! 2. **Handles** ([`HandleRegistry`]): expose the bytes under a short-lived
//!    URL that the emulator runtime dereferences
//! 3. **Runtime handoff** ([`EmulatorRuntime`], [`ModuleLoader`]): load the
//!    runtime's loader and engine modules in order and start it with an
//!    explicit [`RuntimeConfig`]
//! 4. **Sessions** ([`PlaySession`]): run the above as one cancellable task
//!    with observable state and exactly-once handle release
//!
//! ## Example
//!
//! ```rust,no_run
//! use retrohub_cache::{DiskStore, StoreConfig};
//! use retrohub_loader::{LoaderConfig, RomLoader};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(DiskStore::open(StoreConfig::default())?);
//! let loader = RomLoader::new(LoaderConfig::default(), store)?;
//!
//! let rom = loader.acquire("https://roms.example/files/nes/contra.zip").await?;
//! println!("{} bytes", rom.len());
//! # Ok(())
//! # }
//! ```

#![allow(clippy::return_self_not_must_use)] // Builder patterns

pub mod archive;
pub mod config;
pub mod error;
pub mod handle;
pub mod loader;
pub mod modules;
pub mod platform;
pub mod runtime;
pub mod session;
pub mod transport;

pub use archive::{ExtractedRom, ROM_EXTENSIONS, extract_rom, is_rom_file};
pub use config::{HttpConfig, LoaderConfig};
pub use error::{
    AcquisitionError, ArchiveError, FetchError, LoadError, RuntimeError, ScriptLoadError,
};
pub use handle::{HandleRegistry, PlayableHandle};
pub use loader::{AcquiredRom, RomLoader, RomSource};
pub use modules::{EmulatorModules, ExternalModule, HttpModuleHost, ModuleHost, ModuleLoader};
pub use platform::{DEFAULT_CORE, core_for_system};
pub use runtime::{EmulatorRuntime, GameStartSignal, GameStarted, RuntimeConfig, game_start_channel};
pub use session::{PlaySession, SessionConfig, SessionHandle, SessionState};
pub use transport::HttpClient;
