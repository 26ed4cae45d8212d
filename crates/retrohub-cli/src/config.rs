//! Command-line configuration.
//!
//! Every global flag can also be set through the environment, using the
//! same variable names the libraries read (`RETROHUB_*` for the cache,
//! `NES_*` for the catalog deployment).

use clap::{ArgAction, Parser, Subcommand};
use retrohub_api::ApiConfig;
use retrohub_api::config::{
    DEFAULT_API_BASE, DEFAULT_EMULATOR_BASE, DEFAULT_IMAGE_BASE, DEFAULT_ROM_BASE,
};
use retrohub_cache::{DEFAULT_NAMESPACE, StoreConfig};
use retrohub_loader::LoaderConfig;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "retrohub",
    about = "Fetch, cache and inspect RetroHub ROMs",
    version
)]
pub struct Cli {
    /// Directory of the ROM cache
    #[arg(
        long,
        global = true,
        env = "RETROHUB_CACHE_DIR",
        default_value = "./retrohub-cache"
    )]
    pub cache_dir: PathBuf,

    /// Cache namespace (collection name)
    #[arg(long, global = true, env = "RETROHUB_CACHE_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Catalog API base URL
    #[arg(long, global = true, env = "NES_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Static token for user-scoped API routes
    #[arg(long, global = true, env = "NES_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Base URL that relative cover image paths resolve against
    #[arg(long, global = true, env = "NES_IMAGE_BASE", default_value = DEFAULT_IMAGE_BASE)]
    pub image_base: String,

    /// Base URL that relative ROM paths resolve against
    #[arg(long, global = true, env = "NES_ROM_BASE", default_value = DEFAULT_ROM_BASE)]
    pub rom_base: String,

    /// Emulator runtime data directory the loader and engine scripts live in
    #[arg(long, global = true, env = "NES_EMULATOR_BASE", default_value = DEFAULT_EMULATOR_BASE)]
    pub emulator_base: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Acquire the ROM inside an archive URL
    Fetch {
        url: String,
        /// Write the ROM here instead of the current directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Accept payloads that are a bare ROM rather than a ZIP archive
        #[arg(long)]
        raw: bool,
    },
    /// Look a game up in the catalog and acquire its ROM
    Resolve {
        game_id: i64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Inspect or modify the ROM cache
    #[command(subcommand)]
    Cache(CacheCommand),
    /// Print the emulator core for a system name
    Core { system: String },
    /// Browse the catalog
    #[command(subcommand)]
    Games(GamesCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum CacheCommand {
    /// List cached keys
    List,
    /// Remove one cached entry
    Remove { key: String },
    /// Remove every cached entry
    Clear,
    /// Show entry count and location
    Stats,
}

#[derive(Debug, Clone, Subcommand)]
pub enum GamesCommand {
    /// List system types
    Types,
    /// Recommended games
    Recommend {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Most played games
    Ranking {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Search by title
    Search { title: String },
    /// Show one game with its ROM URL
    Show { id: i64 },
}

impl Cli {
    /// Parse configuration from command-line arguments.
    pub fn from_args() -> Self {
        Self::parse()
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.cache_dir).with_namespace(self.namespace.clone())
    }

    pub fn api_config(&self) -> ApiConfig {
        let config = ApiConfig::default()
            .with_api_base(&self.api_base)
            .with_image_base(self.image_base.clone())
            .with_rom_base(self.rom_base.clone())
            .with_emulator_base(self.emulator_base.clone());
        match &self.api_token {
            Some(token) => config.with_api_token(token.clone()),
            None => config,
        }
    }

    pub fn loader_config(&self, accept_raw_rom: bool) -> LoaderConfig {
        let config = LoaderConfig::from_env();
        let accept = config.accept_raw_rom || accept_raw_rom;
        config.with_accept_raw_rom(accept)
    }

    /// Default log filter for the verbosity level
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
