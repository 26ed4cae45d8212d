//! # retrohub-api - RetroHub catalog client
//!
//! Typed access to the game catalog backend:
//!
//! - [`RetroApi`]: catalog and user endpoints with envelope unwrapping
//! - [`AuthState`]: identity provider and static token combined
//! - [`urls`]: API root, image and ROM URL resolution
//! - [`ApiConfig`]: deployment settings from `NES_*` environment variables
//!
//! ```rust,no_run
//! use retrohub_api::{ApiConfig, RetroApi, rom_source_url};
//!
//! # async fn example() -> Result<(), retrohub_api::ApiError> {
//! let config = ApiConfig::from_env();
//! let api = RetroApi::new(&config)?;
//!
//! for game in api.fetch_recommend(None).await? {
//!     println!("{} -> {:?}", game.title, rom_source_url(&config.rom_base, &game));
//! }
//! # Ok(())
//! # }
//! ```

#![allow(clippy::return_self_not_must_use)] // Builder patterns

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod types;
pub mod urls;

pub use auth::{
    AuthContext, AuthMethod, AuthState, IdentityStatus, IdentityUser, sign_in_redirect,
};
pub use client::RetroApi;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use types::{
    ApiResponse, FavoritePayload, FavoriteStatus, Game, GameHistoryEntry, GameSave,
    GamesByTypeQuery, GamesPage, HistoryPayload, SavePayload, SaveUpload,
};
pub use urls::{build_image_url, normalize_api_base, proxy_target, rom_source_url};
