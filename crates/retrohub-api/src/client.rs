//! Catalog API client
//!
//! Every endpoint answers with an [`ApiResponse`] envelope. Catalog routes
//! are public; user routes (favorites, history, saves) carry the configured
//! static token as a raw `Authorization` header.

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::types::{
    ApiResponse, FavoritePayload, FavoriteStatus, Game, GameHistoryEntry, GameSave, GamesByTypeQuery,
    GamesPage, HistoryPayload, SavePayload, SaveUpload,
};
use crate::urls::api_root;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_RECOMMEND_LIMIT: u32 = 12;
pub const DEFAULT_RANKING_LIMIT: u32 = 10;
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Whether a route needs the user's credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Public,
    User,
}

/// Client for the game catalog and user data endpoints
#[derive(Clone)]
pub struct RetroApi {
    client: Arc<Client>,
    root: String,
    token: Option<String>,
}

impl RetroApi {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        // Install ring crypto provider for reqwest (idempotent)
        let _ = rustls::crypto::ring::default_provider().install_default();

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(std::time::Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            root: api_root(&config.api_base),
            token: config.api_token.clone(),
        })
    }

    /// Root URL all routes are resolved against
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub async fn fetch_types(&self) -> ApiResult<Vec<String>> {
        self.get("/games/types", &[], Scope::Public).await
    }

    pub async fn fetch_recommend(&self, limit: Option<u32>) -> ApiResult<Vec<Game>> {
        let limit = limit.unwrap_or(DEFAULT_RECOMMEND_LIMIT);
        self.get("/games/recommend", &[("limit", limit.to_string())], Scope::Public)
            .await
    }

    pub async fn fetch_ranking(&self, limit: Option<u32>) -> ApiResult<Vec<Game>> {
        let limit = limit.unwrap_or(DEFAULT_RANKING_LIMIT);
        self.get("/games/ranking", &[("limit", limit.to_string())], Scope::Public)
            .await
    }

    pub async fn fetch_game_by_id(&self, id: i64) -> ApiResult<Game> {
        self.get(&format!("/games/{id}"), &[], Scope::Public).await
    }

    pub async fn fetch_games_by_type(&self, query: &GamesByTypeQuery) -> ApiResult<GamesPage> {
        self.get("/games/type", &query.query_pairs(), Scope::Public)
            .await
    }

    pub async fn search_by_title(&self, title: &str) -> ApiResult<Vec<Game>> {
        self.get("/games/search", &[("title", title.to_string())], Scope::Public)
            .await
    }

    pub async fn fetch_favorites(&self) -> ApiResult<Vec<Game>> {
        self.get("/user/favorites", &[], Scope::User).await
    }

    pub async fn add_favorite(&self, payload: &FavoritePayload) -> ApiResult<()> {
        let request = self.json(Method::POST, "/user/favorites", payload)?;
        self.execute(request).await
    }

    pub async fn remove_favorite(&self, game_id: i64) -> ApiResult<()> {
        let request = self.request(
            Method::DELETE,
            &format!("/user/favorites/{game_id}"),
            &[],
            Scope::User,
        )?;
        self.execute(request).await
    }

    pub async fn check_favorite(&self, game_id: i64) -> ApiResult<FavoriteStatus> {
        self.get(&format!("/user/favorites/{game_id}/check"), &[], Scope::User)
            .await
    }

    pub async fn fetch_history(&self, limit: Option<u32>) -> ApiResult<Vec<GameHistoryEntry>> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        self.get("/user/history", &[("limit", limit.to_string())], Scope::User)
            .await
    }

    pub async fn add_history(&self, payload: &HistoryPayload) -> ApiResult<()> {
        let request = self.json(Method::POST, "/user/history", payload)?;
        self.execute(request).await
    }

    pub async fn upload_save(&self, payload: SavePayload) -> ApiResult<SaveUpload> {
        let request = self
            .request(Method::POST, "/user/saves", &[], Scope::User)?
            .multipart(payload.into_form());
        self.execute(request).await
    }

    pub async fn fetch_save(&self, game_id: i64) -> ApiResult<GameSave> {
        self.get(&format!("/user/saves/{game_id}"), &[], Scope::User)
            .await
    }

    pub async fn fetch_all_saves(&self) -> ApiResult<Vec<GameSave>> {
        self.get("/user/saves", &[], Scope::User).await
    }

    pub async fn delete_save(&self, game_id: i64) -> ApiResult<()> {
        let request = self.request(
            Method::DELETE,
            &format!("/user/saves/{game_id}"),
            &[],
            Scope::User,
        )?;
        self.execute(request).await
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Url> {
        let mut url = Url::parse(&format!("{}{path}", self.root))
            .map_err(|e| ApiError::InvalidEndpoint(format!("{path}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        scope: Scope,
    ) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(path, query)?;
        let mut request = self.client.request(method, url);
        if scope == Scope::User
            && let Some(token) = &self.token
        {
            request = request.header(AUTHORIZATION, token.as_str());
        }
        Ok(request)
    }

    fn json<T: Serialize>(&self, method: Method, path: &str, body: &T) -> ApiResult<RequestBuilder> {
        Ok(self
            .request(method, path, &[], Scope::User)?
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(body)?))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        scope: Scope,
    ) -> ApiResult<T> {
        let request = self.request(Method::GET, path, query, scope)?;
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await?;
        let status = response.status();
        debug!(url = %response.url(), %status, "API response");

        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %response.url(), "API rejected credentials");
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status));
        }

        let body = response.bytes().await?;
        let envelope: ApiResponse<Value> = serde_json::from_slice(&body)?;
        envelope.into_data()
    }
}

impl std::fmt::Debug for RetroApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetroApi")
            .field("root", &self.root)
            .field("has_token", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn api(base: &str) -> RetroApi {
        RetroApi::new(&ApiConfig::default().with_api_base(base)).unwrap()
    }

    #[test]
    fn test_root_follows_proxy_rule() {
        assert_eq!(api("http://localhost:8080/").root(), "http://localhost:8080/api");
        assert_eq!(api("https://host/api").root(), "https://host/api");
    }

    #[test]
    fn test_endpoint_query_encoding() {
        let url = api("http://localhost:8080")
            .endpoint("/games/search", &[("title", "Mario & Luigi".to_string())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/games/search?title=Mario+%26+Luigi"
        );
    }
}
