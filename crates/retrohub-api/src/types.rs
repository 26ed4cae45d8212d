//! Wire types of the catalog API
//!
//! Every response is wrapped in an [`ApiResponse`] envelope. A `code` of 0
//! carries the payload in `data`; anything else is an error, with 401
//! meaning the caller is not signed in.

use crate::error::{ApiError, ApiResult, DEFAULT_ERROR_MESSAGE};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope code for success
pub const CODE_OK: i64 = 0;
/// Envelope code for a missing or rejected login
pub const CODE_UNAUTHORIZED: i64 = 401;

/// Response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub msg: String,
}

impl ApiResponse<Value> {
    /// Unwrap the payload, turning non-zero codes into errors
    pub fn into_data<T: DeserializeOwned>(self) -> ApiResult<T> {
        match self.code {
            CODE_OK => Ok(serde_json::from_value(self.data.unwrap_or(Value::Null))?),
            CODE_UNAUTHORIZED => Err(ApiError::Unauthorized),
            code => Err(ApiError::Api {
                code,
                message: if self.msg.is_empty() {
                    DEFAULT_ERROR_MESSAGE.to_string()
                } else {
                    self.msg
                },
            }),
        }
    }
}

/// Catalog entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: i64,
    pub title: String,
    /// Catalog system name, e.g. `nes` or `genesis`
    #[serde(rename = "type")]
    pub game_type: String,
    #[serde(default)]
    pub binary_file: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_screen_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_screen_image1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_uid: Option<String>,
    /// Preferred over `binary_file` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_binary_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamesPage {
    pub games: Vec<Game>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritePayload {
    pub game_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPayload {
    pub game_id: i64,
    pub play_time: String,
}

/// Save file upload, sent as a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePayload {
    pub game_id: i64,
    pub file_name: String,
    pub data: Bytes,
}

impl SavePayload {
    pub fn new(game_id: i64, file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            game_id,
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    pub(crate) fn into_form(self) -> reqwest::multipart::Form {
        let part = reqwest::multipart::Part::bytes(self.data.to_vec()).file_name(self.file_name);
        reqwest::multipart::Form::new()
            .text("game_id", self.game_id.to_string())
            .part("file", part)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSave {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub game_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_image: Option<String>,
    pub save_file: String,
    pub create_time: String,
    pub update_time: String,
}

/// Play history entry: a game plus when it was played
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHistoryEntry {
    #[serde(flatten)]
    pub game: Game,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteStatus {
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveUpload {
    pub save_url: String,
}

/// Filter for [`RetroApi::fetch_games_by_type`](crate::RetroApi::fetch_games_by_type)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamesByTypeQuery {
    pub game_type: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub language: Option<String>,
}

impl GamesByTypeQuery {
    pub fn new(game_type: impl Into<String>) -> Self {
        Self {
            game_type: game_type.into(),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, page: u32, page_size: u32) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("type", self.game_type.clone())];
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(("page_size", page_size.to_string()));
        }
        if let Some(language) = &self.language {
            pairs.push(("language", language.clone()));
        }
        pairs
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn envelope(value: Value) -> ApiResponse<Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_envelope_success() {
        let types: Vec<String> = envelope(json!({"code": 0, "data": ["nes", "snes"], "msg": "ok"}))
            .into_data()
            .unwrap();
        assert_eq!(types, vec!["nes", "snes"]);
    }

    #[test]
    fn test_envelope_null_data_for_unit() {
        let () = envelope(json!({"code": 0, "data": null}))
            .into_data()
            .unwrap();
        let () = envelope(json!({"code": 0})).into_data().unwrap();
    }

    #[test]
    fn test_envelope_errors() {
        let err = envelope(json!({"code": 401, "data": null, "msg": "login"}))
            .into_data::<Value>()
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));

        let err = envelope(json!({"code": 7, "msg": ""}))
            .into_data::<Value>()
            .unwrap_err();
        assert_eq!(err.to_string(), "API error 7: request failed");

        let err = envelope(json!({"code": 7, "msg": "bad page"}))
            .into_data::<Value>()
            .unwrap_err();
        assert_eq!(err.to_string(), "API error 7: bad page");
    }

    #[test]
    fn test_game_field_names() {
        let game: Game = serde_json::from_value(json!({
            "game_id": 12,
            "title": "Contra",
            "type": "nes",
            "binary_file": "files/nes/contra.zip",
            "region": "JP",
            "language": "en",
            "click_count": 99
        }))
        .unwrap();

        assert_eq!(game.game_type, "nes");
        assert_eq!(game.click_count, Some(99));
        assert_eq!(game.game_binary_file, None);
    }

    #[test]
    fn test_history_entry_is_flat() {
        let entry: GameHistoryEntry = serde_json::from_value(json!({
            "game_id": 3,
            "title": "Tetris",
            "type": "gb",
            "play_time": "2024-05-01 10:00:00"
        }))
        .unwrap();

        assert_eq!(entry.game.title, "Tetris");
        assert_eq!(entry.play_time.as_deref(), Some("2024-05-01 10:00:00"));
    }

    #[test]
    fn test_games_by_type_query() {
        let query = GamesByTypeQuery::new("snes")
            .with_page(2, 24)
            .with_language("en");
        assert_eq!(
            query.query_pairs(),
            vec![
                ("type", "snes".to_string()),
                ("page", "2".to_string()),
                ("page_size", "24".to_string()),
                ("language", "en".to_string()),
            ]
        );
        assert_eq!(GamesByTypeQuery::new("nes").query_pairs().len(), 1);
    }
}
