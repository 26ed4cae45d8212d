//! URL helpers for the API base, images and ROM archives

use crate::types::Game;

/// True for `http://`, `https://` and protocol-relative `//` URLs
pub fn is_absolute_url(path: &str) -> bool {
    let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

/// Strip trailing slashes from an API base URL
pub fn normalize_api_base(base: &str) -> &str {
    base.trim_end_matches('/')
}

/// Root of the API routes below `base`
///
/// Routes live under `/api`; a base that already ends in `/api` is used as is.
pub fn api_root(base: &str) -> String {
    let base = normalize_api_base(base);
    if base.ends_with("/api") {
        base.to_string()
    } else {
        format!("{base}/api")
    }
}

/// Proxy rule target forwarding every `/api/**` route to `base`
pub fn proxy_target(base: &str) -> String {
    format!("{}/**", api_root(base))
}

/// Resolve an image path against `base`
///
/// Empty paths give an empty string and absolute URLs pass through.
pub fn build_image_url(base: &str, path: Option<&str>) -> String {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return String::new();
    };
    if is_absolute_url(path) || base.is_empty() {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Archive URL of a game's ROM, if the catalog has one
///
/// `game_binary_file` wins over `binary_file`. Relative paths may carry a
/// leading `files/` segment that the ROM base already includes.
pub fn rom_source_url(rom_base: &str, game: &Game) -> Option<String> {
    let path = game
        .game_binary_file
        .as_deref()
        .filter(|p| !p.is_empty())
        .or_else(|| Some(game.binary_file.as_str()).filter(|p| !p.is_empty()))?;

    if is_absolute_url(path) {
        return Some(path.to_string());
    }

    let path = path.trim_start_matches('/');
    let path = match path.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("files/") => &path[6..],
        _ => path,
    };
    Some(format!("{}/{path}", rom_base.trim_end_matches('/')))
}
