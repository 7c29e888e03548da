use regex::Regex;
use rtex_extractor_api::url::Url;
use rtex_extractor_api::{ExtractionError, Result};

/// The `id` group of `valid_url` in `url`.
pub fn match_id(valid_url: &Regex, url: &Url) -> Result<String> {
    valid_url
        .captures(url.as_str())
        .and_then(|c| c.name("id"))
        .map(|id| id.as_str().to_string())
        .ok_or_else(|| ExtractionError::UnsupportedUrl(url.to_string()))
}

/// `server` and `path` as the feeds split them, glued back together.
pub fn join_server(server: &str, path: &str) -> String {
    format!("{server}{path}")
}
