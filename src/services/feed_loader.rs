//! Watchlist feed loading
//!
//! The feed is consumed as a JSON document from a local path or an HTTP(S)
//! URL. Retry/backoff around flaky feed hosts belongs to the outer
//! scheduler, not here: one GET, one parse.

use std::time::Duration;

use tracing::info;

use crate::error::{Error, Result};
use crate::models::Feed;

/// Parse a feed document from raw JSON text
pub fn parse_feed(text: &str) -> Result<Feed> {
    serde_json::from_str(text).map_err(|e| Error::Feed(format!("Invalid feed JSON: {}", e)))
}

/// Fetch and parse the feed from a local path or URL
pub async fn fetch_feed(path_or_url: &str) -> Result<Feed> {
    let text = if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
        info!(url = path_or_url, "Fetching feed");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let response = client.get(path_or_url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Feed(format!(
                "Feed request returned status {}",
                response.status()
            )));
        }
        response.text().await?
    } else {
        info!(path = path_or_url, "Reading feed file");
        std::fs::read_to_string(path_or_url)
            .map_err(|e| Error::Feed(format!("Failed to read {}: {}", path_or_url, e)))?
    };

    parse_feed(&text)
}
