//! Test configuration helpers for loading .env credentials

use acquire_bridge::{NzbGetConfig, TorrentzConfig};
use std::time::Duration;

/// Error type for test configuration
#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// NZBGet config pointing at a mock server address such as `127.0.0.1:4567`
pub fn mock_nzbget_config(host: &str) -> NzbGetConfig {
    NzbGetConfig {
        host: Some(host.to_string()),
        category: "tv".to_string(),
        category_backlog: "tv-backlog".to_string(),
        category_anime: "anime".to_string(),
        category_anime_backlog: "anime-backlog".to_string(),
        priority: 100,
        timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

/// Feed config pointing at a mock server base URL
pub fn mock_torrentz_config(base_url: &str) -> TorrentzConfig {
    TorrentzConfig {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

/// Load NZBGet configuration from environment variables
///
/// Required environment variables:
/// - `NZBGET_HOST` - Host, optionally with port (e.g. localhost:6789)
///
/// Optional environment variables:
/// - `NZBGET_USERNAME` - RPC username (default: nzbget)
/// - `NZBGET_PASSWORD` - RPC password (default: tegbzn6789)
/// - `NZBGET_HTTPS` - Set to `1` or `true` to use https
/// - `NZBGET_CATEGORY` - Category for test jobs (default: tv)
pub fn load_nzbget_config() -> Result<NzbGetConfig, ConfigError> {
    dotenvy::dotenv().ok();

    let host = std::env::var("NZBGET_HOST")
        .map_err(|_| ConfigError("NZBGET_HOST not set in environment".to_string()))?;

    let mut config = NzbGetConfig {
        host: Some(host),
        ..Default::default()
    };

    if let Ok(username) = std::env::var("NZBGET_USERNAME") {
        config.username = username;
    }
    if let Ok(password) = std::env::var("NZBGET_PASSWORD") {
        config.password = password;
    }
    config.use_https = std::env::var("NZBGET_HTTPS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if let Ok(category) = std::env::var("NZBGET_CATEGORY") {
        config.category = category.clone();
        config.category_backlog = category;
    }

    Ok(config)
}

/// Check if live NZBGet credentials are available
pub fn has_live_nzbget() -> bool {
    load_nzbget_config().is_ok()
}
