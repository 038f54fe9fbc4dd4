//! Configuration types for acquire-bridge
//!
//! The host application owns configuration loading; these structs only
//! describe what the adapters read. Every field has a serde default so a
//! partial JSON document (or `Config::default()`) is always usable.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration for both adapters
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// NZBGet dispatch endpoint
    #[serde(default)]
    pub nzbget: NzbGetConfig,

    /// Torrent feed search endpoint
    #[serde(default)]
    pub torrentz: TorrentzConfig,
}

impl Config {
    /// Parse configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the configuration for values the adapters cannot work with
    ///
    /// Dispatch also checks for a missing host on every call, so skipping
    /// validation never causes network I/O against an empty host.
    pub fn validate(&self) -> Result<()> {
        self.nzbget.validate()?;
        self.torrentz.validate()
    }
}

/// NZBGet endpoint configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NzbGetConfig {
    /// Hostname, optionally with `:port` (e.g. "localhost:6789")
    #[serde(default)]
    pub host: Option<String>,

    /// Port, appended to `host` when set
    #[serde(default)]
    pub port: Option<u16>,

    /// RPC username (default: "nzbget")
    #[serde(default = "default_nzbget_username")]
    pub username: String,

    /// RPC password (default: "tegbzn6789")
    #[serde(default = "default_nzbget_password")]
    pub password: String,

    /// Use https instead of http
    #[serde(default)]
    pub use_https: bool,

    /// Category for recently aired episodes (default: "tv")
    #[serde(default = "default_category")]
    pub category: String,

    /// Category for backlog episodes (default: "tv")
    #[serde(default = "default_category")]
    pub category_backlog: String,

    /// Category for recently aired anime (default: "anime")
    #[serde(default = "default_anime_category")]
    pub category_anime: String,

    /// Category for backlog anime (default: "anime")
    #[serde(default = "default_anime_category")]
    pub category_anime_backlog: String,

    /// Queue priority sent with recently aired jobs (default: 100)
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for NzbGetConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            username: default_nzbget_username(),
            password: default_nzbget_password(),
            use_https: false,
            category: default_category(),
            category_backlog: default_category(),
            category_anime: default_anime_category(),
            category_anime_backlog: default_anime_category(),
            priority: default_priority(),
            timeout: default_timeout(),
        }
    }
}

impl NzbGetConfig {
    /// URL scheme derived from `use_https`
    pub fn scheme(&self) -> &'static str {
        if self.use_https { "https" } else { "http" }
    }

    /// Configured host, treating a blank string as absent
    pub fn host(&self) -> Option<&str> {
        self.host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
    }

    fn validate(&self) -> Result<()> {
        if self.host().is_none() {
            return Err(Error::config(
                "No NZBGet host found in configuration",
                "nzbget.host",
            ));
        }

        let categories = [
            ("nzbget.category", &self.category),
            ("nzbget.category_backlog", &self.category_backlog),
            ("nzbget.category_anime", &self.category_anime),
            ("nzbget.category_anime_backlog", &self.category_anime_backlog),
        ];
        for (key, value) in categories {
            if value.trim().is_empty() {
                return Err(Error::config("category name must not be blank", key));
            }
        }

        Ok(())
    }
}

/// Torrent feed configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TorrentzConfig {
    /// Base URL of the feed mirror (default: "https://torrentz2.eu")
    #[serde(default = "default_torrentz_base_url")]
    pub base_url: String,

    /// Query the verified-only feed
    #[serde(default)]
    pub verified_only: bool,

    /// Category text an entry must mention, when it has a category (default: "tv")
    #[serde(default = "default_category")]
    pub category_filter: String,

    /// Drop records with fewer seeders than this
    #[serde(default)]
    pub min_seeders: Option<u32>,

    /// Drop records with fewer leechers than this
    #[serde(default)]
    pub min_leechers: Option<u32>,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with feed requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for TorrentzConfig {
    fn default() -> Self {
        Self {
            base_url: default_torrentz_base_url(),
            verified_only: false,
            category_filter: default_category(),
            min_seeders: None,
            min_leechers: None,
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl TorrentzConfig {
    /// Full feed URL, without the query string
    pub fn feed_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.verified_only {
            format!("{}/feed_verified", base)
        } else {
            format!("{}/feed", base)
        }
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url).map_err(|e| {
            Error::config(
                format!("invalid base URL '{}': {}", self.base_url, e),
                "torrentz.base_url",
            )
        })?;
        Ok(())
    }
}

// Default value functions
fn default_nzbget_username() -> String {
    "nzbget".to_string()
}

fn default_nzbget_password() -> String {
    "tegbzn6789".to_string()
}

fn default_category() -> String {
    "tv".to_string()
}

fn default_anime_category() -> String {
    "anime".to_string()
}

fn default_priority() -> i32 {
    100
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_torrentz_base_url() -> String {
    "https://torrentz2.eu".to_string()
}

fn default_user_agent() -> String {
    crate::utils::USER_AGENT.to_string()
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
