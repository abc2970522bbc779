//! Configuration file parser for ~/.config/snack-tv/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning when the file
//! contains potential typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use url::Url;

use crate::feed::FeedQuery;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid base_url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

// ============================================================================
// Configuration
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Subreddit whose listings are browsed.
    pub subreddit: String,

    /// Listing API origin. HTTP is accepted so tests can point at a mock server.
    pub base_url: String,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Transport timeout per request, in seconds.
    pub request_timeout_secs: u64,

    /// Queries fetched in the background at startup, e.g. `"top-week"`, `"new"`.
    pub prewarm: Vec<String>,

    /// Display order for flair options. Unlisted flair sorts after these.
    pub flair_order: Vec<String>,

    /// Persist fetched listings to disk and restore them at startup.
    pub persist_cache: bool,

    /// Hours a persisted listing stays valid.
    pub cache_ttl_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subreddit: "mealtimevideos".to_string(),
            base_url: "https://www.reddit.com".to_string(),
            user_agent: concat!("snack-tv/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
            prewarm: [
                "top-hour",
                "top-day",
                "top-week",
                "top-month",
                "top-year",
                "new",
                "rising",
                "controversial",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            flair_order: [
                "5-7 Minutes",
                "7-10 Minutes",
                "10-15 Minutes",
                "15-30 Minutes",
                "30 Minutes Plus",
                "20%",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            persist_cache: true,
            cache_ttl_hours: 24,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 8] = [
        "subreddit",
        "base_url",
        "user_agent",
        "request_timeout_secs",
        "prewarm",
        "flair_order",
        "persist_cache",
        "cache_ttl_hours",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unparseable `base_url` → `Err(ConfigError::InvalidBaseUrl)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.base_url()?;
        tracing::info!(
            path = %path.display(),
            subreddit = %config.subreddit,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parsed `base_url`. Must be an http(s) URL that can carry a path.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: reason.to_string(),
        };
        let url = Url::parse(&self.base_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path"));
        }
        Ok(url)
    }

    /// Parsed pre-warm battery. Entries that don't parse are logged and dropped.
    pub fn prewarm_queries(&self) -> Vec<FeedQuery> {
        self.prewarm
            .iter()
            .filter_map(|s| match s.parse::<FeedQuery>() {
                Ok(q) => Some(q),
                Err(e) => {
                    tracing::warn!(entry = %s, error = %e, "Ignoring invalid prewarm entry");
                    None
                }
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
