use std::env;

use crate::services::cache::ttl;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub node_env: String,

    // Cache
    /// Directory of the durable cache layer, empty to keep it in memory only
    pub cache_dir: String,
    pub cache_max_entries: usize,
    pub catalog_cache_ttl_ms: u64,

    // Players
    /// Overrides the default wrapping player's base URL
    pub default_player_url: Option<String>,
    /// Base64 Apple-CMS player blobs registered on top of the built-ins
    pub apple_cms_players: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3001,
            node_env: "development".to_string(),
            cache_dir: ".play-cache".to_string(),
            cache_max_entries: 1000,
            catalog_cache_ttl_ms: ttl::LONG, // 12 hours
            default_player_url: None,
            apple_cms_players: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Apply overrides from `lookup` on top of the defaults
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            // Server
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            node_env: lookup("NODE_ENV").unwrap_or(defaults.node_env),

            // Cache
            cache_dir: lookup("CACHE_DIR").unwrap_or(defaults.cache_dir),
            cache_max_entries: lookup("CACHE_MAX_ENTRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_max_entries),
            catalog_cache_ttl_ms: lookup("CATALOG_CACHE_TTL_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.catalog_cache_ttl_ms),

            // Players
            default_player_url: lookup("DEFAULT_PLAYER_URL").filter(|v| !v.trim().is_empty()),
            apple_cms_players: lookup("APPLE_CMS_PLAYERS")
                .map(|v| {
                    v.split(',')
                        .map(|blob| blob.trim().to_string())
                        .filter(|blob| !blob.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.apple_cms_players),
        }
    }
}
