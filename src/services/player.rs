//! Player URL resolution
//!
//! Decides what the embedding frame loads for a `(source, episode url)` pair.
//! Rules, first match wins:
//!
//! 1. pass-through sources (`jsyun`) hand the raw URL over
//! 2. segmented playlists (source name containing `m3u8`, or a URL ending in
//!    `.m3u8`) are wrapped by the source's player, or the default player
//! 3. anything else is played directly

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::Config;
use crate::models::{PlayerConfig, PlayerResolution, ResolutionPolicy};
use crate::services::metrics::PLAYER_RESOLVE_TOTAL;

/// Sources whose URLs are already suitable for the frame
const PASSTHROUGH_MARKERS: &[&str] = &["jsyun"];
const SEGMENTED_SOURCE_MARKER: &str = "m3u8";
const SEGMENTED_EXTENSION: &str = ".m3u8";

pub const JSJIEXI_PLAYER_URL: &str = "https://jsjiexi.com/play/?url=";
pub const DEFAULT_PLAYER_NAME: &str = "Default Player";

/// Percent-encode like JavaScript's `encodeURIComponent`
///
/// `urlencoding` escapes `!'()*` as well, those are restored afterwards.
/// Every `%` in the encoded output starts an escape, so the replacements
/// cannot hit user data.
pub fn encode_uri_component(input: &str) -> String {
    urlencoding::encode(input)
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}

/// Source delivers raw streams, no wrapping player
pub fn is_passthrough_source(source_name: &str) -> bool {
    let lower = source_name.to_lowercase();
    PASSTHROUGH_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Stream is a segmented playlist needing a wrapping player
pub fn is_segmented_stream(source_name: &str, episode_url: &str) -> bool {
    source_name.to_lowercase().contains(SEGMENTED_SOURCE_MARKER)
        || episode_url.ends_with(SEGMENTED_EXTENSION)
}

/// Read-only mapping from lowercase source name to wrapping player
#[derive(Debug, Clone)]
pub struct PlayerRegistry {
    players: BTreeMap<String, PlayerConfig>,
    default: PlayerConfig,
}

impl PlayerRegistry {
    /// Empty registry with only a fallback player
    pub fn new(default: PlayerConfig) -> Self {
        Self {
            players: BTreeMap::new(),
            default,
        }
    }

    /// Built-in players: `jsm3u8` on JSJiexi, JSJiexi as default
    pub fn builtin() -> Self {
        Self::new(PlayerConfig {
            name: DEFAULT_PLAYER_NAME.to_string(),
            url: JSJIEXI_PLAYER_URL.to_string(),
            encode: false,
        })
        .with_player(
            "jsm3u8",
            PlayerConfig {
                name: "JSJiexi".to_string(),
                url: JSJIEXI_PLAYER_URL.to_string(),
                encode: false,
            },
        )
    }

    /// Built-ins plus overrides from configuration
    ///
    /// Undecodable Apple-CMS blobs are logged and skipped.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::builtin();

        if let Some(url) = &config.default_player_url {
            registry.default.url = url.clone();
        }

        for blob in &config.apple_cms_players {
            match decode_apple_cms_player(blob) {
                Ok((key, player)) => {
                    tracing::info!(source = %key, player = %player.name, "Registered Apple-CMS player");
                    registry = registry.with_player(&key, player);
                }
                Err(e) => {
                    tracing::warn!("Skipping Apple-CMS player config: {}", e);
                }
            }
        }

        registry
    }

    /// Add or replace the player of a source (key is lowercased)
    pub fn with_player(mut self, source_name: &str, player: PlayerConfig) -> Self {
        self.players.insert(source_name.to_lowercase(), player);
        self
    }

    /// Player for a source name, falling back to the default
    pub fn player_for_source(&self, source_name: &str) -> &PlayerConfig {
        self.players
            .get(&source_name.to_lowercase())
            .unwrap_or(&self.default)
    }

    pub fn default_player(&self) -> &PlayerConfig {
        &self.default
    }

    /// Registered players in key order (default excluded)
    pub fn players(&self) -> impl Iterator<Item = (&str, &PlayerConfig)> {
        self.players.iter().map(|(key, player)| (key.as_str(), player))
    }

    /// Resolve the frame URL and report which rule applied
    pub fn resolve(&self, source_name: &str, episode_url: &str) -> PlayerResolution {
        let resolution = if is_passthrough_source(source_name) {
            PlayerResolution {
                url: episode_url.to_string(),
                policy: ResolutionPolicy::Passthrough,
                player: None,
            }
        } else if is_segmented_stream(source_name, episode_url) {
            let player = self.player_for_source(source_name);
            let video_url = if player.encode {
                encode_uri_component(episode_url)
            } else {
                episode_url.to_string()
            };

            PlayerResolution {
                url: format!("{}{}", player.url, video_url),
                policy: ResolutionPolicy::Wrapped,
                player: Some(player.name.clone()),
            }
        } else {
            PlayerResolution {
                url: episode_url.to_string(),
                policy: ResolutionPolicy::Direct,
                player: None,
            }
        };

        PLAYER_RESOLVE_TOTAL
            .with_label_values(&[resolution.policy.as_str()])
            .inc();
        tracing::debug!(
            source = source_name,
            policy = %resolution.policy,
            url = %resolution.url,
            "player url resolved"
        );

        resolution
    }

    /// Frame URL for a source/episode pair
    pub fn resolve_player_url(&self, source_name: &str, episode_url: &str) -> String {
        self.resolve(source_name, episode_url).url
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Errors decoding an Apple-CMS player blob
#[derive(Debug, Error)]
pub enum PlayerConfigError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid player json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("player config missing `{0}`")]
    MissingField(&'static str),
    #[error("player `{0}` is disabled")]
    Disabled(String),
}

/// Apple-CMS player record (fields are all strings there)
#[derive(Debug, Deserialize)]
struct AppleCmsPlayer {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    show: Option<String>,
    #[serde(default)]
    parse: Option<String>,
}

/// Decode a base64 Apple-CMS player blob into `(source key, player)`
pub fn decode_apple_cms_player(blob: &str) -> Result<(String, PlayerConfig), PlayerConfigError> {
    let bytes = STANDARD.decode(blob.trim())?;
    let raw: AppleCmsPlayer = serde_json::from_slice(&bytes)?;

    let from = raw
        .from
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .ok_or(PlayerConfigError::MissingField("from"))?;

    if raw.status.as_deref() == Some("0") {
        return Err(PlayerConfigError::Disabled(from));
    }

    let url = raw
        .parse
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or(PlayerConfigError::MissingField("parse"))?;

    let name = raw
        .show
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| from.clone());

    Ok((
        from.to_lowercase(),
        PlayerConfig {
            name,
            url,
            encode: false,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSM3U8_BLOB: &str = "eyJzdGF0dXMiOiIxIiwiZnJvbSI6ImpzbTN1OCIsInNob3ciOiJcdTY3ODFcdTkwMWZtM3U4IiwiZGVzIjoiXHU1Yjk4XHU2NWI5XHU1NzMwXHU1NzQwamlzdXp5LmNvbSIsInRhcmdldCI6Il9zZWxmIiwicHMiOiIxIiwicGFyc2UiOiJodHRwczpcL1wvanNqaWV4aS5jb21cL3BsYXlcLz91cmw9Iiwic29ydCI6IjE5OTkiLCJ0aXAiOiJcdTkwNDdcdTUyMzBcdTk1ZWVcdTk4OThcdThiZjdcdTgwNTRcdTdjZmJcdTViOThcdTY1YjlcdTdmYTRcdTdlYzQsXHU2MjgwXHU2NzJmXHU2NTJmXHU2MzAxXHUzMDAyIiwiaWQiOiJqc20zdTgiLCJjb2RlIjoiTWFjUGxheWVyLkh0bWwgPSAnPGlmcmFtZSB3aWR0aD1cIjEwMCVcIiBoZWlnaHQ9XCIxMDAlXCIgc3JjPVwiaHR0cHM6XC9cL2pzamlleGkuY29tXC9wbGF5XC8/dXJsPScrTWFjUGxheWVyLlBsYXlVcmwrJ1wiIGZyYW1lYm9yZGVyPVwiMFwiIGJvcmRlcj1cIjBcIiBtYXJnaW53aWR0aD1cIjBcIiBtYXJnaW5oZWlnaHQ9XCIwXCIgc2Nyb2xsaW5nPVwibm9cIiBhbGxvd2Z1bGxzY3JlZW49XCJhbGxvd2Z1bGxzY3JlZW5cIiBtb3phbGxvd2Z1bGxzY3JlZW49XCJtb3phbGxvd2Z1bGxzY3JlZW5cIiBtc2FsbG93ZnVsbHNjcmVlbj1cIm1zYWxsb3dmdWxsc2NyZWVuXCIgb2FsbG93ZnVsbHNjcmVlbj1cIm9hbGxvd2Z1bGxzY3JlZW5cIiB3ZWJraXRhbGxvd2Z1bGxzY3JlZW49XCJ3ZWJraXRhbGxvd2Z1bGxzY3JlZW5cIj48XC9pZnJhbWU+JztcclxuTWFjUGxheWVyLlNob3coKTsifQ==";

    #[test]
    fn test_passthrough_source() {
        let registry = PlayerRegistry::builtin();

        assert_eq!(registry.resolve_player_url("jsyun", "https://x/1.mp4"), "https://x/1.mp4");
        // Pass-through wins even for playlists
        let resolution = registry.resolve("JSYun-backup", "https://x/1.m3u8");
        assert_eq!(resolution.url, "https://x/1.m3u8");
        assert_eq!(resolution.policy, ResolutionPolicy::Passthrough);
        assert_eq!(resolution.player, None);
    }

    #[test]
    fn test_segmented_source_is_wrapped_verbatim() {
        let registry = PlayerRegistry::builtin();
        let resolution = registry.resolve("jsm3u8", "https://x/1.m3u8");

        assert_eq!(resolution.url, "https://jsjiexi.com/play/?url=https://x/1.m3u8");
        assert_eq!(resolution.policy, ResolutionPolicy::Wrapped);
        assert_eq!(resolution.player.as_deref(), Some("JSJiexi"));
    }

    #[test]
    fn test_unknown_segmented_source_uses_default() {
        let registry = PlayerRegistry::new(PlayerConfig {
            name: "Fallback".to_string(),
            url: "https://fallback/?v=".to_string(),
            encode: false,
        })
        .with_player(
            "jsm3u8",
            PlayerConfig {
                name: "JSJiexi".to_string(),
                url: JSJIEXI_PLAYER_URL.to_string(),
                encode: false,
            },
        );

        let resolution = registry.resolve("mystery", "https://x/1.m3u8");
        assert_eq!(resolution.url, "https://fallback/?v=https://x/1.m3u8");
        assert_eq!(resolution.player.as_deref(), Some("Fallback"));

        // Name marker alone is enough to classify as segmented
        assert_eq!(
            registry.resolve_player_url("hnm3u8", "https://x/index"),
            "https://fallback/?v=https://x/index"
        );
    }

    #[test]
    fn test_source_lookup_is_case_insensitive() {
        let registry = PlayerRegistry::builtin();

        assert_eq!(registry.player_for_source("JSM3U8").name, "JSJiexi");
        assert_eq!(registry.player_for_source("other").name, DEFAULT_PLAYER_NAME);
    }

    #[test]
    fn test_direct_format_untouched() {
        let registry = PlayerRegistry::builtin();
        let resolution = registry.resolve("hnzy", "https://x/1.mp4");

        assert_eq!(resolution.url, "https://x/1.mp4");
        assert_eq!(resolution.policy, ResolutionPolicy::Direct);
        // Extension must be at the very end
        assert_eq!(
            registry.resolve("hnzy", "https://x/1.m3u8?token=a").policy,
            ResolutionPolicy::Direct
        );
    }

    #[test]
    fn test_encoding_player() {
        let registry = PlayerRegistry::builtin().with_player(
            "hnm3u8",
            PlayerConfig {
                name: "HN Player".to_string(),
                url: "https://hn-player.com/play/?url=".to_string(),
                encode: true,
            },
        );

        assert_eq!(
            registry.resolve_player_url("hnm3u8", "https://x/a b.m3u8"),
            "https://hn-player.com/play/?url=https%3A%2F%2Fx%2Fa%20b.m3u8"
        );
    }

    #[test]
    fn test_encode_uri_component_keeps_marks() {
        assert_eq!(encode_uri_component("a!b'c(d)e*f~g"), "a!b'c(d)e*f~g");
        assert_eq!(encode_uri_component("?k=v&x=1"), "%3Fk%3Dv%26x%3D1");
        assert_eq!(encode_uri_component("100%21"), "100%2521");
        assert_eq!(encode_uri_component("第1集"), "%E7%AC%AC1%E9%9B%86");
    }

    #[test]
    fn test_decode_apple_cms_player() {
        let (key, player) = decode_apple_cms_player(JSM3U8_BLOB).unwrap();

        assert_eq!(key, "jsm3u8");
        assert_eq!(player.url, JSJIEXI_PLAYER_URL);
        assert_eq!(player.name, "极速m3u8");
        assert!(!player.encode);
    }

    #[test]
    fn test_decode_apple_cms_player_errors() {
        assert!(matches!(
            decode_apple_cms_player("not base64!"),
            Err(PlayerConfigError::Base64(_))
        ));

        let not_json = STANDARD.encode("plain text");
        assert!(matches!(
            decode_apple_cms_player(&not_json),
            Err(PlayerConfigError::Json(_))
        ));

        let no_parse = STANDARD.encode(r#"{"from":"abc","status":"1"}"#);
        assert!(matches!(
            decode_apple_cms_player(&no_parse),
            Err(PlayerConfigError::MissingField("parse"))
        ));

        let disabled = STANDARD.encode(r#"{"from":"abc","status":"0","parse":"https://p/?u="}"#);
        assert!(matches!(
            decode_apple_cms_player(&disabled),
            Err(PlayerConfigError::Disabled(_))
        ));
    }

    #[test]
    fn test_registry_from_config() {
        let config = Config {
            default_player_url: Some("https://default/?u=".to_string()),
            apple_cms_players: vec![
                "garbage".to_string(),
                STANDARD.encode(r#"{"from":"HNM3U8","parse":"https://hn/?u="}"#),
            ],
            ..Config::default()
        };

        let registry = PlayerRegistry::from_config(&config);

        assert_eq!(registry.default_player().url, "https://default/?u=");
        assert_eq!(registry.player_for_source("hnm3u8").url, "https://hn/?u=");
        assert_eq!(registry.player_for_source("hnm3u8").name, "HNM3U8");
        assert_eq!(registry.players().count(), 2);
    }
}
