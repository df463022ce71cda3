use serde::{Deserialize, Serialize};

/// Single playable entry within a source (an episode, or the movie itself)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayEpisode {
    pub name: String,
    /// Trimmed, never empty
    pub url: String,
}

/// Named playback channel with its own ordered episode list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaySource {
    pub name: String,
    pub episodes: Vec<PlayEpisode>,
}

/// Normalized result of decoding `vod_play_from` / `vod_play_url`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPlayData {
    pub sources: Vec<PlaySource>,
}

impl ParsedPlayData {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Wrapping player used for segmented-playlist sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    pub name: String,
    /// Base endpoint, expected to end in a query opener such as `?url=`
    pub url: String,
    /// Percent-encode the episode URL before appending it
    pub encode: bool,
}

/// Which resolution rule produced a player URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionPolicy {
    /// Known direct-stream source, URL handed over untouched
    Passthrough,
    /// Segmented playlist wrapped by an external player
    Wrapped,
    /// Natively playable format
    Direct,
}

impl ResolutionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionPolicy::Passthrough => "passthrough",
            ResolutionPolicy::Wrapped => "wrapped",
            ResolutionPolicy::Direct => "direct",
        }
    }
}

impl std::fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final URL for the embedding frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResolution {
    pub url: String,
    pub policy: ResolutionPolicy,
    /// Name of the wrapping player, only set for `Wrapped`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
}

/// Request to decode raw play fields
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsePlayRequest {
    #[serde(default)]
    pub play_from: Option<String>,
    #[serde(default)]
    pub play_url: Option<String>,
}

/// Query parameters for the resolve endpoint
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub source: String,
    pub url: String,
}

/// Request to decode raw play fields and apply a selection
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectPlayRequest {
    #[serde(default)]
    pub play_from: Option<String>,
    #[serde(default)]
    pub play_url: Option<String>,
    #[serde(default)]
    pub source_index: Option<usize>,
    #[serde(default)]
    pub episode_index: Option<usize>,
}

/// Current selection as rendered by the player
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub source_index: usize,
    pub episode_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<PlayEpisode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerResolution>,
    pub sources: Vec<PlaySource>,
}

/// Registry listing entry
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntry {
    pub key: String,
    #[serde(flatten)]
    pub config: PlayerConfig,
}

/// Registry listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayersResponse {
    pub players: Vec<PlayerEntry>,
    pub default: PlayerConfig,
}
