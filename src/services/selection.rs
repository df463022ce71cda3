//! Source/episode selection driven by the player UI
//!
//! Indices start at `(0, 0)` and are reset whenever new play data is loaded.
//! Switching source resets the episode index, since sources can carry
//! different episode counts. Out-of-range picks are rejected, so the
//! episode index always points into the current source.

use crate::models::{ParsedPlayData, PlayEpisode, PlaySource, PlayerResolution, SelectionResponse};
use crate::services::player::PlayerRegistry;

#[derive(Debug, Clone, Default)]
pub struct PlaybackSelection {
    data: ParsedPlayData,
    source_index: usize,
    episode_index: usize,
}

impl PlaybackSelection {
    pub fn new(data: ParsedPlayData) -> Self {
        Self {
            data,
            source_index: 0,
            episode_index: 0,
        }
    }

    /// Replace the play data and go back to `(0, 0)`
    pub fn load(&mut self, data: ParsedPlayData) {
        self.data = data;
        self.source_index = 0;
        self.episode_index = 0;
    }

    /// Switch source; returns false (and changes nothing) when out of range
    pub fn select_source(&mut self, index: usize) -> bool {
        if index >= self.data.sources.len() {
            return false;
        }

        self.source_index = index;
        self.episode_index = 0;
        true
    }

    /// Switch episode within the current source
    pub fn select_episode(&mut self, index: usize) -> bool {
        match self.current_source() {
            Some(source) if index < source.episodes.len() => {
                self.episode_index = index;
                true
            }
            _ => false,
        }
    }

    pub fn source_index(&self) -> usize {
        self.source_index
    }

    pub fn episode_index(&self) -> usize {
        self.episode_index
    }

    pub fn data(&self) -> &ParsedPlayData {
        &self.data
    }

    /// `None` only when there is no playback source at all
    pub fn current_source(&self) -> Option<&PlaySource> {
        self.data.sources.get(self.source_index)
    }

    pub fn current_episode(&self) -> Option<&PlayEpisode> {
        self.current_source()?.episodes.get(self.episode_index)
    }

    /// Frame URL for the current pick
    pub fn player(&self, registry: &PlayerRegistry) -> Option<PlayerResolution> {
        let source = self.current_source()?;
        let episode = self.current_episode()?;
        Some(registry.resolve(&source.name, &episode.url))
    }

    /// Snapshot for the HTTP surface
    pub fn to_response(&self, registry: &PlayerRegistry) -> SelectionResponse {
        SelectionResponse {
            source_index: self.source_index,
            episode_index: self.episode_index,
            source: self.current_source().map(|s| s.name.clone()),
            episode: self.current_episode().cloned(),
            player: self.player(registry),
            sources: self.data.sources.clone(),
        }
    }
}
