use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::models::{
    ParsePlayRequest, ParsedPlayData, PlayerEntry, PlayerResolution, PlayersResponse,
    ResolveQuery, SelectPlayRequest, SelectionResponse,
};
use crate::services::play_parser::parse_play_url;
use crate::services::selection::PlaybackSelection;
use crate::AppState;

/// POST /api/play/parse - Decode raw play fields into sources and episodes
pub async fn parse_play(Json(payload): Json<ParsePlayRequest>) -> Json<ParsedPlayData> {
    Json(parse_play_url(
        payload.play_from.as_deref(),
        payload.play_url.as_deref(),
    ))
}

/// GET /api/play/resolve?source=<name>&url=<episode url>
/// Frame URL for one source/episode pair
pub async fn resolve_player(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResolveQuery>,
) -> Json<PlayerResolution> {
    Json(state.players.resolve(&query.source, &query.url))
}

/// POST /api/play/select - Decode play fields and apply a source/episode pick
/// Out-of-range indices leave the selection where it was
pub async fn select_play(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SelectPlayRequest>,
) -> Json<SelectionResponse> {
    let mut selection = PlaybackSelection::new(parse_play_url(
        payload.play_from.as_deref(),
        payload.play_url.as_deref(),
    ));

    if let Some(index) = payload.source_index {
        if !selection.select_source(index) {
            tracing::debug!(index, "source index out of range");
        }
    }
    if let Some(index) = payload.episode_index {
        if !selection.select_episode(index) {
            tracing::debug!(index, "episode index out of range");
        }
    }

    Json(selection.to_response(&state.players))
}

/// GET /api/players - Registered wrapping players
pub async fn list_players(State(state): State<Arc<AppState>>) -> Json<PlayersResponse> {
    let players = state
        .players
        .players()
        .map(|(key, config)| PlayerEntry {
            key: key.to_string(),
            config: config.clone(),
        })
        .collect();

    Json(PlayersResponse {
        players,
        default: state.players.default_player().clone(),
    })
}
