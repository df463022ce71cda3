pub mod config;
pub mod models;
pub mod routes;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::services::{cache::TtlCache, catalog::CatalogService, player::PlayerRegistry};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub cache: TtlCache,
    pub catalog: CatalogService,
    pub players: PlayerRegistry,
    pub start_time: Instant,
}

impl AppState {
    /// Initialize services from configuration
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let cache = TtlCache::from_config(&config).await?;
        if config.cache_dir.is_empty() {
            tracing::info!("Memory cache initialized ({} entries max)", config.cache_max_entries);
        } else {
            tracing::info!("Disk cache initialized: {}", config.cache_dir);
        }

        let catalog = CatalogService::new(cache.clone(), config.catalog_cache_ttl_ms);

        let players = PlayerRegistry::from_config(&config);
        tracing::info!(
            "Player registry initialized: {} players, default {}",
            players.players().count(),
            players.default_player().url
        );

        Ok(Self {
            config,
            cache,
            catalog,
            players,
            start_time: Instant::now(),
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Arc<Self> {
        let config = Config {
            node_env: "test".to_string(),
            cache_dir: String::new(),
            cache_max_entries: 16,
            ..Config::default()
        };
        let cache = TtlCache::in_memory(config.cache_max_entries);

        Arc::new(Self {
            catalog: CatalogService::new(cache.clone(), config.catalog_cache_ttl_ms),
            config,
            cache,
            players: PlayerRegistry::builtin(),
            start_time: Instant::now(),
        })
    }
}

/// HTTP surface
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/live", get(routes::health::live))
        // Playback
        .route("/api/play/parse", post(routes::play::parse_play))
        .route("/api/play/resolve", get(routes::play::resolve_player))
        .route("/api/play/select", post(routes::play::select_play))
        .route("/api/players", get(routes::play::list_players))
        // Catalog helpers
        .route("/api/categories", get(routes::catalog::get_categories))
        .route("/api/slug", get(routes::catalog::get_slug))
        .route("/api/catalog/latest", post(routes::catalog::latest_videos))
        .route("/api/cache/stats", get(routes::catalog::cache_stats))
        .route("/api/cache", axum::routing::delete(routes::catalog::clear_cache))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
