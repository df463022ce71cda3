use axum::{extract::{Query, State}, http::StatusCode, response::IntoResponse, Json};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;

use crate::models::{
    CategoriesResponse, LatestVideosRequest, PaginatedVideos, SlugQuery, SlugResponse,
};
use crate::services::cache::CacheStats;
use crate::services::categories::{build_category_tree, navigation_categories};
use crate::services::slug::{generate_slug, movie_url};
use crate::AppState;

/// GET /api/categories - Category tree
pub async fn get_categories() -> Json<CategoriesResponse> {
    let categories = build_category_tree();
    let total = categories.len();
    Json(CategoriesResponse { categories, total })
}

/// GET /api/slug?id=<id>&title=<title> - Detail page slug
/// `url` is only present when an id is given
pub async fn get_slug(Query(query): Query<SlugQuery>) -> Json<SlugResponse> {
    Json(SlugResponse {
        slug: generate_slug(&query.title, query.id),
        url: query.id.map(|id| movie_url(id, &query.title)),
    })
}

/// POST /api/catalog/latest - Newest rows per navigation category
/// Memoized per `limit` for the catalog TTL
pub async fn latest_videos(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LatestVideosRequest>,
) -> Json<BTreeMap<i64, PaginatedVideos>> {
    let records = payload.records;
    let grouped = state
        .catalog
        .videos_for_all_types(payload.limit, || async move {
            Ok::<_, Infallible>((navigation_categories(), records))
        })
        .await
        .unwrap_or_default();

    Json(grouped)
}

/// GET /api/cache/stats
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.cache.stats().await)
}

/// DELETE /api/cache - Drop all cached entries
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.cache.clear().await;
    tracing::info!("Cache cleared");
    (StatusCode::OK, Json(serde_json::json!({ "success": true })))
}
