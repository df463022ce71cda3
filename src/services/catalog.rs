//! Home page listings: one bulk query grouped by category, memoized in the
//! TTL cache

use std::collections::BTreeMap;
use std::future::Future;

use crate::models::{Category, PaginatedVideos, VodRecord};
use crate::services::cache::{keys, CacheError, TtlCache};

/// Group published rows by `type_id`, newest first, at most `limit` each
///
/// Every requested category gets an entry, possibly empty.
pub fn group_by_type(
    records: &[VodRecord],
    types: &[Category],
    limit: usize,
) -> BTreeMap<i64, PaginatedVideos> {
    let mut grouped: BTreeMap<i64, Vec<VodRecord>> =
        types.iter().map(|t| (t.type_id, Vec::new())).collect();

    for record in records.iter().filter(|r| r.is_published()) {
        if let Some(group) = record.type_id.and_then(|id| grouped.get_mut(&id)) {
            group.push(record.clone());
        }
    }

    grouped
        .into_iter()
        .map(|(type_id, mut videos)| {
            // Newest first, rows without a time last
            videos.sort_by(|a, b| b.vod_time.cmp(&a.vod_time));
            videos.truncate(limit);
            let total_results = videos.len();
            (
                type_id,
                PaginatedVideos {
                    page: 1,
                    results: videos,
                    total_pages: 1,
                    total_results,
                },
            )
        })
        .collect()
}

#[derive(Clone)]
pub struct CatalogService {
    cache: TtlCache,
    ttl_ms: u64,
}

impl CatalogService {
    pub fn new(cache: TtlCache, ttl_ms: u64) -> Self {
        Self { cache, ttl_ms }
    }

    /// Latest `limit` videos of every category
    ///
    /// `fetch` runs the bulk query (categories + published rows) and is only
    /// called on a cache miss. Fetch errors are returned untouched and
    /// nothing is cached.
    pub async fn videos_for_all_types<F, Fut, E>(
        &self,
        limit: usize,
        fetch: F,
    ) -> Result<BTreeMap<i64, PaginatedVideos>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(Vec<Category>, Vec<VodRecord>), E>>,
    {
        let key = keys::all_types_videos(limit);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!(key = %key, "all types videos served from cache");
            return Ok(cached);
        }

        let (types, records) = fetch().await?;
        let grouped = group_by_type(&records, &types, limit);
        tracing::info!(
            types = types.len(),
            records = records.len(),
            "all types videos grouped"
        );

        if let Err(e) = self.store(&key, &grouped).await {
            tracing::warn!("Failed to cache all types videos: {}", e);
        }

        Ok(grouped)
    }

    async fn store(&self, key: &str, grouped: &BTreeMap<i64, PaginatedVideos>) -> Result<(), CacheError> {
        self.cache.set_persistent(key, grouped, self.ttl_ms).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::tests::ManualClock;
    use crate::services::cache::ttl;
    use crate::services::categories::category_by_id;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn record(id: i64, type_id: i64, time: &str, status: i32) -> VodRecord {
        VodRecord {
            vod_id: id,
            vod_name: format!("video {}", id),
            type_id: Some(type_id),
            vod_time: Some(time.to_string()),
            vod_status: Some(status),
            vod_pic: None,
            vod_remarks: None,
            vod_play_from: None,
            vod_play_url: None,
        }
    }

    fn types() -> Vec<Category> {
        vec![category_by_id(1).unwrap(), category_by_id(2).unwrap()]
    }

    fn records() -> Vec<VodRecord> {
        vec![
            record(1, 1, "2024-01-01 10:00:00", 1),
            record(2, 1, "2024-03-01 10:00:00", 1),
            record(3, 1, "2024-02-01 10:00:00", 1),
            record(4, 1, "2024-04-01 10:00:00", 0),
            record(5, 9, "2024-04-01 10:00:00", 1),
        ]
    }

    #[test]
    fn test_group_by_type() {
        let grouped = group_by_type(&records(), &types(), 2);

        assert_eq!(grouped.len(), 2);
        let tv: Vec<i64> = grouped[&1].results.iter().map(|r| r.vod_id).collect();
        assert_eq!(tv, vec![2, 3]);
        assert_eq!(grouped[&1].total_results, 2);
        // Requested type without rows still listed
        assert!(grouped[&2].results.is_empty());
    }

    #[tokio::test]
    async fn test_videos_for_all_types_is_memoized() {
        let clock = Arc::new(ManualClock::default());
        let cache = TtlCache::in_memory(8).with_clock(clock.clone());
        let service = CatalogService::new(cache, ttl::LONG);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let fetch = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, std::io::Error>((types(), records()))
        };

        let first = service.videos_for_all_types(10, fetch).await.unwrap();
        let second = service.videos_for_all_types(10, fetch).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Another limit is another key
        service.videos_for_all_types(5, fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        clock.advance(ttl::LONG as i64 + 1);
        service.videos_for_all_types(10, fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_error_is_not_cached() {
        let service = CatalogService::new(TtlCache::in_memory(8), ttl::LONG);

        let result = service
            .videos_for_all_types(10, || async {
                Err::<(Vec<Category>, Vec<VodRecord>), _>("backend down")
            })
            .await;
        assert_eq!(result.unwrap_err(), "backend down");

        let result = service
            .videos_for_all_types(10, || async { Ok::<_, &str>((types(), records())) })
            .await
            .unwrap();
        assert_eq!(result[&1].results.len(), 3);
    }
}
