use lru::LruCache;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::services::metrics::CACHE_REQUESTS_TOTAL;

/// File name prefix of persisted entries
const STORAGE_PREFIX: &str = "app_cache_";

/// TTL presets in milliseconds
pub mod ttl {
    /// Frequently changing data
    pub const SHORT: u64 = 5 * 60 * 1000;
    /// Fairly stable data
    pub const MEDIUM: u64 = 60 * 60 * 1000;
    /// Data refreshed once a day
    pub const LONG: u64 = 12 * 60 * 60 * 1000;
    /// Data that rarely changes
    pub const VERY_LONG: u64 = 24 * 60 * 60 * 1000;
}

/// Cache key builders shared by catalog queries
pub mod keys {
    pub fn videos(page: u32, limit: u32) -> String {
        format!("videos_{}_{}", page, limit)
    }

    pub fn videos_by_type(type_id: i64, page: u32, limit: u32) -> String {
        format!("videos_type_{}_{}_{}", type_id, page, limit)
    }

    pub fn video_detail(vod_id: i64) -> String {
        format!("video_detail_{}", vod_id)
    }

    pub fn all_types_videos(limit: usize) -> String {
        format!("all_types_videos_{}", limit)
    }

    pub fn genres() -> String {
        "genres".to_string()
    }

    pub fn actor_detail(actor_id: i64) -> String {
        format!("actor_detail_{}", actor_id)
    }

    pub fn actor_works(actor_id: i64) -> String {
        format!("actor_works_{}", actor_id)
    }
}

/// Time source for expiry checks
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Stored value with its insertion time and lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry {
    data: serde_json::Value,
    timestamp: i64,
    ttl: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: i64) -> bool {
        let ttl = i64::try_from(self.ttl).unwrap_or(i64::MAX);
        now.saturating_sub(self.timestamp) > ttl
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub memory_count: usize,
    pub disk_count: usize,
    pub disk_bytes: u64,
}

/// Durable layer: one JSON file per key, named after the key's SHA1
#[derive(Debug, Clone)]
struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    async fn open(dir: &Path) -> Result<Self, CacheError> {
        fs::create_dir_all(dir).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    async fn read(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read cache file {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice(&content) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Dropping corrupt cache file {}: {}", path.display(), e);
                let _ = fs::remove_file(&path).await;
                None
            }
        }
    }

    async fn write(&self, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        let tmp_path = path.with_extension("json.tmp");
        let content = serde_json::to_vec(entry)?;

        let mut file = File::create(&tmp_path).await?;
        file.write_all(&content).await?;
        file.sync_all().await?;
        drop(file);

        // Atomic replace to avoid readers seeing partial writes
        fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.entry_path(key)).await;
    }

    /// Remove expired, corrupt and half-written entries
    async fn purge(&self, now: i64) -> Result<usize, CacheError> {
        let mut removed = 0usize;

        for path in self.entry_files(true).await? {
            let stale = if is_tmp_file(&path) {
                true
            } else {
                match fs::read(&path).await {
                    Ok(content) => serde_json::from_slice::<CacheEntry>(&content)
                        .map(|entry| entry.is_expired(now))
                        .unwrap_or(true),
                    Err(_) => true,
                }
            };

            if stale && fs::remove_file(&path).await.is_ok() {
                removed += 1;
            }
        }

        Ok(removed)
    }

    async fn clear(&self) -> Result<usize, CacheError> {
        let mut removed = 0usize;
        for path in self.entry_files(true).await? {
            if fs::remove_file(&path).await.is_ok() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Number of entries and their total size in bytes
    async fn usage(&self) -> Result<(usize, u64), CacheError> {
        let mut count = 0usize;
        let mut bytes = 0u64;
        for path in self.entry_files(false).await? {
            if let Ok(metadata) = fs::metadata(&path).await {
                count += 1;
                bytes += metadata.len();
            }
        }
        Ok((count, bytes))
    }

    async fn entry_files(&self, include_tmp: bool) -> Result<Vec<PathBuf>, CacheError> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let owned = path
                .file_name()
                .map(|name| name.to_string_lossy().starts_with(STORAGE_PREFIX))
                .unwrap_or(false);
            if !owned {
                continue;
            }
            if is_tmp_file(&path) && !include_tmp {
                continue;
            }
            files.push(path);
        }

        Ok(files)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{}.json", STORAGE_PREFIX, hash_key(key)))
    }
}

fn is_tmp_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "tmp")
}

/// SHA1 of a cache key, keeps file names filesystem-safe
fn hash_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Key-value cache with per-entry TTL
///
/// Entries live in a bounded in-memory LRU; `set_persistent` also writes them
/// to disk so they survive restarts. Expiry (`now - stored_at > ttl`) is
/// checked lazily on read, there is no background eviction.
#[derive(Clone)]
pub struct TtlCache {
    memory: Arc<Mutex<LruCache<String, CacheEntry>>>,
    disk: Option<DiskStore>,
    clock: Arc<dyn Clock>,
}

impl TtlCache {
    /// Memory-only cache holding at most `max_entries` keys
    pub fn in_memory(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            memory: Arc::new(Mutex::new(LruCache::new(capacity))),
            disk: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Cache backed by `cache_dir`; expired files are purged on open
    pub async fn with_disk(cache_dir: &str, max_entries: usize) -> Result<Self, CacheError> {
        let mut cache = Self::in_memory(max_entries);
        let disk = DiskStore::open(Path::new(cache_dir)).await?;

        let purged = disk.purge(cache.clock.now_millis()).await?;
        if purged > 0 {
            tracing::info!(cache_gc_expired = purged, msg = "expired cache files removed");
        }

        cache.disk = Some(disk);
        Ok(cache)
    }

    /// Build from configuration; an empty `cache_dir` disables the disk layer
    pub async fn from_config(config: &Config) -> Result<Self, CacheError> {
        if config.cache_dir.is_empty() {
            Ok(Self::in_memory(config.cache_max_entries))
        } else {
            Self::with_disk(&config.cache_dir, config.cache_max_entries).await
        }
    }

    /// Replace the time source (tests)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Value for `key`, or `None` when absent, expired or of another shape
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let now = self.clock.now_millis();
        let cached = self.memory.lock().await.get(key).cloned();

        let (entry, layer) = match cached {
            Some(entry) => (entry, "hit"),
            None => match self.read_disk(key).await {
                Some(entry) => self.restore(key, entry).await,
                None => {
                    CACHE_REQUESTS_TOTAL.with_label_values(&["miss"]).inc();
                    return None;
                }
            },
        };

        if entry.is_expired(now) {
            CACHE_REQUESTS_TOTAL.with_label_values(&["expired"]).inc();
            self.delete(key).await;
            return None;
        }

        match serde_json::from_value(entry.data) {
            Ok(value) => {
                CACHE_REQUESTS_TOTAL.with_label_values(&[layer]).inc();
                Some(value)
            }
            Err(e) => {
                tracing::warn!(key, "Cached value has unexpected shape: {}", e);
                None
            }
        }
    }

    /// True if `key` holds a live entry
    pub async fn has(&self, key: &str) -> bool {
        self.get::<serde_json::Value>(key).await.is_some()
    }

    /// Store `value` in memory for `ttl_ms` milliseconds (last writer wins)
    ///
    /// An older durable copy of `key` is removed so it cannot resurface
    /// once memory evicts the key.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_ms: u64) -> Result<(), CacheError> {
        let entry = self.entry(value, ttl_ms)?;
        self.memory.lock().await.put(key.to_string(), entry);

        if let Some(disk) = &self.disk {
            disk.remove(key).await;
        }
        Ok(())
    }

    /// Store `value` in memory and on disk
    ///
    /// The memory layer is updated even if the disk write fails.
    pub async fn set_persistent<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_ms: u64,
    ) -> Result<(), CacheError> {
        let entry = self.entry(value, ttl_ms)?;
        self.memory.lock().await.put(key.to_string(), entry.clone());

        if let Some(disk) = &self.disk {
            disk.write(key, &entry).await?;
        }
        Ok(())
    }

    pub async fn delete(&self, key: &str) {
        self.memory.lock().await.pop(key);
        if let Some(disk) = &self.disk {
            disk.remove(key).await;
        }
    }

    /// Drop every entry from both layers
    pub async fn clear(&self) {
        self.memory.lock().await.clear();

        if let Some(disk) = &self.disk {
            match disk.clear().await {
                Ok(removed) => tracing::info!(cache_cleared = removed, msg = "cache files removed"),
                Err(e) => tracing::warn!("Failed to clear cache directory: {}", e),
            }
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let memory_count = self.memory.lock().await.len();
        let (disk_count, disk_bytes) = match &self.disk {
            Some(disk) => disk.usage().await.unwrap_or_else(|e| {
                tracing::warn!("Failed to read cache usage: {}", e);
                (0, 0)
            }),
            None => (0, 0),
        };

        CacheStats {
            memory_count,
            disk_count,
            disk_bytes,
        }
    }

    fn entry<T: Serialize>(&self, value: &T, ttl_ms: u64) -> Result<CacheEntry, CacheError> {
        Ok(CacheEntry {
            data: serde_json::to_value(value)?,
            timestamp: self.clock.now_millis(),
            ttl: ttl_ms,
        })
    }

    /// Put a disk entry back into memory unless a write landed meanwhile
    async fn restore(&self, key: &str, entry: CacheEntry) -> (CacheEntry, &'static str) {
        let mut memory = self.memory.lock().await;
        if let Some(current) = memory.get(key).cloned() {
            return (current, "hit");
        }

        memory.put(key.to_string(), entry.clone());
        (entry, "disk_hit")
    }

    async fn read_disk(&self, key: &str) -> Option<CacheEntry> {
        match &self.disk {
            Some(disk) => disk.read(key).await,
            None => None,
        }
    }
}
