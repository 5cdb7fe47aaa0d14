//! In-memory content cache
//!
//! [`MemoryContentCache`] is the map of path → content + metadata that chunk
//! and merged writes land in. It implements [`ContentStore`] so it can stand in
//! for durable storage, and adds age-based eviction for use as a local cache
//! in front of one.

use crate::config::CacheConfig;
use crate::content::{parse_chunk_path, ChunkPath};
use crate::error::StowageResult;
use crate::storage::ContentStore;
use crate::types::{CacheEntry, EntryMetadata, WriteResult};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

pub struct MemoryContentCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_age: Duration,
}

impl MemoryContentCache {
    /// Create a cache using the default one hour eviction age
    pub fn new() -> Self {
        Self::with_config(&CacheConfig::default())
    }

    pub fn with_config(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_age: config.max_age,
        }
    }

    /// Remove every entry strictly older than `max_age`
    pub async fn evict(&self, max_age: Duration) {
        self.evict_as_of(Utc::now(), max_age).await;
    }

    /// Evict using the configured age
    pub async fn evict_expired(&self) {
        self.evict(self.max_age).await;
    }

    /// Evict relative to an explicit clock reading
    ///
    /// An entry aged exactly `max_age` is kept.
    pub async fn evict_as_of(&self, now: DateTime<Utc>, max_age: Duration) {
        let Ok(max_age) = chrono::Duration::from_std(max_age) else {
            return;
        };
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now.signed_duration_since(entry.timestamp) <= max_age);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!("Evicted {} cache entries older than {}", evicted, max_age);
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// All stored paths, sorted
    pub async fn paths(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut paths: Vec<String> = entries.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Chunk files stored for `original`, ordered by operation then index
    pub async fn chunk_paths_for(&self, original: &str) -> Vec<ChunkPath> {
        let mut chunks: Vec<ChunkPath> = self
            .paths()
            .await
            .iter()
            .filter_map(|path| parse_chunk_path(path))
            .filter(|chunk| chunk.original == original)
            .collect();
        chunks.sort();
        chunks
    }

    /// Paths of chunk entries written by the given operation
    pub async fn chunk_paths_for_operation(&self, operation_id: &str) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut paths: Vec<String> = entries
            .values()
            .filter(|entry| {
                entry.metadata.is_chunk() && entry.metadata.operation_id() == Some(operation_id)
            })
            .map(|entry| entry.path.clone())
            .collect();
        paths.sort();
        paths
    }

    /// Clear all cached values
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl Default for MemoryContentCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MemoryContentCache {
    async fn put(
        &self,
        path: &str,
        content: Bytes,
        metadata: EntryMetadata,
    ) -> StowageResult<WriteResult> {
        let mut entries = self.entries.write().await;

        // Never move an entry's timestamp backwards on overwrite.
        let now = Utc::now();
        let timestamp = match entries.get(path) {
            Some(existing) if existing.timestamp > now => existing.timestamp,
            _ => now,
        };

        let entry = CacheEntry {
            path: path.to_string(),
            content,
            timestamp,
            metadata,
        };
        let result = entry.write_result();
        entries.insert(path.to_string(), entry);

        debug!("Cached {} ({} bytes)", path, result.size);
        Ok(result)
    }

    async fn get(&self, path: &str) -> StowageResult<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(path).cloned())
    }

    async fn has(&self, path: &str) -> StowageResult<bool> {
        Ok(self.entries.read().await.contains_key(path))
    }

    async fn remove(&self, path: &str) -> StowageResult<bool> {
        Ok(self.entries.write().await.remove(path).is_some())
    }
}
