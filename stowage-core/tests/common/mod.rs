//! Shared stores and helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stowage_core::caching::MemoryContentCache;
use stowage_core::config::StowageConfig;
use stowage_core::error::{StowageError, StowageResult};
use stowage_core::patterns::CancellationSignal;
use stowage_core::storage::ContentStore;
use stowage_core::types::{CacheEntry, EntryMetadata, WriteResult};

/// Config with a given chunk size and millisecond retries
pub fn test_config(chunk_size: usize) -> StowageConfig {
    let mut config = StowageConfig::test();
    config.chunking.chunk_size = chunk_size;
    config.retry.base_delay = Duration::from_millis(1);
    config.retry.max_delay = Duration::from_millis(2);
    config
}

/// Deterministic, non-repeating-looking test content
pub fn sample_content(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// How a [`ScriptedStore`] should answer a put
#[derive(Debug, Clone)]
pub enum PutBehaviour {
    /// Fail the first `n` puts to each matching path with a retryable error
    FailFirst(usize),
    /// Fail the first `n` matching puts overall with a retryable error
    FailFirstOverall(usize),
    /// Fail every put to each matching path with a permanent error
    AlwaysReject,
    /// Fire the signal on the first put to a matching path, then succeed
    CancelOnPut(CancellationSignal),
}

/// In-memory store that misbehaves for paths containing a marker
pub struct ScriptedStore {
    inner: MemoryContentCache,
    marker: String,
    behaviour: PutBehaviour,
    attempts: Mutex<HashMap<String, usize>>,
    puts: AtomicUsize,
    matched: AtomicUsize,
}

impl ScriptedStore {
    pub fn new(marker: impl Into<String>, behaviour: PutBehaviour) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryContentCache::new(),
            marker: marker.into(),
            behaviour,
            attempts: Mutex::new(HashMap::new()),
            puts: AtomicUsize::new(0),
            matched: AtomicUsize::new(0),
        })
    }

    pub fn inner(&self) -> &MemoryContentCache {
        &self.inner
    }

    /// Put calls seen for `path`, failed ones included
    pub fn attempts_for(&self, path: &str) -> usize {
        self.attempts.lock().get(path).copied().unwrap_or(0)
    }

    /// Put calls seen for paths ending in `suffix`, failed ones included
    pub fn attempts_ending_with(&self, suffix: &str) -> usize {
        self.attempts
            .lock()
            .iter()
            .filter(|(path, _)| path.ends_with(suffix))
            .map(|(_, count)| *count)
            .sum()
    }

    /// Every put call seen, failed ones included
    pub fn total_puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for ScriptedStore {
    async fn put(
        &self,
        path: &str,
        content: Bytes,
        metadata: EntryMetadata,
    ) -> StowageResult<WriteResult> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let attempt = {
            let mut attempts = self.attempts.lock();
            let count = attempts.entry(path.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        if path.contains(&self.marker) {
            let matched = self.matched.fetch_add(1, Ordering::SeqCst) + 1;
            match &self.behaviour {
                PutBehaviour::FailFirst(n) if attempt <= *n => {
                    return Err(StowageError::temporary(format!(
                        "{} busy on attempt {}",
                        path, attempt
                    )));
                }
                PutBehaviour::FailFirstOverall(n) if matched <= *n => {
                    return Err(StowageError::temporary(format!(
                        "{} busy ({} failures so far)",
                        path, matched
                    )));
                }
                PutBehaviour::AlwaysReject => {
                    return Err(StowageError::validation([format!("{} rejected", path)]));
                }
                PutBehaviour::CancelOnPut(signal) => signal.cancel(),
                _ => {}
            }
        }

        self.inner.put(path, content, metadata).await
    }

    async fn get(&self, path: &str) -> StowageResult<Option<CacheEntry>> {
        self.inner.get(path).await
    }

    async fn remove(&self, path: &str) -> StowageResult<bool> {
        self.inner.remove(path).await
    }
}

/// In-memory store that yields to the scheduler around every access, so
/// concurrent writers interleave
#[derive(Default)]
pub struct YieldingStore {
    inner: MemoryContentCache,
}

impl YieldingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inner(&self) -> &MemoryContentCache {
        &self.inner
    }
}

#[async_trait]
impl ContentStore for YieldingStore {
    async fn put(
        &self,
        path: &str,
        content: Bytes,
        metadata: EntryMetadata,
    ) -> StowageResult<WriteResult> {
        tokio::task::yield_now().await;
        let result = self.inner.put(path, content, metadata).await;
        tokio::task::yield_now().await;
        result
    }

    async fn get(&self, path: &str) -> StowageResult<Option<CacheEntry>> {
        tokio::task::yield_now().await;
        self.inner.get(path).await
    }

    async fn remove(&self, path: &str) -> StowageResult<bool> {
        self.inner.remove(path).await
    }
}
