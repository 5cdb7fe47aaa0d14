//! Storage seam for persisted content
//!
//! [`ContentStore`] is the contract a durable backend (object store,
//! filesystem client) must satisfy. Implementations surface their own I/O
//! failures unchanged; retry decisions are made by the caller's
//! [`RetryExecutor`](crate::patterns::RetryExecutor), never here.

use crate::error::StowageResult;
use crate::types::{CacheEntry, EntryMetadata, WriteResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store or overwrite `path`
    async fn put(
        &self,
        path: &str,
        content: Bytes,
        metadata: EntryMetadata,
    ) -> StowageResult<WriteResult>;

    /// Fetch the entry at `path`; `Ok(None)` when nothing is stored
    async fn get(&self, path: &str) -> StowageResult<Option<CacheEntry>>;

    async fn has(&self, path: &str) -> StowageResult<bool> {
        self.get(path).await.map(|entry| entry.is_some())
    }

    /// Remove `path`, returning whether anything was stored there
    async fn remove(&self, path: &str) -> StowageResult<bool>;
}

#[async_trait]
impl<S: ContentStore + ?Sized> ContentStore for Arc<S> {
    async fn put(
        &self,
        path: &str,
        content: Bytes,
        metadata: EntryMetadata,
    ) -> StowageResult<WriteResult> {
        (**self).put(path, content, metadata).await
    }

    async fn get(&self, path: &str) -> StowageResult<Option<CacheEntry>> {
        (**self).get(path).await
    }

    async fn has(&self, path: &str) -> StowageResult<bool> {
        (**self).has(path).await
    }

    async fn remove(&self, path: &str) -> StowageResult<bool> {
        (**self).remove(path).await
    }
}
