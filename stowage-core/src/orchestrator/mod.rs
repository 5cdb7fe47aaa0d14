//! Chunked-write orchestration
//!
//! [`ChunkedWriter`] decides whether content fits in one write. Oversized
//! content is split into ordered chunks, each chunk is written through the
//! retry executor, completions are tracked per operation, and once every chunk
//! has landed the chunks are read back in index order and merged at the
//! original path.
//!
//! ```text
//! write_content ─► analyze ─┬─ fits ───────────────► put(path)
//!                           └─ oversized ─► split ─► put(chunk i) × N (retried)
//!                                                      │
//!                                   all indices done ◄─┘
//!                                          │
//!                                          └─► merge ─► put(path) ─► drop operation
//! ```

pub mod operation;

pub use operation::{Completion, Operation, OperationState, OperationTable};

use crate::config::StowageConfig;
use crate::content::{
    check_target_path, derive_chunk_path, ChunkDescriptor, ContentAnalyzer, ContentBlob,
};
use crate::error::{ErrorContext, StowageError, StowageResult};
use crate::patterns::{CancellationSignal, RetryConfig, RetryExecutor};
use crate::storage::ContentStore;
use crate::types::{EntryMetadata, OperationStatus, WriteOutcome, WriteResult};
use bytes::BytesMut;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ChunkedWriter<S: ContentStore> {
    store: Arc<S>,
    analyzer: ContentAnalyzer,
    retry: RetryConfig,
    max_concurrent_writes: usize,
    operations: Arc<OperationTable>,
}

impl<S: ContentStore> ChunkedWriter<S> {
    pub fn new(store: Arc<S>, config: &StowageConfig) -> Self {
        Self {
            store,
            analyzer: ContentAnalyzer::from_config(&config.chunking),
            retry: RetryConfig::from(&config.retry),
            max_concurrent_writes: config.chunking.max_concurrent_writes.max(1),
            operations: Arc::new(OperationTable::new()),
        }
    }

    /// Share an operation table with other writers
    pub fn with_operation_table(mut self, operations: Arc<OperationTable>) -> Self {
        self.operations = operations;
        self
    }

    /// Override the retry behaviour used for chunk and merge writes
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn analyzer(&self) -> &ContentAnalyzer {
        &self.analyzer
    }

    pub fn operations(&self) -> &Arc<OperationTable> {
        &self.operations
    }

    /// Persist `content` at `path`, chunking it if it exceeds the chunk size
    pub async fn write_content(
        &self,
        path: &str,
        content: impl Into<ContentBlob>,
    ) -> StowageResult<WriteOutcome> {
        self.write_content_with_cancellation(path, content, &CancellationSignal::new())
            .await
    }

    /// Like [`write_content`](Self::write_content), abandoning the write when
    /// `cancel` fires
    ///
    /// The signal is checked before each chunk write, before each retry
    /// attempt and before finalizing. A cancelled operation is never merged;
    /// its record stays queryable until [`cleanup_operation`](Self::cleanup_operation).
    pub async fn write_content_with_cancellation(
        &self,
        path: &str,
        content: impl Into<ContentBlob>,
        cancel: &CancellationSignal,
    ) -> StowageResult<WriteOutcome> {
        check_target_path(path)?;

        let content = content.into();
        let analysis = self.analyzer.analyze(&content);

        if !analysis.requires_chunking {
            if analysis.approaching_limit {
                warn!(
                    "{} is {} bytes, approaching the {} byte chunk size",
                    path,
                    analysis.size,
                    self.analyzer.chunk_size()
                );
            }
            cancel.check("write_content")?;
            let result = self
                .store
                .put(path, content.into_bytes(), EntryMetadata::Direct)
                .await?;
            return Ok(WriteOutcome::Direct(result));
        }

        let operation = self.operations.create(path, analysis.chunks);
        info!(
            "Starting chunked write {} for {} ({} bytes in {} chunks)",
            operation.id(),
            path,
            analysis.size,
            analysis.chunks
        );

        match self.run_operation(&operation, content, cancel).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                let state = if error.is_cancelled() {
                    OperationState::Cancelled
                } else {
                    OperationState::Failed
                };
                warn!(
                    "Chunked write {} for {} ended as {:?}: {}",
                    operation.id(),
                    path,
                    state,
                    error
                );
                operation.set_state(state);
                Err(error)
            }
        }
    }

    async fn run_operation(
        &self,
        operation: &Arc<Operation>,
        content: ContentBlob,
        cancel: &CancellationSignal,
    ) -> StowageResult<WriteOutcome> {
        let descriptors = ChunkDescriptor::split(operation.id(), &content, operation.total())?;
        let executor = RetryExecutor::new(self.retry.clone()).with_cancellation(cancel.clone());

        let writes = descriptors.into_iter().map(|chunk| {
            let store = self.store.clone();
            let executor = executor.clone();
            let cancel = cancel.clone();
            let chunk_path = chunk.path_for(operation.path());

            async move {
                cancel.check("write_chunk")?;
                let metadata = chunk.metadata();
                let fragment = chunk.content.bytes().clone();
                let context = ErrorContext::for_operation("write_chunk")
                    .with("operation_id", &chunk.operation_id)
                    .with("path", &chunk_path)
                    .with("index", chunk.index);

                debug!(
                    "Writing chunk {}/{} to {}",
                    chunk.index + 1,
                    chunk.total,
                    chunk_path
                );
                let result = executor
                    .with_retry(
                        || store.put(&chunk_path, fragment.clone(), metadata.clone()),
                        context,
                    )
                    .await?;
                Ok::<_, StowageError>((chunk.index, result))
            }
        });

        let mut writes = stream::iter(writes).buffer_unordered(self.max_concurrent_writes);
        let mut ready = false;

        while let Some(written) = writes.next().await {
            let (index, result) = written?;
            if operation.record_completion(index, result)? == Completion::ReadyToFinalize {
                ready = true;
            }
        }

        if !ready {
            return Err(StowageError::internal(format!(
                "operation {} finished with {}/{} chunks complete",
                operation.id(),
                operation.completed_count(),
                operation.total()
            )));
        }

        cancel.check("finalize")?;
        self.finalize(operation, &executor).await
    }

    /// Merge every chunk in index order and write the result at the target path
    async fn finalize(
        &self,
        operation: &Arc<Operation>,
        executor: &RetryExecutor,
    ) -> StowageResult<WriteOutcome> {
        let chunks: Vec<WriteResult> = operation
            .sorted_results()
            .into_iter()
            .map(|(_, result)| result)
            .collect();
        let merged = reassemble(self.store.as_ref(), operation.id(), &chunks).await?;

        let metadata = EntryMetadata::Merged {
            operation_id: operation.id().to_string(),
            total_chunks: operation.total(),
        };
        let context = ErrorContext::for_operation("finalize")
            .with("operation_id", operation.id())
            .with("path", operation.path());

        let merged_result = executor
            .with_retry(
                || self.store.put(operation.path(), merged.clone(), metadata.clone()),
                context,
            )
            .await?;

        self.operations.remove(operation.id());
        info!(
            "Finalized {} at {} ({} bytes from {} chunks)",
            operation.id(),
            operation.path(),
            merged_result.size,
            operation.total()
        );

        Ok(WriteOutcome::Chunked {
            operation_id: operation.id().to_string(),
            chunks,
            merged: merged_result,
        })
    }

    /// Progress of a tracked operation; `None` for unknown ids
    pub fn get_operation_status(&self, operation_id: &str) -> Option<OperationStatus> {
        self.operations.status(operation_id)
    }

    /// Ids of operations still tracked (in progress, failed or cancelled)
    pub fn active_operations(&self) -> Vec<String> {
        self.operations.ids()
    }

    /// Remove an operation's chunk entries and forget the operation
    ///
    /// Only entries whose metadata names this operation are removed. Unknown
    /// ids are a no-op.
    pub async fn cleanup_operation(&self, operation_id: &str) -> StowageResult<()> {
        let Some(operation) = self.operations.remove(operation_id) else {
            return Ok(());
        };

        let mut removed = 0;
        for index in 0..operation.total() {
            let chunk_path = derive_chunk_path(operation.path(), operation_id, index);
            let owned = match self.store.get(&chunk_path).await? {
                Some(entry) => entry.metadata.operation_id() == Some(operation_id),
                None => false,
            };
            if owned && self.store.remove(&chunk_path).await? {
                removed += 1;
            }
        }

        debug!(
            "Cleaned up operation {} ({} chunk entries removed)",
            operation_id, removed
        );
        Ok(())
    }
}

impl<S: ContentStore> std::fmt::Debug for ChunkedWriter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkedWriter")
            .field("analyzer", &self.analyzer)
            .field("retry", &self.retry)
            .field("max_concurrent_writes", &self.max_concurrent_writes)
            .field("operations", &self.operations.len())
            .finish()
    }
}

/// Read back the chunks recorded in `results` and concatenate them in order
///
/// Every entry must still belong to `operation_id`; a missing chunk or one
/// written by another operation fails the merge.
pub async fn reassemble<S: ContentStore + ?Sized>(
    store: &S,
    operation_id: &str,
    results: &[WriteResult],
) -> StowageResult<bytes::Bytes> {
    let mut merged = BytesMut::new();
    for result in results {
        let entry = store
            .get(&result.path)
            .await?
            .ok_or_else(|| StowageError::internal(format!("chunk missing at {}", result.path)))?;

        let owner = entry.metadata.operation_id();
        if !entry.metadata.is_chunk() || owner != Some(operation_id) {
            return Err(StowageError::internal(format!(
                "chunk at {} belongs to {} instead of {}",
                result.path,
                owner.unwrap_or("no operation"),
                operation_id
            )));
        }
        merged.extend_from_slice(&entry.content);
    }
    Ok(merged.freeze())
}
