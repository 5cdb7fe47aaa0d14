//! Plain data shared across the persistence core

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single persisted write (chunk or final)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResult {
    pub path: String,
    /// Byte length of the stored content
    pub size: usize,
    pub timestamp: DateTime<Utc>,
}

/// Metadata stored alongside a cache entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryMetadata {
    /// Content written in one piece
    #[default]
    Direct,
    /// One fragment of a chunked write
    Chunk {
        operation_id: String,
        index: usize,
        total: usize,
    },
    /// Reassembled artifact produced by finalize
    Merged {
        operation_id: String,
        total_chunks: usize,
    },
}

impl EntryMetadata {
    pub fn is_chunk(&self) -> bool {
        matches!(self, EntryMetadata::Chunk { .. })
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, EntryMetadata::Merged { .. })
    }

    pub fn operation_id(&self) -> Option<&str> {
        match self {
            EntryMetadata::Direct => None,
            EntryMetadata::Chunk { operation_id, .. }
            | EntryMetadata::Merged { operation_id, .. } => Some(operation_id),
        }
    }
}

/// One stored path with its content and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub path: String,
    pub content: Bytes,
    pub timestamp: DateTime<Utc>,
    pub metadata: EntryMetadata,
}

impl CacheEntry {
    pub fn write_result(&self) -> WriteResult {
        WriteResult {
            path: self.path.clone(),
            size: self.content.len(),
            timestamp: self.timestamp,
        }
    }
}

/// Result of [`crate::orchestrator::ChunkedWriter::write_content`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Content fit in one write
    Direct(WriteResult),
    /// Content was split, written chunk by chunk, then merged at the target path
    Chunked {
        operation_id: String,
        /// Per-chunk results, ascending by index
        chunks: Vec<WriteResult>,
        /// The reassembled write at the original path
        merged: WriteResult,
    },
}

impl WriteOutcome {
    /// The write that landed at the requested path
    pub fn final_result(&self) -> &WriteResult {
        match self {
            WriteOutcome::Direct(result) => result,
            WriteOutcome::Chunked { merged, .. } => merged,
        }
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self, WriteOutcome::Chunked { .. })
    }

    pub fn chunk_results(&self) -> &[WriteResult] {
        match self {
            WriteOutcome::Direct(_) => &[],
            WriteOutcome::Chunked { chunks, .. } => chunks,
        }
    }
}

/// Read-only progress snapshot of a chunked write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationStatus {
    pub total: usize,
    pub completed: usize,
    pub progress_percent: f64,
    pub is_complete: bool,
}

impl OperationStatus {
    pub fn new(total: usize, completed: usize) -> Self {
        let progress_percent = if total == 0 {
            100.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        Self {
            total,
            completed,
            progress_percent,
            is_complete: completed >= total,
        }
    }
}
