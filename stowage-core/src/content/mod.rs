//! Content measurement, splitting and chunk naming
//!
//! Content is handled as raw bytes ([`bytes::Bytes`]) so that size checks are
//! byte-accurate regardless of text encoding and fragments can be sliced
//! without copying.

pub mod analyzer;
pub mod chunk_path;
pub mod splitter;

pub use analyzer::{ContentAnalyzer, SizeAnalysis};
pub use chunk_path::{
    check_target_path, derive_chunk_path, group_chunk_paths, parse_chunk_path, ChunkPath,
};
pub use splitter::split_content;

use crate::error::StowageResult;
use crate::types::EntryMetadata;
use bytes::Bytes;

/// Raw content plus its measured byte size
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentBlob {
    data: Bytes,
}

impl ContentBlob {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Size in bytes, not characters
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl From<Bytes> for ContentBlob {
    fn from(data: Bytes) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for ContentBlob {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<String> for ContentBlob {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}

impl From<&'static str> for ContentBlob {
    fn from(data: &'static str) -> Self {
        Self::new(data)
    }
}

impl From<&'static [u8]> for ContentBlob {
    fn from(data: &'static [u8]) -> Self {
        Self::new(data)
    }
}

/// One fragment of a chunked write and its position in the operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDescriptor {
    pub index: usize,
    pub total: usize,
    pub content: ContentBlob,
    pub operation_id: String,
}

impl ChunkDescriptor {
    /// Split `content` into `total` descriptors, ascending by index
    pub fn split(operation_id: &str, content: &ContentBlob, total: usize) -> StowageResult<Vec<Self>> {
        let fragments = split_content(content.bytes(), total)?;
        Ok(fragments
            .into_iter()
            .enumerate()
            .map(|(index, fragment)| Self {
                index,
                total,
                content: ContentBlob::from(fragment),
                operation_id: operation_id.to_string(),
            })
            .collect())
    }

    /// Metadata stored with this chunk's cache entry
    pub fn metadata(&self) -> EntryMetadata {
        EntryMetadata::Chunk {
            operation_id: self.operation_id.clone(),
            index: self.index,
            total: self.total,
        }
    }

    /// Where this chunk is stored, given the operation's target path
    pub fn path_for(&self, original: &str) -> String {
        derive_chunk_path(original, &self.operation_id, self.index)
    }
}
