//! Content size analysis

use super::ContentBlob;
use crate::config::ChunkingConfig;
use serde::Serialize;

/// Whether and how a blob must be split before writing
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeAnalysis {
    /// Byte length
    pub size: usize,
    pub requires_chunking: bool,
    /// `ceil(size / chunk_size)` when chunking, otherwise 1
    pub chunks: usize,
    pub approaching_limit: bool,
}

/// Pure size check against a fixed chunk size
#[derive(Debug, Clone, Copy)]
pub struct ContentAnalyzer {
    chunk_size: usize,
    warning_threshold: f64,
}

impl ContentAnalyzer {
    pub fn new(chunk_size: usize, warning_threshold: f64) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            warning_threshold,
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.warning_threshold)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn analyze(&self, content: &ContentBlob) -> SizeAnalysis {
        let size = content.size();
        let requires_chunking = size > self.chunk_size;
        let chunks = if requires_chunking {
            size.div_ceil(self.chunk_size)
        } else {
            1
        };

        SizeAnalysis {
            size,
            requires_chunking,
            chunks,
            approaching_limit: size as f64 > self.chunk_size as f64 * self.warning_threshold,
        }
    }
}

impl Default for ContentAnalyzer {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(len: usize) -> ContentBlob {
        ContentBlob::from(vec![b'x'; len])
    }

    #[test]
    fn test_small_content_is_single_chunk() {
        let analysis = ContentAnalyzer::default().analyze(&blob(10));
        assert_eq!(analysis.size, 10);
        assert!(!analysis.requires_chunking);
        assert_eq!(analysis.chunks, 1);
        assert!(!analysis.approaching_limit);
    }

    #[test]
    fn test_exactly_chunk_size_does_not_chunk() {
        let analysis = ContentAnalyzer::default().analyze(&blob(50_000));
        assert!(!analysis.requires_chunking);
        assert_eq!(analysis.chunks, 1);
        assert!(analysis.approaching_limit);
    }

    #[test]
    fn test_warning_threshold_is_strict() {
        let analyzer = ContentAnalyzer::default();
        assert!(!analyzer.analyze(&blob(40_000)).approaching_limit);
        assert!(analyzer.analyze(&blob(40_001)).approaching_limit);
    }

    #[test]
    fn test_oversized_content_chunk_count() {
        let analysis = ContentAnalyzer::default().analyze(&blob(120_000));
        assert!(analysis.requires_chunking);
        assert_eq!(analysis.chunks, 3);

        let analysis = ContentAnalyzer::default().analyze(&blob(100_001));
        assert_eq!(analysis.chunks, 3);
    }

    #[test]
    fn test_empty_content() {
        let analysis = ContentAnalyzer::default().analyze(&ContentBlob::default());
        assert_eq!(analysis.size, 0);
        assert_eq!(analysis.chunks, 1);
    }
}
