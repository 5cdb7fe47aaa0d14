//! Chunking configuration

use super::defaults::*;
use super::parse_from_env;
use crate::error::{StowageError, StowageResult};
use serde::{Deserialize, Serialize};

/// Size analysis and chunk splitting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Largest content, in bytes, written in a single put
    pub chunk_size: usize,

    /// Fraction of `chunk_size` above which content is reported as approaching the limit
    pub warning_threshold: f64,

    /// Upper bound on chunk writes in flight for one operation
    pub max_concurrent_writes: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            max_concurrent_writes: DEFAULT_MAX_CONCURRENT_WRITES,
        }
    }
}

impl ChunkingConfig {
    /// Load chunking configuration from environment variables
    pub fn from_env() -> StowageResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            chunk_size: parse_from_env("STOWAGE_CHUNK_SIZE", defaults.chunk_size)?,
            warning_threshold: parse_from_env(
                "STOWAGE_WARNING_THRESHOLD",
                defaults.warning_threshold,
            )?,
            max_concurrent_writes: parse_from_env(
                "STOWAGE_MAX_CONCURRENT_WRITES",
                defaults.max_concurrent_writes,
            )?,
        })
    }

    /// Validate chunking configuration
    pub fn validate(&self) -> StowageResult<()> {
        if self.chunk_size == 0 {
            return Err(StowageError::configuration(
                "chunking.chunk_size",
                "chunk_size must be greater than zero",
            ));
        }

        if !(self.warning_threshold > 0.0 && self.warning_threshold <= 1.0) {
            return Err(StowageError::invalid_config(
                "chunking.warning_threshold",
                self.warning_threshold,
                "must be in (0, 1]",
            ));
        }

        if self.max_concurrent_writes == 0 {
            return Err(StowageError::configuration(
                "chunking.max_concurrent_writes",
                "at least one concurrent write is required",
            ));
        }

        Ok(())
    }
}
