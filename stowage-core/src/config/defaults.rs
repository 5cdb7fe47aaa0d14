//! Default configuration values for Stowage
//!
//! This module centralizes all default values to make them easy to find and modify.

use std::time::Duration;

// Chunking defaults
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;
pub const DEFAULT_WARNING_THRESHOLD: f64 = 0.8;
pub const DEFAULT_MAX_CONCURRENT_WRITES: usize = 4;

// Retry defaults
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 10_000;

// Cache defaults
pub const DEFAULT_CACHE_MAX_AGE_MS: u64 = 3_600_000; // 1 hour

// Logging defaults
pub const DEFAULT_LOG_DIRECTIVE: &str = "stowage_core=info";

// Helper functions for Duration creation
pub const fn duration_ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
