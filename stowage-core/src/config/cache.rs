//! Cache configuration

use super::defaults::*;
use super::parse_duration_ms_from_env;
use crate::error::{StowageError, StowageResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Local cache eviction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entries strictly older than this are removed by eviction
    #[serde(with = "humantime_serde")]
    pub max_age: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: duration_ms(DEFAULT_CACHE_MAX_AGE_MS),
        }
    }
}

impl CacheConfig {
    /// Load cache configuration from environment variables
    pub fn from_env() -> StowageResult<Self> {
        Ok(Self {
            max_age: parse_duration_ms_from_env(
                "STOWAGE_CACHE_MAX_AGE_MS",
                duration_ms(DEFAULT_CACHE_MAX_AGE_MS),
            )?,
        })
    }

    /// Validate cache configuration
    pub fn validate(&self) -> StowageResult<()> {
        if chrono::Duration::from_std(self.max_age).is_err() {
            return Err(StowageError::invalid_config(
                "cache.max_age",
                format!("{:?}", self.max_age),
                "out of range",
            ));
        }
        Ok(())
    }
}
