//! Retry configuration

use super::defaults::*;
use super::{parse_duration_ms_from_env, parse_from_env};
use crate::error::{StowageError, StowageResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry budget and exponential backoff bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum attempts, the first one included
    pub max_retries: u32,

    /// Wait after the first failed attempt
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,

    /// Upper bound on any single wait
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: duration_ms(DEFAULT_RETRY_BASE_DELAY_MS),
            max_delay: duration_ms(DEFAULT_RETRY_MAX_DELAY_MS),
        }
    }
}

impl RetrySettings {
    /// Load retry configuration from environment variables
    pub fn from_env() -> StowageResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_retries: parse_from_env("STOWAGE_MAX_RETRIES", defaults.max_retries)?,
            base_delay: parse_duration_ms_from_env(
                "STOWAGE_RETRY_BASE_DELAY_MS",
                defaults.base_delay,
            )?,
            max_delay: parse_duration_ms_from_env(
                "STOWAGE_RETRY_MAX_DELAY_MS",
                defaults.max_delay,
            )?,
        })
    }

    /// Validate retry configuration
    pub fn validate(&self) -> StowageResult<()> {
        if self.max_retries == 0 {
            return Err(StowageError::configuration(
                "retry.max_retries",
                "at least one attempt is required",
            ));
        }

        if self.base_delay > self.max_delay {
            return Err(StowageError::configuration(
                "retry.base_delay",
                format!(
                    "base_delay {:?} exceeds max_delay {:?}",
                    self.base_delay, self.max_delay
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_delay_above_max_is_rejected() {
        let settings = RetrySettings {
            max_retries: 3,
            base_delay: Duration::from_secs(20),
            max_delay: Duration::from_secs(10),
        };
        assert!(settings.validate().is_err());
    }
}
