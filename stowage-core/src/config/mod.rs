//! Configuration for the Stowage persistence core
//!
//! Sensible defaults, environment variable overrides (`STOWAGE_*`), TOML files
//! and runtime validation.

use crate::error::{StowageError, StowageResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub mod cache;
pub mod chunking;
pub mod defaults;
pub mod retry;

pub use cache::CacheConfig;
pub use chunking::ChunkingConfig;
pub use defaults::*;
pub use retry::RetrySettings;

/// Root configuration structure for Stowage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StowageConfig {
    /// Size analysis and chunk splitting
    pub chunking: ChunkingConfig,

    /// Retry executor budget and backoff
    pub retry: RetrySettings,

    /// Local cache eviction
    pub cache: CacheConfig,
}

impl StowageConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> StowageResult<Self> {
        let config = Self {
            chunking: ChunkingConfig::from_env()?,
            retry: RetrySettings::from_env()?,
            cache: CacheConfig::from_env()?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys fall back to defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> StowageResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StowageError::configuration(
                "file_io",
                format!("Failed to read configuration: {} (path: {:?})", e, path),
            )
        })?;

        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> StowageResult<()> {
        self.chunking.validate()?;
        self.retry.validate()?;
        self.cache.validate()?;
        Ok(())
    }

    /// Create a test configuration with tiny chunks and near-instant retries
    pub fn test() -> Self {
        let mut config = Self::default();
        config.chunking.chunk_size = 16;
        config.retry.base_delay = Duration::from_millis(1);
        config.retry.max_delay = Duration::from_millis(5);
        config
    }
}

/// Builder for StowageConfig
pub struct StowageConfigBuilder {
    config: StowageConfig,
}

impl StowageConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: StowageConfig::default(),
        }
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunking.chunk_size = size;
        self
    }

    pub fn max_concurrent_writes(mut self, limit: usize) -> Self {
        self.config.chunking.max_concurrent_writes = limit;
        self
    }

    pub fn retry(mut self, retry: RetrySettings) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = cache;
        self
    }

    pub fn build(self) -> StowageResult<StowageConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for StowageConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a millisecond duration from the environment, keeping `default` when unset
pub(crate) fn parse_duration_ms_from_env(key: &str, default: Duration) -> StowageResult<Duration> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| StowageError::invalid_config(key, value, "expected milliseconds")),
        Err(_) => Ok(default),
    }
}

/// Parse any `FromStr` value from the environment, keeping `default` when unset
pub(crate) fn parse_from_env<T>(key: &str, default: T) -> StowageResult<T>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|_| StowageError::invalid_config(key, value, "unparseable value")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_validation() {
        let config = StowageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunking.chunk_size, 50_000);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.cache.max_age, Duration::from_secs(3600));
    }

    #[test]
    fn test_config_builder() {
        let config = StowageConfigBuilder::new()
            .chunk_size(1024)
            .max_concurrent_writes(2)
            .build()
            .unwrap();

        assert_eq!(config.chunking.chunk_size, 1024);
        assert_eq!(config.chunking.max_concurrent_writes, 2);
    }

    #[test]
    fn test_invalid_config() {
        let result = StowageConfigBuilder::new().chunk_size(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_with_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[chunking]
chunk_size = 2048

[retry]
max_retries = 5
base_delay = "250ms"
max_delay = "4s"
"#
        )
        .unwrap();

        let config = StowageConfig::from_file(file.path()).unwrap();
        assert_eq!(config.chunking.chunk_size, 2048);
        assert_eq!(config.chunking.warning_threshold, 0.8);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay, Duration::from_millis(250));
        assert_eq!(config.retry.max_delay, Duration::from_secs(4));
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chunking]\nwarning_threshold = 1.5").unwrap();
        assert!(StowageConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_from_file_missing_path() {
        let err = StowageConfig::from_file("/nonexistent/stowage.toml").unwrap_err();
        assert!(matches!(err, StowageError::ConfigurationError { .. }));
    }

    const ENV_KEYS: [&str; 7] = [
        "STOWAGE_CHUNK_SIZE",
        "STOWAGE_WARNING_THRESHOLD",
        "STOWAGE_MAX_CONCURRENT_WRITES",
        "STOWAGE_MAX_RETRIES",
        "STOWAGE_RETRY_BASE_DELAY_MS",
        "STOWAGE_RETRY_MAX_DELAY_MS",
        "STOWAGE_CACHE_MAX_AGE_MS",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    // The only test touching STOWAGE_* variables, so steps run in sequence.
    #[test]
    fn test_from_env() {
        clear_env();
        let config = StowageConfig::from_env().unwrap();
        assert_eq!(config.chunking.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.retry.base_delay, Duration::from_millis(1000));

        std::env::set_var("STOWAGE_CHUNK_SIZE", "4096");
        std::env::set_var("STOWAGE_MAX_CONCURRENT_WRITES", "8");
        std::env::set_var("STOWAGE_MAX_RETRIES", "5");
        std::env::set_var("STOWAGE_RETRY_BASE_DELAY_MS", "50");
        std::env::set_var("STOWAGE_RETRY_MAX_DELAY_MS", "400");
        std::env::set_var("STOWAGE_CACHE_MAX_AGE_MS", "60000");
        let config = StowageConfig::from_env().unwrap();
        assert_eq!(config.chunking.chunk_size, 4096);
        assert_eq!(config.chunking.max_concurrent_writes, 8);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay, Duration::from_millis(50));
        assert_eq!(config.retry.max_delay, Duration::from_millis(400));
        assert_eq!(config.cache.max_age, Duration::from_secs(60));

        std::env::set_var("STOWAGE_CHUNK_SIZE", "fifty");
        let err = StowageConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("STOWAGE_CHUNK_SIZE"), "{err}");

        std::env::set_var("STOWAGE_CHUNK_SIZE", "4096");
        std::env::set_var("STOWAGE_RETRY_BASE_DELAY_MS", "1.5s");
        let err = StowageConfig::from_env().unwrap_err();
        assert!(matches!(err, StowageError::ConfigurationError { .. }));

        // Parses, but fails validation.
        std::env::set_var("STOWAGE_RETRY_BASE_DELAY_MS", "5000");
        assert!(StowageConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_parse_helpers_fall_back_when_unset() {
        let key = "STOWAGE_TEST_UNSET_HELPER_KEY";
        assert_eq!(parse_from_env(key, 7usize).unwrap(), 7);
        assert_eq!(
            parse_duration_ms_from_env(key, Duration::from_millis(9)).unwrap(),
            Duration::from_millis(9)
        );
    }
}
