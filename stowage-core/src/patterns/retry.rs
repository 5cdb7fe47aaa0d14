//! Retry and backoff patterns for handling transient failures
//!
//! [`RetryExecutor`] runs a fallible async operation, classifies each failure
//! through the error taxonomy and either retries after a backoff delay or
//! returns a terminal [`StowageError::Wrapped`] failure.
//!
//! With the default configuration (3 attempts, 1s base, 10s cap, no jitter)
//! the waits are 1s before attempt 2 and 2s before attempt 3.

use crate::config::RetrySettings;
use crate::error::{ErrorContext, ErrorKind, StowageError, StowageResult};
use crate::patterns::cancellation::CancellationSignal;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff strategy for retry operations
#[derive(Debug, Clone)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential increase in delay (base * multiplier^(attempt - 1))
    Exponential {
        base: Duration,
        max: Duration,
        multiplier: f64,
    },
}

impl BackoffStrategy {
    /// Calculate the delay after the given failed attempt (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(duration) => *duration,

            BackoffStrategy::Exponential {
                base,
                max,
                multiplier,
            } => {
                let factor = multiplier.powf(attempt.saturating_sub(1) as f64);
                let delay_ms = base.as_millis() as f64 * factor;
                if !delay_ms.is_finite() || delay_ms >= max.as_millis() as f64 {
                    return *max;
                }
                std::cmp::min(Duration::from_millis(delay_ms as u64), *max)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        BackoffStrategy::Exponential {
            base: Duration::from_millis(crate::config::DEFAULT_RETRY_BASE_DELAY_MS),
            max: Duration::from_millis(crate::config::DEFAULT_RETRY_MAX_DELAY_MS),
            multiplier: 2.0,
        }
    }
}

/// Jitter strategy for retry delays
#[derive(Debug, Clone, Default)]
pub enum JitterStrategy {
    /// No jitter applied
    #[default]
    None,
    /// Add random percentage: delay * (0.5 to 1.5)
    Proportional,
    /// Full jitter: random delay between 0 and calculated delay
    Full,
}

/// Configuration for retry operations
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial attempt)
    pub max_attempts: u32,
    /// Backoff strategy to use
    pub backoff: BackoffStrategy,
    /// Jitter applied on top of the backoff delay
    pub jitter_strategy: JitterStrategy,
    /// Function to determine if an error is retryable
    pub is_retryable: fn(&StowageError) -> bool,
    /// Per-operation identifier for better observability
    pub operation_name: Option<String>,
    /// Enable detailed retry logging
    pub enable_logging: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: crate::config::DEFAULT_MAX_RETRIES,
            backoff: BackoffStrategy::default(),
            jitter_strategy: JitterStrategy::None,
            is_retryable: default_is_retryable,
            operation_name: None,
            enable_logging: true,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self::exponential(settings.max_retries, settings.base_delay, settings.max_delay)
    }
}

impl RetryConfig {
    /// Create a simple fixed delay retry config
    pub fn fixed(attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: attempts,
            backoff: BackoffStrategy::Fixed(delay),
            ..Default::default()
        }
    }

    /// Create a doubling backoff retry config capped at `max`
    pub fn exponential(attempts: u32, base: Duration, max: Duration) -> Self {
        Self {
            max_attempts: attempts,
            backoff: BackoffStrategy::Exponential {
                base,
                max,
                multiplier: 2.0,
            },
            ..Default::default()
        }
    }

    /// Set operation name for better observability
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Enable or disable logging
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }

    /// Set custom jitter strategy
    pub fn with_jitter_strategy(mut self, strategy: JitterStrategy) -> Self {
        self.jitter_strategy = strategy;
        self
    }

    /// Replace the retryability predicate
    ///
    /// Permanent failures are never retried, whatever the predicate says.
    pub fn with_classifier(mut self, is_retryable: fn(&StowageError) -> bool) -> Self {
        self.is_retryable = is_retryable;
        self
    }
}

/// Default function to determine if an error is retryable
pub fn default_is_retryable(error: &StowageError) -> bool {
    error.kind() == ErrorKind::Retryable
}

/// Apply jitter to a base delay using the specified strategy
fn apply_jitter(base_delay: Duration, strategy: &JitterStrategy) -> Duration {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    match strategy {
        JitterStrategy::None => base_delay,

        JitterStrategy::Proportional => {
            let jitter_factor = rng.gen_range(0.5..1.5);
            Duration::from_millis((base_delay.as_millis() as f64 * jitter_factor) as u64)
        }

        JitterStrategy::Full => {
            let max_delay_ms = base_delay.as_millis() as u64;
            if max_delay_ms == 0 {
                base_delay
            } else {
                Duration::from_millis(rng.gen_range(0..=max_delay_ms))
            }
        }
    }
}

/// Runs fallible operations under the configured retry budget
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
    cancellation: Option<CancellationSignal>,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            cancellation: None,
        }
    }

    /// Check this signal before every attempt and while backing off
    pub fn with_cancellation(mut self, signal: CancellationSignal) -> Self {
        self.cancellation = Some(signal);
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Wait inserted after `attempt` failed, jitter included
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.config.backoff.delay(attempt);
        apply_jitter(delay, &self.config.jitter_strategy)
    }

    /// Run `operation` until it succeeds, fails permanently, or the retry
    /// budget is spent.
    ///
    /// Non-retryable failures come back wrapped with `context` after a single
    /// attempt. Exhaustion yields a wrapped failure naming the attempt count
    /// and the last error. Cancellation surfaces as
    /// [`StowageError::Cancelled`].
    pub async fn with_retry<F, Fut, T>(
        &self,
        mut operation: F,
        context: ErrorContext,
    ) -> StowageResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StowageResult<T>>,
    {
        let name = self
            .config
            .operation_name
            .as_deref()
            .or(context.operation())
            .unwrap_or("operation")
            .to_string();
        let mut attempt = 0;

        loop {
            attempt += 1;

            if let Some(signal) = &self.cancellation {
                signal.check(&name)?;
            }

            let error = match operation().await {
                Ok(result) => {
                    if attempt > 1 && self.config.enable_logging {
                        debug!("{} succeeded after {} attempts", name, attempt);
                    }
                    return Ok(result);
                }
                Err(error) => error,
            };

            if error.kind() == ErrorKind::Cancelled {
                return Err(error);
            }

            if error.kind() == ErrorKind::Permanent || !(self.config.is_retryable)(&error) {
                debug!("Error is not retryable: {}", error);
                let message = error.to_string();
                return Err(error.wrap(message, attempt, context.with("attempts", attempt)));
            }

            if attempt >= self.config.max_attempts {
                warn!(
                    "Max retry attempts ({}) reached for {}",
                    self.config.max_attempts, name
                );
                let message = format!(
                    "{} failed after {} attempts: {}",
                    name, attempt, error
                );
                return Err(error.wrap(message, attempt, context.with("attempts", attempt)));
            }

            let delay = self.delay_for_attempt(attempt);

            if self.config.enable_logging {
                warn!(
                    "Retry attempt {}/{} for {} after error: {} (waiting {:?})",
                    attempt, self.config.max_attempts, name, error, delay
                );
            }

            match &self.cancellation {
                Some(signal) => {
                    tokio::select! {
                        _ = sleep(delay) => {}
                        _ = signal.cancelled() => return Err(StowageError::cancelled(&name)),
                    }
                }
                None => sleep(delay).await,
            }
        }
    }
}

/// Retry an async operation with the given configuration
pub async fn retry<F, Fut, T>(config: RetryConfig, operation: F) -> StowageResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StowageResult<T>>,
{
    let context = ErrorContext::for_operation(
        config.operation_name.as_deref().unwrap_or("operation"),
    );
    RetryExecutor::new(config).with_retry(operation, context).await
}
