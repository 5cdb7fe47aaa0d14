//! Resilience patterns shared by the persistence core
//!
//! Retry with backoff and cooperative cancellation live here so that the
//! orchestrator and any caller-supplied operation use the same machinery.

pub mod cancellation;
pub mod retry;

pub use cancellation::CancellationSignal;
pub use retry::{
    default_is_retryable, retry, BackoffStrategy, JitterStrategy, RetryConfig, RetryExecutor,
};
