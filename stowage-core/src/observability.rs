//! Logging setup
//!
//! The core only emits `tracing` events. Embedding applications that have no
//! subscriber of their own can call [`init_logging`] once at startup.

use crate::config::DEFAULT_LOG_DIRECTIVE;
use crate::error::{StowageError, StowageResult};
use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber filtered by `RUST_LOG` plus `directive`
///
/// Fails instead of panicking when a global subscriber is already set.
pub fn init_logging(directive: &str) -> StowageResult<()> {
    let filter = EnvFilter::from_default_env().add_directive(directive.parse().map_err(|e| {
        StowageError::configuration("logging", format!("Invalid log directive: {}", e))
    })?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| StowageError::internal(format!("Failed to install subscriber: {}", e)))
}

/// [`init_logging`] with the crate's default directive
pub fn init_default_logging() -> StowageResult<()> {
    init_logging(DEFAULT_LOG_DIRECTIVE)
}
