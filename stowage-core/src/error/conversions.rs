//! From trait implementations for StowageError
//!
//! These conversions let `?` lift foreign errors into the crate taxonomy.
//! IO errors whose kind signals a dropped connection or a timeout land in the
//! retryable variants; everything else stays generic.

use super::types::StowageError;
use std::io::ErrorKind as IoKind;

impl From<std::io::Error> for StowageError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            IoKind::ConnectionReset | IoKind::ConnectionAborted | IoKind::BrokenPipe => {
                StowageError::ConnectionReset {
                    details: err.to_string(),
                }
            }
            IoKind::TimedOut => StowageError::Timeout {
                operation: "io".to_string(),
                duration: std::time::Duration::from_secs(0),
            },
            _ => StowageError::IoError(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for StowageError {
    fn from(err: serde_json::Error) -> Self {
        StowageError::storage("json_serialization", err)
    }
}

impl From<toml::de::Error> for StowageError {
    fn from(err: toml::de::Error) -> Self {
        StowageError::ConfigurationError {
            component: "toml_parser".to_string(),
            message: format!("Failed to parse TOML: {}", err),
        }
    }
}

// Async/Task error conversions
impl From<tokio::task::JoinError> for StowageError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            StowageError::Cancelled {
                operation: "spawned task".to_string(),
            }
        } else if err.is_panic() {
            StowageError::Internal {
                message: "Task panicked".to_string(),
            }
        } else {
            StowageError::Internal {
                message: format!("Task join failed: {}", err),
            }
        }
    }
}

impl From<tokio::time::error::Elapsed> for StowageError {
    fn from(_err: tokio::time::error::Elapsed) -> Self {
        StowageError::Timeout {
            operation: "async_operation".to_string(),
            duration: std::time::Duration::from_secs(0), // Duration not available from Elapsed
        }
    }
}
