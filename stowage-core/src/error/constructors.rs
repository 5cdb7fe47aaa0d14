//! Constructor methods and convenience functions for StowageError
//!
//! This module provides factory methods for creating structured errors with
//! proper context and error chaining.

use super::context::ErrorContext;
use super::types::StowageError;
use chrono::Utc;

impl StowageError {
    /// Create a permanent validation error from a list of details
    ///
    /// # Examples
    /// ```rust
    /// use stowage_core::error::{ErrorKind, StowageError};
    ///
    /// let err = StowageError::validation(["path must not be empty"]);
    /// assert_eq!(err.kind(), ErrorKind::Permanent);
    /// ```
    pub fn validation<I, S>(details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StowageError::Validation {
            details: details.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a retryable temporary failure
    pub fn temporary(details: impl Into<String>) -> Self {
        StowageError::TemporaryFailure {
            details: details.into(),
        }
    }

    /// Create a transport failure; retryable when the status is a server error
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        StowageError::Transport {
            status,
            message: message.into(),
        }
    }

    /// Create a connection reset error
    pub fn connection_reset(details: impl Into<String>) -> Self {
        StowageError::ConnectionReset {
            details: details.into(),
        }
    }

    /// Create a Storage error with a boxed source
    pub fn storage<E: std::error::Error + Send + Sync + 'static>(
        operation: impl Into<String>,
        source: E,
    ) -> Self {
        StowageError::Storage {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Create a configuration error with component and message
    pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        StowageError::ConfigurationError {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error with detailed context
    pub fn invalid_config<T: std::fmt::Display>(field: &str, value: T, reason: &str) -> Self {
        StowageError::ConfigurationError {
            component: field.to_string(),
            message: format!("Invalid value '{}': {}", value, reason),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        StowageError::Internal {
            message: message.into(),
        }
    }

    pub fn cancelled(operation: impl Into<String>) -> Self {
        StowageError::Cancelled {
            operation: operation.into(),
        }
    }

    /// Wrap an error into its terminal form, stamped with the current time
    pub fn wrap(self, message: impl Into<String>, attempts: u32, context: ErrorContext) -> Self {
        StowageError::Wrapped {
            message: message.into(),
            attempts,
            context,
            timestamp: Utc::now(),
            source: Box::new(self),
        }
    }
}
