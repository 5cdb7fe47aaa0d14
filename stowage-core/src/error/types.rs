//! Core error types for Stowage
//!
//! This module contains the [`StowageError`] enum, the [`ErrorKind`] tag used
//! for retry classification, and the associated result alias.

use super::context::ErrorContext;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Classification tag for a [`StowageError`]
///
/// The retry executor decides whether to try again purely from this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transient failure that may succeed on another attempt
    Retryable,
    /// Validation-style failure that will fail the same way every time
    Permanent,
    /// Terminal failure produced by the retry executor
    Wrapped,
    /// The operation was abandoned because a cancellation signal fired
    Cancelled,
    /// Any other failure; treated as non-retryable
    Generic,
}

/// Error type for all Stowage operations
#[derive(Error, Debug)]
pub enum StowageError {
    // Permanent errors
    #[error("Validation failed: {}", format_details(.details))]
    Validation { details: Vec<String> },

    // Retryable errors
    #[error("Temporary failure: {details}")]
    TemporaryFailure { details: String },

    #[error("Transport error{}: {message}", format_status(.status))]
    Transport { status: Option<u16>, message: String },

    #[error("Connection reset: {details}")]
    ConnectionReset { details: String },

    #[error("Operation timed out: {operation} after {duration:?}")]
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },

    // Generic errors
    #[error("Storage operation '{operation}' failed")]
    Storage {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] Box<std::io::Error>),

    #[error("Configuration error in {component}: {message}")]
    ConfigurationError { component: String, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Terminal errors
    #[error("{message}")]
    Wrapped {
        message: String,
        attempts: u32,
        context: ErrorContext,
        timestamp: DateTime<Utc>,
        #[source]
        source: Box<StowageError>,
    },

    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },
}

impl StowageError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StowageError::Validation { .. } => ErrorKind::Permanent,
            StowageError::TemporaryFailure { .. }
            | StowageError::ConnectionReset { .. }
            | StowageError::Timeout { .. } => ErrorKind::Retryable,
            StowageError::Transport { status, .. } => match status {
                Some(code) if *code >= 500 => ErrorKind::Retryable,
                _ => ErrorKind::Generic,
            },
            StowageError::Wrapped { .. } => ErrorKind::Wrapped,
            StowageError::Cancelled { .. } => ErrorKind::Cancelled,
            StowageError::Storage { .. }
            | StowageError::IoError(_)
            | StowageError::ConfigurationError { .. }
            | StowageError::Internal { .. } => ErrorKind::Generic,
        }
    }

    /// Whether the retry executor may attempt the operation again
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Retryable
    }

    /// Whether this error, or the error it wraps, is a cancellation
    pub fn is_cancelled(&self) -> bool {
        self.root_cause().kind() == ErrorKind::Cancelled
    }

    /// Follow `Wrapped` layers down to the error that started the chain
    pub fn root_cause(&self) -> &StowageError {
        let mut current = self;
        while let StowageError::Wrapped { source, .. } = current {
            current = source.as_ref();
        }
        current
    }

    /// Validation details, if the root cause is a permanent validation failure
    pub fn validation_details(&self) -> Option<&[String]> {
        match self.root_cause() {
            StowageError::Validation { details } => Some(details),
            _ => None,
        }
    }
}

// Helper function to format validation details
pub fn format_details(details: &[String]) -> String {
    if details.is_empty() {
        return "no details".to_string();
    }
    details.join("; ")
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {})", code),
        None => String::new(),
    }
}

pub type StowageResult<T> = std::result::Result<T, StowageError>;
