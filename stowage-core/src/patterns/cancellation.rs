//! Cooperative cancellation for long-running writes
//!
//! A [`CancellationSignal`] is a cheap clonable handle. Every clone observes
//! the same flag, so the caller can keep one and hand another to the writer.

use std::sync::Arc;
use tokio::sync::watch;

use crate::error::{StowageError, StowageResult};

#[derive(Debug, Clone)]
pub struct CancellationSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationSignal {
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Fail with a cancellation error if the signal has fired
    pub fn check(&self, operation: &str) -> StowageResult<()> {
        if self.is_cancelled() {
            return Err(StowageError::cancelled(operation));
        }
        Ok(())
    }

    /// Resolves once the signal fires
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // Sender is owned by self, so the channel cannot close here.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}
