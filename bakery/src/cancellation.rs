//! Cooperative cancellation for step execution.
//!
//! Cancellation is advisory: the token may be set at any time from outside
//! a step (e.g. a user interrupt), and loops observe it at iteration
//! boundaries. In-flight API calls are never interrupted.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

/// Token for coordinating cancellation across a pipeline run.
pub struct CancellationToken {
    signal: watch::Sender<bool>,
    reason: Mutex<Option<String>>,
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason.lock())
            .finish()
    }
}

impl CancellationToken {
    /// Creates a new shared cancellation token.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns true if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.signal.borrow()
    }

    /// Returns the cancellation reason if cancelled.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.lock().clone()
    }

    /// Requests cancellation with a reason.
    ///
    /// This is idempotent - only the first reason is stored.
    pub fn cancel(&self, reason: impl Into<String>) {
        let mut slot = self.reason.lock();
        if !self.signal.send_replace(true) {
            *slot = Some(reason.into());
        }
    }

    /// Completes once cancellation has been requested.
    ///
    /// Returns immediately if the token is already cancelled. Intended for
    /// racing against a poll-interval sleep so a nap does not delay
    /// unwinding.
    pub async fn cancelled(&self) {
        let mut rx = self.signal.subscribe();
        // wait_for only errors when the sender is dropped, which cannot
        // happen while &self is borrowed.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            signal,
            reason: Mutex::new(None),
        }
    }
}
