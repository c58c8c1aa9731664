//! Scripted compute API doubles for testing.

use crate::cancellation::CancellationToken;
use crate::compute::{ApiError, ComputeApi, InstanceHandle, LifecycleState};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// A compute API double that replays scripted responses and records calls.
///
/// Responses are consumed in FIFO order. When the stop queue runs dry the
/// call succeeds; when the status queue runs dry the configured fallback is
/// returned, which lets a test model a resource that stays in one state
/// forever.
#[derive(Default)]
pub struct ScriptedComputeApi {
    stop_responses: Mutex<VecDeque<Result<(), ApiError>>>,
    status_responses: Mutex<VecDeque<Result<LifecycleState, ApiError>>>,
    fallback_status: Mutex<Option<Result<LifecycleState, ApiError>>>,
    stop_calls: Mutex<Vec<String>>,
    status_calls: Mutex<Vec<String>>,
    cancel_after: Mutex<Option<(usize, Arc<CancellationToken>)>>,
}

impl std::fmt::Debug for ScriptedComputeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedComputeApi")
            .field("stop_calls", &self.stop_call_count())
            .field("status_calls", &self.status_call_count())
            .finish()
    }
}

impl ScriptedComputeApi {
    /// Creates an empty scripted API.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a response for the next `initiate_stop` call.
    pub fn script_stop(&self, response: Result<(), ApiError>) {
        self.stop_responses.lock().push_back(response);
    }

    /// Enqueues a response for the next `describe_status` call.
    pub fn script_status(&self, response: Result<LifecycleState, ApiError>) {
        self.status_responses.lock().push_back(response);
    }

    /// Enqueues one status response per state, in order.
    pub fn script_status_sequence(&self, states: impl IntoIterator<Item = LifecycleState>) {
        let mut queue = self.status_responses.lock();
        for state in states {
            queue.push_back(Ok(state));
        }
    }

    /// Sets the response returned once the status queue is exhausted.
    pub fn set_fallback_status(&self, response: Result<LifecycleState, ApiError>) {
        *self.fallback_status.lock() = Some(response);
    }

    /// Cancels `token` with reason `"scripted cancellation"` as soon as the
    /// given total number of status queries has been made.
    pub fn cancel_after_status_queries(&self, queries: usize, token: Arc<CancellationToken>) {
        *self.cancel_after.lock() = Some((queries, token));
    }

    /// Returns how many stop requests were issued.
    #[must_use]
    pub fn stop_call_count(&self) -> usize {
        self.stop_calls.lock().len()
    }

    /// Returns how many status queries were made.
    #[must_use]
    pub fn status_call_count(&self) -> usize {
        self.status_calls.lock().len()
    }

    /// Returns the instance ids passed to `initiate_stop`, in order.
    #[must_use]
    pub fn stop_calls(&self) -> Vec<String> {
        self.stop_calls.lock().clone()
    }

    /// Resets call tracking, keeping any remaining scripted responses.
    pub fn reset_calls(&self) {
        self.stop_calls.lock().clear();
        self.status_calls.lock().clear();
    }
}

#[async_trait]
impl ComputeApi for ScriptedComputeApi {
    async fn initiate_stop(&self, handle: &InstanceHandle) -> Result<(), ApiError> {
        self.stop_calls.lock().push(handle.id().to_string());
        self.stop_responses.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn describe_status(&self, handle: &InstanceHandle) -> Result<LifecycleState, ApiError> {
        let count = {
            let mut calls = self.status_calls.lock();
            calls.push(handle.id().to_string());
            calls.len()
        };

        if let Some((after, token)) = self.cancel_after.lock().clone() {
            if count >= after {
                token.cancel("scripted cancellation");
            }
        }

        let next = self.status_responses.lock().pop_front();
        match next {
            Some(response) => response,
            None => self
                .fallback_status
                .lock()
                .clone()
                .unwrap_or(Err(ApiError::Failed {
                    message: "no scripted status response".to_string(),
                })),
        }
    }
}
