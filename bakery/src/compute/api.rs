//! Capability surface of the cloud compute API.
//!
//! The crate never depends on a specific SDK or wire format; everything it
//! needs from the provider is expressed by the [`ComputeApi`] trait.

use super::{InstanceHandle, LifecycleState};
use async_trait::async_trait;
use thiserror::Error;

/// A classified error returned by the compute API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The instance identifier is unrecognized by the API.
    #[error("instance not found: {id}")]
    NotFound {
        /// The unrecognized instance identifier.
        id: String,
    },

    /// The instance is in a state incompatible with the requested call.
    #[error("instance {id} is already {state}")]
    IncorrectState {
        /// The instance identifier.
        id: String,
        /// The state reported by the API.
        state: LifecycleState,
    },

    /// A transient failure: rate limiting, connectivity blips, 5xx-class
    /// responses. Safe to retry.
    #[error("transient api failure: {message}")]
    Transient {
        /// The provider's failure text.
        message: String,
    },

    /// A non-transient API failure.
    #[error("api failure: {message}")]
    Failed {
        /// The provider's failure text.
        message: String,
    },
}

impl ApiError {
    /// Creates a not-found error for the given handle.
    #[must_use]
    pub fn not_found(handle: &InstanceHandle) -> Self {
        Self::NotFound {
            id: handle.id().to_string(),
        }
    }

    /// Creates a transient failure.
    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    /// Creates a non-transient failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Returns true if retrying the call may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Authenticated handle to the cloud compute API.
///
/// Implementations wrap a provider SDK client. Both calls are expected to be
/// idempotent from the caller's point of view: requesting a stop for an
/// instance that is already stopping is not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Requests that the instance begin transitioning to a stopped state.
    ///
    /// This only initiates the transition; callers must poll
    /// [`ComputeApi::describe_status`] until a terminal state is reached.
    async fn initiate_stop(&self, handle: &InstanceHandle) -> Result<(), ApiError>;

    /// Queries the current lifecycle state of the instance.
    async fn describe_status(&self, handle: &InstanceHandle) -> Result<LifecycleState, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_classification() {
        assert!(ApiError::transient("throttled").is_transient());
        assert!(!ApiError::failed("bad request").is_transient());
        assert!(!ApiError::not_found(&InstanceHandle::new("i-1")).is_transient());
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::not_found(&InstanceHandle::new("i-404"));
        assert_eq!(err.to_string(), "instance not found: i-404");

        let err = ApiError::IncorrectState {
            id: "i-1".to_string(),
            state: LifecycleState::Stopped,
        };
        assert_eq!(err.to_string(), "instance i-1 is already stopped");
    }

    #[tokio::test]
    async fn test_mock_compute_api() {
        let mut mock = MockComputeApi::new();
        mock.expect_describe_status()
            .returning(|_| Ok(LifecycleState::Running));

        let state = mock
            .describe_status(&InstanceHandle::new("i-1"))
            .await
            .unwrap();
        assert_eq!(state, LifecycleState::Running);
    }
}
