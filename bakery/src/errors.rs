//! Classified errors surfaced by provisioning steps.
//!
//! Every halt path stores exactly one of these in the step context's error
//! slot, so the driver can tell a user interrupt from a provider refusal
//! from an integration bug when selecting its final report and exit code.

use crate::compute::LifecycleState;
use thiserror::Error;

/// The classified error carried by a failed transition or a halted step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    /// The instance identifier is unrecognized by the API. Fatal when seen
    /// on the initiating call; tolerated on status queries only inside the
    /// poller's bounded eventual-consistency window.
    #[error("instance {id} was not found")]
    NotFound {
        /// The unrecognized instance identifier.
        id: String,
    },

    /// The provider refused the operation, or a transient failure outlived
    /// its retry budget.
    #[error("compute api error: {message}")]
    Api {
        /// The underlying failure text.
        message: String,
    },

    /// Cooperative cancellation was observed. Distinct from an API failure
    /// so "the user stopped this" never reads as "the provider refused".
    #[error("operation cancelled: {reason}")]
    Cancelled {
        /// The reason given when cancellation was requested.
        reason: String,
    },

    /// The overall deadline elapsed while the instance remained in a
    /// non-terminal state.
    #[error("timed out after {waited_ms}ms waiting for instance {id} to reach {target}")]
    Timeout {
        /// The instance identifier.
        id: String,
        /// The terminal state that was being waited for.
        target: LifecycleState,
        /// How long the poller waited, in milliseconds.
        waited_ms: u64,
    },

    /// A required context slot was missing or mis-shaped. This is a driver
    /// bug, not an environmental condition; it is never retried.
    #[error("step contract violation: {message}")]
    ContractViolation {
        /// What the driver failed to supply.
        message: String,
    },
}

impl ProvisionError {
    /// Creates an API error from anything displayable.
    #[must_use]
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Creates a contract-violation error.
    #[must_use]
    pub fn contract_violation(message: impl Into<String>) -> Self {
        Self::ContractViolation {
            message: message.into(),
        }
    }

    /// Returns true for cooperative cancellation.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns true for an elapsed overall deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true for a driver/integration bug.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }

    /// Short label for the classification, for structured log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Api { .. } => "api",
            Self::Cancelled { .. } => "cancelled",
            Self::Timeout { .. } => "timeout",
            Self::ContractViolation { .. } => "contract_violation",
        }
    }
}
