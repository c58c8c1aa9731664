//! Instance identity and lifecycle state enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a managed compute instance.
///
/// A handle is immutable once created; only the lifecycle state observed
/// for the instance it names changes over time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceHandle {
    id: String,
}

impl InstanceHandle {
    /// Creates a handle for the given instance identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Returns the instance identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// The lifecycle state of a compute instance.
///
/// `Stopped` and `Terminated` are terminal; the remaining named states are
/// transient and expected to change without further external input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleState {
    /// Instance is being provisioned.
    Pending,
    /// Instance is running.
    Running,
    /// Instance is on its way to termination.
    ShuttingDown,
    /// Instance is on its way to a stop.
    Stopping,
    /// Instance is stopped.
    Stopped,
    /// Instance is terminated.
    Terminated,
    /// State could not be determined from the API response.
    Unknown,
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::ShuttingDown => write!(f, "shutting-down"),
            Self::Stopping => write!(f, "stopping"),
            Self::Stopped => write!(f, "stopped"),
            Self::Terminated => write!(f, "terminated"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl LifecycleState {
    /// Parses the wire name reported by the compute API.
    ///
    /// Unrecognized names map to [`LifecycleState::Unknown`] rather than
    /// failing, so a provider adding states does not break polling.
    #[must_use]
    pub fn from_api_name(name: &str) -> Self {
        match name {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "shutting-down" => Self::ShuttingDown,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            "terminated" => Self::Terminated,
            _ => Self::Unknown,
        }
    }

    /// Returns true if the instance will not transition further without
    /// external action.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Terminated)
    }

    /// Returns true if the state is expected to change on its own.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !self.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_handle() {
        let handle = InstanceHandle::new("i-0123456789abcdef0");
        assert_eq!(handle.id(), "i-0123456789abcdef0");
        assert_eq!(handle.to_string(), "i-0123456789abcdef0");
    }

    #[test]
    fn test_lifecycle_state_display() {
        assert_eq!(LifecycleState::ShuttingDown.to_string(), "shutting-down");
        assert_eq!(LifecycleState::Stopped.to_string(), "stopped");
        assert_eq!(LifecycleState::Running.to_string(), "running");
    }

    #[test]
    fn test_lifecycle_state_from_api_name() {
        assert_eq!(LifecycleState::from_api_name("stopping"), LifecycleState::Stopping);
        assert_eq!(LifecycleState::from_api_name("shutting-down"), LifecycleState::ShuttingDown);
        assert_eq!(LifecycleState::from_api_name("hibernated"), LifecycleState::Unknown);
    }

    #[test]
    fn test_lifecycle_state_terminal() {
        assert!(LifecycleState::Stopped.is_terminal());
        assert!(LifecycleState::Terminated.is_terminal());
        assert!(!LifecycleState::Stopping.is_terminal());
        assert!(!LifecycleState::Running.is_terminal());
        assert!(LifecycleState::Pending.is_transient());
    }

    #[test]
    fn test_lifecycle_state_serialize() {
        let json = serde_json::to_string(&LifecycleState::ShuttingDown).unwrap();
        assert_eq!(json, r#""shutting-down""#);

        let deserialized: LifecycleState = serde_json::from_str(r#""stopped""#).unwrap();
        assert_eq!(deserialized, LifecycleState::Stopped);
    }
}
