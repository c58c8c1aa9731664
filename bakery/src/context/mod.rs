//! Shared execution context for pipeline steps.
//!
//! The driver owns one context per pipeline run and hands it to every step
//! in sequence. Cross-step data lives in explicit typed slots rather than a
//! string-keyed bag, so a missing or mis-shaped dependency surfaces as a
//! [`ProvisionError::ContractViolation`] at the accessor instead of a
//! runtime downcast failure.

#[cfg(test)]
mod context_tests;

use crate::cancellation::CancellationToken;
use crate::compute::{ComputeApi, InstanceHandle};
use crate::errors::ProvisionError;
use crate::report::{Reporter, TracingReporter};
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// The mutable context shared by all steps of one pipeline run.
///
/// Written by at most one step at a time; steps execute strictly
/// sequentially, so the interior locks guard against nothing more exotic
/// than a reporter thread reading while a step writes.
pub struct StepContext {
    /// Identifier of this pipeline run, for log correlation.
    run_id: Uuid,
    /// Authenticated compute API handle, supplied by the driver.
    client: Option<Arc<dyn ComputeApi>>,
    /// The instance the run operates on, supplied by an earlier step or
    /// the driver.
    resource: Option<InstanceHandle>,
    /// User-facing output channel.
    reporter: Arc<dyn Reporter>,
    /// Shared cancellation token for the run.
    cancellation: Arc<CancellationToken>,
    /// Error slot, written by the halting step and consumed by the driver.
    error: RwLock<Option<ProvisionError>>,
}

impl std::fmt::Debug for StepContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepContext")
            .field("run_id", &self.run_id)
            .field("has_client", &self.client.is_some())
            .field("resource", &self.resource)
            .field("has_error", &self.has_error())
            .finish()
    }
}

impl StepContext {
    /// Creates an empty context with a fresh run id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            client: None,
            resource: None,
            reporter: Arc::new(TracingReporter),
            cancellation: CancellationToken::new(),
            error: RwLock::new(None),
        }
    }

    /// Sets the compute API client.
    #[must_use]
    pub fn with_client(mut self, client: Arc<dyn ComputeApi>) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the target instance.
    #[must_use]
    pub fn with_resource(mut self, resource: InstanceHandle) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Sets the reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Sets the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: Arc<CancellationToken>) -> Self {
        self.cancellation = token;
        self
    }

    /// Returns the run identifier.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the compute API client.
    ///
    /// # Errors
    ///
    /// Returns a [`ProvisionError::ContractViolation`] when the driver did
    /// not supply a client.
    pub fn client(&self) -> Result<Arc<dyn ComputeApi>, ProvisionError> {
        self.client.clone().ok_or_else(|| {
            ProvisionError::contract_violation("compute api client missing from step context")
        })
    }

    /// Returns the target instance handle.
    ///
    /// # Errors
    ///
    /// Returns a [`ProvisionError::ContractViolation`] when no instance was
    /// supplied.
    pub fn resource(&self) -> Result<InstanceHandle, ProvisionError> {
        self.resource.clone().ok_or_else(|| {
            ProvisionError::contract_violation("instance handle missing from step context")
        })
    }

    /// Returns the reporter.
    #[must_use]
    pub fn reporter(&self) -> &Arc<dyn Reporter> {
        &self.reporter
    }

    /// Returns the cancellation token.
    #[must_use]
    pub fn cancellation(&self) -> &Arc<CancellationToken> {
        &self.cancellation
    }

    /// Returns true if cancellation has been requested for the run.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Requests cancellation of the run.
    pub fn cancel(&self, reason: impl Into<String>) {
        self.cancellation.cancel(reason);
    }

    /// Writes the classified error for a halting step.
    pub fn record_error(&self, error: ProvisionError) {
        *self.error.write() = Some(error);
    }

    /// Returns a copy of the recorded error, if any.
    #[must_use]
    pub fn error(&self) -> Option<ProvisionError> {
        self.error.read().clone()
    }

    /// Removes and returns the recorded error.
    pub fn take_error(&self) -> Option<ProvisionError> {
        self.error.write().take()
    }

    /// Returns true if an error has been recorded.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.read().is_some()
    }
}

impl Default for StepContext {
    fn default() -> Self {
        Self::new()
    }
}
