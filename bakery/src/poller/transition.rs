//! The resource transition poller.
//!
//! A transition request is issued once; the resource is then polled until it
//! reaches the requested terminal state, the overall deadline elapses,
//! cancellation is observed, or a fatal error surfaces. The per-poll
//! decision is a pure function so the retry logic is testable without any
//! network or mock transport.

use super::backoff::with_retry;
use super::config::PollerConfig;
use crate::cancellation::CancellationToken;
use crate::compute::{ApiError, ComputeApi, InstanceHandle, LifecycleState};
use crate::errors::ProvisionError;
use tokio::time::Instant;

/// A request to drive an instance into a terminal lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    handle: InstanceHandle,
    target: LifecycleState,
    price_hint: Option<String>,
    transition_disabled: bool,
    observed: LifecycleState,
}

impl TransitionRequest {
    /// Creates a request to drive `handle` into `target`.
    #[must_use]
    pub fn new(handle: InstanceHandle, target: LifecycleState) -> Self {
        Self {
            handle,
            target,
            price_hint: None,
            transition_disabled: false,
            observed: LifecycleState::Unknown,
        }
    }

    /// Sets the bid price the instance's capacity was acquired at.
    ///
    /// Spot-style capacity cannot be stopped; a set, non-zero hint makes
    /// the request short-circuit.
    #[must_use]
    pub fn with_price_hint(mut self, price: impl Into<String>) -> Self {
        self.price_hint = Some(price.into());
        self
    }

    /// Disables the transition entirely; the request becomes a no-op.
    #[must_use]
    pub fn with_transition_disabled(mut self, disabled: bool) -> Self {
        self.transition_disabled = disabled;
        self
    }

    /// Records the lifecycle state the caller last observed.
    #[must_use]
    pub fn with_observed(mut self, state: LifecycleState) -> Self {
        self.observed = state;
        self
    }

    /// Returns the target resource handle.
    #[must_use]
    pub fn handle(&self) -> &InstanceHandle {
        &self.handle
    }

    /// Returns the requested terminal state.
    #[must_use]
    pub fn target(&self) -> LifecycleState {
        self.target
    }

    /// Returns the last state the caller observed.
    #[must_use]
    pub fn observed(&self) -> LifecycleState {
        self.observed
    }

    /// Returns true if the whole operation is a no-op: either the
    /// transition is disabled, or the instance runs on spot-style capacity
    /// that cannot be stopped.
    #[must_use]
    pub fn short_circuits(&self) -> bool {
        if self.transition_disabled {
            return true;
        }
        self.price_hint
            .as_deref()
            .is_some_and(|price| !price.is_empty() && price != "0")
    }
}

/// Outcome of polling a resource transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The resource reached the requested terminal state.
    Terminal(LifecycleState),
    /// The resource is still transitioning; the last observed state is
    /// attached (`Unknown` when the status query itself failed benignly).
    StillTransitioning(LifecycleState),
    /// The transition failed with a classified error.
    Failed(ProvisionError),
}

impl PollOutcome {
    /// Returns true if the requested terminal state was reached.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    /// Returns true if the transition failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Running state of the poll loop's eventual-consistency window.
#[derive(Debug, Default)]
pub(crate) struct PollWindow {
    consecutive_not_found: u32,
}

/// Evaluates one status query result against the request.
///
/// Pure apart from the running not-found counter in `window`; the retry
/// policy table lives here and nowhere else.
pub(crate) fn evaluate_poll(
    observed: Result<LifecycleState, ApiError>,
    request: &TransitionRequest,
    window: &mut PollWindow,
    grace: u32,
) -> PollOutcome {
    match observed {
        Ok(state) if state == request.target() => PollOutcome::Terminal(state),
        Ok(state) if state.is_terminal() => PollOutcome::Failed(ProvisionError::api(format!(
            "instance {} entered unexpected terminal state {} while waiting for {}",
            request.handle(),
            state,
            request.target()
        ))),
        Ok(state) => {
            window.consecutive_not_found = 0;
            PollOutcome::StillTransitioning(state)
        }
        Err(ApiError::NotFound { id }) => {
            window.consecutive_not_found += 1;
            if window.consecutive_not_found > grace {
                PollOutcome::Failed(ProvisionError::NotFound { id })
            } else {
                PollOutcome::StillTransitioning(LifecycleState::Unknown)
            }
        }
        Err(err) if err.is_transient() => PollOutcome::StillTransitioning(LifecycleState::Unknown),
        Err(err) => PollOutcome::Failed(ProvisionError::api(err.to_string())),
    }
}

/// Drives a resource from its current state to a requested terminal state
/// and signals the result exactly once.
#[derive(Debug, Clone, Default)]
pub struct TransitionPoller {
    config: PollerConfig,
}

impl TransitionPoller {
    /// Creates a poller with the given configuration.
    #[must_use]
    pub fn new(config: PollerConfig) -> Self {
        Self { config }
    }

    /// Returns the poller configuration.
    #[must_use]
    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Executes the transition described by `request` against `client`.
    ///
    /// Issues the initiating call at most once, then polls until the target
    /// state, a fatal error, the overall deadline, or cancellation. The
    /// returned outcome is always `Terminal` or `Failed`.
    pub async fn transition(
        &self,
        client: &dyn ComputeApi,
        request: &TransitionRequest,
        cancel: &CancellationToken,
    ) -> PollOutcome {
        if !request.target().is_terminal() {
            return PollOutcome::Failed(ProvisionError::contract_violation(format!(
                "transition target {} is not a terminal state",
                request.target()
            )));
        }

        if request.short_circuits() {
            tracing::debug!(
                instance = %request.handle(),
                "Transition short-circuited; not contacting the API"
            );
            return PollOutcome::Terminal(request.observed());
        }

        let started = Instant::now();
        let deadline = started + self.config.max_wait();

        // Pre-flight: skip the initiating call when the instance already
        // reports the target state.
        match client.describe_status(request.handle()).await {
            Ok(state) if state == request.target() => {
                tracing::debug!(
                    instance = %request.handle(),
                    state = %state,
                    "Instance already in target state"
                );
                return PollOutcome::Terminal(state);
            }
            Ok(state) => {
                tracing::trace!(instance = %request.handle(), state = %state, "Pre-flight status");
            }
            Err(ApiError::NotFound { id }) => {
                return PollOutcome::Failed(ProvisionError::NotFound { id });
            }
            Err(err) => {
                tracing::debug!(
                    instance = %request.handle(),
                    error = %err,
                    "Pre-flight status query failed; proceeding to initiate"
                );
            }
        }

        let initiated = with_retry(
            &self.config.initiate_retry,
            "initiate_stop",
            || client.initiate_stop(request.handle()),
            ApiError::is_transient,
        )
        .await;

        match initiated {
            Ok(()) => {}
            Err(ApiError::IncorrectState { state, .. }) if state.is_terminal() => {
                tracing::debug!(
                    instance = %request.handle(),
                    state = %state,
                    "Initiating call reported instance already terminal; confirming by poll"
                );
            }
            Err(ApiError::NotFound { id }) => {
                return PollOutcome::Failed(ProvisionError::NotFound { id });
            }
            Err(err) => {
                return PollOutcome::Failed(ProvisionError::api(err.to_string()));
            }
        }

        let mut window = PollWindow::default();

        loop {
            if cancel.is_cancelled() {
                return cancelled_outcome(cancel);
            }
            if Instant::now() >= deadline {
                return PollOutcome::Failed(ProvisionError::Timeout {
                    id: request.handle().id().to_string(),
                    target: request.target(),
                    waited_ms: started.elapsed().as_millis() as u64,
                });
            }

            let observed = client.describe_status(request.handle()).await;
            match evaluate_poll(observed, request, &mut window, self.config.not_found_grace) {
                PollOutcome::StillTransitioning(state) => {
                    tracing::trace!(
                        instance = %request.handle(),
                        state = %state,
                        target = %request.target(),
                        "Still waiting for transition"
                    );
                }
                outcome => return outcome,
            }

            let nap = self
                .config
                .poll_interval()
                .min(deadline.saturating_duration_since(Instant::now()));
            tokio::select! {
                () = cancel.cancelled() => return cancelled_outcome(cancel),
                () = tokio::time::sleep(nap) => {}
            }
        }
    }
}

fn cancelled_outcome(cancel: &CancellationToken) -> PollOutcome {
    PollOutcome::Failed(ProvisionError::Cancelled {
        reason: cancel
            .reason()
            .unwrap_or_else(|| "cancellation requested".to_string()),
    })
}
