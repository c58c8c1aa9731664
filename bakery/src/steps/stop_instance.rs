//! Step that stops the source instance before imaging.

use super::{Step, StepReport, StepVerdict};
use crate::compute::LifecycleState;
use crate::context::StepContext;
use crate::errors::ProvisionError;
use crate::poller::{PollOutcome, PollerConfig, TransitionPoller, TransitionRequest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Stops the source instance and waits for it to reach a terminal state.
///
/// Creating an image from a running instance risks capturing a half-written
/// filesystem, so the instance is driven to `Stopped` (or `Terminated` for
/// a destructive stop) first. Invoking the step on an already-stopped
/// instance is a no-op that continues the pipeline; cleanup is deliberately
/// empty because stopping is not something to undo.
#[derive(Debug, Clone, Default)]
pub struct StopInstanceStep {
    spot_price: Option<String>,
    disable_stop: bool,
    destructive: bool,
    poller: TransitionPoller,
}

impl StopInstanceStep {
    /// Creates a stop step with default polling configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the bid price the instance's capacity was acquired at.
    ///
    /// Spot-priced capacity cannot be stopped, so a set, non-zero price
    /// makes the step skip the stop and continue.
    #[must_use]
    pub fn with_spot_price(mut self, price: impl Into<String>) -> Self {
        self.spot_price = Some(price.into());
        self
    }

    /// Disables the automatic stop request entirely.
    #[must_use]
    pub fn with_stop_disabled(mut self, disabled: bool) -> Self {
        self.disable_stop = disabled;
        self
    }

    /// Targets `Terminated` instead of `Stopped`.
    #[must_use]
    pub fn with_destructive(mut self, destructive: bool) -> Self {
        self.destructive = destructive;
        self
    }

    /// Sets the polling configuration.
    #[must_use]
    pub fn with_poller_config(mut self, config: PollerConfig) -> Self {
        self.poller = TransitionPoller::new(config);
        self
    }

    fn target(&self) -> LifecycleState {
        if self.destructive {
            LifecycleState::Terminated
        } else {
            LifecycleState::Stopped
        }
    }

    fn halt(
        &self,
        ctx: &StepContext,
        started_at: DateTime<Utc>,
        error: ProvisionError,
    ) -> StepVerdict {
        tracing::error!(
            run_id = %ctx.run_id(),
            step = self.name(),
            kind = error.kind(),
            "Step halted"
        );
        ctx.reporter().error(&error.to_string());
        ctx.reporter()
            .finished(&StepReport::halted(self.name(), started_at, error.to_string()));
        ctx.record_error(error);
        StepVerdict::Halt
    }
}

#[async_trait]
impl Step for StopInstanceStep {
    fn name(&self) -> &str {
        "stop_instance"
    }

    async fn run(&self, ctx: &StepContext) -> StepVerdict {
        let started_at = Utc::now();

        let client = match ctx.client() {
            Ok(client) => client,
            Err(error) => return self.halt(ctx, started_at, error),
        };
        let handle = match ctx.resource() {
            Ok(handle) => handle,
            Err(error) => return self.halt(ctx, started_at, error),
        };

        let mut request = TransitionRequest::new(handle.clone(), self.target())
            .with_transition_disabled(self.disable_stop);
        if let Some(price) = &self.spot_price {
            request = request.with_price_hint(price.clone());
        }

        if self.disable_stop {
            ctx.reporter()
                .say("Automatic instance stop disabled; skipping stop request.");
        } else if request.short_circuits() {
            ctx.reporter()
                .say("Spot-priced capacity cannot be stopped; skipping stop request.");
        } else if self.destructive {
            ctx.reporter()
                .say(&format!("Terminating instance {handle}..."));
        } else {
            ctx.reporter().say(&format!("Stopping instance {handle}..."));
        }

        let outcome = self
            .poller
            .transition(client.as_ref(), &request, ctx.cancellation())
            .await;

        match outcome {
            PollOutcome::Terminal(state) => {
                tracing::info!(
                    run_id = %ctx.run_id(),
                    instance = %handle,
                    state = %state,
                    "Instance transition complete"
                );
                if state == LifecycleState::Unknown {
                    ctx.reporter().say(&format!("Instance {handle} left as-is."));
                } else {
                    ctx.reporter().say(&format!("Instance {handle} is {state}."));
                }
                ctx.reporter()
                    .finished(&StepReport::continued(self.name(), started_at));
                StepVerdict::Continue
            }
            PollOutcome::StillTransitioning(state) => self.halt(
                ctx,
                started_at,
                ProvisionError::api(format!(
                    "instance {handle} was still {state} when polling ended"
                )),
            ),
            PollOutcome::Failed(error) => self.halt(ctx, started_at, error),
        }
    }
}
