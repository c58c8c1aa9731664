//! Reporter trait and implementations.
//!
//! The reporter is the step's only user-facing output channel. It is
//! write-only: nothing in the core consults a return value from it.

use crate::steps::StepReport;
use parking_lot::RwLock;

/// Sink for human-readable progress and error text emitted by steps.
pub trait Reporter: Send + Sync {
    /// Emits a progress message.
    fn say(&self, message: &str);

    /// Emits an error message.
    fn error(&self, message: &str);

    /// Receives the summary of a finished step run.
    fn finished(&self, _report: &StepReport) {}
}

/// A reporter that logs through the tracing framework.
///
/// This is the default reporter on a step context.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn say(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }

    fn finished(&self, report: &StepReport) {
        tracing::info!(
            step = %report.step,
            verdict = %report.verdict,
            duration_ms = report.duration_ms(),
            "Step finished"
        );
    }
}

/// A reporter that discards all output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl Reporter for NoOpReporter {
    fn say(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}

/// A collecting reporter for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    messages: RwLock<Vec<String>>,
    errors: RwLock<Vec<String>>,
    reports: RwLock<Vec<StepReport>>,
}

impl CollectingReporter {
    /// Creates a new collecting reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all progress messages received so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.read().clone()
    }

    /// Returns all error messages received so far.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.errors.read().clone()
    }

    /// Returns all step reports received so far.
    #[must_use]
    pub fn reports(&self) -> Vec<StepReport> {
        self.reports.read().clone()
    }

    /// Returns true if nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
            && self.errors.read().is_empty()
            && self.reports.read().is_empty()
    }

    /// Clears everything collected so far.
    pub fn clear(&self) {
        self.messages.write().clear();
        self.errors.write().clear();
        self.reports.write().clear();
    }
}

impl Reporter for CollectingReporter {
    fn say(&self, message: &str) {
        self.messages.write().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.write().push(message.to_string());
    }

    fn finished(&self, report: &StepReport) {
        self.reports.write().push(report.clone());
    }
}
