//! Typed summary of a single step run.

use super::StepVerdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of one step execution, delivered write-only to the reporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    /// Step name.
    pub step: String,
    /// The verdict the step returned to the driver.
    pub verdict: StepVerdict,
    /// When the step started.
    pub started_at: DateTime<Utc>,
    /// When the step ended.
    pub ended_at: DateTime<Utc>,
    /// Error text if the step halted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    /// Creates a report for a step that returned Continue.
    #[must_use]
    pub fn continued(step: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            step: step.into(),
            verdict: StepVerdict::Continue,
            started_at,
            ended_at: Utc::now(),
            error: None,
        }
    }

    /// Creates a report for a step that halted with an error.
    #[must_use]
    pub fn halted(
        step: impl Into<String>,
        started_at: DateTime<Utc>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            step: step.into(),
            verdict: StepVerdict::Halt,
            started_at,
            ended_at: Utc::now(),
            error: Some(error.into()),
        }
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        (self.ended_at - self.started_at).num_milliseconds() as f64
    }

    /// Returns true if the step let the pipeline continue.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.verdict, StepVerdict::Continue)
    }
}
