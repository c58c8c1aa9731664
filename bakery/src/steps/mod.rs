//! Step trait and implementations.
//!
//! Steps are the units of work the pipeline driver invokes in order. A step
//! reports a verdict; the driver stops at the first halt and then runs
//! cleanup hooks in reverse order.

mod result;
mod stop_instance;
#[cfg(test)]
mod stop_tests;

pub use result::StepReport;
pub use stop_instance::StopInstanceStep;

use crate::context::StepContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// The verdict a step returns to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepVerdict {
    /// Proceed to the next step.
    Continue,
    /// Stop the pipeline; the halting step has recorded a classified error
    /// in the context.
    Halt,
}

impl std::fmt::Display for StepVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => write!(f, "continue"),
            Self::Halt => write!(f, "halt"),
        }
    }
}

impl StepVerdict {
    /// Returns true if the pipeline may proceed.
    #[must_use]
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Returns true if the pipeline must stop.
    #[must_use]
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halt)
    }
}

/// Trait for pipeline steps.
///
/// The driver guarantees `cleanup` is called at most once per step per run,
/// in reverse step order, regardless of where the halt occurred. Steps that
/// do not acquire anything keep the default no-op.
#[async_trait]
pub trait Step: Send + Sync + Debug {
    /// Returns the name of the step.
    fn name(&self) -> &str;

    /// Executes the step.
    ///
    /// A `Halt` verdict must be preceded by exactly one classified error
    /// recorded in the context; a `Continue` verdict must leave the error
    /// slot empty.
    async fn run(&self, ctx: &StepContext) -> StepVerdict;

    /// Undoes whatever the step acquired, if anything.
    async fn cleanup(&self, _ctx: &StepContext) {}
}
