//! # Bakery
//!
//! Provisioning pipeline steps for building machine images on cloud
//! providers.
//!
//! Bakery provides the building blocks a sequential image-build pipeline is
//! made of:
//!
//! - **Step contract**: discrete units of work that report a
//!   continue-or-halt verdict to the driver
//! - **Typed execution context**: cross-step data in explicit slots, with
//!   contract violations surfaced at the accessor
//! - **Transition polling**: drive an instance into a terminal lifecycle
//!   state, tolerating transient API errors within a bounded deadline
//! - **Cooperative cancellation**: a shared token observed at loop
//!   boundaries, never by interrupting in-flight calls
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bakery::prelude::*;
//!
//! let ctx = StepContext::new()
//!     .with_client(client)
//!     .with_resource(InstanceHandle::new("i-0123456789abcdef0"));
//!
//! let step = StopInstanceStep::new();
//! match step.run(&ctx).await {
//!     StepVerdict::Continue => { /* next step */ }
//!     StepVerdict::Halt => { /* ctx.take_error() holds the cause */ }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod compute;
pub mod context;
pub mod errors;
pub mod poller;
pub mod report;
pub mod steps;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::compute::{ApiError, ComputeApi, InstanceHandle, LifecycleState};
    pub use crate::context::StepContext;
    pub use crate::errors::ProvisionError;
    pub use crate::poller::{
        BackoffStrategy, JitterStrategy, PollOutcome, PollerConfig, RetryConfig,
        TransitionPoller, TransitionRequest,
    };
    pub use crate::report::{CollectingReporter, NoOpReporter, Reporter, TracingReporter};
    pub use crate::steps::{Step, StepReport, StepVerdict, StopInstanceStep};
}
