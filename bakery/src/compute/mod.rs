//! Compute provider abstraction.
//!
//! This module provides:
//! - Instance identity and lifecycle state types
//! - The capability trait the rest of the crate drives the provider through

mod api;
mod state;

pub use api::{ApiError, ComputeApi};
pub use state::{InstanceHandle, LifecycleState};

#[cfg(test)]
pub use api::MockComputeApi;
