//! Resource transition polling.
//!
//! This module provides:
//! - The transition request and outcome types
//! - The poller that drives an instance into a terminal state
//! - Bounded retry with backoff for the initiating API call

mod backoff;
mod config;
mod transition;

pub use backoff::{with_retry, BackoffStrategy, JitterStrategy, RetryConfig};
pub use config::PollerConfig;
pub use transition::{PollOutcome, TransitionPoller, TransitionRequest};
