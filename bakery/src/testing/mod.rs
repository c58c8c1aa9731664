//! Test doubles for exercising steps without a live provider.

mod mocks;

pub use mocks::ScriptedComputeApi;
