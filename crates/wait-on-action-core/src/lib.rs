//! Core of the wait-on CI step
//!
//! This crate turns CI-platform inputs into a [`RunConfiguration`], gates the
//! run on a subscription check, and hands the configuration to a
//! [`ResourceWaiter`]. It never polls resources itself; the waiter is an
//! external collaborator supplied by the caller.

pub mod config;
pub mod context;
pub mod error;
pub mod inputs;
pub mod logging;
pub mod runner;
pub mod subscription;
pub mod waiter;

#[cfg(any(test, feature = "test-support"))]
pub mod mock_waiter;

pub use config::{ExternalDefaults, HttpAuth, RunConfiguration};
pub use context::ExecutionContext;
pub use error::{ActionError, ConfigError, InputError, WaitError};
pub use inputs::{ActionInputs, EnvInputs, InputSource, MapInputs};
pub use runner::run;
pub use subscription::{SubscriptionClient, SubscriptionVerdict};
pub use waiter::{ErasedResourceWaiter, ResourceWaiter};
