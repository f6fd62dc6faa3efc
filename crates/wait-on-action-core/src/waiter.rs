//! Seam to the resource polling collaborator

use crate::config::RunConfiguration;
use crate::error::WaitError;
use std::future::Future;
use std::pin::Pin;

/// Waits until every configured resource reaches its target state.
///
/// Implementations own all polling semantics: intervals, per-check timeouts,
/// concurrency, stabilization windows and reverse mode. The adapter calls
/// [`wait`](ResourceWaiter::wait) exactly once per run.
pub trait ResourceWaiter: Send + Sync + std::fmt::Debug {
    /// Resolve once all resources are ready, or fail with the reason
    fn wait(
        &self,
        config: &RunConfiguration,
    ) -> impl Future<Output = Result<(), WaitError>> + Send;

    /// Waiter name for logging
    fn name(&self) -> &str;
}

/// Object-safe version of [`ResourceWaiter`].
///
/// Implemented automatically for every `ResourceWaiter`, so a binary can hold
/// `Box<dyn ErasedResourceWaiter>` chosen at runtime.
pub trait ErasedResourceWaiter: Send + Sync + std::fmt::Debug {
    fn wait<'a>(
        &'a self,
        config: &'a RunConfiguration,
    ) -> Pin<Box<dyn Future<Output = Result<(), WaitError>> + Send + 'a>>;

    fn name(&self) -> &str;
}

impl<T: ResourceWaiter> ErasedResourceWaiter for T {
    fn wait<'a>(
        &'a self,
        config: &'a RunConfiguration,
    ) -> Pin<Box<dyn Future<Output = Result<(), WaitError>> + Send + 'a>> {
        Box::pin(ResourceWaiter::wait(self, config))
    }

    fn name(&self) -> &str {
        ResourceWaiter::name(self)
    }
}
