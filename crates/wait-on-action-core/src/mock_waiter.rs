//! Mock resource waiter for testing

use crate::config::RunConfiguration;
use crate::error::WaitError;
use crate::waiter::ResourceWaiter;
use std::sync::{Arc, Mutex};

/// Waiter that records each configuration it receives and returns a canned
/// result.
#[derive(Debug, Clone, Default)]
pub struct MockWaiter {
    /// If set, every call fails with this error
    pub error: Option<WaitError>,
    /// Configurations passed to `wait`, in call order
    pub call_log: Arc<Mutex<Vec<RunConfiguration>>>,
}

impl MockWaiter {
    /// Waiter that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error every call returns
    pub fn with_error(mut self, error: WaitError) -> Self {
        self.error = Some(error);
        self
    }

    /// Copy of the recorded configurations
    pub fn get_calls(&self) -> Vec<RunConfiguration> {
        self.call_log.lock().unwrap().clone()
    }
}

impl ResourceWaiter for MockWaiter {
    async fn wait(&self, config: &RunConfiguration) -> Result<(), WaitError> {
        self.call_log.lock().unwrap().push(config.clone());
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
