//! Subscription check against the licensing service
//!
//! Fails closed only on an explicit 403; any other outcome, including the
//! service being unreachable, lets the run continue.

use crate::context::ExecutionContext;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Licensing service base URL
pub const DEFAULT_API_URL: &str = "https://agent.api.stepsecurity.io/v1";

/// Environment variable overriding [`DEFAULT_API_URL`]
pub const API_URL_ENV: &str = "WAIT_ON_ACTION_API_URL";

/// Upper bound on the subscription request
pub const CHECK_TIMEOUT: Duration = Duration::from_millis(3000);

/// Classification of the subscription response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionVerdict {
    /// Service answered with a success status
    Valid,
    /// Service answered 403
    Denied,
    /// Timeout, network failure, or any other status
    Unreachable(String),
}

impl SubscriptionVerdict {
    /// Classify a response status
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::FORBIDDEN {
            SubscriptionVerdict::Denied
        } else if status.is_success() {
            SubscriptionVerdict::Valid
        } else {
            SubscriptionVerdict::Unreachable(format!("unexpected status {status}"))
        }
    }
}

/// HTTP client for the subscription endpoint
#[derive(Debug, Clone)]
pub struct SubscriptionClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for SubscriptionClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl SubscriptionClient {
    /// Create a client for the service rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(CHECK_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: CHECK_TIMEOUT,
        }
    }

    /// Client for the default service, honoring the URL override variable
    pub fn from_env() -> Self {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Subscription URL for the repository in `context`
    pub fn url_for(&self, context: &ExecutionContext) -> String {
        let repository = context.repository.as_deref().unwrap_or("undefined");
        format!("{}/github/{repository}/actions/subscription", self.base_url)
    }

    /// Query the service and classify the answer
    pub async fn check(&self, context: &ExecutionContext) -> SubscriptionVerdict {
        let url = self.url_for(context);
        debug!("Checking subscription at {url}");

        match self.client.get(&url).timeout(self.timeout).send().await {
            Ok(response) => SubscriptionVerdict::from_status(response.status()),
            Err(e) if e.is_timeout() => {
                SubscriptionVerdict::Unreachable("request timed out".to_string())
            }
            Err(e) => SubscriptionVerdict::Unreachable(e.to_string()),
        }
    }
}
