//! Error types for a single action run

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading named inputs
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// A required input was absent or empty
    #[error("Input required and not supplied: {0}")]
    Required(String),

    /// A numeric input held something other than a non-negative integer
    #[error("Input '{name}' is not a valid number: '{value}'")]
    InvalidNumber { name: String, value: String },
}

/// Errors raised while loading the external defaults document
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be read
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing or schema error
    #[error("Invalid JSON config {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// TOML parsing or schema error
    #[error("Invalid TOML config {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors reported by a [`ResourceWaiter`](crate::ResourceWaiter)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WaitError {
    /// The overall timeout expired with resources still pending
    #[error("Timed out waiting for: {}", pending.join(", "))]
    Timeout { pending: Vec<String> },

    /// A resource identifier could not be understood
    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    /// An option value the waiter cannot honor
    #[error("Invalid option '{name}': {reason}")]
    InvalidOption { name: String, reason: String },

    /// Any other terminal failure inside the waiter
    #[error("{0}")]
    Failed(String),
}

/// Top-level outcome of a failed run
#[derive(Debug, Error)]
pub enum ActionError {
    /// The subscription service answered 403; the process must halt at once
    #[error("Subscription is not valid. Reach out to support@stepsecurity.io")]
    LicensingDenied,

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Wait(#[from] WaitError),
}

impl ActionError {
    /// Whether this error must bypass normal failure reporting
    pub fn is_hard_stop(&self) -> bool {
        matches!(self, ActionError::LicensingDenied)
    }
}
