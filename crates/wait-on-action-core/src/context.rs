//! CI execution context
//!
//! Captures the `GITHUB_*` variables the step depends on once at startup so
//! that downstream components take them as an explicit parameter.

use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

/// Runtime context of the workflow step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    /// `owner/name` of the repository running the workflow
    pub repository: Option<String>,
    pub repository_owner: Option<String>,
    pub server_url: Option<String>,
    pub api_url: Option<String>,
    pub run_id: Option<String>,
    pub workflow: Option<String>,
    pub job: Option<String>,
    pub action: Option<String>,
    pub action_repository: Option<String>,
    pub action_ref: Option<String>,
    pub action_path: Option<String>,
    /// Checkout directory, used to resolve relative config paths
    pub workspace: Option<PathBuf>,
}

impl ExecutionContext {
    /// Create a context for the given `owner/name` repository
    pub fn new(repository: impl Into<String>) -> Self {
        let repository = repository.into();
        let repository_owner = repository.split('/').next().map(str::to_string);
        Self {
            repository: Some(repository),
            repository_owner,
            ..Self::default()
        }
    }

    /// Capture the context from the process environment
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build the context from an explicit variable map
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        let get = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();
        Self {
            repository: get("GITHUB_REPOSITORY"),
            repository_owner: get("GITHUB_REPOSITORY_OWNER"),
            server_url: get("GITHUB_SERVER_URL"),
            api_url: get("GITHUB_API_URL"),
            run_id: get("GITHUB_RUN_ID"),
            workflow: get("GITHUB_WORKFLOW"),
            job: get("GITHUB_JOB"),
            action: get("GITHUB_ACTION"),
            action_repository: get("GITHUB_ACTION_REPOSITORY"),
            action_ref: get("GITHUB_ACTION_REF"),
            action_path: get("GITHUB_ACTION_PATH"),
            workspace: get("GITHUB_WORKSPACE").map(PathBuf::from),
        }
    }

    /// Set the workspace directory
    pub fn with_workspace(mut self, workspace: PathBuf) -> Self {
        self.workspace = Some(workspace);
        self
    }

    /// Log the runtime context at info level
    pub fn log_summary(&self) {
        fn show(v: &Option<String>) -> &str {
            v.as_deref().unwrap_or("undefined")
        }

        info!("===== StepSecurity Debug: Action Runtime Context =====");
        info!("GITHUB_REPOSITORY: {}", show(&self.repository));
        info!("GITHUB_REPOSITORY_OWNER: {}", show(&self.repository_owner));
        info!("GITHUB_SERVER_URL: {}", show(&self.server_url));
        info!("GITHUB_API_URL: {}", show(&self.api_url));
        info!("GITHUB_RUN_ID: {}", show(&self.run_id));
        info!("GITHUB_WORKFLOW: {}", show(&self.workflow));
        info!("GITHUB_JOB: {}", show(&self.job));
        info!("GITHUB_ACTION: {}", show(&self.action));
        info!("GITHUB_ACTION_REPOSITORY: {}", show(&self.action_repository));
        info!("GITHUB_ACTION_REF: {}", show(&self.action_ref));
        info!("GITHUB_ACTION_PATH: {}", show(&self.action_path));
        info!("=====================================================");
    }
}
