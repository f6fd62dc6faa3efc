//! Run configuration assembly
//!
//! The external defaults document is a declared data file (JSON, or TOML when
//! the path ends in `.toml`). Its keys follow the polling options naming
//! (`httpTimeout`, `tcpTimeout`, `strictSSL`, ...) and unknown keys are
//! rejected. Explicit inputs are layered on top; an input that was not
//! supplied never erases a default.

use crate::error::ConfigError;
use crate::inputs::ActionInputs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Basic auth credentials for HTTP resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpAuth {
    pub username: String,
    pub password: String,
}

/// Defaults loaded from the `config` input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExternalDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simultaneous: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<u64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<HttpAuth>,
    #[serde(default, rename = "strictSSL", skip_serializing_if = "Option::is_none")]
    pub strict_ssl: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_redirect: Option<bool>,
}

impl ExternalDefaults {
    /// Load defaults from `path`
    ///
    /// Relative paths resolve against `base` when given.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, does not parse, or
    /// carries keys outside the schema.
    pub fn load(path: &Path, base: Option<&Path>) -> Result<Self, ConfigError> {
        let path = resolve_path(path, base);
        debug!("Loading wait-on defaults from {path:?}");

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            toml::from_str(&contents).map_err(|source| ConfigError::Toml { path, source })
        } else {
            serde_json::from_str(&contents).map_err(|source| ConfigError::Json { path, source })
        }
    }
}

fn resolve_path(path: &Path, base: Option<&Path>) -> PathBuf {
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

/// Options handed to the resource waiter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfiguration {
    pub resources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simultaneous: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp_timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<u64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<HttpAuth>,
    #[serde(rename = "strictSSL", skip_serializing_if = "Option::is_none")]
    pub strict_ssl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_redirect: Option<bool>,
}

impl RunConfiguration {
    /// Configuration waiting on `resources` with every option unset
    pub fn new(resources: Vec<String>) -> Self {
        Self {
            resources,
            ..Self::default()
        }
    }

    /// Layer explicit inputs over loaded defaults
    ///
    /// Resources always come from the inputs. Every other field takes the
    /// input value when supplied and falls back to the default otherwise.
    pub fn assemble(defaults: ExternalDefaults, inputs: &ActionInputs) -> Self {
        Self {
            resources: inputs.resources.clone(),
            delay: inputs.delay.or(defaults.delay),
            http_timeout: inputs.http_timeout.or(defaults.http_timeout),
            interval: inputs.interval.or(defaults.interval),
            log: inputs.log.or(defaults.log),
            reverse: inputs.reverse.or(defaults.reverse),
            simultaneous: inputs.simultaneous.or(defaults.simultaneous),
            timeout: inputs.timeout.or(defaults.timeout),
            tcp_timeout: inputs.tcp_timeout.or(defaults.tcp_timeout),
            verbose: inputs.verbose.or(defaults.verbose),
            window: inputs.window.or(defaults.window),
            headers: defaults.headers,
            auth: defaults.auth,
            strict_ssl: defaults.strict_ssl,
            follow_redirect: defaults.follow_redirect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn inputs(resources: &[&str]) -> ActionInputs {
        ActionInputs {
            resources: resources.iter().map(|r| r.to_string()).collect(),
            ..ActionInputs::default()
        }
    }

    #[test]
    fn test_default_supplies_unset_interval() {
        let defaults = ExternalDefaults {
            interval: Some(500),
            ..ExternalDefaults::default()
        };
        let config = RunConfiguration::assemble(defaults, &inputs(&["http://localhost:3000"]));
        assert_eq!(config.interval, Some(500));
        assert_eq!(config.resources, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_explicit_input_wins() {
        let defaults = ExternalDefaults {
            interval: Some(500),
            log: Some(true),
            resources: Some(vec!["tcp:1".to_string()]),
            ..ExternalDefaults::default()
        };
        let mut explicit = inputs(&["tcp:2"]);
        explicit.interval = Some(100);
        explicit.log = Some(false);

        let config = RunConfiguration::assemble(defaults, &explicit);
        assert_eq!(config.interval, Some(100));
        assert_eq!(config.log, Some(false));
        assert_eq!(config.resources, vec!["tcp:2"]);
    }

    #[test]
    fn test_unset_everywhere_stays_unset() {
        let config = RunConfiguration::assemble(ExternalDefaults::default(), &inputs(&["a"]));
        assert_eq!(config, RunConfiguration::new(vec!["a".to_string()]));
    }

    #[test]
    fn test_load_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wait-on.json");
        std::fs::write(
            &path,
            r#"{
                "interval": 500,
                "httpTimeout": 2000,
                "strictSSL": false,
                "headers": { "accept": "application/json" },
                "auth": { "username": "ci", "password": "secret" }
            }"#,
        )
        .unwrap();

        let defaults = ExternalDefaults::load(&path, None).unwrap();
        assert_eq!(defaults.interval, Some(500));
        assert_eq!(defaults.http_timeout, Some(2000));
        assert_eq!(defaults.strict_ssl, Some(false));
        assert_eq!(defaults.headers.get("accept").unwrap(), "application/json");
        assert_eq!(defaults.auth.unwrap().username, "ci");
    }

    #[test]
    fn test_load_toml_relative_to_base() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("wait-on.toml"),
            "interval = 250\ntcpTimeout = 900\nreverse = true\n",
        )
        .unwrap();

        let defaults = ExternalDefaults::load(Path::new("wait-on.toml"), Some(temp.path())).unwrap();
        assert_eq!(defaults.interval, Some(250));
        assert_eq!(defaults.tcp_timeout, Some(900));
        assert_eq!(defaults.reverse, Some(true));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wait-on.json");
        std::fs::write(&path, r#"{ "interval": 500, "onTimeout": "exec rm -rf /" }"#).unwrap();

        let err = ExternalDefaults::load(&path, None).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wait-on.json");
        std::fs::write(&path, r#"{ "interval": "fast" }"#).unwrap();

        assert!(ExternalDefaults::load(&path, None).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ExternalDefaults::load(Path::new("/nonexistent/wait-on.json"), None).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_serialized_shape_omits_unset() {
        let mut config = RunConfiguration::new(vec!["tcp:80".to_string()]);
        config.tcp_timeout = Some(1000);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "resources": ["tcp:80"], "tcpTimeout": 1000 })
        );
    }
}
