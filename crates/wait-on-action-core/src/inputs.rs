//! Named step inputs
//!
//! Inputs arrive as raw strings. The CI platform exposes input `name` as the
//! environment variable `INPUT_<NAME>`; values are trimmed and an empty value
//! means the input was not supplied.

use crate::error::InputError;
use std::collections::HashMap;
use std::path::PathBuf;

/// Source of raw input values
pub trait InputSource {
    /// Raw value of `name`, `None` if the input was not supplied
    fn raw(&self, name: &str) -> Option<String>;

    /// Trimmed value, treating an empty string as absent
    fn get(&self, name: &str) -> Option<String> {
        self.raw(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Value of a required input
    fn required(&self, name: &str) -> Result<String, InputError> {
        self.get(name)
            .ok_or_else(|| InputError::Required(name.to_string()))
    }
}

/// Inputs read from `INPUT_*` environment variables
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvInputs;

impl EnvInputs {
    /// Environment variable carrying input `name`
    pub fn var_name(name: &str) -> String {
        format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
    }
}

impl InputSource for EnvInputs {
    fn raw(&self, name: &str) -> Option<String> {
        std::env::var(Self::var_name(name)).ok()
    }
}

/// Inputs held in memory, keyed by input name
#[derive(Debug, Default, Clone)]
pub struct MapInputs {
    values: HashMap<String, String>,
}

impl MapInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an input value
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// Set an input value
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }
}

impl InputSource for MapInputs {
    fn raw(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Layered source: values in `primary` shadow those in `fallback`
#[derive(Debug, Clone)]
pub struct Layered<P, F> {
    pub primary: P,
    pub fallback: F,
}

impl<P: InputSource, F: InputSource> InputSource for Layered<P, F> {
    fn raw(&self, name: &str) -> Option<String> {
        self.primary
            .get(name)
            .or_else(|| self.fallback.raw(name))
    }
}

/// Typed view of every input the step accepts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionInputs {
    pub resources: Vec<String>,
    pub config: Option<PathBuf>,
    pub delay: Option<u64>,
    pub http_timeout: Option<u64>,
    pub interval: Option<u64>,
    pub log: Option<bool>,
    pub reverse: Option<bool>,
    pub simultaneous: Option<u64>,
    pub timeout: Option<u64>,
    pub tcp_timeout: Option<u64>,
    pub verbose: Option<bool>,
    pub window: Option<u64>,
}

impl ActionInputs {
    /// Read and coerce all inputs
    ///
    /// # Errors
    ///
    /// Returns `InputError::Required` if `resource` is missing and
    /// `InputError::InvalidNumber` if a numeric input does not parse.
    pub fn read(source: &impl InputSource) -> Result<Self, InputError> {
        let resources = split_resources(&source.required("resource")?);
        if resources.is_empty() {
            return Err(InputError::Required("resource".to_string()));
        }

        Ok(Self {
            resources,
            config: source.get("config").map(PathBuf::from),
            delay: number_input(source, "delay")?,
            http_timeout: number_input(source, "httpTimeout")?,
            interval: number_input(source, "interval")?,
            log: boolean_input(source, "log"),
            reverse: boolean_input(source, "reverse"),
            simultaneous: number_input(source, "simultaneous")?,
            timeout: number_input(source, "timeout")?,
            tcp_timeout: number_input(source, "tcpTimeout")?,
            verbose: boolean_input(source, "verbose"),
            window: number_input(source, "window")?,
        })
    }
}

/// Split a space-separated resource list, preserving order
pub fn split_resources(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Parse a numeric input; `None` when the input was not supplied
pub fn number_input(source: &impl InputSource, name: &str) -> Result<Option<u64>, InputError> {
    match source.get(name) {
        None => Ok(None),
        Some(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| InputError::InvalidNumber {
                name: name.to_string(),
                value,
            }),
    }
}

/// Parse a boolean input; `None` when the input was not supplied
pub fn boolean_input(source: &impl InputSource, name: &str) -> Option<bool> {
    source.get(name).map(|v| parse_bool(&v))
}

/// True only for a case-insensitive `"true"`
pub fn parse_bool(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_split_preserves_order() {
        assert_eq!(
            split_resources("http://localhost:3000 tcp:5432 /tmp/ready"),
            vec!["http://localhost:3000", "tcp:5432", "/tmp/ready"]
        );
        assert_eq!(split_resources("a"), vec!["a"]);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("True"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
        assert!(!parse_bool("True1"));
        assert!(!parse_bool("yes"));
    }

    #[test]
    fn test_missing_resource_is_required_error() {
        let err = ActionInputs::read(&MapInputs::new()).unwrap_err();
        assert_eq!(err, InputError::Required("resource".to_string()));

        let err = ActionInputs::read(&MapInputs::new().with("resource", "   ")).unwrap_err();
        assert_eq!(err, InputError::Required("resource".to_string()));
    }

    #[test]
    fn test_unset_inputs_are_absent() {
        let inputs = ActionInputs::read(&MapInputs::new().with("resource", "tcp:80")).unwrap();
        assert_eq!(inputs.resources, vec!["tcp:80"]);
        assert_eq!(inputs.interval, None);
        assert_eq!(inputs.log, None);
        assert_eq!(inputs.config, None);
    }

    #[test]
    fn test_typed_inputs() {
        let source = MapInputs::new()
            .with("resource", "http://localhost:3000")
            .with("delay", "100")
            .with("httpTimeout", " 2000 ")
            .with("interval", "500")
            .with("log", "TRUE")
            .with("reverse", "false")
            .with("simultaneous", "2")
            .with("timeout", "30000")
            .with("tcpTimeout", "1000")
            .with("verbose", "True1")
            .with("window", "1000")
            .with("config", "wait-on.json");

        let inputs = ActionInputs::read(&source).unwrap();
        assert_eq!(inputs.delay, Some(100));
        assert_eq!(inputs.http_timeout, Some(2000));
        assert_eq!(inputs.interval, Some(500));
        assert_eq!(inputs.log, Some(true));
        assert_eq!(inputs.reverse, Some(false));
        assert_eq!(inputs.simultaneous, Some(2));
        assert_eq!(inputs.timeout, Some(30000));
        assert_eq!(inputs.tcp_timeout, Some(1000));
        assert_eq!(inputs.verbose, Some(false));
        assert_eq!(inputs.window, Some(1000));
        assert_eq!(inputs.config, Some(PathBuf::from("wait-on.json")));
    }

    #[test]
    fn test_malformed_number() {
        let source = MapInputs::new()
            .with("resource", "tcp:80")
            .with("timeout", "soon");
        let err = ActionInputs::read(&source).unwrap_err();
        assert_eq!(
            err,
            InputError::InvalidNumber {
                name: "timeout".to_string(),
                value: "soon".to_string(),
            }
        );
    }

    #[test]
    fn test_layered_prefers_primary() {
        let source = Layered {
            primary: MapInputs::new().with("timeout", "10").with("log", ""),
            fallback: MapInputs::new()
                .with("timeout", "20")
                .with("log", "true")
                .with("resource", "tcp:80"),
        };
        assert_eq!(source.get("timeout").as_deref(), Some("10"));
        assert_eq!(source.get("log").as_deref(), Some("true"));
        assert_eq!(source.get("resource").as_deref(), Some("tcp:80"));
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(EnvInputs::var_name("httpTimeout"), "INPUT_HTTPTIMEOUT");
        assert_eq!(EnvInputs::var_name("my input"), "INPUT_MY_INPUT");
    }

    #[test]
    #[serial]
    fn test_env_inputs() {
        unsafe {
            std::env::set_var("INPUT_RESOURCE", "tcp:localhost:8080 /tmp/a");
            std::env::set_var("INPUT_TCPTIMEOUT", "750");
            std::env::remove_var("INPUT_INTERVAL");
        }

        let inputs = ActionInputs::read(&EnvInputs).unwrap();
        assert_eq!(inputs.resources, vec!["tcp:localhost:8080", "/tmp/a"]);
        assert_eq!(inputs.tcp_timeout, Some(750));
        assert_eq!(inputs.interval, None);

        unsafe {
            std::env::remove_var("INPUT_RESOURCE");
            std::env::remove_var("INPUT_TCPTIMEOUT");
        }
    }
}
