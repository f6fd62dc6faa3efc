//! Polling options with defaults applied

use std::time::Duration;
use wait_on_action_core::{RunConfiguration, WaitError};

/// Default polling interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(250);
/// Default TCP connect timeout
pub const DEFAULT_TCP_TIMEOUT: Duration = Duration::from_millis(300);
/// Default stabilization window
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(750);

/// Resolved options for one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOptions {
    pub delay: Duration,
    pub interval: Duration,
    /// `None` waits forever
    pub timeout: Option<Duration>,
    pub http_timeout: Option<Duration>,
    pub tcp_timeout: Duration,
    /// Never shorter than `interval`
    pub window: Duration,
    /// `None` places no limit on concurrent checks
    pub simultaneous: Option<usize>,
    pub reverse: bool,
    pub log: bool,
    pub verbose: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            interval: DEFAULT_INTERVAL,
            timeout: None,
            http_timeout: None,
            tcp_timeout: DEFAULT_TCP_TIMEOUT,
            window: DEFAULT_WINDOW,
            simultaneous: None,
            reverse: false,
            log: false,
            verbose: false,
        }
    }
}

impl TryFrom<&RunConfiguration> for ProbeOptions {
    type Error = WaitError;

    fn try_from(config: &RunConfiguration) -> Result<Self, Self::Error> {
        let defaults = ProbeOptions::default();

        let interval = match config.interval {
            Some(0) => return Err(invalid("interval", "must be greater than 0")),
            Some(ms) => Duration::from_millis(ms),
            None => defaults.interval,
        };

        let simultaneous = match config.simultaneous {
            Some(0) => return Err(invalid("simultaneous", "must be greater than 0")),
            Some(n) => Some(usize::try_from(n).unwrap_or(usize::MAX)),
            None => None,
        };

        let window = config
            .window
            .map(Duration::from_millis)
            .unwrap_or(defaults.window)
            .max(interval);

        Ok(Self {
            delay: config.delay.map(Duration::from_millis).unwrap_or(defaults.delay),
            interval,
            timeout: config.timeout.map(Duration::from_millis),
            http_timeout: config.http_timeout.map(Duration::from_millis),
            tcp_timeout: config
                .tcp_timeout
                .map(Duration::from_millis)
                .unwrap_or(defaults.tcp_timeout),
            window,
            simultaneous,
            reverse: config.reverse.unwrap_or(false),
            log: config.log.unwrap_or(false),
            verbose: config.verbose.unwrap_or(false),
        })
    }
}

fn invalid(name: &str, reason: &str) -> WaitError {
    WaitError::InvalidOption {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
