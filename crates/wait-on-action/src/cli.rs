//! Command-line surface and step execution

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use wait_on_action_core::inputs::Layered;
use wait_on_action_core::{EnvInputs, ExecutionContext, MapInputs, SubscriptionClient, runner};
use wait_on_action_probe::ProbeWaiter;

/// Flags mirror the step inputs. A flag wins over the `INPUT_*` variable of
/// the same input; values are coerced exactly as the variables are.
#[derive(Parser, Debug)]
#[command(
    name = "wait-on-action",
    version,
    about = "Wait for files, ports, sockets and HTTP endpoints to become available",
    long_about = "Reads step inputs from INPUT_* environment variables or the matching flags, \
                  validates the subscription, then waits for every resource"
)]
pub struct Cli {
    /// Space-separated resources (paths, http(s) URLs, tcp:host:port, socket:path)
    #[arg(long)]
    resource: Option<String>,

    /// Defaults document (JSON, or TOML when named *.toml)
    #[arg(long)]
    config: Option<String>,

    /// Initial delay before the first check (ms)
    #[arg(long)]
    delay: Option<String>,

    /// Per-request HTTP timeout (ms)
    #[arg(long = "http-timeout", alias = "httpTimeout")]
    http_timeout: Option<String>,

    /// Polling interval (ms)
    #[arg(long)]
    interval: Option<String>,

    /// Log progress ("true" to enable)
    #[arg(long)]
    log: Option<String>,

    /// Wait for resources to become unavailable ("true" to enable)
    #[arg(long)]
    reverse: Option<String>,

    /// Maximum concurrent checks
    #[arg(long)]
    simultaneous: Option<String>,

    /// Overall timeout (ms)
    #[arg(long)]
    timeout: Option<String>,

    /// Per-connect TCP timeout (ms)
    #[arg(long = "tcp-timeout", alias = "tcpTimeout")]
    tcp_timeout: Option<String>,

    /// Log every check ("true" to enable)
    #[arg(long)]
    verbose: Option<String>,

    /// Stabilization window (ms)
    #[arg(long)]
    window: Option<String>,
}

impl Cli {
    /// Inputs given on the command line, keyed by step input name
    fn flag_inputs(&self) -> MapInputs {
        let flags = [
            ("resource", &self.resource),
            ("config", &self.config),
            ("delay", &self.delay),
            ("httpTimeout", &self.http_timeout),
            ("interval", &self.interval),
            ("log", &self.log),
            ("reverse", &self.reverse),
            ("simultaneous", &self.simultaneous),
            ("timeout", &self.timeout),
            ("tcpTimeout", &self.tcp_timeout),
            ("verbose", &self.verbose),
            ("window", &self.window),
        ];

        let mut inputs = MapInputs::new();
        for (name, value) in flags {
            if let Some(value) = value {
                inputs.set(name, value.clone());
            }
        }
        inputs
    }

    /// Execute the step on a single-threaded runtime
    pub fn execute(self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;
        runtime.block_on(self.run())
    }

    async fn run(self) -> Result<()> {
        let inputs = Layered {
            primary: self.flag_inputs(),
            fallback: EnvInputs,
        };
        let context = ExecutionContext::from_env();
        let subscription = SubscriptionClient::from_env();
        let waiter = ProbeWaiter::new();

        match runner::run(&inputs, &context, &subscription, &waiter).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_hard_stop() => {
                error!("{e}");
                std::process::exit(1);
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wait_on_action_core::InputSource;

    #[test]
    fn test_flags_map_to_input_names() {
        let cli = Cli::parse_from([
            "wait-on-action",
            "--resource",
            "tcp:80 tcp:81",
            "--http-timeout",
            "500",
            "--tcpTimeout",
            "200",
            "--log",
            "true",
        ]);
        let inputs = cli.flag_inputs();
        assert_eq!(inputs.get("resource").as_deref(), Some("tcp:80 tcp:81"));
        assert_eq!(inputs.get("httpTimeout").as_deref(), Some("500"));
        assert_eq!(inputs.get("tcpTimeout").as_deref(), Some("200"));
        assert_eq!(inputs.get("log").as_deref(), Some("true"));
        assert_eq!(inputs.get("interval"), None);
    }

    #[test]
    fn test_no_flags_is_empty() {
        let cli = Cli::parse_from(["wait-on-action"]);
        assert_eq!(cli.flag_inputs().get("resource"), None);
    }
}
