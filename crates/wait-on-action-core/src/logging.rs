//! Logging initialization for the step binary.
//!
//! Under GitHub Actions events are rendered as workflow commands on stdout
//! (`::error::`, `::warning::`, `::debug::`) so the runner files them into its
//! structured log channels. Elsewhere a plain fmt subscriber writes to stderr.

use std::fmt::Write as _;
use std::sync::OnceLock;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields, format::Writer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

static INIT: OnceLock<()> = OnceLock::new();

/// Environment variable selecting the maximum log level
pub const LOG_ENV: &str = "WAIT_ON_LOG";

fn parse_level(raw: Option<&str>, default: Level) -> Level {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("trace") => Level::TRACE,
        Some("debug") => Level::DEBUG,
        Some("info") => Level::INFO,
        Some("warn") => Level::WARN,
        Some("error") => Level::ERROR,
        _ => default,
    }
}

/// Whether the process runs inside a GitHub Actions job
pub fn in_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Escape message data for a workflow command
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Render `message` as the workflow command for `level`
///
/// Info-level messages are plain lines; the runner shows them as-is.
pub fn workflow_command(level: Level, message: &str) -> String {
    match level {
        Level::ERROR => format!("::error::{}", escape_data(message)),
        Level::WARN => format!("::warning::{}", escape_data(message)),
        Level::INFO => message.to_string(),
        _ => format!("::debug::{}", escape_data(message)),
    }
}

/// Event formatter emitting workflow commands
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkflowCommandFormat;

impl<S, N> FormatEvent<S, N> for WorkflowCommandFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut message = String::new();
        ctx.format_fields(Writer::new(&mut message), event)?;
        writeln!(writer, "{}", workflow_command(*event.metadata().level(), &message))
    }
}

/// Initialize process-level tracing output.
///
/// The level comes from `WAIT_ON_LOG`. Under Actions the default is `debug`
/// because the runner hides `::debug::` lines unless step debugging is on.
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init() {
    if INIT.get().is_some() {
        return;
    }

    let actions = in_github_actions();
    let default = if actions { Level::DEBUG } else { Level::INFO };
    let level = parse_level(std::env::var(LOG_ENV).ok().as_deref(), default);

    // Dependencies (reqwest, hyper) stay at warn so their internals do not
    // flood the step log.
    let filter = Targets::new()
        .with_default(std::cmp::min(level, Level::WARN))
        .with_target("wait_on_action", level);
    let registry = tracing_subscriber::registry().with(filter);

    let _ = if actions {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stdout)
                    .event_format(WorkflowCommandFormat),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    let _ = INIT.set(());
}
