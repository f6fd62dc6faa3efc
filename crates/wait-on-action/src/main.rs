//! wait-on-action - wait for resources before a pipeline proceeds
//!
//! Reads step inputs from `INPUT_*` variables (or the matching flags), checks
//! the subscription, then blocks until every resource is available.

use clap::Parser;
use tracing::error;
use wait_on_action_core::logging;

mod cli;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    logging::init();

    if let Err(e) = cli.execute() {
        error!("{e}");
        std::process::exit(1);
    }
}
