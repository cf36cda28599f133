use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};
use marriage_registry_client::ClientConfig;
use tracing::debug;

use crate::args::{Cli, Command};
use crate::output;

mod address;
mod counter;
mod doctor;
mod run;

pub async fn dispatch(cli: Cli) -> Result<()> {
    let overrides = cli.overrides();
    debug!(?overrides, "command line overrides");
    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run::run(ClientConfig::resolve(overrides)?).await,
        Command::Counter => counter::run(ClientConfig::resolve(overrides)?).await,
        Command::Address => address::run(ClientConfig::resolve(overrides)?),
        Command::Doctor => doctor::run(overrides).await,
    }
}

/// Stderr spinner, hidden in JSON mode.
fn spinner() -> ProgressBar {
    if output::is_json() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner().with_finish(ProgressFinish::AndClear);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
