use std::process::ExitCode;

use clap::Parser;
use marriage_registry_client::RegistryError;

mod args;
mod cmd;
mod logging;
mod output;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = args::Cli::parse();
    output::init(cli.json);
    logging::init(cli.verbose);

    match cmd::dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let stage = e
                .downcast_ref::<RegistryError>()
                .map(|r| r.stage().as_str())
                .unwrap_or("cli");
            output::error(stage, &format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
