use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use marriage_registry_client::ConfigOverrides;

#[derive(Parser, Debug, Clone)]
#[command(name = "marriage-registry", version, about = "Marriage registry client")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// RPC URL or cluster moniker (localhost, devnet, testnet, mainnet-beta).
    #[arg(short = 'u', long, global = true)]
    pub url: Option<String>,

    /// Payer keypair file (default: keypair from the Solana CLI config).
    #[arg(short, long, global = true)]
    pub keypair: Option<PathBuf>,

    /// Solana CLI config file.
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding marriageregistry.so and its deploy keypair.
    #[arg(long, global = true)]
    pub program_dir: Option<PathBuf>,

    /// Commitment level: processed, confirmed or finalized.
    #[arg(long, global = true)]
    pub commitment: Option<String>,

    /// Number of signature fees the payer must be able to cover.
    #[arg(long, global = true)]
    pub fee_multiplier: Option<u64>,

    /// Seconds to wait for a transaction or airdrop to confirm.
    #[arg(long, global = true)]
    pub confirm_timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fund the payer, set up the registry account, increment and report (default).
    Run,

    /// Read the counter of the existing registry account.
    Counter,

    /// Print the registry address for the configured payer and program.
    Address,

    /// Run local environment checks.
    Doctor,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            url: self.url.clone(),
            keypair: self.keypair.clone(),
            config_file: self.config.clone(),
            program_dir: self.program_dir.clone(),
            commitment: self.commitment.clone(),
            fee_multiplier: self.fee_multiplier,
            confirm_timeout_secs: self.confirm_timeout_secs,
        }
    }
}
