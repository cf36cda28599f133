use anyhow::Result;
use marriage_registry_client::{payer, registry_address_for, ClientConfig};
use serde::Serialize;
use solana_sdk::signature::Signer;

use crate::output;

#[derive(Debug, Serialize)]
pub struct CounterOut {
    pub registry: String,
    pub counter: u32,
}

/// Read-only: no funding, no account creation, no increment.
pub async fn run(config: ClientConfig) -> Result<()> {
    let payer = payer::load_existing(config.keypair_path.as_deref())?;
    let program_id = config.program.program_id()?;
    let registry = registry_address_for(&payer.pubkey(), &program_id)?;

    let pb = super::spinner();
    pb.set_message(format!("reading {registry}"));
    let client = marriage_registry_client::connect(config).await?;
    let counter = client.read_counter(&registry).await?;
    pb.finish_and_clear();

    let out = CounterOut {
        registry: registry.to_string(),
        counter,
    };
    let human = format!("{} has been registered {} time(s)", out.registry, out.counter);
    output::print(&out, &human)
}
