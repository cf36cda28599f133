use anyhow::Result;
use marriage_registry_client::{payer, registry_address_for, ClientConfig, REGISTRY_SEED};
use serde::Serialize;
use solana_sdk::signature::Signer;

use crate::output;

#[derive(Debug, Serialize)]
pub struct AddressOut {
    pub payer: String,
    pub program_id: String,
    pub seed: &'static str,
    pub registry: String,
}

pub fn run(config: ClientConfig) -> Result<()> {
    let payer = payer::load_existing(config.keypair_path.as_deref())?;
    let program_id = config.program.program_id()?;
    let registry = registry_address_for(&payer.pubkey(), &program_id)?;

    let out = AddressOut {
        payer: payer.pubkey().to_string(),
        program_id: program_id.to_string(),
        seed: REGISTRY_SEED,
        registry: registry.to_string(),
    };
    output::print(&out, &out.registry)
}
