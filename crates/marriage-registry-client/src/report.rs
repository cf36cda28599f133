//! Summary of a full pipeline run.

use serde::Serialize;
use solana_sdk::native_token::lamports_to_sol;
use solana_sdk::signature::{Signature, Signer};

use crate::payer::{FundedPayer, PayerOrigin};
use crate::registry_client::ReadyProgram;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub endpoint: String,
    pub node_version: String,
    pub payer: String,
    pub payer_origin: PayerOrigin,
    pub payer_balance_lamports: u64,
    pub payer_balance_sol: f64,
    pub airdropped_lamports: Option<u64>,
    pub program_id: String,
    pub registry: String,
    pub registry_created: bool,
    pub increment_signature: String,
    pub counter: u32,
}

impl RunReport {
    pub fn new(
        endpoint: String,
        node_version: String,
        payer: &FundedPayer,
        ready: &ReadyProgram,
        increment: Signature,
        counter: u32,
    ) -> Self {
        Self {
            endpoint,
            node_version,
            payer: payer.keypair.pubkey().to_string(),
            payer_origin: payer.origin.clone(),
            payer_balance_lamports: payer.balance,
            payer_balance_sol: lamports_to_sol(payer.balance),
            airdropped_lamports: payer.airdropped,
            program_id: ready.program_id.to_string(),
            registry: ready.registry.to_string(),
            registry_created: ready.created(),
            increment_signature: increment.to_string(),
            counter,
        }
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        format!("{} has been registered {} time(s)", self.registry, self.counter)
    }
}
