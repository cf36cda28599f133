//! Fee payer loading and the funding requirement.

use std::path::{Path, PathBuf};

use serde::Serialize;
use solana_sdk::signature::{read_keypair_file, Keypair};
use tracing::{info, warn};

use crate::errors::{RegistryError, RegistryResult};

/// Where the payer keypair came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum PayerOrigin {
    /// Read from a keypair file (flag or Solana CLI config).
    KeypairFile(PathBuf),
    /// Freshly generated for this run and never written to disk.
    Generated,
}

/// Lamports the payer must hold before the registry account can be set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FundingPlan {
    pub rent_exempt: u64,
    pub signature_fee: u64,
    pub signature_multiplier: u64,
    pub required: u64,
}

impl FundingPlan {
    /// Rent for the registry account plus `multiplier` signature fees.
    ///
    /// The multiplier is a headroom estimate, not an exact fee count.
    pub fn new(rent_exempt: u64, signature_fee: u64, signature_multiplier: u64) -> Self {
        let required = signature_fee
            .saturating_mul(signature_multiplier)
            .saturating_add(rent_exempt);
        Self {
            rent_exempt,
            signature_fee,
            signature_multiplier,
            required,
        }
    }

    /// Lamports missing from `balance`, zero when already covered.
    pub fn shortfall(&self, balance: u64) -> u64 {
        self.required.saturating_sub(balance)
    }
}

/// A payer that held at least [`FundingPlan::required`] lamports when checked.
#[derive(Debug)]
pub struct FundedPayer {
    pub keypair: Keypair,
    pub origin: PayerOrigin,
    /// Balance observed before any airdrop.
    pub initial_balance: u64,
    /// Balance after funding.
    pub balance: u64,
    pub plan: FundingPlan,
    /// Lamports requested from the faucet, if any.
    pub airdropped: Option<u64>,
}

/// Load the payer from `path`, or generate one when there is no usable file.
pub fn load_or_generate(path: Option<&Path>) -> (Keypair, PayerOrigin) {
    let Some(path) = path else {
        info!("no payer keypair configured, generating a new one");
        return (Keypair::new(), PayerOrigin::Generated);
    };

    match read_keypair_file(path) {
        Ok(keypair) => (keypair, PayerOrigin::KeypairFile(path.to_path_buf())),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read payer keypair, generating a new one");
            (Keypair::new(), PayerOrigin::Generated)
        }
    }
}

/// Load a payer that must already exist, for read-only commands.
pub fn load_existing(path: Option<&Path>) -> RegistryResult<Keypair> {
    let path = path.ok_or_else(|| RegistryError::config("no payer keypair configured"))?;
    read_keypair_file(path).map_err(|e| {
        RegistryError::config(format!("cannot read payer keypair {}: {e}", path.display()))
    })
}
