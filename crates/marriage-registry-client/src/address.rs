//! Registry address derivation.
//!
//! The registry account is a seeded address, not a PDA: it is derived from the
//! payer's pubkey, [`REGISTRY_SEED`] and the program id with
//! `Pubkey::create_with_seed`, so the system program can allocate it with the
//! payer as base signer.

use solana_program::pubkey::Pubkey;

use crate::constants::REGISTRY_SEED;
use crate::errors::{RegistryError, RegistryResult};

/// Derive the registry account for `payer` under `program_id`.
pub fn registry_address_for(payer: &Pubkey, program_id: &Pubkey) -> RegistryResult<Pubkey> {
    derive_with_seed(payer, REGISTRY_SEED, program_id)
}

/// Derive a seeded address. The seed is limited to 32 bytes by the runtime.
pub fn derive_with_seed(base: &Pubkey, seed: &str, owner: &Pubkey) -> RegistryResult<Pubkey> {
    Pubkey::create_with_seed(base, seed, owner).map_err(|e| {
        RegistryError::config(format!("cannot derive address from seed {seed:?}: {e}"))
    })
}
