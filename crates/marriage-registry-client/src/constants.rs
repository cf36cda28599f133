//! Constants shared between the on-chain program and clients.
//!
//! Keep these stable because they affect registry address derivation.

/// Seed combined with the payer and program id to derive the registry account.
pub const REGISTRY_SEED: &str = "marriage";

/// Directory holding the compiled program and its deploy keypair.
pub const DEFAULT_PROGRAM_DIR: &str = "dist/program";

/// Compiled program binary, produced by the program build.
pub const PROGRAM_SO_NAME: &str = "marriageregistry.so";

/// Keypair written by `solana program deploy`; its pubkey is the program id.
pub const PROGRAM_KEYPAIR_NAME: &str = "marriageregistry-keypair.json";

/// RPC endpoint used when neither a flag nor the Solana CLI config names one.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8899";

/// Number of signature fees the payer must be able to cover.
pub const DEFAULT_SIGNATURE_FEE_MULTIPLIER: u64 = 100;

/// How long to wait for a submitted transaction to confirm.
pub const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 60;

/// Delay between signature status polls while waiting for confirmation.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Commitment level for queries and confirmation.
pub const DEFAULT_COMMITMENT: &str = "confirmed";
