//! marriage-registry-client
//!
//! A small, focused Rust client for the marriage registry on-chain program.
//!
//! It includes:
//! - the registry seed, program file names and funding defaults
//! - seeded address derivation for the per-payer registry account
//! - the borsh layout of the registry account (one `u32` counter)
//! - a [`Gateway`] seam over the Solana JSON-RPC client
//! - [`RegistryClient`], which connects, funds the payer, readies the program
//!   and registry account, submits increments and reads the counter back
//!
//! The on-chain program itself is not part of this crate. Every increment is
//! executed by the deployed program; the client only submits instructions and
//! reads account data.

pub mod address;
pub mod config;
pub mod constants;
pub mod errors;
pub mod gateway;
pub mod payer;
pub mod registry_client;
pub mod report;
pub mod state;

pub use crate::address::registry_address_for;
pub use crate::constants::*;
pub use crate::config::{validate_config, ClientConfig, ConfigOverrides, ProgramPaths};
pub use crate::errors::{DeployHint, RegistryError, RegistryResult, Stage};
pub use crate::gateway::{Gateway, GatewayError, GatewayResult, RpcGateway};
pub use crate::payer::{FundedPayer, FundingPlan, PayerOrigin};
pub use crate::registry_client::{
    connect, PipelineStep, ReadyProgram, RegistryAccountState, RegistryClient,
};
pub use crate::report::RunReport;
pub use crate::state::MarriageRegistry;
