//! Error types for the registry client.
//!
//! Every variant is terminal for a run. Callers that want to retry must
//! re-invoke the failed operation themselves.

use std::fmt;
use std::path::{Path, PathBuf};

use solana_program::pubkey::Pubkey;
use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Connect,
    Payer,
    Program,
    Increment,
    Report,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Connect => "connect",
            Self::Payer => "payer",
            Self::Program => "program",
            Self::Increment => "increment",
            Self::Report => "report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the program could not be used: it was never built, or it was built
/// but not deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployHint {
    NotBuilt,
    NotDeployed,
}

impl DeployHint {
    /// Pick the hint from whether the compiled binary exists.
    pub fn for_binary(so_path: &Path) -> Self {
        if so_path.exists() {
            Self::NotDeployed
        } else {
            Self::NotBuilt
        }
    }

    pub fn advice(&self, so_path: &Path) -> String {
        match self {
            Self::NotBuilt => "program needs to be built and deployed".to_string(),
            Self::NotDeployed => format!(
                "program needs to be deployed with `solana program deploy {}`",
                so_path.display()
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot connect to {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    #[error("payer {payer} holds {balance} lamports but needs {required}: {reason}")]
    InsufficientFunds {
        payer: Pubkey,
        balance: u64,
        required: u64,
        reason: String,
    },

    #[error("{detail}; {}", .hint.advice(.so_path))]
    ProgramNotDeployed {
        hint: DeployHint,
        so_path: PathBuf,
        detail: String,
    },

    #[error("program {program} is not executable")]
    ProgramNotExecutable { program: Pubkey },

    #[error("{stage} transaction failed: {reason}")]
    Transaction { stage: Stage, reason: String },

    #[error("cannot find the registry account {address}")]
    AccountNotFound { address: Pubkey },

    #[error("registry account {address} has unexpected layout: {reason}")]
    Decode {
        stage: Stage,
        address: Pubkey,
        reason: String,
    },
}

impl RegistryError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn transaction(stage: Stage, reason: impl fmt::Display) -> Self {
        Self::Transaction {
            stage,
            reason: reason.to_string(),
        }
    }

    /// Stage to report to the operator.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Config(_) => Stage::Config,
            Self::Connection { .. } => Stage::Connect,
            Self::InsufficientFunds { .. } => Stage::Payer,
            Self::ProgramNotDeployed { .. } | Self::ProgramNotExecutable { .. } => Stage::Program,
            Self::Transaction { stage, .. } => *stage,
            Self::AccountNotFound { .. } => Stage::Report,
            Self::Decode { stage, .. } => *stage,
        }
    }
}
