//! Configuration for the registry client.
//!
//! [`ClientConfig`] is an explicit configuration object. The library never
//! reads environment variables; the only implicit input is the Solana CLI
//! config file, consulted by [`ClientConfig::resolve`] for the RPC URL,
//! keypair path and commitment when the caller does not supply them.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Signer};
use tracing::{debug, warn};
use url::Url;

use crate::constants::{
    DEFAULT_COMMITMENT, DEFAULT_CONFIRM_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_PROGRAM_DIR,
    DEFAULT_RPC_URL, DEFAULT_SIGNATURE_FEE_MULTIPLIER, PROGRAM_KEYPAIR_NAME, PROGRAM_SO_NAME,
};
use crate::errors::{DeployHint, RegistryError, RegistryResult};

/// Locations of the compiled program and its deploy keypair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramPaths {
    pub dir: PathBuf,
    pub so_path: PathBuf,
    pub keypair_path: PathBuf,
}

impl ProgramPaths {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            so_path: dir.join(PROGRAM_SO_NAME),
            keypair_path: dir.join(PROGRAM_KEYPAIR_NAME),
            dir,
        }
    }

    /// Program id from the deploy keypair next to the program binary.
    pub fn program_id(&self) -> RegistryResult<Pubkey> {
        read_keypair_file(&self.keypair_path)
            .map(|kp| kp.pubkey())
            .map_err(|e| RegistryError::ProgramNotDeployed {
                hint: DeployHint::for_binary(&self.so_path),
                so_path: self.so_path.clone(),
                detail: format!(
                    "failed to read program keypair at {}: {e}",
                    self.keypair_path.display()
                ),
            })
    }
}

impl Default for ProgramPaths {
    fn default() -> Self {
        Self::in_dir(DEFAULT_PROGRAM_DIR)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub rpc_url: String,
    /// Payer keypair file. `None` means a fresh payer is generated.
    pub keypair_path: Option<PathBuf>,
    pub program: ProgramPaths,
    pub commitment: CommitmentConfig,
    pub signature_fee_multiplier: u64,
    pub confirm_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            keypair_path: None,
            program: ProgramPaths::default(),
            commitment: CommitmentConfig::confirmed(),
            signature_fee_multiplier: DEFAULT_SIGNATURE_FEE_MULTIPLIER,
            confirm_timeout: Duration::from_secs(DEFAULT_CONFIRM_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// Values supplied by the caller, typically from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub keypair: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub program_dir: Option<PathBuf>,
    pub commitment: Option<String>,
    pub fee_multiplier: Option<u64>,
    pub confirm_timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Merge overrides with the Solana CLI config and defaults, then validate.
    ///
    /// Precedence is override, then CLI config, then default. A missing
    /// default CLI config file is not an error; a missing explicit one is.
    pub fn resolve(overrides: ConfigOverrides) -> RegistryResult<Self> {
        let cli = load_cli_config(overrides.config_file.as_deref())?;
        let defaults = Self::default();

        let rpc_url = overrides
            .url
            .or_else(|| cli.as_ref().map(|c| c.json_rpc_url.clone()).filter(|s| !s.is_empty()))
            .map(|u| normalize_url_moniker(&u))
            .unwrap_or(defaults.rpc_url);

        let keypair_path = overrides.keypair.or_else(|| {
            cli.as_ref()
                .map(|c| c.keypair_path.clone())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
        });

        let commitment_str = overrides
            .commitment
            .or_else(|| cli.as_ref().map(|c| c.commitment.clone()).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_COMMITMENT.to_string());
        let commitment = CommitmentConfig::from_str(&commitment_str)
            .map_err(|_| RegistryError::config(format!("unknown commitment level: {commitment_str}")))?;

        let cfg = Self {
            rpc_url,
            keypair_path,
            program: overrides.program_dir.map(ProgramPaths::in_dir).unwrap_or(defaults.program),
            commitment,
            signature_fee_multiplier: overrides
                .fee_multiplier
                .unwrap_or(defaults.signature_fee_multiplier),
            confirm_timeout: overrides
                .confirm_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.confirm_timeout),
            poll_interval: defaults.poll_interval,
        };
        validate_config(&cfg)?;
        Ok(cfg)
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &ClientConfig) -> RegistryResult<()> {
    let url = Url::parse(&cfg.rpc_url)
        .map_err(|e| RegistryError::config(format!("invalid rpc url {:?}: {e}", cfg.rpc_url)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(RegistryError::config(format!(
            "rpc url must use http or https, got {}",
            url.scheme()
        )));
    }

    if cfg.signature_fee_multiplier == 0 {
        return Err(RegistryError::config(
            "signature fee multiplier must be greater than zero",
        ));
    }

    if cfg.confirm_timeout.is_zero() || cfg.poll_interval.is_zero() {
        return Err(RegistryError::config(
            "confirm timeout and poll interval must be greater than zero",
        ));
    }

    if cfg.poll_interval > cfg.confirm_timeout {
        return Err(RegistryError::config(
            "poll interval must not exceed confirm timeout",
        ));
    }

    Ok(())
}

/// Load the Solana CLI config, from `explicit` or the default location.
pub fn load_cli_config(explicit: Option<&Path>) -> RegistryResult<Option<solana_cli_config::Config>> {
    if let Some(path) = explicit {
        let path_str = path.to_string_lossy();
        let cfg = solana_cli_config::Config::load(&path_str).map_err(|e| {
            RegistryError::config(format!("cannot load solana config {}: {e}", path.display()))
        })?;
        return Ok(Some(cfg));
    }

    let Some(default_path) = solana_cli_config::CONFIG_FILE.as_ref() else {
        debug!("no default solana config location");
        return Ok(None);
    };
    if !Path::new(default_path).exists() {
        debug!(path = %default_path, "solana config not found, using defaults");
        return Ok(None);
    }
    match solana_cli_config::Config::load(default_path) {
        Ok(cfg) => Ok(Some(cfg)),
        Err(e) => {
            warn!(path = %default_path, error = %e, "ignoring unreadable solana config");
            Ok(None)
        }
    }
}

/// Expand the cluster monikers the Solana CLI accepts.
fn normalize_url_moniker(url: &str) -> String {
    match url {
        "m" | "mainnet-beta" => "https://api.mainnet-beta.solana.com".to_string(),
        "t" | "testnet" => "https://api.testnet.solana.com".to_string(),
        "d" | "devnet" => "https://api.devnet.solana.com".to_string(),
        "l" | "localhost" => DEFAULT_RPC_URL.to_string(),
        other => other.to_string(),
    }
}
