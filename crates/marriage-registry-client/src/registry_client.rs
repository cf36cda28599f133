//! Registry client for the marriage registry on-chain program.
//!
//! This client can:
//! - connect to a cluster and record the node version
//! - load and fund a fee payer
//! - check the program is deployed and create the registry account once
//! - submit increment instructions and read the counter back
//!
//! Operations run one at a time and each waits for confirmation before
//! returning. None of them retry on failure.

use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;
use solana_program::system_instruction;
use solana_sdk::message::Message;
use solana_sdk::native_token::lamports_to_sol;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::{Transaction, TransactionError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::address::registry_address_for;
use crate::config::{validate_config, ClientConfig};
use crate::constants::REGISTRY_SEED;
use crate::errors::{DeployHint, RegistryError, RegistryResult, Stage};
use crate::gateway::{Gateway, GatewayError, RpcGateway};
use crate::payer::{self, FundedPayer, FundingPlan, PayerOrigin};
use crate::report::RunReport;
use crate::state::MarriageRegistry;

/// Progress of the registry account through setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryAccountState {
    AddressDerived,
    AccountMissing,
    AccountCreating,
    AccountReady { created: bool },
}

/// Outcome of [`RegistryClient::ensure_program_ready`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyProgram {
    pub program_id: Pubkey,
    pub registry: Pubkey,
    /// States visited, ending in `AccountReady`.
    pub transitions: Vec<RegistryAccountState>,
}

impl ReadyProgram {
    pub fn created(&self) -> bool {
        matches!(
            self.transitions.last(),
            Some(RegistryAccountState::AccountReady { created: true })
        )
    }
}

/// Step of [`RegistryClient::run_pipeline_with`] about to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    FundPayer,
    PrepareProgram,
    Increment { registry: Pubkey },
    ReadCounter,
}

#[derive(Debug, Error)]
enum ConfirmFailure {
    #[error("transaction {0} failed: {1}")]
    Failed(Signature, TransactionError),

    #[error("transaction {0} not confirmed within {1:?}")]
    Timeout(Signature, Duration),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Connect to the configured RPC endpoint.
pub async fn connect(config: ClientConfig) -> RegistryResult<RegistryClient<RpcGateway>> {
    validate_config(&config)?;
    let gateway = RpcGateway::new(&config.rpc_url, config.commitment);
    RegistryClient::connect_with(gateway, config).await
}

/// Build the increment instruction. Any invocation of the program increments,
/// so the payload is empty.
pub fn ix_increment(program_id: &Pubkey, registry: &Pubkey) -> Instruction {
    Instruction::new_with_bytes(*program_id, &[], vec![AccountMeta::new(*registry, false)])
}

/// Build the instruction allocating the registry account for `payer`.
pub fn ix_create_registry(
    payer: &Pubkey,
    registry: &Pubkey,
    program_id: &Pubkey,
    lamports: u64,
) -> Instruction {
    system_instruction::create_account_with_seed(
        payer,
        registry,
        payer,
        REGISTRY_SEED,
        lamports,
        MarriageRegistry::SIZE as u64,
        program_id,
    )
}

pub struct RegistryClient<G> {
    gateway: G,
    config: ClientConfig,
    node_version: String,
}

impl<G: Gateway> RegistryClient<G> {
    /// Query the node version once and keep the gateway for later calls.
    pub async fn connect_with(gateway: G, config: ClientConfig) -> RegistryResult<Self> {
        let endpoint = gateway.endpoint();
        let node_version = gateway
            .version()
            .await
            .map_err(|e| RegistryError::Connection {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
        check_version(&node_version).map_err(|reason| RegistryError::Connection {
            endpoint: endpoint.clone(),
            reason,
        })?;

        info!(%endpoint, version = %node_version, "connection to cluster established");
        Ok(Self {
            gateway,
            config,
            node_version,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn node_version(&self) -> &str {
        &self.node_version
    }

    pub fn endpoint(&self) -> String {
        self.gateway.endpoint()
    }

    /// Rent for the registry account plus the configured number of signature fees.
    pub async fn funding_plan(&self, payer: &Pubkey) -> RegistryResult<FundingPlan> {
        let rent = self
            .gateway
            .minimum_balance_for_rent_exemption(MarriageRegistry::SIZE)
            .await
            .map_err(|e| self.query_failed("rent exemption", e))?;
        let blockhash = self
            .gateway
            .latest_blockhash()
            .await
            .map_err(|e| self.query_failed("latest blockhash", e))?;
        // A message with no instructions costs exactly one signature.
        let probe = Message::new_with_blockhash(&[], Some(payer), &blockhash);
        let signature_fee = self
            .gateway
            .fee_for_message(&probe)
            .await
            .map_err(|e| self.query_failed("fee for message", e))?;

        let plan = FundingPlan::new(rent, signature_fee, self.config.signature_fee_multiplier);
        debug!(?plan, "computed funding requirement");
        Ok(plan)
    }

    /// Load the configured payer (or generate one) and make sure it is funded.
    pub async fn ensure_payer_funded(&self) -> RegistryResult<FundedPayer> {
        let (keypair, origin) = payer::load_or_generate(self.config.keypair_path.as_deref());
        self.fund_payer(keypair, origin).await
    }

    /// Airdrop the shortfall to `keypair` if its balance is below the plan.
    pub async fn fund_payer(&self, keypair: Keypair, origin: PayerOrigin) -> RegistryResult<FundedPayer> {
        let pubkey = keypair.pubkey();
        let plan = self.funding_plan(&pubkey).await?;
        let initial_balance = self.balance(&pubkey).await?;
        let shortfall = plan.shortfall(initial_balance);

        let insufficient = |balance: u64, reason: String| RegistryError::InsufficientFunds {
            payer: pubkey,
            balance,
            required: plan.required,
            reason,
        };

        let mut balance = initial_balance;
        let mut airdropped = None;
        if shortfall > 0 {
            info!(payer = %pubkey, lamports = shortfall, "requesting airdrop");
            let sig = self
                .gateway
                .request_airdrop(&pubkey, shortfall)
                .await
                .map_err(|e| insufficient(initial_balance, format!("airdrop request failed: {e}")))?;
            self.await_confirmation(&sig)
                .await
                .map_err(|e| insufficient(initial_balance, format!("airdrop not confirmed: {e}")))?;
            airdropped = Some(shortfall);

            balance = self.balance(&pubkey).await?;
            if balance < plan.required {
                return Err(insufficient(balance, "balance still short after airdrop".to_string()));
            }
        }

        info!(
            payer = %pubkey,
            sol = lamports_to_sol(balance),
            "using account to pay for fees"
        );
        Ok(FundedPayer {
            keypair,
            origin,
            initial_balance,
            balance,
            plan,
            airdropped,
        })
    }

    /// Program id from the deploy keypair next to the program binary.
    pub fn load_program_id(&self) -> RegistryResult<Pubkey> {
        self.config.program.program_id()
    }

    /// Fail unless `program_id` exists on chain and is executable.
    pub async fn check_program(&self, program_id: &Pubkey) -> RegistryResult<()> {
        let account = self
            .gateway
            .account(program_id)
            .await
            .map_err(|e| self.query_failed("program account", e))?;
        match account {
            None => {
                let so_path = self.config.program.so_path.clone();
                Err(RegistryError::ProgramNotDeployed {
                    hint: DeployHint::for_binary(&so_path),
                    so_path,
                    detail: format!("program {program_id} not found at {}", self.endpoint()),
                })
            }
            Some(account) if !account.executable => {
                Err(RegistryError::ProgramNotExecutable { program: *program_id })
            }
            Some(_) => Ok(()),
        }
    }

    /// Check the program and create the registry account if it is missing.
    pub async fn ensure_program_ready(&self, payer: &Keypair) -> RegistryResult<ReadyProgram> {
        let program_id = self.load_program_id()?;
        self.check_program(&program_id).await?;
        info!(program = %program_id, "using program");

        let registry = registry_address_for(&payer.pubkey(), &program_id)?;
        let mut transitions = vec![RegistryAccountState::AddressDerived];

        let existing = self
            .gateway
            .account(&registry)
            .await
            .map_err(|e| self.query_failed("registry account", e))?;

        match existing {
            Some(account) => {
                if account.owner != program_id {
                    return Err(RegistryError::Decode {
                        stage: Stage::Program,
                        address: registry,
                        reason: format!("owned by {}, expected {program_id}", account.owner),
                    });
                }
                if account.data.len() != MarriageRegistry::SIZE {
                    return Err(RegistryError::Decode {
                        stage: Stage::Program,
                        address: registry,
                        reason: format!(
                            "expected {} bytes, found {}",
                            MarriageRegistry::SIZE,
                            account.data.len()
                        ),
                    });
                }
                debug!(%registry, "registry account already exists");
                transitions.push(RegistryAccountState::AccountReady { created: false });
            }
            None => {
                transitions.push(RegistryAccountState::AccountMissing);
                info!(%registry, "creating account to register to");
                let lamports = self
                    .gateway
                    .minimum_balance_for_rent_exemption(MarriageRegistry::SIZE)
                    .await
                    .map_err(|e| self.query_failed("rent exemption", e))?;
                let ix = ix_create_registry(&payer.pubkey(), &registry, &program_id, lamports);

                transitions.push(RegistryAccountState::AccountCreating);
                let sig = self.send_and_confirm(Stage::Program, payer, &[ix]).await?;
                debug!(%registry, %sig, "registry account created");
                transitions.push(RegistryAccountState::AccountReady { created: true });
            }
        }

        Ok(ReadyProgram {
            program_id,
            registry,
            transitions,
        })
    }

    /// Submit one increment. Calling this twice increments twice.
    pub async fn submit_increment(
        &self,
        payer: &Keypair,
        program_id: &Pubkey,
        registry: &Pubkey,
    ) -> RegistryResult<Signature> {
        info!(%registry, "registering to");
        let ix = ix_increment(program_id, registry);
        self.send_and_confirm(Stage::Increment, payer, &[ix]).await
    }

    /// Decode the counter stored in the registry account.
    pub async fn read_counter(&self, registry: &Pubkey) -> RegistryResult<u32> {
        let account = self
            .gateway
            .account(registry)
            .await
            .map_err(|e| self.query_failed("registry account", e))?
            .ok_or(RegistryError::AccountNotFound { address: *registry })?;

        let state = MarriageRegistry::decode(&account.data).map_err(|reason| RegistryError::Decode {
            stage: Stage::Report,
            address: *registry,
            reason,
        })?;
        info!(%registry, counter = state.counter, "has been registered");
        Ok(state.counter)
    }

    /// Run every step in order; the first failure aborts the rest.
    pub async fn run_pipeline(&self) -> RegistryResult<RunReport> {
        self.run_pipeline_with(|_| {}).await
    }

    /// Like [`Self::run_pipeline`], calling `on_step` before each step.
    pub async fn run_pipeline_with<F>(&self, mut on_step: F) -> RegistryResult<RunReport>
    where
        F: FnMut(PipelineStep),
    {
        on_step(PipelineStep::FundPayer);
        let payer = self.ensure_payer_funded().await?;

        on_step(PipelineStep::PrepareProgram);
        let ready = self.ensure_program_ready(&payer.keypair).await?;

        on_step(PipelineStep::Increment {
            registry: ready.registry,
        });
        let sig = self
            .submit_increment(&payer.keypair, &ready.program_id, &ready.registry)
            .await?;

        on_step(PipelineStep::ReadCounter);
        let counter = self.read_counter(&ready.registry).await?;

        Ok(RunReport::new(
            self.endpoint(),
            self.node_version.clone(),
            &payer,
            &ready,
            sig,
            counter,
        ))
    }

    async fn balance(&self, pubkey: &Pubkey) -> RegistryResult<u64> {
        self.gateway
            .balance(pubkey)
            .await
            .map_err(|e| self.query_failed("balance", e))
    }

    async fn send_and_confirm(
        &self,
        stage: Stage,
        payer: &Keypair,
        ixs: &[Instruction],
    ) -> RegistryResult<Signature> {
        let blockhash = self
            .gateway
            .latest_blockhash()
            .await
            .map_err(|e| RegistryError::transaction(stage, e))?;
        let tx = Transaction::new_signed_with_payer(ixs, Some(&payer.pubkey()), &[payer], blockhash);
        let sig = self
            .gateway
            .send_transaction(&tx)
            .await
            .map_err(|e| RegistryError::transaction(stage, e))?;
        self.await_confirmation(&sig)
            .await
            .map_err(|e| RegistryError::transaction(stage, e))?;
        Ok(sig)
    }

    async fn await_confirmation(&self, sig: &Signature) -> Result<(), ConfirmFailure> {
        let deadline = Instant::now() + self.config.confirm_timeout;
        loop {
            match self.gateway.signature_status(sig).await? {
                Some(Ok(())) => return Ok(()),
                Some(Err(e)) => return Err(ConfirmFailure::Failed(*sig, e)),
                None => {}
            }
            if Instant::now() >= deadline {
                return Err(ConfirmFailure::Timeout(*sig, self.config.confirm_timeout));
            }
            debug!(%sig, "waiting for confirmation");
            sleep(self.config.poll_interval).await;
        }
    }

    fn query_failed(&self, what: &str, e: GatewayError) -> RegistryError {
        RegistryError::Connection {
            endpoint: self.endpoint(),
            reason: format!("{what} query failed: {e}"),
        }
    }
}

/// Accept versions whose leading component is numeric, e.g. `1.18.22`.
fn check_version(version: &str) -> Result<(), String> {
    let major = version.split('.').next().unwrap_or_default();
    if major.is_empty() || major.parse::<u64>().is_err() {
        return Err(format!("malformed node version {version:?}"));
    }
    Ok(())
}
