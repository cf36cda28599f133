//! In-memory gateway used by the integration tests.
//!
//! The ledger applies system-program `CreateAccountWithSeed` instructions and
//! stands in for the deployed registry program by adding one to the counter
//! of the account it is invoked on.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use marriage_registry_client::{ClientConfig, Gateway, GatewayError, GatewayResult, ProgramPaths};
use solana_program::system_instruction::SystemInstruction;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::InstructionError;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{write_keypair_file, Keypair, Signature, Signer};
use solana_sdk::transaction::{Transaction, TransactionError};
use solana_sdk::{bpf_loader_upgradeable, system_program};
use tempfile::TempDir;

pub struct Ledger {
    pub version: Result<String, String>,
    pub rent_exempt: u64,
    pub signature_fee: u64,
    pub airdrops_land: bool,
    pub airdrops_available: bool,
    /// Most lamports a single airdrop credits.
    pub airdrop_cap: Option<u64>,
    /// When false, submitted transactions never report a status.
    pub transactions_confirm: bool,
    pub accounts: HashMap<Pubkey, Account>,
    pub statuses: HashMap<Signature, Result<(), TransactionError>>,
    pub airdrops: Vec<(Pubkey, u64)>,
    pub creations: usize,
    pub increments: usize,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            version: Ok("1.18.22".to_string()),
            rent_exempt: 0,
            signature_fee: 5_000,
            airdrops_land: true,
            airdrops_available: true,
            airdrop_cap: None,
            transactions_confirm: true,
            accounts: HashMap::new(),
            statuses: HashMap::new(),
            airdrops: Vec::new(),
            creations: 0,
            increments: 0,
        }
    }
}

impl Ledger {
    fn credit(&mut self, pubkey: &Pubkey, lamports: u64) {
        self.accounts
            .entry(*pubkey)
            .or_insert_with(|| Account::new(0, 0, &system_program::id()))
            .lamports += lamports;
    }

    fn process(&mut self, tx: &Transaction) -> Result<(), TransactionError> {
        tx.verify().map_err(|_| TransactionError::SignatureFailure)?;

        let keys = &tx.message.account_keys;
        let mut accounts = self.accounts.clone();
        let mut creations = 0;
        let mut increments = 0;

        let fee = self.signature_fee * u64::from(tx.message.header.num_required_signatures);
        let fee_payer = accounts
            .get_mut(&keys[0])
            .ok_or(TransactionError::AccountNotFound)?;
        if fee_payer.lamports < fee {
            return Err(TransactionError::InsufficientFundsForFee);
        }
        fee_payer.lamports -= fee;

        for (idx, ix) in tx.message.instructions.iter().enumerate() {
            let idx = idx as u8;
            let fail = |e: InstructionError| TransactionError::InstructionError(idx, e);
            let program = keys[ix.program_id_index as usize];

            if program == system_program::id() {
                let Ok(SystemInstruction::CreateAccountWithSeed {
                    base,
                    seed,
                    lamports,
                    space,
                    owner,
                }) = bincode::deserialize::<SystemInstruction>(&ix.data)
                else {
                    return Err(fail(InstructionError::InvalidInstructionData));
                };
                let from = keys[ix.accounts[0] as usize];
                let to = keys[ix.accounts[1] as usize];
                let expected = Pubkey::create_with_seed(&base, &seed, &owner)
                    .map_err(|_| fail(InstructionError::InvalidSeeds))?;
                if expected != to {
                    return Err(fail(InstructionError::InvalidSeeds));
                }
                if accounts.contains_key(&to) {
                    return Err(fail(InstructionError::AccountAlreadyInitialized));
                }
                let payer = accounts
                    .get_mut(&from)
                    .ok_or(fail(InstructionError::MissingAccount))?;
                if payer.lamports < lamports {
                    return Err(fail(InstructionError::InsufficientFunds));
                }
                payer.lamports -= lamports;
                accounts.insert(to, Account::new(lamports, space as usize, &owner));
                creations += 1;
                continue;
            }

            match accounts.get(&program) {
                Some(acct) if acct.executable => {}
                _ => return Err(TransactionError::InvalidProgramForExecution),
            }
            let target = keys[ix.accounts[0] as usize];
            let account = accounts
                .get_mut(&target)
                .ok_or(fail(InstructionError::MissingAccount))?;
            if account.owner != program {
                return Err(fail(InstructionError::IncorrectProgramId));
            }
            let bytes: [u8; 4] = account
                .data
                .as_slice()
                .try_into()
                .map_err(|_| fail(InstructionError::InvalidAccountData))?;
            let counter = u32::from_le_bytes(bytes)
                .checked_add(1)
                .ok_or(fail(InstructionError::ArithmeticOverflow))?;
            account.data = counter.to_le_bytes().to_vec();
            increments += 1;
        }

        self.accounts = accounts;
        self.creations += creations;
        self.increments += increments;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockGateway {
    ledger: Arc<Mutex<Ledger>>,
}

impl MockGateway {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap()
    }

    pub fn fund(&self, pubkey: &Pubkey, lamports: u64) {
        self.ledger().credit(pubkey, lamports);
    }

    pub fn set_account(&self, pubkey: Pubkey, account: Account) {
        self.ledger().accounts.insert(pubkey, account);
    }

    pub fn counter(&self, pubkey: &Pubkey) -> Option<u32> {
        let ledger = self.ledger();
        let data = &ledger.accounts.get(pubkey)?.data;
        Some(u32::from_le_bytes(data.as_slice().try_into().ok()?))
    }
}

#[async_trait]
impl Gateway for MockGateway {
    fn endpoint(&self) -> String {
        "mock://ledger".to_string()
    }

    async fn version(&self) -> GatewayResult<String> {
        self.ledger().version.clone().map_err(GatewayError::Other)
    }

    async fn minimum_balance_for_rent_exemption(&self, _data_len: usize) -> GatewayResult<u64> {
        Ok(self.ledger().rent_exempt)
    }

    async fn fee_for_message(&self, message: &Message) -> GatewayResult<u64> {
        Ok(self.ledger().signature_fee * u64::from(message.header.num_required_signatures))
    }

    async fn balance(&self, pubkey: &Pubkey) -> GatewayResult<u64> {
        Ok(self.ledger().accounts.get(pubkey).map_or(0, |a| a.lamports))
    }

    async fn account(&self, pubkey: &Pubkey) -> GatewayResult<Option<Account>> {
        Ok(self.ledger().accounts.get(pubkey).cloned())
    }

    async fn request_airdrop(&self, pubkey: &Pubkey, lamports: u64) -> GatewayResult<Signature> {
        let mut ledger = self.ledger();
        if !ledger.airdrops_available {
            return Err(GatewayError::Other("airdrop faucet unavailable".to_string()));
        }
        let sig = Signature::new_unique();
        ledger.airdrops.push((*pubkey, lamports));
        if ledger.airdrops_land {
            let credited = ledger.airdrop_cap.map_or(lamports, |cap| lamports.min(cap));
            ledger.credit(pubkey, credited);
            ledger.statuses.insert(sig, Ok(()));
        }
        Ok(sig)
    }

    async fn latest_blockhash(&self) -> GatewayResult<Hash> {
        Ok(Hash::new_unique())
    }

    async fn send_transaction(&self, transaction: &Transaction) -> GatewayResult<Signature> {
        let mut ledger = self.ledger();
        let sig = transaction.signatures[0];
        if !ledger.transactions_confirm {
            return Ok(sig);
        }
        let result = ledger.process(transaction);
        ledger.statuses.insert(sig, result);
        Ok(sig)
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> GatewayResult<Option<Result<(), TransactionError>>> {
        Ok(self.ledger().statuses.get(signature).cloned())
    }
}

/// A deployed program: deploy keypair on disk and an executable account.
pub struct Deployed {
    pub dir: TempDir,
    pub paths: ProgramPaths,
    pub program_id: Pubkey,
    pub payer_path: PathBuf,
    pub payer: Keypair,
}

/// Write program and payer keypairs under a temp dir; register the program
/// account on `gateway` when `on_chain` is set.
pub fn deploy(gateway: &MockGateway, on_chain: bool) -> Deployed {
    let dir = tempfile::tempdir().unwrap();
    let paths = ProgramPaths::in_dir(dir.path());

    let program = Keypair::new();
    write_keypair_file(&program, &paths.keypair_path).unwrap();
    std::fs::write(&paths.so_path, b"\x7fELF").unwrap();

    if on_chain {
        let mut account = Account::new(1, 0, &bpf_loader_upgradeable::id());
        account.executable = true;
        gateway.set_account(program.pubkey(), account);
    }

    let payer = Keypair::new();
    let payer_path = dir.path().join("payer.json");
    write_keypair_file(&payer, &payer_path).unwrap();

    Deployed {
        dir,
        paths,
        program_id: program.pubkey(),
        payer_path,
        payer,
    }
}

pub fn config_for(deployed: &Deployed) -> ClientConfig {
    ClientConfig {
        keypair_path: Some(deployed.payer_path.clone()),
        program: deployed.paths.clone(),
        confirm_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(5),
        ..ClientConfig::default()
    }
}
