//! Network gateway seam.
//!
//! [`Gateway`] lists the RPC calls the registry client makes. [`RpcGateway`]
//! forwards them to the nonblocking Solana `RpcClient`; tests provide an
//! in-memory implementation.

use async_trait::async_trait;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};
use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Rpc(#[from] Box<ClientError>),

    #[error("{0}")]
    Other(String),
}

impl From<ClientError> for GatewayError {
    fn from(e: ClientError) -> Self {
        Self::Rpc(Box::new(e))
    }
}

#[async_trait]
pub trait Gateway: Send + Sync {
    /// RPC endpoint this gateway talks to, for diagnostics.
    fn endpoint(&self) -> String;

    /// Version string of the node (`solana-core`).
    async fn version(&self) -> GatewayResult<String>;

    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> GatewayResult<u64>;

    /// Fee the cluster charges for `message`.
    async fn fee_for_message(&self, message: &Message) -> GatewayResult<u64>;

    async fn balance(&self, pubkey: &Pubkey) -> GatewayResult<u64>;

    /// Account at `pubkey`, or `None` when it does not exist.
    async fn account(&self, pubkey: &Pubkey) -> GatewayResult<Option<Account>>;

    async fn request_airdrop(&self, pubkey: &Pubkey, lamports: u64) -> GatewayResult<Signature>;

    async fn latest_blockhash(&self) -> GatewayResult<Hash>;

    /// Submit without waiting for confirmation.
    async fn send_transaction(&self, transaction: &Transaction) -> GatewayResult<Signature>;

    /// `None` while the signature has not landed at the gateway's commitment.
    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> GatewayResult<Option<Result<(), TransactionError>>>;
}

/// Gateway backed by a Solana JSON-RPC node.
pub struct RpcGateway {
    rpc: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcGateway {
    pub fn new(rpc_url: &str, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(rpc_url.to_string(), commitment),
            commitment,
        }
    }
}

#[async_trait]
impl Gateway for RpcGateway {
    fn endpoint(&self) -> String {
        self.rpc.url()
    }

    async fn version(&self) -> GatewayResult<String> {
        let info = self.rpc.get_version().await?;
        Ok(info.solana_core)
    }

    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> GatewayResult<u64> {
        Ok(self.rpc.get_minimum_balance_for_rent_exemption(data_len).await?)
    }

    async fn fee_for_message(&self, message: &Message) -> GatewayResult<u64> {
        Ok(self.rpc.get_fee_for_message(message).await?)
    }

    async fn balance(&self, pubkey: &Pubkey) -> GatewayResult<u64> {
        Ok(self.rpc.get_balance(pubkey).await?)
    }

    async fn account(&self, pubkey: &Pubkey) -> GatewayResult<Option<Account>> {
        let resp = self
            .rpc
            .get_account_with_commitment(pubkey, self.commitment)
            .await?;
        Ok(resp.value)
    }

    async fn request_airdrop(&self, pubkey: &Pubkey, lamports: u64) -> GatewayResult<Signature> {
        Ok(self.rpc.request_airdrop(pubkey, lamports).await?)
    }

    async fn latest_blockhash(&self) -> GatewayResult<Hash> {
        Ok(self.rpc.get_latest_blockhash().await?)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> GatewayResult<Signature> {
        Ok(self.rpc.send_transaction(transaction).await?)
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> GatewayResult<Option<Result<(), TransactionError>>> {
        Ok(self
            .rpc
            .get_signature_status_with_commitment(signature, self.commitment)
            .await?)
    }
}
