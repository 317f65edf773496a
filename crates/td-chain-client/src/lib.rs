use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use td_api_types::{Address, NftMetadata, TxHash};
use thiserror::Error;
use tracing::debug;

pub mod contracts;
pub mod rpc;

pub use contracts::{COIN_FUNCTIONS, CoinContract, ContractError, ContractHandle, NFT_FUNCTIONS, NftContract};

/// EIP-1193 error code for a request the user declined in the wallet.
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("wallet provider unavailable: {0}")]
    Unavailable(String),
    #[error("request rejected by user: {0}")]
    Rejected(String),
    #[error("provider error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
    #[error("transaction {0} was not included in time")]
    Timeout(TxHash),
}

impl ProviderError {
    /// Maps a JSON-RPC / EIP-1193 error object onto the taxonomy.
    pub fn from_code(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == USER_REJECTED_CODE {
            ProviderError::Rejected(message)
        } else {
            ProviderError::Rpc { code, message }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: Address,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
}

/// Account or network switch reported by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(u64),
}

/// The wallet provider: holds keys, signs and talks to the chain.
///
/// Futures are not required to be `Send`; in the browser every call resolves
/// on the single UI thread.
#[async_trait(?Send)]
pub trait WalletProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;
    async fn chain_id(&self) -> Result<u64, ProviderError>;
    /// Read-only call against the latest block. Returns the raw return data.
    async fn call(&self, req: &CallRequest) -> Result<Vec<u8>, ProviderError>;
    async fn send_transaction(&self, req: &TransactionRequest) -> Result<TxHash, ProviderError>;
    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<TxReceipt>, ProviderError>;
    /// Resolves once the transaction is part of a block.
    async fn wait_for_inclusion(&self, hash: &TxHash) -> Result<TxReceipt, ProviderError>;

    /// Registers a listener for account and chain switches. Providers without
    /// change notifications accept and ignore it.
    fn subscribe(&self, _listener: Box<dyn Fn(ProviderEvent)>) -> Result<(), ProviderError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("metadata request failed: {0}")]
    Transport(String),
    #[error("metadata request returned HTTP {0}")]
    Status(u16),
    #[error("metadata document is not valid JSON: {0}")]
    Parse(String),
}

/// Fetches off-chain token metadata documents over HTTP(S).
#[async_trait(?Send)]
pub trait MetadataSource {
    async fn fetch_metadata(&self, url: &str) -> Result<NftMetadata, MetadataError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 180,
        }
    }
}

/// Polls `transaction_receipt` at a fixed interval until the transaction is
/// included or the attempts run out. `sleep` is supplied by the provider so the
/// loop works with any executor.
pub async fn poll_receipt<P, S, Fut>(
    provider: &P,
    hash: &TxHash,
    policy: ReceiptPolicy,
    sleep: S,
) -> Result<TxReceipt, ProviderError>
where
    P: WalletProvider + ?Sized,
    S: Fn(Duration) -> Fut,
    Fut: Future<Output = ()>,
{
    for attempt in 0..policy.max_attempts {
        if let Some(receipt) = provider.transaction_receipt(hash).await? {
            debug!(tx_hash = %hash, attempt, "transaction included");
            return Ok(receipt);
        }
        sleep(policy.interval).await;
    }
    Err(ProviderError::Timeout(hash.clone()))
}
