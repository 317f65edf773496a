use td_api_types::{AddressError, TokenId};
use td_chain_client::{ContractError, ProviderError};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("no wallet provider available")]
    NoProvider,
    #[error("wallet returned no accounts")]
    NoAccounts,
    #[error("chain {0} is not supported")]
    UnsupportedChain(u64),
    #[error("contract interface missing: {0}")]
    ContractInterfaceMissing(String),
    #[error("a connection attempt is already in progress")]
    ConnectInProgress,
    #[error("wallet changed while connecting")]
    SessionInvalidated,
    #[error("wallet is not connected")]
    NotConnected,
    #[error("invalid address `{input}`: {reason}")]
    InvalidAddress { input: String, reason: AddressError },
    #[error("invalid amount `{0}`")]
    InvalidAmount(String),
    #[error("token URI is empty")]
    InvalidTokenUri,
    #[error("transaction rejected: {0}")]
    TransactionRejected(String),
    #[error("transaction failed: {0}")]
    TransactionFailed(String),
    #[error("metadata for token {token_id} unavailable: {reason}")]
    MetadataFetchFailed { token_id: TokenId, reason: String },
    #[error("owner query for token {token_id} failed: {reason}")]
    OwnerQueryFailed { token_id: TokenId, reason: String },
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl DashboardError {
    pub(crate) fn from_submission(err: ContractError) -> Self {
        match err {
            ContractError::Provider(ProviderError::Rejected(message)) => DashboardError::TransactionRejected(message),
            other => DashboardError::TransactionFailed(other.to_string()),
        }
    }
}
