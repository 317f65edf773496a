use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use td_api_types::{NftMetadata, TxHash};
use td_chain_client::rpc::{self, JsonRpcRequest, JsonRpcResponse};
use td_chain_client::{
    CallRequest, MetadataError, MetadataSource, ProviderError, ReceiptPolicy, TransactionRequest, TxReceipt,
    WalletProvider, poll_receipt,
};
use tracing::{debug, warn};

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// JSON-RPC over HTTP provider for a node that holds unlocked accounts
/// (a local dev node or a signing proxy).
///
/// Reads `TOKENDECK_RPC_URL` from the environment at construction time when
/// no endpoint is given (default: `http://localhost:8545`).
pub struct RpcProvider {
    endpoint: String,
    http: reqwest::Client,
    account: Option<String>,
    receipt_policy: ReceiptPolicy,
    next_id: AtomicU64,
}

impl Default for RpcProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RpcProvider {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("TOKENDECK_RPC_URL").ok())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            account: None,
            receipt_policy: ReceiptPolicy::default(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Answer `request_accounts` with this account instead of `eth_accounts`.
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_receipt_policy(mut self, policy: ReceiptPolicy) -> Self {
        self.receipt_policy = policy;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, body: &JsonRpcRequest<'_>) -> anyhow::Result<JsonRpcResponse> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .with_context(|| format!("{} transport", body.method))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("{} HTTP {status}: {text}", body.method);
        }

        response
            .json()
            .await
            .with_context(|| format!("{} parse", body.method))
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = JsonRpcRequest::new(id, method, params);
        debug!(method, id, "json-rpc request");

        let response = self
            .post(&body)
            .await
            .map_err(|err| ProviderError::Transport(format!("{err:#}")))?;
        response.into_result()
    }
}

#[async_trait(?Send)]
impl WalletProvider for RpcProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        if let Some(account) = &self.account {
            return Ok(vec![account.clone()]);
        }
        rpc::parse_accounts(self.request("eth_accounts", json!([])).await?)
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        rpc::parse_quantity(&self.request("eth_chainId", json!([])).await?)
    }

    async fn call(&self, req: &CallRequest) -> Result<Vec<u8>, ProviderError> {
        rpc::decode_data(&self.request("eth_call", rpc::call_params(req)).await?)
    }

    async fn send_transaction(&self, req: &TransactionRequest) -> Result<TxHash, ProviderError> {
        rpc::parse_tx_hash(&self.request("eth_sendTransaction", rpc::send_params(req)).await?)
    }

    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<TxReceipt>, ProviderError> {
        rpc::parse_receipt(
            self.request("eth_getTransactionReceipt", json!([hash.0]))
                .await?,
        )
    }

    async fn wait_for_inclusion(&self, hash: &TxHash) -> Result<TxReceipt, ProviderError> {
        poll_receipt(self, hash, self.receipt_policy, tokio::time::sleep).await
    }
}

/// Fetches metadata documents with a plain GET.
pub struct HttpMetadataSource {
    http: reqwest::Client,
}

impl Default for HttpMetadataSource {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait(?Send)]
impl MetadataSource for HttpMetadataSource {
    async fn fetch_metadata(&self, url: &str) -> Result<NftMetadata, MetadataError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| MetadataError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "metadata request failed");
            return Err(MetadataError::Status(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|err| MetadataError::Transport(err.to_string()))?;
        serde_json::from_str(&text).map_err(|err| MetadataError::Parse(err.to_string()))
    }
}
