//! Ethereum JSON-RPC wire shapes shared by every provider implementation.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use td_api_types::TxHash;

use crate::{CallRequest, ProviderError, TransactionRequest, TxReceipt};

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    /// A present `error` wins; a missing `result` is returned as `null`.
    pub fn into_result(self) -> Result<Value, ProviderError> {
        if let Some(err) = self.error {
            return Err(ProviderError::from_code(err.code, err.message));
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}

pub fn encode_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn decode_data(value: &Value) -> Result<Vec<u8>, ProviderError> {
    let raw = value
        .as_str()
        .ok_or_else(|| ProviderError::InvalidResponse(format!("expected hex data, got {value}")))?;
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(digits).map_err(|err| ProviderError::InvalidResponse(format!("bad hex data: {err}")))
}

/// Parses a hex quantity such as `0xaa36a7`.
pub fn parse_quantity(value: &Value) -> Result<u64, ProviderError> {
    let raw = value
        .as_str()
        .ok_or_else(|| ProviderError::InvalidResponse(format!("expected hex quantity, got {value}")))?;
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| ProviderError::InvalidResponse(format!("quantity `{raw}` lacks 0x prefix")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|err| ProviderError::InvalidResponse(format!("bad quantity `{raw}`: {err}")))
}

pub fn parse_accounts(value: Value) -> Result<Vec<String>, ProviderError> {
    serde_json::from_value(value).map_err(|err| ProviderError::InvalidResponse(format!("accounts: {err}")))
}

pub fn parse_tx_hash(value: &Value) -> Result<TxHash, ProviderError> {
    value
        .as_str()
        .map(|s| TxHash(s.to_owned()))
        .ok_or_else(|| ProviderError::InvalidResponse(format!("expected transaction hash, got {value}")))
}

pub fn call_params(req: &CallRequest) -> Value {
    json!([
        {
            "to": req.to.to_string(),
            "data": encode_data(&req.data),
        },
        "latest"
    ])
}

pub fn send_params(req: &TransactionRequest) -> Value {
    json!([
        {
            "from": req.from.to_string(),
            "to": req.to.to_string(),
            "data": encode_data(&req.data),
        }
    ])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// `null` means the transaction is still pending. Pre-Byzantium receipts
/// without a `status` field count as successful.
pub fn parse_receipt(value: Value) -> Result<Option<TxReceipt>, ProviderError> {
    if value.is_null() {
        return Ok(None);
    }
    let raw: RawReceipt = serde_json::from_value(value)
        .map_err(|err| ProviderError::InvalidResponse(format!("receipt: {err}")))?;

    let block_number = match raw.block_number {
        Some(n) => Some(parse_quantity(&Value::String(n))?),
        None => None,
    };
    let success = match raw.status {
        Some(status) => parse_quantity(&Value::String(status))? == 1,
        None => true,
    };

    Ok(Some(TxReceipt {
        tx_hash: TxHash(raw.transaction_hash),
        success,
        block_number,
    }))
}
