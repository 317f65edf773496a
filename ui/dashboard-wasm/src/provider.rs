//! EIP-1193 bridge to the injected `window.ethereum` provider.

use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_json::{Value, json};
use std::rc::Rc;
use td_api_types::TxHash;
use td_chain_client::rpc;
use td_chain_client::{
    CallRequest, ProviderError, ProviderEvent, ReceiptPolicy, TransactionRequest, TxReceipt, WalletProvider,
    poll_receipt,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::dom;

pub struct Eip1193Provider {
    ethereum: JsValue,
    receipt_policy: ReceiptPolicy,
}

/// Maps a rejected provider promise onto the error taxonomy. EIP-1193 errors
/// carry a numeric `code`; anything else is treated as a transport failure.
fn js_error(err: JsValue) -> ProviderError {
    let code = Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64());
    let message = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    match code {
        Some(code) => ProviderError::from_code(code as i64, message),
        None => ProviderError::Transport(message),
    }
}

impl Eip1193Provider {
    /// `None` when no wallet extension injected a provider.
    pub fn detect() -> Option<Self> {
        let ethereum = Reflect::get(&dom::window(), &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(Self {
            ethereum,
            receipt_policy: ReceiptPolicy::default(),
        })
    }

    fn method(&self, name: &str) -> Result<Function, ProviderError> {
        Reflect::get(&self.ethereum, &JsValue::from_str(name))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| ProviderError::Unavailable(format!("provider has no `{name}` method")))
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let args = json!({ "method": method, "params": params })
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;

        let promise: Promise = self
            .method("request")?
            .call1(&self.ethereum, &args)
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| ProviderError::InvalidResponse(format!("{method} did not return a promise")))?;
        let result = JsFuture::from(promise).await.map_err(js_error)?;

        serde_wasm_bindgen::from_value(result).map_err(|err| ProviderError::InvalidResponse(format!("{method}: {err}")))
    }

    fn listen(&self, event: &str, handler: Closure<dyn Fn(JsValue)>) -> Result<(), ProviderError> {
        self.method("on")?
            .call2(&self.ethereum, &JsValue::from_str(event), handler.as_ref().unchecked_ref())
            .map_err(js_error)?;
        handler.forget();
        Ok(())
    }
}

#[async_trait(?Send)]
impl WalletProvider for Eip1193Provider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        rpc::parse_accounts(self.request("eth_requestAccounts", json!([])).await?)
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
        rpc::parse_receipt(self.request("eth_getTransactionReceipt", json!([hash.0])).await?)
    }

    async fn wait_for_inclusion(&self, hash: &TxHash) -> Result<TxReceipt, ProviderError> {
        poll_receipt(self, hash, self.receipt_policy, |interval| {
            TimeoutFuture::new(u32::try_from(interval.as_millis()).unwrap_or(u32::MAX))
        })
        .await
    }

    fn subscribe(&self, listener: Box<dyn Fn(ProviderEvent)>) -> Result<(), ProviderError> {
        let listener: Rc<dyn Fn(ProviderEvent)> = Rc::from(listener);

        let on_accounts = Rc::clone(&listener);
        self.listen(
            "accountsChanged",
            Closure::new(move |value: JsValue| {
                let accounts: Vec<String> = serde_wasm_bindgen::from_value(value).unwrap_or_default();
                on_accounts(ProviderEvent::AccountsChanged(accounts));
            }),
        )?;

        self.listen(
            "chainChanged",
            Closure::new(move |value: JsValue| {
                let chain_id = value
                    .as_string()
                    .and_then(|raw| rpc::parse_quantity(&Value::String(raw)).ok())
                    .unwrap_or_default();
                listener(ProviderEvent::ChainChanged(chain_id));
            }),
        )
    }
}
