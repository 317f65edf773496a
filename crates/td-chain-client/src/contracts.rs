//! Typed handles for the fungible and non-fungible token contracts.
//!
//! A handle binds a fixed contract address, its interface descriptor and the
//! provider. Construction checks that the descriptor declares every function
//! the handle calls, so a handle that exists can always encode its calls.

use std::rc::Rc;
use td_abi::{AbiError, ContractInterface, DynSolValue, U256};
use td_api_types::{Address, TokenId, TxHash};
use thiserror::Error;
use tracing::info;

use crate::{CallRequest, ProviderError, TransactionRequest, TxReceipt, WalletProvider};

pub const COIN_FUNCTIONS: &[&str] = &["balanceOf", "transfer"];
pub const NFT_FUNCTIONS: &[&str] = &["ownerOf", "tokenURI", "mintNFT", "burn", "safeTransferFrom"];

#[derive(Debug, Error)]
pub enum ContractError {
    #[error(transparent)]
    Abi(#[from] AbiError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("`{0}` returned an unexpected value")]
    UnexpectedOutput(&'static str),
}

pub struct ContractHandle<P> {
    address: Address,
    interface: Rc<ContractInterface>,
    provider: Rc<P>,
}

impl<P> Clone for ContractHandle<P> {
    fn clone(&self) -> Self {
        Self {
            address: self.address.clone(),
            interface: Rc::clone(&self.interface),
            provider: Rc::clone(&self.provider),
        }
    }
}

impl<P: WalletProvider> ContractHandle<P> {
    pub fn new(
        address: Address,
        interface: Rc<ContractInterface>,
        provider: Rc<P>,
        required: &[&str],
    ) -> Result<Self, AbiError> {
        interface.require(required)?;
        Ok(Self {
            address,
            interface,
            provider,
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub async fn read(&self, function: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>, ContractError> {
        let data = self.interface.encode_call(function, args)?;
        let output = self
            .provider
            .call(&CallRequest {
                to: self.address.clone(),
                data,
            })
            .await?;
        Ok(self.interface.decode_output(function, &output)?)
    }

    /// Submits a state-changing call from `from` and waits for inclusion.
    pub async fn submit(
        &self,
        from: &Address,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<TxReceipt, ContractError> {
        let data = self.interface.encode_call(function, args)?;
        let hash = self
            .provider
            .send_transaction(&TransactionRequest {
                from: from.clone(),
                to: self.address.clone(),
                data,
            })
            .await?;
        info!(contract = %self.address, function, tx_hash = %hash, "transaction submitted");

        let receipt = self.provider.wait_for_inclusion(&hash).await?;
        if !receipt.success {
            return Err(ContractError::Reverted(receipt.tx_hash));
        }
        Ok(receipt)
    }

    async fn read_one(&self, function: &'static str, args: &[DynSolValue]) -> Result<DynSolValue, ContractError> {
        self.read(function, args)
            .await?
            .into_iter()
            .next()
            .ok_or(ContractError::UnexpectedOutput(function))
    }
}

fn token_arg(token_id: TokenId) -> DynSolValue {
    td_abi::uint(U256::from(token_id.0))
}

fn address_arg(address: &Address) -> DynSolValue {
    DynSolValue::Address(address.evm())
}

/// Fungible token with a fixed 18-decimal convention.
pub struct CoinContract<P>(ContractHandle<P>);

impl<P> Clone for CoinContract<P> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<P: WalletProvider> CoinContract<P> {
    pub fn new(address: Address, interface: Rc<ContractInterface>, provider: Rc<P>) -> Result<Self, AbiError> {
        ContractHandle::new(address, interface, provider, COIN_FUNCTIONS).map(Self)
    }

    pub fn address(&self) -> &Address {
        self.0.address()
    }

    pub async fn balance_of(&self, owner: &Address) -> Result<U256, ContractError> {
        self.0
            .read_one("balanceOf", &[address_arg(owner)])
            .await?
            .as_uint()
            .map(|(value, _)| value)
            .ok_or(ContractError::UnexpectedOutput("balanceOf"))
    }

    pub async fn transfer(&self, from: &Address, to: &Address, amount: U256) -> Result<TxReceipt, ContractError> {
        self.0
            .submit(from, "transfer", &[address_arg(to), td_abi::uint(amount)])
            .await
    }
}

pub struct NftContract<P>(ContractHandle<P>);

impl<P> Clone for NftContract<P> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<P: WalletProvider> NftContract<P> {
    pub fn new(address: Address, interface: Rc<ContractInterface>, provider: Rc<P>) -> Result<Self, AbiError> {
        ContractHandle::new(address, interface, provider, NFT_FUNCTIONS).map(Self)
    }

    pub fn address(&self) -> &Address {
        self.0.address()
    }

    pub async fn owner_of(&self, token_id: TokenId) -> Result<Address, ContractError> {
        self.0
            .read_one("ownerOf", &[token_arg(token_id)])
            .await?
            .as_address()
            .map(Address::from)
            .ok_or(ContractError::UnexpectedOutput("ownerOf"))
    }

    pub async fn token_uri(&self, token_id: TokenId) -> Result<String, ContractError> {
        self.0
            .read_one("tokenURI", &[token_arg(token_id)])
            .await?
            .as_str()
            .map(str::to_owned)
            .ok_or(ContractError::UnexpectedOutput("tokenURI"))
    }

    pub async fn mint_nft(&self, from: &Address, to: &Address, uri: &str) -> Result<TxReceipt, ContractError> {
        self.0
            .submit(from, "mintNFT", &[address_arg(to), DynSolValue::String(uri.to_owned())])
            .await
    }

    pub async fn burn(&self, from: &Address, token_id: TokenId) -> Result<TxReceipt, ContractError> {
        self.0.submit(from, "burn", &[token_arg(token_id)]).await
    }

    pub async fn safe_transfer_from(
        &self,
        from: &Address,
        to: &Address,
        token_id: TokenId,
    ) -> Result<TxReceipt, ContractError> {
        self.0
            .submit(
                from,
                "safeTransferFrom",
                &[address_arg(from), address_arg(to), token_arg(token_id)],
            )
            .await
    }
}
