//! In-memory chain, metadata host and rendering surface for the dashboard tests.

use alloy_primitives::U256;
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use td_abi::{ContractInterface, DynSolValue, Function};
use td_api_types::{Address, NftMetadata, Notification, TokenId, TxHash};
use td_chain_client::{
    CallRequest, MetadataError, MetadataSource, NftContract, ProviderError, ProviderEvent, ReceiptPolicy,
    TransactionRequest, TxReceipt, WalletProvider, poll_receipt,
};

use crate::config::{COIN_ADDRESS, ContractInterfaces, DashboardConfig, NFT_ADDRESS, SEPOLIA};
use crate::dashboard::Dashboard;
use crate::ui::{AssetListView, BalanceView, ConnectionView, DashboardUi, StatusView};

pub(crate) const USER: &str = "0x00000000000000000000000000000000000000aa";
pub(crate) const OTHER: &str = "0x00000000000000000000000000000000000000bb";
pub(crate) const STARTING_BALANCE: &str = "1234567890000000000";

pub(crate) struct ChainState {
    pub accounts: Vec<String>,
    pub chain_id: u64,
    pub owners: BTreeMap<u64, Address>,
    pub uris: BTreeMap<u64, String>,
    pub balances: BTreeMap<Address, U256>,
    pub next_token: u64,
    pub account_requests: u32,
    pub yield_on_chain_id: bool,
    /// Parks the first receipt lookup of every transaction for one turn.
    pub yield_on_receipt: bool,
    /// Emits `accountsChanged` from inside `request_accounts`, as wallets do
    /// when a site is first approved.
    pub announce_accounts: bool,
    pub reject_sends: bool,
    pub revert_sends: bool,
    pub fail_balance: bool,
    pub sent: Vec<TransactionRequest>,
    receipts: BTreeMap<String, bool>,
}

/// Applies coin and NFT calls against in-memory ledgers, decoding the calldata
/// with the built-in interface descriptors.
pub(crate) struct FakeChain {
    pub state: RefCell<ChainState>,
    interfaces: ContractInterfaces,
    listener: RefCell<Option<Box<dyn Fn(ProviderEvent)>>>,
}

fn rpc_error(message: &str) -> ProviderError {
    ProviderError::Rpc {
        code: -32000,
        message: message.to_owned(),
    }
}

impl FakeChain {
    pub fn sepolia() -> Rc<Self> {
        let mut balances = BTreeMap::new();
        balances.insert(
            Address::parse(USER).unwrap(),
            STARTING_BALANCE.parse::<U256>().unwrap(),
        );
        Rc::new(Self {
            state: RefCell::new(ChainState {
                accounts: vec![USER.to_owned()],
                chain_id: SEPOLIA,
                owners: BTreeMap::new(),
                uris: BTreeMap::new(),
                balances,
                next_token: 1,
                account_requests: 0,
                yield_on_chain_id: false,
                yield_on_receipt: false,
                announce_accounts: false,
                reject_sends: false,
                revert_sends: false,
                fail_balance: false,
                sent: Vec::new(),
                receipts: BTreeMap::new(),
            }),
            interfaces: ContractInterfaces::builtin().unwrap(),
            listener: RefCell::new(None),
        })
    }

    /// Delivers `event` to the subscribed listener, if any.
    pub fn emit(&self, event: ProviderEvent) {
        if let Some(listener) = self.listener.borrow().as_ref() {
            listener(event);
        }
    }

    pub fn mint(&self, owner: &str, uri: &str) -> TokenId {
        let owner = Address::parse(owner).unwrap();
        self.state.borrow_mut().mint(owner, uri.to_owned())
    }

    pub fn owner(&self, token_id: u64) -> Option<Address> {
        self.state.borrow().owners.get(&token_id).cloned()
    }

    pub fn balance(&self, owner: &str) -> U256 {
        let owner = Address::parse(owner).unwrap();
        self.state.borrow().balances.get(&owner).copied().unwrap_or_default()
    }

    fn coin_address() -> Address {
        Address::parse(COIN_ADDRESS).unwrap()
    }

    fn nft_address() -> Address {
        Address::parse(NFT_ADDRESS).unwrap()
    }

    fn interface_for(&self, to: &Address) -> Result<&ContractInterface, ProviderError> {
        let interface = if *to == Self::coin_address() {
            self.interfaces.coin.as_deref()
        } else if *to == Self::nft_address() {
            self.interfaces.nft.as_deref()
        } else {
            None
        };
        interface.ok_or_else(|| rpc_error("no contract at address"))
    }

    fn decode(&self, to: &Address, data: &[u8]) -> Result<(Function, Vec<DynSolValue>), ProviderError> {
        let (function, args) = self
            .interface_for(to)?
            .decode_call(data)
            .map_err(|err| rpc_error(&err.to_string()))?;
        Ok((function.clone(), args))
    }
}

fn token_id(value: Option<&DynSolValue>) -> Option<u64> {
    value.and_then(DynSolValue::as_uint).map(|(id, _)| id.to::<u64>())
}

impl ChainState {
    fn mint(&mut self, owner: Address, uri: String) -> TokenId {
        let id = self.next_token;
        self.next_token += 1;
        self.owners.insert(id, owner);
        self.uris.insert(id, uri);
        TokenId(id)
    }

    fn apply(&mut self, from: &Address, function: &str, args: Vec<DynSolValue>) -> bool {
        match function {
            "transfer" => {
                let [DynSolValue::Address(to), DynSolValue::Uint(amount, _)] = args.as_slice() else {
                    return false;
                };
                let (to, amount) = (Address::from(*to), *amount);
                let available = self.balances.get(from).copied().unwrap_or_default();
                if available < amount {
                    return false;
                }
                self.balances.insert(from.clone(), available - amount);
                *self.balances.entry(to).or_default() += amount;
                true
            }
            "mintNFT" => {
                let [DynSolValue::Address(to), DynSolValue::String(uri)] = args.as_slice() else {
                    return false;
                };
                self.mint(Address::from(*to), uri.clone());
                true
            }
            "burn" => {
                let Some(id) = token_id(args.first()) else {
                    return false;
                };
                if self.owners.get(&id) != Some(from) {
                    return false;
                }
                self.owners.remove(&id);
                self.uris.remove(&id);
                true
            }
            "safeTransferFrom" => {
                let [DynSolValue::Address(owner), DynSolValue::Address(to), id] = args.as_slice() else {
                    return false;
                };
                let (owner, to) = (Address::from(*owner), Address::from(*to));
                let Some(id) = token_id(Some(id)) else {
                    return false;
                };
                if owner != *from || self.owners.get(&id) != Some(&owner) {
                    return false;
                }
                self.owners.insert(id, to);
                true
            }
            _ => false,
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for FakeChain {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        let (accounts, announce) = {
            let mut state = self.state.borrow_mut();
            state.account_requests += 1;
            (state.accounts.clone(), state.announce_accounts)
        };
        if announce {
            self.emit(ProviderEvent::AccountsChanged(accounts.clone()));
        }
        Ok(accounts)
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        let yield_first = self.state.borrow().yield_on_chain_id;
        if yield_first {
            tokio::task::yield_now().await;
        }
        Ok(self.state.borrow().chain_id)
    }

    async fn call(&self, req: &CallRequest) -> Result<Vec<u8>, ProviderError> {
        let (function, args) = self.decode(&req.to, &req.data)?;
        let id = token_id(args.first());

        let state = self.state.borrow();
        let output = match function.name.as_str() {
            "balanceOf" if state.fail_balance => return Err(rpc_error("balance unavailable")),
            "balanceOf" => {
                let owner = args.first().and_then(DynSolValue::as_address).map(Address::from);
                let balance = owner
                    .and_then(|owner| state.balances.get(&owner).copied())
                    .unwrap_or_default();
                td_abi::uint(balance)
            }
            "ownerOf" => id
                .and_then(|id| state.owners.get(&id).cloned())
                .map(|owner| DynSolValue::Address(owner.evm()))
                .ok_or_else(|| rpc_error("execution reverted: ERC721: invalid token ID"))?,
            "tokenURI" => id
                .and_then(|id| state.uris.get(&id).cloned())
                .map(DynSolValue::String)
                .ok_or_else(|| rpc_error("execution reverted: ERC721: invalid token ID"))?,
            other => return Err(rpc_error(&format!("{other} is not a view call"))),
        };
        Ok(DynSolValue::Tuple(vec![output]).abi_encode_params())
    }

    async fn send_transaction(&self, req: &TransactionRequest) -> Result<TxHash, ProviderError> {
        let mut state = self.state.borrow_mut();
        if state.reject_sends {
            return Err(ProviderError::from_code(4001, "User denied transaction signature."));
        }
        state.sent.push(req.clone());

        let (function, args) = self.decode(&req.to, &req.data)?;
        let success = !state.revert_sends && state.apply(&req.from, &function.name, args);

        let hash = format!("0x{:064x}", state.sent.len());
        state.receipts.insert(hash.clone(), success);
        Ok(TxHash(hash))
    }

    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<TxReceipt>, ProviderError> {
        let yield_first = self.state.borrow().yield_on_receipt;
        if yield_first {
            tokio::task::yield_now().await;
        }
        Ok(self.state.borrow().receipts.get(&hash.0).map(|success| TxReceipt {
            tx_hash: hash.clone(),
            success: *success,
            block_number: Some(1),
        }))
    }

    async fn wait_for_inclusion(&self, hash: &TxHash) -> Result<TxReceipt, ProviderError> {
        poll_receipt(self, hash, ReceiptPolicy::default(), |_| async {}).await
    }

    fn subscribe(&self, listener: Box<dyn Fn(ProviderEvent)>) -> Result<(), ProviderError> {
        *self.listener.borrow_mut() = Some(listener);
        Ok(())
    }
}

pub(crate) fn connected_nft(chain: &Rc<FakeChain>) -> NftContract<FakeChain> {
    let interface = ContractInterfaces::builtin().unwrap().nft.unwrap();
    NftContract::new(Address::parse(NFT_ADDRESS).unwrap(), interface, Rc::clone(chain)).unwrap()
}

/// Metadata documents keyed by URL. Unknown URLs answer 404. Every fetch
/// yields once so concurrent scans interleave.
#[derive(Default)]
pub(crate) struct FakeMetadata {
    documents: RefCell<BTreeMap<String, NftMetadata>>,
    requested: RefCell<Vec<String>>,
}

impl FakeMetadata {
    pub fn insert(&self, url: &str, metadata: NftMetadata) {
        self.documents.borrow_mut().insert(url.to_owned(), metadata);
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

#[async_trait(?Send)]
impl MetadataSource for FakeMetadata {
    async fn fetch_metadata(&self, url: &str) -> Result<NftMetadata, MetadataError> {
        self.requested.borrow_mut().push(url.to_owned());
        tokio::task::yield_now().await;
        self.documents
            .borrow()
            .get(url)
            .cloned()
            .ok_or(MetadataError::Status(404))
    }
}

#[derive(Default)]
pub(crate) struct RecordingUi {
    pub notifications: RefCell<Vec<Notification>>,
    pub connection: RefCell<Option<ConnectionView>>,
    pub balance: RefCell<Option<BalanceView>>,
    pub assets: RefCell<Vec<AssetListView>>,
    pub status: RefCell<Option<StatusView>>,
    pub prompt_answer: RefCell<Option<String>>,
    pub confirm_answer: Cell<bool>,
}

impl RecordingUi {
    pub fn last_notification(&self) -> Option<Notification> {
        self.notifications.borrow().last().cloned()
    }

    pub fn last_assets(&self) -> Option<AssetListView> {
        self.assets.borrow().last().cloned()
    }

    pub fn balance_text(&self) -> Option<String> {
        self.balance.borrow().as_ref().map(|b| b.text().to_owned())
    }

    /// Count label as it would read on screen: loading frames keep the previous one.
    pub fn count_label(&self) -> Option<String> {
        self.assets.borrow().iter().rev().find_map(AssetListView::count_label)
    }
}

impl DashboardUi for RecordingUi {
    fn notify(&self, notification: Notification) {
        self.notifications.borrow_mut().push(notification);
    }

    fn render_connection(&self, view: &ConnectionView) {
        *self.connection.borrow_mut() = Some(view.clone());
    }

    fn render_balance(&self, view: &BalanceView) {
        *self.balance.borrow_mut() = Some(view.clone());
    }

    fn render_assets(&self, view: &AssetListView) {
        self.assets.borrow_mut().push(view.clone());
    }

    fn render_status(&self, view: &StatusView) {
        *self.status.borrow_mut() = Some(view.clone());
    }

    fn prompt(&self, _message: &str) -> Option<String> {
        self.prompt_answer.borrow().clone()
    }

    fn confirm(&self, _message: &str) -> bool {
        self.confirm_answer.get()
    }
}

pub(crate) type TestDashboard = Dashboard<FakeChain, FakeMetadata, RecordingUi>;

pub(crate) fn dashboard(chain: &Rc<FakeChain>) -> TestDashboard {
    Dashboard::new(
        Some(Rc::clone(chain)),
        FakeMetadata::default(),
        RecordingUi::default(),
        ContractInterfaces::builtin().unwrap(),
        DashboardConfig::default(),
    )
}
