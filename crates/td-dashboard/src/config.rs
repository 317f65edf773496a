//! Build-time configuration.
//!
//! Everything here is fixed when the crate is compiled. `DashboardConfig`
//! gathers the constants so callers can hand a modified copy to the dashboard
//! (tests, the CLI pointing at a local dev chain).

use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;
use td_abi::{AbiError, ContractInterface};
use td_api_types::{Address, ChainId, TxHash};

pub const COIN_ADDRESS: &str = "0xcdae97b0f871d36bf7487ff545c245a36f95290e";
pub const NFT_ADDRESS: &str = "0x61e90c3e820e1dded083ddaadfcf8a640c5449f0";
pub const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";
pub const IPFS_SCHEME: &str = "ipfs://";
pub const SEPOLIA: u64 = 11_155_111;
pub const SUPPORTED_CHAINS: &[u64] = &[SEPOLIA];

pub const NETWORK_NAMES: &[(u64, &str)] = &[
    (1, "Ethereum Mainnet"),
    (SEPOLIA, "Sepolia Testnet"),
    (137, "Polygon Mainnet"),
    (80_001, "Mumbai Testnet"),
];

pub const EXPLORERS: &[(u64, &str)] = &[
    (1, "https://etherscan.io"),
    (SEPOLIA, "https://sepolia.etherscan.io"),
    (137, "https://polygonscan.com"),
];

/// Highest token id probed by discovery. The contract has no enumeration
/// entry point, so ids `1..=SCAN_BOUND` are checked one by one.
pub const SCAN_BOUND: u64 = 20;
pub const SKELETON_CARDS: usize = 4;
pub const TOKEN_DECIMALS: u32 = 18;
pub const DISPLAY_PRECISION: u32 = 2;
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

pub const UNNAMED_TOKEN: &str = "Unnamed";
pub const NO_DESCRIPTION: &str = "No description provided.";
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400?text=No+Image";
pub const BROKEN_IMAGE: &str = "https://via.placeholder.com/400?text=Broken+Image";

const COIN_ABI: &str = include_str!("../abi/coin.json");
const NFT_ABI: &str = include_str!("../abi/nft.json");

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub coin_address: Address,
    pub nft_address: Address,
    pub gateway: String,
    pub supported_chains: Vec<u64>,
    pub network_names: BTreeMap<u64, String>,
    pub explorers: BTreeMap<u64, String>,
    pub scan_bound: u64,
    pub skeleton_cards: usize,
    pub token_decimals: u32,
    pub display_precision: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            coin_address: Address::parse(COIN_ADDRESS).expect("built-in coin address is valid"),
            nft_address: Address::parse(NFT_ADDRESS).expect("built-in NFT address is valid"),
            gateway: IPFS_GATEWAY.to_owned(),
            supported_chains: SUPPORTED_CHAINS.to_vec(),
            network_names: NETWORK_NAMES
                .iter()
                .map(|(id, name)| (*id, (*name).to_owned()))
                .collect(),
            explorers: EXPLORERS
                .iter()
                .map(|(id, url)| (*id, (*url).to_owned()))
                .collect(),
            scan_bound: SCAN_BOUND,
            skeleton_cards: SKELETON_CARDS,
            token_decimals: TOKEN_DECIMALS,
            display_precision: DISPLAY_PRECISION,
        }
    }
}

impl DashboardConfig {
    pub fn is_supported(&self, chain_id: u64) -> bool {
        self.supported_chains.contains(&chain_id)
    }

    /// Display name, falling back to `Chain <id>`.
    pub fn network_name(&self, chain_id: ChainId) -> String {
        self.network_names
            .get(&chain_id.0)
            .cloned()
            .unwrap_or_else(|| format!("Chain {chain_id}"))
    }

    /// Name of the first supported network, used to tell the user where to switch.
    pub fn expected_network(&self) -> String {
        self.supported_chains
            .first()
            .map(|id| self.network_name(ChainId(*id)))
            .unwrap_or_else(|| "a supported network".to_owned())
    }

    pub fn explorer_tx_url(&self, chain_id: ChainId, hash: &TxHash) -> Option<String> {
        self.explorers
            .get(&chain_id.0)
            .map(|base| format!("{}/tx/{hash}", base.trim_end_matches('/')))
    }
}

/// The two contract interface descriptors. Either may be absent, in which case
/// connecting fails before any handle is built.
#[derive(Debug, Clone, Default)]
pub struct ContractInterfaces {
    pub coin: Option<Rc<ContractInterface>>,
    pub nft: Option<Rc<ContractInterface>>,
}

impl ContractInterfaces {
    /// Descriptors shipped with the crate.
    pub fn builtin() -> Result<Self, AbiError> {
        Ok(Self {
            coin: Some(Rc::new(ContractInterface::from_json(COIN_ABI)?)),
            nft: Some(Rc::new(ContractInterface::from_json(NFT_ABI)?)),
        })
    }
}
