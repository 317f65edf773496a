use clap::{Parser, Subcommand};
use std::path::PathBuf;
use td_api_types::Address;

#[derive(Parser, Debug)]
#[command(name = "tokendeck")]
#[command(about = "Token and NFT dashboard for a JSON-RPC node")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// JSON-RPC endpoint of the node holding the wallet accounts
    #[arg(long, global = true, env = "TOKENDECK_RPC_URL", value_name = "URL")]
    pub rpc_url: Option<String>,

    /// Account to act as instead of the node's first account
    #[arg(long, global = true, env = "TOKENDECK_ACCOUNT", value_name = "ADDRESS")]
    pub account: Option<Address>,

    /// Replacement interface descriptor (JSON ABI) for the coin contract
    #[arg(long, global = true, value_name = "FILE")]
    pub coin_abi: Option<PathBuf>,

    /// Replacement interface descriptor (JSON ABI) for the NFT contract
    #[arg(long, global = true, value_name = "FILE")]
    pub nft_abi: Option<PathBuf>,

    /// Coin contract address, for deployments other than the public one
    #[arg(long, global = true, value_name = "ADDRESS")]
    pub coin_address: Option<Address>,

    /// NFT contract address, for deployments other than the public one
    #[arg(long, global = true, value_name = "ADDRESS")]
    pub nft_address: Option<Address>,

    /// Additional chain id to accept, e.g. a local dev chain
    #[arg(long = "allow-chain", global = true, value_name = "CHAIN_ID")]
    pub allow_chains: Vec<u64>,

    /// HTTP gateway prefix used for ipfs:// URIs
    #[arg(long, global = true, value_name = "URL")]
    pub gateway: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect and show network, coin balance and owned NFTs
    Status,
    /// Probe every token id and report what was found for each
    Scan,
    /// Send coins
    Transfer {
        #[arg(long, value_name = "ADDRESS")]
        to: String,
        /// Decimal amount, e.g. 1.5
        #[arg(long)]
        amount: String,
    },
    /// Mint an NFT to the connected account
    Mint {
        /// Metadata URI, usually ipfs://...
        #[arg(long)]
        uri: String,
    },
    /// Send an owned NFT
    TransferNft {
        #[arg(long)]
        token_id: u64,
        #[arg(long, value_name = "ADDRESS")]
        to: String,
    },
    /// Burn an owned NFT
    Burn {
        #[arg(long)]
        token_id: u64,
        /// Skip the confirmation; required when stdin is not a terminal
        #[arg(long)]
        yes: bool,
    },
}
