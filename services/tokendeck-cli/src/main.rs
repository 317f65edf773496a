use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::rc::Rc;
use td_abi::ContractInterface;
use td_api_types::TokenId;
use td_chain_rpc::{HttpMetadataSource, RpcProvider};
use td_dashboard::{ContractInterfaces, Dashboard, DashboardConfig, TokenProbe, discover};
use tracing::{error, info};

mod cli;
mod logging;
mod terminal;

use cli::{Cli, Commands};
use terminal::TerminalUi;

type CliDashboard = Dashboard<RpcProvider, HttpMetadataSource, TerminalUi>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        error!(error = %format!("{err:#}"), "command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let interfaces = load_interfaces(&cli)?;
    let config = dashboard_config(&cli);

    let mut provider = RpcProvider::new(cli.rpc_url.clone());
    if let Some(account) = &cli.account {
        provider = provider.with_account(account.to_string());
    }
    info!(endpoint = provider.endpoint(), "using JSON-RPC provider");

    let (prompt_answer, assume_yes) = match &cli.command {
        Commands::TransferNft { to, .. } => (Some(to.clone()), false),
        Commands::Burn { yes, .. } => (None, *yes),
        _ => (None, false),
    };
    let dashboard: CliDashboard = Dashboard::new(
        Some(Rc::new(provider)),
        HttpMetadataSource::default(),
        TerminalUi::new(prompt_answer, assume_yes),
        interfaces,
        config,
    );

    match cli.command {
        Commands::Status => dashboard.on_connect_clicked().await?,
        Commands::Scan => scan(&dashboard).await?,
        Commands::Transfer { to, amount } => {
            dashboard.on_connect_clicked().await?;
            dashboard.on_transfer_coin_clicked(&to, &amount).await?;
        }
        Commands::Mint { uri } => {
            dashboard.on_connect_clicked().await?;
            dashboard.on_mint_clicked(&uri).await?;
        }
        Commands::TransferNft { token_id, .. } => {
            dashboard.on_connect_clicked().await?;
            dashboard.on_transfer_nft_clicked(TokenId(token_id)).await?;
        }
        Commands::Burn { token_id, .. } => {
            dashboard.on_connect_clicked().await?;
            if dashboard.on_burn_nft_clicked(TokenId(token_id)).await?.is_none() {
                println!("Burn cancelled.");
            }
        }
    }
    Ok(())
}

/// Prints one line per probed token id, including the ones that were skipped.
async fn scan(dashboard: &CliDashboard) -> Result<()> {
    let connection = dashboard
        .connections()
        .connect()
        .await
        .context("connecting to wallet")?;

    let mut items = discover(
        connection.account.clone(),
        connection.nft.clone(),
        dashboard.metadata(),
        dashboard.config(),
    );
    while let Some(item) = items.next().await {
        match item.probe {
            TokenProbe::Owned(asset) => println!(
                "#{:<3} owned    {}",
                item.token_id.0,
                asset.metadata.name.as_deref().unwrap_or("(no name)")
            ),
            TokenProbe::NotOwned => println!("#{:<3} not owned", item.token_id.0),
            TokenProbe::Skipped(reason) => println!("#{:<3} skipped  {reason}", item.token_id.0),
        }
    }
    Ok(())
}

fn load_interfaces(cli: &Cli) -> Result<ContractInterfaces> {
    let mut interfaces = ContractInterfaces::builtin().context("built-in contract descriptors are invalid")?;
    if let Some(path) = &cli.coin_abi {
        interfaces.coin = Some(Rc::new(read_interface(path)?));
    }
    if let Some(path) = &cli.nft_abi {
        interfaces.nft = Some(Rc::new(read_interface(path)?));
    }
    Ok(interfaces)
}

fn read_interface(path: &Path) -> Result<ContractInterface> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    ContractInterface::from_json(&json).with_context(|| format!("parsing interface descriptor {}", path.display()))
}

fn dashboard_config(cli: &Cli) -> DashboardConfig {
    let mut config = DashboardConfig::default();
    if let Some(address) = &cli.coin_address {
        config.coin_address = address.clone();
    }
    if let Some(address) = &cli.nft_address {
        config.nft_address = address.clone();
    }
    if let Some(gateway) = &cli.gateway {
        config.gateway = gateway.clone();
    }
    for chain_id in &cli.allow_chains {
        if !config.supported_chains.contains(chain_id) {
            config.supported_chains.push(*chain_id);
        }
    }
    config
}
