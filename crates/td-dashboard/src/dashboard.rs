use alloy_primitives::U256;
use std::cell::Cell;
use std::rc::Rc;
use td_api_types::{Notification, OwnedAsset, TokenId, TxHash};
use td_chain_client::{ContractError, MetadataSource, ProviderError, ProviderEvent, WalletProvider};
use tracing::{debug, info, warn};

use crate::config::{ContractInterfaces, DashboardConfig};
use crate::discovery::discover;
use crate::error::DashboardError;
use crate::format::{format_units, parse_destination, parse_units};
use crate::session::{Connection, ConnectionManager, ConnectionState};
use crate::ui::{AssetListView, BalanceView, ConnectionView, DashboardUi, StatusView, TxLink};

/// Command handlers for the dashboard.
///
/// Every handler reports its own failures through [`DashboardUi::notify`]; the
/// returned `Result` is for callers that want the outcome (the CLI, tests) and
/// can be dropped by event wiring.
pub struct Dashboard<P, M, U> {
    connections: ConnectionManager<P>,
    metadata: M,
    ui: U,
    config: Rc<DashboardConfig>,
    /// Advanced by every discovery pass and by disconnects; a pass that
    /// finishes under an older generation drops its results.
    scan_generation: Cell<u64>,
}

impl<P, M, U> Dashboard<P, M, U>
where
    P: WalletProvider,
    M: MetadataSource,
    U: DashboardUi,
{
    pub fn new(
        provider: Option<Rc<P>>,
        metadata: M,
        ui: U,
        interfaces: ContractInterfaces,
        config: DashboardConfig,
    ) -> Self {
        let config = Rc::new(config);
        Self {
            connections: ConnectionManager::new(provider, interfaces, Rc::clone(&config)),
            metadata,
            ui,
            config,
            scan_generation: Cell::new(0),
        }
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn connections(&self) -> &ConnectionManager<P> {
        &self.connections
    }

    pub fn state(&self) -> ConnectionState {
        self.connections.state()
    }

    /// Draws the disconnected defaults: no network, zero balance, no assets.
    pub fn show_disconnected(&self) {
        self.ui.render_connection(&ConnectionView::Disconnected);
        self.ui.render_balance(&BalanceView::zero());
        self.ui.render_assets(&AssetListView::NotConnected);
    }

    /// The single wallet button connects or disconnects depending on state.
    pub async fn on_wallet_button_clicked(&self) {
        if self.state() == ConnectionState::Connected {
            self.on_disconnect_clicked();
        } else {
            let _ = self.on_connect_clicked().await;
        }
    }

    pub async fn on_connect_clicked(&self) -> Result<(), DashboardError> {
        let connection = match self.connections.connect().await {
            Ok(connection) => connection,
            Err(err) => {
                self.ui.notify(Notification::error(self.connect_failure_message(&err)));
                return Err(err);
            }
        };

        self.render_connected(&connection);
        self.refresh_dashboard().await;
        if self.connections.is_current(&connection) {
            self.ui.notify(Notification::success("Wallet connected!"));
        }
        Ok(())
    }

    pub fn on_disconnect_clicked(&self) {
        self.connections.disconnect();
        self.bump_generation();
        self.show_disconnected();
        self.ui.render_status(&StatusView::message("Wallet disconnected."));
        self.ui.notify(Notification::info("Wallet disconnected."));
    }

    /// Account or network switched in the wallet. The session is dropped and
    /// the user reconnects explicitly; events naming the current account or
    /// chain are ignored.
    pub fn on_provider_event(&self, event: ProviderEvent) {
        if self.connections.is_unchanged_by(&event) {
            debug!(?event, "wallet event matches the session");
            return;
        }
        let was_connected = self.connections.invalidate(&event);
        self.bump_generation();
        self.show_disconnected();
        if was_connected {
            self.ui.render_status(&StatusView::message("Wallet changed. Please reconnect."));
            self.ui.notify(Notification::info("Wallet account or network changed. Please reconnect."));
        }
    }

    /// Coin balance, then asset discovery. A no-op while disconnected.
    pub async fn refresh_dashboard(&self) {
        let Some(connection) = self.connections.connection() else {
            return;
        };
        self.update_coin_balance(&connection).await;
        self.load_assets(&connection).await;
    }

    pub async fn update_coin_balance(&self, connection: &Rc<Connection<P>>) {
        let view = match connection.coin.balance_of(&connection.account).await {
            Ok(balance) => BalanceView::Amount(self.format_balance(balance)),
            Err(err) => {
                warn!(error = %err, "balance query failed");
                BalanceView::Error
            }
        };
        if self.connections.is_current(connection) {
            self.ui.render_balance(&view);
        }
    }

    /// One discovery pass. Skeletons go up first; the final list replaces them
    /// only if no newer pass or disconnect happened meanwhile. Returns the owned
    /// assets when the pass was rendered.
    pub async fn load_assets(&self, connection: &Rc<Connection<P>>) -> Option<Vec<OwnedAsset>> {
        if !self.connections.is_current(connection) {
            debug!("session ended, skipping discovery");
            return None;
        }
        let generation = self.bump_generation();
        self.ui.render_assets(&AssetListView::Loading {
            skeletons: self.config.skeleton_cards,
        });

        let owned = discover(
            connection.account.clone(),
            connection.nft.clone(),
            &self.metadata,
            &self.config,
        )
        .collect_owned()
        .await;

        if self.scan_generation.get() != generation || !self.connections.is_current(connection) {
            debug!(generation, "discarding stale discovery results");
            return None;
        }
        info!(count = owned.len(), "discovery pass complete");
        self.ui.render_assets(&AssetListView::from_assets(&owned, &self.config));
        Some(owned)
    }

    pub async fn on_transfer_coin_clicked(&self, to: &str, amount: &str) -> Result<TxHash, DashboardError> {
        let connection = self.require_connection("Connect your wallet first!")?;
        let to = self.validate(parse_destination(to), "Invalid address!")?;
        let amount = self.validate(parse_units(amount, self.config.token_decimals), "Amount must be greater than 0!")?;

        self.ui.render_status(&StatusView::message("Waiting for confirmation..."));
        let result = connection.coin.transfer(&connection.account, &to, amount).await;
        let hash = self.settle(&connection, result, "Transfer successful!", "Transfer failed.")?;
        if !self.connections.is_current(&connection) {
            return Ok(hash);
        }

        self.update_coin_balance(&connection).await;
        self.ui.notify(Notification::success("Transfer complete!"));
        Ok(hash)
    }

    pub async fn on_mint_clicked(&self, uri: &str) -> Result<TxHash, DashboardError> {
        let connection = self.require_connection("Connect your wallet first!")?;
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(self.fail(DashboardError::InvalidTokenUri, "Enter a metadata URI!"));
        }

        self.ui.render_status(&StatusView::message("Minting NFT..."));
        let result = connection
            .nft
            .mint_nft(&connection.account, &connection.account, uri)
            .await;
        let hash = self.settle(&connection, result, "Mint successful!", "Minting failed.")?;
        if !self.connections.is_current(&connection) {
            return Ok(hash);
        }

        self.load_assets(&connection).await;
        self.ui.notify(Notification::success("NFT minted!"));
        Ok(hash)
    }

    pub async fn on_transfer_nft_clicked(&self, token_id: TokenId) -> Result<TxHash, DashboardError> {
        let connection = self.require_connection("Wallet not connected!")?;
        let input = self
            .ui
            .prompt("Enter the destination Ethereum address:")
            .unwrap_or_default();
        let to = self.validate(parse_destination(&input), "Invalid address!")?;

        self.ui.render_status(&StatusView::message(format!("Sending NFT #{token_id}...")));
        let result = connection
            .nft
            .safe_transfer_from(&connection.account, &to, token_id)
            .await;
        let hash = self.settle(&connection, result, "NFT sent!", "Failed to send NFT.")?;
        if !self.connections.is_current(&connection) {
            return Ok(hash);
        }

        self.ui.notify(Notification::success(format!("NFT #{token_id} sent to {}", to.short())));
        self.load_assets(&connection).await;
        Ok(hash)
    }

    /// Burning needs an explicit confirmation. Declining returns `Ok(None)`
    /// without touching anything.
    pub async fn on_burn_nft_clicked(&self, token_id: TokenId) -> Result<Option<TxHash>, DashboardError> {
        let connection = self.require_connection("Wallet not connected!")?;
        let question = format!("Permanently burn NFT #{token_id}? This cannot be undone!");
        if !self.ui.confirm(&question) {
            return Ok(None);
        }

        self.ui.render_status(&StatusView::message("Burning NFT..."));
        let result = connection.nft.burn(&connection.account, token_id).await;
        let hash = self.settle(
            &connection,
            result,
            "NFT burned!",
            "Failed to burn NFT. Make sure you own it.",
        )?;
        if !self.connections.is_current(&connection) {
            return Ok(Some(hash));
        }

        self.ui.notify(Notification::success(format!("NFT #{token_id} burned permanently.")));
        self.load_assets(&connection).await;
        Ok(Some(hash))
    }

    fn render_connected(&self, connection: &Connection<P>) {
        self.ui.render_connection(&ConnectionView::Connected {
            network: self.config.network_name(connection.chain_id),
            account: connection.account.clone(),
            coin_address: connection.coin.address().clone(),
            nft_address: connection.nft.address().clone(),
        });
        self.ui.render_status(&StatusView::message("Wallet connected."));
    }

    fn format_balance(&self, balance: U256) -> String {
        format_units(balance, self.config.token_decimals, self.config.display_precision)
    }

    fn bump_generation(&self) -> u64 {
        let next = self.scan_generation.get() + 1;
        self.scan_generation.set(next);
        next
    }

    fn require_connection(&self, message: &str) -> Result<Rc<Connection<P>>, DashboardError> {
        self.connections
            .connection()
            .ok_or_else(|| self.fail(DashboardError::NotConnected, message))
    }

    fn validate<T>(&self, result: Result<T, DashboardError>, message: &str) -> Result<T, DashboardError> {
        result.map_err(|err| self.fail(err, message))
    }

    fn fail(&self, err: DashboardError, message: &str) -> DashboardError {
        warn!(error = %err, "{message}");
        self.ui.notify(Notification::error(message));
        err
    }

    /// Turns a submission outcome into a status line with an explorer link, or
    /// a failure notification.
    fn settle(
        &self,
        connection: &Connection<P>,
        result: Result<td_chain_client::TxReceipt, ContractError>,
        success: &str,
        failure: &str,
    ) -> Result<TxHash, DashboardError> {
        match result {
            Ok(receipt) => {
                let hash = receipt.tx_hash;
                info!(tx_hash = %hash, block = ?receipt.block_number, "{success}");
                self.ui.render_status(&StatusView {
                    message: success.to_owned(),
                    tx: Some(TxLink {
                        url: self.config.explorer_tx_url(connection.chain_id, &hash),
                        hash: hash.clone(),
                    }),
                });
                Ok(hash)
            }
            Err(err) => {
                let err = DashboardError::from_submission(err);
                let message = match &err {
                    DashboardError::TransactionRejected(_) => "Transaction rejected in wallet.",
                    _ => failure,
                };
                self.ui.render_status(&StatusView::message(message));
                Err(self.fail(err, message))
            }
        }
    }

    fn connect_failure_message(&self, err: &DashboardError) -> String {
        match err {
            DashboardError::NoProvider => "No wallet found. Please install MetaMask!".to_owned(),
            DashboardError::UnsupportedChain(_) => {
                format!("Please switch to {}!", self.config.expected_network())
            }
            DashboardError::ContractInterfaceMissing(_) => "Contract ABI not found!".to_owned(),
            DashboardError::ConnectInProgress => "A connection request is already pending.".to_owned(),
            DashboardError::SessionInvalidated => "Wallet changed while connecting. Please try again.".to_owned(),
            DashboardError::Provider(ProviderError::Rejected(_)) => "Connection request rejected in wallet.".to_owned(),
            _ => "Failed to connect wallet.".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SEPOLIA;
    use crate::test_support::{FakeChain, OTHER, STARTING_BALANCE, USER, dashboard};
    use td_api_types::{NftMetadata, Severity};

    const RECIPIENT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    fn publish(d: &crate::test_support::TestDashboard, url: &str, name: &str) {
        d.metadata().insert(
            url,
            NftMetadata {
                name: Some(name.to_owned()),
                ..NftMetadata::default()
            },
        );
    }

    fn card_ids(view: &AssetListView) -> Vec<u64> {
        match view {
            AssetListView::Cards(cards) => cards.iter().map(|c| c.token_id.0).collect(),
            _ => Vec::new(),
        }
    }

    #[tokio::test]
    async fn connect_renders_header_balance_and_assets() {
        let chain = FakeChain::sepolia();
        chain.mint(USER, "ipfs://abc123/meta.json");
        chain.mint(OTHER, "ipfs://abc123/other.json");
        let d = dashboard(&chain);
        publish(&d, "https://ipfs.io/ipfs/abc123/meta.json", "Genesis");

        d.on_connect_clicked().await.unwrap();

        let ui = d.ui();
        match ui.connection.borrow().clone().unwrap() {
            ConnectionView::Connected { network, account, .. } => {
                assert_eq!(network, "Sepolia Testnet");
                assert_eq!(account.to_string(), USER);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ui.balance_text().as_deref(), Some("1.23"));

        let frames = ui.assets.borrow().clone();
        assert_eq!(frames[0], AssetListView::Loading { skeletons: 4 });
        match frames.last().unwrap() {
            AssetListView::Cards(cards) => {
                assert_eq!(cards.len(), 1);
                assert_eq!(cards[0].title, "#1 Genesis");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ui.count_label().as_deref(), Some("1 Asset"));
        assert_eq!(ui.last_notification(), Some(Notification::success("Wallet connected!")));
    }

    #[tokio::test]
    async fn unsupported_chain_notifies_and_stays_disconnected() {
        for chain_id in [1_u64, 137, 31_337] {
            let chain = FakeChain::sepolia();
            chain.state.borrow_mut().chain_id = chain_id;
            let d = dashboard(&chain);

            let err = d.on_connect_clicked().await.unwrap_err();
            assert_eq!(err, DashboardError::UnsupportedChain(chain_id));
            assert_eq!(d.state(), ConnectionState::Disconnected);
            assert_eq!(
                d.ui().last_notification(),
                Some(Notification::error("Please switch to Sepolia Testnet!"))
            );
            assert!(d.ui().assets.borrow().is_empty());
        }
    }

    #[tokio::test]
    async fn missing_provider_is_reported() {
        let d: crate::test_support::TestDashboard = Dashboard::new(
            None,
            Default::default(),
            Default::default(),
            ContractInterfaces::builtin().unwrap(),
            DashboardConfig::default(),
        );
        assert_eq!(d.on_connect_clicked().await, Err(DashboardError::NoProvider));
        assert_eq!(d.ui().last_notification().unwrap().severity, Severity::Error);
    }

    #[tokio::test]
    async fn disconnect_resets_every_view() {
        let chain = FakeChain::sepolia();
        chain.mint(USER, "ipfs://abc123/meta.json");
        let d = dashboard(&chain);
        publish(&d, "https://ipfs.io/ipfs/abc123/meta.json", "Genesis");
        d.on_connect_clicked().await.unwrap();

        d.on_wallet_button_clicked().await;
        assert_eq!(d.state(), ConnectionState::Disconnected);

        for _ in 0..2 {
            let ui = d.ui();
            assert_eq!(ui.balance_text().as_deref(), Some("0.00"));
            assert_eq!(ui.count_label().as_deref(), Some("0 Assets"));
            assert_eq!(ui.last_assets(), Some(AssetListView::NotConnected));
            assert_eq!(*ui.connection.borrow(), Some(ConnectionView::Disconnected));
            d.on_disconnect_clicked();
        }

        d.refresh_dashboard().await;
        assert_eq!(d.ui().last_assets(), Some(AssetListView::NotConnected));
    }

    #[tokio::test]
    async fn repeated_scans_are_stable() {
        let chain = FakeChain::sepolia();
        chain.mint(USER, "ipfs://a/1.json");
        chain.mint(OTHER, "ipfs://a/2.json");
        chain.mint(USER, "ipfs://a/3.json");
        let d = dashboard(&chain);
        publish(&d, "https://ipfs.io/ipfs/a/1.json", "One");
        publish(&d, "https://ipfs.io/ipfs/a/2.json", "Two");
        publish(&d, "https://ipfs.io/ipfs/a/3.json", "Three");
        d.on_connect_clicked().await.unwrap();

        let first = card_ids(&d.ui().last_assets().unwrap());
        d.refresh_dashboard().await;
        let second = card_ids(&d.ui().last_assets().unwrap());
        assert_eq!(first, vec![1, 3]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn transfer_nft_removes_it_from_the_next_pass() {
        let chain = FakeChain::sepolia();
        chain.mint(USER, "ipfs://a/1.json");
        chain.mint(USER, "ipfs://a/2.json");
        let d = dashboard(&chain);
        publish(&d, "https://ipfs.io/ipfs/a/1.json", "One");
        publish(&d, "https://ipfs.io/ipfs/a/2.json", "Two");
        d.on_connect_clicked().await.unwrap();

        *d.ui().prompt_answer.borrow_mut() = Some(RECIPIENT.to_owned());
        let hash = d.on_transfer_nft_clicked(TokenId(1)).await.unwrap();

        assert_eq!(chain.owner(1).unwrap().to_checksum(), RECIPIENT);
        assert_eq!(card_ids(&d.ui().last_assets().unwrap()), vec![2]);
        let status = d.ui().status.borrow().clone().unwrap();
        assert_eq!(status.message, "NFT sent!");
        assert_eq!(
            status.tx,
            Some(TxLink {
                url: Some(format!("https://sepolia.etherscan.io/tx/{hash}")),
                hash,
            })
        );
        assert!(
            d.ui()
                .notifications
                .borrow()
                .contains(&Notification::success("NFT #1 sent to 0x5aAe..."))
        );
    }

    #[tokio::test]
    async fn transfer_nft_rejects_bad_destinations() {
        let chain = FakeChain::sepolia();
        chain.mint(USER, "ipfs://a/1.json");
        let d = dashboard(&chain);
        d.on_connect_clicked().await.unwrap();

        for answer in [Some("0x0"), Some(""), None] {
            *d.ui().prompt_answer.borrow_mut() = answer.map(str::to_owned);
            let err = d.on_transfer_nft_clicked(TokenId(1)).await.unwrap_err();
            assert!(matches!(err, DashboardError::InvalidAddress { .. }));
            assert_eq!(d.ui().last_notification(), Some(Notification::error("Invalid address!")));
        }
        assert!(chain.state.borrow().sent.is_empty());
    }

    #[tokio::test]
    async fn mint_adds_exactly_one_asset() {
        let chain = FakeChain::sepolia();
        chain.mint(USER, "ipfs://a/1.json");
        let d = dashboard(&chain);
        publish(&d, "https://ipfs.io/ipfs/a/1.json", "One");
        publish(&d, "https://ipfs.io/ipfs/a/new.json", "New");
        d.on_connect_clicked().await.unwrap();
        assert_eq!(d.ui().count_label().as_deref(), Some("1 Asset"));

        d.on_mint_clicked("  ipfs://a/new.json ").await.unwrap();
        assert_eq!(d.ui().count_label().as_deref(), Some("2 Assets"));
        assert_eq!(card_ids(&d.ui().last_assets().unwrap()), vec![1, 2]);
        assert_eq!(chain.state.borrow().uris.get(&2).map(String::as_str), Some("ipfs://a/new.json"));

        assert_eq!(d.on_mint_clicked("   ").await, Err(DashboardError::InvalidTokenUri));
    }

    #[tokio::test]
    async fn burn_requires_confirmation() {
        let chain = FakeChain::sepolia();
        chain.mint(USER, "ipfs://a/1.json");
        let d = dashboard(&chain);
        publish(&d, "https://ipfs.io/ipfs/a/1.json", "One");
        d.on_connect_clicked().await.unwrap();

        d.ui().confirm_answer.set(false);
        assert_eq!(d.on_burn_nft_clicked(TokenId(1)).await, Ok(None));
        assert!(chain.owner(1).is_some());
        assert!(chain.state.borrow().sent.is_empty());

        d.ui().confirm_answer.set(true);
        assert!(d.on_burn_nft_clicked(TokenId(1)).await.unwrap().is_some());
        assert!(chain.owner(1).is_none());
        assert_eq!(d.ui().last_assets(), Some(AssetListView::Empty));
        assert_eq!(d.ui().count_label().as_deref(), Some("0 Assets"));
    }

    #[tokio::test]
    async fn failed_burn_leaves_views_alone() {
        let chain = FakeChain::sepolia();
        chain.mint(OTHER, "ipfs://a/1.json");
        let d = dashboard(&chain);
        d.on_connect_clicked().await.unwrap();
        let frames_before = d.ui().assets.borrow().len();

        d.ui().confirm_answer.set(true);
        let err = d.on_burn_nft_clicked(TokenId(1)).await.unwrap_err();
        assert!(matches!(err, DashboardError::TransactionFailed(_)));
        assert_eq!(
            d.ui().last_notification(),
            Some(Notification::error("Failed to burn NFT. Make sure you own it."))
        );
        assert_eq!(d.ui().assets.borrow().len(), frames_before);
        assert_eq!(chain.owner(1).unwrap().to_string(), OTHER);
    }

    #[tokio::test]
    async fn transfer_coin_moves_balance_and_refreshes() {
        let chain = FakeChain::sepolia();
        let d = dashboard(&chain);
        d.on_connect_clicked().await.unwrap();

        d.on_transfer_coin_clicked(OTHER, "1.2").await.unwrap();
        assert_eq!(chain.balance(OTHER), "1200000000000000000".parse::<U256>().unwrap());
        assert_eq!(d.ui().balance_text().as_deref(), Some("0.03"));
        assert_eq!(d.ui().last_notification(), Some(Notification::success("Transfer complete!")));

        let sent = chain.state.borrow().sent.clone();
        assert_eq!(sent[0].from.to_string(), USER);
    }

    #[tokio::test]
    async fn transfer_coin_validates_input() {
        let chain = FakeChain::sepolia();
        let d = dashboard(&chain);
        assert_eq!(
            d.on_transfer_coin_clicked(OTHER, "1").await,
            Err(DashboardError::NotConnected)
        );

        d.on_connect_clicked().await.unwrap();
        assert!(matches!(
            d.on_transfer_coin_clicked("", "1").await,
            Err(DashboardError::InvalidAddress { .. })
        ));
        assert!(matches!(
            d.on_transfer_coin_clicked("0x0", "1").await,
            Err(DashboardError::InvalidAddress { .. })
        ));
        for amount in ["0", "-3", "abc", ""] {
            assert!(matches!(
                d.on_transfer_coin_clicked(OTHER, amount).await,
                Err(DashboardError::InvalidAmount(_))
            ));
        }
        assert!(chain.state.borrow().sent.is_empty());
        assert_eq!(chain.balance(USER), STARTING_BALANCE.parse::<U256>().unwrap());
    }

    #[tokio::test]
    async fn rejected_transaction_is_distinct_and_harmless() {
        let chain = FakeChain::sepolia();
        let d = dashboard(&chain);
        d.on_connect_clicked().await.unwrap();
        chain.state.borrow_mut().reject_sends = true;

        let err = d.on_transfer_coin_clicked(OTHER, "1").await.unwrap_err();
        assert!(matches!(err, DashboardError::TransactionRejected(_)));
        assert_eq!(
            d.ui().last_notification(),
            Some(Notification::error("Transaction rejected in wallet."))
        );
        assert_eq!(d.ui().balance_text().as_deref(), Some("1.23"));
    }

    #[tokio::test]
    async fn balance_failure_shows_error_marker() {
        let chain = FakeChain::sepolia();
        chain.state.borrow_mut().fail_balance = true;
        let d = dashboard(&chain);
        d.on_connect_clicked().await.unwrap();
        assert_eq!(d.ui().balance_text().as_deref(), Some("Error"));
    }

    #[tokio::test]
    async fn provider_event_invalidates_session() {
        let chain = FakeChain::sepolia();
        let d = dashboard(&chain);
        d.on_connect_clicked().await.unwrap();

        d.on_provider_event(ProviderEvent::AccountsChanged(vec![OTHER.to_owned()]));
        assert_eq!(d.state(), ConnectionState::Disconnected);
        assert_eq!(d.ui().last_assets(), Some(AssetListView::NotConnected));
        assert_eq!(d.ui().last_notification().unwrap().severity, Severity::Info);
    }

    #[tokio::test]
    async fn stale_scan_does_not_overwrite_newer_results() {
        let chain = FakeChain::sepolia();
        chain.mint(USER, "ipfs://a/1.json");
        let d = dashboard(&chain);
        publish(&d, "https://ipfs.io/ipfs/a/1.json", "One");
        publish(&d, "https://ipfs.io/ipfs/a/2.json", "Two");
        let connection = d.connections().connect().await.unwrap();

        // The first pass is parked on metadata when a token is minted and a
        // second pass starts.
        let (stale, fresh) = tokio::join!(d.load_assets(&connection), async {
            chain.mint(USER, "ipfs://a/2.json");
            d.load_assets(&connection).await
        });

        assert_eq!(stale, None);
        assert_eq!(fresh.map(|assets| assets.len()), Some(2));
        assert_eq!(card_ids(&d.ui().last_assets().unwrap()), vec![1, 2]);
    }

    #[tokio::test]
    async fn disconnect_during_scan_discards_results() {
        let chain = FakeChain::sepolia();
        chain.mint(USER, "ipfs://a/1.json");
        let d = dashboard(&chain);
        publish(&d, "https://ipfs.io/ipfs/a/1.json", "One");
        let connection = d.connections().connect().await.unwrap();

        let (result, ()) = tokio::join!(d.load_assets(&connection), async {
            d.on_disconnect_clicked();
        });

        assert_eq!(result, None);
        assert_eq!(d.ui().last_assets(), Some(AssetListView::NotConnected));
    }

    #[tokio::test]
    async fn transaction_settling_after_disconnect_leaves_empty_state() {
        let chain = FakeChain::sepolia();
        chain.mint(USER, "ipfs://a/1.json");
        let d = dashboard(&chain);
        publish(&d, "https://ipfs.io/ipfs/a/1.json", "One");
        d.on_connect_clicked().await.unwrap();
        chain.state.borrow_mut().yield_on_receipt = true;
        d.ui().confirm_answer.set(true);

        let (burned, ()) = tokio::join!(d.on_burn_nft_clicked(TokenId(1)), async {
            d.on_disconnect_clicked();
        });

        assert!(burned.unwrap().is_some());
        assert_eq!(d.state(), ConnectionState::Disconnected);
        assert_eq!(d.ui().last_assets(), Some(AssetListView::NotConnected));
        assert_eq!(d.ui().last_notification(), Some(Notification::info("Wallet disconnected.")));
    }

    #[tokio::test]
    async fn transaction_from_old_session_does_not_stall_the_new_one() {
        let chain = FakeChain::sepolia();
        chain.mint(USER, "ipfs://a/1.json");
        let d = dashboard(&chain);
        publish(&d, "https://ipfs.io/ipfs/a/1.json", "One");
        publish(&d, "https://ipfs.io/ipfs/a/2.json", "Two");
        d.on_connect_clicked().await.unwrap();
        chain.state.borrow_mut().yield_on_receipt = true;

        let (minted, ()) = tokio::join!(d.on_mint_clicked("ipfs://a/2.json"), async {
            d.on_disconnect_clicked();
            d.on_connect_clicked().await.unwrap();
        });

        assert!(minted.is_ok());
        assert_eq!(d.state(), ConnectionState::Connected);
        assert_eq!(card_ids(&d.ui().last_assets().unwrap()), vec![1, 2]);
        assert!(
            !d.ui()
                .notifications
                .borrow()
                .contains(&Notification::success("NFT minted!"))
        );
    }

    #[tokio::test]
    async fn approval_event_for_the_granted_account_keeps_the_session() {
        let chain = FakeChain::sepolia();
        chain.state.borrow_mut().announce_accounts = true;
        let d = Rc::new(dashboard(&chain));
        let weak = Rc::downgrade(&d);
        chain
            .subscribe(Box::new(move |event| {
                if let Some(d) = weak.upgrade() {
                    d.on_provider_event(event);
                }
            }))
            .unwrap();

        d.on_connect_clicked().await.unwrap();
        assert_eq!(d.state(), ConnectionState::Connected);
        assert_eq!(d.ui().last_notification(), Some(Notification::success("Wallet connected!")));

        chain.emit(ProviderEvent::AccountsChanged(vec![USER.to_ascii_uppercase().replacen("0X", "0x", 1)]));
        chain.emit(ProviderEvent::ChainChanged(SEPOLIA));
        assert_eq!(d.state(), ConnectionState::Connected);

        chain.emit(ProviderEvent::ChainChanged(1));
        assert_eq!(d.state(), ConnectionState::Disconnected);
        assert_eq!(d.ui().last_assets(), Some(AssetListView::NotConnected));
    }
}
