//! The rendering surface the dashboard drives, and the view models it hands
//! over. Views are plain data; a surface only has to draw them.

use td_api_types::{Address, Notification, OwnedAsset, TokenId, TxHash};

use crate::config::{BROKEN_IMAGE, DashboardConfig, NO_DESCRIPTION, UNNAMED_TOKEN};
use crate::format::{asset_count_label, resolve_content_uri};

pub const NOT_CONNECTED: &str = "Not Connected";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionView {
    Disconnected,
    Connected {
        network: String,
        account: Address,
        coin_address: Address,
        nft_address: Address,
    },
}

impl ConnectionView {
    pub fn wallet_button_label(&self) -> &'static str {
        match self {
            ConnectionView::Disconnected => "Connect Wallet",
            ConnectionView::Connected { .. } => "Disconnect",
        }
    }

    pub fn network_label(&self) -> &str {
        match self {
            ConnectionView::Disconnected => NOT_CONNECTED,
            ConnectionView::Connected { network, .. } => network,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceView {
    Amount(String),
    /// The balance query failed. Shown instead of a stale or zero value.
    Error,
}

impl BalanceView {
    pub fn zero() -> Self {
        BalanceView::Amount("0.00".to_owned())
    }

    pub fn text(&self) -> &str {
        match self {
            BalanceView::Amount(amount) => amount,
            BalanceView::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCard {
    pub token_id: TokenId,
    /// `#<id> <name>`.
    pub title: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub fallback_image_url: String,
    /// Raw token URI, or `—` when the contract returned an empty one.
    pub token_uri_display: String,
    pub token_uri_link: String,
}

impl AssetCard {
    pub fn from_asset(asset: &OwnedAsset, gateway: &str) -> Self {
        let name = non_blank(asset.metadata.name.as_deref()).unwrap_or(UNNAMED_TOKEN).to_owned();
        let description = non_blank(asset.metadata.description.as_deref())
            .unwrap_or(NO_DESCRIPTION)
            .to_owned();
        let token_uri_display = match asset.token_uri.trim() {
            "" => "—".to_owned(),
            _ => asset.token_uri.clone(),
        };

        Self {
            token_id: asset.token_id,
            title: format!("#{} {name}", asset.token_id),
            name,
            description,
            image_url: asset.resolved_image_url.clone(),
            fallback_image_url: BROKEN_IMAGE.to_owned(),
            token_uri_display,
            token_uri_link: resolve_content_uri(&asset.token_uri, gateway),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetListView {
    NotConnected,
    Loading { skeletons: usize },
    Empty,
    Cards(Vec<AssetCard>),
}

impl AssetListView {
    pub fn from_assets(assets: &[OwnedAsset], config: &DashboardConfig) -> Self {
        if assets.is_empty() {
            return AssetListView::Empty;
        }
        AssetListView::Cards(
            assets
                .iter()
                .map(|asset| AssetCard::from_asset(asset, &config.gateway))
                .collect(),
        )
    }

    /// `None` while loading; the previous count stays on screen.
    pub fn count_label(&self) -> Option<String> {
        match self {
            AssetListView::NotConnected | AssetListView::Empty => Some(asset_count_label(0)),
            AssetListView::Loading { .. } => None,
            AssetListView::Cards(cards) => Some(asset_count_label(cards.len())),
        }
    }

    pub fn placeholder_text(&self) -> Option<&'static str> {
        match self {
            AssetListView::NotConnected => Some("Wallet not connected."),
            AssetListView::Empty => Some("No NFTs found."),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxLink {
    pub hash: TxHash,
    /// Block explorer page, when the chain has a known explorer.
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub message: String,
    pub tx: Option<TxLink>,
}

impl StatusView {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tx: None,
        }
    }
}

/// A rendering surface. Calls arrive in the order the dashboard wants things
/// drawn; implementations use interior mutability as needed.
pub trait DashboardUi {
    fn notify(&self, notification: Notification);
    fn render_connection(&self, view: &ConnectionView);
    fn render_balance(&self, view: &BalanceView);
    fn render_assets(&self, view: &AssetListView);
    fn render_status(&self, view: &StatusView);
    /// Asks for free text. `None` when the user cancels.
    fn prompt(&self, message: &str) -> Option<String>;
    fn confirm(&self, message: &str) -> bool;
}
