//! Owned-NFT discovery.
//!
//! The NFT contract has no enumeration entry point, so ownership is found by
//! probing ids `1..=scan_bound` one after another. Every probe yields an item;
//! a token that cannot be read is reported as skipped and the scan carries on.

use td_api_types::{Address, OwnedAsset, TokenId};
use td_chain_client::{MetadataSource, NftContract, WalletProvider};
use tracing::debug;

use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::format::{resolve_content_uri, resolve_image_url};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenProbe {
    Owned(OwnedAsset),
    NotOwned,
    /// Owner or metadata lookup failed. Never fatal to the scan.
    Skipped(DashboardError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanItem {
    pub token_id: TokenId,
    pub probe: TokenProbe,
}

/// Lazy, restartable scan over the bounded id space.
pub struct AssetScan<'a, P, M> {
    account: Address,
    nft: NftContract<P>,
    metadata: &'a M,
    gateway: String,
    bound: u64,
    next_id: u64,
}

pub fn discover<'a, P, M>(
    account: Address,
    nft: NftContract<P>,
    metadata: &'a M,
    config: &DashboardConfig,
) -> AssetScan<'a, P, M> {
    AssetScan {
        account,
        nft,
        metadata,
        gateway: config.gateway.clone(),
        bound: config.scan_bound,
        next_id: 1,
    }
}

impl<P, M> AssetScan<'_, P, M>
where
    P: WalletProvider,
    M: MetadataSource,
{
    /// Probes the next id, or returns `None` once the bound is passed.
    pub async fn next(&mut self) -> Option<ScanItem> {
        if self.next_id > self.bound {
            return None;
        }
        let token_id = TokenId(self.next_id);
        self.next_id += 1;

        let probe = match self.probe(token_id).await {
            Ok(Some(asset)) => TokenProbe::Owned(asset),
            Ok(None) => TokenProbe::NotOwned,
            Err(err) => {
                debug!(%token_id, error = %err, "skipping token");
                TokenProbe::Skipped(err)
            }
        };
        Some(ScanItem { token_id, probe })
    }

    pub fn restart(&mut self) {
        self.next_id = 1;
    }

    /// Runs the remaining scan and keeps the owned assets, ascending by id.
    pub async fn collect_owned(&mut self) -> Vec<OwnedAsset> {
        let mut owned = Vec::new();
        while let Some(item) = self.next().await {
            if let TokenProbe::Owned(asset) = item.probe {
                owned.push(asset);
            }
        }
        owned
    }

    async fn probe(&self, token_id: TokenId) -> Result<Option<OwnedAsset>, DashboardError> {
        let owner = self
            .nft
            .owner_of(token_id)
            .await
            .map_err(|err| DashboardError::OwnerQueryFailed {
                token_id,
                reason: err.to_string(),
            })?;
        if owner != self.account {
            return Ok(None);
        }

        let metadata_failed = |reason: String| DashboardError::MetadataFetchFailed { token_id, reason };
        let token_uri = self
            .nft
            .token_uri(token_id)
            .await
            .map_err(|err| metadata_failed(format!("tokenURI: {err}")))?;
        let url = resolve_content_uri(&token_uri, &self.gateway);
        let metadata = self
            .metadata
            .fetch_metadata(&url)
            .await
            .map_err(|err| metadata_failed(err.to_string()))?;

        let resolved_image_url = resolve_image_url(&metadata, &self.gateway);
        Ok(Some(OwnedAsset {
            token_id,
            token_uri,
            metadata,
            resolved_image_url,
        }))
    }
}
