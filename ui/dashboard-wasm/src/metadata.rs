//! Metadata documents fetched with the browser's `fetch`.

use async_trait::async_trait;
use gloo_net::http::Request;
use td_api_types::NftMetadata;
use td_chain_client::{MetadataError, MetadataSource};

#[derive(Debug, Default, Clone, Copy)]
pub struct FetchMetadataSource;

#[async_trait(?Send)]
impl MetadataSource for FetchMetadataSource {
    async fn fetch_metadata(&self, url: &str) -> Result<NftMetadata, MetadataError> {
        let response = Request::get(url)
            .send()
            .await
            .map_err(|err| MetadataError::Transport(err.to_string()))?;
        if !response.ok() {
            return Err(MetadataError::Status(response.status()));
        }

        let text = response
            .text()
            .await
            .map_err(|err| MetadataError::Transport(err.to_string()))?;
        serde_json::from_str(&text).map_err(|err| MetadataError::Parse(err.to_string()))
    }
}
