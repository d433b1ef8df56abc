use alloy::primitives::U256;
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::FetchConfig;

/// Token-level metadata document, as referenced by `tokenURI`/`uri`.
/// Everything is optional; absent fields fall through the display fallback
/// chains downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NftMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub animation_url: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

/// Fetches and decodes off-chain JSON documents referenced by on-chain URIs.
#[derive(Debug, Clone)]
pub struct MetadataFetcher {
    client: Client,
    ipfs_gateway: String,
}

impl MetadataFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            client: Client::new(),
            ipfs_gateway: config.ipfs_gateway.clone(),
        }
    }

    /// Rewrites an on-chain URI into a fetchable HTTP URL.
    ///
    /// `ipfs://` URIs are routed through the configured gateway, and the
    /// literal `{id}` placeholder is substituted with the 64-character
    /// zero-padded lowercase hex token id (ERC-1155 metadata convention).
    pub fn resolve_uri(&self, uri: &str, token_id: Option<U256>) -> String {
        let uri = match token_id {
            Some(id) => uri.replace("{id}", &format!("{:064x}", id)),
            None => uri.to_string(),
        };

        if let Some(rest) = uri.strip_prefix("ipfs://") {
            let rest = rest.strip_prefix("ipfs/").unwrap_or(rest);
            format!("{}{}", self.ipfs_gateway, rest)
        } else {
            uri
        }
    }

    /// Fetch a JSON document from a (possibly ipfs://) URI and deserialize
    /// it. Transport and decode failures are reported with the resolved URL.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        uri: &str,
        token_id: Option<U256>,
    ) -> Result<T> {
        let url = self.resolve_uri(uri, token_id);

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(anyhow!("Unsupported metadata URI scheme: '{}'", url));
        }

        tracing::debug!("Fetching metadata from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to fetch metadata from {}: {}", url, e))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Metadata fetch from {} returned status {}",
                url,
                response.status()
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| anyhow!("Failed to parse metadata JSON from {}: {}", url, e))
    }

    pub async fn fetch_nft_metadata(
        &self,
        uri: &str,
        token_id: Option<U256>,
    ) -> Result<NftMetadata> {
        self.fetch_json(uri, token_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> MetadataFetcher {
        MetadataFetcher::new(&FetchConfig::default())
    }

    #[test]
    fn test_ipfs_uri_goes_through_gateway() {
        assert_eq!(
            fetcher().resolve_uri("ipfs://QmHash/0.json", None),
            "https://ipfs.io/ipfs/QmHash/0.json"
        );
        // Some contracts emit ipfs://ipfs/<hash>; the duplicate path segment
        // is collapsed.
        assert_eq!(
            fetcher().resolve_uri("ipfs://ipfs/QmHash/0.json", None),
            "https://ipfs.io/ipfs/QmHash/0.json"
        );
    }

    #[test]
    fn test_http_uri_is_untouched() {
        assert_eq!(
            fetcher().resolve_uri("https://example.com/meta/1.json", None),
            "https://example.com/meta/1.json"
        );
    }

    #[test]
    fn test_id_placeholder_substitution() {
        let resolved = fetcher().resolve_uri(
            "https://example.com/{id}.json",
            Some(U256::from(10u64)),
        );
        assert_eq!(
            resolved,
            "https://example.com/000000000000000000000000000000000000000000000000000000000000000a.json"
        );
    }

    #[test]
    fn test_nft_metadata_tolerates_missing_fields() {
        let meta: NftMetadata = serde_json::from_str(r#"{"name": "Token #1"}"#).unwrap();
        assert_eq!(meta.name.as_deref(), Some("Token #1"));
        assert!(meta.image.is_none());
        assert!(meta.description.is_none());

        let empty: NftMetadata = serde_json::from_str("{}").unwrap();
        assert!(empty.name.is_none());
    }
}
