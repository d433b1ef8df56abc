use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::expect_string;
use crate::ethereum::{
    contract::{read_contract, Contract},
    descriptor::{AbiParam, FunctionDescriptor},
};
use crate::extensions::erc20;
use crate::metadata::MetadataFetcher;

pub static CONTRACT_URI: FunctionDescriptor =
    FunctionDescriptor::new("0xe8a3d485", &[], &[AbiParam::new("string", "")]);

/// Contract-level metadata document, as referenced by `contractURI`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Resolves contract-level metadata.
///
/// Prefers the `contractURI` document; contracts without a (usable)
/// `contractURI` fall back to the on-chain `name()`/`symbol()` getters, each
/// of which is individually optional. A reachable URI whose document fails
/// to fetch or parse is an error, not a fallback.
pub async fn get_contract_metadata(
    contract: &Contract,
    fetcher: &MetadataFetcher,
) -> Result<ContractMetadata> {
    match read_contract(contract, &CONTRACT_URI, &[]).await {
        Ok(value) => {
            let uri = expect_string(&value, "contractURI")?;
            if !uri.is_empty() {
                return fetcher.fetch_json(&uri, None).await;
            }
        }
        Err(e) => {
            tracing::debug!(
                "contractURI unavailable on {}, falling back to name/symbol: {}",
                contract.address,
                e
            );
        }
    }

    let name = read_contract(contract, &erc20::NAME, &[])
        .await
        .ok()
        .and_then(|v| v.as_str().map(str::to_string));
    let symbol = read_contract(contract, &erc20::SYMBOL, &[])
        .await
        .ok()
        .and_then(|v| v.as_str().map(str::to_string));

    Ok(ContractMetadata {
        name,
        symbol,
        description: None,
        image: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_metadata_tolerates_partial_documents() {
        let meta: ContractMetadata =
            serde_json::from_str(r#"{"name": "My Drop", "image": "ipfs://QmHash"}"#).unwrap();
        assert_eq!(meta.name.as_deref(), Some("My Drop"));
        assert_eq!(meta.image.as_deref(), Some("ipfs://QmHash"));
        assert!(meta.description.is_none());
    }

    #[test]
    fn test_contract_uri_descriptor_shape() {
        assert!(CONTRACT_URI.inputs.is_empty());
        assert_eq!(CONTRACT_URI.outputs[0].ty, "string");
    }
}
