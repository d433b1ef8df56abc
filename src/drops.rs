use alloy::primitives::{
    utils::format_units,
    Address, U256,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::config::{Config, DropConfig, TokenStandard};
use crate::ethereum::{
    contract::{get_contract, Contract},
    provider::ProviderManager,
};
use crate::extensions::{
    self,
    common::ContractMetadata,
    erc20::CurrencyMetadata,
    ClaimCondition,
};
use crate::metadata::{MetadataFetcher, NftMetadata};

/// Result of the claim-condition lookup. A failed lookup is deliberately
/// folded into `NotActive` by the resolver rather than propagated; the
/// currency lookup that may follow has no such tolerance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimConditionOutcome {
    Found(ClaimCondition),
    NotActive,
}

/// Terminal outcome of resolving a drop page request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropPageOutcome {
    NotFound,
    Page(Box<DropPage>),
}

impl DropPageOutcome {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DropPageOutcome::NotFound)
    }
}

/// Fully derived view model for a mint page.
#[derive(Debug, Clone, Serialize)]
pub struct DropPage {
    pub slug: String,
    pub contract_address: String,
    pub chain_id: u64,
    pub standard: TokenStandard,
    pub token_id: Option<u64>,
    pub display_name: String,
    pub description: String,
    pub thumbnail: String,
    pub no_active_claim_condition: bool,
    pub price_per_token: Option<f64>,
    pub currency_symbol: Option<String>,
    pub quantity_limit_per_wallet: Option<U256>,
    pub hide_quantity_selector: bool,
    pub hide_mint_to_custom_address: bool,
}

/// The on-chain reads a drop page depends on, behind a seam so resolver
/// behavior can be tested against fakes.
#[async_trait]
pub trait DropDataSource: Send + Sync {
    async fn nft(&self, drop: &DropConfig) -> Result<NftMetadata>;
    async fn active_claim_condition(&self, drop: &DropConfig) -> Result<ClaimCondition>;
    async fn contract_metadata(&self, drop: &DropConfig) -> Result<ContractMetadata>;
    async fn currency_metadata(
        &self,
        chain_id: u64,
        currency: Address,
    ) -> Result<CurrencyMetadata>;
}

/// Production data source: reads through the provider registry and fetches
/// referenced metadata documents.
#[derive(Debug, Clone)]
pub struct OnchainSource {
    providers: Arc<ProviderManager>,
    fetcher: MetadataFetcher,
}

impl OnchainSource {
    pub fn new(providers: Arc<ProviderManager>, fetcher: MetadataFetcher) -> Self {
        Self { providers, fetcher }
    }

    fn contract_for(&self, drop: &DropConfig) -> Result<Contract> {
        get_contract(&self.providers, &drop.contract_address, drop.chain_id)
    }

    fn drop_token_id(drop: &DropConfig) -> U256 {
        U256::from(drop.token_id.unwrap_or(0))
    }
}

#[async_trait]
impl DropDataSource for OnchainSource {
    async fn nft(&self, drop: &DropConfig) -> Result<NftMetadata> {
        let contract = self.contract_for(drop)?;
        match drop.standard {
            TokenStandard::Erc1155 => {
                let nft = extensions::erc1155::get_nft(
                    &contract,
                    &self.fetcher,
                    Self::drop_token_id(drop),
                )
                .await?;
                Ok(nft.metadata)
            }
            TokenStandard::Erc721 => {
                let nft =
                    extensions::erc721::get_nft(&contract, &self.fetcher, U256::ZERO).await?;
                Ok(nft.metadata)
            }
        }
    }

    async fn active_claim_condition(&self, drop: &DropConfig) -> Result<ClaimCondition> {
        let contract = self.contract_for(drop)?;
        match drop.standard {
            TokenStandard::Erc1155 => {
                extensions::erc1155::get_active_claim_condition(
                    &contract,
                    Self::drop_token_id(drop),
                )
                .await
            }
            TokenStandard::Erc721 => {
                extensions::erc721::get_active_claim_condition(&contract).await
            }
        }
    }

    async fn contract_metadata(&self, drop: &DropConfig) -> Result<ContractMetadata> {
        let contract = self.contract_for(drop)?;
        extensions::common::get_contract_metadata(&contract, &self.fetcher).await
    }

    async fn currency_metadata(
        &self,
        chain_id: u64,
        currency: Address,
    ) -> Result<CurrencyMetadata> {
        let contract = get_contract(&self.providers, &format!("{:?}", currency), chain_id)?;
        extensions::erc20::get_currency_metadata(&self.providers, &contract).await
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

/// Resolves a drop page request by slug.
///
/// Unknown slugs yield `NotFound`. For known slugs the three on-chain reads
/// (NFT metadata, claim condition, contract metadata) are issued
/// concurrently; completion order is unconstrained. A failed claim-condition
/// lookup renders the page flagged `no_active_claim_condition` with no price
/// fields, while a failed currency lookup after an active condition is found
/// yields `NotFound`.
pub async fn resolve_drop_page(
    source: &dyn DropDataSource,
    config: &Config,
    slug: &str,
) -> Result<DropPageOutcome> {
    let Some(drop) = config.find_drop(slug) else {
        tracing::debug!("No drop page configured for slug '{}'", slug);
        return Ok(DropPageOutcome::NotFound);
    };

    let (nft, claim, contract_metadata) = tokio::join!(
        source.nft(drop),
        source.active_claim_condition(drop),
        source.contract_metadata(drop),
    );
    let nft = nft?;
    let contract_metadata = contract_metadata?;

    let claim = match claim {
        Ok(condition) => ClaimConditionOutcome::Found(condition),
        Err(e) => {
            tracing::debug!("No active claim condition for '{}': {}", slug, e);
            ClaimConditionOutcome::NotActive
        }
    };

    // Display fallback chains: explicit config, then token metadata, then
    // contract metadata, empty-string values treated as absent throughout.
    let thumbnail = non_empty(drop.thumbnail.as_deref())
        .or_else(|| non_empty(nft.image.as_deref()))
        .or_else(|| non_empty(contract_metadata.image.as_deref()))
        .unwrap_or_default();

    let display_name = non_empty(contract_metadata.name.as_deref())
        .or_else(|| non_empty(nft.name.as_deref()))
        .unwrap_or_default();

    let description = non_empty(contract_metadata.description.as_deref())
        .or_else(|| non_empty(nft.description.as_deref()))
        .unwrap_or_default();

    let mut page = DropPage {
        slug: drop.slug.clone(),
        contract_address: drop.contract_address.clone(),
        chain_id: drop.chain_id,
        standard: drop.standard,
        token_id: drop.token_id,
        display_name,
        description,
        thumbnail,
        no_active_claim_condition: true,
        price_per_token: None,
        currency_symbol: None,
        quantity_limit_per_wallet: None,
        hide_quantity_selector: drop.hide_quantity_selector,
        hide_mint_to_custom_address: drop.hide_mint_to_custom_address,
    };

    let condition = match claim {
        ClaimConditionOutcome::NotActive => {
            return Ok(DropPageOutcome::Page(Box::new(page)));
        }
        ClaimConditionOutcome::Found(condition) => condition,
    };

    let currency_metadata = match source
        .currency_metadata(drop.chain_id, condition.currency)
        .await
    {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(
                "Unresolvable currency {} for drop '{}': {}",
                condition.currency,
                slug,
                e
            );
            return Ok(DropPageOutcome::NotFound);
        }
    };

    let price = format_units(condition.price_per_token, currency_metadata.decimals)
        .map_err(|e| anyhow!("Failed to format price: {}", e))?
        .parse::<f64>()
        .map_err(|e| anyhow!("Failed to parse formatted price: {}", e))?;

    page.no_active_claim_condition = false;
    page.price_per_token = Some(price);
    page.currency_symbol = Some(currency_metadata.symbol);
    page.quantity_limit_per_wallet = Some(condition.quantity_limit_per_wallet);

    Ok(DropPageOutcome::Page(Box::new(page)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    struct FakeSource {
        nft: NftMetadata,
        claim: Option<ClaimCondition>,
        contract_metadata: ContractMetadata,
        currency: Option<CurrencyMetadata>,
    }

    impl Default for FakeSource {
        fn default() -> Self {
            Self {
                nft: NftMetadata {
                    name: Some("Token Zero".to_string()),
                    description: Some("Token description".to_string()),
                    image: Some("ipfs://QmTokenImage".to_string()),
                    ..Default::default()
                },
                claim: Some(sample_condition()),
                contract_metadata: ContractMetadata {
                    name: Some("My Drop".to_string()),
                    description: Some("Contract description".to_string()),
                    image: Some("ipfs://QmContractImage".to_string()),
                    symbol: None,
                },
                currency: Some(CurrencyMetadata {
                    name: "Ether".to_string(),
                    symbol: "ETH".to_string(),
                    decimals: 18,
                }),
            }
        }
    }

    fn sample_condition() -> ClaimCondition {
        ClaimCondition {
            start_timestamp: U256::from(1_700_000_000u64),
            max_claimable_supply: U256::from(10_000u64),
            supply_claimed: U256::from(42u64),
            quantity_limit_per_wallet: U256::from(5u64),
            merkle_root: B256::ZERO,
            // 0.01 of an 18-decimals currency
            price_per_token: U256::from(10_000_000_000_000_000u64),
            currency: Address::repeat_byte(0xee),
            metadata: String::new(),
        }
    }

    #[async_trait]
    impl DropDataSource for FakeSource {
        async fn nft(&self, _drop: &DropConfig) -> Result<NftMetadata> {
            Ok(self.nft.clone())
        }

        async fn active_claim_condition(&self, _drop: &DropConfig) -> Result<ClaimCondition> {
            self.claim
                .clone()
                .ok_or_else(|| anyhow!("execution reverted: !CONDITION"))
        }

        async fn contract_metadata(&self, _drop: &DropConfig) -> Result<ContractMetadata> {
            Ok(self.contract_metadata.clone())
        }

        async fn currency_metadata(
            &self,
            _chain_id: u64,
            _currency: Address,
        ) -> Result<CurrencyMetadata> {
            self.currency
                .clone()
                .ok_or_else(|| anyhow!("execution reverted"))
        }
    }

    fn page(outcome: DropPageOutcome) -> DropPage {
        match outcome {
            DropPageOutcome::Page(page) => *page,
            DropPageOutcome::NotFound => panic!("expected a page, got NotFound"),
        }
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let outcome = resolve_drop_page(&FakeSource::default(), &Config::default(), "missing")
            .await
            .unwrap();
        assert!(outcome.is_not_found());
    }

    #[tokio::test]
    async fn test_failed_claim_lookup_renders_without_price() {
        let source = FakeSource {
            claim: None,
            ..Default::default()
        };
        let outcome = resolve_drop_page(&source, &Config::default(), "test")
            .await
            .unwrap();

        let page = page(outcome);
        assert!(page.no_active_claim_condition);
        assert!(page.price_per_token.is_none());
        assert!(page.currency_symbol.is_none());
        assert!(page.quantity_limit_per_wallet.is_none());
        // Display derivation still ran.
        assert_eq!(page.display_name, "My Drop");
    }

    #[tokio::test]
    async fn test_failed_currency_lookup_is_not_found() {
        let source = FakeSource {
            currency: None,
            ..Default::default()
        };
        let outcome = resolve_drop_page(&source, &Config::default(), "test")
            .await
            .unwrap();
        assert!(outcome.is_not_found());
    }

    #[tokio::test]
    async fn test_active_condition_computes_price() {
        let outcome = resolve_drop_page(&FakeSource::default(), &Config::default(), "test")
            .await
            .unwrap();

        let page = page(outcome);
        assert!(!page.no_active_claim_condition);
        // 10^16 wei at 18 decimals
        assert_eq!(page.price_per_token, Some(0.01));
        assert_eq!(page.currency_symbol.as_deref(), Some("ETH"));
        assert_eq!(page.quantity_limit_per_wallet, Some(U256::from(5u64)));
        assert_eq!(page.chain_id, 11155111);
    }

    #[tokio::test]
    async fn test_display_fallback_chains() {
        // Contract metadata wins for name and description, NFT image wins
        // for thumbnail when the config has none.
        let outcome = resolve_drop_page(&FakeSource::default(), &Config::default(), "test")
            .await
            .unwrap();
        let page_full = page(outcome);
        assert_eq!(page_full.display_name, "My Drop");
        assert_eq!(page_full.description, "Contract description");
        assert_eq!(page_full.thumbnail, "ipfs://QmTokenImage");

        // Empty contract description falls through to the NFT description;
        // absent contract name falls through to the NFT name.
        let source = FakeSource {
            contract_metadata: ContractMetadata {
                name: None,
                description: Some(String::new()),
                image: Some("ipfs://QmContractImage".to_string()),
                symbol: None,
            },
            nft: NftMetadata {
                name: Some("Token Zero".to_string()),
                description: Some("Token description".to_string()),
                image: None,
                ..Default::default()
            },
            ..Default::default()
        };
        let page_fallback = page(
            resolve_drop_page(&source, &Config::default(), "test")
                .await
                .unwrap(),
        );
        assert_eq!(page_fallback.display_name, "Token Zero");
        assert_eq!(page_fallback.description, "Token description");
        assert_eq!(page_fallback.thumbnail, "ipfs://QmContractImage");

        // Nothing anywhere: empty strings.
        let source = FakeSource {
            contract_metadata: ContractMetadata::default(),
            nft: NftMetadata::default(),
            ..Default::default()
        };
        let page_empty = page(
            resolve_drop_page(&source, &Config::default(), "test")
                .await
                .unwrap(),
        );
        assert_eq!(page_empty.display_name, "");
        assert_eq!(page_empty.description, "");
        assert_eq!(page_empty.thumbnail, "");
    }

    #[tokio::test]
    async fn test_config_thumbnail_takes_precedence() {
        let mut config = Config::default();
        config.drops[0].thumbnail = Some("/drops/preview.mp4".to_string());

        let page = page(
            resolve_drop_page(&FakeSource::default(), &config, "test")
                .await
                .unwrap(),
        );
        assert_eq!(page.thumbnail, "/drops/preview.mp4");
    }
}
