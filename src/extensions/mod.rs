pub mod common;
pub mod erc1155;
pub mod erc20;
pub mod erc721;
pub mod royalty;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, B256, U256},
};
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::ethereum::descriptor::FunctionDescriptor;

/// On-chain claim condition governing eligibility, price and limits for
/// minting, decoded from the drop contract's condition tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimCondition {
    pub start_timestamp: U256,
    pub max_claimable_supply: U256,
    pub supply_claimed: U256,
    pub quantity_limit_per_wallet: U256,
    pub merkle_root: B256,
    pub price_per_token: U256,
    pub currency: Address,
    pub metadata: String,
}

impl ClaimCondition {
    /// Decodes a claim condition from the tuple returned by
    /// `getClaimConditionById`.
    pub fn from_value(value: &DynSolValue) -> Result<Self> {
        let fields = value
            .as_tuple()
            .ok_or_else(|| anyhow!("Claim condition result is not a tuple"))?;
        if fields.len() != 8 {
            return Err(anyhow!(
                "Claim condition tuple has {} fields, expected 8",
                fields.len()
            ));
        }

        Ok(Self {
            start_timestamp: expect_uint(&fields[0], "startTimestamp")?,
            max_claimable_supply: expect_uint(&fields[1], "maxClaimableSupply")?,
            supply_claimed: expect_uint(&fields[2], "supplyClaimed")?,
            quantity_limit_per_wallet: expect_uint(&fields[3], "quantityLimitPerWallet")?,
            merkle_root: expect_fixed_bytes(&fields[4], "merkleRoot")?,
            price_per_token: expect_uint(&fields[5], "pricePerToken")?,
            currency: expect_address(&fields[6], "currency")?,
            metadata: expect_string(&fields[7], "metadata")?,
        })
    }
}

pub(crate) fn expect_uint(value: &DynSolValue, field: &str) -> Result<U256> {
    value
        .as_uint()
        .map(|(v, _)| v)
        .ok_or_else(|| anyhow!("Expected uint for '{}', got {:?}", field, value))
}

pub(crate) fn expect_address(value: &DynSolValue, field: &str) -> Result<Address> {
    value
        .as_address()
        .ok_or_else(|| anyhow!("Expected address for '{}', got {:?}", field, value))
}

pub(crate) fn expect_string(value: &DynSolValue, field: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Expected string for '{}', got {:?}", field, value))
}

pub(crate) fn expect_fixed_bytes(value: &DynSolValue, field: &str) -> Result<B256> {
    value
        .as_fixed_bytes()
        .and_then(|(bytes, size)| if size == 32 { Some(B256::from_slice(bytes)) } else { None })
        .ok_or_else(|| anyhow!("Expected bytes32 for '{}', got {:?}", field, value))
}

/// All descriptors shipped by this crate, keyed by `family.function` name
/// (e.g. `erc20.name`, `royalty.setRoyaltyInfoForToken`).
pub fn registry() -> &'static HashMap<&'static str, &'static FunctionDescriptor> {
    static REGISTRY: OnceLock<HashMap<&'static str, &'static FunctionDescriptor>> =
        OnceLock::new();

    REGISTRY.get_or_init(|| {
        let mut table: HashMap<&'static str, &'static FunctionDescriptor> = HashMap::new();
        table.insert("erc20.name", &erc20::NAME);
        table.insert("erc20.symbol", &erc20::SYMBOL);
        table.insert("erc20.decimals", &erc20::DECIMALS);
        table.insert("erc721.tokenURI", &erc721::TOKEN_URI);
        table.insert("erc721.ownerOf", &erc721::OWNER_OF);
        table.insert(
            "erc721.getActiveClaimConditionId",
            &erc721::GET_ACTIVE_CLAIM_CONDITION_ID,
        );
        table.insert(
            "erc721.getClaimConditionById",
            &erc721::GET_CLAIM_CONDITION_BY_ID,
        );
        table.insert("erc1155.uri", &erc1155::URI);
        table.insert("erc1155.totalSupply", &erc1155::TOTAL_SUPPLY);
        table.insert("erc1155.balanceOf", &erc1155::BALANCE_OF);
        table.insert(
            "erc1155.getActiveClaimConditionId",
            &erc1155::GET_ACTIVE_CLAIM_CONDITION_ID,
        );
        table.insert(
            "erc1155.getClaimConditionById",
            &erc1155::GET_CLAIM_CONDITION_BY_ID,
        );
        table.insert("common.contractURI", &common::CONTRACT_URI);
        table.insert(
            "royalty.getDefaultRoyaltyInfo",
            &royalty::GET_DEFAULT_ROYALTY_INFO,
        );
        table.insert(
            "royalty.setDefaultRoyaltyInfo",
            &royalty::SET_DEFAULT_ROYALTY_INFO,
        );
        table.insert(
            "royalty.setRoyaltyInfoForToken",
            &royalty::SET_ROYALTY_INFO_FOR_TOKEN,
        );
        table
    })
}

/// Look up a descriptor by its qualified name.
pub fn find_function(name: &str) -> Option<&'static FunctionDescriptor> {
    registry().get(name).copied()
}

/// Given the selectors available on a contract, reports which known
/// functions it supports, sorted by qualified name.
pub fn detect_supported(available_selectors: &[String]) -> Vec<&'static str> {
    let mut supported: Vec<&'static str> = registry()
        .iter()
        .filter(|(_, descriptor)| descriptor.is_supported(available_selectors))
        .map(|(name, _)| *name)
        .collect();
    supported.sort_unstable();
    supported
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_unique_selectors_per_signature() {
        let registry = registry();
        assert!(registry.len() >= 16);
        // Every selector is lowercase 0x-prefixed 4-byte hex, the
        // generation-time casing convention the probe relies on.
        for descriptor in registry.values() {
            let selector = descriptor.selector;
            assert!(selector.starts_with("0x"), "bad selector {}", selector);
            assert_eq!(selector.len(), 10, "bad selector {}", selector);
            assert_eq!(selector.to_lowercase(), selector, "bad selector {}", selector);
            descriptor.selector_bytes().unwrap();
        }
    }

    #[test]
    fn test_find_function() {
        assert!(find_function("erc20.decimals").is_some());
        assert!(find_function("decimals").is_none());
        assert!(find_function("erc20.mint").is_none());
    }

    #[test]
    fn test_detect_supported() {
        let selectors = vec![
            "0x06fdde03".to_string(), // name()
            "0x95d89b41".to_string(), // symbol()
            "0xe8a3d485".to_string(), // contractURI()
        ];
        let supported = detect_supported(&selectors);
        assert_eq!(
            supported,
            vec!["common.contractURI", "erc20.name", "erc20.symbol"]
        );
        assert!(detect_supported(&[]).is_empty());
    }

    #[test]
    fn test_claim_condition_from_value() {
        let tuple = DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(1_700_000_000u64), 256),
            DynSolValue::Uint(U256::from(10_000u64), 256),
            DynSolValue::Uint(U256::from(42u64), 256),
            DynSolValue::Uint(U256::from(5u64), 256),
            DynSolValue::FixedBytes(B256::ZERO, 32),
            DynSolValue::Uint(U256::from(10_000_000_000_000_000u64), 256),
            DynSolValue::Address(Address::repeat_byte(0xee)),
            DynSolValue::String(String::new()),
        ]);

        let condition = ClaimCondition::from_value(&tuple).unwrap();
        assert_eq!(condition.supply_claimed, U256::from(42u64));
        assert_eq!(condition.quantity_limit_per_wallet, U256::from(5u64));
        assert_eq!(condition.currency, Address::repeat_byte(0xee));
    }

    #[test]
    fn test_claim_condition_rejects_short_tuple() {
        let tuple = DynSolValue::Tuple(vec![DynSolValue::Uint(U256::ZERO, 256)]);
        assert!(ClaimCondition::from_value(&tuple).is_err());
    }
}
