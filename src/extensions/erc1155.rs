use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use anyhow::Result;
use serde::Serialize;

use super::{expect_string, expect_uint, ClaimCondition};
use crate::ethereum::{
    contract::{read_contract, Contract},
    descriptor::{AbiParam, FunctionDescriptor},
};
use crate::metadata::{MetadataFetcher, NftMetadata};

pub static URI: FunctionDescriptor = FunctionDescriptor::new(
    "0x0e89341c",
    &[AbiParam::new("uint256", "_id")],
    &[AbiParam::new("string", "")],
);

pub static TOTAL_SUPPLY: FunctionDescriptor = FunctionDescriptor::new(
    "0xbd85b039",
    &[AbiParam::new("uint256", "id")],
    &[AbiParam::new("uint256", "")],
);

pub static BALANCE_OF: FunctionDescriptor = FunctionDescriptor::new(
    "0x00fdd58e",
    &[
        AbiParam::new("address", "account"),
        AbiParam::new("uint256", "id"),
    ],
    &[AbiParam::new("uint256", "")],
);

pub static GET_ACTIVE_CLAIM_CONDITION_ID: FunctionDescriptor = FunctionDescriptor::new(
    "0x5ab063e8",
    &[AbiParam::new("uint256", "_tokenId")],
    &[AbiParam::new("uint256", "")],
);

pub static GET_CLAIM_CONDITION_BY_ID: FunctionDescriptor = FunctionDescriptor::new(
    "0xd45b28d7",
    &[
        AbiParam::new("uint256", "_tokenId"),
        AbiParam::new("uint256", "_conditionId"),
    ],
    &[AbiParam::new(
        "(uint256,uint256,uint256,uint256,bytes32,uint256,address,string)",
        "condition",
    )],
);

/// A single ERC-1155 token id with its resolved off-chain metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Nft {
    pub token_id: U256,
    pub token_uri: String,
    pub metadata: NftMetadata,
}

pub fn is_get_active_claim_condition_supported(available_selectors: &[String]) -> bool {
    GET_ACTIVE_CLAIM_CONDITION_ID.is_supported(available_selectors)
        && GET_CLAIM_CONDITION_BY_ID.is_supported(available_selectors)
}

/// Reads `uri` for a token id and resolves the referenced metadata document,
/// substituting the `{id}` placeholder per the ERC-1155 convention.
pub async fn get_nft(
    contract: &Contract,
    fetcher: &MetadataFetcher,
    token_id: U256,
) -> Result<Nft> {
    let uri = read_contract(contract, &URI, &[DynSolValue::Uint(token_id, 256)]).await?;
    let token_uri = expect_string(&uri, "uri")?;

    let metadata = fetcher.fetch_nft_metadata(&token_uri, Some(token_id)).await?;

    Ok(Nft {
        token_id,
        token_uri,
        metadata,
    })
}

pub async fn total_supply(contract: &Contract, token_id: U256) -> Result<U256> {
    let supply = read_contract(
        contract,
        &TOTAL_SUPPLY,
        &[DynSolValue::Uint(token_id, 256)],
    )
    .await?;
    expect_uint(&supply, "totalSupply")
}

pub async fn balance_of(contract: &Contract, account: Address, token_id: U256) -> Result<U256> {
    let balance = read_contract(
        contract,
        &BALANCE_OF,
        &[
            DynSolValue::Address(account),
            DynSolValue::Uint(token_id, 256),
        ],
    )
    .await?;
    expect_uint(&balance, "balanceOf")
}

/// Per-token variant of the claim-condition resolution: both lookups carry
/// the token id.
pub async fn get_active_claim_condition(
    contract: &Contract,
    token_id: U256,
) -> Result<ClaimCondition> {
    let id = read_contract(
        contract,
        &GET_ACTIVE_CLAIM_CONDITION_ID,
        &[DynSolValue::Uint(token_id, 256)],
    )
    .await?;
    let id = expect_uint(&id, "conditionId")?;

    let condition = read_contract(
        contract,
        &GET_CLAIM_CONDITION_BY_ID,
        &[
            DynSolValue::Uint(token_id, 256),
            DynSolValue::Uint(id, 256),
        ],
    )
    .await?;

    ClaimCondition::from_value(&condition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_condition_probe_needs_both_selectors() {
        let both = vec!["0x5ab063e8".to_string(), "0xd45b28d7".to_string()];
        assert!(is_get_active_claim_condition_supported(&both));
        assert!(!is_get_active_claim_condition_supported(&both[..1].to_vec()));
    }

    #[test]
    fn test_total_supply_calldata_layout() {
        let calldata = TOTAL_SUPPLY
            .encode_calldata(&[DynSolValue::Uint(U256::from(7u64), 256)])
            .unwrap();
        assert_eq!(
            calldata,
            "0xbd85b0390000000000000000000000000000000000000000000000000000000000000007"
        );
    }
}
