use alloy::{dyn_abi::DynSolValue, primitives::U256};
use anyhow::Result;
use serde::Serialize;

use super::{expect_address, expect_string, expect_uint, ClaimCondition};
use crate::ethereum::{
    contract::{read_contract, Contract},
    descriptor::{AbiParam, FunctionDescriptor},
};
use crate::metadata::{MetadataFetcher, NftMetadata};

pub static TOKEN_URI: FunctionDescriptor = FunctionDescriptor::new(
    "0xc87b56dd",
    &[AbiParam::new("uint256", "_tokenId")],
    &[AbiParam::new("string", "")],
);

pub static OWNER_OF: FunctionDescriptor = FunctionDescriptor::new(
    "0x6352211e",
    &[AbiParam::new("uint256", "tokenId")],
    &[AbiParam::new("address", "")],
);

pub static GET_ACTIVE_CLAIM_CONDITION_ID: FunctionDescriptor =
    FunctionDescriptor::new("0xc68907de", &[], &[AbiParam::new("uint256", "")]);

pub static GET_CLAIM_CONDITION_BY_ID: FunctionDescriptor = FunctionDescriptor::new(
    "0x6f8934f4",
    &[AbiParam::new("uint256", "_conditionId")],
    &[AbiParam::new(
        "(uint256,uint256,uint256,uint256,bytes32,uint256,address,string)",
        "condition",
    )],
);

/// A single ERC-721 token with its resolved off-chain metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Nft {
    pub token_id: U256,
    pub token_uri: String,
    pub metadata: NftMetadata,
}

/// Checks that the drop claim-condition interface is available, given the
/// selectors exposed by a contract. Both lookups must be present.
pub fn is_get_active_claim_condition_supported(available_selectors: &[String]) -> bool {
    GET_ACTIVE_CLAIM_CONDITION_ID.is_supported(available_selectors)
        && GET_CLAIM_CONDITION_BY_ID.is_supported(available_selectors)
}

/// Reads `tokenURI` and resolves the referenced metadata document.
pub async fn get_nft(
    contract: &Contract,
    fetcher: &MetadataFetcher,
    token_id: U256,
) -> Result<Nft> {
    let uri = read_contract(
        contract,
        &TOKEN_URI,
        &[DynSolValue::Uint(token_id, 256)],
    )
    .await?;
    let token_uri = expect_string(&uri, "tokenURI")?;

    let metadata = fetcher.fetch_nft_metadata(&token_uri, Some(token_id)).await?;

    Ok(Nft {
        token_id,
        token_uri,
        metadata,
    })
}

pub async fn owner_of(contract: &Contract, token_id: U256) -> Result<alloy::primitives::Address> {
    let owner = read_contract(contract, &OWNER_OF, &[DynSolValue::Uint(token_id, 256)]).await?;
    expect_address(&owner, "ownerOf")
}

/// Resolves the currently active claim condition: the active condition id
/// first, then the condition record itself. Errors (including "no active
/// condition" reverts) propagate to the caller; tolerating them is a
/// page-level decision.
pub async fn get_active_claim_condition(contract: &Contract) -> Result<ClaimCondition> {
    let id = read_contract(contract, &GET_ACTIVE_CLAIM_CONDITION_ID, &[]).await?;
    let id = expect_uint(&id, "conditionId")?;

    let condition = read_contract(
        contract,
        &GET_CLAIM_CONDITION_BY_ID,
        &[DynSolValue::Uint(id, 256)],
    )
    .await?;

    ClaimCondition::from_value(&condition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_condition_probe_needs_both_selectors() {
        let both = vec!["0xc68907de".to_string(), "0x6f8934f4".to_string()];
        assert!(is_get_active_claim_condition_supported(&both));

        let only_id = vec!["0xc68907de".to_string()];
        assert!(!is_get_active_claim_condition_supported(&only_id));
        assert!(!is_get_active_claim_condition_supported(&[]));
    }

    #[test]
    fn test_condition_tuple_shape() {
        // The declared output tuple must parse and carry the 8 condition
        // fields in contract order.
        let types = GET_CLAIM_CONDITION_BY_ID.output_types().unwrap();
        assert_eq!(types.len(), 1);
        match &types[0] {
            alloy::dyn_abi::DynSolType::Tuple(fields) => assert_eq!(fields.len(), 8),
            other => panic!("expected tuple output, got {:?}", other),
        }
    }
}
