use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use anyhow::Result;
use std::future::Future;

use super::{expect_address, expect_uint};
use crate::ethereum::{
    contract::{read_contract, Contract},
    descriptor::{AbiParam, FunctionDescriptor},
    transaction::{CallArgs, Overrides, PreparedCall},
};

pub static SET_ROYALTY_INFO_FOR_TOKEN: FunctionDescriptor = FunctionDescriptor::new(
    "0xab8e8c44",
    &[
        AbiParam::new("uint256", "_tokenId"),
        AbiParam::new("address", "_recipient"),
        AbiParam::new("uint16", "_bps"),
    ],
    &[],
);

pub static SET_DEFAULT_ROYALTY_INFO: FunctionDescriptor = FunctionDescriptor::new(
    "0x93d79445",
    &[
        AbiParam::new("address", "_royaltyRecipient"),
        AbiParam::new("uint16", "_royaltyBps"),
    ],
    &[],
);

pub static GET_DEFAULT_ROYALTY_INFO: FunctionDescriptor = FunctionDescriptor::new(
    "0xb24f2d39",
    &[],
    &[
        AbiParam::new("address", ""),
        AbiParam::new("uint16", ""),
    ],
);

/// Parameters for the `setRoyaltyInfoForToken` function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRoyaltyInfoForTokenParams {
    pub token_id: U256,
    pub recipient: Address,
    pub bps: u16,
}

impl SetRoyaltyInfoForTokenParams {
    fn to_values(&self) -> Vec<DynSolValue> {
        vec![
            DynSolValue::Uint(self.token_id, 256),
            DynSolValue::Address(self.recipient),
            DynSolValue::Uint(U256::from(self.bps), 16),
        ]
    }
}

/// Parameters for the `setDefaultRoyaltyInfo` function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDefaultRoyaltyInfoParams {
    pub royalty_recipient: Address,
    pub royalty_bps: u16,
}

impl SetDefaultRoyaltyInfoParams {
    fn to_values(&self) -> Vec<DynSolValue> {
        vec![
            DynSolValue::Address(self.royalty_recipient),
            DynSolValue::Uint(U256::from(self.royalty_bps), 16),
        ]
    }
}

/// Checks if the `setRoyaltyInfoForToken` method is supported by a contract,
/// given its available selectors.
pub fn is_set_royalty_info_for_token_supported(available_selectors: &[String]) -> bool {
    SET_ROYALTY_INFO_FOR_TOKEN.is_supported(available_selectors)
}

pub fn is_set_default_royalty_info_supported(available_selectors: &[String]) -> bool {
    SET_DEFAULT_ROYALTY_INFO.is_supported(available_selectors)
}

pub fn is_get_default_royalty_info_supported(available_selectors: &[String]) -> bool {
    GET_DEFAULT_ROYALTY_INFO.is_supported(available_selectors)
}

/// ABI-encodes the parameters for `setRoyaltyInfoForToken` (no selector).
pub fn encode_set_royalty_info_for_token_params(
    params: &SetRoyaltyInfoForTokenParams,
) -> Result<String> {
    SET_ROYALTY_INFO_FOR_TOKEN.encode_params(&params.to_values())
}

/// Encodes the full `setRoyaltyInfoForToken` calldata: selector plus
/// parameters.
pub fn encode_set_royalty_info_for_token(
    params: &SetRoyaltyInfoForTokenParams,
) -> Result<String> {
    SET_ROYALTY_INFO_FOR_TOKEN.encode_calldata(&params.to_values())
}

/// Prepares a `setRoyaltyInfoForToken` transaction for an external
/// submitter.
pub fn set_royalty_info_for_token(
    contract: Contract,
    params: SetRoyaltyInfoForTokenParams,
    overrides: Overrides,
) -> PreparedCall {
    PreparedCall::new(
        contract,
        &SET_ROYALTY_INFO_FOR_TOKEN,
        CallArgs {
            params: params.to_values(),
            overrides,
        },
    )
}

/// Prepares a `setRoyaltyInfoForToken` transaction whose parameters are
/// produced asynchronously; the producer is invoked at most once however
/// many fields of the prepared call are read.
pub fn set_royalty_info_for_token_with_async_params<F, Fut>(
    contract: Contract,
    producer: F,
) -> PreparedCall
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(SetRoyaltyInfoForTokenParams, Overrides)>> + Send + 'static,
{
    PreparedCall::with_async_args(contract, &SET_ROYALTY_INFO_FOR_TOKEN, move || {
        let pending = producer();
        async move {
            let (params, overrides) = pending.await?;
            Ok(CallArgs {
                params: params.to_values(),
                overrides,
            })
        }
    })
}

pub fn encode_set_default_royalty_info_params(
    params: &SetDefaultRoyaltyInfoParams,
) -> Result<String> {
    SET_DEFAULT_ROYALTY_INFO.encode_params(&params.to_values())
}

pub fn encode_set_default_royalty_info(params: &SetDefaultRoyaltyInfoParams) -> Result<String> {
    SET_DEFAULT_ROYALTY_INFO.encode_calldata(&params.to_values())
}

pub fn set_default_royalty_info(
    contract: Contract,
    params: SetDefaultRoyaltyInfoParams,
    overrides: Overrides,
) -> PreparedCall {
    PreparedCall::new(
        contract,
        &SET_DEFAULT_ROYALTY_INFO,
        CallArgs {
            params: params.to_values(),
            overrides,
        },
    )
}

/// Reads the collection-wide default royalty recipient and basis points.
pub async fn get_default_royalty_info(contract: &Contract) -> Result<(Address, u16)> {
    let result = read_contract(contract, &GET_DEFAULT_ROYALTY_INFO, &[]).await?;
    let fields = result
        .as_tuple()
        .ok_or_else(|| anyhow::anyhow!("Expected (address, uint16) result"))?;
    if fields.len() != 2 {
        return Err(anyhow::anyhow!(
            "Expected 2 royalty fields, got {}",
            fields.len()
        ));
    }

    let recipient = expect_address(&fields[0], "royaltyRecipient")?;
    let bps = expect_uint(&fields[1], "royaltyBps")?;
    let bps =
        u16::try_from(bps).map_err(|_| anyhow::anyhow!("Royalty bps {} out of range", bps))?;

    Ok((recipient, bps))
}
