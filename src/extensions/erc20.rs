use alloy::primitives::Address;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::{expect_string, expect_uint};
use crate::ethereum::{
    contract::{read_contract, Contract},
    descriptor::{AbiParam, FunctionDescriptor},
    provider::ProviderManager,
};

pub static NAME: FunctionDescriptor =
    FunctionDescriptor::new("0x06fdde03", &[], &[AbiParam::new("string", "")]);

pub static SYMBOL: FunctionDescriptor =
    FunctionDescriptor::new("0x95d89b41", &[], &[AbiParam::new("string", "")]);

pub static DECIMALS: FunctionDescriptor =
    FunctionDescriptor::new("0x313ce567", &[], &[AbiParam::new("uint8", "")]);

/// Sentinel address conventionally used for the chain's native currency in
/// claim conditions and payment routing.
pub const NATIVE_TOKEN_ADDRESS: Address = Address::repeat_byte(0xee);

pub fn is_native_token(address: Address) -> bool {
    address == NATIVE_TOKEN_ADDRESS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Fetches name/symbol/decimals for a currency contract.
///
/// The three reads are independent and issued concurrently. The native-token
/// sentinel is answered from the chain's configured native currency without
/// touching the network. Any failing read fails the whole lookup.
pub async fn get_currency_metadata(
    providers: &ProviderManager,
    contract: &Contract,
) -> Result<CurrencyMetadata> {
    if is_native_token(contract.address) {
        let (_, network) = providers.network_by_chain_id(contract.chain_id)?;
        return Ok(CurrencyMetadata {
            name: network.native_currency.name.clone(),
            symbol: network.native_currency.symbol.clone(),
            decimals: network.native_currency.decimals,
        });
    }

    let (name, symbol, decimals) = tokio::try_join!(
        read_contract(contract, &NAME, &[]),
        read_contract(contract, &SYMBOL, &[]),
        read_contract(contract, &DECIMALS, &[]),
    )?;

    let decimals = expect_uint(&decimals, "decimals")?;
    let decimals = u8::try_from(decimals)
        .map_err(|_| anyhow!("Currency decimals {} out of range", decimals))?;

    Ok(CurrencyMetadata {
        name: expect_string(&name, "name")?,
        symbol: expect_string(&symbol, "symbol")?,
        decimals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_native_token_sentinel() {
        let sentinel =
            Address::from_str("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE").unwrap();
        assert_eq!(NATIVE_TOKEN_ADDRESS, sentinel);
        assert!(is_native_token(sentinel));
        assert!(!is_native_token(Address::ZERO));
    }

    #[test]
    fn test_descriptors_take_no_inputs() {
        for descriptor in [&NAME, &SYMBOL, &DECIMALS] {
            assert!(descriptor.inputs.is_empty());
            assert_eq!(descriptor.outputs.len(), 1);
        }
    }
}
