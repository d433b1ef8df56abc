use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes},
    providers::{Provider, RootProvider},
    rpc::types::TransactionRequest,
    transports::http::{Client, Http},
};
use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::ethereum::{
    descriptor::FunctionDescriptor,
    provider::ProviderManager,
    utils,
    value::{dyn_sol_value_to_json, json_to_call_params},
};

/// A validated reference to a deployed contract: provider handle, address
/// and resolved chain. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Contract {
    provider: RootProvider<Http<Client>>,
    pub address: Address,
    pub chain_id: u64,
    pub network: String,
}

/// Builds a contract reference, validating all inputs up front.
///
/// Fails synchronously if the address is malformed or the chain id is zero
/// or not present in the configured network registry; these are construction
/// validation errors, never deferred to call time.
pub fn get_contract(
    providers: &ProviderManager,
    address: &str,
    chain_id: u64,
) -> Result<Contract> {
    if chain_id == 0 {
        return Err(anyhow!(
            "get_contract validation error - invalid chain id: {}",
            chain_id
        ));
    }

    let (network_name, _) = providers
        .network_by_chain_id(chain_id)
        .map_err(|e| anyhow!("get_contract validation error - unresolved chain: {}", e))?;

    let address = utils::validate_address(address)
        .map_err(|e| anyhow!("get_contract validation error - invalid address: {}", e))?;

    let provider = providers.get_provider(Some(network_name))?.clone();

    Ok(Contract {
        provider,
        address,
        chain_id,
        network: network_name.to_string(),
    })
}

/// Dispatches a read-only call for `descriptor` on `contract`.
///
/// Encodes the parameters into calldata, performs one `eth_call` round trip
/// and decodes the result (single-output functions yield the bare value,
/// multi-output functions a tuple). Transport errors and reverts are
/// propagated unchanged to the caller; there is no retry.
pub async fn read_contract(
    contract: &Contract,
    descriptor: &FunctionDescriptor,
    params: &[DynSolValue],
) -> Result<DynSolValue> {
    let calldata = descriptor.encode_calldata(params)?;
    let raw = Bytes::from(hex::decode(&calldata[2..])?);

    let call_request = TransactionRequest::default()
        .to(contract.address)
        .input(raw.into());

    tracing::debug!(
        "eth_call {} selector {} on chain {}",
        contract.address,
        descriptor.selector,
        contract.chain_id
    );

    let result_bytes = contract.provider.call(&call_request).await?;

    descriptor.decode_output(&result_bytes)
}

/// Read-call entry point for JSON parameters (the CLI path): converts the
/// JSON into the descriptor's positional values, calls, and renders the
/// decoded result back to JSON.
pub async fn call_function_json(
    contract: &Contract,
    descriptor: &FunctionDescriptor,
    parameters: &Value,
) -> Result<Value> {
    let values = json_to_call_params(descriptor, parameters)?;
    let decoded = read_contract(contract, descriptor, &values).await?;
    dyn_sol_value_to_json(&decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::str::FromStr;

    fn manager() -> ProviderManager {
        ProviderManager::new(Config::default()).unwrap()
    }

    #[test]
    fn test_get_contract_succeeds_for_valid_inputs() {
        let providers = manager();
        let contract =
            get_contract(&providers, "0x742d35Cc6435C9c1c72c5E7b18BaB7e1DB7a5d6e", 1).unwrap();

        assert_eq!(
            contract.address,
            Address::from_str("0x742d35Cc6435C9c1c72c5E7b18BaB7e1DB7a5d6e").unwrap()
        );
        assert_eq!(contract.chain_id, 1);
        assert_eq!(contract.network, "ethereum");
    }

    #[test]
    fn test_get_contract_rejects_malformed_address() {
        let providers = manager();
        for bad in ["", "0x123", "not_an_address", "742d35Cc6435C9c1c72c5E7b18BaB7e1DB7a5d6e"] {
            let err = get_contract(&providers, bad, 1).unwrap_err();
            assert!(
                err.to_string().contains("invalid address"),
                "expected address validation error for '{}', got: {}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_get_contract_rejects_unresolved_chain() {
        let providers = manager();
        let addr = "0x742d35Cc6435C9c1c72c5E7b18BaB7e1DB7a5d6e";

        let err = get_contract(&providers, addr, 0).unwrap_err();
        assert!(err.to_string().contains("invalid chain id"));

        let err = get_contract(&providers, addr, 424242).unwrap_err();
        assert!(err.to_string().contains("unresolved chain"));
    }
}
