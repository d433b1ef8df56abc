use alloy::{
    dyn_abi::DynSolValue,
    network::TransactionBuilder,
    primitives::{Address, Bytes, U256},
    rpc::types::{AccessList, TransactionRequest},
};
use anyhow::{anyhow, Result};
use std::{future::Future, pin::Pin};
use tokio::sync::OnceCell;

use crate::ethereum::{contract::Contract, descriptor::FunctionDescriptor};

/// Optional transaction tuning values. Each field is independently optional
/// and resolved lazily through the owning `PreparedCall`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub value: Option<U256>,
    pub gas: Option<u64>,
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    pub nonce: Option<u64>,
    pub access_list: Option<AccessList>,
    pub extra_gas: Option<u64>,
    pub erc20_value: Option<Erc20Value>,
}

/// A transaction value denominated in an ERC-20 token rather than the native
/// currency; consumed by the external submitter, never folded into the
/// request here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc20Value {
    pub amount: U256,
    pub token_address: Address,
}

/// The resolved inputs of a write call: positional parameters matching the
/// descriptor plus the overrides.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    pub params: Vec<DynSolValue>,
    pub overrides: Overrides,
}

type BoxedArgsFuture = Pin<Box<dyn Future<Output = Result<CallArgs>> + Send>>;
type ArgsProducer = Box<dyn Fn() -> BoxedArgsFuture + Send + Sync>;

/// A deferred write-transaction description.
///
/// Binds a contract reference, a function descriptor and a parameter
/// producer. The producer may be asynchronous; its result (success or
/// failure) is memoized so that reading any number of the derived fields,
/// concurrently or sequentially, invokes it exactly once. The call is inert
/// until handed to an external submitter: building it performs no network
/// I/O beyond whatever the producer itself triggers.
pub struct PreparedCall {
    contract: Contract,
    descriptor: &'static FunctionDescriptor,
    producer: ArgsProducer,
    resolved: OnceCell<std::result::Result<CallArgs, String>>,
}

impl PreparedCall {
    /// Prepares a call from already-complete parameters and overrides.
    pub fn new(
        contract: Contract,
        descriptor: &'static FunctionDescriptor,
        args: CallArgs,
    ) -> Self {
        Self::with_async_args(contract, descriptor, move || {
            let args = args.clone();
            async move { Ok(args) }
        })
    }

    /// Prepares a call whose parameters are produced asynchronously on first
    /// use (e.g. after a quote or allowlist lookup).
    pub fn with_async_args<F, Fut>(
        contract: Contract,
        descriptor: &'static FunctionDescriptor,
        producer: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CallArgs>> + Send + 'static,
    {
        Self {
            contract,
            descriptor,
            producer: Box::new(move || Box::pin(producer())),
            resolved: OnceCell::new(),
        }
    }

    pub fn to(&self) -> Address {
        self.contract.address
    }

    pub fn chain_id(&self) -> u64 {
        self.contract.chain_id
    }

    pub fn descriptor(&self) -> &'static FunctionDescriptor {
        self.descriptor
    }

    /// Single-flight resolution of the parameter producer. Errors are cached
    /// alongside successes, so a failing producer reports the same error to
    /// every field reader without being re-invoked.
    async fn resolve(&self) -> Result<&CallArgs> {
        let cached = self
            .resolved
            .get_or_init(|| async { (self.producer)().await.map_err(|e| format!("{:#}", e)) })
            .await;

        match cached {
            Ok(args) => Ok(args),
            Err(msg) => Err(anyhow!("Failed to resolve call parameters: {}", msg)),
        }
    }

    pub async fn params(&self) -> Result<Vec<DynSolValue>> {
        Ok(self.resolve().await?.params.clone())
    }

    /// The full calldata hex (selector followed by ABI-encoded parameters).
    pub async fn data(&self) -> Result<String> {
        let args = self.resolve().await?;
        self.descriptor.encode_calldata(&args.params)
    }

    pub async fn value(&self) -> Result<Option<U256>> {
        Ok(self.resolve().await?.overrides.value)
    }

    pub async fn gas(&self) -> Result<Option<u64>> {
        Ok(self.resolve().await?.overrides.gas)
    }

    pub async fn gas_price(&self) -> Result<Option<u128>> {
        Ok(self.resolve().await?.overrides.gas_price)
    }

    pub async fn max_fee_per_gas(&self) -> Result<Option<u128>> {
        Ok(self.resolve().await?.overrides.max_fee_per_gas)
    }

    pub async fn max_priority_fee_per_gas(&self) -> Result<Option<u128>> {
        Ok(self.resolve().await?.overrides.max_priority_fee_per_gas)
    }

    pub async fn nonce(&self) -> Result<Option<u64>> {
        Ok(self.resolve().await?.overrides.nonce)
    }

    pub async fn access_list(&self) -> Result<Option<AccessList>> {
        Ok(self.resolve().await?.overrides.access_list.clone())
    }

    pub async fn extra_gas(&self) -> Result<Option<u64>> {
        Ok(self.resolve().await?.overrides.extra_gas)
    }

    pub async fn erc20_value(&self) -> Result<Option<Erc20Value>> {
        Ok(self.resolve().await?.overrides.erc20_value.clone())
    }

    /// Assembles an alloy transaction request for an external submitter.
    ///
    /// `extra_gas` is folded into the gas limit only when an explicit gas
    /// override is present; with no base limit the submitter estimates gas
    /// itself and reads `extra_gas()` separately.
    pub async fn to_transaction_request(&self) -> Result<TransactionRequest> {
        let args = self.resolve().await?;
        let calldata = self.descriptor.encode_calldata(&args.params)?;
        let raw = Bytes::from(hex::decode(&calldata[2..])?);

        let mut request = TransactionRequest::default()
            .to(self.contract.address)
            .input(raw.into())
            .with_chain_id(self.contract.chain_id);

        let overrides = &args.overrides;
        if let Some(value) = overrides.value {
            request = request.with_value(value);
        }
        if let Some(gas) = overrides.gas {
            request = request.with_gas_limit(gas + overrides.extra_gas.unwrap_or(0));
        }
        if let Some(gas_price) = overrides.gas_price {
            request = request.with_gas_price(gas_price);
        }
        if let Some(max_fee) = overrides.max_fee_per_gas {
            request = request.with_max_fee_per_gas(max_fee);
        }
        if let Some(max_priority_fee) = overrides.max_priority_fee_per_gas {
            request = request.with_max_priority_fee_per_gas(max_priority_fee);
        }
        if let Some(nonce) = overrides.nonce {
            request = request.with_nonce(nonce);
        }
        if let Some(access_list) = &overrides.access_list {
            request = request.with_access_list(access_list.clone());
        }

        Ok(request)
    }
}

impl std::fmt::Debug for PreparedCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedCall")
            .field("to", &self.contract.address)
            .field("chain_id", &self.contract.chain_id)
            .field("selector", &self.descriptor.selector)
            .finish_non_exhaustive()
    }
}
