use alloy::dyn_abi::{DynSolType, DynSolValue};
use anyhow::{anyhow, Result};

/// A single ABI parameter as declared in a function signature.
///
/// `ty` is the canonical Solidity type string ("uint256", "address",
/// "(uint256,address)" for tuples, "uint256[]" for arrays). `name` may be
/// empty for unnamed outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbiParam {
    pub ty: &'static str,
    pub name: &'static str,
}

impl AbiParam {
    pub const fn new(ty: &'static str, name: &'static str) -> Self {
        Self { ty, name }
    }
}

/// A canonical contract-function descriptor: the 4-byte selector plus the
/// ordered input and output parameter lists.
///
/// One static instance exists per known contract function (see the tables in
/// `crate::extensions`); every encode/decode/call/probe operation for that
/// function is keyed to its descriptor. Selector constants are lowercase
/// 0x-prefixed hex by convention, and the probe performs no normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub selector: &'static str,
    pub inputs: &'static [AbiParam],
    pub outputs: &'static [AbiParam],
}

impl FunctionDescriptor {
    pub const fn new(
        selector: &'static str,
        inputs: &'static [AbiParam],
        outputs: &'static [AbiParam],
    ) -> Self {
        Self {
            selector,
            inputs,
            outputs,
        }
    }

    /// Reports whether this function is available on a contract, given the
    /// set of 4-byte selectors exposed by that contract (from ABI or
    /// bytecode introspection).
    ///
    /// Pure set membership: exact, case-sensitive string comparison, no
    /// network call. An empty selector set always yields `false`.
    pub fn is_supported(&self, available_selectors: &[String]) -> bool {
        available_selectors.iter().any(|s| s == self.selector)
    }

    /// The selector as raw bytes.
    pub fn selector_bytes(&self) -> Result<[u8; 4]> {
        let stripped = self
            .selector
            .strip_prefix("0x")
            .ok_or_else(|| anyhow!("Selector '{}' is missing the 0x prefix", self.selector))?;
        let bytes = hex::decode(stripped)
            .map_err(|e| anyhow!("Selector '{}' is not valid hex: {}", self.selector, e))?;
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| anyhow!("Selector '{}' is not exactly 4 bytes", self.selector))
    }

    pub fn input_types(&self) -> Result<Vec<DynSolType>> {
        Self::parse_types(self.inputs)
    }

    pub fn output_types(&self) -> Result<Vec<DynSolType>> {
        Self::parse_types(self.outputs)
    }

    fn parse_types(params: &[AbiParam]) -> Result<Vec<DynSolType>> {
        params
            .iter()
            .map(|p| {
                DynSolType::parse(p.ty)
                    .map_err(|e| anyhow!("Invalid Solidity type '{}': {}", p.ty, e))
            })
            .collect()
    }

    /// ABI-encodes a parameter tuple matching this descriptor's inputs,
    /// returning 0x-prefixed hex.
    ///
    /// Values are checked for arity and type against the declared inputs
    /// before encoding; a mismatch is a hard error, never a silent coercion.
    pub fn encode_params(&self, values: &[DynSolValue]) -> Result<String> {
        if values.len() != self.inputs.len() {
            let expected: Vec<String> = self
                .inputs
                .iter()
                .map(|p| format!("{} {}", p.ty, p.name))
                .collect();
            return Err(anyhow!(
                "Parameter count mismatch: expected {} parameters, got {}.\nExpected parameters: [{}]",
                self.inputs.len(),
                values.len(),
                expected.join(", ")
            ));
        }

        let types = self.input_types()?;
        for (i, (ty, value)) in types.iter().zip(values).enumerate() {
            if !ty.matches(value) {
                return Err(anyhow!(
                    "Parameter #{} ('{}') does not match declared type '{}'",
                    i + 1,
                    self.inputs[i].name,
                    self.inputs[i].ty
                ));
            }
        }

        let encoded = DynSolValue::Tuple(values.to_vec()).abi_encode_params();
        Ok(format!("0x{}", hex::encode(encoded)))
    }

    /// Builds the full calldata hex for this function: selector followed by
    /// the ABI-encoded parameters.
    ///
    /// The concatenation strips the 0x prefix produced by `encode_params`
    /// rather than re-encoding through a generic concat path; the result is
    /// byte-for-byte identical to `selector || abi_encode(params)` (pinned
    /// by a test against the general-purpose codec).
    pub fn encode_calldata(&self, values: &[DynSolValue]) -> Result<String> {
        let params = self.encode_params(values)?;
        Ok(format!("{}{}", self.selector, &params[2..]))
    }

    /// Decodes a raw call result per this descriptor's outputs.
    ///
    /// Single-output functions yield the value itself; multi-output
    /// functions yield a tuple. An empty output list decodes to an empty
    /// tuple regardless of the data.
    pub fn decode_output(&self, data: &[u8]) -> Result<DynSolValue> {
        if self.outputs.is_empty() {
            return Ok(DynSolValue::Tuple(Vec::new()));
        }

        let types = self.output_types()?;
        let decoded = DynSolType::Tuple(types)
            .abi_decode_params(data)
            .map_err(|e| anyhow!("Failed to decode output: {}", e))?;

        match decoded {
            DynSolValue::Tuple(mut values) if self.outputs.len() == 1 => values
                .pop()
                .ok_or_else(|| anyhow!("Decoded output tuple was empty")),
            other => Ok(other),
        }
    }
}
