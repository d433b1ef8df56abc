use alloy::{
    dyn_abi::{DynSolValue, Word},
    primitives::{Address, U256},
};
use anyhow::{anyhow, Result};
use serde_json::Value;
use std::str::FromStr;

use super::descriptor::FunctionDescriptor;

/// Converts JSON call parameters into the positional value list declared by
/// a descriptor.
///
/// Accepts either a JSON array (positional) or a JSON object keyed by the
/// declared parameter names; object entries are matched positionally by the
/// descriptor's input order, not by insertion order.
pub fn json_to_call_params(
    descriptor: &FunctionDescriptor,
    parameters: &Value,
) -> Result<Vec<DynSolValue>> {
    match parameters {
        Value::Array(params) => {
            if params.len() != descriptor.inputs.len() {
                let expected: Vec<String> = descriptor
                    .inputs
                    .iter()
                    .map(|input| format!("{} {}", input.ty, input.name))
                    .collect();
                return Err(anyhow!(
                    "Parameter count mismatch: expected {} parameters, got {}.\nExpected parameters: [{}]",
                    descriptor.inputs.len(),
                    params.len(),
                    expected.join(", ")
                ));
            }

            params
                .iter()
                .zip(descriptor.inputs)
                .enumerate()
                .map(|(i, (value, input))| {
                    json_to_dyn_sol_value(value, input.ty).map_err(|e| {
                        anyhow!(
                            "Invalid parameter #{} ('{}' of type '{}'): {}",
                            i + 1,
                            input.name,
                            input.ty,
                            e
                        )
                    })
                })
                .collect()
        }
        Value::Object(obj) => {
            let expected: Vec<String> = descriptor
                .inputs
                .iter()
                .map(|input| format!("{}: {}", input.name, input.ty))
                .collect();

            descriptor
                .inputs
                .iter()
                .map(|input| {
                    let value = obj.get(input.name).ok_or_else(|| {
                        anyhow!(
                            "Missing required parameter '{}' of type '{}'.\nExpected parameters: {{{}}}",
                            input.name,
                            input.ty,
                            expected.join(", ")
                        )
                    })?;
                    json_to_dyn_sol_value(value, input.ty).map_err(|e| {
                        anyhow!(
                            "Invalid parameter '{}' of type '{}': {}",
                            input.name,
                            input.ty,
                            e
                        )
                    })
                })
                .collect()
        }
        _ => {
            let expected: Vec<String> = descriptor
                .inputs
                .iter()
                .map(|input| format!("{}: {}", input.name, input.ty))
                .collect();
            Err(anyhow!(
                "Invalid parameter format. Parameters must be provided as either:\n1. Array: [value1, value2, ...]\n2. Object: {{{}}}",
                expected.join(", ")
            ))
        }
    }
}

/// Convert a JSON value to a DynSolValue based on the declared Solidity type.
pub fn json_to_dyn_sol_value(value: &Value, sol_type: &str) -> Result<DynSolValue> {
    match sol_type {
        "address" => {
            let addr_str = value
                .as_str()
                .ok_or_else(|| anyhow!("Address must be a string"))?;
            let address = Address::from_str(addr_str)?;
            Ok(DynSolValue::Address(address))
        }
        ty if ty.starts_with("uint") => {
            let bits = uint_size(ty)?;
            let num = match value {
                Value::Number(n) => {
                    if let Some(u) = n.as_u64() {
                        U256::from(u)
                    } else {
                        return Err(anyhow!("Invalid uint value"));
                    }
                }
                Value::String(s) => {
                    if let Some(hex_part) = s.strip_prefix("0x") {
                        U256::from_str_radix(hex_part, 16)
                            .map_err(|_| anyhow!("Invalid uint hex string: {}", s))?
                    } else {
                        U256::from_str(s).map_err(|_| anyhow!("Invalid uint string: {}", s))?
                    }
                }
                _ => return Err(anyhow!("Uint must be a number or string")),
            };
            Ok(DynSolValue::Uint(num, bits))
        }
        "string" => {
            let s = value
                .as_str()
                .ok_or_else(|| anyhow!("String parameter must be a string"))?;
            Ok(DynSolValue::String(s.to_string()))
        }
        "bool" => {
            let b = value
                .as_bool()
                .ok_or_else(|| anyhow!("Bool parameter must be a boolean"))?;
            Ok(DynSolValue::Bool(b))
        }
        ty if ty.starts_with("bytes") && ty != "bytes" => {
            // Fixed bytes (e.g. bytes32)
            let hex_str = value
                .as_str()
                .ok_or_else(|| anyhow!("Bytes must be a hex string"))?;
            let bytes = hex::decode(hex_str.trim_start_matches("0x"))
                .map_err(|_| anyhow!("Invalid hex string: {}", hex_str))?;

            let mut word_bytes = [0u8; 32];
            let len = bytes.len().min(32);
            word_bytes[..len].copy_from_slice(&bytes[..len]);
            Ok(DynSolValue::FixedBytes(Word::from(word_bytes), len))
        }
        "bytes" => {
            let hex_str = value
                .as_str()
                .ok_or_else(|| anyhow!("Bytes must be a hex string"))?;
            let bytes = hex::decode(hex_str.trim_start_matches("0x"))
                .map_err(|_| anyhow!("Invalid hex string: {}", hex_str))?;
            Ok(DynSolValue::Bytes(bytes))
        }
        ty if ty.ends_with("[]") => {
            let array = value
                .as_array()
                .ok_or_else(|| anyhow!("Array parameter must be an array"))?;
            let element_type = &ty[..ty.len() - 2];
            array
                .iter()
                .map(|element| json_to_dyn_sol_value(element, element_type))
                .collect::<Result<Vec<_>>>()
                .map(DynSolValue::Array)
        }
        _ => Err(anyhow!("Unsupported Solidity type: {}", sol_type)),
    }
}

/// Convert a decoded DynSolValue back to JSON for display.
pub fn dyn_sol_value_to_json(value: &DynSolValue) -> Result<Value> {
    match value {
        DynSolValue::Address(addr) => Ok(Value::String(format!("0x{:x}", addr))),
        DynSolValue::Uint(num, _) => Ok(Value::String(num.to_string())),
        DynSolValue::Int(num, _) => Ok(Value::String(num.to_string())),
        DynSolValue::Bool(b) => Ok(Value::Bool(*b)),
        DynSolValue::String(s) => Ok(Value::String(s.clone())),
        DynSolValue::Bytes(bytes) => Ok(Value::String(format!("0x{}", hex::encode(bytes)))),
        DynSolValue::FixedBytes(bytes, _) => Ok(Value::String(format!("0x{}", hex::encode(bytes)))),
        DynSolValue::Array(arr) | DynSolValue::Tuple(arr) => arr
            .iter()
            .map(dyn_sol_value_to_json)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        _ => Err(anyhow!("Unsupported DynSolValue type: {:?}", value)),
    }
}

fn uint_size(ty: &str) -> Result<usize> {
    let suffix = &ty["uint".len()..];
    if suffix.is_empty() {
        return Ok(256);
    }
    let bits: usize = suffix
        .parse()
        .map_err(|_| anyhow!("Invalid uint width in type '{}'", ty))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(anyhow!("Invalid uint width in type '{}'", ty));
    }
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ethereum::descriptor::AbiParam;
    use serde_json::json;

    static SET_APPROVAL: FunctionDescriptor = FunctionDescriptor::new(
        "0x00000000",
        &[
            AbiParam::new("address", "operator"),
            AbiParam::new("bool", "approved"),
        ],
        &[],
    );

    #[test]
    fn test_positional_params() {
        let values = json_to_call_params(
            &SET_APPROVAL,
            &json!(["0x742d35Cc6435C9c1c72c5E7b18BaB7e1DB7a5d6e", true]),
        )
        .unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[1], DynSolValue::Bool(true));
    }

    #[test]
    fn test_named_params_follow_declared_order() {
        // Object key order is irrelevant; the descriptor's input order wins.
        let values = json_to_call_params(
            &SET_APPROVAL,
            &json!({
                "approved": false,
                "operator": "0x742d35Cc6435C9c1c72c5E7b18BaB7e1DB7a5d6e"
            }),
        )
        .unwrap();
        assert!(matches!(values[0], DynSolValue::Address(_)));
        assert_eq!(values[1], DynSolValue::Bool(false));
    }

    #[test]
    fn test_missing_named_param() {
        let err = json_to_call_params(&SET_APPROVAL, &json!({ "approved": true })).unwrap_err();
        assert!(err.to_string().contains("Missing required parameter 'operator'"));
    }

    #[test]
    fn test_sized_uint_width_is_preserved() {
        let value = json_to_dyn_sol_value(&json!(250), "uint16").unwrap();
        assert_eq!(value, DynSolValue::Uint(U256::from(250u64), 16));
    }

    #[test]
    fn test_uint_from_hex_and_decimal_strings() {
        assert_eq!(
            json_to_dyn_sol_value(&json!("0xff"), "uint256").unwrap(),
            DynSolValue::Uint(U256::from(255u64), 256)
        );
        assert_eq!(
            json_to_dyn_sol_value(&json!("1000"), "uint256").unwrap(),
            DynSolValue::Uint(U256::from(1000u64), 256)
        );
    }

    #[test]
    fn test_rejects_unknown_type() {
        assert!(json_to_dyn_sol_value(&json!(1), "float64").is_err());
        assert!(json_to_dyn_sol_value(&json!(1), "uint7").is_err());
    }

    #[test]
    fn test_value_to_json_round_trip_shapes() {
        let json = dyn_sol_value_to_json(&DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(42u64), 256),
            DynSolValue::String("hello".to_string()),
        ]))
        .unwrap();
        assert_eq!(json, json!(["42", "hello"]));
    }
}
