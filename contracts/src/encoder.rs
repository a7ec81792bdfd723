//! ABI encoding of contract calls with `alloy`'s dynamic ABI.

use std::collections::HashMap;
use std::str::FromStr;

use alloy::dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier};
use alloy::json_abi::Function;
use alloy::primitives::{Address, B256, U256};
use num_bigint::BigUint;
use thiserror::Error;
use tracing::trace;

use creditnet_client::{CallArg, CallEncoder, ContractCall, EncodeError};

use crate::catalog::{self, ContractInterface};

/// A signature in the catalog could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid signature {signature:?} for {contract}: {reason}")]
pub struct CatalogError {
    /// Contract the signature was registered for.
    pub contract: String,
    /// The offending signature.
    pub signature: String,
    /// Parser error.
    pub reason: String,
}

/// Encodes [`ContractCall`]s against a table of parsed function signatures.
///
/// # Example
///
/// ```
/// use creditnet_client::{CallArg, CallEncoder, ContractCall};
/// use creditnet_contracts::AbiEncoder;
///
/// let encoder = AbiEncoder::new().unwrap();
/// let call = ContractCall::new("CurrencyNetwork", "closeTrustlineByTriangularTransfer")
///     .arg(CallArg::address("0x00000000000000000000000000000000000000b0"))
///     .arg(CallArg::uint(0u32))
///     .arg(CallArg::addresses(Vec::<String>::new()));
/// let data = encoder.encode(&call).unwrap();
/// assert!(data.starts_with("0x3502f73e"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AbiEncoder {
    contracts: HashMap<String, HashMap<String, Function>>,
}

impl AbiEncoder {
    /// An encoder for every interface in [`catalog::ALL`].
    pub fn new() -> Result<Self, CatalogError> {
        let mut encoder = Self::default();
        for interface in catalog::ALL {
            encoder.register_interface(interface)?;
        }
        Ok(encoder)
    }

    /// Adds all functions of `interface`.
    pub fn register_interface(&mut self, interface: &ContractInterface) -> Result<(), CatalogError> {
        for signature in interface.functions {
            self.register(interface.name, signature)?;
        }
        Ok(())
    }

    /// Adds one function signature, e.g. `transfer(address,uint64)`, to
    /// `contract`. Overloads are not supported: a later registration of the
    /// same name replaces the earlier one.
    pub fn register(&mut self, contract: &str, signature: &str) -> Result<(), CatalogError> {
        let function = Function::parse(signature).map_err(|e| CatalogError {
            contract: contract.to_string(),
            signature: signature.to_string(),
            reason: e.to_string(),
        })?;
        self.contracts
            .entry(contract.to_string())
            .or_default()
            .insert(function.name.clone(), function);
        Ok(())
    }

    fn function(&self, call: &ContractCall) -> Result<&Function, EncodeError> {
        self.contracts
            .get(call.contract())
            .ok_or_else(|| EncodeError::UnknownContract(call.contract().to_string()))?
            .get(call.function())
            .ok_or_else(|| EncodeError::UnknownFunction {
                contract: call.contract().to_string(),
                function: call.function().to_string(),
            })
    }
}

impl CallEncoder for AbiEncoder {
    fn encode(&self, call: &ContractCall) -> Result<String, EncodeError> {
        let function = self.function(call)?;
        if function.inputs.len() != call.args().len() {
            return Err(EncodeError::ArityMismatch {
                expected: function.inputs.len(),
                got: call.args().len(),
            });
        }

        let values = function
            .inputs
            .iter()
            .zip(call.args())
            .enumerate()
            .map(|(index, (param, arg))| {
                let invalid = |reason: String| EncodeError::InvalidArgument {
                    index,
                    expected: param.ty.clone(),
                    reason,
                };
                let ty = param.resolve().map_err(|e| invalid(e.to_string()))?;
                to_sol_value(&ty, arg).map_err(invalid)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let data = function
            .abi_encode_input(&values)
            .map_err(|e| EncodeError::InvalidArgument {
                index: 0,
                expected: function.signature(),
                reason: e.to_string(),
            })?;
        trace!(
            contract = call.contract(),
            function = %function.signature(),
            bytes = data.len(),
            "call encoded"
        );
        Ok(format!("0x{}", hex::encode(data)))
    }
}

// ---------------------------------------------------------------------------
// Argument conversion
// ---------------------------------------------------------------------------

fn to_sol_value(ty: &DynSolType, arg: &CallArg) -> Result<DynSolValue, String> {
    match (ty, arg) {
        (DynSolType::Address, CallArg::Address(s)) => Address::from_str(s)
            .map(DynSolValue::Address)
            .map_err(|e| format!("{s:?}: {e}")),

        (DynSolType::Uint(bits), CallArg::Uint(n)) => uint(n, *bits),
        (DynSolType::Uint(bits), CallArg::Word(w)) => uint(&BigUint::from_bytes_be(&decode_hex(w)?), *bits),

        (DynSolType::FixedBytes(size), CallArg::Word(w)) => {
            let bytes = decode_hex(w)?;
            if bytes.len() != *size {
                return Err(format!("{w:?} is {} bytes, expected {size}", bytes.len()));
            }
            let mut word = B256::ZERO;
            word[..*size].copy_from_slice(&bytes);
            Ok(DynSolValue::FixedBytes(word, *size))
        }

        (DynSolType::Array(inner), CallArg::Array(items)) => items
            .iter()
            .map(|item| to_sol_value(inner, item))
            .collect::<Result<Vec<_>, _>>()
            .map(DynSolValue::Array),

        (DynSolType::FixedArray(inner, len), CallArg::Array(items)) => {
            if items.len() != *len {
                return Err(format!("{} elements, expected {len}", items.len()));
            }
            items
                .iter()
                .map(|item| to_sol_value(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::FixedArray)
        }

        (ty, arg) => Err(format!("cannot pass a {} as {ty}", arg.kind())),
    }
}

fn uint(n: &BigUint, bits: usize) -> Result<DynSolValue, String> {
    if n.bits() > bits as u64 {
        return Err(format!("{n} does not fit in uint{bits}"));
    }
    U256::try_from_be_slice(&n.to_bytes_be())
        .map(|v| DynSolValue::Uint(v, bits))
        .ok_or_else(|| format!("{n} does not fit in 256 bits"))
}

fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| format!("{s:?} is not 0x-prefixed"))?;
    hex::decode(digits).map_err(|e| format!("{s:?}: {e}"))
}
