//! Contract call description and the encoder seam.
//!
//! The pipeline never builds call data by hand. It describes the call as a
//! [`ContractCall`] (contract name, function name, typed arguments) and
//! hands it to a [`CallEncoder`], which knows the contract interfaces. The
//! `creditnet-contracts` crate provides the ABI-backed implementation.

use num_bigint::BigUint;
use serde::Serialize;
use thiserror::Error;

use crate::error::PrepareError;

// ---------------------------------------------------------------------------
// CallArg
// ---------------------------------------------------------------------------

/// A typed contract call argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum CallArg {
    /// A `0x`-prefixed 20-byte address.
    Address(String),
    /// An unsigned integer of any width up to 256 bits.
    Uint(#[serde(with = "crate::serde_helpers::biguint_string")] BigUint),
    /// A `0x`-prefixed 32-byte word, for `bytes32` or `uint256` parameters.
    Word(String),
    /// A dynamic array of arguments of one type.
    Array(Vec<CallArg>),
}

impl CallArg {
    /// An address argument.
    pub fn address(address: impl Into<String>) -> Self {
        Self::Address(address.into())
    }

    /// An unsigned integer argument.
    pub fn uint(value: impl Into<BigUint>) -> Self {
        Self::Uint(value.into())
    }

    /// A 32-byte word argument.
    pub fn word(word: impl Into<String>) -> Self {
        Self::Word(word.into())
    }

    /// An `address[]` argument.
    pub fn addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Array(addresses.into_iter().map(Self::address).collect())
    }

    /// Short name of the argument kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Uint(_) => "uint",
            Self::Word(_) => "word",
            Self::Array(_) => "array",
        }
    }
}

// ---------------------------------------------------------------------------
// ContractCall
// ---------------------------------------------------------------------------

/// A call to a named function of a named contract.
///
/// # Example
///
/// ```
/// use creditnet_client::{CallArg, ContractCall};
///
/// let call = ContractCall::new("CurrencyNetwork", "closeTrustlineByTriangularTransfer")
///     .arg(CallArg::address("0x00000000000000000000000000000000000000b0"))
///     .arg(CallArg::uint(0u32))
///     .arg(CallArg::addresses(Vec::<String>::new()));
/// assert_eq!(call.args().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractCall {
    contract: String,
    function: String,
    args: Vec<CallArg>,
}

impl ContractCall {
    /// Starts a call with no arguments.
    pub fn new(contract: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
            function: function.into(),
            args: Vec::new(),
        }
    }

    /// Appends the next positional argument.
    pub fn arg(mut self, arg: CallArg) -> Self {
        self.args.push(arg);
        self
    }

    /// Contract name.
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Function name.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Positional arguments.
    pub fn args(&self) -> &[CallArg] {
        &self.args
    }
}

// ---------------------------------------------------------------------------
// CallEncoder
// ---------------------------------------------------------------------------

/// Reasons a [`CallEncoder`] rejects a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// No interface is known for the contract.
    #[error("unknown contract {0}")]
    UnknownContract(String),

    /// The contract has no such function.
    #[error("{contract} has no function {function}")]
    UnknownFunction {
        /// Contract name.
        contract: String,
        /// Function name.
        function: String,
    },

    /// Wrong number of arguments.
    #[error("expected {expected} arguments, got {got}")]
    ArityMismatch {
        /// Parameters in the function signature.
        expected: usize,
        /// Arguments supplied.
        got: usize,
    },

    /// An argument does not fit its parameter type.
    #[error("argument {index} is not a valid {expected}: {reason}")]
    InvalidArgument {
        /// Zero-based argument position.
        index: usize,
        /// Solidity type of the parameter.
        expected: String,
        /// What was wrong with the value.
        reason: String,
    },
}

/// Turns a [`ContractCall`] into `0x`-prefixed call data.
///
/// Encoding is pure and synchronous; implementations must not do I/O.
pub trait CallEncoder: Send + Sync {
    /// Encodes `call`, selector included.
    fn encode(&self, call: &ContractCall) -> Result<String, EncodeError>;
}

/// Runs `encoder` and attributes a failure to the call that caused it.
pub(crate) fn encode_call(
    encoder: &dyn CallEncoder,
    call: &ContractCall,
) -> Result<String, PrepareError> {
    encoder
        .encode(call)
        .map_err(|e| PrepareError::AbiEncodingError {
            contract: call.contract().to_string(),
            function: call.function().to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rejecting;

    impl CallEncoder for Rejecting {
        fn encode(&self, _call: &ContractCall) -> Result<String, EncodeError> {
            Err(EncodeError::ArityMismatch {
                expected: 4,
                got: 3,
            })
        }
    }

    #[test]
    fn builder_keeps_argument_order() {
        let call = ContractCall::new("CurrencyNetwork", "transfer")
            .arg(CallArg::address("0xb"))
            .arg(CallArg::uint(100u32))
            .arg(CallArg::uint(1u32))
            .arg(CallArg::addresses(["0xm", "0xb"]));
        let kinds: Vec<_> = call.args().iter().map(CallArg::kind).collect();
        assert_eq!(kinds, ["address", "uint", "uint", "array"]);
    }

    #[test]
    fn encoder_failure_names_the_call() {
        let call = ContractCall::new("CurrencyNetwork", "transfer");
        let err = encode_call(&Rejecting, &call).unwrap_err();
        match err {
            PrepareError::AbiEncodingError {
                contract,
                function,
                reason,
            } => {
                assert_eq!(contract, "CurrencyNetwork");
                assert_eq!(function, "transfer");
                assert!(reason.contains("expected 4"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn call_arg_json_is_tagged() {
        let json = serde_json::to_value(CallArg::uint(7u32)).unwrap();
        assert_eq!(json["type"], "uint");
        assert_eq!(json["value"], "7");
    }
}
