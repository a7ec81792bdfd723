//! Error types for the preparation pipeline.
//!
//! Every public preparation operation returns a [`PrepareError`]. Variants
//! that wrap a relay failure keep the [`RelayError`] as their source and name
//! the network or address the failing request was about, so "no route
//! exists" ([`PrepareError::NoPathFound`]) never gets confused with "could
//! not reach the path service" ([`PrepareError::PathQueryFailed`]).

use std::fmt;

use thiserror::Error;

use crate::relay::RelayError;

/// The pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Raw/decimal amount conversion.
    Amount,
    /// Decimals resolution for a currency network.
    Decimals,
    /// Path negotiation with the relay.
    PathFinding,
    /// Delegation fee quote or gas price resolution.
    FeeQuote,
    /// Nonce resolution.
    Nonce,
    /// Contract call encoding.
    Encoding,
    /// Shield argument validation and shield path checks.
    Shield,
    /// Shielded network or gateway lookup.
    Lookup,
    /// Submission of a signed transaction.
    Relay,
    /// External signer.
    Signing,
    /// Caller supplied transaction options.
    Options,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Amount => "amount conversion",
            Self::Decimals => "decimals resolution",
            Self::PathFinding => "path finding",
            Self::FeeQuote => "fee negotiation",
            Self::Nonce => "nonce resolution",
            Self::Encoding => "call encoding",
            Self::Shield => "shield preparation",
            Self::Lookup => "network lookup",
            Self::Relay => "relaying",
            Self::Signing => "signing",
            Self::Options => "option validation",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while preparing a transaction.
#[derive(Debug, Error)]
pub enum PrepareError {
    /// The value carries more significant fractional digits than the
    /// network's decimals allow.
    #[error("invalid amount precision: {value} has more than {decimals} significant fractional digits")]
    InvalidAmountPrecision {
        /// The value as given by the caller.
        value: String,
        /// Decimals of the target representation.
        decimals: u32,
    },

    /// The value is not a non-negative decimal number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Decimals of a currency network could not be fetched.
    #[error("could not resolve decimals of network {network}: {source}")]
    DecimalsUnavailable {
        /// The currency network queried.
        network: String,
        /// Underlying relay failure.
        #[source]
        source: RelayError,
    },

    /// The path service could not be reached or answered with garbage.
    #[error("error while finding a path in network {network}: {source}")]
    PathQueryFailed {
        /// The currency network queried.
        network: String,
        /// Underlying relay failure.
        #[source]
        source: RelayError,
    },

    /// The path service answered, but there is no route with enough capacity.
    #[error("could not find a path with enough capacity in network {network}")]
    NoPathFound {
        /// The currency network queried.
        network: String,
    },

    /// No path from the account to the gateway of a shielded network.
    #[error("no path to mint: no route to the gateway of network {network}")]
    NoMintPath {
        /// The shielded network's backing currency network.
        network: String,
    },

    /// No path from the gateway of a shielded network back to the account.
    #[error("no path to burn: no route from the gateway of network {network}")]
    NoBurnPath {
        /// The shielded network's backing currency network.
        network: String,
    },

    /// Path options failed validation.
    #[error("invalid path options: {0}")]
    InvalidPathOptions(String),

    /// The relay could not quote a delegation fee or a gas price.
    #[error("error while negotiating fees: {source}")]
    FeeQuoteFailed {
        /// Underlying relay failure.
        #[source]
        source: RelayError,
    },

    /// The nonce of the sending account could not be fetched.
    #[error("error while resolving the nonce of {address}: {source}")]
    NonceResolutionFailed {
        /// The sending account or identity.
        address: String,
        /// Underlying relay failure.
        #[source]
        source: RelayError,
    },

    /// The contract call could not be encoded.
    #[error("error while encoding {contract}.{function}: {reason}")]
    AbiEncodingError {
        /// Contract name, e.g. `CurrencyNetwork`.
        contract: String,
        /// Function name, e.g. `transfer`.
        function: String,
        /// What the encoder rejected.
        reason: String,
    },

    /// A proof, public input or commitment is malformed.
    #[error("invalid shield argument: {0}")]
    ShieldArgumentInvalid(String),

    /// Caller supplied transaction options are unusable.
    #[error("invalid transaction options: {0}")]
    InvalidTxOptions(String),

    /// The shielded network or its gateway could not be looked up.
    #[error("error while looking up {what}: {source}")]
    LookupFailed {
        /// What was being looked up, e.g. `gateway of 0xabc`.
        what: String,
        /// Underlying relay failure.
        #[source]
        source: RelayError,
    },

    /// A signed transaction could not be submitted.
    #[error("error while relaying transaction: {source}")]
    RelayFailed {
        /// Underlying relay failure.
        #[source]
        source: RelayError,
    },

    /// The external signer refused or failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

impl PrepareError {
    /// Returns the pipeline stage this error originated from.
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidAmountPrecision { .. } | Self::InvalidAmount(_) => Stage::Amount,
            Self::DecimalsUnavailable { .. } => Stage::Decimals,
            Self::PathQueryFailed { .. } | Self::NoPathFound { .. } | Self::InvalidPathOptions(_) => {
                Stage::PathFinding
            }
            Self::NoMintPath { .. } | Self::NoBurnPath { .. } | Self::ShieldArgumentInvalid(_) => {
                Stage::Shield
            }
            Self::FeeQuoteFailed { .. } => Stage::FeeQuote,
            Self::NonceResolutionFailed { .. } => Stage::Nonce,
            Self::AbiEncodingError { .. } => Stage::Encoding,
            Self::InvalidTxOptions(_) => Stage::Options,
            Self::LookupFailed { .. } => Stage::Lookup,
            Self::RelayFailed { .. } => Stage::Relay,
            Self::SigningFailed(_) => Stage::Signing,
        }
    }

    /// Returns `true` if the relay answered but no route exists. Transport
    /// failures of the path service return `false`.
    pub fn is_missing_path(&self) -> bool {
        matches!(
            self,
            Self::NoPathFound { .. } | Self::NoMintPath { .. } | Self::NoBurnPath { .. }
        )
    }
}
