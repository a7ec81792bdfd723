//! # Client Configuration & Constants
//!
//! Every magic number of the preparation pipeline lives here, together with
//! the [`ClientConfig`] a [`crate::CreditNetClient`] is constructed from.
//!
//! Contract names and the proof shape are part of the wire contract with the
//! deployed verifier contracts. Changing them without redeploying the
//! contracts produces call data the chain will reject.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Decimals of the native coin. 1 coin = 10^18 wei.
pub const NATIVE_DECIMALS: u32 = 18;

/// Decimals between gwei (how gas prices are quoted) and wei (how they are
/// signed).
pub const GAS_PRICE_DECIMALS: u32 = 9;

/// Gas limit used when the caller gives no override and the relay gave no
/// estimate for the call.
pub const DEFAULT_GAS_LIMIT: u64 = 600_000;

/// Gas limit of a plain native-value transfer.
pub const VALUE_TRANSFER_GAS_LIMIT: u64 = 21_000;

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Contract name of a currency network, as known to the ABI encoder.
pub const CURRENCY_NETWORK_CONTRACT: &str = "CurrencyNetwork";

/// Contract name of a shield attached to a currency network.
pub const SHIELD_CONTRACT: &str = "CurrencyNetworkShield";

/// A Groth16 proof is A (2 elements), B (4 elements) and C (2 elements).
pub const GROTH16_PROOF_ELEMENTS: usize = 8;

/// Width of a BN254 field element on the wire, in bytes.
pub const FIELD_ELEMENT_BYTES: usize = 32;

/// Width of a field element in hex digits, without the `0x` prefix.
pub const FIELD_ELEMENT_HEX_DIGITS: usize = FIELD_ELEMENT_BYTES * 2;

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

/// Relay API used when nothing else is configured. Points at a local
/// development relay.
pub const DEFAULT_RELAY_API_URL: &str = "http://localhost:5000/api/v1";

/// Per-request timeout for relay calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// WalletType
// ---------------------------------------------------------------------------

/// How the loaded wallet pays for gas.
///
/// `Ethers` wallets are plain externally owned accounts: they sign raw
/// transactions and pay gas in the native coin. `Identity` wallets are
/// contract identities: they sign meta-transactions that a relayer submits,
/// paying the relayer a delegation fee in a currency network instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WalletType {
    /// Self-custody account. Gas is self-paid.
    #[default]
    Ethers,
    /// Identity contract. Gas is paid by the relayer.
    Identity,
}

impl fmt::Display for WalletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ethers => write!(f, "ethers"),
            Self::Identity => write!(f, "identity"),
        }
    }
}

impl FromStr for WalletType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ethers" | "wallettypeethers" => Ok(Self::Ethers),
            "identity" | "wallettypeidentity" => Ok(Self::Identity),
            other => Err(format!("unknown wallet type: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Runtime configuration of a [`crate::CreditNetClient`].
///
/// The wallet type is a property of the [`crate::Account`], not of the
/// client, and is not configured here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Base URL of the relay REST API, e.g. `https://relay.example/api/v1`.
    pub relay_api_url: String,
    /// Gas limit used when neither an override nor an estimate exists.
    pub default_gas_limit: u64,
    /// Timeout for a single relay request.
    #[serde(with = "crate::serde_helpers::duration_secs")]
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_api_url: DEFAULT_RELAY_API_URL.to_string(),
            default_gas_limit: DEFAULT_GAS_LIMIT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
