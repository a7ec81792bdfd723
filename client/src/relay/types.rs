//! Wire types of the Relay Service REST API.
//!
//! Field names follow the relay's camelCase JSON. Monetary integers travel
//! as base-10 strings; see [`crate::serde_helpers`].

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::path::FeePayer;

/// `GET networks/{network}`: the parts of a network's details this crate
/// consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDetails {
    /// Contract address of the currency network.
    pub address: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Short ticker, e.g. `EUR`.
    #[serde(default)]
    pub abbreviation: String,
    /// Decimals of the network's amounts.
    pub decimals: u32,
    /// Decimals of the network's interest rates.
    #[serde(default)]
    pub interest_rate_decimals: u32,
}

/// A currency network as returned by the shield and gateway lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
    /// Contract address of the currency network.
    pub address: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Short ticker.
    #[serde(default)]
    pub abbreviation: String,
}

/// `GET networks/{network}/gateway`: the liquidity entry/exit account of a
/// shielded network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gateway {
    /// Address of the gateway account in the backing currency network.
    pub address: String,
}

/// Body of `POST networks/{network}/path-info` and `close-path-info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRequest {
    /// Account the payment starts at.
    pub from: String,
    /// Account the payment ends at.
    pub to: String,
    /// Raw value to transfer (payment) or residual to target (close).
    pub value: String,
    /// Upper bound on the fees, forwarded verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fees: Option<String>,
    /// Upper bound on the number of hops.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hops: Option<u32>,
    /// Who pays the mediator fees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_payer: Option<FeePayer>,
}

/// Response of `path-info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResponse {
    /// Accounts from sender to receiver. Empty when no route exists.
    #[serde(default)]
    pub path: Vec<String>,
    /// Raw upper bound on the fees along the path.
    #[serde(with = "crate::serde_helpers::biguint_string")]
    pub fees: BigUint,
    /// Gas estimate for the transfer along the path.
    #[serde(default, with = "crate::serde_helpers::u64_flexible")]
    pub estimated_gas: u64,
    /// Who pays the mediator fees.
    #[serde(default)]
    pub fee_payer: Option<FeePayer>,
}

/// Response of `close-path-info`: a path response plus the residual value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePathResponse {
    /// Triangulation path. Empty when the trustline cannot be closed.
    #[serde(default)]
    pub path: Vec<String>,
    /// Raw upper bound on the fees along the path.
    #[serde(with = "crate::serde_helpers::biguint_string")]
    pub fees: BigUint,
    /// Raw value the triangulation moves.
    #[serde(with = "crate::serde_helpers::biguint_string")]
    pub value: BigUint,
    /// Gas estimate for the closing transfer.
    #[serde(default, with = "crate::serde_helpers::u64_flexible")]
    pub estimated_gas: u64,
    /// Who pays the mediator fees.
    #[serde(default)]
    pub fee_payer: Option<FeePayer>,
}

/// `GET users/{address}/txinfos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxInfos {
    /// Transaction count of the account.
    #[serde(with = "crate::serde_helpers::u64_flexible")]
    pub nonce: u64,
    /// Suggested gas price, integer in wei.
    pub gas_price: String,
    /// Native balance of the account.
    pub balance: String,
}

/// `GET identities/{address}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityInfos {
    /// Address of the identity contract.
    pub identity: String,
    /// Next meta-transaction nonce of the identity.
    #[serde(with = "crate::serde_helpers::u64_flexible")]
    pub next_nonce: u64,
    /// Native balance of the identity.
    pub balance: String,
}

/// One delegation fee offer of `POST meta-transaction-fees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTransactionFees {
    /// Raw fee the relayer asks for.
    pub delegation_fees: String,
    /// Currency network the fee is paid in, chosen by the relayer.
    pub currency_network_of_fees: String,
}
