//! Value types produced by the transaction stage.
//!
//! [`TxObject`] is the output of every preparation entry point. Its fee
//! fields are mode-exclusive: a self-paid transaction carries non-zero
//! `ethFees` and no delegation fee, a relayer-paid one carries a delegation
//! fee and zero `ethFees`. The constructors are crate-private so no other
//! combination can be built.

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::config::NATIVE_DECIMALS;
use crate::error::PrepareError;

// ---------------------------------------------------------------------------
// RawTx
// ---------------------------------------------------------------------------

/// The canonical unsigned transaction handed to the signer.
///
/// In relayer-paid mode `gas_price` is zero and the two delegation fields are
/// set; in self-paid mode they are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTx {
    /// Sending account (self-paid) or identity contract (relayer-paid).
    pub from: String,
    /// Called contract or value recipient.
    pub to: String,
    /// Native value attached, in wei.
    #[serde(with = "crate::serde_helpers::biguint_string")]
    pub value: BigUint,
    /// Gas limit.
    pub gas_limit: u64,
    /// Gas price in wei.
    #[serde(with = "crate::serde_helpers::biguint_string")]
    pub gas_price: BigUint,
    /// `0x`-prefixed call data. `0x` for plain value transfers.
    pub data: String,
    /// Account nonce (self-paid) or identity nonce (relayer-paid).
    pub nonce: u64,
    /// Raw delegation fee, relayer-paid mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegation_fees: Option<String>,
    /// Currency network the delegation fee is paid in, relayer-paid only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_network_of_fees: Option<String>,
}

// ---------------------------------------------------------------------------
// DelegationFeesObject
// ---------------------------------------------------------------------------

/// Fee paid to the relayer for submitting a meta-transaction.
///
/// Denominated in a currency network of the relayer's choosing, which is
/// why the network travels with the amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationFeesObject {
    #[serde(flatten)]
    amount: Amount,
    currency_network_of_fees: String,
}

impl DelegationFeesObject {
    /// Pairs a fee amount with the network it is paid in.
    pub fn new(amount: Amount, currency_network_of_fees: impl Into<String>) -> Self {
        Self {
            amount,
            currency_network_of_fees: currency_network_of_fees.into(),
        }
    }

    /// The fee amount.
    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    /// The raw fee.
    pub fn raw(&self) -> &BigUint {
        self.amount.raw()
    }

    /// The fee as a decimal.
    pub fn value(&self) -> &str {
        self.amount.value()
    }

    /// Decimals of the fee network.
    pub fn decimals(&self) -> u32 {
        self.amount.decimals()
    }

    /// Currency network the fee is paid in. Empty for a zero fee the relay
    /// did not attach to any network.
    pub fn currency_network_of_fees(&self) -> &str {
        &self.currency_network_of_fees
    }
}

// ---------------------------------------------------------------------------
// TxObject
// ---------------------------------------------------------------------------

/// A prepared, unsigned transaction together with what it will cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxObject {
    raw_tx: RawTx,
    eth_fees: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    delegation_fees: Option<DelegationFeesObject>,
}

impl TxObject {
    /// Self-paid transaction: gas is paid in the native coin.
    pub(crate) fn self_paid(raw_tx: RawTx, eth_fees: Amount) -> Result<Self, PrepareError> {
        if eth_fees.is_zero() {
            return Err(PrepareError::InvalidTxOptions(
                "a self-paid transaction needs a non-zero gas price and gas limit".into(),
            ));
        }
        Ok(Self {
            raw_tx,
            eth_fees,
            delegation_fees: None,
        })
    }

    /// Relayer-paid transaction: the signer pays nothing in the native coin.
    pub(crate) fn delegated(raw_tx: RawTx, delegation_fees: DelegationFeesObject) -> Self {
        Self {
            raw_tx,
            eth_fees: Amount::zero(NATIVE_DECIMALS),
            delegation_fees: Some(delegation_fees),
        }
    }

    /// The unsigned transaction.
    pub fn raw_tx(&self) -> &RawTx {
        &self.raw_tx
    }

    /// Native-coin gas cost. Zero in relayer-paid mode.
    pub fn eth_fees(&self) -> &Amount {
        &self.eth_fees
    }

    /// Relayer fee. `None` in self-paid mode.
    pub fn delegation_fees(&self) -> Option<&DelegationFeesObject> {
        self.delegation_fees.as_ref()
    }

    /// Returns `true` if a relayer pays the gas.
    pub fn is_delegated(&self) -> bool {
        self.delegation_fees.is_some()
    }

    /// Consumes the object, returning the unsigned transaction.
    pub fn into_raw_tx(self) -> RawTx {
        self.raw_tx
    }
}

// ---------------------------------------------------------------------------
// MetaTransaction
// ---------------------------------------------------------------------------

/// A transaction an identity contract executes on behalf of its owner, as
/// the relay expects it. All numbers are base-10 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTransaction {
    /// Identity contract executing the call.
    pub from: String,
    /// Called contract.
    pub to: String,
    /// Native value in wei.
    pub value: String,
    /// `0x`-prefixed call data.
    pub data: String,
    /// Raw delegation fee.
    pub delegation_fees: String,
    /// Currency network of the delegation fee.
    pub currency_network_of_fees: String,
    /// Identity nonce.
    pub nonce: String,
    /// Extra data for the identity contract. `0x` when unused.
    pub extra_data: String,
    /// Owner signature, set by the signer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl MetaTransaction {
    /// The meta-transaction a raw transaction describes. Missing delegation
    /// fields become a zero fee.
    pub fn from_raw_tx(raw_tx: &RawTx) -> Self {
        Self {
            from: raw_tx.from.clone(),
            to: raw_tx.to.clone(),
            value: raw_tx.value.to_string(),
            data: raw_tx.data.clone(),
            delegation_fees: raw_tx
                .delegation_fees
                .clone()
                .unwrap_or_else(|| BigUint::zero().to_string()),
            currency_network_of_fees: raw_tx.currency_network_of_fees.clone().unwrap_or_default(),
            nonce: raw_tx.nonce.to_string(),
            extra_data: "0x".to_string(),
            signature: None,
        }
    }
}

// ---------------------------------------------------------------------------
// TxOptions
// ---------------------------------------------------------------------------

/// Caller overrides for a single preparation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOptions {
    /// Gas price in gwei, decimal. Overrides the relay's suggestion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    /// Gas limit. Overrides the relay's estimate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    /// Native value to attach, decimal in coins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}
