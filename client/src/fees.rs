//! Who pays the gas, and how much.
//!
//! In self-paid mode (`ethers` wallets) the signer pays gas in the native
//! coin, at the caller's gas price or the relay's suggestion. In
//! relayer-paid mode (`identity` wallets) a relayer submits the transaction
//! as a meta-transaction and asks for a delegation fee in some currency
//! network in return. Exactly one of the two applies to any transaction.

use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{debug, instrument, warn};

use crate::amount::{to_amount, to_raw, Amount};
use crate::config::{WalletType, GAS_PRICE_DECIMALS};
use crate::decimals::DecimalsCache;
use crate::error::PrepareError;
use crate::relay::{RelayApi, RelayError};
use crate::transaction::{DelegationFeesObject, MetaTransaction, TxOptions};

/// Outcome of fee negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeDecision {
    /// The signer pays `gas_price * gas_limit` in the native coin.
    SelfPaid {
        /// Gas price in wei.
        gas_price: BigUint,
        /// Gas limit.
        gas_limit: u64,
    },
    /// A relayer pays the gas and charges `delegation_fees`.
    Delegated {
        /// The relayer's fee and its network.
        delegation_fees: DelegationFeesObject,
    },
}

/// A fully determined call waiting for its fee terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    /// Sending account or identity.
    pub from: String,
    /// Called contract or value recipient.
    pub to: String,
    /// Native value in wei.
    pub value: BigUint,
    /// Encoded call data.
    pub data: String,
    /// Resolved nonce.
    pub nonce: u64,
    /// Resolved gas limit.
    pub gas_limit: u64,
    /// Gas price the relay suggested alongside the nonce, integer in wei.
    pub quoted_gas_price: Option<String>,
}

/// Decides the fee terms of a pending call.
pub struct FeeDelegationNegotiator {
    relay: Arc<dyn RelayApi>,
    decimals: Arc<DecimalsCache>,
}

impl FeeDelegationNegotiator {
    /// Creates a negotiator sharing the client's relay and decimals cache.
    pub fn new(relay: Arc<dyn RelayApi>, decimals: Arc<DecimalsCache>) -> Self {
        Self { relay, decimals }
    }

    /// Negotiates the fee terms of `pending` for a wallet of type `wallet`.
    #[instrument(skip(self, pending, options), fields(from = %pending.from, to = %pending.to))]
    pub async fn negotiate(
        &self,
        wallet: WalletType,
        pending: &PendingCall,
        options: &TxOptions,
    ) -> Result<FeeDecision, PrepareError> {
        match wallet {
            WalletType::Ethers => self.self_paid(pending, options).await,
            WalletType::Identity => self.delegated(pending).await,
        }
    }

    async fn self_paid(
        &self,
        pending: &PendingCall,
        options: &TxOptions,
    ) -> Result<FeeDecision, PrepareError> {
        let gas_price = match &options.gas_price {
            Some(gwei) => gas_price_to_wei(gwei).map_err(|e| {
                PrepareError::InvalidTxOptions(format!("gasPrice {gwei:?}: {e}"))
            })?,
            None => {
                let quoted = match &pending.quoted_gas_price {
                    Some(quoted) => quoted.clone(),
                    None => {
                        self.relay
                            .tx_infos(&pending.from)
                            .await
                            .map_err(|source| PrepareError::FeeQuoteFailed { source })?
                            .gas_price
                    }
                };
                quoted_wei(&pending.from, &quoted)?
            }
        };
        debug!(gas_price = %gas_price, gas_limit = pending.gas_limit, "self-paid gas");
        Ok(FeeDecision::SelfPaid {
            gas_price,
            gas_limit: pending.gas_limit,
        })
    }

    async fn delegated(&self, pending: &PendingCall) -> Result<FeeDecision, PrepareError> {
        let skeleton = MetaTransaction {
            from: pending.from.clone(),
            to: pending.to.clone(),
            value: pending.value.to_string(),
            data: pending.data.clone(),
            delegation_fees: BigUint::zero().to_string(),
            currency_network_of_fees: String::new(),
            nonce: pending.nonce.to_string(),
            extra_data: "0x".to_string(),
            signature: None,
        };
        let offers = self
            .relay
            .meta_transaction_fees(&skeleton)
            .await
            .map_err(|source| PrepareError::FeeQuoteFailed { source })?;

        // First offer as given; the relay promises no ordering.
        let Some(offer) = offers.into_iter().next() else {
            warn!("relay offered no delegation fee, assuming zero");
            return Ok(FeeDecision::Delegated {
                delegation_fees: DelegationFeesObject::new(Amount::zero(0), ""),
            });
        };

        let raw: BigUint = offer.delegation_fees.trim().parse().map_err(|_| {
            PrepareError::FeeQuoteFailed {
                source: RelayError::Decode {
                    endpoint: "meta-transaction-fees".into(),
                    message: format!("delegation fee {:?} is not an integer", offer.delegation_fees),
                },
            }
        })?;

        let decimals = if offer.currency_network_of_fees.is_empty() {
            0
        } else {
            self.decimals
                .get(&offer.currency_network_of_fees)
                .await?
                .network_decimals
        };

        let delegation_fees =
            DelegationFeesObject::new(to_amount(&raw, decimals), offer.currency_network_of_fees);
        debug!(
            fee = %delegation_fees.amount(),
            network = delegation_fees.currency_network_of_fees(),
            "delegation fee quoted"
        );
        Ok(FeeDecision::Delegated { delegation_fees })
    }
}

/// Converts a decimal gwei gas price to wei.
pub fn gas_price_to_wei(gwei: &str) -> Result<BigUint, PrepareError> {
    to_raw(gwei, GAS_PRICE_DECIMALS)
}

/// Parses the relay's gas price quote, already in wei. A zero quote cannot
/// pay for a self-paid transaction and is blamed on the relay.
fn quoted_wei(from: &str, quoted: &str) -> Result<BigUint, PrepareError> {
    let unusable = |reason: &str| PrepareError::FeeQuoteFailed {
        source: RelayError::Decode {
            endpoint: format!("users/{from}/txinfos"),
            message: format!("unusable gas price {quoted:?}: {reason}"),
        },
    };
    let wei: BigUint = quoted
        .trim()
        .parse()
        .map_err(|_| unusable("not an integer"))?;
    if wei.is_zero() {
        return Err(unusable("zero"));
    }
    Ok(wei)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gwei_to_wei() {
        assert_eq!(
            gas_price_to_wei("5").unwrap(),
            BigUint::from(5_000_000_000u64)
        );
        assert_eq!(gas_price_to_wei("0.5").unwrap(), BigUint::from(500_000_000u64));
    }

    #[test]
    fn relay_quote_is_already_wei() {
        assert_eq!(
            quoted_wei("0xa1", "20000000000").unwrap(),
            BigUint::from(20_000_000_000u64)
        );
    }

    #[test]
    fn unusable_relay_quote_is_a_fee_quote_failure() {
        for quoted in ["0", "1.5", "cheap"] {
            let err = quoted_wei("0xa1", quoted).unwrap_err();
            assert!(
                matches!(err, PrepareError::FeeQuoteFailed { .. }),
                "{quoted}: {err:?}"
            );
        }
    }

    #[test]
    fn sub_wei_gas_price_is_rejected() {
        assert!(matches!(
            gas_price_to_wei("0.0000000001"),
            Err(PrepareError::InvalidAmountPrecision { .. })
        ));
    }
}
