//! Assembly of the final [`TxObject`].
//!
//! [`TransactionBuilder`] runs the tail of every preparation: encode the
//! call, resolve the nonce, pick the gas limit, negotiate fees, and put the
//! pieces together. Contract calls and plain native-value transfers share
//! the same flow; the latter simply carry `0x` as call data.

use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{debug, info, instrument};

use super::encoding::{encode_call, CallEncoder, ContractCall};
use super::types::{RawTx, TxObject, TxOptions};
use crate::amount::{to_amount, to_raw};
use crate::config::{WalletType, NATIVE_DECIMALS, VALUE_TRANSFER_GAS_LIMIT};
use crate::error::PrepareError;
use crate::fees::{FeeDecision, FeeDelegationNegotiator, PendingCall};
use crate::relay::RelayApi;

/// Nonce plus whatever the nonce endpoint told us on the side.
struct AccountState {
    nonce: u64,
    quoted_gas_price: Option<String>,
}

/// Builds unsigned transactions for one wallet.
pub struct TransactionBuilder {
    relay: Arc<dyn RelayApi>,
    encoder: Arc<dyn CallEncoder>,
    fees: FeeDelegationNegotiator,
    wallet_type: WalletType,
    default_gas_limit: u64,
}

impl TransactionBuilder {
    /// Creates a builder for a wallet of type `wallet_type`.
    pub fn new(
        relay: Arc<dyn RelayApi>,
        encoder: Arc<dyn CallEncoder>,
        fees: FeeDelegationNegotiator,
        wallet_type: WalletType,
        default_gas_limit: u64,
    ) -> Self {
        Self {
            relay,
            encoder,
            fees,
            wallet_type,
            default_gas_limit,
        }
    }

    /// The wallet type transactions are built for.
    pub fn wallet_type(&self) -> WalletType {
        self.wallet_type
    }

    /// Builds a call of `call` on the contract at `contract_address`.
    ///
    /// The gas limit is `options.gas_limit`, else `estimated_gas` (usually
    /// the path estimate), else the configured default.
    #[instrument(
        skip(self, call, options),
        fields(contract = call.contract(), function = call.function())
    )]
    pub async fn build(
        &self,
        sender: &str,
        contract_address: &str,
        call: &ContractCall,
        options: &TxOptions,
        estimated_gas: Option<u64>,
    ) -> Result<TxObject, PrepareError> {
        let data = encode_call(self.encoder.as_ref(), call)?;
        let gas_limit = options
            .gas_limit
            .or(estimated_gas.filter(|g| *g > 0))
            .unwrap_or(self.default_gas_limit);
        self.assemble(sender, contract_address, data, gas_limit, options)
            .await
    }

    /// Builds a plain native-value transfer of `options.value` to `to`.
    #[instrument(skip(self, options))]
    pub async fn build_value_transfer(
        &self,
        sender: &str,
        to: &str,
        options: &TxOptions,
    ) -> Result<TxObject, PrepareError> {
        let gas_limit = options.gas_limit.unwrap_or(VALUE_TRANSFER_GAS_LIMIT);
        self.assemble(sender, to, "0x".to_string(), gas_limit, options)
            .await
    }

    async fn assemble(
        &self,
        sender: &str,
        to: &str,
        data: String,
        gas_limit: u64,
        options: &TxOptions,
    ) -> Result<TxObject, PrepareError> {
        if gas_limit == 0 {
            return Err(PrepareError::InvalidTxOptions(
                "gasLimit must be positive".into(),
            ));
        }
        let value = match &options.value {
            Some(v) => to_raw(v, NATIVE_DECIMALS)?,
            None => BigUint::zero(),
        };
        let account = self.resolve_nonce(sender).await?;

        let pending = PendingCall {
            from: sender.to_string(),
            to: to.to_string(),
            value,
            data,
            nonce: account.nonce,
            gas_limit,
            quoted_gas_price: account.quoted_gas_price,
        };
        let decision = self
            .fees
            .negotiate(self.wallet_type, &pending, options)
            .await?;

        let tx = match decision {
            FeeDecision::SelfPaid {
                gas_price,
                gas_limit,
            } => {
                let eth_fees = to_amount(&(&gas_price * gas_limit), NATIVE_DECIMALS);
                let raw_tx = RawTx {
                    from: pending.from,
                    to: pending.to,
                    value: pending.value,
                    gas_limit,
                    gas_price,
                    data: pending.data,
                    nonce: pending.nonce,
                    delegation_fees: None,
                    currency_network_of_fees: None,
                };
                TxObject::self_paid(raw_tx, eth_fees)?
            }
            FeeDecision::Delegated { delegation_fees } => {
                let raw_tx = RawTx {
                    from: pending.from,
                    to: pending.to,
                    value: pending.value,
                    gas_limit: pending.gas_limit,
                    gas_price: BigUint::zero(),
                    data: pending.data,
                    nonce: pending.nonce,
                    delegation_fees: Some(delegation_fees.raw().to_string()),
                    currency_network_of_fees: Some(
                        delegation_fees.currency_network_of_fees().to_string(),
                    ),
                };
                TxObject::delegated(raw_tx, delegation_fees)
            }
        };

        info!(
            nonce = tx.raw_tx().nonce,
            gas_limit = tx.raw_tx().gas_limit,
            eth_fees = %tx.eth_fees(),
            delegated = tx.is_delegated(),
            "transaction prepared"
        );
        Ok(tx)
    }

    /// Account nonce for `ethers` wallets, identity nonce for `identity`.
    async fn resolve_nonce(&self, sender: &str) -> Result<AccountState, PrepareError> {
        let failed = |source| PrepareError::NonceResolutionFailed {
            address: sender.to_string(),
            source,
        };
        let state = match self.wallet_type {
            WalletType::Ethers => {
                let infos = self.relay.tx_infos(sender).await.map_err(failed)?;
                AccountState {
                    nonce: infos.nonce,
                    quoted_gas_price: Some(infos.gas_price),
                }
            }
            WalletType::Identity => {
                let infos = self.relay.identity_infos(sender).await.map_err(failed)?;
                AccountState {
                    nonce: infos.next_nonce,
                    quoted_gas_price: None,
                }
            }
        };
        debug!(sender, nonce = state.nonce, "nonce resolved");
        Ok(state)
    }
}

impl std::fmt::Debug for TransactionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionBuilder")
            .field("wallet_type", &self.wallet_type)
            .field("default_gas_limit", &self.default_gas_limit)
            .finish_non_exhaustive()
    }
}
