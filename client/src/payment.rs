//! Payment entry points.
//!
//! A multi-hop payment resolves the network decimals, negotiates a path to
//! the receiver, and builds a `CurrencyNetwork.transfer` call along it.
//! Closing a trustline works the same way with a close path and
//! `closeTrustlineByTriangularTransfer`. Native-coin transfers skip the
//! path stage entirely.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::amount::{to_raw, Amount};
use crate::config::CURRENCY_NETWORK_CONTRACT;
use crate::decimals::DecimalsCache;
use crate::error::PrepareError;
use crate::path::{require_route, FeePayer, PathKind, PathNegotiator, PathOptions, PathResult};
use crate::relay::RelayApi;
use crate::transaction::{
    CallArg, ContractCall, RawTx, SignedTx, TransactionBuilder, TxObject, TxOptions, TxSigner,
};

/// Options of a payment: path constraints plus transaction overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentOptions {
    /// Path constraints and known decimals.
    pub path: PathOptions,
    /// Gas and value overrides.
    pub tx: TxOptions,
}

/// A prepared payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTxObject {
    /// The unsigned transaction.
    #[serde(flatten)]
    pub tx: TxObject,
    /// Full path, sender first.
    pub path: Vec<String>,
    /// Upper bound on the mediator fees.
    pub max_fees: Amount,
    /// Who pays the mediator fees.
    pub fee_payer: FeePayer,
}

/// A prepared trustline close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseTxObject {
    /// The unsigned transaction.
    #[serde(flatten)]
    pub tx: TxObject,
    /// Triangulation path, sender first.
    pub path: Vec<String>,
    /// Upper bound on the mediator fees.
    pub max_fees: Amount,
    /// Value the triangulation moves to bring the balance to zero.
    pub value: Amount,
}

/// Payments made by one account.
pub struct Payment {
    sender: String,
    relay: Arc<dyn RelayApi>,
    decimals: Arc<DecimalsCache>,
    paths: Arc<PathNegotiator>,
    builder: Arc<TransactionBuilder>,
}

impl Payment {
    /// Creates the payment entry points for `sender`.
    pub fn new(
        sender: impl Into<String>,
        relay: Arc<dyn RelayApi>,
        decimals: Arc<DecimalsCache>,
        paths: Arc<PathNegotiator>,
        builder: Arc<TransactionBuilder>,
    ) -> Self {
        Self {
            sender: sender.into(),
            relay,
            decimals,
            paths,
            builder,
        }
    }

    /// The paying account.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Prepares a transfer of `value` to `receiver` in `network`.
    ///
    /// Fails with [`PrepareError::NoPathFound`] when the relay knows no
    /// route with enough capacity.
    #[instrument(skip(self, options), fields(sender = %self.sender))]
    pub async fn prepare(
        &self,
        network: &str,
        receiver: &str,
        value: &str,
        options: &PaymentOptions,
    ) -> Result<PaymentTxObject, PrepareError> {
        let decimals = self
            .decimals
            .resolve(network, options.path.decimals)
            .await?;
        let path = self
            .paths
            .query_with_decimals(
                PathKind::Payment,
                network,
                &self.sender,
                receiver,
                value,
                &options.path,
                decimals,
            )
            .await?;
        require_route(&path, network)?;

        let raw_value = to_raw(value, decimals.network_decimals)?;
        let function = match path.fee_payer {
            FeePayer::Sender => "transfer",
            FeePayer::Receiver => "transferReceiverPays",
        };
        let call = ContractCall::new(CURRENCY_NETWORK_CONTRACT, function)
            .arg(CallArg::address(receiver))
            .arg(CallArg::uint(raw_value))
            .arg(CallArg::uint(path.max_fees.raw().clone()))
            .arg(CallArg::addresses(path.mediators_and_receiver().iter().cloned()));

        let tx = self
            .builder
            .build(
                &self.sender,
                network,
                &call,
                &options.tx,
                Some(path.estimated_gas),
            )
            .await?;
        Ok(PaymentTxObject {
            tx,
            path: path.path,
            max_fees: path.max_fees,
            fee_payer: path.fee_payer,
        })
    }

    /// Asks for a path from this account to `receiver` without building a
    /// transaction. An empty path is returned as is.
    pub async fn get_path(
        &self,
        network: &str,
        receiver: &str,
        value: &str,
        options: &PathOptions,
    ) -> Result<PathResult, PrepareError> {
        self.paths
            .query_path(PathKind::Payment, network, &self.sender, receiver, value, options)
            .await
    }

    /// Prepares closing the trustline with `counterparty` by a triangular
    /// transfer that brings its balance to zero.
    #[instrument(skip(self, options), fields(sender = %self.sender))]
    pub async fn prepare_close(
        &self,
        network: &str,
        counterparty: &str,
        options: &PaymentOptions,
    ) -> Result<CloseTxObject, PrepareError> {
        let decimals = self
            .decimals
            .resolve(network, options.path.decimals)
            .await?;
        let path = self
            .paths
            .query_with_decimals(
                PathKind::Close,
                network,
                &self.sender,
                counterparty,
                "0",
                &options.path,
                decimals,
            )
            .await?;
        require_route(&path, network)?;

        let call = ContractCall::new(CURRENCY_NETWORK_CONTRACT, "closeTrustlineByTriangularTransfer")
            .arg(CallArg::address(counterparty))
            .arg(CallArg::uint(path.max_fees.raw().clone()))
            .arg(CallArg::addresses(path.mediators_and_receiver().iter().cloned()));

        let tx = self
            .builder
            .build(
                &self.sender,
                network,
                &call,
                &options.tx,
                Some(path.estimated_gas),
            )
            .await?;
        let value = path
            .value
            .unwrap_or_else(|| Amount::zero(decimals.network_decimals));
        Ok(CloseTxObject {
            tx,
            path: path.path,
            max_fees: path.max_fees,
            value,
        })
    }

    /// Prepares a transfer of `value` native coins to `to`.
    #[instrument(skip(self, options), fields(sender = %self.sender))]
    pub async fn prepare_eth(
        &self,
        to: &str,
        value: &str,
        options: &TxOptions,
    ) -> Result<TxObject, PrepareError> {
        let options = TxOptions {
            value: Some(value.to_string()),
            ..options.clone()
        };
        self.builder
            .build_value_transfer(&self.sender, to, &options)
            .await
    }

    /// Signs `raw_tx` with `signer` and submits it, returning the
    /// transaction hash.
    #[instrument(skip_all, fields(sender = %self.sender, nonce = raw_tx.nonce))]
    pub async fn confirm(
        &self,
        raw_tx: &RawTx,
        signer: &dyn TxSigner,
    ) -> Result<String, PrepareError> {
        let signed = signer
            .sign(raw_tx)
            .await
            .map_err(|e| PrepareError::SigningFailed(e.to_string()))?;
        let relayed = match signed {
            SignedTx::Raw(raw) => self.relay.send_signed_transaction(&raw).await,
            SignedTx::Meta(meta) => self.relay.send_signed_meta_transaction(&meta).await,
        };
        relayed.map_err(|source| PrepareError::RelayFailed { source })
    }
}

impl std::fmt::Debug for Payment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Payment")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}
