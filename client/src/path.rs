//! Multi-hop path negotiation.
//!
//! Finding a route through the trustline graph is the relay's job. This
//! module phrases the question (raw value, fee and hop bounds), forwards it
//! to the right endpoint and turns the answer into a [`PathResult`]. An
//! empty answer means "no route with enough capacity" and is reported as
//! [`PrepareError::NoPathFound`], never as a transport failure.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::amount::{to_amount, to_raw, Amount};
use crate::decimals::{DecimalsCache, DecimalsObject, DecimalsOptions};
use crate::error::PrepareError;
use crate::relay::{PathRequest, RelayApi};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What the path is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// A transfer of `value` from `from` to `to`.
    Payment,
    /// A triangulation closing the trustline between `from` and `to`; the
    /// requested value is the residual to reach, not an amount to move.
    Close,
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payment => write!(f, "payment"),
            Self::Close => write!(f, "close"),
        }
    }
}

/// Who pays the mediators along the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeePayer {
    /// The sender pays on top of the value.
    #[default]
    Sender,
    /// The receiver gets the value minus the fees.
    Receiver,
}

impl fmt::Display for FeePayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sender => write!(f, "sender"),
            Self::Receiver => write!(f, "receiver"),
        }
    }
}

/// Caller constraints on a path query. Validated, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathOptions {
    /// Maximum number of hops. Unsigned, so never negative.
    pub max_hops: Option<u32>,
    /// Maximum fees as a non-negative decimal, forwarded verbatim.
    pub max_fees: Option<String>,
    /// Who pays the mediator fees. The relay's default applies when unset.
    pub fee_payer: Option<FeePayer>,
    /// Decimals the caller already knows.
    pub decimals: DecimalsOptions,
}

impl PathOptions {
    /// Checks the options without changing them.
    pub fn validate(&self) -> Result<(), PrepareError> {
        if let Some(max_fees) = &self.max_fees {
            let trimmed = max_fees.trim();
            let well_formed = !trimmed.is_empty()
                && !trimmed.starts_with('-')
                && trimmed.split_once('.').map_or(
                    trimmed.bytes().all(|b| b.is_ascii_digit()),
                    |(i, f)| {
                        !(i.is_empty() && f.is_empty())
                            && i.bytes().all(|b| b.is_ascii_digit())
                            && f.bytes().all(|b| b.is_ascii_digit())
                    },
                );
            if !well_formed {
                return Err(PrepareError::InvalidPathOptions(format!(
                    "maxFees must be a non-negative number, got {max_fees:?}"
                )));
            }
        }
        Ok(())
    }
}

/// A route as negotiated with the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    /// Accounts from the requesting account (`path[0]`) to the receiver.
    /// Empty when no route exists.
    pub path: Vec<String>,
    /// Upper bound on the fees along the path.
    pub max_fees: Amount,
    /// Relay's gas estimate for a transfer along the path.
    pub estimated_gas: u64,
    /// Who pays the mediator fees.
    pub fee_payer: FeePayer,
    /// Residual value of a close path. `None` for payments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Amount>,
}

impl PathResult {
    /// Returns `true` if the relay found no route.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// The accounts after the sender, as passed on-chain. The sender is
    /// implicit in the transaction and is not part of the call arguments.
    pub fn mediators_and_receiver(&self) -> &[String] {
        self.path.get(1..).unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// PathNegotiator
// ---------------------------------------------------------------------------

/// Asks the relay for payment and close paths.
pub struct PathNegotiator {
    relay: Arc<dyn RelayApi>,
    decimals: Arc<DecimalsCache>,
}

impl PathNegotiator {
    /// Creates a negotiator sharing the client's relay and decimals cache.
    pub fn new(relay: Arc<dyn RelayApi>, decimals: Arc<DecimalsCache>) -> Self {
        Self { relay, decimals }
    }

    /// Queries a path and returns the relay's answer as is, including an
    /// empty path when no route exists.
    #[instrument(skip(self, options), fields(kind = %kind))]
    pub async fn query_path(
        &self,
        kind: PathKind,
        network: &str,
        from: &str,
        to: &str,
        value: &str,
        options: &PathOptions,
    ) -> Result<PathResult, PrepareError> {
        options.validate()?;
        let decimals = self.decimals.resolve(network, options.decimals).await?;
        self.query_with_decimals(kind, network, from, to, value, options, decimals)
            .await
    }

    /// Like [`Self::query_path`], but an empty path is an error.
    pub async fn find_path(
        &self,
        kind: PathKind,
        network: &str,
        from: &str,
        to: &str,
        value: &str,
        options: &PathOptions,
    ) -> Result<PathResult, PrepareError> {
        let result = self
            .query_path(kind, network, from, to, value, options)
            .await?;
        require_route(&result, network)?;
        Ok(result)
    }

    /// Path query with decimals already resolved by the caller.
    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn query_with_decimals(
        &self,
        kind: PathKind,
        network: &str,
        from: &str,
        to: &str,
        value: &str,
        options: &PathOptions,
        decimals: DecimalsObject,
    ) -> Result<PathResult, PrepareError> {
        options.validate()?;
        let network_decimals = decimals.network_decimals;
        let request = PathRequest {
            from: from.to_string(),
            to: to.to_string(),
            value: to_raw(value, network_decimals)?.to_string(),
            max_fees: options.max_fees.as_ref().map(|f| f.trim().to_string()),
            max_hops: options.max_hops,
            fee_payer: options.fee_payer,
        };

        let query_failed = |source| PrepareError::PathQueryFailed {
            network: network.to_string(),
            source,
        };

        let result = match kind {
            PathKind::Payment => {
                let res = self
                    .relay
                    .path_info(network, &request)
                    .await
                    .map_err(query_failed)?;
                PathResult {
                    path: res.path,
                    max_fees: to_amount(&res.fees, network_decimals),
                    estimated_gas: res.estimated_gas,
                    fee_payer: res.fee_payer.unwrap_or_default(),
                    value: None,
                }
            }
            PathKind::Close => {
                let res = self
                    .relay
                    .close_path_info(network, &request)
                    .await
                    .map_err(query_failed)?;
                PathResult {
                    path: res.path,
                    max_fees: to_amount(&res.fees, network_decimals),
                    estimated_gas: res.estimated_gas,
                    fee_payer: res.fee_payer.unwrap_or_default(),
                    value: Some(to_amount(&res.value, network_decimals)),
                }
            }
        };

        debug!(
            network,
            hops = result.path.len().saturating_sub(1),
            max_fees = %result.max_fees,
            "path negotiated"
        );
        Ok(result)
    }
}

/// Turns an empty path into [`PrepareError::NoPathFound`].
pub(crate) fn require_route(path: &PathResult, network: &str) -> Result<(), PrepareError> {
    if path.is_empty() {
        return Err(PrepareError::NoPathFound {
            network: network.to_string(),
        });
    }
    Ok(())
}
