//! The client facade.
//!
//! [`CreditNetClient`] wires the pipeline together for one account: one
//! relay connection, one decimals cache, and the payment and shield entry
//! points sharing them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, WalletType};
use crate::decimals::DecimalsCache;
use crate::fees::FeeDelegationNegotiator;
use crate::path::PathNegotiator;
use crate::payment::Payment;
use crate::relay::{HttpRelay, RelayApi, RelayError};
use crate::shield::Shield;
use crate::transaction::{CallEncoder, TransactionBuilder};

/// The account transactions are prepared for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Address of the account, or of the identity contract for identity
    /// wallets.
    pub address: String,
    /// How the account pays for gas.
    pub wallet_type: WalletType,
}

impl Account {
    /// A self-custody account.
    pub fn ethers(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            wallet_type: WalletType::Ethers,
        }
    }

    /// An identity contract whose gas a relayer pays.
    pub fn identity(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            wallet_type: WalletType::Identity,
        }
    }
}

/// Transaction preparation for one account.
pub struct CreditNetClient {
    account: Account,
    relay: Arc<dyn RelayApi>,
    decimals: Arc<DecimalsCache>,
    paths: Arc<PathNegotiator>,
    payment: Payment,
    shield: Shield,
}

impl CreditNetClient {
    /// Creates a client on top of any relay implementation.
    pub fn new(
        relay: Arc<dyn RelayApi>,
        encoder: Arc<dyn CallEncoder>,
        account: Account,
        config: &ClientConfig,
    ) -> Self {
        let decimals = Arc::new(DecimalsCache::new(Arc::clone(&relay)));
        let paths = Arc::new(PathNegotiator::new(Arc::clone(&relay), Arc::clone(&decimals)));
        let fees = FeeDelegationNegotiator::new(Arc::clone(&relay), Arc::clone(&decimals));
        let builder = Arc::new(TransactionBuilder::new(
            Arc::clone(&relay),
            encoder,
            fees,
            account.wallet_type,
            config.default_gas_limit,
        ));

        let payment = Payment::new(
            account.address.clone(),
            Arc::clone(&relay),
            Arc::clone(&decimals),
            Arc::clone(&paths),
            Arc::clone(&builder),
        );
        let shield = Shield::new(
            account.address.clone(),
            Arc::clone(&relay),
            Arc::clone(&decimals),
            Arc::clone(&paths),
            builder,
        );

        Self {
            account,
            relay,
            decimals,
            paths,
            payment,
            shield,
        }
    }

    /// Creates a client talking HTTP to `config.relay_api_url`.
    pub fn from_config(
        config: &ClientConfig,
        encoder: Arc<dyn CallEncoder>,
        account: Account,
    ) -> Result<Self, RelayError> {
        let relay = HttpRelay::new(&config.relay_api_url, config.request_timeout)?;
        Ok(Self::new(Arc::new(relay), encoder, account, config))
    }

    /// The account transactions are prepared for.
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// The relay connection.
    pub fn relay(&self) -> &Arc<dyn RelayApi> {
        &self.relay
    }

    /// The decimals cache shared by every stage.
    pub fn decimals(&self) -> &DecimalsCache {
        &self.decimals
    }

    /// Path queries without building a transaction.
    pub fn paths(&self) -> &PathNegotiator {
        &self.paths
    }

    /// Payment entry points.
    pub fn payment(&self) -> &Payment {
        &self.payment
    }

    /// Shield entry points.
    pub fn shield(&self) -> &Shield {
        &self.shield
    }
}

impl std::fmt::Debug for CreditNetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditNetClient")
            .field("account", &self.account)
            .field("decimals", &self.decimals)
            .finish_non_exhaustive()
    }
}
