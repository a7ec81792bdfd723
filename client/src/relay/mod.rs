//! # Relay Service
//!
//! The relay is the client's only window onto the chain: it answers path
//! queries, hands out nonces and gas prices, quotes delegation fees and
//! forwards signed transactions.
//!
//! ```text
//! types.rs — request/response bodies of the REST API
//! http.rs  — reqwest-backed implementation of RelayApi
//! ```
//!
//! Everything in the pipeline talks to the relay through [`RelayApi`], held
//! as `Arc<dyn RelayApi>`, so tests swap in a scripted relay and callers can
//! bring their own transport. Cancellation is plain future dropping: a
//! dropped preparation future abandons its in-flight request and nothing is
//! left to clean up.

pub mod http;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

use crate::transaction::MetaTransaction;

pub use http::HttpRelay;
pub use types::{
    ClosePathResponse, Gateway, IdentityInfos, MetaTransactionFees, NetworkDetails,
    NetworkSummary, PathRequest, PathResponse, TxInfos,
};

/// Transport-level failures talking to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The request never produced a response (DNS, TLS, timeout, refused).
    #[error("request to {endpoint} failed: {message}")]
    Transport {
        /// Endpoint path relative to the relay API root.
        endpoint: String,
        /// Description of the failure.
        message: String,
    },

    /// The relay answered with a non-success status.
    #[error("relay answered {status} for {endpoint}: {body}")]
    Status {
        /// Endpoint path relative to the relay API root.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The relay answered 2xx, but the body did not match the expected shape.
    #[error("unexpected response from {endpoint}: {message}")]
    Decode {
        /// Endpoint path relative to the relay API root.
        endpoint: String,
        /// Decoder error.
        message: String,
    },
}

/// The Relay Service endpoints the preparation pipeline consumes.
///
/// All methods are read-only except the two `send_*` methods, which forward
/// an already signed transaction. None of them retries.
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// `GET networks/{network}`.
    async fn network_details(&self, network: &str) -> Result<NetworkDetails, RelayError>;

    /// `POST networks/{network}/path-info`.
    async fn path_info(
        &self,
        network: &str,
        request: &PathRequest,
    ) -> Result<PathResponse, RelayError>;

    /// `POST networks/{network}/close-path-info`.
    async fn close_path_info(
        &self,
        network: &str,
        request: &PathRequest,
    ) -> Result<ClosePathResponse, RelayError>;

    /// `GET users/{address}/txinfos`.
    async fn tx_infos(&self, address: &str) -> Result<TxInfos, RelayError>;

    /// `GET identities/{address}`.
    async fn identity_infos(&self, address: &str) -> Result<IdentityInfos, RelayError>;

    /// `POST meta-transaction-fees`. Offers come back in the relay's order.
    async fn meta_transaction_fees(
        &self,
        meta_transaction: &MetaTransaction,
    ) -> Result<Vec<MetaTransactionFees>, RelayError>;

    /// `GET shields/{shield}/network`: the currency network backing a shield.
    async fn shielded_network(&self, shield: &str) -> Result<NetworkSummary, RelayError>;

    /// `GET networks/{network}/gateway`.
    async fn gateway(&self, network: &str) -> Result<Gateway, RelayError>;

    /// `POST relay`. Returns the transaction hash.
    async fn send_signed_transaction(&self, raw_transaction: &str) -> Result<String, RelayError>;

    /// `POST relay-meta-transaction`. Returns the hash of the transaction the
    /// relayer sent, not of the meta-transaction.
    async fn send_signed_meta_transaction(
        &self,
        meta_transaction: &MetaTransaction,
    ) -> Result<String, RelayError>;
}
