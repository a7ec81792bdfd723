// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # CreditNet Client — Transaction Preparation
//!
//! Turns a user's intent ("pay 12.5 to Bob", "mint 3 into the shield") into
//! a fully specified, still-unsigned transaction object. Path finding, fee
//! quotes and nonces come from a remote relay; signing and submission of the
//! result belong to the caller.
//!
//! ## Architecture
//!
//! The crate mirrors the pipeline stages, leaves first:
//!
//! - **amount** — lossless raw/decimal conversion. No floats near money.
//! - **decimals** — per-network decimals, memoized and single-flight.
//! - **path** — multi-hop path negotiation with the relay.
//! - **fees** — self-paid vs relayer-paid gas, and the delegation fee quote.
//! - **transaction** — nonce, call encoding, gas and the final [`TxObject`].
//! - **shield** — mint/transfer/burn commitments for shielded sub-networks.
//! - **payment** — the payment entry points (transfer, close, native value).
//! - **relay** — the Relay Service seam and its HTTP implementation.
//! - **config** — constants and client configuration.
//!
//! ## Pipeline
//!
//! ```text
//! decimals ──► path (multi-hop only) ──► nonce ──► encode ──► fees ──► TxObject
//! ```
//!
//! Every stage is fallible and short-circuits: a failure anywhere means no
//! transaction object comes out, and the caller re-runs the whole thing.
//! Nothing is retried internally.

pub mod amount;
pub mod client;
pub mod config;
pub mod decimals;
pub mod error;
pub mod fees;
pub mod path;
pub mod payment;
pub mod relay;
pub mod serde_helpers;
pub mod shield;
pub mod transaction;

pub use amount::{to_amount, to_raw, Amount};
pub use client::{Account, CreditNetClient};
pub use config::{ClientConfig, WalletType};
pub use decimals::{DecimalsCache, DecimalsObject, DecimalsOptions};
pub use error::{PrepareError, Stage};
pub use fees::{FeeDecision, FeeDelegationNegotiator};
pub use path::{FeePayer, PathKind, PathNegotiator, PathOptions, PathResult};
pub use payment::{CloseTxObject, Payment, PaymentOptions, PaymentTxObject};
pub use relay::{HttpRelay, RelayApi, RelayError};
pub use shield::{Shield, ShieldOperation, ShieldTxObject, VerificationKeyType};
pub use transaction::{
    CallArg, CallEncoder, ContractCall, DelegationFeesObject, EncodeError, MetaTransaction,
    RawTx, SignedTx, TransactionBuilder, TxObject, TxOptions, TxSigner,
};
