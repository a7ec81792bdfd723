//! # Transaction Stage
//!
//! ```text
//! encoding.rs — ContractCall, CallArg and the CallEncoder seam
//! builder.rs  — nonce, gas limit, fee negotiation, TxObject assembly
//! types.rs    — RawTx, TxObject, MetaTransaction, TxOptions
//! signer.rs   — TxSigner seam for external key holders
//! ```

pub mod builder;
pub mod encoding;
pub mod signer;
pub mod types;

pub use builder::TransactionBuilder;
pub use encoding::{CallArg, CallEncoder, ContractCall, EncodeError};
pub use signer::{SignedTx, TxSigner};
pub use types::{DelegationFeesObject, MetaTransaction, RawTx, TxObject, TxOptions};
