//! # CreditNet Contract Interfaces
//!
//! The on-chain side of the client, as far as the client needs to know it:
//!
//! - **Catalog** — the function signatures of `CurrencyNetwork` and
//!   `CurrencyNetworkShield` the preparation pipeline calls.
//! - **Encoder** — [`AbiEncoder`], the ABI implementation of the client's
//!   [`creditnet_client::CallEncoder`] seam.
//!
//! ## Design Principles
//!
//! 1. Arguments are checked against the declared parameter types before any
//!    bytes are produced. A uint64 that does not fit is an error, not a
//!    silent truncation.
//! 2. Argument order is the signature's order. The encoder never reorders.
//! 3. Encoding is pure: no I/O, no global state.

pub mod catalog;
pub mod encoder;

pub use catalog::{ContractInterface, CURRENCY_NETWORK, CURRENCY_NETWORK_SHIELD};
pub use encoder::{AbiEncoder, CatalogError};
