//! The external signer seam.
//!
//! Key material never enters this crate. Callers plug in whatever holds the
//! keys (a local wallet, a hardware device, a remote signer) behind
//! [`TxSigner`].

use async_trait::async_trait;

use super::types::{MetaTransaction, RawTx};

/// What a signer produces for a [`RawTx`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedTx {
    /// A signed, RLP-encoded transaction, `0x`-prefixed. Self-paid mode.
    Raw(String),
    /// A meta-transaction with its `signature` set. Relayer-paid mode.
    Meta(MetaTransaction),
}

/// Signs prepared transactions.
#[async_trait]
pub trait TxSigner: Send + Sync {
    /// Signs `raw_tx`.
    async fn sign(
        &self,
        raw_tx: &RawTx,
    ) -> Result<SignedTx, Box<dyn std::error::Error + Send + Sync>>;
}
