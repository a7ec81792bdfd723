//! Shielded commitment preparation.
//!
//! A shield is a privacy sub-network backed by an ordinary currency network.
//! Value enters it by the acting account paying the network's gateway
//! (mint) and leaves it by the gateway paying the acting account back
//! (burn); transfers inside the shield only move
//! commitments and nullifiers. Each operation carries a Groth16 proof and
//! its public inputs, which the verifier contract checks.
//!
//! Argument order of every shield call is fixed by the verifier contract:
//!
//! ```text
//! mint     (proof[], inputs[], amount, commitment, path)
//! transfer (proof[], inputs[], root, nullifierC, nullifierD, commitmentE, commitmentF)
//! burn     (proof[], inputs[], root, nullifier, amount, path)
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::amount::{to_amount, to_raw, Amount};
use crate::config::{
    FIELD_ELEMENT_BYTES, FIELD_ELEMENT_HEX_DIGITS, GROTH16_PROOF_ELEMENTS, SHIELD_CONTRACT,
};
use crate::decimals::DecimalsCache;
use crate::error::PrepareError;
use crate::path::{PathKind, PathNegotiator, PathResult};
use crate::payment::PaymentOptions;
use crate::relay::RelayApi;
use crate::transaction::{CallArg, ContractCall, TransactionBuilder, TxObject, TxOptions};

// ---------------------------------------------------------------------------
// Field elements
// ---------------------------------------------------------------------------

/// Renders a field element as `0x` followed by exactly 64 hex digits.
///
/// Accepts base-10 or `0x`-prefixed hex input of at most 256 bits.
pub fn normalize_field_element(element: &str) -> Result<String, PrepareError> {
    let trimmed = element.trim();
    let (digits, radix) = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (trimmed, 10),
    };
    let value = (!digits.is_empty())
        .then(|| BigUint::parse_bytes(digits.as_bytes(), radix))
        .flatten()
        .ok_or_else(|| {
            PrepareError::ShieldArgumentInvalid(format!("{element:?} is not a field element"))
        })?;
    if value.bits() > (FIELD_ELEMENT_BYTES * 8) as u64 {
        return Err(PrepareError::ShieldArgumentInvalid(format!(
            "{element:?} does not fit in {FIELD_ELEMENT_BYTES} bytes"
        )));
    }
    Ok(word(&value))
}

fn word(value: &BigUint) -> String {
    format!("0x{value:0width$x}", width = FIELD_ELEMENT_HEX_DIGITS)
}

fn normalize_all(what: &str, elements: &[String]) -> Result<Vec<String>, PrepareError> {
    elements
        .iter()
        .enumerate()
        .map(|(i, e)| {
            normalize_field_element(e).map_err(|_| {
                PrepareError::ShieldArgumentInvalid(format!("{what}[{i}] = {e:?} is not a field element"))
            })
        })
        .collect()
}

fn normalize_proof(proof: &[String], inputs: &[String]) -> Result<(Vec<String>, Vec<String>), PrepareError> {
    if proof.len() != GROTH16_PROOF_ELEMENTS {
        return Err(PrepareError::ShieldArgumentInvalid(format!(
            "proof must have {GROTH16_PROOF_ELEMENTS} elements, got {}",
            proof.len()
        )));
    }
    if inputs.is_empty() {
        return Err(PrepareError::ShieldArgumentInvalid(
            "public inputs must not be empty".into(),
        ));
    }
    Ok((normalize_all("proof", proof)?, normalize_all("inputs", inputs)?))
}

fn normalize_named(name: &str, element: &str) -> Result<String, PrepareError> {
    normalize_field_element(element).map_err(|_| {
        PrepareError::ShieldArgumentInvalid(format!("{name} {element:?} is not a 32-byte word"))
    })
}

// ---------------------------------------------------------------------------
// ShieldOperation
// ---------------------------------------------------------------------------

/// A shield call with every field element already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ShieldOperation {
    /// Move `value` from the backing network into the shield.
    Mint {
        /// Groth16 proof.
        proof: Vec<String>,
        /// Public inputs.
        inputs: Vec<String>,
        /// Minted value.
        value: Amount,
        /// New note commitment.
        commitment: String,
        /// Path from the minting account to the gateway.
        path: Vec<String>,
    },
    /// Spend two notes into two new ones inside the shield.
    Transfer {
        /// Groth16 proof.
        proof: Vec<String>,
        /// Public inputs.
        inputs: Vec<String>,
        /// Merkle root the proof was made against.
        root: String,
        /// Nullifier of the first spent note.
        nullifier_c: String,
        /// Nullifier of the second spent note.
        nullifier_d: String,
        /// Commitment of the first new note.
        commitment_e: String,
        /// Commitment of the second new note.
        commitment_f: String,
    },
    /// Move `value` out of the shield to `pay_to`.
    Burn {
        /// Groth16 proof.
        proof: Vec<String>,
        /// Public inputs.
        inputs: Vec<String>,
        /// Merkle root the proof was made against.
        root: String,
        /// Nullifier of the spent note.
        nullifier: String,
        /// Burned value.
        value: Amount,
        /// Recipient of the burned value. Bound by the proof's public
        /// inputs, not passed to the contract separately.
        pay_to: String,
        /// Path from the gateway to the recipient.
        path: Vec<String>,
    },
}

impl ShieldOperation {
    /// Contract function this operation calls.
    pub fn function(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::Transfer { .. } => "transfer",
            Self::Burn { .. } => "burn",
        }
    }

    /// The shield contract call, arguments in verifier order.
    pub fn to_call(&self) -> ContractCall {
        let call = ContractCall::new(SHIELD_CONTRACT, self.function());
        match self {
            Self::Mint {
                proof,
                inputs,
                value,
                commitment,
                path,
            } => call
                .arg(words(proof))
                .arg(words(inputs))
                .arg(CallArg::word(word(value.raw())))
                .arg(CallArg::word(commitment.as_str()))
                .arg(CallArg::addresses(path.iter().cloned())),
            Self::Transfer {
                proof,
                inputs,
                root,
                nullifier_c,
                nullifier_d,
                commitment_e,
                commitment_f,
            } => call
                .arg(words(proof))
                .arg(words(inputs))
                .arg(CallArg::word(root.as_str()))
                .arg(CallArg::word(nullifier_c.as_str()))
                .arg(CallArg::word(nullifier_d.as_str()))
                .arg(CallArg::word(commitment_e.as_str()))
                .arg(CallArg::word(commitment_f.as_str())),
            Self::Burn {
                proof,
                inputs,
                root,
                nullifier,
                value,
                path,
                ..
            } => call
                .arg(words(proof))
                .arg(words(inputs))
                .arg(CallArg::word(root.as_str()))
                .arg(CallArg::word(nullifier.as_str()))
                .arg(CallArg::word(word(value.raw())))
                .arg(CallArg::addresses(path.iter().cloned())),
        }
    }
}

fn words(elements: &[String]) -> CallArg {
    CallArg::Array(elements.iter().map(|e| CallArg::word(e.as_str())).collect())
}

/// Verification key slot in the shield contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationKeyType {
    /// Key verifying mint proofs.
    Mint,
    /// Key verifying transfer proofs.
    Transfer,
    /// Key verifying burn proofs.
    Burn,
}

impl VerificationKeyType {
    /// Slot index the contract stores the key under.
    pub fn index(self) -> u8 {
        match self {
            Self::Mint => 0,
            Self::Transfer => 1,
            Self::Burn => 2,
        }
    }
}

impl fmt::Display for VerificationKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mint => write!(f, "mint"),
            Self::Transfer => write!(f, "transfer"),
            Self::Burn => write!(f, "burn"),
        }
    }
}

impl FromStr for VerificationKeyType {
    type Err = PrepareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mint" => Ok(Self::Mint),
            "transfer" => Ok(Self::Transfer),
            "burn" => Ok(Self::Burn),
            other => Err(PrepareError::ShieldArgumentInvalid(format!(
                "unknown verification key type {other:?}"
            ))),
        }
    }
}

/// A prepared shield transaction and the operation it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldTxObject {
    /// The unsigned transaction.
    #[serde(flatten)]
    pub tx: TxObject,
    /// The encoded operation.
    pub operation: ShieldOperation,
}

// ---------------------------------------------------------------------------
// Shield
// ---------------------------------------------------------------------------

/// Shield operations of one account.
pub struct Shield {
    sender: String,
    relay: Arc<dyn RelayApi>,
    decimals: Arc<DecimalsCache>,
    paths: Arc<PathNegotiator>,
    builder: Arc<TransactionBuilder>,
}

/// Which way value crosses the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GatewayDirection {
    /// Acting account to gateway.
    Into,
    /// Gateway to acting account.
    OutOf,
}

struct GatewayRoute {
    path: PathResult,
    value: Amount,
}

impl Shield {
    /// Creates the shield entry points for `sender`.
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

    /// Prepares minting `value` into `shield` under `commitment`.
    ///
    /// Fails with [`PrepareError::NoMintPath`] when the account cannot reach
    /// the gateway; nothing is encoded in that case.
    #[instrument(skip(self, proof, inputs, options), fields(sender = %self.sender))]
    pub async fn prepare_mint_commitment(
        &self,
        shield: &str,
        proof: &[String],
        inputs: &[String],
        value: &str,
        commitment: &str,
        options: &PaymentOptions,
    ) -> Result<ShieldTxObject, PrepareError> {
        let (proof, inputs) = normalize_proof(proof, inputs)?;
        let commitment = normalize_named("commitment", commitment)?;

        let route = self
            .gateway_route(shield, GatewayDirection::Into, value, options)
            .await?;
        let operation = ShieldOperation::Mint {
            proof,
            inputs,
            value: route.value,
            commitment,
            path: route.path.path,
        };
        self.finish(shield, operation, &options.tx).await
    }

    /// Prepares a transfer inside `shield`.
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip_all, fields(sender = %self.sender, shield = %shield))]
    pub async fn prepare_transfer_commitment(
        &self,
        shield: &str,
        proof: &[String],
        inputs: &[String],
        root: &str,
        nullifier_c: &str,
        nullifier_d: &str,
        commitment_e: &str,
        commitment_f: &str,
        options: &TxOptions,
    ) -> Result<ShieldTxObject, PrepareError> {
        let (proof, inputs) = normalize_proof(proof, inputs)?;
        let operation = ShieldOperation::Transfer {
            proof,
            inputs,
            root: normalize_named("root", root)?,
            nullifier_c: normalize_named("nullifierC", nullifier_c)?,
            nullifier_d: normalize_named("nullifierD", nullifier_d)?,
            commitment_e: normalize_named("commitmentE", commitment_e)?,
            commitment_f: normalize_named("commitmentF", commitment_f)?,
        };
        self.finish(shield, operation, options).await
    }

    /// Prepares burning `value` out of `shield` to `pay_to`.
    ///
    /// The payout path runs from the gateway to the acting account; `pay_to`
    /// is bound by the proof only. Fails with [`PrepareError::NoBurnPath`]
    /// when the gateway cannot reach the account; nothing is encoded in that
    /// case.
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self, proof, inputs, options), fields(sender = %self.sender))]
    pub async fn prepare_burn_commitment(
        &self,
        shield: &str,
        proof: &[String],
        inputs: &[String],
        root: &str,
        nullifier: &str,
        value: &str,
        pay_to: &str,
        options: &PaymentOptions,
    ) -> Result<ShieldTxObject, PrepareError> {
        let (proof, inputs) = normalize_proof(proof, inputs)?;
        let root = normalize_named("root", root)?;
        let nullifier = normalize_named("nullifier", nullifier)?;

        let route = self
            .gateway_route(shield, GatewayDirection::OutOf, value, options)
            .await?;
        let operation = ShieldOperation::Burn {
            proof,
            inputs,
            root,
            nullifier,
            value: route.value,
            pay_to: pay_to.to_string(),
            path: route.path.path,
        };
        self.finish(shield, operation, &options.tx).await
    }

    /// Prepares registering a verification key. Development aid: production
    /// shields are deployed with their keys.
    #[instrument(skip(self, verification_key, options), fields(sender = %self.sender))]
    pub async fn prepare_register_vk(
        &self,
        shield: &str,
        verification_key: &[String],
        vk_type: VerificationKeyType,
        options: &TxOptions,
    ) -> Result<TxObject, PrepareError> {
        if verification_key.is_empty() {
            return Err(PrepareError::ShieldArgumentInvalid(
                "verification key must not be empty".into(),
            ));
        }
        let key = normalize_all("verificationKey", verification_key)?;
        let call = ContractCall::new(SHIELD_CONTRACT, "registerVerificationKey")
            .arg(words(&key))
            .arg(CallArg::uint(vk_type.index()));
        self.builder
            .build(&self.sender, shield, &call, options, None)
            .await
    }

    /// Looks up the shield's backing network and gateway, then finds the
    /// path that carries `value` across the gateway.
    async fn gateway_route(
        &self,
        shield: &str,
        direction: GatewayDirection,
        value: &str,
        options: &PaymentOptions,
    ) -> Result<GatewayRoute, PrepareError> {
        let network = self
            .relay
            .shielded_network(shield)
            .await
            .map_err(|source| PrepareError::LookupFailed {
                what: format!("network of shield {shield}"),
                source,
            })?
            .address;

        let gateway = async {
            self.relay
                .gateway(&network)
                .await
                .map_err(|source| PrepareError::LookupFailed {
                    what: format!("gateway of {network}"),
                    source,
                })
        };
        let (decimals, gateway) = tokio::try_join!(
            self.decimals.resolve(&network, options.path.decimals),
            gateway
        )?;
        debug!(%network, gateway = %gateway.address, "shield gateway resolved");

        let (from, to) = match direction {
            GatewayDirection::Into => (self.sender.as_str(), gateway.address.as_str()),
            GatewayDirection::OutOf => (gateway.address.as_str(), self.sender.as_str()),
        };
        let path = self
            .paths
            .query_with_decimals(
                PathKind::Payment,
                &network,
                from,
                to,
                value,
                &options.path,
                decimals,
            )
            .await?;
        if path.is_empty() {
            let network = network.clone();
            return Err(match direction {
                GatewayDirection::Into => PrepareError::NoMintPath { network },
                GatewayDirection::OutOf => PrepareError::NoBurnPath { network },
            });
        }

        let raw = to_raw(value, decimals.network_decimals)?;
        Ok(GatewayRoute {
            path,
            value: to_amount(&raw, decimals.network_decimals),
        })
    }

    async fn finish(
        &self,
        shield: &str,
        operation: ShieldOperation,
        options: &TxOptions,
    ) -> Result<ShieldTxObject, PrepareError> {
        let call = operation.to_call();
        let tx = self
            .builder
            .build(&self.sender, shield, &call, options, None)
            .await?;
        Ok(ShieldTxObject { tx, operation })
    }
}

impl fmt::Debug for Shield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shield")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}
