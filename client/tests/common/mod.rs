//! Shared fixtures: a scripted in-memory relay and a recording encoder.
//!
//! The relay answers from tables filled by the test and records every call,
//! so tests can assert both on what was returned and on what was (or was
//! not) asked for. Anything not scripted answers 404.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use num_bigint::BigUint;
use parking_lot::Mutex;

use creditnet_client::relay::{
    ClosePathResponse, Gateway, IdentityInfos, MetaTransactionFees, NetworkDetails,
    NetworkSummary, PathRequest, PathResponse, TxInfos,
};
use creditnet_client::{
    Account, CallEncoder, ClientConfig, ContractCall, CreditNetClient, EncodeError, FeePayer,
    MetaTransaction, RawTx, RelayApi, RelayError, SignedTx, TxSigner,
};

pub const ALICE: &str = "0x00000000000000000000000000000000000000a1";
pub const BOB: &str = "0x00000000000000000000000000000000000000b0";
pub const MEDIATOR: &str = "0x00000000000000000000000000000000000000c0";
pub const NETWORK: &str = "0x000000000000000000000000000000000000feed";
pub const FEE_NETWORK: &str = "0x0000000000000000000000000000000000000fee";
pub const SHIELD: &str = "0x00000000000000000000000000000000000005d1";
pub const GATEWAY: &str = "0x0000000000000000000000000000000000000ca7";
pub const CALL_DATA: &str = "0xc0ffee";

fn not_found(endpoint: String) -> RelayError {
    RelayError::Status {
        endpoint,
        status: 404,
        body: "not scripted".into(),
    }
}

// ---------------------------------------------------------------------------
// ScriptedRelay
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ScriptedRelay {
    networks: Mutex<HashMap<String, NetworkDetails>>,
    paths: Mutex<HashMap<String, Result<PathResponse, RelayError>>>,
    close_paths: Mutex<HashMap<String, ClosePathResponse>>,
    tx_infos: Mutex<Option<TxInfos>>,
    identity_infos: Mutex<Option<IdentityInfos>>,
    fee_offers: Mutex<Option<Vec<MetaTransactionFees>>>,
    shields: Mutex<HashMap<String, String>>,
    gateways: Mutex<HashMap<String, String>>,
    network_delay: Mutex<Option<Duration>>,

    calls: Mutex<Vec<String>>,
    pub path_requests: Mutex<Vec<(String, PathRequest)>>,
    pub fee_requests: Mutex<Vec<MetaTransaction>>,
    pub sent: Mutex<Vec<String>>,
}

impl ScriptedRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network(self, network: &str, decimals: u32) -> Self {
        self.add_network(network, decimals);
        self
    }

    pub fn add_network(&self, network: &str, decimals: u32) {
        self.networks.lock().insert(
            network.to_string(),
            NetworkDetails {
                address: network.to_string(),
                name: "Test Euro".into(),
                abbreviation: "EUR".into(),
                decimals,
                interest_rate_decimals: 2,
            },
        );
    }

    pub fn with_network_delay(self, delay: Duration) -> Self {
        *self.network_delay.lock() = Some(delay);
        self
    }

    pub fn with_path(self, network: &str, path: &[&str], fees: u64, estimated_gas: u64) -> Self {
        self.with_path_paid_by(network, path, fees, estimated_gas, None)
    }

    pub fn with_path_paid_by(
        self,
        network: &str,
        path: &[&str],
        fees: u64,
        estimated_gas: u64,
        fee_payer: Option<FeePayer>,
    ) -> Self {
        self.paths.lock().insert(
            network.to_string(),
            Ok(PathResponse {
                path: path.iter().map(|a| a.to_string()).collect(),
                fees: BigUint::from(fees),
                estimated_gas,
                fee_payer,
            }),
        );
        self
    }

    pub fn with_path_status(self, network: &str, status: u16) -> Self {
        self.paths.lock().insert(
            network.to_string(),
            Err(RelayError::Status {
                endpoint: format!("networks/{network}/path-info"),
                status,
                body: "internal error".into(),
            }),
        );
        self
    }

    pub fn with_close_path(self, network: &str, path: &[&str], fees: u64, value: u64) -> Self {
        self.close_paths.lock().insert(
            network.to_string(),
            ClosePathResponse {
                path: path.iter().map(|a| a.to_string()).collect(),
                fees: BigUint::from(fees),
                value: BigUint::from(value),
                estimated_gas: 90_000,
                fee_payer: None,
            },
        );
        self
    }

    pub fn with_tx_infos(self, nonce: u64, gas_price_wei: &str) -> Self {
        *self.tx_infos.lock() = Some(TxInfos {
            nonce,
            gas_price: gas_price_wei.to_string(),
            balance: "1".into(),
        });
        self
    }

    pub fn with_identity(self, identity: &str, next_nonce: u64) -> Self {
        *self.identity_infos.lock() = Some(IdentityInfos {
            identity: identity.to_string(),
            next_nonce,
            balance: "0".into(),
        });
        self
    }

    pub fn with_fee_offers(self, offers: &[(&str, &str)]) -> Self {
        *self.fee_offers.lock() = Some(
            offers
                .iter()
                .map(|(fees, network)| MetaTransactionFees {
                    delegation_fees: fees.to_string(),
                    currency_network_of_fees: network.to_string(),
                })
                .collect(),
        );
        self
    }

    pub fn with_shield(self, shield: &str, network: &str, gateway: &str) -> Self {
        self.shields
            .lock()
            .insert(shield.to_string(), network.to_string());
        self.gateways
            .lock()
            .insert(network.to_string(), gateway.to_string());
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    /// Number of calls to the relay method `method`.
    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.split(' ').next() == Some(method))
            .count()
    }

    /// Total number of relay calls.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl RelayApi for ScriptedRelay {
    async fn network_details(&self, network: &str) -> Result<NetworkDetails, RelayError> {
        self.record(format!("network_details {network}"));
        // Every round trip takes a moment, even an unscripted one.
        let delay = self
            .network_delay
            .lock()
            .unwrap_or(Duration::from_millis(1));
        tokio::time::sleep(delay).await;
        self.networks
            .lock()
            .get(network)
            .cloned()
            .ok_or_else(|| not_found(format!("networks/{network}")))
    }

    async fn path_info(
        &self,
        network: &str,
        request: &PathRequest,
    ) -> Result<PathResponse, RelayError> {
        self.record(format!("path_info {network}"));
        self.path_requests
            .lock()
            .push((network.to_string(), request.clone()));
        self.paths
            .lock()
            .get(network)
            .cloned()
            .unwrap_or_else(|| Err(not_found(format!("networks/{network}/path-info"))))
    }

    async fn close_path_info(
        &self,
        network: &str,
        request: &PathRequest,
    ) -> Result<ClosePathResponse, RelayError> {
        self.record(format!("close_path_info {network}"));
        self.path_requests
            .lock()
            .push((network.to_string(), request.clone()));
        self.close_paths
            .lock()
            .get(network)
            .cloned()
            .ok_or_else(|| not_found(format!("networks/{network}/close-path-info")))
    }

    async fn tx_infos(&self, address: &str) -> Result<TxInfos, RelayError> {
        self.record(format!("tx_infos {address}"));
        self.tx_infos
            .lock()
            .clone()
            .ok_or_else(|| not_found(format!("users/{address}/txinfos")))
    }

    async fn identity_infos(&self, address: &str) -> Result<IdentityInfos, RelayError> {
        self.record(format!("identity_infos {address}"));
        self.identity_infos
            .lock()
            .clone()
            .ok_or_else(|| not_found(format!("identities/{address}")))
    }

    async fn meta_transaction_fees(
        &self,
        meta_transaction: &MetaTransaction,
    ) -> Result<Vec<MetaTransactionFees>, RelayError> {
        self.record("meta_transaction_fees".into());
        self.fee_requests.lock().push(meta_transaction.clone());
        self.fee_offers
            .lock()
            .clone()
            .ok_or_else(|| not_found("meta-transaction-fees".into()))
    }

    async fn shielded_network(&self, shield: &str) -> Result<NetworkSummary, RelayError> {
        self.record(format!("shielded_network {shield}"));
        self.shields
            .lock()
            .get(shield)
            .map(|network| NetworkSummary {
                address: network.clone(),
                name: "Shielded Euro".into(),
                abbreviation: "sEUR".into(),
            })
            .ok_or_else(|| not_found(format!("shields/{shield}/network")))
    }

    async fn gateway(&self, network: &str) -> Result<Gateway, RelayError> {
        self.record(format!("gateway {network}"));
        self.gateways
            .lock()
            .get(network)
            .map(|address| Gateway {
                address: address.clone(),
            })
            .ok_or_else(|| not_found(format!("networks/{network}/gateway")))
    }

    async fn send_signed_transaction(&self, raw_transaction: &str) -> Result<String, RelayError> {
        self.record("send_signed_transaction".into());
        self.sent.lock().push(raw_transaction.to_string());
        Ok("0xhash".into())
    }

    async fn send_signed_meta_transaction(
        &self,
        meta_transaction: &MetaTransaction,
    ) -> Result<String, RelayError> {
        self.record("send_signed_meta_transaction".into());
        self.sent
            .lock()
            .push(meta_transaction.signature.clone().unwrap_or_default());
        Ok("0xmetahash".into())
    }
}

// ---------------------------------------------------------------------------
// RecordingEncoder
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingEncoder {
    pub calls: Mutex<Vec<ContractCall>>,
}

impl RecordingEncoder {
    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last(&self) -> ContractCall {
        self.calls
            .lock()
            .last()
            .cloned()
            .expect("encoder was never called")
    }
}

impl CallEncoder for RecordingEncoder {
    fn encode(&self, call: &ContractCall) -> Result<String, EncodeError> {
        self.calls.lock().push(call.clone());
        Ok(CALL_DATA.to_string())
    }
}

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

/// Signs with a fixed marker instead of a key.
pub struct MarkerSigner;

#[async_trait]
impl TxSigner for MarkerSigner {
    async fn sign(
        &self,
        raw_tx: &RawTx,
    ) -> Result<SignedTx, Box<dyn std::error::Error + Send + Sync>> {
        if raw_tx.delegation_fees.is_some() {
            let mut meta = MetaTransaction::from_raw_tx(raw_tx);
            meta.signature = Some("0xsig".into());
            Ok(SignedTx::Meta(meta))
        } else {
            Ok(SignedTx::Raw(format!("0xsigned{}", raw_tx.nonce)))
        }
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub struct Harness {
    pub relay: Arc<ScriptedRelay>,
    pub encoder: Arc<RecordingEncoder>,
    pub client: CreditNetClient,
}

pub fn harness(relay: ScriptedRelay, account: Account) -> Harness {
    let relay = Arc::new(relay);
    let encoder = Arc::new(RecordingEncoder::default());
    let client = CreditNetClient::new(
        relay.clone(),
        encoder.clone(),
        account,
        &ClientConfig::default(),
    );
    Harness {
        relay,
        encoder,
        client,
    }
}

pub fn proof() -> Vec<String> {
    (1..=8).map(|i| i.to_string()).collect()
}

/// `0x` plus the 64-digit hex rendering of `n`.
pub fn word(n: u64) -> String {
    format!("0x{n:064x}")
}
