//! HTTP implementation of [`RelayApi`] on top of `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use super::types::{
    ClosePathResponse, Gateway, IdentityInfos, MetaTransactionFees, NetworkDetails,
    NetworkSummary, PathRequest, PathResponse, TxInfos,
};
use super::{RelayApi, RelayError};
use crate::transaction::MetaTransaction;

/// Relay client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRelay {
    client: Client,
    base: Url,
}

impl HttpRelay {
    /// Creates a client for the relay API rooted at `relay_api_url`.
    pub fn new(relay_api_url: &str, timeout: Duration) -> Result<Self, RelayError> {
        // Url::join drops the last path segment unless the base ends in '/'.
        let mut root = relay_api_url.trim_end_matches('/').to_string();
        root.push('/');
        let base = Url::parse(&root).map_err(|e| RelayError::Transport {
            endpoint: relay_api_url.to_string(),
            message: format!("invalid relay url: {e}"),
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Transport {
                endpoint: relay_api_url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { client, base })
    }

    /// The normalized API root, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolves an endpoint against the API root. Leading slashes are
    /// ignored, so `/identities/0x..` and `identities/0x..` are the same.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, RelayError> {
        self.base
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| RelayError::Transport {
                endpoint: endpoint.to_string(),
                message: format!("invalid endpoint: {e}"),
            })
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, RelayError> {
        let url = self.endpoint_url(endpoint)?;
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(endpoint, e))?;
        decode(endpoint, response).await
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, RelayError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint_url(endpoint)?;
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(endpoint, e))?;
        decode(endpoint, response).await
    }
}

fn transport(endpoint: &str, error: reqwest::Error) -> RelayError {
    RelayError::Transport {
        endpoint: endpoint.to_string(),
        message: error.to_string(),
    }
}

async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, RelayError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RelayError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    let bytes = response.bytes().await.map_err(|e| transport(endpoint, e))?;
    serde_json::from_slice(&bytes).map_err(|e| RelayError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl RelayApi for HttpRelay {
    #[instrument(skip(self))]
    async fn network_details(&self, network: &str) -> Result<NetworkDetails, RelayError> {
        self.get(&format!("networks/{network}")).await
    }

    #[instrument(skip(self, request))]
    async fn path_info(
        &self,
        network: &str,
        request: &PathRequest,
    ) -> Result<PathResponse, RelayError> {
        self.post(&format!("networks/{network}/path-info"), request)
            .await
    }

    #[instrument(skip(self, request))]
    async fn close_path_info(
        &self,
        network: &str,
        request: &PathRequest,
    ) -> Result<ClosePathResponse, RelayError> {
        self.post(&format!("networks/{network}/close-path-info"), request)
            .await
    }

    #[instrument(skip(self))]
    async fn tx_infos(&self, address: &str) -> Result<TxInfos, RelayError> {
        self.get(&format!("users/{address}/txinfos")).await
    }

    #[instrument(skip(self))]
    async fn identity_infos(&self, address: &str) -> Result<IdentityInfos, RelayError> {
        self.get(&format!("/identities/{address}")).await
    }

    #[instrument(skip_all)]
    async fn meta_transaction_fees(
        &self,
        meta_transaction: &MetaTransaction,
    ) -> Result<Vec<MetaTransactionFees>, RelayError> {
        self.post(
            "/meta-transaction-fees",
            &json!({ "metaTransaction": meta_transaction }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn shielded_network(&self, shield: &str) -> Result<NetworkSummary, RelayError> {
        self.get(&format!("shields/{shield}/network")).await
    }

    #[instrument(skip(self))]
    async fn gateway(&self, network: &str) -> Result<Gateway, RelayError> {
        self.get(&format!("networks/{network}/gateway")).await
    }

    #[instrument(skip_all)]
    async fn send_signed_transaction(&self, raw_transaction: &str) -> Result<String, RelayError> {
        self.post("relay", &json!({ "rawTransaction": raw_transaction }))
            .await
    }

    #[instrument(skip_all)]
    async fn send_signed_meta_transaction(
        &self,
        meta_transaction: &MetaTransaction,
    ) -> Result<String, RelayError> {
        self.post(
            "relay-meta-transaction",
            &json!({ "metaTransaction": meta_transaction }),
        )
        .await
    }
}
