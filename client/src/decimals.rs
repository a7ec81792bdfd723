//! Per-network decimals, memoized for the lifetime of a client.
//!
//! Every amount conversion needs the decimals of the currency network it
//! belongs to. They never change after a network is deployed, so the first
//! lookup per network goes to the relay and every later one is served from
//! memory. Concurrent lookups of the same uncached network share one
//! in-flight request, and its outcome, failures included.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::error::PrepareError;
use crate::relay::{RelayApi, RelayError};

/// One relay lookup, awaited by everyone who asked while it was pending.
type Flight = Shared<BoxFuture<'static, Result<DecimalsObject, RelayError>>>;

/// Decimals configuration of a currency network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecimalsObject {
    /// Decimals of balances, credit limits and transfer values.
    pub network_decimals: u32,
    /// Decimals of interest rates.
    pub interest_rate_decimals: u32,
}

/// Decimals a caller already knows and wants to skip the lookup for.
///
/// Entry points accept `impl Into<DecimalsOptions>`: a bare `u32` means
/// "the network decimals are this", the struct form can also carry the
/// interest rate decimals. When both are present no lookup happens at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecimalsOptions {
    /// Known network decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_decimals: Option<u32>,
    /// Known interest rate decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_rate_decimals: Option<u32>,
}

impl DecimalsOptions {
    /// Both values are known; nothing needs fetching.
    pub fn complete(&self) -> Option<DecimalsObject> {
        Some(DecimalsObject {
            network_decimals: self.network_decimals?,
            interest_rate_decimals: self.interest_rate_decimals?,
        })
    }
}

impl From<u32> for DecimalsOptions {
    fn from(network_decimals: u32) -> Self {
        Self {
            network_decimals: Some(network_decimals),
            interest_rate_decimals: None,
        }
    }
}

impl From<DecimalsObject> for DecimalsOptions {
    fn from(d: DecimalsObject) -> Self {
        Self {
            network_decimals: Some(d.network_decimals),
            interest_rate_decimals: Some(d.interest_rate_decimals),
        }
    }
}

/// Memoized, single-flight decimals lookup.
///
/// Owned by one [`crate::CreditNetClient`]; there is no process-wide cache.
/// Entries are never evicted. A failed fetch fails every caller that joined
/// it and is then dropped, so the next caller fetches again.
pub struct DecimalsCache {
    relay: Arc<dyn RelayApi>,
    entries: DashMap<String, Flight>,
}

impl DecimalsCache {
    /// Creates an empty cache backed by `relay`.
    pub fn new(relay: Arc<dyn RelayApi>) -> Self {
        Self {
            relay,
            entries: DashMap::new(),
        }
    }

    /// Returns the decimals of `network`, fetching them on first use.
    #[instrument(skip(self))]
    pub async fn get(&self, network: &str) -> Result<DecimalsObject, PrepareError> {
        let key = network.to_ascii_lowercase();
        // The flight is cloned out so the map guard is released before awaiting.
        let flight = match self.entries.entry(key.clone()) {
            Entry::Occupied(entry) => {
                if let Some(Ok(decimals)) = entry.get().peek() {
                    trace!(network, "decimals cache HIT");
                    return Ok(*decimals);
                }
                trace!(network, "joining in-flight decimals lookup");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                debug!(network, "decimals cache MISS - fetching from relay");
                let flight = self.fetch(network);
                entry.insert(flight.clone());
                flight
            }
        };

        match flight.clone().await {
            Ok(decimals) => Ok(decimals),
            Err(source) => {
                self.entries
                    .remove_if(&key, |_, current| current.ptr_eq(&flight));
                Err(PrepareError::DecimalsUnavailable {
                    network: network.to_string(),
                    source,
                })
            }
        }
    }

    fn fetch(&self, network: &str) -> Flight {
        let relay = Arc::clone(&self.relay);
        let network = network.to_string();
        async move {
            let details = relay.network_details(&network).await?;
            Ok(DecimalsObject {
                network_decimals: details.decimals,
                interest_rate_decimals: details.interest_rate_decimals,
            })
        }
        .boxed()
        .shared()
    }

    /// Merges caller-known decimals with the cached lookup. Fetches only
    /// when at least one value is missing.
    pub async fn resolve(
        &self,
        network: &str,
        options: impl Into<DecimalsOptions>,
    ) -> Result<DecimalsObject, PrepareError> {
        let options = options.into();
        if let Some(known) = options.complete() {
            return Ok(known);
        }
        let fetched = self.get(network).await?;
        Ok(DecimalsObject {
            network_decimals: options.network_decimals.unwrap_or(fetched.network_decimals),
            interest_rate_decimals: options
                .interest_rate_decimals
                .unwrap_or(fetched.interest_rate_decimals),
        })
    }

    /// Returns `true` if the decimals of `network` are already cached.
    pub fn is_cached(&self, network: &str) -> bool {
        self.entries
            .get(&network.to_ascii_lowercase())
            .map(|flight| matches!(flight.peek(), Some(Ok(_))))
            .unwrap_or(false)
    }

    /// Number of networks with cached decimals.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.value().peek(), Some(Ok(_))))
            .count()
    }

    /// Returns `true` if nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for DecimalsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecimalsCache")
            .field("cached", &self.len())
            .finish_non_exhaustive()
    }
}
