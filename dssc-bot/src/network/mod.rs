//! Chain access: VM queries, contract views, transaction history, accounts
//! and transaction submission.
//!
//! Every request goes through one `reqwest::Client` carrying the configured
//! timeout. Gateway responses share the `{data, error, code}` envelope; a
//! non-empty `error` surfaces as [`BotError::Query`].

mod account;
mod contract;
mod query;
mod transactions;

pub use transactions::{ScResult, Transaction, TxDirection};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::NetworkEndpoints;
use crate::error::{BotError, BotResult};
use crate::models::NetworkConfig;

/// Gateway response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    error: String,
    #[allow(dead_code)]
    #[serde(default)]
    code: String,
}

#[derive(Debug, Deserialize)]
struct NetworkConfigData {
    config: RawNetworkConfig,
}

#[derive(Debug, Deserialize)]
struct RawNetworkConfig {
    erd_chain_id: String,
    erd_denomination: u32,
    erd_round_duration: u64,
    #[serde(default)]
    erd_min_gas_price: u64,
}

pub struct NetworkClient {
    http: reqwest::Client,
    endpoints: NetworkEndpoints,
    config: NetworkConfig,
}

impl NetworkClient {
    pub fn new(endpoints: NetworkEndpoints, config: NetworkConfig) -> BotResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(endpoints.timeout)
            .build()
            .map_err(|e| BotError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            endpoints,
            config,
        })
    }

    /// Build a client and load the network config from the meta observer
    pub async fn connect(endpoints: NetworkEndpoints) -> BotResult<Self> {
        let mut client = Self::new(endpoints, NetworkConfig::default())?;
        client.config = client.fetch_network_config().await?;
        log::info!(
            "[network] chain {} (denomination {}, round {} ms)",
            client.config.chain_id,
            client.config.denomination,
            client.config.round_duration_ms
        );
        Ok(client)
    }

    pub fn network_config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn denomination(&self) -> u32 {
        self.config.denomination
    }

    pub async fn fetch_network_config(&self) -> BotResult<NetworkConfig> {
        let url = format!("{}/network/config", self.endpoints.meta_observer);
        let data: NetworkConfigData = self.get_enveloped(&url).await?;
        let raw = data.config;
        Ok(NetworkConfig {
            chain_id: raw.erd_chain_id,
            denomination: raw.erd_denomination,
            round_duration_ms: raw.erd_round_duration,
            min_gas_price: raw.erd_min_gas_price,
        })
    }

    async fn get_enveloped<T: DeserializeOwned>(&self, url: &str) -> BotResult<T> {
        log::debug!("[network] GET {}", url);
        let response = self.http.get(url).send().await?;
        read_envelope(url, response).await
    }

    async fn post_enveloped<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> BotResult<T> {
        log::debug!("[network] POST {}", url);
        let response = self.http.post(url).json(body).send().await?;
        read_envelope(url, response).await
    }
}

async fn read_envelope<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> BotResult<T> {
    let status = response.status();
    let body = response.text().await?;

    let envelope: Envelope<T> = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => {
            return Err(BotError::malformed(format!("{} from {}", e, url)));
        }
        Err(_) => {
            return Err(BotError::Transport(format!(
                "HTTP {} from {}: {}",
                status,
                url,
                if body.is_empty() { "empty response" } else { &body }
            )));
        }
    };

    if !envelope.error.is_empty() {
        return Err(BotError::Query(envelope.error));
    }
    envelope
        .data
        .ok_or_else(|| BotError::malformed(format!("missing data in response from {}", url)))
}
