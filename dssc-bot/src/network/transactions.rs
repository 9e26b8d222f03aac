//! Transaction history from the indexing API

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use strum::AsRefStr;

use super::NetworkClient;
use crate::error::{BotError, BotResult};

/// Which side of a transaction the queried address is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum TxDirection {
    Sender,
    Receiver,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    #[serde(rename = "txHash", alias = "hash", default)]
    pub hash: Option<String>,
    pub sender: String,
    pub receiver: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "scResults", alias = "results", default)]
    pub sc_results: Option<Vec<ScResult>>,
}

/// Smart contract result attached to a transaction
#[derive(Debug, Clone, Deserialize)]
pub struct ScResult {
    /// Base64 payload
    #[serde(default)]
    pub data: Option<String>,
}

impl ScResult {
    /// Decoded payload. Results that are not valid base64 yield `None`.
    pub fn payload(&self) -> Option<Vec<u8>> {
        let data = self.data.as_deref()?;
        STANDARD.decode(data.as_bytes()).ok()
    }
}

impl Transaction {
    pub fn results(&self) -> &[ScResult] {
        self.sc_results.as_deref().unwrap_or_default()
    }
}

impl NetworkClient {
    /// Most recent `size` transactions on one side of `address`
    pub async fn query_last_transactions(
        &self,
        address: &str,
        size: usize,
        direction: TxDirection,
    ) -> BotResult<Vec<Transaction>> {
        let url = format!(
            "{}/transactions?from=0&size={}&{}={}",
            self.endpoints.api,
            size,
            direction.as_ref(),
            address
        );
        log::debug!("[network] GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BotError::Transport(format!("HTTP {} from {}", status, url)));
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BotError::malformed(format!("transactions: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkEndpoints;
    use crate::models::NetworkConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_direction_names() {
        assert_eq!(TxDirection::Receiver.as_ref(), "receiver");
        assert_eq!(TxDirection::Sender.as_ref(), "sender");
    }

    #[test]
    fn test_payload_decoding() {
        let ok = ScResult { data: Some("QDZmNmI=".to_string()) };
        assert_eq!(ok.payload().unwrap(), b"@6f6b".to_vec());
        let bad = ScResult { data: Some("@@@".to_string()) };
        assert!(bad.payload().is_none());
        assert!(ScResult { data: None }.payload().is_none());
    }

    #[tokio::test]
    async fn test_query_last_transactions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transactions"))
            .and(query_param("from", "0"))
            .and(query_param("size", "3000"))
            .and(query_param("receiver", "erd1factory"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "txHash": "abc",
                    "sender": "erd1owner",
                    "receiver": "erd1factory",
                    "status": "success",
                    "scResults": [{"data": "QDZmNmI="}, {"value": "0"}]
                },
                {"sender": "erd1other", "receiver": "erd1factory", "status": "fail"}
            ])))
            .mount(&server)
            .await;

        let client =
            NetworkClient::new(NetworkEndpoints::single(&server.uri()), NetworkConfig::default()).unwrap();
        let txs = client
            .query_last_transactions("erd1factory", 3000, TxDirection::Receiver)
            .await
            .unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].hash.as_deref(), Some("abc"));
        assert_eq!(txs[0].results().len(), 2);
        assert!(txs[1].results().is_empty());
    }

    #[tokio::test]
    async fn test_query_last_transactions_bad_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transactions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client =
            NetworkClient::new(NetworkEndpoints::single(&server.uri()), NetworkConfig::default()).unwrap();
        let result = client
            .query_last_transactions("erd1factory", 10, TxDirection::Receiver)
            .await;
        assert!(matches!(result, Err(BotError::MalformedResponse(_))));
    }
}
