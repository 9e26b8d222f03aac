//! Accounts, transaction signing and submission

use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bigdecimal::BigDecimal;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::NetworkClient;
use crate::address::DELEGATION_MANAGER;
use crate::amount::to_chain_units;
use crate::error::{BotError, BotResult};
use crate::interaction::{ContractCall, ContractFunction};
use crate::keys::WalletKey;

/// Tokens locked by the delegation manager when a contract is created
const CONTRACT_CREATION_COST: u32 = 1250;
const FALLBACK_GAS_PRICE: u64 = 1_000_000_000;
const TX_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: String,
    pub nonce: u64,
    pub balance: BigUint,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    account: RawAccount,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    address: String,
    nonce: u64,
    balance: String,
}

#[derive(Debug, Deserialize)]
struct SendData {
    #[serde(rename = "txHash")]
    tx_hash: String,
}

/// A transaction as submitted to the gateway.
///
/// Field order matters: the signature covers the JSON serialization of every
/// field except `signature`, in declaration order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingTransaction {
    pub nonce: u64,
    pub value: String,
    pub receiver: String,
    pub sender: String,
    pub gas_price: u64,
    pub gas_limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(rename = "chainID")]
    pub chain_id: String,
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl OutgoingTransaction {
    /// Bytes covered by the signature
    pub fn signing_payload(&self) -> BotResult<Vec<u8>> {
        let mut unsigned = self.clone();
        unsigned.signature = None;
        serde_json::to_vec(&unsigned).map_err(|e| BotError::Key(format!("cannot serialize transaction: {}", e)))
    }

    pub fn sign(mut self, key: &WalletKey) -> BotResult<Self> {
        let payload = self.signing_payload()?;
        self.signature = Some(hex::encode(key.sign(&payload)));
        Ok(self)
    }
}

impl NetworkClient {
    pub async fn get_account(&self, address: &str) -> BotResult<Account> {
        let url = format!("{}/address/{}", self.endpoints.proxy, address);
        let data: AccountData = self.get_enveloped(&url).await?;
        let balance = BigUint::from_str(&data.account.balance)
            .map_err(|_| BotError::malformed(format!("invalid balance {:?}", data.account.balance)))?;
        Ok(Account {
            address: data.account.address,
            nonce: data.account.nonce,
            balance,
        })
    }

    /// Submit a signed transaction, returning its hash
    pub async fn send_transaction(&self, tx: &OutgoingTransaction) -> BotResult<String> {
        if tx.signature.is_none() {
            return Err(BotError::Key("transaction is not signed".into()));
        }
        let url = format!("{}/transaction/send", self.endpoints.proxy);
        let data: SendData = self.post_enveloped(&url, tx).await?;
        Ok(data.tx_hash)
    }

    /// Build, sign and submit `createNewDelegationContract` with the owner's key
    pub async fn create_delegation_contract(&self, private_key_hex: &str) -> BotResult<String> {
        let key = WalletKey::from_hex(private_key_hex)?;
        let sender = key.address()?;
        let account = self.get_account(&sender).await?;

        let call = ContractCall::new(ContractFunction::CreateNewDelegationContract)
            .raw_arg("00")
            .raw_arg("00");
        let value = to_chain_units(&BigDecimal::from(CONTRACT_CREATION_COST), self.denomination())?;
        let gas_price = match self.config.min_gas_price {
            0 => FALLBACK_GAS_PRICE,
            price => price,
        };

        let tx = OutgoingTransaction {
            nonce: account.nonce,
            value: value.to_string(),
            receiver: DELEGATION_MANAGER.to_string(),
            sender: sender.clone(),
            gas_price,
            gas_limit: call.gas_limit(),
            data: Some(STANDARD.encode(call.to_string())),
            chain_id: self.config.chain_id.clone(),
            version: TX_VERSION,
            signature: None,
        }
        .sign(&key)?;

        let hash = self.send_transaction(&tx).await?;
        log::info!("[network] contract creation sent by {}: {}", sender, hash);
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkEndpoints;
    use crate::models::NetworkConfig;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const PUBKEY: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
    const ADDRESS: &str = "erd16adfsqvzky9t042tlmfujeq88g8wzuhnm2nzxfd0qgdx3ac82ydqr3ns5u";

    fn sample_tx() -> OutgoingTransaction {
        OutgoingTransaction {
            nonce: 7,
            value: "0".into(),
            receiver: "erd1receiver".into(),
            sender: "erd1sender".into(),
            gas_price: 1_000_000_000,
            gas_limit: 50_000,
            data: Some("aGk=".into()),
            chain_id: "D".into(),
            version: 1,
            signature: None,
        }
    }

    #[test]
    fn test_signing_payload_field_order() {
        let payload = sample_tx().signing_payload().unwrap();
        assert_eq!(
            String::from_utf8(payload).unwrap(),
            r#"{"nonce":7,"value":"0","receiver":"erd1receiver","sender":"erd1sender","gasPrice":1000000000,"gasLimit":50000,"data":"aGk=","chainID":"D","version":1}"#
        );

        let mut no_data = sample_tx();
        no_data.data = None;
        let payload = String::from_utf8(no_data.signing_payload().unwrap()).unwrap();
        assert!(!payload.contains("data"));
    }

    #[test]
    fn test_signature_covers_payload() {
        let key = WalletKey::from_hex(SEED).unwrap();
        let tx = sample_tx().sign(&key).unwrap();
        let signature = hex::decode(tx.signature.as_ref().unwrap()).unwrap();
        assert_eq!(signature.len(), 64);

        let pubkey: [u8; 32] = hex::decode(PUBKEY).unwrap().try_into().unwrap();
        let verifying = VerifyingKey::from_bytes(&pubkey).unwrap();
        let sig = Signature::from_slice(&signature).unwrap();
        assert!(verifying.verify(&tx.signing_payload().unwrap(), &sig).is_ok());
    }

    #[tokio::test]
    async fn test_get_account() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/address/{}", ADDRESS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"account": {
                    "address": ADDRESS,
                    "nonce": 12,
                    "balance": "2500000000000000000000",
                    "username": ""
                }},
                "error": "",
                "code": "successful"
            })))
            .mount(&server)
            .await;

        let client =
            NetworkClient::new(NetworkEndpoints::single(&server.uri()), NetworkConfig::default()).unwrap();
        let account = client.get_account(ADDRESS).await.unwrap();
        assert_eq!(account.nonce, 12);
        assert_eq!(account.balance.to_string(), "2500000000000000000000");
    }

    #[tokio::test]
    async fn test_send_requires_signature() {
        let client = NetworkClient::new(
            NetworkEndpoints::single("http://127.0.0.1:9"),
            NetworkConfig::default(),
        )
        .unwrap();
        let result = client.send_transaction(&sample_tx()).await;
        assert!(matches!(result, Err(BotError::Key(_))));
    }

    #[tokio::test]
    async fn test_create_delegation_contract() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/address/{}", ADDRESS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"account": {"address": ADDRESS, "nonce": 3, "balance": "0"}},
                "error": "",
                "code": "successful"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/transaction/send"))
            .and(body_partial_json(json!({
                "nonce": 3,
                "value": "1250000000000000000000",
                "receiver": DELEGATION_MANAGER,
                "sender": ADDRESS,
                "gasPrice": 1000000000u64,
                "gasLimit": 60000000u64,
                "data": "Y3JlYXRlTmV3RGVsZWdhdGlvbkNvbnRyYWN0QDAwQDAw",
                "chainID": "T",
                "version": 1
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"txHash": "f00d"},
                "error": "",
                "code": "successful"
            })))
            .mount(&server)
            .await;

        let config = NetworkConfig {
            chain_id: "T".into(),
            ..NetworkConfig::default()
        };
        let client = NetworkClient::new(NetworkEndpoints::single(&server.uri()), config).unwrap();
        let hash = client.create_delegation_contract(SEED).await.unwrap();
        assert_eq!(hash, "f00d");
    }
}
