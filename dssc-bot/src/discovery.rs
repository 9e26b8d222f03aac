//! Locates the delegation contract created by the owner.
//!
//! The delegation manager answers `createNewDelegationContract` with a smart
//! contract result `@6f6b@<hex pubkey>`. The loop scans the manager's recent
//! inbound transactions for a successful one sent by the owner and publishes
//! the decoded address through the shared [`ContractDirectory`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::oneshot;
use tokio::time::interval;

use crate::address::{self, DELEGATION_MANAGER};
use crate::db::Database;
use crate::error::BotResult;
use crate::network::{NetworkClient, Transaction, TxDirection};

/// Transactions fetched per scan
pub const DISCOVERY_WINDOW: usize = 3000;

/// `@` + hex("ok") + `@`
const OK_MARKER: &str = "@6f6b@";
const CREATED_RESULT_LEN: usize = 70;
const SUCCESS: &str = "success";

/// Process-wide known contract address. Empty means unknown.
#[derive(Debug, Default)]
pub struct ContractDirectory {
    address: RwLock<Option<String>>,
}

impl ContractDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.address.read().clone()
    }

    pub fn set(&self, address: String) {
        *self.address.write() = Some(address);
    }

    pub fn invalidate(&self) {
        *self.address.write() = None;
    }
}

#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Most recent `size` transactions received by `address`
    async fn received_transactions(&self, address: &str, size: usize) -> BotResult<Vec<Transaction>>;
}

#[async_trait]
impl TransactionSource for NetworkClient {
    async fn received_transactions(&self, address: &str, size: usize) -> BotResult<Vec<Transaction>> {
        self.query_last_transactions(address, size, TxDirection::Receiver).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    Found(String),
    NotFound,
    /// Address already known and the owner did not change
    Unchanged,
    TransientError(String),
}

/// Contract address created by `owner` through the delegation manager,
/// scanning the whole batch
pub fn find_contract_address(transactions: &[Transaction], owner: &str) -> Option<String> {
    transactions
        .iter()
        .filter(|tx| tx.sender == owner && tx.receiver == DELEGATION_MANAGER && tx.status == SUCCESS)
        .find_map(|tx| {
            let address = tx
                .results()
                .iter()
                .filter_map(|result| result.payload())
                .find_map(|payload| decode_created_result(&payload))?;
            log::debug!(
                "[discovery] {} created by transaction {}",
                address,
                tx.hash.as_deref().unwrap_or("<unknown>")
            );
            Some(address)
        })
}

fn decode_created_result(payload: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(payload).ok()?;
    if text.len() != CREATED_RESULT_LEN {
        return None;
    }
    let pubkey = hex::decode(text.strip_prefix(OK_MARKER)?).ok()?;
    address::pubkey_to_bech32(&pubkey).ok()
}

pub struct ContractDiscovery {
    db: Arc<Database>,
    source: Arc<dyn TransactionSource>,
    directory: Arc<ContractDirectory>,
    interval: Duration,
    last_owner: Mutex<Option<String>>,
}

impl ContractDiscovery {
    pub fn new(
        db: Arc<Database>,
        source: Arc<dyn TransactionSource>,
        directory: Arc<ContractDirectory>,
        interval: Duration,
    ) -> Self {
        Self {
            db,
            source,
            directory,
            interval,
            last_owner: Mutex::new(None),
        }
    }

    /// Run until `shutdown_rx` fires
    pub async fn start(self: Arc<Self>, mut shutdown_rx: oneshot::Receiver<()>) {
        log::info!("[discovery] Starting contract discovery (every {:?})", self.interval);
        let mut ticker = interval(self.interval);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    log::info!("[discovery] Received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        log::info!("[discovery] Stopped");
    }

    pub async fn tick(&self) -> DiscoveryOutcome {
        let owner = match self.db.get_owner_address() {
            Ok(owner) => owner,
            Err(e) => {
                log::warn!("[discovery] Failed to read owner address: {}", e);
                return DiscoveryOutcome::TransientError(e.to_string());
            }
        };

        let owner_changed = {
            let mut last = self.last_owner.lock();
            if *last != owner {
                *last = owner.clone();
                true
            } else {
                false
            }
        };
        if owner_changed {
            self.directory.invalidate();
        } else if self.directory.get().is_some() {
            return DiscoveryOutcome::Unchanged;
        }

        let Some(owner) = owner else {
            return DiscoveryOutcome::NotFound;
        };

        let transactions = match self
            .source
            .received_transactions(DELEGATION_MANAGER, DISCOVERY_WINDOW)
            .await
        {
            Ok(transactions) => transactions,
            Err(e) => {
                log::debug!("[discovery] Transaction scan failed: {}", e);
                return DiscoveryOutcome::TransientError(e.to_string());
            }
        };

        match find_contract_address(&transactions, &owner) {
            Some(contract) => {
                log::info!("[discovery] Contract of {} found at {}", owner, contract);
                self.directory.set(contract.clone());
                DiscoveryOutcome::Found(contract)
            }
            None => DiscoveryOutcome::NotFound,
        }
    }
}
