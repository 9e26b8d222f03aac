//! Typed delegation contract views

use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;

use super::NetworkClient;
use super::query::into_pairs;
use crate::address::{self, SYSTEM_CALLER};
use crate::amount::{decode_unsigned, to_decimal};
use crate::error::{BotError, BotResult};
use crate::models::{ContractInfo, NodeState, UndelegatedEntry};

/// Aggregates shown to the owner under the contract info
#[derive(Debug, Clone, Default)]
pub struct ContractTotals {
    pub num_nodes: Option<u64>,
    pub num_users: Option<u64>,
    pub active_stake: Option<BigDecimal>,
    pub cumulated_rewards: Option<BigDecimal>,
    pub unstaked: Option<BigDecimal>,
    pub unstaked_from_nodes: Option<BigDecimal>,
    pub unbonded_from_nodes: Option<BigDecimal>,
}

impl NetworkClient {
    async fn user_amount(&self, contract: &str, function: &str, user: &str) -> BotResult<BigDecimal> {
        let args = [address::hex_pubkey(user)?];
        let value = self.query_int(contract, function, &args).await?;
        Ok(to_decimal(&value, self.denomination()))
    }

    async fn total_amount(&self, contract: &str, function: &str) -> BotResult<BigDecimal> {
        let value = self.query_int(contract, function, &[]).await?;
        Ok(to_decimal(&value, self.denomination()))
    }

    async fn count(&self, contract: &str, function: &str) -> BotResult<u64> {
        let value = self.query_int(contract, function, &[]).await?;
        value
            .to_u64()
            .ok_or_else(|| BotError::malformed(format!("{} does not fit in u64", function)))
    }

    pub async fn user_active_stake(&self, contract: &str, user: &str) -> BotResult<BigDecimal> {
        self.user_amount(contract, "getUserActiveStake", user).await
    }

    pub async fn user_unbondable(&self, contract: &str, user: &str) -> BotResult<BigDecimal> {
        self.user_amount(contract, "getUserUnBondable", user).await
    }

    pub async fn user_unstaked_value(&self, contract: &str, user: &str) -> BotResult<BigDecimal> {
        self.user_amount(contract, "getUserUnStakedValue", user).await
    }

    pub async fn claimable_rewards(&self, contract: &str, user: &str) -> BotResult<BigDecimal> {
        self.user_amount(contract, "getClaimableRewards", user).await
    }

    /// Pending undelegations with the rounds left until each can be withdrawn
    pub async fn user_undelegated_list(&self, contract: &str, user: &str) -> BotResult<Vec<UndelegatedEntry>> {
        let args = [address::hex_pubkey(user)?];
        let pairs = self.query_pairs(contract, "getUserUnDelegatedList", &args).await?;
        Ok(pairs
            .into_iter()
            .map(|(amount, rounds)| UndelegatedEntry {
                amount: decode_unsigned(&amount),
                rounds: decode_unsigned(&rounds),
            })
            .collect())
    }

    pub async fn contract_info(&self, contract: &str) -> BotResult<ContractInfo> {
        let fields = self.query_bytes(contract, "getContractConfig", &[]).await?;
        ContractInfo::decode(&fields)
    }

    pub async fn all_node_states(&self, contract: &str) -> BotResult<Vec<NodeState>> {
        let list = self.query_bytes(contract, "getAllNodeStates", &[]).await?;
        Ok(into_pairs(list)?
            .into_iter()
            .map(|(state, key)| NodeState {
                state: String::from_utf8_lossy(&state).into_owned(),
                key,
            })
            .collect())
    }

    pub async fn total_active_stake(&self, contract: &str) -> BotResult<BigDecimal> {
        self.total_amount(contract, "getTotalActiveStake").await
    }

    pub async fn total_unstaked(&self, contract: &str) -> BotResult<BigDecimal> {
        self.total_amount(contract, "getTotalUnStaked").await
    }

    pub async fn total_unstaked_from_nodes(&self, contract: &str) -> BotResult<BigDecimal> {
        self.total_amount(contract, "getTotalUnStakedFromNodes").await
    }

    pub async fn total_unbonded_from_nodes(&self, contract: &str) -> BotResult<BigDecimal> {
        self.total_amount(contract, "getTotalUnBondedFromNodes").await
    }

    /// Only answers when called from the system caller address
    pub async fn total_cumulated_rewards(&self, contract: &str) -> BotResult<BigDecimal> {
        let value = self
            .query_int_as(contract, "getTotalCumulatedRewards", &[], Some(SYSTEM_CALLER))
            .await?;
        Ok(to_decimal(&value, self.denomination()))
    }

    pub async fn num_users(&self, contract: &str) -> BotResult<u64> {
        self.count(contract, "getNumUsers").await
    }

    pub async fn num_nodes(&self, contract: &str) -> BotResult<u64> {
        self.count(contract, "getNumNodes").await
    }

    /// Every total is fetched independently; a failing view leaves its field empty
    pub async fn contract_totals(&self, contract: &str) -> ContractTotals {
        fn keep<T>(function: &str, result: BotResult<T>) -> Option<T> {
            result
                .map_err(|e| log::warn!("[network] {} failed: {}", function, e))
                .ok()
        }

        ContractTotals {
            num_nodes: keep("getNumNodes", self.num_nodes(contract).await),
            num_users: keep("getNumUsers", self.num_users(contract).await),
            active_stake: keep("getTotalActiveStake", self.total_active_stake(contract).await),
            cumulated_rewards: keep(
                "getTotalCumulatedRewards",
                self.total_cumulated_rewards(contract).await,
            ),
            unstaked: keep("getTotalUnStaked", self.total_unstaked(contract).await),
            unstaked_from_nodes: keep(
                "getTotalUnStakedFromNodes",
                self.total_unstaked_from_nodes(contract).await,
            ),
            unbonded_from_nodes: keep(
                "getTotalUnBondedFromNodes",
                self.total_unbonded_from_nodes(contract).await,
            ),
        }
    }
}
