//! Decoded delegation contract views.

use std::time::Duration;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::amount::decode_unsigned;
use crate::error::{BotError, BotResult};

const TRUE_LITERAL: &[u8] = b"true";
const CONTRACT_CONFIG_FIELDS: usize = 9;

/// Snapshot of `getContractConfig`. Never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractInfo {
    /// Percent, e.g. `12.5`
    pub service_fee: BigDecimal,
    /// Denominated
    pub max_delegation_cap: BigUint,
    /// Denominated
    pub initial_owner_funds: BigUint,
    pub automatic_activation: bool,
    pub with_delegation_cap: bool,
    pub changeable_service_fee: bool,
    pub created_nonce: BigUint,
    pub unbond_period: BigUint,
}

impl ContractInfo {
    /// Positional decode of the 9-element `getContractConfig` result.
    /// Element 0 (owner address) is not used.
    pub fn decode(fields: &[Vec<u8>]) -> BotResult<Self> {
        if fields.len() != CONTRACT_CONFIG_FIELDS {
            return Err(BotError::malformed(format!(
                "getContractConfig returned {} elements, expected {}",
                fields.len(),
                CONTRACT_CONFIG_FIELDS
            )));
        }

        let fee_basis_points = BigInt::from(decode_unsigned(&fields[1]));
        Ok(Self {
            service_fee: BigDecimal::new(fee_basis_points, 2),
            max_delegation_cap: decode_unsigned(&fields[2]),
            initial_owner_funds: decode_unsigned(&fields[3]),
            automatic_activation: fields[4] == TRUE_LITERAL,
            with_delegation_cap: fields[5] == TRUE_LITERAL,
            changeable_service_fee: fields[6] == TRUE_LITERAL,
            created_nonce: decode_unsigned(&fields[7]),
            unbond_period: decode_unsigned(&fields[8]),
        })
    }
}

/// One entry of `getAllNodeStates`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeState {
    pub state: String,
    pub key: Vec<u8>,
}

impl NodeState {
    pub fn key_hex(&self) -> String {
        hex::encode(&self.key)
    }
}

/// One entry of `getUserUnDelegatedList`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndelegatedEntry {
    pub amount: BigUint,
    /// Rounds left until the amount can be withdrawn
    pub rounds: BigUint,
}

impl UndelegatedEntry {
    pub fn eta(&self, round_duration_ms: u64) -> Duration {
        let rounds = self.rounds.to_u64().unwrap_or(u64::MAX);
        Duration::from_millis(rounds.saturating_mul(round_duration_ms))
    }
}

/// Subset of `/network/config` the bot needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub chain_id: String,
    pub denomination: u32,
    pub round_duration_ms: u64,
    pub min_gas_price: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: "1".to_string(),
            denomination: crate::amount::DEFAULT_DENOMINATION,
            round_duration_ms: 6000,
            min_gas_price: 1_000_000_000,
        }
    }
}
