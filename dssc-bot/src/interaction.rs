//! Deep links that hand an unsigned transaction to the web wallet for signing.

use std::fmt;

use num_bigint::BigUint;
use strum::{AsRefStr, Display, EnumString};

use crate::amount::encode_argument;

/// Delegation contract and delegation manager endpoints the bot builds calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum ContractFunction {
    Delegate,
    UnDelegate,
    Withdraw,
    ReDelegateRewards,
    ClaimRewards,
    StakeNodes,
    UnStakeNodes,
    UnBondNodes,
    ReStakeUnStakedNodes,
    UnJailNodes,
    RemoveNodes,
    AddNodes,
    ChangeServiceFee,
    ModifyTotalDelegationCap,
    SetAutomaticActivation,
    CreateNewDelegationContract,
}

impl ContractFunction {
    pub fn gas_limit(&self) -> u64 {
        match self {
            Self::ClaimRewards
            | Self::ChangeServiceFee
            | Self::ModifyTotalDelegationCap
            | Self::SetAutomaticActivation
            | Self::AddNodes => 6_000_000,
            Self::CreateNewDelegationContract => 60_000_000,
            _ => 12_000_000,
        }
    }
}

/// `function[@arg]*` call data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub function: ContractFunction,
    pub args: Vec<String>,
}

impl ContractCall {
    pub fn new(function: ContractFunction) -> Self {
        Self {
            function,
            args: Vec::new(),
        }
    }

    /// Integer argument, minimal big-endian hex
    pub fn arg(mut self, value: &BigUint) -> Self {
        self.args.push(encode_argument(value));
        self
    }

    /// Argument that is already hex
    pub fn raw_arg(mut self, hex: impl Into<String>) -> Self {
        self.args.push(hex.into());
        self
    }

    pub fn gas_limit(&self) -> u64 {
        self.function.gas_limit()
    }
}

impl fmt::Display for ContractCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.function)?;
        for arg in &self.args {
            write!(f, "@{}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct InteractionLinkBuilder {
    wallet_hook: String,
}

impl InteractionLinkBuilder {
    pub fn new(wallet_hook: impl Into<String>) -> Self {
        Self {
            wallet_hook: wallet_hook.into().trim_end_matches('/').to_string(),
        }
    }

    /// `{hook}/hook/transaction?receiver=..&value=..&gasLimit=..&data=..&callbackUrl=none`
    pub fn link(&self, receiver: &str, value: &BigUint, call: &ContractCall) -> String {
        format!(
            "{}/hook/transaction?receiver={}&value={}&gasLimit={}&data={}&callbackUrl=none",
            self.wallet_hook,
            receiver,
            value,
            call.gas_limit(),
            call
        )
    }

    /// Zero-value call
    pub fn call(&self, receiver: &str, call: &ContractCall) -> String {
        self.link(receiver, &BigUint::default(), call)
    }
}
