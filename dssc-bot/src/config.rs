use std::env;
use std::time::Duration;

use bigdecimal::BigDecimal;
use num_traits::Signed;

use crate::amount::parse_decimal;
use crate::error::{BotError, BotResult};

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const BOT_TOKEN: &str = "DSSC_BOT_TOKEN";
    pub const BOT_OWNER: &str = "DSSC_BOT_OWNER";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const NETWORK_API: &str = "DSSC_NETWORK_API";
    pub const NETWORK_PROXY: &str = "DSSC_NETWORK_PROXY";
    pub const META_OBSERVER: &str = "DSSC_META_OBSERVER";
    pub const WALLET_HOOK: &str = "DSSC_WALLET_HOOK";
    pub const DISCOVERY_INTERVAL_SECS: &str = "DSSC_DISCOVERY_INTERVAL_SECS";
    pub const HTTP_TIMEOUT_SECS: &str = "DSSC_HTTP_TIMEOUT_SECS";
    pub const MIN_DELEGATION: &str = "DSSC_MIN_DELEGATION";
}

/// Default values
pub mod defaults {
    pub const DATABASE_URL: &str = "./.db/dssc.db";
    pub const NETWORK_API: &str = "https://api.elrond.com";
    pub const NETWORK_PROXY: &str = "https://gateway.elrond.com";
    pub const META_OBSERVER: &str = "https://gateway.elrond.com";
    pub const WALLET_HOOK: &str = "https://wallet.elrond.com";
    pub const DISCOVERY_INTERVAL_SECS: u64 = 10;
    pub const HTTP_TIMEOUT_SECS: u64 = 15;
    /// Protocol minimum for delegate / undelegate, in whole tokens
    pub const MIN_DELEGATION: &str = "10";
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    /// Telegram user id of the contract operator
    pub bot_owner: i64,
    pub database_url: String,
    pub network: NetworkEndpoints,
    pub wallet_hook: String,
    pub discovery_interval: Duration,
    /// Smallest delegate / undelegate amount, in whole tokens
    pub min_delegation: BigDecimal,
}

/// Base URLs of the chain services the bot talks to
#[derive(Clone, Debug)]
pub struct NetworkEndpoints {
    /// Elastic-backed API used for transaction history
    pub api: String,
    /// Gateway used for VM queries, accounts and transaction submission
    pub proxy: String,
    /// Metachain observer serving the network config
    pub meta_observer: String,
    pub timeout: Duration,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| default.to_string())
}

fn secs_or(name: &str, default: u64) -> Duration {
    let secs = env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|s: &u64| *s > 0)
        .unwrap_or(default);
    Duration::from_secs(secs)
}

impl Config {
    pub fn from_env() -> BotResult<Self> {
        let bot_token = env::var(env_vars::BOT_TOKEN)
            .map_err(|_| BotError::Config(format!("{} is not set", env_vars::BOT_TOKEN)))?;

        let bot_owner = env::var(env_vars::BOT_OWNER)
            .map_err(|_| BotError::Config(format!("{} is not set", env_vars::BOT_OWNER)))?
            .trim()
            .parse::<i64>()
            .map_err(|e| BotError::Config(format!("{} must be a Telegram user id: {}", env_vars::BOT_OWNER, e)))?;

        let min_delegation = parse_decimal(&var_or(env_vars::MIN_DELEGATION, defaults::MIN_DELEGATION))
            .ok()
            .filter(|min| !min.is_negative())
            .ok_or_else(|| BotError::Config(format!("{} must be a decimal amount", env_vars::MIN_DELEGATION)))?;

        Ok(Self {
            bot_token,
            bot_owner,
            database_url: env::var(env_vars::DATABASE_URL)
                .unwrap_or_else(|_| defaults::DATABASE_URL.to_string()),
            network: NetworkEndpoints {
                api: var_or(env_vars::NETWORK_API, defaults::NETWORK_API),
                proxy: var_or(env_vars::NETWORK_PROXY, defaults::NETWORK_PROXY),
                meta_observer: var_or(env_vars::META_OBSERVER, defaults::META_OBSERVER),
                timeout: secs_or(env_vars::HTTP_TIMEOUT_SECS, defaults::HTTP_TIMEOUT_SECS),
            },
            wallet_hook: var_or(env_vars::WALLET_HOOK, defaults::WALLET_HOOK),
            discovery_interval: secs_or(
                env_vars::DISCOVERY_INTERVAL_SECS,
                defaults::DISCOVERY_INTERVAL_SECS,
            ),
            min_delegation,
        })
    }
}

impl NetworkEndpoints {
    /// Endpoints that all point at one base URL, as used by the HTTP mocks in tests
    #[cfg(test)]
    pub fn single(base: &str) -> Self {
        Self {
            api: base.to_string(),
            proxy: base.to_string(),
            meta_observer: base.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}
