//! Error taxonomy shared by every component of the bot.
//!
//! Each variant maps to a user-facing policy in the conversation layer:
//! validation problems are echoed back, transport and storage failures are
//! logged and reported generically, malformed chain data is treated as a
//! defect and authorization failures are dropped silently.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// Malformed or out-of-range user input
    #[error("{0}")]
    Validation(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Network or timeout failure talking to the chain proxy or chat platform
    #[error("transport error: {0}")]
    Transport(String),

    /// The VM query endpoint reported an error or a non-integer result
    #[error("query error: {0}")]
    Query(String),

    /// Chain data did not have the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("not authorized")]
    Authorization,

    #[error("{0} not found")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Key file could not be parsed or used for signing
    #[error("key error: {0}")]
    Key(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl BotError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }
}

impl From<reqwest::Error> for BotError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<teloxide::RequestError> for BotError {
    fn from(e: teloxide::RequestError) -> Self {
        Self::Transport(e.to_string())
    }
}

pub type BotResult<T> = Result<T, BotError>;
