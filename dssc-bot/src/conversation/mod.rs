//! Conversation engine.
//!
//! Every inbound update is classified into exactly one [`Reaction`]: either an
//! explicit `Ignored` arm or a list of [`Outgoing`] items for the transport.
//! Which question a reply answers comes from the pending prompt registry,
//! keyed by the message id the reply points at.

mod commands;
mod delivery;
mod menus;
mod messages;
mod replies;
mod selections;
mod views;

pub use delivery::ChatTransport;
pub use selections::Selection;

use std::sync::Arc;

use bigdecimal::BigDecimal;

use crate::db::Database;
use crate::discovery::ContractDirectory;
use crate::error::{BotError, BotResult};
use crate::interaction::InteractionLinkBuilder;
use crate::models::{PromptKind, User, UserProfile};
use crate::network::NetworkClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No known prompt, selection or command matched
    Unmatched,
    /// Owner-only action from someone else
    Unauthorized,
    /// Update from a user that never sent a command
    UnknownUser,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    Callback { label: String, data: String },
    Url { label: String, url: String },
}

impl Button {
    pub fn callback(label: &str, selection: Selection) -> Self {
        Self::Callback {
            label: label.to_string(),
            data: selection.data(),
        }
    }

    pub fn url(label: &str, url: String) -> Self {
        Self::Url {
            label: label.to_string(),
            url,
        }
    }
}

/// Text with an inline keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub text: String,
    pub rows: Vec<Vec<Button>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Text(String),
    Choice(Choice),
    /// A navigation menu; replaces the menu shown last
    Menu(Choice),
    /// One-button message opening a wallet deep link
    ActionLink { text: String, label: String, url: String },
    /// Force-reply question, recorded in the prompt registry
    Prompt(PromptKind),
    /// Operational failure reported to the bot owner
    Alert(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    Ignored(IgnoreReason),
    Send(Vec<Outgoing>),
}

impl Reaction {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Send(vec![Outgoing::Text(text.into())])
    }
}

/// A document attached to a reply
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A message sent in reply to one of the bot's messages
#[derive(Debug, Clone)]
pub struct Reply {
    pub chat_id: i64,
    pub reply_to_id: i32,
    pub reply_to_text: String,
    pub text: String,
    pub attachment: Option<Attachment>,
}

pub struct ConversationRouter {
    db: Arc<Database>,
    network: Arc<NetworkClient>,
    directory: Arc<ContractDirectory>,
    links: InteractionLinkBuilder,
    bot_owner: i64,
    min_delegation: BigDecimal,
}

impl ConversationRouter {
    pub fn new(
        db: Arc<Database>,
        network: Arc<NetworkClient>,
        directory: Arc<ContractDirectory>,
        links: InteractionLinkBuilder,
        bot_owner: i64,
        min_delegation: BigDecimal,
    ) -> Self {
        Self {
            db,
            network,
            directory,
            links,
            bot_owner,
            min_delegation,
        }
    }

    fn registered_user(&self, profile: &UserProfile) -> BotResult<Option<User>> {
        Ok(self.db.get_user_by_tg_id(profile.tg_id)?)
    }

    fn is_owner(&self, user: &User) -> bool {
        user.is_owner(self.bot_owner)
    }

    fn contract_address(&self) -> BotResult<String> {
        self.directory
            .get()
            .ok_or_else(|| BotError::NotFound(messages::CONTRACT_ADDRESS.into()))
    }

    /// Turn a handler error into what the user sees
    fn failure(&self, context: &str, err: BotError) -> Reaction {
        match err {
            BotError::Authorization => Reaction::Ignored(IgnoreReason::Unauthorized),
            BotError::Validation(msg) => {
                log::debug!("{}: rejected input: {}", context, msg);
                Reaction::text(format!("⭕️ {}", msg))
            }
            BotError::InvalidAddress(address) => {
                log::debug!("{}: invalid address {:?}", context, address);
                Reaction::text(messages::INVALID_ADDRESS)
            }
            BotError::NotFound(what) => Reaction::text(format!("⭕️ {} not found", what)),
            BotError::Key(e) => {
                log::debug!("{}: unusable key file: {}", context, e);
                Reaction::text(messages::INVALID_PEM)
            }
            BotError::Transport(e) => {
                log::warn!("{}: {}", context, e);
                Reaction::text(messages::NETWORK_UNAVAILABLE)
            }
            e @ (BotError::Query(_) | BotError::MalformedResponse(_)) => {
                log::error!("{}: {}", context, e);
                Reaction::text(messages::DATA_UNAVAILABLE)
            }
            e @ (BotError::Storage(_) | BotError::Config(_)) => {
                log::error!("{}: {}", context, e);
                Reaction::Send(vec![
                    Outgoing::Text(messages::INTERNAL_ERROR.into()),
                    Outgoing::Alert(format!("{}: {}", context, e)),
                ])
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::config::NetworkEndpoints;
    use crate::models::NetworkConfig;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::str::FromStr;

    pub const OWNER_ID: i64 = 1000;
    pub const USER_ID: i64 = 2000;
    pub const CONTRACT: &str = "erd1qqqqqqqqqqqqqqqpqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqylllslmq6y6";
    pub const ALICE: &str = "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th";
    pub const HOOK: &str = "https://wallet.example";

    pub fn profile(tg_id: i64) -> UserProfile {
        UserProfile {
            tg_id,
            username: Some(format!("user{}", tg_id)),
            first_name: "Test".into(),
            last_name: None,
        }
    }

    /// Router over an in-memory store; the network points at `base`
    pub fn router_with(base: &str) -> ConversationRouter {
        let db = Arc::new(Database::new(":memory:").unwrap());
        let network = Arc::new(
            NetworkClient::new(NetworkEndpoints::single(base), NetworkConfig::default()).unwrap(),
        );
        ConversationRouter::new(
            db,
            network,
            Arc::new(ContractDirectory::new()),
            InteractionLinkBuilder::new(HOOK),
            OWNER_ID,
            BigDecimal::from_str("10").unwrap(),
        )
    }

    pub fn router() -> ConversationRouter {
        router_with("http://127.0.0.1:9")
    }

    pub fn register(router: &ConversationRouter, tg_id: i64) -> User {
        router.db.add_user(&profile(tg_id)).unwrap()
    }

    pub fn set_contract(router: &ConversationRouter) {
        router.directory.set(CONTRACT.to_string());
    }

    pub fn db(router: &ConversationRouter) -> &Database {
        &router.db
    }

    pub fn texts(reaction: &Reaction) -> Vec<String> {
        match reaction {
            Reaction::Send(items) => items
                .iter()
                .filter_map(|item| match item {
                    Outgoing::Text(text) => Some(text.clone()),
                    _ => None,
                })
                .collect(),
            Reaction::Ignored(_) => Vec::new(),
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Sent {
        Text(i64, String),
        Choice(i64, String, Vec<Vec<Button>>),
        Link(i64, String, String, String),
        Prompt(i64, String),
        Deleted(i64, i32),
    }

    /// Records every transport call and hands out increasing message ids
    #[derive(Default)]
    pub struct RecordingTransport {
        pub sent: Mutex<Vec<Sent>>,
        next_id: Mutex<i32>,
    }

    impl RecordingTransport {
        fn push(&self, sent: Sent) -> i32 {
            self.sent.lock().push(sent);
            let mut id = self.next_id.lock();
            *id += 1;
            *id
        }
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn send_text(&self, chat_id: i64, text: &str) -> BotResult<i32> {
            Ok(self.push(Sent::Text(chat_id, text.to_string())))
        }

        async fn present_choice(&self, chat_id: i64, text: &str, rows: &[Vec<Button>]) -> BotResult<i32> {
            Ok(self.push(Sent::Choice(chat_id, text.to_string(), rows.to_vec())))
        }

        async fn send_action_link(&self, chat_id: i64, text: &str, label: &str, url: &str) -> BotResult<i32> {
            Ok(self.push(Sent::Link(chat_id, text.into(), label.into(), url.into())))
        }

        async fn send_prompt(&self, chat_id: i64, text: &str) -> BotResult<i32> {
            Ok(self.push(Sent::Prompt(chat_id, text.to_string())))
        }

        async fn delete_message(&self, chat_id: i64, message_id: i32) -> BotResult<()> {
            self.sent.lock().push(Sent::Deleted(chat_id, message_id));
            Ok(())
        }
    }
}
