//! Answers to force-reply prompts

use num_bigint::BigUint;
use num_traits::Signed;

use super::{Attachment, ConversationRouter, IgnoreReason, Outgoing, Reaction, Reply, messages};
use crate::address;
use crate::amount::{
    TOKEN, encode_service_fee, format_amount, parse_amount, parse_decimal, parse_service_fee,
    to_chain_units,
};
use crate::error::{BotError, BotResult};
use crate::interaction::{ContractCall, ContractFunction};
use crate::keys::{ValidatorKey, WalletKey};
use crate::models::{PromptKind, User, UserProfile};

enum KeyFileKind {
    Pem,
    Json,
}

fn key_file_kind(attachment: &Attachment) -> Option<KeyFileKind> {
    let name = attachment.file_name.to_lowercase();
    if name.ends_with(".pem") {
        Some(KeyFileKind::Pem)
    } else if name.ends_with(".json") {
        Some(KeyFileKind::Json)
    } else {
        None
    }
}

impl ConversationRouter {
    /// Registry first, prompt text as fallback
    fn resolve_prompt(&self, reply: &Reply) -> BotResult<Option<PromptKind>> {
        if let Some(kind) = self.db.get_pending_prompt(reply.chat_id, reply.reply_to_id)? {
            return Ok(Some(kind));
        }
        Ok(PromptKind::from_text(&reply.reply_to_text))
    }

    pub async fn on_reply(&self, profile: &UserProfile, reply: &Reply) -> Reaction {
        let user = match self.registered_user(profile) {
            Ok(Some(user)) => user,
            Ok(None) => {
                log::warn!("Reply from unknown user {}", profile.display_name());
                return Reaction::Ignored(IgnoreReason::UnknownUser);
            }
            Err(e) => return self.failure("reply", e),
        };

        let kind = match self.resolve_prompt(reply) {
            Ok(Some(kind)) => kind,
            Ok(None) => {
                log::debug!("Reply to unknown prompt {:?} from {}", reply.reply_to_text, profile.display_name());
                return Reaction::Ignored(IgnoreReason::Unmatched);
            }
            Err(e) => return self.failure("reply", e),
        };
        if kind.owner_only() && !self.is_owner(&user) {
            log::info!("Ignoring {} reply from {}", kind.tag(), profile.display_name());
            return Reaction::Ignored(IgnoreReason::Unauthorized);
        }

        log::info!("Reply to {} from {}: {:?}", kind.tag(), profile.display_name(), reply.text);
        let result = match kind {
            PromptKind::SetOwnerAddress => self.set_owner_address(reply),
            PromptKind::AddWallet => self.add_wallet(&user, &reply.text),
            PromptKind::DelegateAmount => self.delegate(&reply.text),
            PromptKind::UndelegateAmount => self.undelegate(&reply.text),
            PromptKind::ChangeServiceFee => self.change_service_fee(&reply.text),
            PromptKind::ModifyDelegationCap => self.modify_delegation_cap(&reply.text),
            PromptKind::AddNode => self.add_node(reply.attachment.as_ref()),
        };
        match result {
            Ok(outgoing) => {
                // a rejected answer leaves the prompt open for another try
                if let Err(e) = self.db.delete_pending_prompt(reply.chat_id, reply.reply_to_id) {
                    log::warn!("Failed to forget prompt {}: {}", reply.reply_to_id, e);
                }
                Reaction::Send(outgoing)
            }
            Err(e) => self.failure(kind.tag(), e),
        }
    }

    /// A reply whose attachment could not be fetched from the chat platform
    pub fn on_attachment_error(&self, profile: &UserProfile, err: BotError) -> Reaction {
        match self.registered_user(profile) {
            Ok(Some(_)) => {}
            Ok(None) => return Reaction::Ignored(IgnoreReason::UnknownUser),
            Err(e) => return self.failure("download", e),
        }
        match err {
            BotError::Transport(e) => {
                log::warn!("download: file from {} unavailable: {}", profile.display_name(), e);
                Reaction::Send(vec![
                    Outgoing::Text(messages::NETWORK_UNAVAILABLE.into()),
                    Outgoing::Alert(format!("File download from {} failed: {}", profile.display_name(), e)),
                ])
            }
            e => self.failure("download", e),
        }
    }

    fn set_owner_address(&self, reply: &Reply) -> BotResult<Vec<Outgoing>> {
        let key = match &reply.attachment {
            Some(attachment) => match key_file_kind(attachment) {
                Some(KeyFileKind::Pem) => Some(WalletKey::from_pem(&attachment.bytes)?),
                Some(KeyFileKind::Json) => {
                    // the password travels as the document caption
                    let key = WalletKey::from_keystore(&attachment.bytes, reply.text.trim()).map_err(|e| match e {
                        BotError::Key(detail) => {
                            log::debug!("Unusable keystore: {}", detail);
                            BotError::validation(messages::INVALID_KEYSTORE)
                        }
                        e => e,
                    })?;
                    Some(key)
                }
                None => return Err(BotError::validation(messages::UNKNOWN_FILE_TYPE)),
            },
            None => None,
        };

        let address = match &key {
            Some(key) => key.address()?,
            None => address::normalize(&reply.text)?,
        };

        let previous = self.db.get_owner_settings()?;
        self.db.set_owner_address(&address)?;
        self.directory.invalidate();
        log::info!("Owner address set to {}", address);

        let mut outgoing = vec![Outgoing::Text(messages::OWNER_ADDRESS_UPDATED.into())];
        match key {
            Some(key) => {
                self.db.set_owner_private_key(&key.private_key_hex())?;
                outgoing.push(Outgoing::Text(messages::OWNER_KEY_UPDATED.into()));
            }
            None => {
                // a stored key must keep signing for the stored address
                let stale = previous
                    .private_key
                    .as_deref()
                    .map(|stored| WalletKey::from_hex(stored).and_then(|k| k.address()))
                    .is_some_and(|stored| !matches!(stored, Ok(ref a) if *a == address));
                if stale {
                    self.db.clear_owner_private_key()?;
                    outgoing.push(Outgoing::Text(messages::OWNER_KEY_CLEARED.into()));
                }
            }
        }
        Ok(outgoing)
    }

    fn add_wallet(&self, user: &User, text: &str) -> BotResult<Vec<Outgoing>> {
        let address = address::normalize(text)?;
        if user.wallets.iter().any(|w| w.address == address) {
            return Err(BotError::validation(messages::DUPLICATE_WALLET));
        }
        let wallet = self.db.add_wallet(user.id, &address)?;
        log::info!("Wallet {} ({}) added by {}", wallet.id, address, user.profile.display_name());
        Ok(vec![Outgoing::Text(messages::WALLET_ADDED.into())])
    }

    fn action_link(text: &str, label: String, url: String) -> Vec<Outgoing> {
        vec![Outgoing::ActionLink {
            text: text.to_string(),
            label,
            url,
        }]
    }

    fn delegate(&self, text: &str) -> BotResult<Vec<Outgoing>> {
        let amount = parse_amount(text, &self.min_delegation)?;
        let contract = self.contract_address()?;
        let value = to_chain_units(&amount, self.network.denomination())?;
        let url = self
            .links
            .link(&contract, &value, &ContractCall::new(ContractFunction::Delegate));
        Ok(Self::action_link(
            "Delegate",
            format!("{} {}", format_amount(&amount, 4), TOKEN),
            url,
        ))
    }

    fn undelegate(&self, text: &str) -> BotResult<Vec<Outgoing>> {
        let amount = parse_amount(text, &self.min_delegation)?;
        let contract = self.contract_address()?;
        let value = to_chain_units(&amount, self.network.denomination())?;
        let call = ContractCall::new(ContractFunction::UnDelegate).arg(&value);
        Ok(Self::action_link(
            "Undelegate",
            format!("{} {}", format_amount(&amount, 4), TOKEN),
            self.links.call(&contract, &call),
        ))
    }

    fn change_service_fee(&self, text: &str) -> BotResult<Vec<Outgoing>> {
        let fee = parse_service_fee(text)?;
        let contract = self.contract_address()?;
        let call = ContractCall::new(ContractFunction::ChangeServiceFee).raw_arg(encode_service_fee(&fee)?);
        Ok(Self::action_link(
            "Change service fee",
            format!("{}%", format_amount(&fee, 2)),
            self.links.call(&contract, &call),
        ))
    }

    fn modify_delegation_cap(&self, text: &str) -> BotResult<Vec<Outgoing>> {
        let cap = parse_decimal(text)?;
        if cap.is_negative() {
            return Err(BotError::validation("Invalid amount"));
        }
        let contract = self.contract_address()?;
        let value: BigUint = to_chain_units(&cap, self.network.denomination())?;
        let call = ContractCall::new(ContractFunction::ModifyTotalDelegationCap).arg(&value);
        Ok(Self::action_link(
            "Modify delegation cap",
            format!("{} {}", format_amount(&cap, 2), TOKEN),
            self.links.call(&contract, &call),
        ))
    }

    fn add_node(&self, attachment: Option<&Attachment>) -> BotResult<Vec<Outgoing>> {
        let attachment = attachment.ok_or_else(|| BotError::validation(messages::NO_PEM))?;
        let contract = self.contract_address()?;
        let key = ValidatorKey::from_pem(&attachment.bytes)?;
        let call = ContractCall::new(ContractFunction::AddNodes)
            .raw_arg(key.public_key_hex())
            .raw_arg(key.sign_address(&contract)?);
        Ok(Self::action_link(
            "Add node",
            "Send transaction".to_string(),
            self.links.call(&contract, &call),
        ))
    }
}
