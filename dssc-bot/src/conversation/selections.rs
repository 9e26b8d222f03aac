//! Inline keyboard callbacks

use std::str::FromStr;

use strum::{AsRefStr, EnumString};

use super::{ConversationRouter, IgnoreReason, Outgoing, Reaction, menus, messages};
use crate::error::{BotError, BotResult};
use crate::models::{PromptKind, User, UserProfile};

const REMOVE_WALLET_PREFIX: &str = ":RemoveWallet_";

/// Callback data of inline buttons. Plain variants travel as their name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
pub enum Selection {
    About,
    MainHelp,
    MyWalletsHelp,
    MyWallets,
    AddWallet,
    Balances,
    ContractInfo,
    Back,
    Delegate,
    Undelegate,
    AdminMenu,
    NodesMenu,
    SetOwnerAddress,
    #[strum(serialize = "CreateDSSC")]
    CreateDssc,
    ChangeServiceFee,
    ModifyDelegationCap,
    MyNodes,
    AddNode,
    /// `:RemoveWallet_<id>`
    #[strum(disabled)]
    RemoveWallet(i64),
}

impl Selection {
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(id) = data.strip_prefix(REMOVE_WALLET_PREFIX) {
            return id.parse().ok().map(Self::RemoveWallet);
        }
        Self::from_str(data).ok()
    }

    /// Callback data carried by the button
    pub fn data(&self) -> String {
        match self {
            Self::RemoveWallet(id) => format!("{}{}", REMOVE_WALLET_PREFIX, id),
            plain => plain.as_ref().to_string(),
        }
    }

    pub fn owner_only(&self) -> bool {
        matches!(
            self,
            Self::AdminMenu
                | Self::NodesMenu
                | Self::SetOwnerAddress
                | Self::CreateDssc
                | Self::ChangeServiceFee
                | Self::ModifyDelegationCap
                | Self::MyNodes
                | Self::AddNode
        )
    }
}

impl ConversationRouter {
    pub async fn on_selection(&self, profile: &UserProfile, data: &str) -> Reaction {
        let user = match self.registered_user(profile) {
            Ok(Some(user)) => user,
            Ok(None) => {
                log::warn!("Callback {:?} from unknown user {}", data, profile.display_name());
                return Reaction::Ignored(IgnoreReason::UnknownUser);
            }
            Err(e) => return self.failure("callback", e),
        };

        let Some(selection) = Selection::parse(data) else {
            log::debug!("Unknown callback {:?} from {}", data, profile.display_name());
            return Reaction::Ignored(IgnoreReason::Unmatched);
        };
        if selection.owner_only() && !self.is_owner(&user) {
            log::info!("Ignoring owner-only {:?} from {}", selection, profile.display_name());
            return Reaction::Ignored(IgnoreReason::Unauthorized);
        }

        log::info!("Callback {:?} from {}", selection, profile.display_name());
        match self.select(&user, selection).await {
            Ok(reaction) => reaction,
            Err(e) => self.failure(&selection.data(), e),
        }
    }

    async fn select(&self, user: &User, selection: Selection) -> BotResult<Reaction> {
        let reaction = match selection {
            Selection::About => Reaction::text(messages::ABOUT),
            Selection::MainHelp => Reaction::text(messages::MAIN_HELP),
            Selection::MyWalletsHelp => Reaction::text(messages::MY_WALLETS_HELP),
            Selection::MyWallets => Reaction::Send(vec![Outgoing::Menu(menus::wallets_menu())]),
            Selection::Back => Reaction::Send(vec![Outgoing::Menu(self.main_menu(user))]),
            Selection::AdminMenu => Reaction::Send(vec![Outgoing::Menu(self.admin_menu())]),
            Selection::NodesMenu => Reaction::Send(vec![Outgoing::Menu(menus::nodes_menu())]),
            Selection::AddWallet => prompt(PromptKind::AddWallet),
            Selection::Delegate => prompt(PromptKind::DelegateAmount),
            Selection::Undelegate => prompt(PromptKind::UndelegateAmount),
            Selection::ChangeServiceFee => prompt(PromptKind::ChangeServiceFee),
            Selection::ModifyDelegationCap => prompt(PromptKind::ModifyDelegationCap),
            Selection::AddNode => {
                self.contract_address()?;
                prompt(PromptKind::AddNode)
            }
            Selection::SetOwnerAddress => {
                let mut outgoing = Vec::new();
                if let Some(old) = self.db.get_owner_address()? {
                    outgoing.push(Outgoing::Text(format!("Old address: {}", old)));
                }
                outgoing.push(Outgoing::Prompt(PromptKind::SetOwnerAddress));
                Reaction::Send(outgoing)
            }
            Selection::CreateDssc => self.create_contract().await?,
            Selection::Balances => Reaction::Send(self.balances(user).await?),
            Selection::ContractInfo => Reaction::Send(self.contract_info(user).await?),
            Selection::MyNodes => Reaction::Send(self.nodes().await?),
            Selection::RemoveWallet(id) => self.remove_wallet(user, id)?,
        };
        Ok(reaction)
    }

    async fn create_contract(&self) -> BotResult<Reaction> {
        if self.directory.get().is_some() {
            return Ok(Reaction::text(messages::CONTRACT_EXISTS));
        }
        let Some(private_key) = self.db.get_owner_settings()?.private_key else {
            return Ok(Reaction::text(messages::NO_PRIVATE_KEY));
        };

        let reaction = match self.network.create_delegation_contract(&private_key).await {
            Ok(hash) => Reaction::text(format!("{}{}", messages::CREATE_SENT, hash)),
            Err(e) => {
                log::warn!("Contract creation failed: {}", e);
                Reaction::text(format!("{}{}", messages::CREATE_FAILED, e))
            }
        };
        Ok(reaction)
    }

    /// Only the caller's own active wallets can be removed
    fn remove_wallet(&self, user: &User, wallet_id: i64) -> BotResult<Reaction> {
        if !user.wallets.iter().any(|w| w.id == wallet_id) {
            return Err(BotError::NotFound(messages::WALLET.into()));
        }
        self.db.remove_wallet(wallet_id)?;
        log::info!("Wallet {} removed by {}", wallet_id, user.profile.display_name());
        Ok(Reaction::text(messages::WALLET_REMOVED))
    }
}

fn prompt(kind: PromptKind) -> Reaction {
    Reaction::Send(vec![Outgoing::Prompt(kind)])
}
