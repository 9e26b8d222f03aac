//! Prompts the bot sends with a forced reply.
//!
//! Each outgoing prompt is recorded against its message id, so the reply's
//! `reply_to` id tells the router which question is being answered. The
//! prompt text is only consulted when no record exists.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, AsRefStr, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PromptKind {
    SetOwnerAddress,
    AddWallet,
    DelegateAmount,
    UndelegateAmount,
    ChangeServiceFee,
    ModifyDelegationCap,
    AddNode,
}

impl PromptKind {
    pub fn text(&self) -> &'static str {
        match self {
            Self::SetOwnerAddress => "Send owner's address or the owner wallet's PEM or JSON file (for JSON, write the password as the file caption)",
            Self::AddWallet => "Send the wallet's address",
            Self::DelegateAmount => "Send amount to delegate",
            Self::UndelegateAmount => "Send amount to undelegate",
            Self::ChangeServiceFee => "Send the new service fee in percent (0 - 100)",
            Self::ModifyDelegationCap => "Send the new total delegation cap (0 for uncapped)",
            Self::AddNode => "Send the node's validatorKey.pem",
        }
    }

    /// Only the configured bot owner may answer these
    pub fn owner_only(&self) -> bool {
        matches!(
            self,
            Self::SetOwnerAddress | Self::ChangeServiceFee | Self::ModifyDelegationCap | Self::AddNode
        )
    }

    /// Fallback lookup by exact prompt text
    pub fn from_text(text: &str) -> Option<Self> {
        Self::iter().find(|kind| kind.text() == text)
    }

    /// Stable tag used in the pending prompt table
    pub fn tag(&self) -> &str {
        self.as_ref()
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        tag.parse().ok()
    }
}
