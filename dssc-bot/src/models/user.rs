use serde::{Deserialize, Serialize};

/// Profile data as reported by the chat platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub tg_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl UserProfile {
    /// `@handle (First Last [id])`, or `First Last [id]` without a handle
    pub fn display_name(&self) -> String {
        let full = match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {} [{}]", self.first_name, last, self.tg_id),
            _ => format!("{} [{}]", self.first_name, self.tg_id),
        };
        let full = full.trim().to_string();
        match &self.username {
            Some(handle) if !handle.is_empty() => format!("@{} ({})", handle, full),
            _ => full,
        }
    }
}

/// A registered bot user with their active wallets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub profile: UserProfile,
    /// Message id of the menu shown last; replaced when a new menu is shown
    pub last_menu_id: Option<i32>,
    /// Non-deleted wallets ordered by id
    pub wallets: Vec<Wallet>,
    pub created_at: String,
}

impl User {
    pub fn tg_id(&self) -> i64 {
        self.profile.tg_id
    }

    /// Ownership is derived from configuration, never stored
    pub fn is_owner(&self, bot_owner: i64) -> bool {
        self.profile.tg_id == bot_owner
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub user_id: i64,
    pub address: String,
    /// Soft-delete marker; rows are never removed
    pub deleted: bool,
    pub created_at: String,
}
