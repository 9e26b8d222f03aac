use serde::{Deserialize, Serialize};

/// Singleton operator settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSettings {
    /// Owner's on-chain address; `None` until the owner sets it
    pub address: Option<String>,
    /// Hex seed of the owner's wallet key, only present when a key file was supplied
    #[serde(skip_serializing)]
    pub private_key: Option<String>,
}
