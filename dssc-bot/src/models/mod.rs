pub mod contract;
pub mod owner_settings;
pub mod prompt;
pub mod user;

pub use contract::{ContractInfo, NetworkConfig, NodeState, UndelegatedEntry};
pub use owner_settings::OwnerSettings;
pub use prompt::PromptKind;
pub use user::{User, UserProfile, Wallet};
