//! Database model modules - extends Database with domain-specific methods
//!
//! Each module adds `impl Database` blocks with methods for a specific table group.

mod owner_settings;  // settings
mod pending_prompts; // pending_prompts (reply routing)
mod users;           // users
mod wallets;         // user_wallets
