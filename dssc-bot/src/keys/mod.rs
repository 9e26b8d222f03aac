//! Key files an operator can hand to the bot.
//!
//! Both wallet keys and validator keys come as PEM files whose body is the
//! base64 of a hex string. Wallet keys may also come as password protected
//! JSON keystores. Wallet keys sign the contract creation
//! transaction; validator keys only produce the `addNodes` arguments.

mod keystore;
mod pem;
mod validator;
mod wallet;

pub use pem::PemKey;
pub use validator::ValidatorKey;
pub use wallet::WalletKey;
