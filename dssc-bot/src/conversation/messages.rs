//! User-facing texts. Markdown (legacy) formatting.

pub const ABOUT: &str = "`Elrond Delegation System SC interaction Bot ©2021 by Elrond Community`";

pub const MAIN_HELP: &str = "`MyWallets` - menu for adding the wallets you wish to delegate from and the bot will monitor \
your delegations and rewards\n\
`Contract Info` - displays details about the Delegation SC (address, fee, etc.)";

pub const MY_WALLETS_HELP: &str = "`Add` - here you can add a wallet to be managed by the bot\n\
`Balances` - here you can see each of your wallet's delegations, balances and claimable rewards";

pub const CONTRACT_ADDRESS: &str = "Contract Address";
pub const WALLET: &str = "Wallet";

pub const INVALID_ADDRESS: &str = "⭕️ Invalid address";
pub const INVALID_PEM: &str = "⭕️ Invalid pem file";
pub const NO_PEM: &str = "No pem file received";
pub const UNKNOWN_FILE_TYPE: &str = "Unknown file type";
pub const INVALID_KEYSTORE: &str = "Invalid JSON key file";
pub const DUPLICATE_WALLET: &str = "Wallet already added";

pub const WALLET_ADDED: &str = "✅ Wallet added";
pub const WALLET_REMOVED: &str = "🗑 Wallet removed";
pub const OWNER_ADDRESS_UPDATED: &str = "✅ Owner address updated";
pub const OWNER_KEY_UPDATED: &str = "✅ Owner private key updated";
pub const OWNER_KEY_CLEARED: &str = "🗑 Stored private key belonged to the old address and was removed";

pub const NO_WALLETS: &str = "⭕️ No wallets added";
pub const OWNER_NOT_SET: &str = "⭕️ The owner didn't set up the DSSC yet";
pub const NODES_UNAVAILABLE: &str = "⭕️ Can not get all nodes states";
pub const CONTRACT_EXISTS: &str = "⭕️ Contract already created";
pub const NO_PRIVATE_KEY: &str = "⭕️ Owner private key not set. You have to create the contract manually";
pub const CREATE_SENT: &str = "✅ Create DSSC transaction sent. Hash: ";
pub const CREATE_FAILED: &str = "⭕️ Failed to send create DSSC transaction: ";

pub const NETWORK_UNAVAILABLE: &str = "⭕️ Network unavailable, please try again later";
pub const DATA_UNAVAILABLE: &str = "⭕️ Contract data unavailable";
pub const INTERNAL_ERROR: &str = "⭕️ Something went wrong, the owner was notified";

pub const BALANCES: &str = "`Balances`";
pub const CONTRACT_INFO: &str = "`Contract Info`";
pub const BALANCE_ERROR: &str = "❌ Balance error";
