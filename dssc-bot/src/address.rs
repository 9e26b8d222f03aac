//! Bech32 account addresses (`erd1…`).

use bech32::{Bech32, Hrp};

use crate::error::{BotError, BotResult};

pub const HRP: Hrp = Hrp::parse_unchecked("erd");
pub const PUBKEY_LEN: usize = 32;

/// System delegation manager; receives `createNewDelegationContract` calls
pub const DELEGATION_MANAGER: &str =
    "erd1qqqqqqqqqqqqqqqpqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqylllslmq6y6";

/// Caller some views require (`getTotalCumulatedRewards`)
pub const SYSTEM_CALLER: &str = "erd1qqqqqqqqqqqqqqqpqqqqqqqqlllllllllllllllllllllllllllsr9gav8";

pub fn pubkey_to_bech32(pubkey: &[u8]) -> BotResult<String> {
    if pubkey.len() != PUBKEY_LEN {
        return Err(BotError::InvalidAddress(format!(
            "public key must be {} bytes, got {}",
            PUBKEY_LEN,
            pubkey.len()
        )));
    }
    bech32::encode::<Bech32>(HRP, pubkey).map_err(|e| BotError::InvalidAddress(e.to_string()))
}

/// Decode and fully validate an address: `erd` prefix, bech32 (not bech32m)
/// checksum and a 32-byte payload.
pub fn bech32_to_pubkey(address: &str) -> BotResult<[u8; PUBKEY_LEN]> {
    let address = address.trim().to_lowercase();
    let (hrp, data) =
        bech32::decode(&address).map_err(|_| BotError::InvalidAddress(address.clone()))?;
    if hrp != HRP {
        return Err(BotError::InvalidAddress(address));
    }
    let pubkey: [u8; PUBKEY_LEN] = match data.try_into() {
        Ok(pubkey) => pubkey,
        Err(_) => return Err(BotError::InvalidAddress(address)),
    };

    // bech32::decode also accepts the bech32m checksum; re-encoding pins it
    if pubkey_to_bech32(&pubkey)? != address {
        return Err(BotError::InvalidAddress(address));
    }
    Ok(pubkey)
}

/// Validate user input and return the canonical lowercase form
pub fn normalize(address: &str) -> BotResult<String> {
    let pubkey = bech32_to_pubkey(address)?;
    pubkey_to_bech32(&pubkey)
}

pub fn is_valid(address: &str) -> bool {
    bech32_to_pubkey(address).is_ok()
}

/// Hex of the public key behind an address, the form VM views take as argument
pub fn hex_pubkey(address: &str) -> BotResult<String> {
    Ok(hex::encode(bech32_to_pubkey(address)?))
}
