//! Encrypted JSON wallet files (version 4 keystores).
//!
//! The secret key is AES-128-CTR encrypted under the first half of an
//! scrypt-derived key; the second half keys an HMAC-SHA256 over the
//! ciphertext that tells a wrong password from a damaged file.

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use super::WalletKey;
use crate::error::{BotError, BotResult};

type Aes128Ctr = ctr::Ctr128BE<Aes128>;
type HmacSha256 = Hmac<Sha256>;

const CIPHER: &str = "aes-128-ctr";
const KDF: &str = "scrypt";
const DERIVED_KEY_LEN: usize = 32;
/// scrypt cost ceiling (2^18); wallets use 2^12
const MAX_LOG_N: u8 = 18;

#[derive(Debug, Deserialize)]
struct Keystore {
    /// Hex public key the file claims to hold
    #[serde(default)]
    address: Option<String>,
    crypto: Crypto,
}

#[derive(Debug, Deserialize)]
struct Crypto {
    ciphertext: String,
    cipherparams: CipherParams,
    cipher: String,
    kdf: String,
    kdfparams: KdfParams,
    mac: String,
}

#[derive(Debug, Deserialize)]
struct CipherParams {
    iv: String,
}

#[derive(Debug, Deserialize)]
struct KdfParams {
    dklen: usize,
    salt: String,
    n: u64,
    r: u32,
    p: u32,
}

fn unhex(field: &str, value: &str) -> BotResult<Vec<u8>> {
    hex::decode(value).map_err(|e| BotError::Key(format!("keystore {} is not hex: {}", field, e)))
}

fn derive_key(password: &str, params: &KdfParams) -> BotResult<[u8; DERIVED_KEY_LEN]> {
    if params.dklen != DERIVED_KEY_LEN {
        return Err(BotError::Key(format!("unsupported keystore dklen {}", params.dklen)));
    }
    if !params.n.is_power_of_two() || params.n < 2 {
        return Err(BotError::Key(format!("invalid scrypt n {}", params.n)));
    }
    let log_n = params.n.trailing_zeros() as u8;
    if log_n > MAX_LOG_N {
        return Err(BotError::Key(format!("scrypt n {} is too expensive", params.n)));
    }

    let salt = unhex("salt", &params.salt)?;
    let scrypt_params = scrypt::Params::new(log_n, params.r, params.p, DERIVED_KEY_LEN)
        .map_err(|e| BotError::Key(format!("invalid scrypt parameters: {}", e)))?;
    let mut derived = [0u8; DERIVED_KEY_LEN];
    scrypt::scrypt(password.as_bytes(), &salt, &scrypt_params, &mut derived)
        .map_err(|e| BotError::Key(format!("scrypt failed: {}", e)))?;
    Ok(derived)
}

impl WalletKey {
    /// Decrypt a JSON keystore with `password`
    pub fn from_keystore(json: &[u8], password: &str) -> BotResult<Self> {
        if password.is_empty() {
            return Err(BotError::validation("Write the keystore password as the file caption"));
        }
        let keystore: Keystore =
            serde_json::from_slice(json).map_err(|e| BotError::Key(format!("invalid keystore: {}", e)))?;
        let crypto = &keystore.crypto;
        if crypto.cipher != CIPHER || crypto.kdf != KDF {
            return Err(BotError::Key(format!("unsupported keystore {} / {}", crypto.cipher, crypto.kdf)));
        }

        let ciphertext = unhex("ciphertext", &crypto.ciphertext)?;
        let iv = unhex("iv", &crypto.cipherparams.iv)?;
        let expected_mac = unhex("mac", &crypto.mac)?;
        let derived = derive_key(password, &crypto.kdfparams)?;

        let mut mac = HmacSha256::new_from_slice(&derived[16..])
            .map_err(|e| BotError::Key(format!("hmac key: {}", e)))?;
        mac.update(&ciphertext);
        if mac.verify_slice(&expected_mac).is_err() {
            return Err(BotError::validation("Wrong keystore password"));
        }

        let mut secret = ciphertext;
        let mut cipher = Aes128Ctr::new_from_slices(&derived[..16], &iv)
            .map_err(|e| BotError::Key(format!("invalid keystore iv: {}", e)))?;
        cipher.apply_keystream(&mut secret);
        let key = Self::from_bytes(&secret)?;

        if let Some(claimed) = keystore.address.as_deref() {
            let actual = hex::encode(key.public_key());
            if !claimed.eq_ignore_ascii_case(&actual) {
                return Err(BotError::Key("keystore address does not match its key".into()));
            }
        }
        Ok(key)
    }
}
