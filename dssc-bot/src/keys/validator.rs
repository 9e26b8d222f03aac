use blst::BLST_ERROR;
use blst::min_sig::{PublicKey, SecretKey};

use super::PemKey;
use crate::address;
use crate::error::{BotError, BotResult};

/// Domain separation tag for proof-of-possession signatures
const DST: &[u8] = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_NUL_";

/// BLS12-381 node key (96-byte public key in G2, 48-byte signatures in G1)
pub struct ValidatorKey {
    secret: SecretKey,
}

impl ValidatorKey {
    /// `validatorKey.pem` stores the scalar little-endian; blst wants big-endian
    pub fn from_bytes(bytes: &[u8]) -> BotResult<Self> {
        if bytes.len() != 32 {
            return Err(BotError::Key(format!("unexpected validator key length {}", bytes.len())));
        }
        let mut be = bytes.to_vec();
        be.reverse();
        let secret = SecretKey::from_bytes(&be)
            .map_err(|e: BLST_ERROR| BotError::Key(format!("invalid BLS secret key: {:?}", e)))?;
        Ok(Self { secret })
    }

    pub fn from_pem(data: &[u8]) -> BotResult<Self> {
        let pem = PemKey::parse(data)?;
        Self::from_bytes(&pem.bytes)
    }

    pub fn public_key(&self) -> PublicKey {
        self.secret.sk_to_pk()
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key().compress())
    }

    /// Signature over the raw public key bytes of `contract_address`,
    /// required by `addNodes` alongside each node key
    pub fn sign_address(&self, contract_address: &str) -> BotResult<String> {
        let message = address::bech32_to_pubkey(contract_address)?;
        let signature = self.secret.sign(&message, DST, &[]);
        Ok(hex::encode(signature.compress()))
    }
}
