use ed25519_dalek::{Signer, SigningKey};

use super::PemKey;
use crate::address;
use crate::error::{BotError, BotResult};

const SEED_LEN: usize = 32;

/// Ed25519 account key
pub struct WalletKey {
    signing_key: SigningKey,
}

impl WalletKey {
    /// Accepts the 32-byte seed or the 64-byte `seed || public key` form
    /// found in wallet PEM files.
    pub fn from_bytes(bytes: &[u8]) -> BotResult<Self> {
        let seed: [u8; SEED_LEN] = match bytes.len() {
            32 | 64 => bytes[..SEED_LEN]
                .try_into()
                .map_err(|_| BotError::Key("invalid seed".into()))?,
            n => return Err(BotError::Key(format!("unexpected key length {}", n))),
        };
        let signing_key = SigningKey::from_bytes(&seed);

        if bytes.len() == 64 && signing_key.verifying_key().as_bytes() != &bytes[SEED_LEN..] {
            return Err(BotError::Key("public key does not match private key".into()));
        }
        Ok(Self { signing_key })
    }

    pub fn from_pem(data: &[u8]) -> BotResult<Self> {
        let pem = PemKey::parse(data)?;
        Self::from_bytes(&pem.bytes)
    }

    pub fn from_hex(private_key: &str) -> BotResult<Self> {
        let bytes = hex::decode(private_key.trim())
            .map_err(|e| BotError::Key(format!("invalid private key hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Seed as hex, the form kept in owner settings
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn address(&self) -> BotResult<String> {
        address::pubkey_to_bech32(&self.public_key())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier};

    // RFC 8032 test vector 1
    const SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const PUBKEY: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
    const ADDRESS: &str = "erd16adfsqvzky9t042tlmfujeq88g8wzuhnm2nzxfd0qgdx3ac82ydqr3ns5u";

    #[test]
    fn test_address_from_seed() {
        let key = WalletKey::from_hex(SEED).unwrap();
        assert_eq!(key.address().unwrap(), ADDRESS);
        assert_eq!(key.private_key_hex(), SEED);
    }

    #[test]
    fn test_full_key_must_match() {
        let full = format!("{}{}", SEED, PUBKEY);
        assert!(WalletKey::from_hex(&full).is_ok());

        let tampered = format!("{}{}", SEED, "00".repeat(32));
        assert!(matches!(WalletKey::from_hex(&tampered), Err(BotError::Key(_))));
        assert!(WalletKey::from_hex("abcd").is_err());
    }

    #[test]
    fn test_signature_verifies() {
        let key = WalletKey::from_hex(SEED).unwrap();
        let sig = Signature::from_bytes(&key.sign(b"payload"));
        assert!(key.signing_key.verifying_key().verify(b"payload", &sig).is_ok());
    }
}
