// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fmt;

use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;

use nearcast_provider::types::{split_key_string, KeyType, PublicKey, Signature};
use nearcast_provider::{Error, Result};

/// An Ed25519 secret key.
///
/// `Debug` never prints key material, and there is no `Display`: use
/// [`SecretKey::to_key_string`] to export the key deliberately.
#[derive(Clone)]
pub struct SecretKey(SigningKey);

impl SecretKey {
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(SigningKey::from_bytes(seed))
    }

    pub fn key_type(&self) -> KeyType {
        KeyType::Ed25519
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::ed25519(self.0.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::ed25519(self.0.sign(message).to_bytes())
    }

    /// `ed25519:<base58(seed ‖ public key)>`, the format wallets export.
    pub fn to_key_string(&self) -> String {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.0.to_bytes());
        bytes[32..].copy_from_slice(&self.0.verifying_key().to_bytes());
        format!("{}:{}", self.key_type(), bs58::encode(bytes).into_string())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretKey").field(&self.public_key().to_string()).finish()
    }
}

/// Parse a secret key from `ed25519:<base58>`. The payload is either the
/// 64-byte keypair form or a bare 32-byte seed.
pub fn parse_secret_key(s: &str) -> Result<SecretKey> {
    let (_, data) = split_key_string(s.trim())?;
    let bytes = bs58::decode(data)
        .into_vec()
        .map_err(|e| Error::signing(format!("secret key is not valid base58: {e}")))?;
    match bytes.len() {
        32 => {
            let mut seed = [0u8; 32];
            seed.copy_from_slice(&bytes);
            Ok(SecretKey::from_seed(&seed))
        }
        64 => {
            let mut seed = [0u8; 32];
            seed.copy_from_slice(&bytes[..32]);
            let sk = SecretKey::from_seed(&seed);
            if sk.public_key().key_data()[..] != bytes[32..] {
                return Err(Error::signing(
                    "secret key does not match its embedded public key",
                ));
            }
            Ok(sk)
        }
        n => Err(Error::signing(format!(
            "secret key must be 32 or 64 bytes, got {n}"
        ))),
    }
}

/// Generate a fresh key from the OS RNG.
pub fn random_secretkey() -> SecretKey {
    SecretKey(SigningKey::generate(&mut OsRng))
}

/// Verify `signature` over `message` with `public_key`.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> Result<()> {
    if public_key.key_type() != signature.key_type() {
        return Err(Error::signing("signature and public key types differ"));
    }
    let vk = VerifyingKey::from_bytes(public_key.key_data())
        .map_err(|e| Error::signing(format!("invalid public key: {e}")))?;
    let sig = ed25519_dalek::Signature::from_bytes(signature.data());
    vk.verify(message, &sig)
        .map_err(|_| Error::signing("signature verification failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_string_round_trips() {
        let sk = random_secretkey();
        let parsed = parse_secret_key(&sk.to_key_string()).unwrap();
        assert_eq!(parsed.public_key(), sk.public_key());

        // Without the prefix, and as a bare seed.
        let bare = sk.to_key_string().trim_start_matches("ed25519:").to_string();
        assert_eq!(parse_secret_key(&bare).unwrap().public_key(), sk.public_key());
        let seed = bs58::encode(sk.0.to_bytes()).into_string();
        assert_eq!(parse_secret_key(&seed).unwrap().public_key(), sk.public_key());
    }

    #[test]
    fn rejects_mismatched_keypair() {
        let a = random_secretkey();
        let b = random_secretkey();
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&a.0.to_bytes());
        bytes[32..].copy_from_slice(b.public_key().key_data());
        let s = format!("ed25519:{}", bs58::encode(bytes).into_string());
        assert!(matches!(parse_secret_key(&s), Err(Error::Signing(_))));

        assert!(matches!(parse_secret_key("ed25519:abc"), Err(Error::Signing(_))));
        assert!(matches!(parse_secret_key("ed25519:0OIl"), Err(Error::Signing(_))));
    }

    #[test]
    fn signatures_verify() {
        let sk = random_secretkey();
        let sig = sk.sign(b"digest");
        verify(&sk.public_key(), b"digest", &sig).unwrap();
        assert!(verify(&sk.public_key(), b"other", &sig).is_err());
        assert!(verify(&random_secretkey().public_key(), b"digest", &sig).is_err());
    }

    #[test]
    fn debug_hides_secret() {
        let sk = random_secretkey();
        let debug = format!("{sk:?}");
        assert!(!debug.contains(&sk.to_key_string()[8..]));
        assert!(debug.contains(&sk.public_key().to_string()));
    }
}
