// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Chain primitives shared by every crate in the workspace.

use std::fmt::{self, Display};
use std::io::{self, Read, Write};
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Serialize/deserialize through the type's `Display`/`FromStr` pair.
macro_rules! serde_via_str {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as Deserialize>::deserialize(deserializer)?;
                <$ty>::from_str(&s).map_err(|e| D::Error::custom(format!("{e}")))
            }
        }
    };
}

const ACCOUNT_ID_MIN_LEN: usize = 2;
const ACCOUNT_ID_MAX_LEN: usize = 64;

/// A validated account identifier, e.g. `alice.near`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(String);

impl AccountId {
    /// Checks the chain's account ID rules: 2 to 64 characters made of
    /// lowercase alphanumeric parts joined by a single `-`, `_` or `.`.
    pub fn validate(s: &str) -> Result<(), Error> {
        if s.len() < ACCOUNT_ID_MIN_LEN || s.len() > ACCOUNT_ID_MAX_LEN {
            return Err(Error::validation(format!(
                "account ID '{s}' must be between {ACCOUNT_ID_MIN_LEN} and {ACCOUNT_ID_MAX_LEN} characters"
            )));
        }
        let mut last_was_separator = true;
        for c in s.chars() {
            match c {
                'a'..='z' | '0'..='9' => last_was_separator = false,
                '-' | '_' | '.' => {
                    if last_was_separator {
                        return Err(Error::validation(format!(
                            "account ID '{s}' has a misplaced separator"
                        )));
                    }
                    last_was_separator = true;
                }
                _ => {
                    return Err(Error::validation(format!(
                        "account ID '{s}' contains invalid character '{c}'"
                    )))
                }
            }
        }
        if last_was_separator {
            return Err(Error::validation(format!(
                "account ID '{s}' cannot end with a separator"
            )));
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::validate(s)?;
        Ok(Self(s.to_owned()))
    }
}

impl TryFrom<String> for AccountId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

serde_via_str!(AccountId);

impl BorshSerialize for AccountId {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        BorshSerialize::serialize(&self.0, writer)
    }
}

impl BorshDeserialize for AccountId {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let s = String::deserialize_reader(reader)?;
        Self::try_from(s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }
}

/// A 32-byte SHA-256 digest, displayed as base58.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub struct CryptoHash(pub [u8; 32]);

impl CryptoHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for CryptoHash {
    fn from(v: [u8; 32]) -> Self {
        Self(v)
    }
}

impl FromStr for CryptoHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| Error::Decode(format!("invalid base58 hash '{s}': {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| Error::Decode(format!("hash must be 32 bytes, got {}", v.len())))?;
        Ok(Self(bytes))
    }
}

impl Display for CryptoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

serde_via_str!(CryptoHash);

/// Supported signature schemes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyType {
    #[default]
    Ed25519,
}

impl KeyType {
    /// Wire tag written ahead of key and signature bytes.
    pub const fn tag(&self) -> u8 {
        match self {
            KeyType::Ed25519 => 0,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, Error> {
        match tag {
            0 => Ok(KeyType::Ed25519),
            t => Err(Error::signing(format!("unsupported key type tag {t}"))),
        }
    }
}

impl Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Ed25519 => f.write_str("ed25519"),
        }
    }
}

impl FromStr for KeyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ed25519" => Ok(KeyType::Ed25519),
            _ => Err(Error::signing(format!("unsupported key type '{s}'"))),
        }
    }
}

impl BorshSerialize for KeyType {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&[self.tag()])
    }
}

impl BorshDeserialize for KeyType {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let tag = u8::deserialize_reader(reader)?;
        Self::from_tag(tag).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }
}

/// Splits `ed25519:<base58>` into its key type and payload. A string
/// without a prefix is taken to be Ed25519.
pub fn split_key_string(s: &str) -> Result<(KeyType, &str), Error> {
    match s.split_once(':') {
        Some((kind, data)) => Ok((KeyType::from_str(kind)?, data)),
        None => Ok((KeyType::Ed25519, s)),
    }
}

/// An Ed25519 public key, displayed as `ed25519:<base58>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKey {
    key_type: KeyType,
    data: [u8; 32],
}

impl PublicKey {
    pub fn ed25519(data: [u8; 32]) -> Self {
        Self {
            key_type: KeyType::Ed25519,
            data,
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn key_data(&self) -> &[u8; 32] {
        &self.data
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key_type, data) = split_key_string(s)?;
        let bytes = bs58::decode(data)
            .into_vec()
            .map_err(|e| Error::signing(format!("invalid base58 public key: {e}")))?;
        let data: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            Error::signing(format!("public key must be 32 bytes, got {}", v.len()))
        })?;
        Ok(Self { key_type, data })
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.key_type,
            bs58::encode(self.data).into_string()
        )
    }
}

serde_via_str!(PublicKey);

impl BorshSerialize for PublicKey {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.key_type.serialize(writer)?;
        writer.write_all(&self.data)
    }
}

impl BorshDeserialize for PublicKey {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let key_type = KeyType::deserialize_reader(reader)?;
        let data = <[u8; 32]>::deserialize_reader(reader)?;
        Ok(Self { key_type, data })
    }
}

/// A 64-byte Ed25519 signature tagged with its key type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    key_type: KeyType,
    data: [u8; 64],
}

impl Signature {
    pub fn ed25519(data: [u8; 64]) -> Self {
        Self {
            key_type: KeyType::Ed25519,
            data,
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn data(&self) -> &[u8; 64] {
        &self.data
    }
}

impl FromStr for Signature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key_type, data) = split_key_string(s)?;
        let bytes = bs58::decode(data)
            .into_vec()
            .map_err(|e| Error::signing(format!("invalid base58 signature: {e}")))?;
        let data: [u8; 64] = bytes.try_into().map_err(|v: Vec<u8>| {
            Error::signing(format!("signature must be 64 bytes, got {}", v.len()))
        })?;
        Ok(Self { key_type, data })
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.key_type,
            bs58::encode(self.data).into_string()
        )
    }
}

serde_via_str!(Signature);

impl BorshSerialize for Signature {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.key_type.serialize(writer)?;
        writer.write_all(&self.data)
    }
}

impl BorshDeserialize for Signature {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let key_type = KeyType::deserialize_reader(reader)?;
        let data = <[u8; 64]>::deserialize_reader(reader)?;
        Ok(Self { key_type, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_rules() {
        for ok in ["a.test", "zombie6.testnet", "ab", "a-b_c.d", "0x1"] {
            assert!(AccountId::from_str(ok).is_ok(), "{ok} should be valid");
        }
        for bad in ["a", "A.test", ".a", "a.", "a..b", "a b", &"x".repeat(65)] {
            assert!(
                matches!(AccountId::from_str(bad), Err(Error::Validation(_))),
                "{bad} should be invalid"
            );
        }
    }

    #[test]
    fn public_key_string_form() {
        let pk = PublicKey::ed25519([7u8; 32]);
        let s = pk.to_string();
        assert!(s.starts_with("ed25519:"));
        assert_eq!(PublicKey::from_str(&s).unwrap(), pk);

        // The prefix is optional.
        let bare = s.trim_start_matches("ed25519:");
        assert_eq!(PublicKey::from_str(bare).unwrap(), pk);

        assert!(PublicKey::from_str("secp256k1:abc").is_err());
        assert!(PublicKey::from_str("ed25519:1111").is_err());
    }

    #[test]
    fn public_key_wire_form() {
        let pk = PublicKey::ed25519([9u8; 32]);
        let bytes = borsh::to_vec(&pk).unwrap();
        assert_eq!(bytes.len(), 33);
        assert_eq!(bytes[0], 0);
        assert_eq!(&bytes[1..], &[9u8; 32]);

        let mut bad = bytes.clone();
        bad[0] = 1;
        assert!(borsh::from_slice::<PublicKey>(&bad).is_err());
    }

    #[test]
    fn crypto_hash_json() {
        let hash = CryptoHash([0u8; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"11111111111111111111111111111111\"");
        let back: CryptoHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
        assert!(CryptoHash::from_str("abc").is_err());
    }
}
