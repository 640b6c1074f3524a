//! The project's single SHA-256 digest type.
//!
//! Every hash that crosses a trust boundary — `payload_hash`,
//! `prev_event_hash`, `event_hash` — is textually encoded as
//! `sha256:<64 lowercase hex chars>`. This module owns that encoding so
//! ingestion and storage never hand-roll the prefix.

use std::fmt;
use std::str::FromStr;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

const PREFIX: &str = "sha256:";
const DIGEST_LEN: usize = 32;

/// The `prev_event_hash` of the first event in a session (sequence 0)
/// is 32 zero bytes, textually `sha256:` followed by 64 `'0'`
/// characters — the conventional genesis digest.
pub const GENESIS_PREV_HASH: Hash = Hash([0u8; DIGEST_LEN]);

/// A `sha256:<hex>` digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; DIGEST_LEN]);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HashParseError {
    #[error("hash is missing the \"sha256:\" prefix")]
    MissingPrefix,
    #[error("hash hex payload has length {0}, expected 64")]
    WrongLength(usize),
    #[error("hash hex payload is not valid hex: {0}")]
    InvalidHex(String),
}

impl Hash {
    /// Hash of an already-serialized byte string.
    pub fn digest(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }

    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Render with the `sha256:` scheme prefix — the wire form.
    pub fn to_tagged_string(&self) -> String {
        format!("{PREFIX}{}", self.to_hex())
    }

    pub fn is_genesis(&self) -> bool {
        *self == GENESIS_PREV_HASH
    }
}

impl FromStr for Hash {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s.strip_prefix(PREFIX).ok_or(HashParseError::MissingPrefix)?;
        if hex_part.len() != DIGEST_LEN * 2 {
            return Err(HashParseError::WrongLength(hex_part.len()));
        }
        let mut out = [0u8; DIGEST_LEN];
        hex::decode_to_slice(hex_part, &mut out)
            .map_err(|e| HashParseError::InvalidHex(e.to_string()))?;
        Ok(Self(out))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tagged_string())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_tagged_string())
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_tagged_string())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_str(&s).map_err(D::Error::custom)
    }
}
