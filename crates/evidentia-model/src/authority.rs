//! Chain authority attribution and the authority-laundering defense:
//! `chain_authority` is never part of the hashed signed-field set, so a
//! client cannot forge server authority by re-signing its own claim.
//!
//! `ChainAuthority` deliberately does not implement `Hash` in the sense of
//! participating in `event_hash` — it is carried outside
//! [`crate::envelope::SignedFields`] so a client can never make a claim of
//! authority that the hash chain then protects for them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainAuthority {
    /// The ingestion authority minted every hash in this session.
    Server,
    /// The client SDK minted its own hashes; never set by the server.
    Sdk,
    /// Authority could not be determined (malformed or absent on read).
    Unknown,
}

impl ChainAuthority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Sdk => "sdk",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ChainAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
