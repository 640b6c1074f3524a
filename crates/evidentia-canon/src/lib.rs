//! # evidentia-canon
//!
//! Deterministic serialization and hashing primitives shared by every
//! writer and reader of the evidence chain. This is the one module
//! `evidentia-ingest` links against to mint hashes; `evidentia-verify`
//! deliberately does **not** link against it (see its own crate docs) —
//! a zero-trust verifier that trusted the writer's hashing code would not
//! be zero-trust.
//!
//! ```
//! use evidentia_canon::{canonical_bytes, payload_hash};
//! use serde_json::json;
//!
//! let payload = json!({"tool": "grep", "pattern": "TODO"});
//! let bytes = canonical_bytes(&payload).unwrap();
//! let hash = payload_hash(&payload).unwrap();
//! assert_eq!(hash.to_tagged_string().len(), "sha256:".len() + 64);
//! ```

pub mod canonical;
pub mod hash;

pub use canonical::{canonical_bytes, digest_of_canonical, normalize_strings, payload_hash, CanonicalError};
pub use hash::{Hash, HashParseError, GENESIS_PREV_HASH};
