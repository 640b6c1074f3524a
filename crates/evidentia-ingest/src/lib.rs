//! # evidentia-ingest
//!
//! The single writer permitted to mint authoritative hashes and sequence
//! numbers for a session. Every other component — the store, the
//! verifier, the CLI — treats this crate's output as the only
//! legitimate server-authored event stream.

pub mod authority;
pub mod config;
pub mod error;
pub mod rate_limit;

pub use authority::{AppendOutcome, IngestionAuthority};
pub use config::IngestConfig;
pub use error::IngestError;
