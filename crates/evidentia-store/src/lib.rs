//! # evidentia-store
//!
//! Append-only persistence for hash-chained evidence sessions:
//! - [`backend::MemoryBackend`] — reference implementation, used in tests
//!   and as the default backend for `evidentia-cli` when no database is
//!   configured.
//! - [`sqlite::SqliteBackend`] — production-shape backend.
//! - [`locks::SessionLocks`] — the per-session exclusive lock that
//!   `evidentia-ingest` takes before reading a session's tail and
//!   appending to it.
//! - [`event_store::EventStore`] — session-oriented convenience wrapper
//!   over any [`backend::StorageBackend`].

pub mod backend;
pub mod event_store;
pub mod locks;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use backend::{MemoryBackend, StorageBackend, StorageError};
pub use event_store::{ChainTail, EventStore};
pub use locks::SessionLocks;

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteBackend, SqliteConfig};
