//! Stable, machine-readable error codes for ingestion.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("envelope does not satisfy its schema: {0}")]
    SchemaViolation(String),

    #[error("schema_ver \"{0}\" is not a version this build recognizes")]
    UnknownSchemaVersion(String),

    #[error("proposed event carried a server-authoritative field on the wire")]
    AuthorityLeak,

    #[error("sequence violation: expected {expected}, got {got}")]
    SequenceViolation { expected: u64, got: u64 },

    #[error("duplicate sequence number {0}")]
    DuplicateSequence(u64),

    #[error("session already has events signed by a different chain_authority")]
    MixedAuthority,

    #[error("session {0} is already sealed; no further events may be accepted")]
    SessionSealed(uuid::Uuid),

    #[error("a seal was requested but no SESSION_END has been committed or proposed")]
    MissingSessionEnd,

    #[error("a fresh session must start with SESSION_START at sequence_number 0")]
    MissingSessionStart,

    #[error("store is unavailable: {0}")]
    StoreUnavailable(String),

    #[error("timed out waiting for the per-session lock")]
    LockTimeout,
}

impl IngestError {
    /// Stable wire code for this rejection.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SchemaViolation(_) => "SCHEMA_VIOLATION",
            Self::UnknownSchemaVersion(_) => "UNKNOWN_SCHEMA_VERSION",
            Self::AuthorityLeak => "AUTHORITY_LEAK",
            Self::SequenceViolation { .. } => "SEQUENCE_VIOLATION",
            Self::DuplicateSequence(_) => "DUPLICATE_SEQUENCE",
            Self::MixedAuthority => "MIXED_AUTHORITY",
            Self::SessionSealed(_) => "SESSION_SEALED",
            Self::MissingSessionEnd => "MISSING_SESSION_END",
            Self::MissingSessionStart => "SCHEMA_VIOLATION",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::LockTimeout => "LOCK_TIMEOUT",
        }
    }

    /// Whether a caller should retry the identical batch. Only the lock
    /// timeout and a momentarily unavailable store are retriable — every
    /// other rejection is a fatal judgment about the batch's content.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::LockTimeout | Self::StoreUnavailable(_))
    }
}
