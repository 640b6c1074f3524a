//! Stable, machine-readable error codes for the event model.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("envelope does not satisfy its schema: {0}")]
    SchemaViolation(String),

    #[error("event_type \"{0}\" is not in the closed set this build recognizes")]
    UnknownEventType(String),

    #[error("schema_ver \"{0}\" is not a version this build recognizes")]
    UnknownSchemaVersion(String),

    #[error("field \"{field}\" is redacted but has no well-formed sibling \"{field}_hash\"")]
    RedactionIntegrityViolation { field: String },
}

impl ModelError {
    /// Stable wire code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SchemaViolation(_) => "SCHEMA_VIOLATION",
            Self::UnknownEventType(_) => "UNKNOWN_EVENT_TYPE",
            Self::UnknownSchemaVersion(_) => "UNKNOWN_SCHEMA_VERSION",
            Self::RedactionIntegrityViolation { .. } => "REDACTION_INTEGRITY_VIOLATION",
        }
    }
}
