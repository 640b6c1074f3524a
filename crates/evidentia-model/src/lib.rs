//! The event envelope, closed event-type enum, evidence classification,
//! and authority attribution that every other crate in this workspace
//! builds on. `evidentia-verify` is the one exception: it deliberately
//! does not depend on this crate and reimplements the subset of it that
//! the wire format requires, from scratch, so that verification never
//! trusts the writer's own types.

pub mod authority;
pub mod envelope;
pub mod error;
pub mod event_type;
pub mod evidence;
pub mod payload;

pub use authority::ChainAuthority;
pub use envelope::{
    compute_payload_hash, format_timestamp_wall, EventEnvelope, ProposedEvent, SignedFields,
    GENESIS_HASH,
};
pub use error::ModelError;
pub use event_type::{EventType, SUPPORTED_SCHEMA_VERSIONS};
pub use evidence::{EvidenceClass, EvidenceFacts, SessionState};
pub use payload::{check_redaction_integrity, validate_payload, DropReason, SessionStatus};
