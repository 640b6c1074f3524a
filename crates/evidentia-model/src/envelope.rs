//! The event envelope — the only record shape that crosses the trust
//! boundary.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use evidentia_canon::{digest_of_canonical, payload_hash, CanonicalError, Hash, GENESIS_PREV_HASH};

use crate::authority::ChainAuthority;
use crate::event_type::EventType;

/// The ordered set of fields that participate in `event_hash`. Nothing
/// else does — not `chain_authority`, not `timestamp_monotonic`, not
/// `authority_id`, not the payload itself (only its hash). This is the
/// authority-laundering defense: a claimed `chain_authority` can never
/// be signed into existence by whoever proposes the event.
#[derive(Serialize)]
pub struct SignedFields<'a> {
    pub event_id: String,
    pub session_id: String,
    pub sequence_number: u64,
    pub timestamp_wall: &'a str,
    pub event_type: EventType,
    pub payload_hash: &'a Hash,
    pub prev_event_hash: &'a Hash,
}

impl<'a> SignedFields<'a> {
    pub fn event_hash(&self) -> Result<Hash, CanonicalError> {
        let value = serde_json::to_value(self).expect("SignedFields is infallibly serializable");
        digest_of_canonical(&value)
    }
}

/// A fully-formed, committed event envelope — the output of ingestion and
/// the input to the verifier (modulo the verifier's independent JSON
/// decoding of the same wire shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub session_id: Uuid,
    pub sequence_number: u64,
    pub timestamp_wall: String,
    pub timestamp_monotonic: f64,
    pub event_type: EventType,
    pub schema_ver: String,
    pub payload: Value,
    pub payload_hash: Hash,
    pub prev_event_hash: Hash,
    pub event_hash: Hash,
    pub chain_authority: ChainAuthority,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub authority_id: Option<String>,
}

impl EventEnvelope {
    pub fn signed_fields(&self) -> SignedFields<'_> {
        SignedFields {
            event_id: self.event_id.to_string(),
            session_id: self.session_id.to_string(),
            sequence_number: self.sequence_number,
            timestamp_wall: &self.timestamp_wall,
            event_type: self.event_type,
            payload_hash: &self.payload_hash,
            prev_event_hash: &self.prev_event_hash,
        }
    }
}

/// An envelope proposed by an untrusted client, before the ingestion
/// authority strips server-authoritative fields and recomputes hashes.
/// Authority-bearing fields are `Option` here specifically so their
/// *presence* on the wire can be detected and rejected as
/// `AUTHORITY_LEAK` rather than silently ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ProposedEvent {
    pub event_id: Uuid,
    pub session_id: Uuid,
    pub sequence_number: u64,
    pub timestamp_wall: String,
    pub timestamp_monotonic: f64,
    pub event_type: EventType,
    pub schema_ver: String,
    pub payload: Value,
    #[serde(default)]
    pub chain_authority: Option<Value>,
    #[serde(default)]
    pub event_hash: Option<Value>,
    #[serde(default)]
    pub prev_event_hash: Option<Value>,
    #[serde(default)]
    pub authority_id: Option<Value>,
}

impl ProposedEvent {
    /// Any of the four server-authoritative fields present on the wire.
    pub fn has_authority_leak(&self) -> bool {
        self.chain_authority.is_some()
            || self.event_hash.is_some()
            || self.prev_event_hash.is_some()
            || self.authority_id.is_some()
    }
}

/// Format `now` as RFC 3339, UTC, millisecond precision, `Z` suffix —
/// not whatever `chrono`'s default `to_rfc3339` would emit (which may
/// include microseconds or a `+00:00` offset).
pub fn format_timestamp_wall(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub const GENESIS_HASH: Hash = GENESIS_PREV_HASH;

pub fn compute_payload_hash(payload: &Value) -> Result<Hash, CanonicalError> {
    payload_hash(payload)
}
