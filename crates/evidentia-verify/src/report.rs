//! The verifier's stable public contract: `VerificationReport`,
//! `Violation`, and the exit-code mapping.

use crate::model::EvidenceClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

/// The stable error-code taxonomy. Every code here is part of the
/// public contract; renaming one is a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    SchemaViolation,
    UnknownEventType,
    UnknownSchemaVersion,
    LoadError,
    MixedAuthority,
    AuthorityInvalid,
    SequenceViolation,
    DuplicateSequence,
    HashMismatch,
    ChainBroken,
    InvalidSeal,
    MissingSessionEnd,
    SessionSealed,
    RedactionIntegrityViolation,
    PolicyViolation,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SchemaViolation => "SCHEMA_VIOLATION",
            Self::UnknownEventType => "UNKNOWN_EVENT_TYPE",
            Self::UnknownSchemaVersion => "UNKNOWN_SCHEMA_VERSION",
            Self::LoadError => "LOAD_ERROR",
            Self::MixedAuthority => "MIXED_AUTHORITY",
            Self::AuthorityInvalid => "AUTHORITY_INVALID",
            Self::SequenceViolation => "SEQUENCE_VIOLATION",
            Self::DuplicateSequence => "DUPLICATE_SEQUENCE",
            Self::HashMismatch => "HASH_MISMATCH",
            Self::ChainBroken => "CHAIN_BROKEN",
            Self::InvalidSeal => "INVALID_SEAL",
            Self::MissingSessionEnd => "MISSING_SESSION_END",
            Self::SessionSealed => "SESSION_SEALED",
            Self::RedactionIntegrityViolation => "REDACTION_INTEGRITY_VIOLATION",
            Self::PolicyViolation => "POLICY_VIOLATION",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub error_code: ErrorCode,
    /// Human-readable detail. Never includes raw payload content — a
    /// redaction-integrity failure names the offending field path, but
    /// never the pre-redaction value it found there.
    pub message: String,
}

impl Violation {
    pub fn new(error_code: ErrorCode, message: impl Into<String>) -> Self {
        Self { error_code, message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub session_id: Option<String>,
    pub status: Status,
    pub evidence_class: EvidenceClass,
    pub authority: Option<&'static str>,
    pub sealed: bool,
    pub complete: bool,
    pub total_drops: u64,
    pub partial_reasons: Vec<String>,
    /// Whether any payload carried a well-formed redacted value. Tracked
    /// separately from `violations` so the policy gate's `allow_redacted`
    /// option can act on it without re-scanning raw payload bytes, which
    /// the policy gate never sees.
    pub contains_redacted: bool,
    pub violations: Vec<Violation>,
    /// Hex-encoded SHA-256 over the canonical concatenation of every
    /// recomputed `event_hash` — present even on a failing report so a
    /// caller can still compare two failed runs for determinism.
    pub replay_fingerprint: String,
}

impl VerificationReport {
    pub fn has_fatal(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Exit codes are part of the public contract:
    /// 0 = PASS, 1 = structural fail without a fatal violation recorded,
    /// 2 = fatal integrity/policy failure, 3 = input load error.
    pub fn exit_code(&self) -> i32 {
        if self.violations.iter().any(|v| v.error_code == ErrorCode::LoadError) {
            return 3;
        }
        match self.status {
            Status::Pass => 0,
            Status::Fail => {
                if self.has_fatal() {
                    2
                } else {
                    1
                }
            }
        }
    }
}
