//! A stateless, zero-runtime-dependency verifier for hash-chained
//! evidence sessions. This crate imports nothing but the standard
//! library: it carries its own JSON parser, its own SHA-256,
//! and its own RFC 8785 canonicalizer rather than reusing
//! `evidentia-canon`, `evidentia-model`, or `serde`, so that verifying a
//! session never depends on trusting the same code the ingestion
//! authority trusts to agree with itself.
//!
//! The public entry point is [`verify`], a pure function from raw
//! line-delimited-JSON bytes to a [`VerificationReport`]. It performs no
//! I/O, spawns no threads, and returns the same report for the same
//! bytes on every call and every platform.

pub mod canon;
pub mod json;
pub mod model;
pub mod report;
pub mod sha256;
pub mod verify;

pub use model::{ChainAuthority, EvidenceClass, EventType};
pub use report::{ErrorCode, Status, VerificationReport, Violation};
pub use verify::verify;

#[cfg(test)]
mod tests {
    use super::*;

    fn line(json: &str) -> String {
        let mut s = json.to_string();
        s.push('\n');
        s
    }

    fn hash_str(tag: u8) -> String {
        format!("sha256:{:064x}", tag as u128)
    }

    /// Build a minimal, internally-consistent two-event session (start,
    /// end) with correctly recomputed hashes, for happy-path assembly in
    /// tests. Mirrors the shape `evidentia-ingest` would have produced.
    fn build_valid_session() -> String {
        let genesis = hash_str(0);

        let payload0 = r#"{"agent_id":"a1","framework":"langchain","environment":"prod"}"#;
        let payload_hash0 = crate::canon::canonical_bytes(&json::parse(payload0).unwrap()).unwrap();
        let payload_hash0 = format!("sha256:{}", sha256::to_hex(&sha256::sha256(&payload_hash0)));

        let signed0 = format!(
            r#"{{"event_id":"e0","event_type":"SESSION_START","payload_hash":"{ph}","prev_event_hash":"{prev}","sequence_number":0,"session_id":"s1","timestamp_wall":"2026-01-01T00:00:00.000Z"}}"#,
            ph = payload_hash0,
            prev = genesis,
        );
        let event_hash0 = format!("sha256:{}", sha256::to_hex(&sha256::sha256(&crate::canon::canonical_bytes(&json::parse(&signed0).unwrap()).unwrap())));

        let event0 = line(&format!(
            r#"{{"event_id":"e0","session_id":"s1","sequence_number":0,"timestamp_wall":"2026-01-01T00:00:00.000Z","timestamp_monotonic":0.0,"event_type":"SESSION_START","schema_ver":"v0.6","payload":{payload0},"payload_hash":"{ph}","prev_event_hash":"{prev}","event_hash":"{eh}","chain_authority":"server","authority_id":"ingest-1"}}"#,
            ph = payload_hash0,
            prev = genesis,
            eh = event_hash0,
        ));

        let payload1 = r#"{"status":"success","duration":1.5}"#;
        let payload_hash1 = format!("sha256:{}", sha256::to_hex(&sha256::sha256(&crate::canon::canonical_bytes(&json::parse(payload1).unwrap()).unwrap())));
        let signed1 = format!(
            r#"{{"event_id":"e1","event_type":"SESSION_END","payload_hash":"{ph}","prev_event_hash":"{prev}","sequence_number":1,"session_id":"s1","timestamp_wall":"2026-01-01T00:00:01.000Z"}}"#,
            ph = payload_hash1,
            prev = event_hash0,
        );
        let event_hash1 = format!("sha256:{}", sha256::to_hex(&sha256::sha256(&crate::canon::canonical_bytes(&json::parse(&signed1).unwrap()).unwrap())));

        let event1 = line(&format!(
            r#"{{"event_id":"e1","session_id":"s1","sequence_number":1,"timestamp_wall":"2026-01-01T00:00:01.000Z","timestamp_monotonic":1.0,"event_type":"SESSION_END","schema_ver":"v0.6","payload":{payload1},"payload_hash":"{ph}","prev_event_hash":"{prev}","event_hash":"{eh}","chain_authority":"server","authority_id":"ingest-1"}}"#,
            ph = payload_hash1,
            prev = event_hash0,
            eh = event_hash1,
        ));

        format!("{event0}{event1}")
    }

    /// Appends a CHAIN_SEAL to [`build_valid_session`] with the given
    /// `seal_timestamp`, so tests can exercise seal validation without
    /// re-deriving the first two events' hashes.
    fn build_sealed_session(seal_timestamp: &str) -> String {
        let base = build_valid_session();
        let event_hash1 = base.lines().nth(1).unwrap().rsplit("\"event_hash\":\"").next().unwrap().split('"').next().unwrap();

        let payload2 = format!(r#"{{"ingestion_service_id":"svc-1","seal_timestamp":"{seal_timestamp}","session_digest":"{event_hash1}"}}"#);
        let payload_hash2 = format!("sha256:{}", sha256::to_hex(&sha256::sha256(&crate::canon::canonical_bytes(&json::parse(&payload2).unwrap()).unwrap())));
        let signed2 = format!(
            r#"{{"event_id":"e2","event_type":"CHAIN_SEAL","payload_hash":"{ph}","prev_event_hash":"{prev}","sequence_number":2,"session_id":"s1","timestamp_wall":"2026-01-01T00:00:02.000Z"}}"#,
            ph = payload_hash2,
            prev = event_hash1,
        );
        let event_hash2 = format!("sha256:{}", sha256::to_hex(&sha256::sha256(&crate::canon::canonical_bytes(&json::parse(&signed2).unwrap()).unwrap())));

        let event2 = line(&format!(
            r#"{{"event_id":"e2","session_id":"s1","sequence_number":2,"timestamp_wall":"2026-01-01T00:00:02.000Z","timestamp_monotonic":2.0,"event_type":"CHAIN_SEAL","schema_ver":"v0.6","payload":{payload2},"payload_hash":"{ph}","prev_event_hash":"{prev}","event_hash":"{eh}","chain_authority":"server","authority_id":"ingest-1"}}"#,
            ph = payload_hash2,
            prev = event_hash1,
            eh = event_hash2,
        ));

        format!("{base}{event2}")
    }

    #[test]
    fn well_formed_seal_timestamp_is_accepted() {
        let bytes = build_sealed_session("2026-01-01T00:00:02.000Z");
        let report = verify(bytes.as_bytes());
        assert_eq!(report.status, Status::Pass);
        assert!(report.sealed);
        assert_eq!(report.evidence_class, EvidenceClass::Authoritative);
    }

    #[test]
    fn malformed_seal_timestamp_is_an_invalid_seal() {
        let bytes = build_sealed_session("not-a-date");
        let report = verify(bytes.as_bytes());
        assert_eq!(report.status, Status::Fail);
        assert!(report.violations.iter().any(|v| v.error_code == ErrorCode::InvalidSeal));
    }

    #[test]
    fn seal_timestamp_with_offset_instead_of_z_is_accepted() {
        let bytes = build_sealed_session("2026-01-01T00:00:02.000+00:00");
        let report = verify(bytes.as_bytes());
        assert_eq!(report.status, Status::Pass);
    }

    #[test]
    fn unsealed_clean_session_is_partial_authoritative() {
        let bytes = build_valid_session();
        let report = verify(bytes.as_bytes());
        assert_eq!(report.status, Status::Pass);
        assert_eq!(report.evidence_class, EvidenceClass::PartialAuthoritative);
        assert!(!report.sealed);
        assert!(report.complete);
        assert!(!report.replay_fingerprint.is_empty());
    }

    #[test]
    fn tampered_payload_is_detected_as_hash_mismatch() {
        let bytes = build_valid_session();
        let tampered = bytes.replace("\"langchain\"", "\"langchainX\"");
        let report = verify(tampered.as_bytes());
        assert_eq!(report.status, Status::Fail);
        assert!(report.violations.iter().any(|v| v.error_code == ErrorCode::HashMismatch));
    }

    #[test]
    fn sequence_gap_is_fatal() {
        let bytes = build_valid_session();
        let skipped = bytes.replacen("\"sequence_number\":1,", "\"sequence_number\":2,", 1);
        let report = verify(skipped.as_bytes());
        assert_eq!(report.status, Status::Fail);
        assert!(report.violations.iter().any(|v| v.error_code == ErrorCode::SequenceViolation));
    }

    #[test]
    fn mixed_authority_is_fatal() {
        let bytes = build_valid_session();
        let mixed = bytes.replacen("\"chain_authority\":\"server\"", "\"chain_authority\":\"sdk\"", 1);
        let report = verify(mixed.as_bytes());
        assert_eq!(report.status, Status::Fail);
        assert!(report.violations.iter().any(|v| v.error_code == ErrorCode::MixedAuthority));
    }

    #[test]
    fn empty_input_is_a_load_error() {
        let report = verify(b"");
        assert_eq!(report.exit_code(), 3);
    }

    #[test]
    fn unredacted_literal_without_sibling_hash_is_fatal() {
        let bytes = build_valid_session();
        // Inject a bare [REDACTED] with no sibling hash into the first payload.
        let tampered = bytes.replacen(r#""framework":"langchain""#, r#""framework":"langchain","secret":"[REDACTED]""#, 1);
        let report = verify(tampered.as_bytes());
        assert_eq!(report.status, Status::Fail);
        // The payload mutation also flips the payload hash, so at minimum
        // a hash mismatch fires; redaction integrity is checked independently
        // of hash state, so it should also appear.
        assert!(report.violations.iter().any(|v| v.error_code == ErrorCode::RedactionIntegrityViolation));
    }

    #[test]
    fn determinism_across_repeated_runs() {
        let bytes = build_valid_session();
        let first = verify(bytes.as_bytes());
        let second = verify(bytes.as_bytes());
        assert_eq!(first, second);
    }
}
