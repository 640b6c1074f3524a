//! The policy gate: a pure function mapping a
//! verification report and a configured policy to a final
//! accept/reject decision. Policy never mutates the underlying
//! evidence classification — it only gates the final status and exit
//! code. A breach of an evidentiary-strength preference
//! (`require_authoritative`, `require_seal`, `max_drops`) fails the
//! session without recording a violation, landing on exit code 1; a
//! breach that touches authority or secrecy (`reject_local_authority`,
//! `allow_redacted`) appends a `POLICY_VIOLATION` and lands on exit
//! code 2.

use serde::{Deserialize, Serialize};

use evidentia_verify::{EvidenceClass, ErrorCode, Status, VerificationReport, Violation};

/// The five stable policy options.
///
/// # Invariants
/// - Every field defaults to the least restrictive setting; an unset
///   policy accepts anything the verifier itself passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Any evidence class other than `AUTHORITATIVE` fails (non-fatal: exit code 1).
    #[serde(default)]
    pub require_authoritative: bool,
    /// `chain_authority = sdk` fails with a fatal `POLICY_VIOLATION` (exit code 2).
    #[serde(default)]
    pub reject_local_authority: bool,
    /// A session with no `CHAIN_SEAL` fails (non-fatal: exit code 1).
    #[serde(default)]
    pub require_seal: bool,
    /// When false, the presence of any `"[REDACTED]"` value fails with a
    /// fatal `POLICY_VIOLATION` (exit code 2).
    #[serde(default = "default_true")]
    pub allow_redacted: bool,
    /// `total_drops` exceeding this threshold fails (non-fatal: exit code 1).
    /// `None` disables the check.
    #[serde(default)]
    pub max_drops: Option<u64>,
}

fn default_true() -> bool {
    true
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            require_authoritative: false,
            reject_local_authority: false,
            require_seal: false,
            allow_redacted: true,
            max_drops: None,
        }
    }
}

/// Apply `policy` to `report`, returning a new report whose `status` and
/// `violations` reflect any policy failure, and the exit code for that
/// outcome. The verifier's own `evidence_class` is never altered.
pub fn apply(report: &VerificationReport, policy: &Policy) -> VerificationReport {
    let mut result = report.clone();

    // A report that already failed integrity stays failed; policy only
    // has the power to fail a report, never to pass one the verifier
    // rejected.
    if result.status == Status::Fail {
        return result;
    }

    let mut fatal_violations = Vec::new();
    let mut non_fatal_reasons = Vec::new();

    if policy.require_authoritative && result.evidence_class != EvidenceClass::Authoritative {
        non_fatal_reasons.push("require_authoritative: evidence_class is not AUTHORITATIVE".to_string());
    }
    if policy.reject_local_authority && result.authority == Some("sdk") {
        fatal_violations.push(Violation::new(ErrorCode::PolicyViolation, "reject_local_authority: session authority is sdk"));
    }
    if policy.require_seal && !result.sealed {
        non_fatal_reasons.push("require_seal: no CHAIN_SEAL present".to_string());
    }
    if !policy.allow_redacted && result.contains_redacted {
        fatal_violations.push(Violation::new(ErrorCode::PolicyViolation, "allow_redacted=false: session contains a redacted value"));
    }
    if let Some(max) = policy.max_drops {
        if result.total_drops > max {
            non_fatal_reasons.push(format!("max_drops={max}: total_drops is {}", result.total_drops));
        }
    }

    if !fatal_violations.is_empty() || !non_fatal_reasons.is_empty() {
        result.status = Status::Fail;
        result.violations.extend(fatal_violations);
        result.partial_reasons.extend(non_fatal_reasons);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidentia_verify::verify;

    fn passing_report() -> VerificationReport {
        // A single well-formed SESSION_START with server authority, no
        // seal, built directly rather than through the verifier's own
        // test fixtures (which are private to that crate).
        let genesis = format!("sha256:{}", "0".repeat(64));
        let payload = r#"{"agent_id":"a1","framework":"x","environment":"y"}"#;
        let payload_bytes = evidentia_verify::json::parse(payload).unwrap();
        let payload_hash = format!(
            "sha256:{}",
            evidentia_verify::sha256::to_hex(&evidentia_verify::sha256::sha256(
                &evidentia_verify::canon::canonical_bytes(&payload_bytes).unwrap()
            ))
        );
        let signed = format!(
            r#"{{"event_id":"e0","event_type":"SESSION_START","payload_hash":"{payload_hash}","prev_event_hash":"{genesis}","sequence_number":0,"session_id":"s1","timestamp_wall":"2026-01-01T00:00:00.000Z"}}"#
        );
        let event_hash = format!(
            "sha256:{}",
            evidentia_verify::sha256::to_hex(&evidentia_verify::sha256::sha256(
                &evidentia_verify::canon::canonical_bytes(&evidentia_verify::json::parse(&signed).unwrap()).unwrap()
            ))
        );
        let line = format!(
            "{{\"event_id\":\"e0\",\"session_id\":\"s1\",\"sequence_number\":0,\"timestamp_wall\":\"2026-01-01T00:00:00.000Z\",\"timestamp_monotonic\":0.0,\"event_type\":\"SESSION_START\",\"schema_ver\":\"v0.6\",\"payload\":{payload},\"payload_hash\":\"{payload_hash}\",\"prev_event_hash\":\"{genesis}\",\"event_hash\":\"{event_hash}\",\"chain_authority\":\"sdk\",\"authority_id\":\"x\"}}\n"
        );
        verify(line.as_bytes())
    }

    #[test]
    fn default_policy_passes_through_unchanged() {
        let report = passing_report();
        let gated = apply(&report, &Policy::default());
        assert_eq!(gated.status, Status::Pass);
    }

    #[test]
    fn reject_local_authority_fails_sdk_sessions() {
        let report = passing_report();
        assert_eq!(report.authority, Some("sdk"));
        let policy = Policy { reject_local_authority: true, ..Policy::default() };
        let gated = apply(&report, &policy);
        assert_eq!(gated.status, Status::Fail);
        assert!(gated.violations.iter().any(|v| v.error_code == ErrorCode::PolicyViolation));
        assert_eq!(gated.exit_code(), 2);
    }

    #[test]
    fn require_seal_fails_unsealed_sessions_without_a_fatal_violation() {
        let report = passing_report();
        assert!(!report.sealed);
        let policy = Policy { require_seal: true, ..Policy::default() };
        let gated = apply(&report, &policy);
        assert_eq!(gated.status, Status::Fail);
        assert!(gated.violations.is_empty());
        assert_eq!(gated.exit_code(), 1);
    }

    #[test]
    fn require_authoritative_fails_non_authoritative_sessions_without_a_fatal_violation() {
        let report = passing_report();
        assert_eq!(report.evidence_class, EvidenceClass::NonAuthoritative);
        let policy = Policy { require_authoritative: true, ..Policy::default() };
        let gated = apply(&report, &policy);
        assert_eq!(gated.status, Status::Fail);
        assert!(gated.violations.is_empty());
        assert_eq!(gated.exit_code(), 1);
    }

    #[test]
    fn max_drops_threshold_is_respected() {
        let mut report = passing_report();
        report.total_drops = 5;
        let policy = Policy { max_drops: Some(3), ..Policy::default() };
        let gated = apply(&report, &policy);
        assert_eq!(gated.status, Status::Fail);
        assert!(gated.violations.is_empty());
        assert_eq!(gated.exit_code(), 1);

        let policy_lenient = Policy { max_drops: Some(10), ..Policy::default() };
        let gated_lenient = apply(&report, &policy_lenient);
        assert_eq!(gated_lenient.status, Status::Pass);
    }

    #[test]
    fn reject_redacted_fails_sessions_carrying_a_redacted_value() {
        let mut report = passing_report();
        report.contains_redacted = true;
        let policy = Policy { allow_redacted: false, ..Policy::default() };
        let gated = apply(&report, &policy);
        assert_eq!(gated.status, Status::Fail);
        assert!(gated.violations.iter().any(|v| v.error_code == ErrorCode::PolicyViolation));
        assert_eq!(gated.exit_code(), 2);

        let lenient = apply(&report, &Policy::default());
        assert_eq!(lenient.status, Status::Pass);
    }

    #[test]
    fn policy_never_overturns_an_already_failed_report() {
        let mut report = passing_report();
        report.status = Status::Fail;
        report.violations.push(Violation::new(ErrorCode::HashMismatch, "unrelated fatal"));
        let gated = apply(&report, &Policy::default());
        assert_eq!(gated.status, Status::Fail);
        assert_eq!(gated.violations.len(), 1);
    }
}
