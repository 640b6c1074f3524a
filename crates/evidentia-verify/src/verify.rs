//! The verification algorithm: parse, check structural and chain
//! integrity, classify evidence strength. A final policy-gate step
//! lives in `evidentia-policy`, which depends on this crate's
//! `VerificationReport` as plain data — never the reverse.

use std::collections::BTreeSet;

use crate::canon::canonical_bytes;
use crate::json::{self, Value};
use crate::model::{ChainAuthority, EvidenceClass, EvidenceFacts, EventType, SUPPORTED_SCHEMA_VERSIONS};
use crate::report::{ErrorCode, Status, VerificationReport, Violation};
use crate::sha256::{sha256, to_hex};

const HASH_PREFIX: &str = "sha256:";

/// A `sha256:<hex>` tagged digest, well-formed iff the hex portion is
/// exactly 64 lowercase hex characters.
fn is_well_formed_hash(s: &str) -> bool {
    match s.strip_prefix(HASH_PREFIX) {
        Some(hex) => hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn genesis_hash() -> String {
    format!("{HASH_PREFIX}{}", "0".repeat(64))
}

fn hash_of(bytes: &[u8]) -> String {
    format!("{HASH_PREFIX}{}", to_hex(&sha256(bytes)))
}

struct ParsedEvent {
    line_no: usize,
    event_id: String,
    session_id: String,
    sequence_number: u64,
    timestamp_wall: String,
    event_type: EventType,
    schema_ver: String,
    payload: Value,
    payload_hash: String,
    prev_event_hash: String,
    event_hash: String,
    chain_authority: ChainAuthority,
}

/// Verify a raw line-delimited-JSON event stream. Pure, synchronous, and
/// allocation-bounded by input size — it never spawns workers or
/// schedules tasks.
pub fn verify(input: &[u8]) -> VerificationReport {
    let text = match std::str::from_utf8(input) {
        Ok(t) => t,
        Err(_) => return load_error("input is not valid UTF-8"),
    };

    let mut violations = Vec::new();
    let mut parsed = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        match parse_envelope(line, line_no) {
            Ok(event) => parsed.push(event),
            Err(v) => violations.push(v),
        }
    }

    if parsed.is_empty() && violations.is_empty() {
        return load_error("input contained no event lines");
    }

    // Step 3: authority set cardinality.
    let authorities: BTreeSet<&'static str> = parsed.iter().map(|e| e.chain_authority.as_str()).collect();
    if authorities.len() > 1 {
        violations.push(Violation::new(ErrorCode::MixedAuthority, "session contains more than one chain_authority value"));
    }

    // Step 4: sequence monotonicity. Expect 0, 1, 2, ... in file order.
    let mut expected: u64 = 0;
    for event in &parsed {
        if event.sequence_number != expected {
            violations.push(Violation::new(
                ErrorCode::SequenceViolation,
                format!("line {}: expected sequence_number {}, got {}", event.line_no, expected, event.sequence_number),
            ));
            break;
        }
        expected += 1;
    }

    // Steps 5-7: payload hash, chain linkage, envelope hash — all using
    // verifier-recomputed hashes only, never the stored `event_hash`.
    let mut recomputed_hashes: Vec<String> = Vec::with_capacity(parsed.len());
    let mut prev_recomputed = genesis_hash();

    for event in &parsed {
        let payload_bytes = match canonical_bytes(&event.payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                violations.push(Violation::new(ErrorCode::SchemaViolation, format!("line {}: payload not canonicalizable: {e}", event.line_no)));
                recomputed_hashes.push(String::new());
                continue;
            }
        };
        let recomputed_payload_hash = hash_of(&payload_bytes);
        if recomputed_payload_hash != event.payload_hash {
            violations.push(Violation::new(ErrorCode::HashMismatch, format!("line {}: payload_hash mismatch", event.line_no)));
        }

        if event.prev_event_hash != prev_recomputed {
            violations.push(Violation::new(ErrorCode::ChainBroken, format!("line {}: prev_event_hash does not match the previous verifier-recomputed event_hash", event.line_no)));
        }

        let signed_fields_bytes = signed_fields_bytes(event, &recomputed_payload_hash, &prev_recomputed);
        let recomputed_event_hash = hash_of(&signed_fields_bytes);
        if recomputed_event_hash != event.event_hash {
            violations.push(Violation::new(ErrorCode::HashMismatch, format!("line {}: event_hash mismatch", event.line_no)));
        }

        recomputed_hashes.push(recomputed_event_hash.clone());
        prev_recomputed = recomputed_event_hash;
    }

    // Step 8: redaction integrity, over every payload independently.
    let mut contains_redacted = false;
    for event in &parsed {
        if payload_contains_redacted(&event.payload) {
            contains_redacted = true;
        }
        if let Err(path) = check_redaction_integrity(&event.payload) {
            violations.push(Violation::new(ErrorCode::RedactionIntegrityViolation, format!("line {}: unredacted sibling hash missing at {path}", event.line_no)));
        }
    }

    // Step 9: seal check.
    let seal = parsed.iter().enumerate().find(|(_, e)| e.event_type.is_seal());
    let sealed = seal.is_some();
    if let Some((seal_index, seal_event)) = seal {
        if let Err(message) = check_seal(seal_event, seal_index, &recomputed_hashes) {
            violations.push(Violation::new(ErrorCode::InvalidSeal, message));
        }
    }

    let has_session_end = parsed.iter().any(|e| e.event_type.is_session_end());
    let drop_count = parsed.iter().filter(|e| e.event_type.is_drop()).count() as u64;
    let authority_is_server = authorities.len() == 1 && authorities.contains("server");

    let mut partial_reasons = Vec::new();
    if !sealed {
        partial_reasons.push("no CHAIN_SEAL present".to_string());
    }
    if !has_session_end {
        partial_reasons.push("no SESSION_END present".to_string());
    }
    if drop_count > 0 {
        partial_reasons.push(format!("{drop_count} LOG_DROP event(s) present"));
    }

    let integrity_passed = violations.is_empty();
    let evidence_class = EvidenceClass::classify(EvidenceFacts {
        authority_is_server,
        sealed,
        has_session_end,
        drop_count,
        integrity_passed,
    });

    // Step 11: replay fingerprint, over the canonical concatenation of
    // every verifier-recomputed event_hash (not the stored ones).
    let concatenated = recomputed_hashes.join("");
    let fingerprint = to_hex(&sha256(concatenated.as_bytes()));

    let session_id = parsed.first().map(|e| e.session_id.clone());
    let authority = if authorities.len() == 1 {
        match authorities.iter().next() {
            Some(&"server") => Some("server"),
            Some(&"sdk") => Some("sdk"),
            _ => Some("unknown"),
        }
    } else {
        None
    };

    VerificationReport {
        session_id,
        status: if violations.is_empty() { Status::Pass } else { Status::Fail },
        evidence_class,
        authority,
        sealed,
        complete: has_session_end,
        total_drops: drop_count,
        partial_reasons,
        contains_redacted,
        violations,
        replay_fingerprint: fingerprint,
    }
}

fn load_error(message: &str) -> VerificationReport {
    VerificationReport {
        session_id: None,
        status: Status::Fail,
        evidence_class: EvidenceClass::Failed,
        authority: None,
        sealed: false,
        complete: false,
        total_drops: 0,
        partial_reasons: Vec::new(),
        contains_redacted: false,
        violations: vec![Violation::new(ErrorCode::LoadError, message)],
        replay_fingerprint: String::new(),
    }
}

fn parse_envelope(line: &str, line_no: usize) -> Result<ParsedEvent, Violation> {
    let value = json::parse(line).map_err(|e| Violation::new(ErrorCode::SchemaViolation, format!("line {line_no}: malformed JSON: {e}")))?;
    let obj = value.as_object().ok_or_else(|| Violation::new(ErrorCode::SchemaViolation, format!("line {line_no}: not a JSON object")))?;
    let _ = obj;

    let field = |name: &str| -> Result<&Value, Violation> {
        value.get(name).ok_or_else(|| Violation::new(ErrorCode::SchemaViolation, format!("line {line_no}: missing field \"{name}\"")))
    };
    let string_field = |name: &str| -> Result<String, Violation> {
        field(name)?.as_str().map(|s| s.to_string()).ok_or_else(|| Violation::new(ErrorCode::SchemaViolation, format!("line {line_no}: field \"{name}\" must be a string")))
    };

    let event_type_str = string_field("event_type")?;
    let event_type = EventType::from_wire_str(&event_type_str)
        .ok_or_else(|| Violation::new(ErrorCode::UnknownEventType, format!("line {line_no}: unknown event_type \"{event_type_str}\"")))?;

    let schema_ver = string_field("schema_ver")?;
    if !SUPPORTED_SCHEMA_VERSIONS.contains(&schema_ver.as_str()) {
        return Err(Violation::new(ErrorCode::UnknownSchemaVersion, format!("line {line_no}: unknown schema_ver \"{schema_ver}\"")));
    }

    let sequence_number = field("sequence_number")?
        .as_u64()
        .ok_or_else(|| Violation::new(ErrorCode::SchemaViolation, format!("line {line_no}: sequence_number must be a non-negative integer")))?;

    let payload_hash = string_field("payload_hash")?;
    let prev_event_hash = string_field("prev_event_hash")?;
    let event_hash = string_field("event_hash")?;
    for (name, h) in [("payload_hash", &payload_hash), ("prev_event_hash", &prev_event_hash), ("event_hash", &event_hash)] {
        if !is_well_formed_hash(h) {
            return Err(Violation::new(ErrorCode::SchemaViolation, format!("line {line_no}: field \"{name}\" is not a well-formed sha256 digest")));
        }
    }

    let chain_authority_str = string_field("chain_authority")?;
    let chain_authority = ChainAuthority::from_wire_str(&chain_authority_str);
    if matches!(chain_authority, ChainAuthority::Unknown) {
        return Err(Violation::new(ErrorCode::AuthorityInvalid, format!("line {line_no}: chain_authority \"{chain_authority_str}\" is not one of server|sdk")));
    }

    Ok(ParsedEvent {
        line_no,
        event_id: string_field("event_id")?,
        session_id: string_field("session_id")?,
        sequence_number,
        timestamp_wall: string_field("timestamp_wall")?,
        event_type,
        schema_ver,
        payload: field("payload")?.clone(),
        payload_hash,
        prev_event_hash,
        event_hash,
        chain_authority,
    })
}

fn signed_fields_bytes(event: &ParsedEvent, payload_hash: &str, prev_event_hash: &str) -> Vec<u8> {
    let fields = Value::Object(vec![
        ("event_id".to_string(), Value::String(event.event_id.clone())),
        ("session_id".to_string(), Value::String(event.session_id.clone())),
        ("sequence_number".to_string(), Value::Number(event.sequence_number.to_string())),
        ("timestamp_wall".to_string(), Value::String(event.timestamp_wall.clone())),
        ("event_type".to_string(), Value::String(event.event_type.as_wire_str().to_string())),
        ("payload_hash".to_string(), Value::String(payload_hash.to_string())),
        ("prev_event_hash".to_string(), Value::String(prev_event_hash.to_string())),
    ]);
    canonical_bytes(&fields).expect("signed_fields are built from known-canonicalizable scalars")
}

/// Mirrors `evidentia_model::payload::check_redaction_integrity_at`,
/// reimplemented over this crate's own `Value` so the verifier never
/// imports that crate. Returns the offending field path on violation.
fn check_redaction_integrity(value: &Value) -> Result<(), String> {
    check_redaction_integrity_at(value, "$")
}

fn payload_contains_redacted(value: &Value) -> bool {
    const REDACTED: &str = "[REDACTED]";
    match value {
        Value::Object(fields) => fields.iter().any(|(_, v)| v.as_str() == Some(REDACTED) || payload_contains_redacted(v)),
        Value::Array(items) => items.iter().any(|v| v.as_str() == Some(REDACTED) || payload_contains_redacted(v)),
        _ => false,
    }
}

fn check_redaction_integrity_at(value: &Value, path: &str) -> Result<(), String> {
    const REDACTED: &str = "[REDACTED]";
    match value {
        Value::Object(fields) => {
            for (key, v) in fields {
                if v.as_str() == Some(REDACTED) {
                    let sibling_key = format!("{key}_hash");
                    let sibling = fields.iter().find(|(k, _)| k == &sibling_key).map(|(_, v)| v);
                    match sibling.and_then(Value::as_str) {
                        Some(hash) if is_well_formed_hash(hash) => {}
                        _ => return Err(format!("{path}.{key}")),
                    }
                } else {
                    check_redaction_integrity_at(v, &format!("{path}.{key}"))?;
                }
            }
            Ok(())
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                if item.as_str() == Some(REDACTED) {
                    return Err(item_path);
                }
                check_redaction_integrity_at(item, &item_path)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Minimal RFC 3339 shape check: `YYYY-MM-DDTHH:MM:SS[.fraction](Z|+HH:MM|-HH:MM)`,
/// with calendar-field ranges but no leap-year or days-in-month arithmetic.
/// Reimplemented by hand for the same reason `json.rs` and `canon.rs` are —
/// this crate pulls in no date library.
fn is_rfc3339(s: &str) -> bool {
    let b = s.as_bytes();
    if b.len() < 20 {
        return false;
    }
    fn two_digits(b: &[u8], i: usize) -> Option<u32> {
        let (d0, d1) = (*b.get(i)?, *b.get(i + 1)?);
        if d0.is_ascii_digit() && d1.is_ascii_digit() {
            Some((d0 - b'0') as u32 * 10 + (d1 - b'0') as u32)
        } else {
            None
        }
    }

    if !b[0..4].iter().all(u8::is_ascii_digit) || b[4] != b'-' {
        return false;
    }
    match two_digits(b, 5) {
        Some(1..=12) => {}
        _ => return false,
    }
    if b[7] != b'-' {
        return false;
    }
    match two_digits(b, 8) {
        Some(1..=31) => {}
        _ => return false,
    }
    if b[10] != b'T' && b[10] != b't' {
        return false;
    }
    match two_digits(b, 11) {
        Some(0..=23) => {}
        _ => return false,
    }
    if b[13] != b':' {
        return false;
    }
    match two_digits(b, 14) {
        Some(0..=59) => {}
        _ => return false,
    }
    if b[16] != b':' {
        return false;
    }
    match two_digits(b, 17) {
        Some(0..=60) => {}
        _ => return false,
    }

    let mut i = 19;
    if b.get(i) == Some(&b'.') {
        i += 1;
        let start = i;
        while b.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    match b.get(i) {
        Some(b'Z') | Some(b'z') => i + 1 == b.len(),
        Some(b'+') | Some(b'-') => match (two_digits(b, i + 1), b.get(i + 3), two_digits(b, i + 4)) {
            (Some(0..=23), Some(b':'), Some(0..=59)) => i + 6 == b.len(),
            _ => false,
        },
        _ => false,
    }
}

fn check_seal(seal_event: &ParsedEvent, seal_index: usize, recomputed_hashes: &[String]) -> Result<(), String> {
    let fields = seal_event.payload.object_map();
    for required in ["ingestion_service_id", "seal_timestamp", "session_digest"] {
        if !fields.get(required).map(|v| v.as_str().is_some()).unwrap_or(false) {
            return Err(format!("CHAIN_SEAL payload missing required string field \"{required}\""));
        }
    }
    let seal_timestamp = fields["seal_timestamp"].as_str().expect("checked above");
    if !is_rfc3339(seal_timestamp) {
        return Err(format!("CHAIN_SEAL seal_timestamp \"{seal_timestamp}\" is not RFC 3339 parseable"));
    }
    let session_digest = fields["session_digest"].as_str().expect("checked above");
    if seal_index == 0 {
        return Err("CHAIN_SEAL cannot be the first event in a session".to_string());
    }
    let last_pre_seal_hash = &recomputed_hashes[seal_index - 1];
    if session_digest != last_pre_seal_hash {
        return Err("session_digest does not match the verifier-recomputed hash of the last pre-seal event".to_string());
    }
    Ok(())
}
