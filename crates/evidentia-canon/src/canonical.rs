//! RFC 8785 (JCS) canonicalization and the two project hash primitives.
//!
//! `serde_jcs` already implements the RFC 8785 byte-ordering and number
//! rules (ascending UTF-16 key order, no whitespace, shortest
//! round-trippable doubles). This module adds the one rule `serde_jcs`
//! does not own: NFC string normalization at the envelope boundary, so
//! that two byte-distinct-but-visually-identical strings always hash
//! the same, then routes everything through `serde_jcs` so there is
//! exactly one canonicalization code path in this crate.

use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

use crate::hash::Hash;

#[derive(Debug, thiserror::Error)]
pub enum CanonicalError {
    #[error("value contains a non-finite number (NaN or infinity)")]
    NonFiniteNumber,
    #[error("JCS serialization failed: {0}")]
    Serialization(String),
}

/// NFC-normalize every string in a JSON value, recursively, including
/// object keys. Leaves key *order* untouched — `serde_jcs` is
/// responsible for sorting by UTF-16 code unit on output.
pub fn normalize_strings(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.nfc().collect::<String>()),
        Value::Array(items) => Value::Array(items.iter().map(normalize_strings).collect()),
        Value::Object(map) => {
            let normalized = map
                .iter()
                .map(|(k, v)| (k.nfc().collect::<String>(), normalize_strings(v)))
                .collect();
            Value::Object(normalized)
        }
        other => other.clone(),
    }
}

fn reject_non_finite(value: &Value) -> Result<(), CanonicalError> {
    match value {
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                if !f.is_finite() {
                    return Err(CanonicalError::NonFiniteNumber);
                }
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items {
                reject_non_finite(item)?;
            }
            Ok(())
        }
        Value::Object(map) => {
            for v in map.values() {
                reject_non_finite(v)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Produce the RFC 8785 canonical byte form of `value`.
///
/// `serde_json::Number` already refuses to represent NaN/infinity, so
/// the only way a non-finite value reaches here is via a value built
/// with `serde_json::json!` from an `f64` that was already infinite or
/// NaN before serialization — `reject_non_finite` is the belt on top of
/// that suspender, catching it explicitly rather than letting
/// `serde_jcs` produce silently-wrong output.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>, CanonicalError> {
    reject_non_finite(value)?;
    let normalized = normalize_strings(value);
    serde_jcs::to_vec(&normalized).map_err(|e| CanonicalError::Serialization(e.to_string()))
}

/// `payload_hash(payload) = "sha256:" + hex(SHA-256(canonical(payload)))`
pub fn payload_hash(payload: &Value) -> Result<Hash, CanonicalError> {
    Ok(Hash::digest(&canonical_bytes(payload)?))
}

/// Hash an arbitrary canonical-izable value — used for `event_hash` over
/// `signed_fields` by `evidentia-model`, and for the verifier's replay
/// fingerprint concatenation.
pub fn digest_of_canonical(value: &Value) -> Result<Hash, CanonicalError> {
    Ok(Hash::digest(&canonical_bytes(value)?))
}
