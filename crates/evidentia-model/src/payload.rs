//! Per-event-type payload constraints and the redaction integrity
//! convention that applies to every payload regardless of type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;
use crate::event_type::EventType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Success,
    Failure,
    Timeout,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DropReason {
    BufferFull,
    NetworkLoss,
    SdkCrash,
}

const REDACTED_LITERAL: &str = "[REDACTED]";

fn require_object<'a>(payload: &'a Value, event_type: EventType) -> Result<&'a serde_json::Map<String, Value>, ModelError> {
    payload.as_object().ok_or_else(|| {
        ModelError::SchemaViolation(format!("{event_type} payload must be a JSON object"))
    })
}

fn require_field<'a>(
    obj: &'a serde_json::Map<String, Value>,
    field: &str,
    event_type: EventType,
) -> Result<&'a Value, ModelError> {
    obj.get(field).ok_or_else(|| {
        ModelError::SchemaViolation(format!("{event_type} payload is missing required field \"{field}\""))
    })
}

fn require_string(obj: &serde_json::Map<String, Value>, field: &str, event_type: EventType) -> Result<(), ModelError> {
    let v = require_field(obj, field, event_type)?;
    if v.is_string() {
        Ok(())
    } else {
        Err(ModelError::SchemaViolation(format!(
            "{event_type} payload field \"{field}\" must be a string"
        )))
    }
}

/// Validate a payload against the shape constraints for its event
/// type. This is a minimal structural check, not a full JSON Schema —
/// payloads are domain-specific per event type and are not governed by
/// a single schema document.
pub fn validate_payload(event_type: EventType, payload: &Value) -> Result<(), ModelError> {
    match event_type {
        EventType::SessionStart => {
            let obj = require_object(payload, event_type)?;
            require_string(obj, "agent_id", event_type)?;
            require_string(obj, "framework", event_type)?;
            require_string(obj, "environment", event_type)?;
        }
        EventType::SessionEnd => {
            let obj = require_object(payload, event_type)?;
            let status = require_field(obj, "status", event_type)?;
            serde_json::from_value::<SessionStatus>(status.clone()).map_err(|_| {
                ModelError::SchemaViolation(
                    "SESSION_END payload field \"status\" must be one of success|failure|timeout|cancelled".into(),
                )
            })?;
            require_field(obj, "duration", event_type)?;
        }
        EventType::ModelRequest | EventType::ModelResponse => {
            let obj = require_object(payload, event_type)?;
            let messages = require_field(obj, "messages", event_type)?;
            if !messages.is_array() {
                return Err(ModelError::SchemaViolation(format!(
                    "{event_type} payload field \"messages\" must be an array"
                )));
            }
        }
        EventType::ToolCall => {
            let obj = require_object(payload, event_type)?;
            require_string(obj, "tool", event_type)?;
            require_field(obj, "args", event_type)?;
        }
        EventType::ToolResult => {
            let obj = require_object(payload, event_type)?;
            require_string(obj, "tool", event_type)?;
            require_field(obj, "result", event_type)?;
        }
        EventType::AgentStateSnapshot => {
            // Opaque by spec — any JSON value is accepted.
        }
        EventType::DecisionTrace => {
            let obj = require_object(payload, event_type)?;
            require_field(obj, "inputs", event_type)?;
            require_field(obj, "outputs", event_type)?;
            require_string(obj, "justification", event_type)?;
            if obj.keys().any(|k| k.eq_ignore_ascii_case("thoughts")) {
                return Err(ModelError::SchemaViolation(
                    "DECISION_TRACE payload may not carry a freeform \"thoughts\" field".into(),
                ));
            }
        }
        EventType::Error => {
            let obj = require_object(payload, event_type)?;
            require_string(obj, "type", event_type)?;
            require_string(obj, "message", event_type)?;
            let fatal = require_field(obj, "fatal", event_type)?;
            if !fatal.is_boolean() {
                return Err(ModelError::SchemaViolation(
                    "ERROR payload field \"fatal\" must be a boolean".into(),
                ));
            }
        }
        EventType::Annotation => {
            let obj = require_object(payload, event_type)?;
            require_string(obj, "annotator_id", event_type)?;
            require_string(obj, "annotation_type", event_type)?;
        }
        EventType::ChainSeal => {
            let obj = require_object(payload, event_type)?;
            require_string(obj, "ingestion_service_id", event_type)?;
            require_string(obj, "seal_timestamp", event_type)?;
            require_string(obj, "session_digest", event_type)?;
        }
        EventType::LogDrop => {
            let obj = require_object(payload, event_type)?;
            let dropped = require_field(obj, "dropped_count", event_type)?;
            if !dropped.is_u64() {
                return Err(ModelError::SchemaViolation(
                    "LOG_DROP payload field \"dropped_count\" must be a non-negative integer".into(),
                ));
            }
            let cumulative = require_field(obj, "cumulative_drops", event_type)?;
            if !cumulative.is_u64() {
                return Err(ModelError::SchemaViolation(
                    "LOG_DROP payload field \"cumulative_drops\" must be a non-negative integer".into(),
                ));
            }
            let reason = require_field(obj, "drop_reason", event_type)?;
            serde_json::from_value::<DropReason>(reason.clone()).map_err(|_| {
                ModelError::SchemaViolation(
                    "LOG_DROP payload field \"drop_reason\" must be one of BUFFER_FULL|NETWORK_LOSS|SDK_CRASH".into(),
                )
            })?;
        }
    }
    check_redaction_integrity(payload)?;
    Ok(())
}

/// The redaction convention: a literal `"[REDACTED]"` string must be
/// accompanied by a sibling `<name>_hash` field carrying a well-formed
/// `sha256:<hex>` digest of the pre-redaction value.
pub fn check_redaction_integrity(value: &Value) -> Result<(), ModelError> {
    check_redaction_integrity_at(value, "$")
}

fn check_redaction_integrity_at(value: &Value, path: &str) -> Result<(), ModelError> {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                if v.as_str() == Some(REDACTED_LITERAL) {
                    let sibling_key = format!("{key}_hash");
                    let sibling = map.get(&sibling_key).and_then(Value::as_str).ok_or_else(|| {
                        ModelError::RedactionIntegrityViolation {
                            field: format!("{path}.{key}"),
                        }
                    })?;
                    if sibling.parse::<evidentia_canon::Hash>().is_err() {
                        return Err(ModelError::RedactionIntegrityViolation {
                            field: format!("{path}.{key}"),
                        });
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
                if item.as_str() == Some(REDACTED_LITERAL) {
                    // An array element has no field name, so it can never
                    // carry a `<name>_hash` sibling — always a violation.
                    return Err(ModelError::RedactionIntegrityViolation { field: item_path });
                }
                check_redaction_integrity_at(item, &item_path)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
