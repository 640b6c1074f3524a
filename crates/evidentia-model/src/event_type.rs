//! The closed event-type enum. Unknown types are always
//! rejected — there is no catch-all variant, by design: a permissive
//! enum here would let a future payload shape slip past both ingestion
//! and the verifier without either ever being updated to understand it.

use serde::{Deserialize, Serialize};

/// Schema versions this build understands. The verifier and ingestion
/// authority both reject any `schema_ver` outside this set.
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["v0.6"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    SessionStart,
    SessionEnd,
    ModelRequest,
    ModelResponse,
    ToolCall,
    ToolResult,
    AgentStateSnapshot,
    DecisionTrace,
    Error,
    Annotation,
    ChainSeal,
    LogDrop,
}

impl EventType {
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Self::SessionStart => "SESSION_START",
            Self::SessionEnd => "SESSION_END",
            Self::ModelRequest => "MODEL_REQUEST",
            Self::ModelResponse => "MODEL_RESPONSE",
            Self::ToolCall => "TOOL_CALL",
            Self::ToolResult => "TOOL_RESULT",
            Self::AgentStateSnapshot => "AGENT_STATE_SNAPSHOT",
            Self::DecisionTrace => "DECISION_TRACE",
            Self::Error => "ERROR",
            Self::Annotation => "ANNOTATION",
            Self::ChainSeal => "CHAIN_SEAL",
            Self::LogDrop => "LOG_DROP",
        }
    }

    pub fn from_wire_str(s: &str) -> Option<Self> {
        Some(match s {
            "SESSION_START" => Self::SessionStart,
            "SESSION_END" => Self::SessionEnd,
            "MODEL_REQUEST" => Self::ModelRequest,
            "MODEL_RESPONSE" => Self::ModelResponse,
            "TOOL_CALL" => Self::ToolCall,
            "TOOL_RESULT" => Self::ToolResult,
            "AGENT_STATE_SNAPSHOT" => Self::AgentStateSnapshot,
            "DECISION_TRACE" => Self::DecisionTrace,
            "ERROR" => Self::Error,
            "ANNOTATION" => Self::Annotation,
            "CHAIN_SEAL" => Self::ChainSeal,
            "LOG_DROP" => Self::LogDrop,
            _ => return None,
        })
    }

    /// Whether this type may legally close a session's lifecycle.
    pub fn is_session_end(&self) -> bool {
        matches!(self, Self::SessionEnd)
    }

    pub fn is_seal(&self) -> bool {
        matches!(self, Self::ChainSeal)
    }

    pub fn is_drop(&self) -> bool {
        matches!(self, Self::LogDrop)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_round_trips_through_wire_str() {
        let all = [
            EventType::SessionStart,
            EventType::SessionEnd,
            EventType::ModelRequest,
            EventType::ModelResponse,
            EventType::ToolCall,
            EventType::ToolResult,
            EventType::AgentStateSnapshot,
            EventType::DecisionTrace,
            EventType::Error,
            EventType::Annotation,
            EventType::ChainSeal,
            EventType::LogDrop,
        ];
        for t in all {
            let s = t.as_wire_str();
            assert_eq!(EventType::from_wire_str(s), Some(t));
        }
    }

    #[test]
    fn unknown_wire_string_is_rejected() {
        assert_eq!(EventType::from_wire_str("TOTALLY_MADE_UP"), None);
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&EventType::ChainSeal).unwrap();
        assert_eq!(json, "\"CHAIN_SEAL\"");
    }
}
