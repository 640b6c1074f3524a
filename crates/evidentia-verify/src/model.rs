//! An independent reimplementation of the closed event-type enum,
//! chain-authority tag, and evidence classification table. These
//! duplicate `evidentia-model`'s definitions on purpose: a verifier that
//! imported that crate's types would be trusting the same code the
//! ingestion authority trusts to agree with itself, which defeats the
//! point of an independent check.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

    pub fn is_seal(&self) -> bool {
        matches!(self, Self::ChainSeal)
    }

    pub fn is_drop(&self) -> bool {
        matches!(self, Self::LogDrop)
    }

    pub fn is_session_end(&self) -> bool {
        matches!(self, Self::SessionEnd)
    }
}

pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["v0.6"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainAuthority {
    Server,
    Sdk,
    Unknown,
}

impl ChainAuthority {
    pub fn from_wire_str(s: &str) -> Self {
        match s {
            "server" => Self::Server,
            "sdk" => Self::Sdk,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Sdk => "sdk",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceClass {
    Authoritative,
    PartialAuthoritative,
    NonAuthoritative,
    Failed,
}

impl EvidenceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authoritative => "AUTHORITATIVE",
            Self::PartialAuthoritative => "PARTIAL_AUTHORITATIVE",
            Self::NonAuthoritative => "NON_AUTHORITATIVE",
            Self::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EvidenceFacts {
    pub authority_is_server: bool,
    pub sealed: bool,
    pub has_session_end: bool,
    pub drop_count: u64,
    pub integrity_passed: bool,
}

impl EvidenceClass {
    pub fn classify(facts: EvidenceFacts) -> Self {
        if !facts.integrity_passed {
            return Self::Failed;
        }
        if !facts.authority_is_server {
            return Self::NonAuthoritative;
        }
        if facts.sealed && facts.has_session_end && facts.drop_count == 0 {
            Self::Authoritative
        } else {
            Self::PartialAuthoritative
        }
    }
}
