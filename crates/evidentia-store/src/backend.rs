//! The storage backend trait every persistence implementation satisfies,
//! plus an in-memory reference backend used by tests and by `evidentia-cli`
//! when no database is configured.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use uuid::Uuid;

use evidentia_model::EventEnvelope;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    #[error("sequence conflict: session {session_id} already has an event at sequence {sequence_number}")]
    SequenceConflict { session_id: Uuid, sequence_number: u64 },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),
}

/// Append-only event persistence. Implementations never need to support
/// update or delete — the data model is closed and append-only by
/// construction.
#[async_trait]
pub trait StorageBackend: Send + Sync + Debug {
    fn name(&self) -> &str;

    async fn is_healthy(&self) -> bool;

    /// Append a contiguous run of already-finalized envelopes to a
    /// session. Implementations must reject (not silently skip) any
    /// envelope whose `sequence_number` already exists for this session.
    async fn append_events(&self, session_id: Uuid, events: &[EventEnvelope]) -> Result<(), StorageError>;

    /// All events for a session, in ascending sequence order.
    async fn read_events(&self, session_id: Uuid) -> Result<Vec<EventEnvelope>, StorageError>;

    /// The highest-sequence event committed for a session, if any. The
    /// ingestion authority uses this to derive the next `sequence_number`
    /// and the next event's `prev_event_hash`.
    async fn tail_event(&self, session_id: Uuid) -> Result<Option<EventEnvelope>, StorageError>;

    /// Every session this backend has ever seen an event for.
    async fn list_sessions(&self) -> Result<Vec<Uuid>, StorageError>;
}

/// Reference backend: correct, unoptimized, data lost on process exit.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    sessions: tokio::sync::RwLock<HashMap<Uuid, Vec<EventEnvelope>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn is_healthy(&self) -> bool {
        true
    }

    async fn append_events(&self, session_id: Uuid, events: &[EventEnvelope]) -> Result<(), StorageError> {
        let mut sessions = self.sessions.write().await;
        let log = sessions.entry(session_id).or_default();
        for event in events {
            if log.iter().any(|e| e.sequence_number == event.sequence_number) {
                return Err(StorageError::SequenceConflict {
                    session_id,
                    sequence_number: event.sequence_number,
                });
            }
        }
        log.extend(events.iter().cloned());
        log.sort_by_key(|e| e.sequence_number);
        Ok(())
    }

    async fn read_events(&self, session_id: Uuid) -> Result<Vec<EventEnvelope>, StorageError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&session_id).cloned().unwrap_or_default())
    }

    async fn tail_event(&self, session_id: Uuid) -> Result<Option<EventEnvelope>, StorageError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&session_id).and_then(|log| log.last()).cloned())
    }

    async fn list_sessions(&self) -> Result<Vec<Uuid>, StorageError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidentia_model::{ChainAuthority, EventType, GENESIS_HASH};

    fn event(session_id: Uuid, seq: u64) -> EventEnvelope {
        let payload = serde_json::json!({"tool": "x", "args": {}});
        let payload_hash = evidentia_model::compute_payload_hash(&payload).unwrap();
        EventEnvelope {
            event_id: Uuid::new_v4(),
            session_id,
            sequence_number: seq,
            timestamp_wall: "2026-01-01T00:00:00.000Z".to_string(),
            timestamp_monotonic: seq as f64,
            event_type: EventType::ToolCall,
            schema_ver: "v0.6".to_string(),
            payload,
            payload_hash,
            prev_event_hash: GENESIS_HASH,
            event_hash: GENESIS_HASH,
            chain_authority: ChainAuthority::Server,
            authority_id: Some("test-authority".to_string()),
        }
    }

    #[tokio::test]
    async fn append_then_read_round_trips_in_order() {
        let backend = MemoryBackend::new();
        let session_id = Uuid::new_v4();
        backend.append_events(session_id, &[event(session_id, 1), event(session_id, 0)]).await.unwrap();
        let events = backend.read_events(session_id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence_number, 0);
        assert_eq!(events[1].sequence_number, 1);
    }

    #[tokio::test]
    async fn duplicate_sequence_number_is_rejected() {
        let backend = MemoryBackend::new();
        let session_id = Uuid::new_v4();
        backend.append_events(session_id, &[event(session_id, 0)]).await.unwrap();
        let result = backend.append_events(session_id, &[event(session_id, 0)]).await;
        assert!(matches!(result, Err(StorageError::SequenceConflict { .. })));
    }

    #[tokio::test]
    async fn tail_event_is_the_highest_sequence() {
        let backend = MemoryBackend::new();
        let session_id = Uuid::new_v4();
        backend.append_events(session_id, &[event(session_id, 0), event(session_id, 1), event(session_id, 2)]).await.unwrap();
        let tail = backend.tail_event(session_id).await.unwrap().unwrap();
        assert_eq!(tail.sequence_number, 2);
    }

    #[tokio::test]
    async fn unknown_session_reads_as_empty_not_error() {
        let backend = MemoryBackend::new();
        let events = backend.read_events(Uuid::new_v4()).await.unwrap();
        assert!(events.is_empty());
    }
}
