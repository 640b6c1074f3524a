//! Session-oriented convenience wrapper over a [`StorageBackend`].

use std::sync::Arc;
use uuid::Uuid;

use evidentia_model::{EventEnvelope, GENESIS_HASH};

use crate::backend::{StorageBackend, StorageError};

/// Where the next event in a session must chain from.
#[derive(Debug, Clone, Copy)]
pub struct ChainTail {
    pub next_sequence_number: u64,
    pub prev_event_hash: evidentia_canon::Hash,
}

impl ChainTail {
    pub fn genesis() -> Self {
        Self { next_sequence_number: 0, prev_event_hash: GENESIS_HASH }
    }
}

#[derive(Debug)]
pub struct EventStore<B: StorageBackend + ?Sized> {
    backend: Arc<B>,
}

impl<B: StorageBackend + ?Sized> EventStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Where a caller must chain the next event from. Unseen sessions
    /// chain from genesis.
    pub async fn chain_tail(&self, session_id: Uuid) -> Result<ChainTail, StorageError> {
        match self.backend.tail_event(session_id).await? {
            Some(tail) => Ok(ChainTail {
                next_sequence_number: tail.sequence_number + 1,
                prev_event_hash: tail.event_hash,
            }),
            None => Ok(ChainTail::genesis()),
        }
    }

    pub async fn append(&self, session_id: Uuid, events: &[EventEnvelope]) -> Result<(), StorageError> {
        self.backend.append_events(session_id, events).await
    }

    pub async fn read(&self, session_id: Uuid) -> Result<Vec<EventEnvelope>, StorageError> {
        self.backend.read_events(session_id).await
    }

    pub async fn list_sessions(&self) -> Result<Vec<Uuid>, StorageError> {
        self.backend.list_sessions().await
    }

    /// One JSON object per line, in sequence order — the only export
    /// format this crate carries; OCSF/Splunk/Datadog-style sinks are
    /// out of scope for an evidence core, not a transport layer.
    pub async fn export_jsonl(&self, session_id: Uuid) -> Result<String, StorageError> {
        let events = self.read(session_id).await?;
        let mut lines = Vec::with_capacity(events.len());
        for event in &events {
            lines.push(serde_json::to_string(event).map_err(|e| StorageError::Serialization(e.to_string()))?);
        }
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use evidentia_model::{ChainAuthority, EventType};

    fn event(session_id: Uuid, seq: u64, prev: evidentia_canon::Hash) -> EventEnvelope {
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
            prev_event_hash: prev,
            event_hash: evidentia_canon::Hash::digest(format!("seq-{seq}").as_bytes()),
            chain_authority: ChainAuthority::Server,
            authority_id: Some("test-authority".to_string()),
        }
    }

    #[tokio::test]
    async fn unseen_session_chains_from_genesis() {
        let store = EventStore::new(Arc::new(MemoryBackend::new()));
        let tail = store.chain_tail(Uuid::new_v4()).await.unwrap();
        assert_eq!(tail.next_sequence_number, 0);
        assert_eq!(tail.prev_event_hash, GENESIS_HASH);
    }

    #[tokio::test]
    async fn chain_tail_advances_after_append() {
        let store = EventStore::new(Arc::new(MemoryBackend::new()));
        let session_id = Uuid::new_v4();
        let e0 = event(session_id, 0, GENESIS_HASH);
        let expected_hash = e0.event_hash;
        store.append(session_id, &[e0]).await.unwrap();

        let tail = store.chain_tail(session_id).await.unwrap();
        assert_eq!(tail.next_sequence_number, 1);
        assert_eq!(tail.prev_event_hash, expected_hash);
    }

    #[tokio::test]
    async fn export_jsonl_has_one_line_per_event() {
        let store = EventStore::new(Arc::new(MemoryBackend::new()));
        let session_id = Uuid::new_v4();
        store
            .append(session_id, &[event(session_id, 0, GENESIS_HASH), event(session_id, 1, GENESIS_HASH)])
            .await
            .unwrap();
        let jsonl = store.export_jsonl(session_id).await.unwrap();
        assert_eq!(jsonl.lines().count(), 2);
    }
}
