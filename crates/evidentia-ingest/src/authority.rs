//! The ingestion authority — the only component permitted to mint
//! authoritative hashes.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use evidentia_canon::Hash;
use evidentia_model::{
    compute_payload_hash, format_timestamp_wall, validate_payload, ChainAuthority, EventEnvelope,
    EventType, ProposedEvent, SignedFields, GENESIS_HASH, SUPPORTED_SCHEMA_VERSIONS,
};
use evidentia_store::{EventStore, SessionLocks, StorageBackend, StorageError};

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::rate_limit::DropRateTracker;

/// Outcome of a successful `append_batch` call.
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    pub accepted: bool,
    pub last_sequence: Option<u64>,
    pub sealed: bool,
}

pub struct IngestionAuthority<B: StorageBackend + ?Sized> {
    store: EventStore<B>,
    backend: Arc<B>,
    locks: SessionLocks,
    drop_rate: DropRateTracker,
    config: IngestConfig,
}

impl<B: StorageBackend + ?Sized> IngestionAuthority<B> {
    pub fn new(backend: Arc<B>, config: IngestConfig) -> Self {
        Self {
            store: EventStore::new(backend.clone()),
            backend,
            locks: SessionLocks::new(),
            drop_rate: DropRateTracker::new(),
            config,
        }
    }

    /// Validate, hash, chain, and commit a batch of proposed events.
    pub async fn append_batch(
        &self,
        session_id: Uuid,
        proposed: Vec<ProposedEvent>,
        seal: bool,
    ) -> Result<AppendOutcome, IngestError> {
        let _guard = tokio::time::timeout(self.config.lock_timeout, self.locks.lock(session_id))
            .await
            .map_err(|_| IngestError::LockTimeout)?;

        validate_shape(&proposed)?;

        let tail_event = self
            .backend
            .tail_event(session_id)
            .await
            .map_err(store_unavailable)?;

        if let Some(tail) = &tail_event {
            if tail.event_type.is_seal() {
                return Err(IngestError::SessionSealed(session_id));
            }
            if tail.chain_authority != ChainAuthority::Server {
                return Err(IngestError::MixedAuthority);
            }
        } else if let Some(first) = proposed.first() {
            if first.event_type != EventType::SessionStart || first.sequence_number != 0 {
                return Err(IngestError::MissingSessionStart);
            }
        }

        let mut expected = tail_event.as_ref().map(|t| t.sequence_number + 1).unwrap_or(0);
        for p in &proposed {
            if p.sequence_number != expected {
                self.emit_forensic_drop(session_id, expected, tail_event.as_ref()).await?;
                return Err(if p.sequence_number < expected {
                    IngestError::DuplicateSequence(p.sequence_number)
                } else {
                    IngestError::SequenceViolation { expected, got: p.sequence_number }
                });
            }
            expected += 1;
        }

        let mut prev_hash = tail_event.as_ref().map(|t| t.event_hash).unwrap_or(GENESIS_HASH);
        let mut has_session_end = tail_event.as_ref().map(|t| t.event_type.is_session_end()).unwrap_or(false);
        let mut finalized = Vec::with_capacity(proposed.len() + 1);

        for p in proposed {
            let payload_hash = compute_payload_hash(&p.payload).map_err(|e| IngestError::SchemaViolation(e.to_string()))?;
            let event_hash = {
                let signed = SignedFields {
                    event_id: p.event_id.to_string(),
                    session_id: p.session_id.to_string(),
                    sequence_number: p.sequence_number,
                    timestamp_wall: &p.timestamp_wall,
                    event_type: p.event_type,
                    payload_hash: &payload_hash,
                    prev_event_hash: &prev_hash,
                };
                signed.event_hash().map_err(|e| IngestError::SchemaViolation(e.to_string()))?
            };

            has_session_end = has_session_end || p.event_type.is_session_end();

            finalized.push(EventEnvelope {
                event_id: p.event_id,
                session_id: p.session_id,
                sequence_number: p.sequence_number,
                timestamp_wall: p.timestamp_wall,
                timestamp_monotonic: p.timestamp_monotonic,
                event_type: p.event_type,
                schema_ver: p.schema_ver,
                payload: p.payload,
                payload_hash,
                prev_event_hash: prev_hash,
                event_hash,
                chain_authority: ChainAuthority::Server,
                authority_id: Some(self.config.authority_id.clone()),
            });
            prev_hash = event_hash;
        }

        if seal {
            if !has_session_end {
                return Err(IngestError::MissingSessionEnd);
            }
            let seal_sequence = expected;
            let seal_envelope = self.build_seal_envelope(session_id, seal_sequence, prev_hash)?;
            finalized.push(seal_envelope);
        }

        let last_sequence = finalized.last().map(|e| e.sequence_number);

        self.backend
            .append_events(session_id, &finalized)
            .await
            .map_err(store_unavailable)?;

        Ok(AppendOutcome { accepted: true, last_sequence, sealed: seal })
    }

    fn build_seal_envelope(&self, session_id: Uuid, sequence_number: u64, session_digest: Hash) -> Result<EventEnvelope, IngestError> {
        let payload = json!({
            "ingestion_service_id": self.config.authority_id,
            "seal_timestamp": format_timestamp_wall(Utc::now()),
            "session_digest": session_digest.to_tagged_string(),
        });
        validate_payload(EventType::ChainSeal, &payload).map_err(|e| IngestError::SchemaViolation(e.to_string()))?;

        let payload_hash = compute_payload_hash(&payload).map_err(|e| IngestError::SchemaViolation(e.to_string()))?;
        let event_id = Uuid::new_v4();
        let timestamp_wall = format_timestamp_wall(Utc::now());

        let event_hash = {
            let signed = SignedFields {
                event_id: event_id.to_string(),
                session_id: session_id.to_string(),
                sequence_number,
                timestamp_wall: &timestamp_wall,
                event_type: EventType::ChainSeal,
                payload_hash: &payload_hash,
                prev_event_hash: &session_digest,
            };
            signed.event_hash().map_err(|e| IngestError::SchemaViolation(e.to_string()))?
        };

        Ok(EventEnvelope {
            event_id,
            session_id,
            sequence_number,
            timestamp_wall,
            timestamp_monotonic: 0.0,
            event_type: EventType::ChainSeal,
            schema_ver: SUPPORTED_SCHEMA_VERSIONS[0].to_string(),
            payload,
            payload_hash,
            prev_event_hash: session_digest,
            event_hash,
            chain_authority: ChainAuthority::Server,
            authority_id: Some(self.config.authority_id.clone()),
        })
    }

    /// Committed in its own transaction, before the rejection is
    /// returned to the caller — the one intentional deviation from
    /// whole-batch atomicity.
    async fn emit_forensic_drop(
        &self,
        session_id: Uuid,
        expected_sequence: u64,
        tail_event: Option<&EventEnvelope>,
    ) -> Result<(), IngestError> {
        let existing = self.store.read(session_id).await.map_err(store_unavailable)?;
        let cumulative_drops = existing.iter().filter(|e| e.event_type.is_drop()).count() as u64 + 1;

        let rate = self.drop_rate.record(session_id).await;
        if rate > self.config.max_log_drops_per_minute {
            tracing::warn!(session_id = %session_id, rate, "LOG_DROP rate cap exceeded; continuing to record");
        }
        if cumulative_drops > self.config.max_log_drops_per_session {
            tracing::warn!(session_id = %session_id, cumulative_drops, "LOG_DROP session cap exceeded; continuing to record");
        }

        let prev_hash = tail_event.map(|t| t.event_hash).unwrap_or(GENESIS_HASH);
        let payload = json!({
            "dropped_count": 1,
            "cumulative_drops": cumulative_drops,
            // The authority only observes a sequence gap, not the SDK-side
            // cause; NETWORK_LOSS is the least presumptive of the three
            // reasons the model allows.
            "drop_reason": "NETWORK_LOSS",
        });
        validate_payload(EventType::LogDrop, &payload).map_err(|e| IngestError::SchemaViolation(e.to_string()))?;

        let payload_hash = compute_payload_hash(&payload).map_err(|e| IngestError::SchemaViolation(e.to_string()))?;
        let event_id = Uuid::new_v4();
        let timestamp_wall = format_timestamp_wall(Utc::now());

        let event_hash = {
            let signed = SignedFields {
                event_id: event_id.to_string(),
                session_id: session_id.to_string(),
                sequence_number: expected_sequence,
                timestamp_wall: &timestamp_wall,
                event_type: EventType::LogDrop,
                payload_hash: &payload_hash,
                prev_event_hash: &prev_hash,
            };
            signed.event_hash().map_err(|e| IngestError::SchemaViolation(e.to_string()))?
        };

        let drop_envelope = EventEnvelope {
            event_id,
            session_id,
            sequence_number: expected_sequence,
            timestamp_wall,
            timestamp_monotonic: 0.0,
            event_type: EventType::LogDrop,
            schema_ver: SUPPORTED_SCHEMA_VERSIONS[0].to_string(),
            payload,
            payload_hash,
            prev_event_hash: prev_hash,
            event_hash,
            chain_authority: ChainAuthority::Server,
            authority_id: Some(self.config.authority_id.clone()),
        };

        self.backend.append_events(session_id, &[drop_envelope]).await.map_err(store_unavailable)
    }
}

fn validate_shape(proposed: &[ProposedEvent]) -> Result<(), IngestError> {
    for p in proposed {
        if p.has_authority_leak() {
            return Err(IngestError::AuthorityLeak);
        }
        if !SUPPORTED_SCHEMA_VERSIONS.contains(&p.schema_ver.as_str()) {
            return Err(IngestError::UnknownSchemaVersion(p.schema_ver.clone()));
        }
        validate_payload(p.event_type, &p.payload).map_err(|e| IngestError::SchemaViolation(e.to_string()))?;
    }
    Ok(())
}

fn store_unavailable(e: StorageError) -> IngestError {
    IngestError::StoreUnavailable(e.to_string())
}
