//! `evidentia ingest` — drive `evidentia-ingest::append_batch` against a
//! local store, for reproducing sessions end-to-end from the command
//! line rather than through a transport layer this crate doesn't ship.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use evidentia_model::ProposedEvent;
use uuid::Uuid;

use evidentia_ingest::{IngestConfig, IngestionAuthority};
use evidentia_store::SqliteBackend;

/// Arguments for the ingest command
#[derive(Args)]
pub struct IngestArgs {
    /// SQLite database file. Created if it doesn't exist.
    #[arg(long, short = 'd', value_name = "FILE", default_value = "evidentia.db")]
    db: PathBuf,

    /// Session to append to. Generated if omitted.
    #[arg(long, value_name = "UUID")]
    session: Option<Uuid>,

    /// Path to a JSON array of proposed events.
    #[arg(long, short = 'e', value_name = "FILE")]
    events: PathBuf,

    /// Append a CHAIN_SEAL after the batch commits.
    #[arg(long)]
    seal: bool,

    /// Print the session's events as line-delimited JSON after appending.
    #[arg(long)]
    export: bool,
}

pub async fn run(args: IngestArgs) -> Result<i32> {
    let session_id = args.session.unwrap_or_else(Uuid::new_v4);

    let raw = std::fs::read_to_string(&args.events).with_context(|| format!("failed to read {}", args.events.display()))?;
    let proposed: Vec<ProposedEvent> = serde_json::from_str(&raw).context("events file must be a JSON array of proposed events")?;

    let url = format!("sqlite:{}?mode=rwc", args.db.display());
    let backend = Arc::new(SqliteBackend::new(&url).await.context("failed to open sqlite store")?);
    let authority = IngestionAuthority::new(backend.clone(), IngestConfig::from_env());

    let outcome = authority.append_batch(session_id, proposed, args.seal).await;

    match outcome {
        Ok(outcome) => {
            crate::print_success(&format!(
                "session {session_id}: accepted, last_sequence={:?}, sealed={}",
                outcome.last_sequence, outcome.sealed
            ));
            if args.export {
                let store = evidentia_store::EventStore::new(backend);
                let jsonl = store.export_jsonl(session_id).await.context("failed to export session")?;
                println!("{jsonl}");
            }
            Ok(0)
        }
        Err(e) => {
            crate::print_error(&format!("ingest rejected: [{}] {e}", e.code()));
            Ok(if e.is_retriable() { 1 } else { 2 })
        }
    }
}
