//! Operational (non-protocol) rate tracking for forensic `LOG_DROP`
//! emission. Exceeding a cap never blocks or fails a request — it only
//! produces a log line an operator can alert on.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
pub struct DropRateTracker {
    recent: tokio::sync::Mutex<HashMap<Uuid, Vec<Instant>>>,
}

impl DropRateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a drop for `session_id` and return how many drops that
    /// session has produced in the trailing 60 seconds, including this one.
    pub async fn record(&self, session_id: Uuid) -> u32 {
        let now = Instant::now();
        let mut recent = self.recent.lock().await;
        let timestamps = recent.entry(session_id).or_default();
        timestamps.retain(|t| now.duration_since(*t) < WINDOW);
        timestamps.push(now);
        timestamps.len() as u32
    }
}
