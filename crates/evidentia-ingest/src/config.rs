//! Ingestion authority configuration.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Stamped into every server-authored event's `authority_id`.
    pub authority_id: String,
    /// Bound on how long a caller waits for the per-session lock before
    /// getting back a retriable `LOCK_TIMEOUT`.
    pub lock_timeout: Duration,
    /// Operational cap, not a protocol invariant: once a session's
    /// cumulative LOG_DROP count exceeds this, drops are still accepted
    /// and committed, but ingestion logs a warning. No crash.
    pub max_log_drops_per_session: u64,
    /// Same operational-cap spirit, applied to the rate of drops in the
    /// trailing 60 seconds for a single session.
    pub max_log_drops_per_minute: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            authority_id: "evidentia-ingest".to_string(),
            lock_timeout: Duration::from_secs(10),
            max_log_drops_per_session: 50,
            max_log_drops_per_minute: 10,
        }
    }
}

impl IngestConfig {
    /// Read overrides from the process environment, falling back to
    /// defaults for anything unset or malformed — the same
    /// environment-variable-struct pattern the rest of the workspace uses
    /// for configuration.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(id) = std::env::var("EVIDENTIA_AUTHORITY_ID") {
            if !id.is_empty() {
                config.authority_id = id;
            }
        }
        if let Ok(secs) = std::env::var("EVIDENTIA_LOCK_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                config.lock_timeout = Duration::from_secs(secs);
            }
        }
        if let Ok(max) = std::env::var("EVIDENTIA_MAX_LOG_DROPS_PER_SESSION") {
            if let Ok(max) = max.parse::<u64>() {
                config.max_log_drops_per_session = max;
            }
        }
        if let Ok(max) = std::env::var("EVIDENTIA_MAX_LOG_DROPS_PER_MINUTE") {
            if let Ok(max) = max.parse::<u32>() {
                config.max_log_drops_per_minute = max;
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = IngestConfig::default();
        assert_eq!(config.authority_id, "evidentia-ingest");
        assert!(config.lock_timeout.as_secs() > 0);
    }
}
