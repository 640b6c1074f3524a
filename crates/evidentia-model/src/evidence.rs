//! Session lifecycle and evidence classification.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Active,
    Sealed,
    /// Observable only — never stored; a session with no `CHAIN_SEAL` is
    /// inferred abandoned when read back, it never transitions here.
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceClass {
    Authoritative,
    PartialAuthoritative,
    NonAuthoritative,
    Failed,
}

/// The facts §3's evidence-class table is a pure function of.
#[derive(Debug, Clone, Copy)]
pub struct EvidenceFacts {
    pub authority_is_server: bool,
    pub sealed: bool,
    pub has_session_end: bool,
    pub drop_count: u64,
    pub integrity_passed: bool,
}

impl EvidenceClass {
    /// Derive the evidence class from the session's observed facts. Called by both
    /// `evidentia-ingest` (to know what a batch just produced) and by
    /// `evidentia-verify`'s independent reimplementation of this same
    /// table (duplicated there so the verifier trusts nothing from here).
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

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(authority_is_server: bool, sealed: bool, has_session_end: bool, drop_count: u64) -> EvidenceFacts {
        EvidenceFacts {
            authority_is_server,
            sealed,
            has_session_end,
            drop_count,
            integrity_passed: true,
        }
    }

    #[test]
    fn fully_clean_sealed_server_session_is_authoritative() {
        assert_eq!(
            EvidenceClass::classify(facts(true, true, true, 0)),
            EvidenceClass::Authoritative
        );
    }

    #[test]
    fn missing_seal_downgrades_to_partial() {
        assert_eq!(
            EvidenceClass::classify(facts(true, false, true, 0)),
            EvidenceClass::PartialAuthoritative
        );
    }

    #[test]
    fn drop_events_downgrade_to_partial() {
        assert_eq!(
            EvidenceClass::classify(facts(true, true, true, 1)),
            EvidenceClass::PartialAuthoritative
        );
    }

    #[test]
    fn sdk_authority_is_non_authoritative_even_if_sealed() {
        assert_eq!(
            EvidenceClass::classify(facts(false, true, true, 0)),
            EvidenceClass::NonAuthoritative
        );
    }

    #[test]
    fn failed_integrity_overrides_everything() {
        let mut f = facts(true, true, true, 0);
        f.integrity_passed = false;
        assert_eq!(EvidenceClass::classify(f), EvidenceClass::Failed);
    }
}
