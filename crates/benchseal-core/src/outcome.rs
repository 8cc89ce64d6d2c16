//! Verification outcomes.

use serde::{Deserialize, Serialize};

/// Result of verifying a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationOutcome {
    Accepted,
    /// Recomputed identifiers differ from the self-reported or committed ones.
    HashMismatch,
    /// A referenced commitment is not registered.
    UnknownCommitment,
    /// The uploader neither committed the content nor holds an override role.
    UnauthorizedReveal,
    /// A present signature does not verify.
    InvalidSignature,
    /// The entry cannot be canonicalized or carries a malformed reference.
    MalformedPayload,
}

impl VerificationOutcome {
    pub const ALL: [VerificationOutcome; 6] = [
        Self::Accepted,
        Self::HashMismatch,
        Self::UnknownCommitment,
        Self::UnauthorizedReveal,
        Self::InvalidSignature,
        Self::MalformedPayload,
    ];

    /// Wire name, e.g. `HASH_MISMATCH`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "ACCEPTED",
            Self::HashMismatch => "HASH_MISMATCH",
            Self::UnknownCommitment => "UNKNOWN_COMMITMENT",
            Self::UnauthorizedReveal => "UNAUTHORIZED_REVEAL",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::MalformedPayload => "MALFORMED_PAYLOAD",
        }
    }

    /// Outcomes that indicate tampering or impersonation rather than a
    /// client mistake.
    pub fn is_security_relevant(self) -> bool {
        matches!(
            self,
            Self::HashMismatch | Self::UnauthorizedReveal | Self::InvalidSignature
        )
    }
}

impl std::fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-accepted outcome with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub outcome: VerificationOutcome,
    pub detail: String,
}

impl Rejection {
    pub fn new(outcome: VerificationOutcome, detail: impl Into<String>) -> Self {
        Self {
            outcome,
            detail: detail.into(),
        }
    }

    pub fn hash_mismatch(detail: impl Into<String>) -> Self {
        Self::new(VerificationOutcome::HashMismatch, detail)
    }

    pub fn unknown_commitment(detail: impl Into<String>) -> Self {
        Self::new(VerificationOutcome::UnknownCommitment, detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(VerificationOutcome::UnauthorizedReveal, detail)
    }

    pub fn invalid_signature(detail: impl Into<String>) -> Self {
        Self::new(VerificationOutcome::InvalidSignature, detail)
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new(VerificationOutcome::MalformedPayload, detail)
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.outcome, self.detail)
    }
}

impl std::error::Error for Rejection {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_as_str() {
        for outcome in VerificationOutcome::ALL {
            let json = serde_json::to_value(outcome).unwrap();
            assert_eq!(json, serde_json::Value::String(outcome.as_str().to_string()));
        }
    }

    #[test]
    fn security_relevant_outcomes() {
        assert!(VerificationOutcome::HashMismatch.is_security_relevant());
        assert!(VerificationOutcome::InvalidSignature.is_security_relevant());
        assert!(!VerificationOutcome::UnknownCommitment.is_security_relevant());
        assert!(!VerificationOutcome::Accepted.is_security_relevant());
    }

    #[test]
    fn rejection_display() {
        let r = Rejection::hash_mismatch("digest differs");
        assert_eq!(r.to_string(), "HASH_MISMATCH: digest differs");
    }
}
