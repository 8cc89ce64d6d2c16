//! # Submission Entries
//!
//! Wire types for the entries of a submission batch. An entry is either a
//! reveal (content plus optional self-reported hashes) or a commit-only
//! reference to a prior registration. The `variant` field selects which.
//!
//! Self-reported hashes stay strings here. They are claims to be checked,
//! and a malformed claim must surface as a per-entry outcome carrying the
//! entry's index rather than as a body parse failure for the whole batch.

use serde::{Deserialize, Serialize};

use crate::address::{ContentAddress, ContentRef};
use crate::digest::ContentDigest;
use crate::error::AddressError;
use crate::payload::Payload;

/// What a benchmark item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// A benchmark prompt.
    Prompt,
    /// A model's response to a prompt.
    Response,
    /// A human or AI score of a response.
    Score,
}

impl ContentKind {
    /// All kinds, in tally order.
    pub const ALL: [ContentKind; 3] = [Self::Prompt, Self::Response, Self::Score];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::Response => "response",
            Self::Score => "score",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prompt" => Ok(Self::Prompt),
            "response" => Ok(Self::Response),
            "score" => Ok(Self::Score),
            other => Err(format!("unknown content kind: {other}")),
        }
    }
}

/// Which arm of [`ContentEnvelope`] an entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryVariant {
    Revealed,
    CommitOnly,
}

impl EntryVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Revealed => "revealed",
            Self::CommitOnly => "commit_only",
        }
    }
}

/// Optional detached signature over an entry's digest.
///
/// Only `signature` decides whether the entry is signed. The other fields
/// are ignored when it is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_algorithm: Option<String>,
}

impl SigningFields {
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

/// Unvalidated `(digest, content_address)` reference as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentRef {
    pub digest: String,
    pub content_address: String,
}

impl CommitmentRef {
    /// Validate both halves and check that the address embeds the digest.
    pub fn parse(&self) -> Result<ContentRef, AddressError> {
        let digest = ContentDigest::from_hex(&self.digest)?;
        let address = ContentAddress::parse(&self.content_address)?;
        ContentRef::new(digest, address)
    }
}

/// Second payload attached to a reveal, such as the fully rendered form of a
/// short answer. It carries its own identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedPayload {
    pub payload: Payload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_address: Option<String>,
}

/// Disclosed content, optionally tied to an earlier commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealedEntry {
    pub kind: ContentKind,
    pub payload: Payload,
    /// Self-reported digest of `payload`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Self-reported content address of `payload`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended: Option<ExtendedPayload>,
    /// The registration this reveal discloses. Absent for a direct reveal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_commitment: Option<CommitmentRef>,
    #[serde(flatten)]
    pub signing: SigningFields,
}

/// Reference to already-registered content whose payload stays embargoed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOnlyEntry {
    pub kind: ContentKind,
    #[serde(flatten)]
    pub reference: CommitmentRef,
    #[serde(flatten)]
    pub signing: SigningFields,
}

/// One entry of a submission batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum ContentEnvelope {
    Revealed(RevealedEntry),
    CommitOnly(CommitOnlyEntry),
}

impl ContentEnvelope {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Revealed(e) => e.kind,
            Self::CommitOnly(e) => e.kind,
        }
    }

    pub fn variant(&self) -> EntryVariant {
        match self {
            Self::Revealed(_) => EntryVariant::Revealed,
            Self::CommitOnly(_) => EntryVariant::CommitOnly,
        }
    }

    pub fn signing(&self) -> &SigningFields {
        match self {
            Self::Revealed(e) => &e.signing,
            Self::CommitOnly(e) => &e.signing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::address_of;

    #[test]
    fn revealed_wire_shape() {
        let json = serde_json::json!({
            "variant": "revealed",
            "kind": "prompt",
            "payload": {"encoding": "text", "value": "What is 2+2?"},
            "prior_commitment": {
                "digest": "52cb6b5e4a038af1756708f98afb718a08c75b87b2f03dbee4dd9c8139c15c5e",
                "content_address": "bafkreicsznvv4sqdrlyxkzyi7gfpw4mkbddvxb5s6a635zg5tsattqk4ly"
            },
            "signature": "00",
            "signature_algorithm": "ed25519"
        });
        let entry: ContentEnvelope = serde_json::from_value(json).unwrap();
        let ContentEnvelope::Revealed(r) = &entry else {
            panic!("expected revealed entry");
        };
        assert_eq!(r.kind, ContentKind::Prompt);
        assert_eq!(r.payload, Payload::text("What is 2+2?"));
        assert!(r.digest.is_none());
        assert!(r.prior_commitment.is_some());
        assert_eq!(r.signing.signature.as_deref(), Some("00"));
        assert!(r.signing.public_key.is_none());
        assert_eq!(entry.variant(), EntryVariant::Revealed);
    }

    #[test]
    fn commit_only_wire_shape() {
        let json = serde_json::json!({
            "variant": "commit_only",
            "kind": "score",
            "digest": "aa",
            "content_address": "bafk"
        });
        let entry: ContentEnvelope = serde_json::from_value(json.clone()).unwrap();
        let ContentEnvelope::CommitOnly(c) = &entry else {
            panic!("expected commit-only entry");
        };
        assert_eq!(c.kind, ContentKind::Score);
        assert_eq!(c.reference.digest, "aa");
        assert!(!c.signing.is_signed());
        assert_eq!(serde_json::to_value(&entry).unwrap(), json);
    }

    #[test]
    fn unknown_variant_rejected() {
        let json = serde_json::json!({"variant": "deleted", "kind": "prompt"});
        assert!(serde_json::from_value::<ContentEnvelope>(json).is_err());
    }

    #[test]
    fn commitment_ref_parse() {
        let r = address_of(&Payload::text("What is 2+2?")).unwrap();
        let wire = r.to_commitment_ref();
        assert_eq!(wire.parse().unwrap(), r);

        let bad = CommitmentRef {
            digest: "not-hex".into(),
            content_address: wire.content_address.clone(),
        };
        assert!(matches!(bad.parse(), Err(AddressError::InvalidDigest(_))));
    }

    #[test]
    fn kind_from_str() {
        assert_eq!("response".parse::<ContentKind>().unwrap(), ContentKind::Response);
        assert!("image".parse::<ContentKind>().is_err());
    }
}
