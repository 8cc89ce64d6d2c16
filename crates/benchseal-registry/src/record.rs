//! Records written by the submission pipeline.

use benchseal_core::{
    ContentAddress, ContentDigest, ContentKind, ContentRef, EntryVariant, Payload, RegistrationId,
    SigningFields, SubmissionId, Uploader, UploaderId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commitment: proof that `committer_id` held the content with this
/// digest at `created_at`. Never mutated, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub digest: ContentDigest,
    pub content_address: ContentAddress,
    pub committer_id: UploaderId,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    /// A fresh registration of `content_ref` owned by `committer`.
    pub fn new(content_ref: &ContentRef, committer: &UploaderId) -> Self {
        Self {
            id: RegistrationId::new(),
            digest: content_ref.digest,
            content_address: content_ref.content_address.clone(),
            committer_id: committer.clone(),
            created_at: Utc::now(),
        }
    }

    pub fn content_ref(&self) -> ContentRef {
        ContentRef {
            digest: self.digest,
            content_address: self.content_address.clone(),
        }
    }

    /// Whether this registration is keyed by `content_ref`.
    pub fn matches(&self, content_ref: &ContentRef) -> bool {
        self.digest == content_ref.digest && self.content_address == content_ref.content_address
    }
}

/// An accepted submission batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub uploader: Uploader,
    pub entry_count: usize,
    pub created_at: DateTime<Utc>,
}

/// The second payload of a reveal together with its verified identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedRecord {
    pub payload: Payload,
    pub content: ContentRef,
}

/// What gets stored for one verified entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum StoredEntry {
    /// Reference only. The payload stays private until a later reveal.
    Embargoed {
        kind: ContentKind,
        reference: ContentRef,
        registration_id: RegistrationId,
        signing: SigningFields,
    },
    /// Full payload with identifiers recomputed by the verifier.
    Revealed {
        kind: ContentKind,
        payload: Payload,
        content: ContentRef,
        extended: Option<ExtendedRecord>,
        /// Set when the reveal disclosed an earlier commitment.
        prior_registration: Option<RegistrationId>,
        signing: SigningFields,
    },
}

impl StoredEntry {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Embargoed { kind, .. } | Self::Revealed { kind, .. } => *kind,
        }
    }

    pub fn variant(&self) -> EntryVariant {
        match self {
            Self::Embargoed { .. } => EntryVariant::CommitOnly,
            Self::Revealed { .. } => EntryVariant::Revealed,
        }
    }

    /// The identifiers the entry is stored under.
    pub fn content_ref(&self) -> &ContentRef {
        match self {
            Self::Embargoed { reference, .. } => reference,
            Self::Revealed { content, .. } => content,
        }
    }
}

/// A stored entry with its position in the submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedEntry {
    pub submission_id: SubmissionId,
    pub index: usize,
    pub uploader_id: UploaderId,
    pub entry: StoredEntry,
}
